//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits the identifier.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use smux_core::OnOffState;

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Endpoint on/off cell.
pub fn onoff_cell(state: OnOffState, color: bool) -> String {
    let label: &'static str = state.into();
    if !color {
        return label.to_owned();
    }
    match state {
        OnOffState::On => label.green().to_string(),
        OnOffState::Off => label.red().to_string(),
        OnOffState::Disabled => label.dimmed().to_string(),
    }
}

/// Render endpoint state from raw `can`/`ena` flags.
pub fn endpoint_state(can: bool, ena: bool) -> OnOffState {
    match (can, ena) {
        (false, _) => OnOffState::Disabled,
        (true, true) => OnOffState::On,
        (true, false) => OnOffState::Off,
    }
}

/// Section heading above a table.
pub fn heading(text: &str, color: bool) -> String {
    if color {
        text.bold().to_string()
    } else {
        text.to_owned()
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a single item; table output uses a pre-formatted `detail_fn`.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

pub fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let out = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    out.map_err(|e| CliError::Render(e.to_string()))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Render(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(serde::Serialize)]
    struct Item {
        name: String,
    }

    fn item() -> Item {
        Item { name: "gps1".into() }
    }

    #[test]
    fn plain_uses_id() {
        let out = render_single(OutputFormat::Plain, &item(), |_| String::new(), |i| i.name.clone())
            .unwrap();
        assert_eq!(out, "gps1");
    }

    #[test]
    fn compact_json_is_single_line() {
        let out = render_single(OutputFormat::JsonCompact, &item(), |_| String::new(), |i| i.name.clone())
            .unwrap();
        assert_eq!(out, r#"{"name":"gps1"}"#);
    }

    #[test]
    fn table_uses_detail_text() {
        let out = render_single(OutputFormat::Table, &item(), |i| format!("Name: {}", i.name), |_| String::new())
            .unwrap();
        assert_eq!(out, "Name: gps1");
    }

    #[test]
    fn uncolored_onoff() {
        assert_eq!(onoff_cell(endpoint_state(true, true), false), "on");
        assert_eq!(onoff_cell(endpoint_state(true, false), false), "off");
        assert_eq!(onoff_cell(endpoint_state(false, true), false), "disabled");
    }
}
