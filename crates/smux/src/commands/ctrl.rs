//! `smux ctrl`: enable or disable the endpoints of one stream or mux.

use owo_colors::OwoColorize;
use serde::Serialize;

use smux_api::{ApiClient, CtrlCommand};

use crate::cli::{CtrlArgs, GlobalOpts};
use crate::output;

use super::Failure;

/// Server's confirmation of a control request.
#[derive(Debug, Serialize)]
struct CtrlOut<'a> {
    name: &'a str,
    a: Option<bool>,
    b: Option<bool>,
}

fn describe(ena: Option<bool>, color: bool) -> String {
    match ena {
        Some(true) if color => "on".green().to_string(),
        Some(false) if color => "off".red().to_string(),
        Some(true) => "on".into(),
        Some(false) => "off".into(),
        None => "unchanged".into(),
    }
}

pub async fn handle(client: &ApiClient, args: CtrlArgs, global: &GlobalOpts) -> Result<(), Failure> {
    let cmd = CtrlCommand(
        args.name,
        args.a.map(crate::cli::Switch::as_bool),
        args.b.map(crate::cli::Switch::as_bool),
    );
    tracing::info!(name = cmd.name(), a = ?cmd.1, b = ?cmd.2, "sending control request");

    let confirmed = client.ctrl(&cmd).await.map_err(|err| Failure::Core {
        err: err.into(),
        target: Some(cmd.name().to_owned()),
    })?;

    let [a, b] = confirmed.ena();
    let out = CtrlOut {
        name: confirmed.name(),
        a,
        b,
    };
    let color = output::should_color(global.color);
    let rendered = output::render_single(
        global.output,
        &out,
        |o| {
            format!(
                "{}: A {}, B {}",
                o.name,
                describe(o.a, color),
                describe(o.b, color)
            )
        },
        |o| o.name.to_owned(),
    )?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
