//! Effective configuration: the shared config file with command-line
//! overrides applied on top.

use url::Url;

use smux_config::Config;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Load the config file (falling back to defaults) and apply `--url` and
/// `--timeout-ms`.
pub fn effective_config(global: &GlobalOpts) -> Config {
    apply_overrides(smux_config::load_config_or_default(), global)
}

pub fn apply_overrides(mut cfg: Config, global: &GlobalOpts) -> Config {
    if let Some(ref url) = global.url {
        cfg.url.clone_from(url);
    }
    if let Some(ms) = global.timeout_ms {
        cfg.request_timeout_ms = ms;
    }
    cfg
}

/// Validated base URL of the effective config.
pub fn base_url(cfg: &Config) -> Result<Url, CliError> {
    cfg.base_url().map_err(|e| match e {
        smux_config::ConfigError::Validation { field, reason } => {
            CliError::Validation { field, reason }
        }
        other => CliError::Config(other),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::{ColorMode, OutputFormat};

    fn global(url: Option<&str>, timeout_ms: Option<u64>) -> GlobalOpts {
        GlobalOpts {
            url: url.map(str::to_owned),
            timeout_ms,
            output: OutputFormat::Table,
            color: ColorMode::Never,
            verbose: 0,
            quiet: false,
        }
    }

    #[test]
    fn flags_override_file() {
        let cfg = apply_overrides(Config::default(), &global(Some("http://mux:9000/"), Some(100)));
        assert_eq!(cfg.url, "http://mux:9000/");
        assert_eq!(cfg.request_timeout_ms, 100);
    }

    #[test]
    fn absent_flags_keep_file_values() {
        let cfg = apply_overrides(Config::default(), &global(None, None));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn bad_url_is_validation_error() {
        let cfg = apply_overrides(Config::default(), &global(Some("ws://mux/"), None));
        let err = base_url(&cfg).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "url"));
    }
}
