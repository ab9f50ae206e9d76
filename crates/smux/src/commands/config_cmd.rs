//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::effective_config(global);
            let rendered = output::render_single(
                global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_default(),
                |c| c.url.clone(),
            )?;
            output::print_output(rendered.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&smux_config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Init => {
            let cfg = config::effective_config(global);
            config::base_url(&cfg)?;
            let path = smux_config::save_config(&cfg)?;
            tracing::info!(path = %path.display(), "wrote config file");
            if !global.quiet {
                eprintln!("Config written to {}", path.display());
            }
            Ok(())
        }
    }
}
