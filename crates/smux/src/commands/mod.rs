//! Command dispatch: bridges CLI args -> API client -> output formatting.

pub mod config_cmd;
pub mod ctrl;
pub mod status;
pub mod version;

use smux_api::ApiClient;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    client: &ApiClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let url = client.base_url().to_string();
    let result = match cmd {
        Command::Version => version::handle(client, global).await,
        Command::Status(args) => status::handle(client, args, global).await,
        Command::Ctrl(args) => ctrl::handle(client, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    };
    result.map_err(|failure| failure.into_cli(&url))
}

/// Handler failure, before the server URL is attached.
#[derive(Debug)]
pub enum Failure {
    Core {
        err: smux_core::CoreError,
        target: Option<String>,
    },
    Cli(CliError),
}

impl Failure {
    fn into_cli(self, url: &str) -> CliError {
        match self {
            Self::Core { err, target } => CliError::from_core(err, url, target.as_deref()),
            Self::Cli(err) => err,
        }
    }
}

impl From<smux_api::Error> for Failure {
    fn from(err: smux_api::Error) -> Self {
        Self::Core {
            err: err.into(),
            target: None,
        }
    }
}

impl From<CliError> for Failure {
    fn from(err: CliError) -> Self {
        Self::Cli(err)
    }
}
