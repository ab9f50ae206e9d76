//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use smux_config::ConfigError;
use smux_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach streammux server at {url}")]
    #[diagnostic(
        code(smux::connection_failed),
        help(
            "Check that the server is running and its web interface is enabled.\n\
             URL: {url}\n\
             Override with --url or SMUX_URL."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {timeout_ms}ms")]
    #[diagnostic(
        code(smux::timeout),
        help("Increase the window with --timeout-ms or check server responsiveness.")
    )]
    Timeout { timeout_ms: u64 },

    // ── Control ──────────────────────────────────────────────────────
    #[error("Server rejected control request for '{name}'")]
    #[diagnostic(
        code(smux::rejected),
        help("Run: smux status to see available streams and muxes.\nServer said: {message}")
    )]
    Rejected { name: String, message: String },

    #[error("Malformed server response: {message}")]
    #[diagnostic(code(smux::payload))]
    Payload { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(smux::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(smux::config),
        help("Check the config file with: smux config show")
    )]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(smux::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Rejected { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::Config(_) => exit_code::USAGE,
            Self::Payload { .. } | Self::Io(_) | Self::Render(_) => exit_code::GENERAL,
        }
    }

    /// Attach the server URL (and ctrl target) the core error lacks.
    pub fn from_core(err: CoreError, url: &str, target: Option<&str>) -> Self {
        match err {
            CoreError::ConnectionFailed { reason } => Self::ConnectionFailed {
                url: url.to_owned(),
                reason,
            },
            CoreError::ChannelClosed => Self::ConnectionFailed {
                url: url.to_owned(),
                reason: "connection closed".into(),
            },
            CoreError::Timeout { timeout_ms } => Self::Timeout { timeout_ms },
            CoreError::Rejected { message } => Self::Rejected {
                name: target.unwrap_or_default().to_owned(),
                message,
            },
            CoreError::UnknownEntity { name } => Self::Rejected {
                message: format!("unknown stream or mux '{name}'"),
                name,
            },
            CoreError::Payload { message } => Self::Payload { message },
        }
    }
}
