use thiserror::Error;

/// Top-level error type for the `smux-api` crate.
///
/// Covers the one-shot HTTP requests (`/version`, `/status`, `/ctrl`) and
/// the persistent `/ws` session. `smux-core` maps these into its own
/// [`CoreError`](https://docs.rs/smux-core) for consumers.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request did not complete within the fail-safe window.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Server answered with a non-success status.
    #[error("HTTP {status} from {path}")]
    Http { status: u16, path: String },

    // ── WebSocket ───────────────────────────────────────────────────
    /// WebSocket connection failed or the stream errored.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    /// WebSocket closed while a frame was being sent.
    #[error("WebSocket closed")]
    WebSocketClosed,

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Server refused a control request (unknown entity or bad data).
    #[error("Control request rejected: {0}")]
    Rejected(String),
}

impl Error {
    /// Returns `true` for the fail-safe timeout on one-shot requests.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Returns `true` for failures that may clear up on a later attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::WebSocketConnect(_) => true,
            _ => false,
        }
    }
}
