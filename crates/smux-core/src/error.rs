// ── Core error types ──
//
// Errors surfaced by the dashboard engine. Transport failures from
// `smux-api` are folded into a small set of domain variants; consumers
// never match on reqwest or tungstenite details.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach streammux server: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The outbound command channel has no receiver (session task gone).
    #[error("Outbound channel closed")]
    ChannelClosed,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Unknown stream or mux: {name}")]
    UnknownEntity { name: String },

    #[error("Control request rejected by server: {message}")]
    Rejected { message: String },

    #[error("Malformed server payload: {message}")]
    Payload { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<smux_api::Error> for CoreError {
    fn from(err: smux_api::Error) -> Self {
        match err {
            smux_api::Error::Timeout { timeout_ms } => CoreError::Timeout { timeout_ms },
            smux_api::Error::Transport(ref e) if e.is_timeout() => {
                CoreError::Timeout { timeout_ms: 0 }
            }
            smux_api::Error::Transport(e) => CoreError::ConnectionFailed {
                reason: e.to_string(),
            },
            smux_api::Error::InvalidUrl(e) => CoreError::ConnectionFailed {
                reason: format!("invalid URL: {e}"),
            },
            smux_api::Error::Http { status, path } => CoreError::ConnectionFailed {
                reason: format!("HTTP {status} from {path}"),
            },
            smux_api::Error::WebSocketConnect(reason) => CoreError::ConnectionFailed { reason },
            smux_api::Error::WebSocketClosed => CoreError::ChannelClosed,
            smux_api::Error::Deserialization { message, .. } => CoreError::Payload { message },
            smux_api::Error::Rejected(message) => CoreError::Rejected { message },
        }
    }
}
