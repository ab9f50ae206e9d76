//! Persistent `/ws` session to a streammux server.
//!
//! One session per dashboard lifetime: there is deliberately no reconnect
//! loop. The background task reports the lifecycle through [`WsEvent`]s
//! (`Opened`, then `Text` frames, then `Closed` or `Failed`) and writes every
//! outbound [`ApiMessage`] it receives as a JSON text frame.
//!
//! # Example
//!
//! ```rust,ignore
//! use smux_api::websocket::{WsEvent, WsSession};
//! use tokio::sync::mpsc;
//! use tokio_util::sync::CancellationToken;
//!
//! let (out_tx, out_rx) = mpsc::unbounded_channel();
//! let mut session = WsSession::connect(ws_url, out_rx, CancellationToken::new());
//!
//! while let Some(event) = session.next_event().await {
//!     if let WsEvent::Text(text) = event {
//!         println!("{text}");
//!     }
//! }
//! ```

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;
use crate::http::REQUEST_TIMEOUT;
use crate::types::ApiMessage;

// ── WsEvent ──────────────────────────────────────────────────────────

/// Lifecycle and data events from a [`WsSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsEvent {
    /// Handshake completed; the transport is open.
    Opened,
    /// One text frame, unparsed.
    Text(String),
    /// Server closed the connection or the stream ended.
    Closed,
    /// Handshake or stream failure. The session is over.
    Failed(String),
}

// ── WsSession ────────────────────────────────────────────────────────

/// Handle to the background session task.
pub struct WsSession {
    event_rx: mpsc::UnboundedReceiver<WsEvent>,
    cancel: CancellationToken,
}

impl WsSession {
    /// Spawn the session task with the default handshake timeout.
    ///
    /// Returns immediately; the connection attempt happens asynchronously.
    pub fn connect(
        ws_url: Url,
        outbound: mpsc::UnboundedReceiver<ApiMessage>,
        cancel: CancellationToken,
    ) -> Self {
        Self::connect_with_timeout(ws_url, outbound, cancel, REQUEST_TIMEOUT)
    }

    /// Spawn the session task with a custom handshake timeout.
    pub fn connect_with_timeout(
        ws_url: Url,
        outbound: mpsc::UnboundedReceiver<ApiMessage>,
        cancel: CancellationToken,
        timeout: Duration,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            let result = run_session(&ws_url, timeout, &event_tx, outbound, &task_cancel).await;
            let last = match result {
                Ok(()) => WsEvent::Closed,
                Err(e) => {
                    tracing::warn!(error = %e, url = %ws_url, "WebSocket session failed");
                    WsEvent::Failed(e.to_string())
                }
            };
            let _ = event_tx.send(last);
            tracing::debug!("WebSocket session task exiting");
        });

        Self { event_rx, cancel }
    }

    /// Receive the next event. `None` once the task has finished.
    pub async fn next_event(&mut self) -> Option<WsEvent> {
        self.event_rx.recv().await
    }
}

impl Drop for WsSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Single connection lifecycle ──────────────────────────────────────

async fn run_session(
    url: &Url,
    timeout: Duration,
    event_tx: &mpsc::UnboundedSender<WsEvent>,
    mut outbound: mpsc::UnboundedReceiver<ApiMessage>,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    tracing::info!(url = %url, "Connecting to WebSocket");

    let handshake = tokio_tungstenite::connect_async(url.as_str());
    let (ws_stream, _response) = tokio::select! {
        biased;
        () = cancel.cancelled() => return Ok(()),
        res = tokio::time::timeout(timeout, handshake) => match res {
            Ok(Ok(pair)) => pair,
            Ok(Err(e)) => return Err(Error::WebSocketConnect(e.to_string())),
            Err(_) => return Err(Error::WebSocketConnect(format!(
                "handshake timed out after {}ms",
                timeout.as_millis()
            ))),
        },
    };

    tracing::info!("WebSocket connected");
    let _ = event_tx.send(WsEvent::Opened);

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                let _ = write.send(tungstenite::Message::Close(None)).await;
                return Ok(());
            }
            Some(msg) = outbound.recv() => {
                let text = msg.to_json()?;
                tracing::debug!(frame = %text, "WebSocket send");
                write
                    .send(tungstenite::Message::text(text))
                    .await
                    .map_err(|_| Error::WebSocketClosed)?;
            }
            frame = read.next() => {
                match frame {
                    Some(Ok(msg)) => match classify_frame(msg) {
                        Some(WsEvent::Closed) => return Ok(()),
                        Some(event) => {
                            let _ = event_tx.send(event);
                        }
                        None => {}
                    },
                    Some(Err(e)) => return Err(Error::WebSocketConnect(e.to_string())),
                    None => {
                        tracing::info!("WebSocket stream ended");
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Map a received frame to an event. Control frames other than Close are dropped.
fn classify_frame(msg: tungstenite::Message) -> Option<WsEvent> {
    match msg {
        tungstenite::Message::Text(text) => Some(WsEvent::Text(text.as_str().to_owned())),
        tungstenite::Message::Close(frame) => {
            if let Some(ref cf) = frame {
                tracing::info!(code = %cf.code, reason = %cf.reason, "WebSocket close frame received");
            } else {
                tracing::info!("WebSocket close frame received (no payload)");
            }
            Some(WsEvent::Closed)
        }
        tungstenite::Message::Ping(_) => {
            // tungstenite queues the pong reply itself
            tracing::trace!("WebSocket ping");
            None
        }
        // Binary, Pong, Frame -- not part of this protocol
        _ => None,
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn text_frames_become_events() {
        let event = classify_frame(tungstenite::Message::text(r#"{"api":"status"}"#));
        assert_eq!(event, Some(WsEvent::Text(r#"{"api":"status"}"#.into())));
    }

    #[test]
    fn close_frame_ends_session() {
        assert_eq!(
            classify_frame(tungstenite::Message::Close(None)),
            Some(WsEvent::Closed)
        );
    }

    #[test]
    fn binary_and_ping_are_ignored() {
        assert_eq!(
            classify_frame(tungstenite::Message::Binary(vec![1, 2, 3].into())),
            None
        );
        assert_eq!(classify_frame(tungstenite::Message::Ping(Vec::new().into())), None);
    }

    #[tokio::test]
    async fn unreachable_server_reports_failure() {
        // Port 9 (discard) on localhost is almost never listening.
        let url = Url::parse("ws://127.0.0.1:9/ws").unwrap();
        let (_tx, rx) = mpsc::unbounded_channel();
        let mut session = WsSession::connect_with_timeout(
            url,
            rx,
            CancellationToken::new(),
            Duration::from_millis(500),
        );

        let event = session.next_event().await.unwrap();
        assert!(matches!(event, WsEvent::Failed(_)), "got {event:?}");
    }
}
