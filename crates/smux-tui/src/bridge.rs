//! Session bridge: runs the `/ws` session and the version fetch in
//! background tasks and forwards their results as [`Action`]s.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use smux_api::{ApiClient, ApiMessage, WsSession};
use smux_core::CoreError;

use crate::action::Action;

/// Forward every session event until the session ends or `cancel` fires.
///
/// There is no reconnect: once `Closed` or `Failed` has been forwarded,
/// the task exits.
pub fn spawn_session(
    ws_url: Url,
    outbound: mpsc::UnboundedReceiver<ApiMessage>,
    timeout: Duration,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        info!(url = %ws_url, "opening session");
        let mut session = WsSession::connect_with_timeout(ws_url, outbound, cancel, timeout);
        while let Some(event) = session.next_event().await {
            if action_tx.send(Action::Session(event)).is_err() {
                break;
            }
        }
        debug!("session bridge exiting");
    });
}

/// Fetch the version banner once, independent of the session.
pub fn spawn_version_fetch(client: ApiClient, action_tx: mpsc::UnboundedSender<Action>) {
    tokio::spawn(async move {
        let result = client.version().await.map_err(|err| {
            debug!(error = %err, transient = err.is_transient(), "version request failed");
            CoreError::from(err)
        });
        let _ = action_tx.send(Action::Version(result));
    });
}
