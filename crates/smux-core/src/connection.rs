// ── Connection controller ──
//
// Tracks the lifecycle of the single `/ws` session, decodes inbound text
// frames and pushes outbound control commands into the session's channel.
// There is no reconnect: once the session ends, the state stays where it was.

use std::time::{Duration, Instant};

use smux_api::{ApiMessage, CtrlCommand};
use strum::{Display, IntoStaticStr};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::display::{Pulse, TextField};
use crate::error::CoreError;

/// Highlight duration of the status label after every transition.
pub const PULSE: Duration = Duration::from_millis(100);

/// Connection lifecycle. Only ever advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, IntoStaticStr)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Owns the lifecycle label and the outbound half of the session.
#[derive(Debug)]
pub struct ConnectionController {
    state: ConnectionState,
    label: TextField,
    pulse: Pulse,
    outbound: mpsc::UnboundedSender<ApiMessage>,
}

impl ConnectionController {
    pub fn new(outbound: mpsc::UnboundedSender<ApiMessage>, now: Instant) -> Self {
        let mut ctl = Self {
            state: ConnectionState::Disconnected,
            label: TextField::new(),
            pulse: Pulse::default(),
            outbound,
        };
        ctl.render(now);
        ctl
    }

    /// The transport finished its handshake.
    pub fn on_open(&mut self, now: Instant) {
        info!("session open");
        self.advance(ConnectionState::Connecting, now);
    }

    /// The transport closed or failed. Logged only; the state is kept.
    pub fn on_closed(&self, reason: Option<&str>) {
        match reason {
            Some(reason) => tracing::warn!(state = %self.state, reason, "session ended"),
            None => info!(state = %self.state, "session closed"),
        }
    }

    /// Decode one inbound text frame.
    ///
    /// Any valid JSON counts as proof of life and marks the session
    /// `Connected`. Only `status` and `ctrl` messages are returned; invalid
    /// JSON and other `api` values produce `None`.
    pub fn receive(&mut self, text: &str, now: Instant) -> Option<ApiMessage> {
        let value: serde_json::Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, len = text.len(), "dropping unparseable frame");
                return None;
            }
        };
        self.advance(ConnectionState::Connected, now);

        match ApiMessage::from_value(&value) {
            Ok(msg @ (ApiMessage::Status(_) | ApiMessage::Ctrl { .. })) => Some(msg),
            Ok(other) => {
                debug!(?other, "ignoring message");
                None
            }
            Err(e) => {
                debug!(error = %e, "ignoring message");
                None
            }
        }
    }

    /// Queue a control command on the session.
    pub fn send_ctrl(&self, cmd: CtrlCommand) -> Result<(), CoreError> {
        debug!(name = cmd.name(), ena = ?cmd.ena(), "send ctrl");
        self.outbound
            .send(ApiMessage::ctrl(cmd))
            .map_err(|_| CoreError::ChannelClosed)
    }

    /// Expire the label highlight. Returns `true` if it changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.pulse.tick(now)
    }

    fn advance(&mut self, next: ConnectionState, now: Instant) {
        if next > self.state {
            debug!(from = %self.state, to = %next, "connection state");
            self.state = next;
        }
        self.render(now);
    }

    fn render(&mut self, now: Instant) {
        let label: &'static str = self.state.into();
        self.label.set(label);
        self.pulse.trigger(now, PULSE);
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn label(&self) -> &TextField {
        &self.label
    }

    pub fn is_highlighted(&self, now: Instant) -> bool {
        self.pulse.is_active_at(now)
    }
}
