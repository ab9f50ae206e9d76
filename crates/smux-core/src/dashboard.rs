//! Top-level dashboard state.
//!
//! [`Dashboard`] composes the connection controller, the entity registry,
//! the process panel and the version banner. It is a plain `&mut self`
//! state machine: the frontend feeds it inbound frames, user input and
//! clock ticks, one at a time, and reads the display model back.

use std::time::Instant;

use smux_api::{ApiMessage, CtrlCommand, StatusReport, VersionInfo};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::action::ToggleAction;
use crate::connection::{ConnectionController, ConnectionState};
use crate::display::TextField;
use crate::entity::EntityStatus;
use crate::error::CoreError;
use crate::process::ProcessView;
use crate::registry::{Registry, Section};

/// What an inbound frame did to the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Unparseable, or an `api` this dashboard does not handle.
    Ignored,
    /// Status snapshot applied; `created` entities were new.
    Status { created: usize },
    /// Control confirmation; `matched` is `false` for unknown names.
    Ctrl { name: String, matched: bool },
}

/// Format the footer banner.
pub fn banner_text(info: &VersionInfo) -> String {
    format!(
        "Version: {}, {}, {}",
        info.version, info.copyright, info.license
    )
}

#[derive(Debug)]
pub struct Dashboard {
    connection: ConnectionController,
    registry: Registry,
    process: ProcessView,
    banner: TextField,
    all_details: ToggleAction,
    all_relative: ToggleAction,
}

impl Dashboard {
    /// Build an empty dashboard whose control commands go to `outbound`.
    pub fn new(outbound: mpsc::UnboundedSender<ApiMessage>, now: Instant) -> Self {
        Self {
            connection: ConnectionController::new(outbound, now),
            registry: Registry::new(),
            process: ProcessView::new(),
            banner: TextField::new(),
            all_details: ToggleAction::new(),
            all_relative: ToggleAction::new(),
        }
    }

    // ── Session events ──────────────────────────────────────────────

    pub fn on_open(&mut self, now: Instant) {
        self.connection.on_open(now);
    }

    pub fn on_closed(&self, reason: Option<&str>) {
        self.connection.on_closed(reason);
    }

    /// Handle one inbound text frame, in delivery order.
    pub fn handle_message(&mut self, text: &str, now: Instant) -> Dispatch {
        match self.connection.receive(text, now) {
            Some(ApiMessage::Status(report)) => {
                let created = self.apply_status(&report, now);
                Dispatch::Status { created }
            }
            Some(ApiMessage::Ctrl { data }) => {
                let matched = self.apply_ctrl(&data, now);
                Dispatch::Ctrl {
                    name: data.0,
                    matched,
                }
            }
            Some(ApiMessage::Version(_)) | None => Dispatch::Ignored,
        }
    }

    /// Reconcile a full snapshot. The only place entities are created.
    pub fn apply_status(&mut self, report: &StatusReport, now: Instant) -> usize {
        let mut created = 0;
        for status in &report.strs {
            created += usize::from(self.registry.upsert_stream(status, now));
        }
        for status in &report.muxs {
            created += usize::from(self.registry.upsert_mux(status, now));
        }
        self.process.update(&report.proc);
        if created > 0 {
            info!(created, total = self.registry.len(), "new entities");
        }
        created
    }

    /// Apply a control confirmation. Unknown names are ignored.
    pub fn apply_ctrl(&mut self, cmd: &CtrlCommand, now: Instant) -> bool {
        match self.registry.get_mut(cmd.name()) {
            Some(entity) => {
                entity.update_ena(cmd.ena(), now);
                true
            }
            None => {
                debug!(name = cmd.name(), "confirmation for unknown entity");
                false
            }
        }
    }

    // ── Version banner ──────────────────────────────────────────────

    pub fn set_version(&mut self, info: &VersionInfo) {
        self.banner.set(&banner_text(info));
    }

    /// The version fetch failed. The banner stays as it is.
    pub fn version_failed(&self, err: &CoreError) {
        warn!(error = %err, "version fetch failed");
    }

    // ── User input ──────────────────────────────────────────────────

    /// Click on an entity's endpoint control. Returns `true` if a command was sent.
    pub fn click_onoff(&mut self, section: Section, name: &str, ix: usize) -> Result<bool, CoreError> {
        let entity = self
            .registry
            .get_in_mut(section, name)
            .ok_or_else(|| CoreError::UnknownEntity { name: name.to_owned() })?;
        let Some(cmd) = entity.click_onoff(ix) else {
            return Ok(false);
        };
        if let Err(err) = self.connection.send_ctrl(cmd) {
            // No confirmation can arrive for a command that was never sent.
            entity.set_blocked(false);
            return Err(err);
        }
        Ok(true)
    }

    pub fn toggle_details(&mut self, section: Section, name: &str) -> Option<bool> {
        self.registry
            .get_in_mut(section, name)
            .map(EntityStatus::toggle_details)
    }

    pub fn toggle_relative(&mut self, section: Section, name: &str) -> Option<bool> {
        self.registry
            .get_in_mut(section, name)
            .map(EntityStatus::toggle_relative)
    }

    pub fn hover(&mut self, section: Section, name: &str, enter: bool) -> Vec<String> {
        self.registry.hover(section, name, enter)
    }

    /// Flip "all details" and apply it to every entity.
    pub fn toggle_all_details(&mut self) -> bool {
        let state = self.all_details.click();
        debug!(state, "all details");
        for entity in self.registry.iter_mut() {
            entity.set_details(state);
        }
        state
    }

    /// Flip "all relative" and apply it to every entity.
    pub fn toggle_all_relative(&mut self) -> bool {
        let state = self.all_relative.click();
        debug!(state, "all relative");
        for entity in self.registry.iter_mut() {
            entity.set_relative(state);
        }
        state
    }

    /// Fire expired timers. Returns `true` if the display changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let label = self.connection.tick(now);
        let entities = self.registry.tick(now);
        label || entities
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn connection(&self) -> &ConnectionController {
        &self.connection
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn process(&self) -> &ProcessView {
        &self.process
    }

    pub fn banner(&self) -> &TextField {
        &self.banner
    }

    pub fn all_details(&self) -> bool {
        self.all_details.state()
    }

    pub fn all_relative(&self) -> bool {
        self.all_relative.state()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dashboard() -> (Dashboard, mpsc::UnboundedReceiver<ApiMessage>, Instant) {
        let (tx, rx) = mpsc::unbounded_channel();
        let now = Instant::now();
        (Dashboard::new(tx, now), rx, now)
    }

    const STATUS: &str = r#"{"api":"status",
        "strs":[{"name":"gps1","can":[true,true],"ena":[false,true]},
                {"name":"tcp1","can":[true,true],"ena":[true,true]}],
        "muxs":[{"name":"m1","src":"gps1","dst":"tcp1","can":[true,true]}],
        "proc":{"pid":1,"time":"20250102T030405Z","uptime":"1s"}}"#;

    #[test]
    fn banner_format() {
        let (mut d, _rx, _) = dashboard();
        assert_eq!(d.banner().text(), "");
        d.set_version(&VersionInfo {
            version: "2.0.1".into(),
            copyright: "(c) smux".into(),
            license: "GPL-3.0".into(),
        });
        assert_eq!(d.banner().text(), "Version: 2.0.1, (c) smux, GPL-3.0");
    }

    #[test]
    fn failed_version_leaves_banner_blank() {
        let (d, _rx, _) = dashboard();
        d.version_failed(&CoreError::Timeout { timeout_ms: 2500 });
        assert_eq!(d.banner().text(), "");
    }

    #[test]
    fn status_populates_registry_and_process() {
        let (mut d, _rx, t0) = dashboard();
        assert_eq!(d.handle_message(STATUS, t0), Dispatch::Status { created: 3 });
        assert_eq!(d.handle_message(STATUS, t0), Dispatch::Status { created: 0 });
        assert_eq!(d.registry().len(), 3);
        assert_eq!(d.process().time.text(), "2025-01-02 03:04:05 UTC");
        assert_eq!(d.state(), ConnectionState::Connected);
    }

    #[test]
    fn click_sends_and_blocks() {
        let (mut d, mut rx, t0) = dashboard();
        d.handle_message(STATUS, t0);
        assert!(d.click_onoff(Section::Stream, "gps1", 0).unwrap());
        let sent = rx.try_recv().unwrap();
        assert_eq!(sent, ApiMessage::ctrl(CtrlCommand("gps1".into(), Some(true), None)));
        assert!(d.registry().get("gps1").unwrap().is_blocked());

        // Blocked: second click sends nothing.
        assert!(!d.click_onoff(Section::Stream, "gps1", 1).unwrap());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn failed_send_unblocks_entity() {
        let (mut d, rx, t0) = dashboard();
        d.handle_message(STATUS, t0);
        drop(rx);
        let err = d.click_onoff(Section::Stream, "gps1", 0).unwrap_err();
        assert!(matches!(err, CoreError::ChannelClosed));
        assert!(!d.registry().get("gps1").unwrap().is_blocked());
    }

    #[test]
    fn click_unknown_entity_errors() {
        let (mut d, _rx, _) = dashboard();
        let err = d.click_onoff(Section::Mux, "ghost", 0).unwrap_err();
        assert!(matches!(err, CoreError::UnknownEntity { .. }));
    }

    #[test]
    fn unknown_confirmation_is_ignored() {
        let (mut d, _rx, t0) = dashboard();
        d.handle_message(STATUS, t0);
        let out = d.handle_message(r#"{"api":"ctrl","data":["ghost",true,true]}"#, t0);
        assert_eq!(out, Dispatch::Ctrl { name: "ghost".into(), matched: false });
        assert_eq!(d.registry().len(), 3);
    }

    #[test]
    fn toggle_all_fans_out() {
        let (mut d, _rx, t0) = dashboard();
        d.handle_message(STATUS, t0);
        assert!(d.toggle_all_details());
        assert!(d.registry().iter().all(EntityStatus::details_shown));
        assert!(d.toggle_all_relative());
        assert!(d.registry().iter().all(EntityStatus::is_relative));
        assert!(!d.toggle_all_relative());
        assert!(d.registry().iter().all(|e| !e.is_relative()));
    }

    #[test]
    fn single_toggle_does_not_touch_others() {
        let (mut d, _rx, t0) = dashboard();
        d.handle_message(STATUS, t0);
        assert_eq!(d.toggle_details(Section::Mux, "m1"), Some(true));
        assert!(!d.registry().get("gps1").unwrap().details_shown());
        assert_eq!(d.toggle_relative(Section::Stream, "nope"), None);
    }
}
