//! One live stream or mux as shown on the dashboard.
//!
//! An [`EntityStatus`] is created the first time its name shows up in a
//! status snapshot and then updated in place for the rest of the session.
//! The variant (stream or mux) is fixed at creation from the array the
//! payload arrived in.

use std::time::Instant;

use smux_api::{CtrlCommand, MuxStatus, StatsSnapshot, StreamStatus};
use tracing::debug;

use crate::action::{OnOffAction, ToggleAction};
use crate::display::{Flag, TextField};
use crate::stats::StatsView;

/// Fields only streams carry.
#[derive(Debug, Clone, Default)]
pub struct StreamFields {
    pub kind: TextField,
    pub mode: TextField,
    pub state: TextField,
    pub error: TextField,
    pub opts: TextField,
    pub info: TextField,
    pub disp: TextField,
    pub statestrs: TextField,
    /// Second rendering of `statestrs` (shown in the details pane).
    pub statestrs2: TextField,
}

/// Fields only muxes carry.
#[derive(Debug, Clone, Default)]
pub struct MuxFields {
    pub src: TextField,
    pub dst: TextField,
}

/// Closed set of entity variants.
#[derive(Debug, Clone)]
pub enum EntityKind {
    Stream(StreamFields),
    Mux(MuxFields),
}

/// A status payload for either variant.
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    Stream(&'a StreamStatus),
    Mux(&'a MuxStatus),
}

impl Payload<'_> {
    pub fn name(&self) -> &str {
        match self {
            Self::Stream(s) => &s.name,
            Self::Mux(m) => &m.name,
        }
    }

    fn filter(&self) -> &[String; 2] {
        match self {
            Self::Stream(s) => &s.filter,
            Self::Mux(m) => &m.filter,
        }
    }

    fn can(&self) -> [bool; 2] {
        match self {
            Self::Stream(s) => s.can,
            Self::Mux(m) => m.can,
        }
    }

    fn ena(&self) -> [bool; 2] {
        match self {
            Self::Stream(s) => s.ena,
            Self::Mux(m) => m.ena,
        }
    }

    fn stats(&self) -> [StatsSnapshot; 2] {
        match self {
            Self::Stream(s) => s.stats,
            Self::Mux(m) => m.stats,
        }
    }
}

/// Drop the leading comma-delimited token (the stream type) from stream options.
///
/// The search for the comma starts after the first character. Without a
/// comma the options are shown whole: `"stdin"` stays `"stdin"` and does
/// not lose its first character.
pub fn strip_leading_token(opts: &str) -> &str {
    let mut chars = opts.chars();
    if chars.next().is_none() {
        return opts;
    }
    chars
        .as_str()
        .split_once(',')
        .map_or(opts, |(_, rest)| rest)
}

/// Live state of one stream or mux.
#[derive(Debug, Clone)]
pub struct EntityStatus {
    name: String,
    kind: EntityKind,
    filter: [TextField; 2],
    stats: StatsView,
    onoff: [OnOffAction; 2],
    details: ToggleAction,
    relative: ToggleAction,
    blocked: Flag,
    linked: Flag,
}

impl EntityStatus {
    /// Create from the first payload seen for this name.
    pub fn new(payload: Payload<'_>, now: Instant) -> Self {
        let kind = match payload {
            Payload::Stream(_) => EntityKind::Stream(StreamFields::default()),
            Payload::Mux(_) => EntityKind::Mux(MuxFields::default()),
        };
        let mut entity = Self {
            name: payload.name().to_owned(),
            kind,
            filter: Default::default(),
            stats: StatsView::new(),
            onoff: [OnOffAction::new(), OnOffAction::new()],
            details: ToggleAction::new(),
            relative: ToggleAction::new(),
            blocked: Flag::default(),
            linked: Flag::default(),
        };
        entity.update_status(payload, now);
        entity
    }

    /// Replace every displayed field from a full status payload.
    ///
    /// Also clears the input blocker: a fresh snapshot supersedes any
    /// control request still waiting for its confirmation.
    pub fn update_status(&mut self, payload: Payload<'_>, now: Instant) {
        match (&mut self.kind, payload) {
            (EntityKind::Stream(f), Payload::Stream(s)) => {
                f.kind.set(&s.kind);
                f.mode.set(&s.mode);
                f.state.set(&s.state);
                f.error.set(&s.error);
                f.opts.set(strip_leading_token(&s.opts));
                f.info.set(&s.info);
                f.disp.set(&s.disp);
                f.statestrs.set_lines(&s.statestrs);
                f.statestrs2.set_lines(&s.statestrs);
            }
            (EntityKind::Mux(f), Payload::Mux(m)) => {
                f.src.set(&m.src);
                f.dst.set(&m.dst);
            }
            _ => {
                debug!(name = %self.name, "status payload kind does not match entity");
                return;
            }
        }

        for (field, text) in self.filter.iter_mut().zip(payload.filter()) {
            field.set(text);
        }

        let stats = payload.stats();
        self.stats.update(stats);
        let (can, ena) = (payload.can(), payload.ena());
        for (ix, action) in self.onoff.iter_mut().enumerate() {
            let (Some(&c), Some(&e), Some(s)) = (can.get(ix), ena.get(ix), stats.get(ix)) else {
                continue;
            };
            action.update(c, e, s.n_msgs, now);
        }
        self.blocked.set(false);
    }

    /// Apply a control confirmation. `None` leaves that endpoint as it is.
    pub fn update_ena(&mut self, ena: [Option<bool>; 2], now: Instant) {
        for (action, new) in self.onoff.iter_mut().zip(ena) {
            let ena = new.unwrap_or(action.ena());
            let n_msgs = action.n_msgs().unwrap_or_default();
            action.update(action.can(), ena, n_msgs, now);
        }
        self.blocked.set(false);
    }

    pub fn set_blocked(&mut self, blocked: bool) {
        self.blocked.set(blocked);
    }

    /// Click on endpoint `ix`'s enable control.
    ///
    /// Returns the command to send if the endpoint is controllable and no
    /// other request is in flight. The entity is blocked until confirmed.
    pub fn click_onoff(&mut self, ix: usize) -> Option<CtrlCommand> {
        if self.blocked.is_on() {
            debug!(name = %self.name, ix, "click ignored while blocked");
            return None;
        }
        let new_ena = self.onoff.get(ix)?.click()?;
        debug!(name = %self.name, ix, new_ena, "toggle endpoint");
        self.blocked.set(true);
        Some(CtrlCommand::for_endpoint(self.name.clone(), ix, new_ena))
    }

    // ── Toggles ─────────────────────────────────────────────────────

    pub fn set_details(&mut self, show: bool) {
        self.details.set(show);
    }

    pub fn toggle_details(&mut self) -> bool {
        self.details.click()
    }

    pub fn set_relative(&mut self, relative: bool) {
        let state = self.relative.set(relative);
        self.stats.set_relative(state);
    }

    pub fn toggle_relative(&mut self) -> bool {
        let state = self.relative.click();
        self.stats.set_relative(state);
        state
    }

    pub fn set_linked(&mut self, linked: bool) -> bool {
        self.linked.set(linked)
    }

    /// Pause blinks whose grace period ran out. Returns `true` if anything changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for action in &mut self.onoff {
            changed |= action.tick(now);
        }
        changed
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub fn is_stream(&self) -> bool {
        matches!(self.kind, EntityKind::Stream(_))
    }

    pub fn is_mux(&self) -> bool {
        matches!(self.kind, EntityKind::Mux(_))
    }

    /// Source and destination stream names, for muxes.
    pub fn route(&self) -> Option<(&str, &str)> {
        match &self.kind {
            EntityKind::Mux(m) => Some((m.src.text(), m.dst.text())),
            EntityKind::Stream(_) => None,
        }
    }

    pub fn stream_fields(&self) -> Option<&StreamFields> {
        match &self.kind {
            EntityKind::Stream(f) => Some(f),
            EntityKind::Mux(_) => None,
        }
    }

    pub fn filter(&self, ix: usize) -> Option<&TextField> {
        self.filter.get(ix)
    }

    pub fn stats(&self) -> &StatsView {
        &self.stats
    }

    pub fn onoff(&self, ix: usize) -> Option<&OnOffAction> {
        self.onoff.get(ix)
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked.is_on()
    }

    pub fn is_linked(&self) -> bool {
        self.linked.is_on()
    }

    pub fn details_shown(&self) -> bool {
        self.details.state()
    }

    pub fn is_relative(&self) -> bool {
        self.relative.state()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::action::OnOffState;
    use pretty_assertions::assert_eq;
    use smux_api::StatsField;

    fn stream(state: &str, n_msgs: u64) -> StreamStatus {
        StreamStatus {
            name: "gps1".into(),
            kind: "serial".into(),
            mode: "RW".into(),
            state: state.into(),
            opts: "serial,/dev/ttyUSB0:115200".into(),
            statestrs: vec!["connected".into(), "connecting".into()],
            filter: [String::new(), "UBX-NAV-*".into()],
            can: [true, true],
            ena: [true, false],
            stats: [
                StatsSnapshot { n_msgs, ..StatsSnapshot::default() },
                StatsSnapshot::default(),
            ],
            ..StreamStatus::default()
        }
    }

    fn mux() -> MuxStatus {
        MuxStatus {
            name: "mux1".into(),
            src: "gps1".into(),
            dst: "tcp1".into(),
            can: [true, false],
            ena: [true, true],
            ..MuxStatus::default()
        }
    }

    #[test]
    fn strips_stream_type_from_opts() {
        assert_eq!(strip_leading_token("serial,/dev/ttyUSB0:115200"), "/dev/ttyUSB0:115200");
        assert_eq!(strip_leading_token("tcpcli,host:1234,retry"), "host:1234,retry");
        assert_eq!(strip_leading_token(",x,y"), "y");
        assert_eq!(strip_leading_token("stdin"), "stdin");
        assert_eq!(strip_leading_token(""), "");
    }

    #[test]
    fn stream_fields_are_rendered() {
        let e = EntityStatus::new(Payload::Stream(&stream("connected", 3)), Instant::now());
        let f = e.stream_fields().unwrap();
        assert_eq!(f.kind.text(), "serial");
        assert_eq!(f.opts.text(), "/dev/ttyUSB0:115200");
        assert_eq!(f.statestrs.text(), "connected\nconnecting");
        assert_eq!(f.statestrs2.text(), f.statestrs.text());
        assert_eq!(e.filter(1).unwrap().text(), "UBX-NAV-*");
        assert_eq!(e.onoff(0).unwrap().state(), OnOffState::On);
        assert_eq!(e.onoff(1).unwrap().state(), OnOffState::Off);
        assert_eq!(e.route(), None);
    }

    #[test]
    fn mux_route() {
        let e = EntityStatus::new(Payload::Mux(&mux()), Instant::now());
        assert!(e.is_mux());
        assert_eq!(e.route(), Some(("gps1", "tcp1")));
        assert_eq!(e.onoff(1).unwrap().state(), OnOffState::Disabled);
    }

    #[test]
    fn identical_update_writes_nothing() {
        let now = Instant::now();
        let payload = stream("connected", 3);
        let mut e = EntityStatus::new(Payload::Stream(&payload), now);
        let f = e.stream_fields().unwrap();
        let before = (f.state.writes(), f.opts.writes(), f.statestrs.writes());
        let dim = e.stats().row(StatsField::NMsgs).unwrap().dim.toggles();

        e.update_status(Payload::Stream(&payload), now);
        let f = e.stream_fields().unwrap();
        assert_eq!(before, (f.state.writes(), f.opts.writes(), f.statestrs.writes()));
        assert_eq!(dim, e.stats().row(StatsField::NMsgs).unwrap().dim.toggles());
    }

    #[test]
    fn click_blocks_and_builds_command() {
        let mut e = EntityStatus::new(Payload::Stream(&stream("connected", 3)), Instant::now());
        let cmd = e.click_onoff(1).unwrap();
        assert_eq!(cmd, CtrlCommand("gps1".into(), None, Some(true)));
        assert!(e.is_blocked());

        // Re-entrant clicks are swallowed until confirmed.
        assert_eq!(e.click_onoff(0), None);
    }

    #[test]
    fn click_on_uncontrollable_endpoint_is_noop() {
        let mut e = EntityStatus::new(Payload::Mux(&mux()), Instant::now());
        assert_eq!(e.click_onoff(1), None);
        assert!(!e.is_blocked());
        assert_eq!(e.click_onoff(7), None);
    }

    #[test]
    fn update_ena_clears_blocker() {
        let now = Instant::now();
        let mut e = EntityStatus::new(Payload::Stream(&stream("connected", 3)), now);
        for prior in [[true, true], [false, false]] {
            e.update_ena([Some(prior[0]), Some(prior[1])], now);
            e.set_blocked(true);
            e.update_ena([Some(false), Some(true)], now);
            assert!(!e.is_blocked());
            assert!(!e.onoff(0).unwrap().ena());
            assert!(e.onoff(1).unwrap().ena());
        }
    }

    #[test]
    fn update_ena_none_keeps_endpoint() {
        let now = Instant::now();
        let mut e = EntityStatus::new(Payload::Stream(&stream("connected", 3)), now);
        e.update_ena([Some(false), None], now);
        assert!(!e.onoff(0).unwrap().ena());
        assert!(!e.onoff(1).unwrap().ena());
        assert_eq!(e.onoff(0).unwrap().n_msgs(), Some(3));
    }

    #[test]
    fn full_update_clears_blocker() {
        let now = Instant::now();
        let mut e = EntityStatus::new(Payload::Stream(&stream("connected", 3)), now);
        e.click_onoff(0).unwrap();
        e.update_status(Payload::Stream(&stream("connected", 4)), now);
        assert!(!e.is_blocked());
    }

    #[test]
    fn relative_toggle_drives_stats() {
        let now = Instant::now();
        let mut e = EntityStatus::new(Payload::Stream(&stream("connected", 10)), now);
        assert!(e.toggle_relative());
        e.update_status(Payload::Stream(&stream("connected", 25)), now);
        assert_eq!(e.stats().value(StatsField::NMsgs, 0), 15);
        e.set_relative(false);
        assert_eq!(e.stats().value(StatsField::NMsgs, 0), 25);
    }

    #[test]
    fn mismatched_payload_is_ignored() {
        let now = Instant::now();
        let mut e = EntityStatus::new(Payload::Mux(&mux()), now);
        e.update_status(Payload::Stream(&stream("x", 1)), now);
        assert_eq!(e.route(), Some(("gps1", "tcp1")));
    }
}
