// ── Entity registry and link highlighting ──
//
// Streams and muxes live in two insertion-ordered maps keyed by name.
// Entries are only ever created by snapshot reconciliation and are never
// evicted: the server does not retire entities mid-session.

use std::time::Instant;

use indexmap::IndexMap;
use smux_api::{MuxStatus, StreamStatus};
use strum::{Display, EnumIter};
use tracing::debug;

use crate::entity::{EntityStatus, Payload};

/// Which of the two entity lists an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Section {
    #[strum(serialize = "stream")]
    Stream,
    #[strum(serialize = "mux")]
    Mux,
}

/// Name → entity mapping for the whole dashboard.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    streams: IndexMap<String, EntityStatus>,
    muxes: IndexMap<String, EntityStatus>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or update a stream. Returns `true` if it was new.
    pub fn upsert_stream(&mut self, status: &StreamStatus, now: Instant) -> bool {
        Self::upsert(&mut self.streams, Payload::Stream(status), now)
    }

    /// Create or update a mux. Returns `true` if it was new.
    pub fn upsert_mux(&mut self, status: &MuxStatus, now: Instant) -> bool {
        Self::upsert(&mut self.muxes, Payload::Mux(status), now)
    }

    fn upsert(map: &mut IndexMap<String, EntityStatus>, payload: Payload<'_>, now: Instant) -> bool {
        if let Some(entity) = map.get_mut(payload.name()) {
            entity.update_status(payload, now);
            return false;
        }
        debug!(name = payload.name(), "new entity");
        map.insert(payload.name().to_owned(), EntityStatus::new(payload, now));
        true
    }

    // ── Lookup ──────────────────────────────────────────────────────

    /// Look a name up in streams first, then muxes.
    pub fn get(&self, name: &str) -> Option<&EntityStatus> {
        self.streams.get(name).or_else(|| self.muxes.get(name))
    }

    /// Mutable [`get`](Self::get).
    pub fn get_mut(&mut self, name: &str) -> Option<&mut EntityStatus> {
        match self.streams.get_mut(name) {
            Some(entity) => Some(entity),
            None => self.muxes.get_mut(name),
        }
    }

    pub fn get_in(&self, section: Section, name: &str) -> Option<&EntityStatus> {
        self.section(section).get(name)
    }

    pub fn get_in_mut(&mut self, section: Section, name: &str) -> Option<&mut EntityStatus> {
        match section {
            Section::Stream => self.streams.get_mut(name),
            Section::Mux => self.muxes.get_mut(name),
        }
    }

    fn section(&self, section: Section) -> &IndexMap<String, EntityStatus> {
        match section {
            Section::Stream => &self.streams,
            Section::Mux => &self.muxes,
        }
    }

    /// Streams in first-seen order.
    pub fn streams(&self) -> impl Iterator<Item = &EntityStatus> {
        self.streams.values()
    }

    /// Muxes in first-seen order.
    pub fn muxes(&self) -> impl Iterator<Item = &EntityStatus> {
        self.muxes.values()
    }

    /// Every entity, streams first.
    pub fn iter(&self) -> impl Iterator<Item = &EntityStatus> {
        self.streams.values().chain(self.muxes.values())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut EntityStatus> {
        self.streams.values_mut().chain(self.muxes.values_mut())
    }

    pub fn len(&self) -> usize {
        self.streams.len() + self.muxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty() && self.muxes.is_empty()
    }

    // ── Linking ─────────────────────────────────────────────────────

    /// Pointer entered (`true`) or left (`false`) an entity.
    ///
    /// Marks the entities of the other kind that are linked to it: for a
    /// mux, the streams named by its source and destination; for a stream,
    /// every mux routing from or to it. Returns the names touched.
    pub fn hover(&mut self, section: Section, name: &str, enter: bool) -> Vec<String> {
        debug!(%section, name, enter, "hover");
        let mut touched = Vec::new();
        match section {
            Section::Mux => {
                let Some((src, dst)) = self
                    .muxes
                    .get(name)
                    .and_then(EntityStatus::route)
                    .map(|(s, d)| (s.to_owned(), d.to_owned()))
                else {
                    return touched;
                };
                for stream in self.streams.values_mut() {
                    if stream.name() == src || stream.name() == dst {
                        stream.set_linked(enter);
                        touched.push(stream.name().to_owned());
                    }
                }
            }
            Section::Stream => {
                if !self.streams.contains_key(name) {
                    return touched;
                }
                for mux in self.muxes.values_mut() {
                    let linked = mux.route().is_some_and(|(s, d)| s == name || d == name);
                    if linked {
                        mux.set_linked(enter);
                        touched.push(mux.name().to_owned());
                    }
                }
            }
        }
        touched
    }

    /// Advance timers on every entity. Returns `true` if anything changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for entity in self.iter_mut() {
            changed |= entity.tick(now);
        }
        changed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stream(name: &str) -> StreamStatus {
        StreamStatus {
            name: name.into(),
            kind: "tcpcli".into(),
            state: "connected".into(),
            ..StreamStatus::default()
        }
    }

    fn mux(name: &str, src: &str, dst: &str) -> MuxStatus {
        MuxStatus {
            name: name.into(),
            src: src.into(),
            dst: dst.into(),
            ..MuxStatus::default()
        }
    }

    fn populated() -> Registry {
        let now = Instant::now();
        let mut reg = Registry::new();
        for name in ["gps1", "tcp1", "file1"] {
            reg.upsert_stream(&stream(name), now);
        }
        reg.upsert_mux(&mux("m1", "gps1", "tcp1"), now);
        reg.upsert_mux(&mux("m2", "gps1", "file1"), now);
        reg.upsert_mux(&mux("m3", "tcp1", "file1"), now);
        reg
    }

    fn linked(reg: &Registry) -> Vec<&str> {
        reg.iter().filter(|e| e.is_linked()).map(EntityStatus::name).collect()
    }

    #[test]
    fn upsert_creates_once() {
        let now = Instant::now();
        let mut reg = Registry::new();
        assert!(reg.upsert_stream(&stream("gps1"), now));
        let mut changed = stream("gps1");
        changed.state = "closed".into();
        assert!(!reg.upsert_stream(&changed, now));
        assert_eq!(reg.len(), 1);
        let f = reg.get("gps1").unwrap().stream_fields().unwrap();
        assert_eq!(f.state.text(), "closed");
    }

    #[test]
    fn keeps_first_seen_order() {
        let reg = populated();
        let names: Vec<_> = reg.streams().map(EntityStatus::name).collect();
        assert_eq!(names, ["gps1", "tcp1", "file1"]);
        let names: Vec<_> = reg.muxes().map(EntityStatus::name).collect();
        assert_eq!(names, ["m1", "m2", "m3"]);
    }

    #[test]
    fn streams_shadow_muxes_on_lookup() {
        let now = Instant::now();
        let mut reg = Registry::new();
        reg.upsert_mux(&mux("same", "a", "b"), now);
        reg.upsert_stream(&stream("same"), now);
        assert!(reg.get("same").unwrap().is_stream());
        assert!(reg.get_in(Section::Mux, "same").unwrap().is_mux());
    }

    #[test]
    fn hovering_mux_marks_its_streams() {
        let mut reg = populated();
        let touched = reg.hover(Section::Mux, "m1", true);
        assert_eq!(touched, ["gps1", "tcp1"]);
        assert_eq!(linked(&reg), ["gps1", "tcp1"]);

        reg.hover(Section::Mux, "m1", false);
        assert!(linked(&reg).is_empty());
    }

    #[test]
    fn hovering_stream_marks_its_muxes() {
        let mut reg = populated();
        let touched = reg.hover(Section::Stream, "file1", true);
        assert_eq!(touched, ["m2", "m3"]);
        assert_eq!(linked(&reg), ["m2", "m3"]);
    }

    #[test]
    fn linking_is_symmetric() {
        let mut reg = populated();
        let streams: Vec<String> = reg.streams().map(|e| e.name().to_owned()).collect();
        let muxes: Vec<String> = reg.muxes().map(|e| e.name().to_owned()).collect();

        for s in &streams {
            let from_stream = reg.hover(Section::Stream, s, true);
            reg.hover(Section::Stream, s, false);
            for m in &muxes {
                let from_mux = reg.hover(Section::Mux, m, true);
                reg.hover(Section::Mux, m, false);
                assert_eq!(
                    from_stream.contains(m),
                    from_mux.contains(s),
                    "stream {s} / mux {m}"
                );
            }
        }
    }

    #[test]
    fn unknown_hover_is_inert() {
        let mut reg = populated();
        assert!(reg.hover(Section::Mux, "nope", true).is_empty());
        assert!(reg.hover(Section::Stream, "nope", true).is_empty());
        assert!(linked(&reg).is_empty());
    }
}
