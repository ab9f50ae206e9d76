//! Keyboard cursor over the entity list.
//!
//! Moving the cursor onto an entity is the terminal's pointer-enter:
//! related entities get linked, and leaving unlinks them again.

use smux_core::{Dashboard, Section};

#[derive(Debug, Default)]
pub struct Selection {
    current: Option<(Section, String)>,
}

/// Streams first, then muxes, each in arrival order.
pub fn entries(dash: &Dashboard) -> Vec<(Section, &str)> {
    let registry = dash.registry();
    registry
        .streams()
        .map(|e| (Section::Stream, e.name()))
        .chain(registry.muxes().map(|e| (Section::Mux, e.name())))
        .collect()
}

impl Selection {
    pub fn current(&self) -> Option<(Section, &str)> {
        self.current.as_ref().map(|(s, n)| (*s, n.as_str()))
    }

    pub fn is_selected(&self, section: Section, name: &str) -> bool {
        self.current() == Some((section, name))
    }

    /// Position of the cursor in [`entries`].
    pub fn index(&self, dash: &Dashboard) -> Option<usize> {
        let (section, name) = self.current()?;
        entries(dash)
            .iter()
            .position(|&(s, n)| s == section && n == name)
    }

    /// Put the cursor on the first entity once there is one.
    pub fn sync(&mut self, dash: &mut Dashboard) {
        if self.current.is_none() {
            self.move_to(dash, 0);
        }
    }

    pub fn step(&mut self, dash: &mut Dashboard, forward: bool) {
        let len = entries(dash).len();
        if len == 0 {
            return;
        }
        let target = match self.index(dash) {
            None => 0,
            Some(i) if forward => (i + 1).min(len - 1),
            Some(i) => i.saturating_sub(1),
        };
        self.move_to(dash, target);
    }

    pub fn first(&mut self, dash: &mut Dashboard) {
        self.move_to(dash, 0);
    }

    pub fn last(&mut self, dash: &mut Dashboard) {
        let len = entries(dash).len();
        self.move_to(dash, len.saturating_sub(1));
    }

    fn move_to(&mut self, dash: &mut Dashboard, index: usize) {
        let Some((section, name)) = entries(dash)
            .get(index)
            .map(|&(s, n)| (s, n.to_owned()))
        else {
            return;
        };
        if self.is_selected(section, &name) {
            return;
        }
        if let Some((old_section, old_name)) = self.current.take() {
            dash.hover(old_section, &old_name, false);
        }
        let linked = dash.hover(section, &name, true);
        tracing::debug!(%section, name = %name, ?linked, "cursor moved");
        self.current = Some((section, name));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use smux_api::StatusReport;
    use std::time::Instant;
    use tokio::sync::mpsc;

    fn dashboard() -> Dashboard {
        let (tx, _rx) = mpsc::unbounded_channel();
        let now = Instant::now();
        let mut dash = Dashboard::new(tx, now);
        let report: StatusReport = serde_json::from_value(json!({
            "strs": [{"name": "gps1"}, {"name": "tcp1"}],
            "muxs": [{"name": "gps1-tcp1", "src": "gps1", "dst": "tcp1"}]
        }))
        .unwrap();
        dash.apply_status(&report, now);
        dash
    }

    fn linked(dash: &Dashboard) -> Vec<&str> {
        dash.registry()
            .iter()
            .filter(|e| e.is_linked())
            .map(|e| e.name())
            .collect()
    }

    #[test]
    fn sync_selects_first_stream() {
        let mut dash = dashboard();
        let mut sel = Selection::default();
        sel.sync(&mut dash);
        assert_eq!(sel.current(), Some((Section::Stream, "gps1")));
        assert_eq!(linked(&dash), vec!["gps1-tcp1"]);
    }

    #[test]
    fn moving_relinks() {
        let mut dash = dashboard();
        let mut sel = Selection::default();
        sel.sync(&mut dash);
        sel.last(&mut dash);
        assert_eq!(sel.current(), Some((Section::Mux, "gps1-tcp1")));
        assert_eq!(linked(&dash), vec!["gps1", "tcp1"]);

        sel.step(&mut dash, false);
        assert_eq!(sel.current(), Some((Section::Stream, "tcp1")));
        assert_eq!(linked(&dash), vec!["gps1-tcp1"]);
    }

    #[test]
    fn step_stops_at_ends() {
        let mut dash = dashboard();
        let mut sel = Selection::default();
        sel.first(&mut dash);
        sel.step(&mut dash, false);
        assert_eq!(sel.index(&dash), Some(0));
        sel.last(&mut dash);
        sel.step(&mut dash, true);
        assert_eq!(sel.index(&dash), Some(2));
    }

    #[test]
    fn empty_dashboard_has_no_cursor() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut dash = Dashboard::new(tx, Instant::now());
        let mut sel = Selection::default();
        sel.sync(&mut dash);
        sel.step(&mut dash, true);
        assert_eq!(sel.current(), None);
    }
}
