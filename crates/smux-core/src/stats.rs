//! Per-entity statistics table.
//!
//! A [`StatsView`] shows the two counter sets of an entity (endpoint A and
//! endpoint B) either as absolute values or relative to a baseline pair
//! captured when relative mode was switched on.

use smux_api::{StatsField, StatsSnapshot};
use strum::IntoEnumIterator;

use crate::display::{Flag, TextField};
use crate::fmt::fmt_num;

/// Counter sets for endpoint A (`[0]`) and endpoint B (`[1]`).
pub type StatsPair = [StatsSnapshot; 2];

/// Reference point for relative display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Baseline {
    #[default]
    Unset,
    Captured(StatsPair),
}

/// One displayed counter row.
#[derive(Debug, Clone)]
pub struct StatsRow {
    pub field: StatsField,
    pub a: TextField,
    pub b: TextField,
    /// Both displayed values are zero.
    pub dim: Flag,
}

/// Absolute or relative presentation of an entity's counters.
#[derive(Debug, Clone)]
pub struct StatsView {
    rows: Vec<StatsRow>,
    current: Option<StatsPair>,
    baseline: Baseline,
    relative: bool,
}

impl Default for StatsView {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsView {
    pub fn new() -> Self {
        let rows = StatsField::iter()
            .map(|field| StatsRow {
                field,
                a: TextField::new(),
                b: TextField::new(),
                dim: Flag::default(),
            })
            .collect();
        Self {
            rows,
            current: None,
            baseline: Baseline::Unset,
            relative: false,
        }
    }

    /// Store a new snapshot pair and re-render every row.
    ///
    /// The baseline is left alone, except when relative mode was switched
    /// on before any snapshot existed: then this first pair becomes it.
    pub fn update(&mut self, stats: StatsPair) {
        if self.relative && self.baseline == Baseline::Unset {
            self.baseline = Baseline::Captured(stats);
        }
        self.current = Some(stats);
        self.render();
    }

    /// Switch relative mode. Off→on captures the current pair, on→off drops the baseline.
    pub fn set_relative(&mut self, active: bool) {
        if self.relative == active {
            return;
        }
        tracing::debug!(active, "stats relative mode");
        self.relative = active;
        self.baseline = match (active, self.current) {
            (true, Some(current)) => Baseline::Captured(current),
            _ => Baseline::Unset,
        };
        if self.current.is_some() {
            self.render();
        }
    }

    /// Displayed value of one counter for endpoint `ix`.
    ///
    /// Signed: a counter that restarted below its baseline shows negative.
    pub fn value(&self, field: StatsField, ix: usize) -> i128 {
        let Some(current) = self.current.as_ref().and_then(|c| c.get(ix)) else {
            return 0;
        };
        let now = i128::from(current.get(field));
        match (&self.baseline, self.relative) {
            (Baseline::Captured(base), true) => {
                now - base.get(ix).map_or(0, |b| i128::from(b.get(field)))
            }
            _ => now,
        }
    }

    fn render(&mut self) {
        let values: Vec<(i128, i128)> = self
            .rows
            .iter()
            .map(|row| (self.value(row.field, 0), self.value(row.field, 1)))
            .collect();
        for (row, (a, b)) in self.rows.iter_mut().zip(values) {
            row.a.set(&fmt_num(a));
            row.b.set(&fmt_num(b));
            row.dim.set(a == 0 && b == 0);
        }
    }

    pub fn rows(&self) -> &[StatsRow] {
        &self.rows
    }

    pub fn row(&self, field: StatsField) -> Option<&StatsRow> {
        self.rows.iter().find(|r| r.field == field)
    }

    pub fn is_relative(&self) -> bool {
        self.relative
    }
}
