//! Retained display model.
//!
//! The engine never talks to a renderer directly. It writes into
//! [`TextField`]s and [`Flag`]s which a frontend reads on every frame.
//! Writes that would not change the visible text are dropped, and each
//! primitive counts its effective writes so tests can assert that
//! repeated identical updates cause no churn.

use std::time::{Duration, Instant};

/// One displayed text value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    text: String,
    writes: u64,
}

impl TextField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the text. Returns `true` if the visible text changed.
    pub fn set(&mut self, text: &str) -> bool {
        if self.text == text {
            return false;
        }
        text.clone_into(&mut self.text);
        self.writes += 1;
        true
    }

    /// Display a list as newline-joined lines.
    pub fn set_lines(&mut self, lines: &[String]) -> bool {
        self.set(&lines.join("\n"))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of effective writes since creation.
    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl std::fmt::Display for TextField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.text)
    }
}

/// A named boolean visual state (dim, blocked, linked, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flag {
    on: bool,
    toggles: u64,
}

impl Flag {
    pub fn new(on: bool) -> Self {
        Self { on, toggles: 0 }
    }

    /// Returns `true` if the state flipped.
    pub fn set(&mut self, on: bool) -> bool {
        if self.on == on {
            return false;
        }
        self.on = on;
        self.toggles += 1;
        true
    }

    pub fn is_on(self) -> bool {
        self.on
    }

    /// Number of effective flips since creation.
    pub fn toggles(self) -> u64 {
        self.toggles
    }
}

/// A flag that switches itself off once its deadline passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pulse {
    until: Option<Instant>,
}

impl Pulse {
    /// Light up for `duration` from `now`, restarting any running pulse.
    pub fn trigger(&mut self, now: Instant, duration: Duration) {
        self.until = Some(now + duration);
    }

    /// Expire the pulse. Returns `true` if it just went dark.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.until {
            Some(until) if now >= until => {
                self.until = None;
                true
            }
            _ => false,
        }
    }

    /// Lit at `now`, whether or not `tick` has run since the deadline.
    pub fn is_active_at(self, now: Instant) -> bool {
        self.until.is_some_and(|until| now < until)
    }
}
