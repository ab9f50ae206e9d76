//! User-facing controls.
//!
//! - [`ToggleAction`]: two-icon boolean switch ("show details", "relative stats").
//! - [`OnOffAction`]: per-endpoint enable control. Three visual states and a
//!   blink whose speed follows the endpoint's message rate.

use std::time::{Duration, Instant};

use strum::{Display, IntoStaticStr};

// ── ToggleAction ─────────────────────────────────────────────────────

/// Binary switch. The owner applies the returned state (the bound callback).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToggleAction {
    state: bool,
}

impl ToggleAction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the icon state and hand it back for the owner to act on.
    pub fn set(&mut self, state: bool) -> bool {
        self.state = state;
        state
    }

    /// Invert. Every click counts; there is no debouncing.
    pub fn click(&mut self) -> bool {
        self.set(!self.state)
    }

    pub fn state(self) -> bool {
        self.state
    }
}

// ── OnOffAction ──────────────────────────────────────────────────────

/// How long blinking continues after the last observed message increase.
pub const BLINK_GRACE: Duration = Duration::from_millis(2500);

/// Slowest blink period (rate clamped to at least 1/s).
pub const BLINK_PERIOD_MAX: Duration = Duration::from_secs(1);

/// Fastest blink period (rate clamped to at most 20/s).
pub const BLINK_PERIOD_MIN: Duration = Duration::from_millis(50);

/// Visual state derived from `(can, ena)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum OnOffState {
    #[strum(serialize = "disabled")]
    Disabled,
    #[strum(serialize = "on")]
    On,
    #[strum(serialize = "off")]
    Off,
}

/// Blink animation state of the "on" icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blink {
    Paused,
    Running { period: Duration, since: Instant },
}

/// Blink period for a message count increase of `delta`.
///
/// Rate is `clamp(delta / 5, 1, 20)` blinks per second, so the period is
/// `5 / delta` seconds clamped to `[50 ms, 1 s]`.
pub fn blink_period(delta: u64) -> Duration {
    let max = BLINK_PERIOD_MAX.as_micros();
    let min = BLINK_PERIOD_MIN.as_micros();
    let micros = if delta == 0 {
        max
    } else {
        (5 * max / u128::from(delta)).clamp(min, max)
    };
    u64::try_from(micros).map_or(BLINK_PERIOD_MAX, Duration::from_micros)
}

/// Three-state enable control for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnOffAction {
    can: bool,
    ena: bool,
    n_msgs: Option<u64>,
    blink: Blink,
    pause_at: Option<Instant>,
}

impl Default for OnOffAction {
    fn default() -> Self {
        Self::new()
    }
}

impl OnOffAction {
    pub fn new() -> Self {
        Self {
            can: false,
            ena: false,
            n_msgs: None,
            blink: Blink::Paused,
            pause_at: None,
        }
    }

    /// Apply capability, enablement and the endpoint's current message count.
    ///
    /// A count above the previous one (re)starts blinking at a rate matching
    /// the increase and pushes the pause deadline out by [`BLINK_GRACE`].
    /// Otherwise the pending deadline is left to fire in [`tick`](Self::tick).
    pub fn update(&mut self, can: bool, ena: bool, n_msgs: u64, now: Instant) {
        self.can = can;
        self.ena = ena;

        let delta = match self.n_msgs {
            Some(prev) if n_msgs > prev => n_msgs - prev,
            _ => 0,
        };
        self.n_msgs = Some(n_msgs);
        if delta == 0 {
            return;
        }

        let period = blink_period(delta);
        self.blink = match self.blink {
            Blink::Running { since, period: p } if p == period => Blink::Running { period, since },
            _ => Blink::Running { period, since: now },
        };
        self.pause_at = Some(now + BLINK_GRACE);
    }

    /// Pause blinking once the grace deadline passed. Returns `true` if it just paused.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.pause_at {
            Some(at) if now >= at => {
                self.pause_at = None;
                self.blink = Blink::Paused;
                true
            }
            _ => false,
        }
    }

    /// The enablement to request, or `None` if this endpoint is not controllable.
    pub fn click(&self) -> Option<bool> {
        self.can.then_some(!self.ena)
    }

    pub fn state(&self) -> OnOffState {
        match (self.can, self.ena) {
            (false, _) => OnOffState::Disabled,
            (true, true) => OnOffState::On,
            (true, false) => OnOffState::Off,
        }
    }

    pub fn can(&self) -> bool {
        self.can
    }

    pub fn ena(&self) -> bool {
        self.ena
    }

    /// Last message count fed in, if any.
    pub fn n_msgs(&self) -> Option<u64> {
        self.n_msgs
    }

    pub fn blink(&self) -> Blink {
        self.blink
    }

    pub fn pause_deadline(&self) -> Option<Instant> {
        self.pause_at
    }

    /// Whether the "on" icon is in the lit half of its blink cycle at `now`.
    pub fn is_lit(&self, now: Instant) -> bool {
        match self.blink {
            Blink::Paused => true,
            Blink::Running { period, since } => {
                let half = period.as_micros() / 2;
                if half == 0 {
                    return true;
                }
                (now.saturating_duration_since(since).as_micros() / half) % 2 == 0
            }
        }
    }
}
