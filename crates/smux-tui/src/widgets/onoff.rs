//! Endpoint switch indicator: ●/○/· with blink.

use std::time::Instant;

use ratatui::style::Style;
use ratatui::text::Span;
use smux_core::{OnOffAction, OnOffState};

use crate::theme;

/// Symbol and color for an endpoint switch at `now`.
///
/// An enabled endpoint that is passing traffic alternates between the lit
/// and the hollow symbol at its blink rate.
pub fn onoff_span(action: &OnOffAction, now: Instant) -> Span<'static> {
    let (symbol, color) = match action.state() {
        OnOffState::On if action.is_lit(now) => ("●", theme::SUCCESS_GREEN),
        OnOffState::On => ("○", theme::SUCCESS_GREEN),
        OnOffState::Off => ("○", theme::ERROR_RED),
        OnOffState::Disabled => ("·", theme::BORDER_GRAY),
    };
    Span::styled(symbol, Style::default().fg(color))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_map_to_symbols() {
        let now = Instant::now();
        let mut action = OnOffAction::new();
        assert_eq!(onoff_span(&action, now).content, "·");

        action.update(true, false, 0, now);
        assert_eq!(onoff_span(&action, now).content, "○");

        action.update(true, true, 0, now);
        assert_eq!(onoff_span(&action, now).content, "●");
    }
}
