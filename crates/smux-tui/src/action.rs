//! Everything that can change app state, from any source.

use smux_api::{VersionInfo, WsEvent};
use smux_core::CoreError;

#[derive(Debug)]
pub enum Action {
    // ── Session ──────────────────────────────────────────────────────
    /// Lifecycle event or text frame from the `/ws` session.
    Session(WsEvent),
    /// Outcome of the one-shot `GET /version`.
    Version(Result<VersionInfo, CoreError>),

    // ── Navigation ───────────────────────────────────────────────────
    SelectNext,
    SelectPrev,
    SelectFirst,
    SelectLast,

    // ── Entity controls ──────────────────────────────────────────────
    /// Endpoint switch of the selected entity (`0` = A, `1` = B).
    ClickOnOff(usize),
    ToggleDetails,
    ToggleRelative,
    ToggleAllDetails,
    ToggleAllRelative,

    // ── System ───────────────────────────────────────────────────────
    ToggleHelp,
    Tick,
    Render,
    Quit,
}
