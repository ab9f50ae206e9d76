//! Live entity sync and presentation-state engine for the streammux dashboard.
//!
//! This crate sits between `smux-api` (wire types, transports) and a
//! frontend (the `smux-tui` terminal dashboard). It owns no I/O: frames go
//! in as text, control commands come out through an `mpsc` channel, and
//! everything the user sees is held in a retained display model.
//!
//! - **[`Dashboard`]**: composition root. Feeds inbound frames to the
//!   [`ConnectionController`], reconciles status snapshots into the
//!   [`Registry`], drives the broadcast "all details" / "all relative"
//!   toggles and holds the version banner.
//!
//! - **[`Registry`]**: name → [`EntityStatus`] maps for streams and muxes in
//!   first-seen order, plus link highlighting between a mux and its streams.
//!
//! - **[`EntityStatus`]**: one stream or mux: descriptive fields, a
//!   [`StatsView`], two [`OnOffAction`]s and the input blocker used while a
//!   control request waits for confirmation.
//!
//! - **Display model** ([`display`]): [`TextField`](display::TextField)
//!   drops writes that would not change the text; [`Flag`](display::Flag)
//!   and [`Pulse`](display::Pulse) carry visual toggles.
//!
//! Timers (blink pause, label highlight) are explicit deadlines fired by
//! [`Dashboard::tick`].

pub mod action;
pub mod connection;
pub mod dashboard;
pub mod display;
pub mod entity;
pub mod error;
pub mod fmt;
pub mod process;
pub mod registry;
pub mod stats;

// ── Primary re-exports ──────────────────────────────────────────────
pub use action::{Blink, OnOffAction, OnOffState, ToggleAction};
pub use connection::{ConnectionController, ConnectionState};
pub use dashboard::{Dashboard, Dispatch};
pub use entity::{EntityKind, EntityStatus, Payload};
pub use error::CoreError;
pub use process::ProcessView;
pub use registry::{Registry, Section};
pub use stats::{StatsPair, StatsView};
