//! # flashboard-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `PageDom`: element lookup, inline style and attribute writes, control mounting
//!   - `FieldStore`: per-user extension field reads and writes
//!   - `Timer`: fixed delays for re-checks and retries
//!   - `HostEvents` / `Spawn`: host signal subscription and local task spawning
//! - Define **driving/inbound** use-cases:
//!   - `PresenceDetector`: is the dashboard on screen, and which one
//!   - `ToggleController`: the enabled/disabled state machine
//!   - `Lifecycle`: routes host signals to the controller
//! - Load and validate [`Settings`](settings::Settings)
//!
//! ## Dependency rule
//! Depends on `flashboard-domain` only (plus `futures-util` for combinators).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod lifecycle;
pub mod ports;
pub mod services;
pub mod settings;
