//! # flashboard-adapter-memory
//!
//! Headless host for flashboard: everything the browser adapter talks to,
//! kept in memory.
//!
//! | Piece | Port | Notes |
//! |-------|------|-------|
//! | [`MemoryPage`] | `PageDom` | Element tree with inline styles; counts mutations |
//! | [`MemoryFieldStore`] | `FieldStore` | Counts calls; can be told to fail |
//! | [`MemoryHostEvents`] | `HostEvents` | Fire `ready` / `reloaded` / activations by hand |
//! | [`TokioTimer`] | `Timer` | `tokio::time::sleep`, so paused-clock tests run instantly |
//! | [`LocalSpawner`] | `Spawn` | `tokio::task::spawn_local`; needs a `LocalSet` |
//!
//! [`fixture`] renders the markup of the hosted dashboard view.
//!
//! ## Dependency rule
//!
//! Depends on `flashboard-app` (port traits) and `flashboard-domain` only.

pub mod fixture;
mod host;
mod page;
mod store;

pub use host::{LocalSpawner, MemoryHostEvents, TokioTimer};
pub use page::{Element, MemoryPage, NodeId};
pub use store::{MemoryFieldStore, MemoryStoreError};
