//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the host page.
//! Everything runs on the page's single UI thread, so port futures are not
//! required to be `Send` and shared handles are `Rc`, not `Arc`.

pub mod field_store;
pub mod host_events;
pub mod page_dom;
pub mod timer;

pub use field_store::FieldStore;
pub use host_events::{HostEvents, Spawn};
pub use page_dom::PageDom;
pub use timer::Timer;
