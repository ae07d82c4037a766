//! Field store port: the host's per-user extension field API.

use std::future::Future;
use std::rc::Rc;

use flashboard_domain::error::FlashboardError;

/// Per-user key/value storage scoped by an extension identifier.
///
/// Values are arbitrary JSON. A miss is `Ok(None)`, never an error.
pub trait FieldStore {
    /// Read the record stored under `key` for `extension_id`.
    fn get(
        &self,
        extension_id: &str,
        key: &str,
    ) -> impl Future<Output = Result<Option<serde_json::Value>, FlashboardError>>;

    /// Create or replace the record stored under `key` for `extension_id`.
    fn set(
        &self,
        extension_id: &str,
        key: &str,
        value: serde_json::Value,
    ) -> impl Future<Output = Result<(), FlashboardError>>;
}

impl<T: FieldStore> FieldStore for Rc<T> {
    fn get(
        &self,
        extension_id: &str,
        key: &str,
    ) -> impl Future<Output = Result<Option<serde_json::Value>, FlashboardError>> {
        (**self).get(extension_id, key)
    }

    fn set(
        &self,
        extension_id: &str,
        key: &str,
        value: serde_json::Value,
    ) -> impl Future<Output = Result<(), FlashboardError>> {
        (**self).set(extension_id, key, value)
    }
}
