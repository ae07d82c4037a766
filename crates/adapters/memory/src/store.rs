//! In-memory [`FieldStore`] with call counters and injectable failures.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

use flashboard_app::ports::FieldStore;
use flashboard_domain::error::FlashboardError;

/// Failure reported by [`MemoryFieldStore`] when told to fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryStoreError {
    #[error("field store unavailable during {0}")]
    Unavailable(&'static str),
}

impl From<MemoryStoreError> for FlashboardError {
    fn from(err: MemoryStoreError) -> Self {
        FlashboardError::Persistence(Box::new(err))
    }
}

type FieldKey = (String, String);

/// Per-user extension fields held in a map.
#[derive(Debug, Default)]
pub struct MemoryFieldStore {
    fields: RefCell<HashMap<FieldKey, serde_json::Value>>,
    reads: Cell<usize>,
    writes: Cell<usize>,
    fail_reads: Cell<bool>,
    failing_writes: Cell<usize>,
    read_delay: Cell<Duration>,
}

impl MemoryFieldStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record without counting a write.
    pub fn insert(&self, extension_id: &str, key: &str, value: serde_json::Value) {
        self.fields
            .borrow_mut()
            .insert((extension_id.to_string(), key.to_string()), value);
    }

    /// The stored record, without counting a read.
    #[must_use]
    pub fn record(&self, extension_id: &str, key: &str) -> Option<serde_json::Value> {
        self.fields
            .borrow()
            .get(&(extension_id.to_string(), key.to_string()))
            .cloned()
    }

    /// Make every read fail until switched back.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    /// Hold every read for `delay` before answering, like a slow network.
    pub fn delay_reads(&self, delay: Duration) {
        self.read_delay.set(delay);
    }

    /// Make the next `count` writes fail.
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.set(count);
    }

    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    /// Reads and writes attempted so far, failed ones included.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.reads() + self.writes()
    }
}

impl FieldStore for MemoryFieldStore {
    async fn get(
        &self,
        extension_id: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, FlashboardError> {
        self.reads.set(self.reads.get() + 1);
        let delay = self.read_delay.get();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_reads.get() {
            return Err(MemoryStoreError::Unavailable("read").into());
        }
        Ok(self.record(extension_id, key))
    }

    async fn set(
        &self,
        extension_id: &str,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), FlashboardError> {
        self.writes.set(self.writes.get() + 1);
        let failing = self.failing_writes.get();
        if failing > 0 {
            self.failing_writes.set(failing - 1);
            return Err(MemoryStoreError::Unavailable("write").into());
        }
        tracing::trace!(extension_id, key, %value, "field stored");
        self.insert(extension_id, key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const EXT: &str = "aha-develop.flashboard";

    #[tokio::test]
    async fn should_return_none_when_field_missing() {
        let store = MemoryFieldStore::new();
        assert_eq!(store.get(EXT, "42").await.unwrap(), None);
        assert_eq!(store.reads(), 1);
    }

    #[tokio::test]
    async fn should_scope_fields_by_extension() {
        let store = MemoryFieldStore::new();
        store.set(EXT, "42", json!({"enabled": true})).await.unwrap();
        assert_eq!(store.get("other.extension", "42").await.unwrap(), None);
        assert_eq!(
            store.get(EXT, "42").await.unwrap(),
            Some(json!({"enabled": true}))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_hold_reads_for_the_configured_delay() {
        let store = MemoryFieldStore::new();
        store.insert(EXT, "42", json!({"enabled": true}));
        store.delay_reads(Duration::from_millis(100));
        let started = tokio::time::Instant::now();
        assert_eq!(
            store.get(EXT, "42").await.unwrap(),
            Some(json!({"enabled": true}))
        );
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn should_fail_reads_when_asked() {
        let store = MemoryFieldStore::new();
        store.fail_reads(true);
        let err = store.get(EXT, "42").await.unwrap_err();
        assert!(matches!(err, FlashboardError::Persistence(_)));
    }

    #[tokio::test]
    async fn should_fail_only_the_requested_number_of_writes() {
        let store = MemoryFieldStore::new();
        store.fail_next_writes(1);
        assert!(store.set(EXT, "42", json!({"enabled": true})).await.is_err());
        assert_eq!(store.record(EXT, "42"), None);
        assert!(store.set(EXT, "42", json!({"enabled": true})).await.is_ok());
        assert_eq!(store.writes(), 2);
        assert_eq!(store.record(EXT, "42"), Some(json!({"enabled": true})));
    }

    #[test]
    fn should_not_count_seeding() {
        let store = MemoryFieldStore::new();
        store.insert(EXT, "42", json!({"enabled": false}));
        assert_eq!(store.calls(), 0);
    }
}
