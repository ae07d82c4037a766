//! Toggle config: the per-bookmark record kept in the extension field store.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Persisted toggle record.
///
/// The store owns the record; flashboard only reads and writes it. Fields
/// other than `enabled` are carried through untouched so a write never drops
/// data another version of the extension put there.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToggleConfig {
    /// Whether the compact layout is on. A record without the field is off.
    #[serde(default)]
    pub enabled: bool,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ToggleConfig {
    /// A fresh record with only the `enabled` flag set.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            extra: serde_json::Map::new(),
        }
    }

    /// Interpret a raw store read.
    ///
    /// `None` and JSON `null` both mean "no record yet".
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MalformedConfig`] when the record exists but
    /// is not an object with a boolean `enabled`.
    pub fn from_record(
        record: Option<serde_json::Value>,
    ) -> Result<Option<Self>, ValidationError> {
        match record {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(ValidationError::MalformedConfig),
        }
    }

    /// Return a copy with `enabled` replaced, keeping every other field.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Serialize into the JSON value handed to the store.
    #[must_use]
    pub fn to_record(&self) -> serde_json::Value {
        let mut map = self.extra.clone();
        map.insert("enabled".to_string(), serde_json::Value::Bool(self.enabled));
        serde_json::Value::Object(map)
    }
}

/// Whether a stored record says the layout is enabled. Missing means off.
#[must_use]
pub fn is_enabled(config: Option<&ToggleConfig>) -> bool {
    config.is_some_and(|c| c.enabled)
}
