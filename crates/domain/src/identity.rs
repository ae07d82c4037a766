//! View identity: the bookmark id of the dashboard currently on screen.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Stable identifier of a saved dashboard configuration.
///
/// Derived from page markup on every check and never cached, so it always
/// reflects the dashboard currently rendered. Used as the field store key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ViewIdentity(String);

impl ViewIdentity {
    /// Wrap a raw identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyIdentity`] when `raw` is blank.
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyIdentity);
        }
        if trimmed.len() == raw.len() {
            Ok(Self(raw))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// Extract the identity from the JSON props attached to the dashboard
    /// marker, reading the value at `pointer` (RFC 6901, e.g. `/meta/bookmarkId`).
    ///
    /// Strings are taken as-is and integers are rendered in decimal.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the props are not JSON, when nothing
    /// lives at `pointer`, or when the value found is not a string or a number.
    pub fn from_props(props: &str, pointer: &str) -> Result<Self, ValidationError> {
        let value: serde_json::Value =
            serde_json::from_str(props).map_err(ValidationError::MalformedProps)?;
        match value.pointer(pointer) {
            None | Some(serde_json::Value::Null) => {
                Err(ValidationError::MissingIdentity(pointer.to_string()))
            }
            Some(serde_json::Value::String(s)) => Self::new(s.as_str()),
            Some(serde_json::Value::Number(n)) => Self::new(n.to_string()),
            Some(_) => Err(ValidationError::UnsupportedIdentity(pointer.to_string())),
        }
    }

    /// Borrow the identifier as the store key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ViewIdentity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ViewIdentity {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ViewIdentity> for String {
    fn from(value: ViewIdentity) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POINTER: &str = "/meta/bookmarkId";

    #[test]
    fn should_reject_empty_identity() {
        assert!(matches!(
            ViewIdentity::new("   "),
            Err(ValidationError::EmptyIdentity)
        ));
    }

    #[test]
    fn should_trim_surrounding_whitespace() {
        let id = ViewIdentity::new(" 42 ").unwrap();
        assert_eq!(id.as_str(), "42");
    }

    #[test]
    fn should_extract_numeric_bookmark_id_from_props() {
        let props = r#"{"meta":{"bookmarkId":42,"title":"Roadmap"}}"#;
        let id = ViewIdentity::from_props(props, POINTER).unwrap();
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn should_extract_string_bookmark_id_from_props() {
        let props = r#"{"meta":{"bookmarkId":"6981234"}}"#;
        let id = ViewIdentity::from_props(props, POINTER).unwrap();
        assert_eq!(id.as_str(), "6981234");
    }

    #[test]
    fn should_report_missing_identity_when_pointer_has_no_value() {
        let result = ViewIdentity::from_props(r#"{"meta":{}}"#, POINTER);
        assert!(matches!(result, Err(ValidationError::MissingIdentity(_))));
    }

    #[test]
    fn should_report_missing_identity_when_value_is_null() {
        let result = ViewIdentity::from_props(r#"{"meta":{"bookmarkId":null}}"#, POINTER);
        assert!(matches!(result, Err(ValidationError::MissingIdentity(_))));
    }

    #[test]
    fn should_reject_object_identity() {
        let result = ViewIdentity::from_props(r#"{"meta":{"bookmarkId":{}}}"#, POINTER);
        assert!(matches!(
            result,
            Err(ValidationError::UnsupportedIdentity(_))
        ));
    }

    #[test]
    fn should_report_malformed_props() {
        let result = ViewIdentity::from_props("{not json", POINTER);
        assert!(matches!(result, Err(ValidationError::MalformedProps(_))));
    }

    #[test]
    fn should_roundtrip_through_serde_json() {
        let id = ViewIdentity::new("42").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"42\"");
        let parsed: ViewIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn should_reject_empty_string_when_deserializing() {
        let result: Result<ViewIdentity, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }
}
