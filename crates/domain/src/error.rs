//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`FlashboardError`] via `From` when crossing a port boundary.

/// Top-level error for flashboard operations.
#[derive(Debug, thiserror::Error)]
pub enum FlashboardError {
    /// The dashboard marker is absent from the page.
    #[error("not on the dashboard view")]
    NotOnTargetView,

    /// A page region the style profile targets has not been rendered yet.
    #[error("page region not rendered yet")]
    DomUnready(#[from] DomUnreadyError),

    /// The extension field store rejected a read or a write.
    #[error("field store error")]
    Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The host page rejected a mutation (e.g. an element could not be created).
    #[error("page mutation failed")]
    Page(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),
}

impl FlashboardError {
    /// Whether the failure only reflects what the page has rendered so far,
    /// so a later host signal may succeed without any other change.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NotOnTargetView | Self::DomUnready(_))
    }
}

/// A named page region could not be located.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("region `{region}` is missing from the page")]
pub struct DomUnreadyError {
    pub region: String,
}

/// Domain invariant violations.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A view identity must not be empty.
    #[error("view identity must not be empty")]
    EmptyIdentity,

    /// The marker props attribute is not valid JSON.
    #[error("marker props are not valid JSON")]
    MalformedProps(#[source] serde_json::Error),

    /// The marker props do not contain a value at the identity pointer.
    #[error("no identity found at `{0}`")]
    MissingIdentity(String),

    /// The value at the identity pointer is neither a string nor a number.
    #[error("identity at `{0}` is not a string or a number")]
    UnsupportedIdentity(String),

    /// A stored toggle record is not a JSON object of the expected shape.
    #[error("stored toggle config is malformed")]
    MalformedConfig(#[source] serde_json::Error),

    /// A style region has an empty name.
    #[error("style region name must not be empty")]
    EmptyRegionName,

    /// Two style regions share a name.
    #[error("style region `{0}` is declared twice")]
    DuplicateRegion(String),

    /// A style region declares no rule.
    #[error("style region `{0}` has no rule")]
    EmptyRegion(String),

    /// A property rule has an empty property name.
    #[error("style region `{0}` has a property rule without a name")]
    EmptyPropertyName(String),

    /// A rule whose original and updated values are identical.
    #[error("style region `{0}` has a rule that changes nothing")]
    NoopRule(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_region_name_when_dom_unready() {
        let err = DomUnreadyError {
            region: "grid".to_string(),
        };
        assert_eq!(err.to_string(), "region `grid` is missing from the page");
    }

    #[test]
    fn should_convert_dom_unready_into_flashboard_error() {
        let err: FlashboardError = DomUnreadyError {
            region: "grid".to_string(),
        }
        .into();
        assert!(matches!(err, FlashboardError::DomUnready(_)));
    }

    #[test]
    fn should_report_transient_errors() {
        let unready: FlashboardError = DomUnreadyError {
            region: "grid".to_string(),
        }
        .into();
        assert!(unready.is_transient());
        assert!(FlashboardError::NotOnTargetView.is_transient());
        assert!(!FlashboardError::Persistence("offline".into()).is_transient());
        assert!(!FlashboardError::from(ValidationError::EmptyIdentity).is_transient());
    }
}
