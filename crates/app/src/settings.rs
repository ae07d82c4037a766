//! Settings: TOML configuration with canonical defaults.
//!
//! Every field has a default matching the hosted dashboard the extension
//! targets, so an empty document is valid. The repository ships the same
//! values in `flashboard.toml`.

use std::time::Duration;

use serde::Deserialize;

use flashboard_domain::error::ValidationError;
use flashboard_domain::style::{Locator, RegionStyle, StyleProfile, StyleRule};
use flashboard_domain::toggle::ControlLabels;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Scope of the records in the extension field store.
    pub extension_id: String,
    /// How the dashboard view is recognised.
    pub markers: MarkerSettings,
    /// Where and how the control is rendered.
    pub control: ControlSettings,
    /// Re-check, retry and persistence timings.
    pub timing: TimingSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
    /// The compact layout.
    pub profile: StyleProfile,
}

/// Dashboard marker and identity extraction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MarkerSettings {
    /// Attribute present only on the dashboard view's root element.
    pub attribute: String,
    /// Expected value of [`attribute`](Self::attribute).
    pub value: String,
    /// Attribute of the same element holding JSON props.
    pub props_attribute: String,
    /// JSON pointer to the bookmark id inside the props.
    pub identity_pointer: String,
}

/// Control placement and appearance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    /// Element the control is appended to.
    pub host: Locator,
    /// Class of the control container.
    pub container_class: String,
    /// Host button kind.
    pub kind: String,
    pub labels: ControlLabels,
}

/// Delays and attempt counts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// Offsets after "app ready" at which initialization runs again, in ms.
    pub recheck_delays_ms: Vec<u64>,
    /// Delay between two attempts at applying the compact layout, in ms.
    pub style_retry_ms: u64,
    /// How many times a store write is attempted before giving up.
    pub persist_attempts: u32,
    /// Delay between two store write attempts, in ms.
    pub persist_retry_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Settings {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Parse`] when the document is malformed and
    /// [`SettingsError::Validation`] or [`SettingsError::Invalid`] when a
    /// value breaks an invariant.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check semantic invariants.
    ///
    /// # Errors
    ///
    /// See [`from_toml_str`](Self::from_toml_str).
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.extension_id.trim().is_empty() {
            return Err(SettingsError::Invalid("extension_id must not be empty"));
        }
        if self.markers.attribute.is_empty() || self.markers.value.is_empty() {
            return Err(SettingsError::Invalid("dashboard marker must not be empty"));
        }
        if !self.markers.identity_pointer.starts_with('/') {
            return Err(SettingsError::Invalid(
                "identity_pointer must be a JSON pointer starting with '/'",
            ));
        }
        if self.control.container_class.trim().is_empty() {
            return Err(SettingsError::Invalid("control container_class must not be empty"));
        }
        if self.timing.persist_attempts == 0 {
            return Err(SettingsError::Invalid("persist_attempts must be at least 1"));
        }
        if self.timing.style_retry_ms == 0 {
            return Err(SettingsError::Invalid("style_retry_ms must be non-zero"));
        }
        self.profile.validate()?;
        Ok(())
    }
}

impl TimingSettings {
    /// Re-check offsets, sorted and without duplicates.
    #[must_use]
    pub fn recheck_delays(&self) -> Vec<Duration> {
        let mut delays = self.recheck_delays_ms.clone();
        delays.sort_unstable();
        delays.dedup();
        delays.into_iter().map(Duration::from_millis).collect()
    }

    #[must_use]
    pub fn style_retry(&self) -> Duration {
        Duration::from_millis(self.style_retry_ms)
    }

    #[must_use]
    pub fn persist_retry(&self) -> Duration {
        Duration::from_millis(self.persist_retry_ms)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            extension_id: "aha-develop.flashboard".to_string(),
            markers: MarkerSettings::default(),
            control: ControlSettings::default(),
            timing: TimingSettings::default(),
            logging: LoggingSettings::default(),
            profile: compact_dashboard_profile(),
        }
    }
}

impl Default for MarkerSettings {
    fn default() -> Self {
        Self {
            attribute: "data-react-class".to_string(),
            value: "Dashboards".to_string(),
            props_attribute: "data-react-props".to_string(),
            identity_pointer: "/meta/bookmarkId".to_string(),
        }
    }
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            host: Locator::class("report-header").within("page-nav"),
            container_class: "flashboard".to_string(),
            kind: "primary".to_string(),
            labels: ControlLabels {
                enable: "Enable Flashboard".to_string(),
                disable: "Disable Flashboard".to_string(),
            },
        }
    }
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            recheck_delays_ms: vec![1000, 2000, 3000],
            style_retry_ms: 250,
            persist_attempts: 3,
            persist_retry_ms: 500,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "flashboard=info".to_string(),
        }
    }
}

/// The compact layout of the hosted dashboard view.
#[must_use]
pub fn compact_dashboard_profile() -> StyleProfile {
    StyleProfile::new(vec![
        RegionStyle::new("header", Locator::id("page-nav")).rule(StyleRule::property(
            "padding",
            Some("16px 16px"),
            Some("4px 16px 10px"),
        )),
        RegionStyle::new(
            "filters",
            Locator::class("dashboard-rendered-filters").ancestor(1),
        )
        .rule(StyleRule::property("display", None, Some("none"))),
        RegionStyle::new(
            "description",
            Locator::class("report-type-description").ancestor(2),
        )
        .rule(StyleRule::property("display", None, Some("none"))),
        RegionStyle::new(
            "panels",
            Locator::class_prefix("Dashboards--").within("workspace-content"),
        )
        .rule(StyleRule::property("padding", None, Some("10px"))),
        RegionStyle::new("grid", Locator::id("Dashboard-Grid"))
            .rule(StyleRule::substitute("20px", "10px")),
    ])
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// TOML parse failure.
    #[error("failed to parse settings")]
    Parse(#[from] toml::de::Error),
    /// The style profile breaks a domain invariant.
    #[error("invalid style profile")]
    Validation(#[from] ValidationError),
    /// Any other semantic validation failure.
    #[error("invalid settings: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_produce_valid_defaults() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.markers.identity_pointer, "/meta/bookmarkId");
        assert_eq!(settings.control.container_class, "flashboard");
        assert_eq!(settings.profile.regions.len(), 5);
    }

    #[test]
    fn should_parse_empty_toml_as_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn should_match_shipped_settings_file() {
        let shipped = Settings::from_toml_str(include_str!("../../../flashboard.toml")).unwrap();
        assert_eq!(shipped, Settings::default());
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let toml = r#"
            extension_id = "acme.compact"

            [timing]
            style_retry_ms = 100
        "#;
        let settings = Settings::from_toml_str(toml).unwrap();
        assert_eq!(settings.extension_id, "acme.compact");
        assert_eq!(settings.timing.style_retry(), Duration::from_millis(100));
        assert_eq!(settings.timing.persist_attempts, 3);
        assert_eq!(settings.profile, compact_dashboard_profile());
    }

    #[test]
    fn should_replace_profile_when_regions_given() {
        let toml = r#"
            [[profile.regions]]
            name = "header"
            locator = { by = "id", id = "top-bar" }
            rules = [{ kind = "property", name = "height", original = "64px", updated = "40px" }]
        "#;
        let settings = Settings::from_toml_str(toml).unwrap();
        assert_eq!(settings.profile.regions.len(), 1);
        assert_eq!(settings.profile.regions[0].locator, Locator::id("top-bar"));
    }

    #[test]
    fn should_sort_and_dedup_recheck_delays() {
        let timing = TimingSettings {
            recheck_delays_ms: vec![3000, 1000, 1000],
            ..TimingSettings::default()
        };
        assert_eq!(
            timing.recheck_delays(),
            vec![Duration::from_secs(1), Duration::from_secs(3)]
        );
    }

    #[test]
    fn should_reject_zero_persist_attempts() {
        let result = Settings::from_toml_str("[timing]\npersist_attempts = 0");
        assert!(matches!(result, Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn should_reject_relative_identity_pointer() {
        let result = Settings::from_toml_str("[markers]\nidentity_pointer = 'meta.bookmarkId'");
        assert!(matches!(result, Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn should_reject_invalid_profile() {
        let toml = r#"
            [[profile.regions]]
            name = "grid"
            locator = { by = "id", id = "grid" }
            rules = []
        "#;
        let result = Settings::from_toml_str(toml);
        assert!(matches!(
            result,
            Err(SettingsError::Validation(ValidationError::EmptyRegion(_)))
        ));
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result = Settings::from_toml_str("invalid {{{");
        assert!(matches!(result, Err(SettingsError::Parse(_))));
    }
}
