//! Toggle state machine and the control it renders.

use serde::{Deserialize, Serialize};

/// The two states of the compact layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleState {
    #[default]
    Disabled,
    Enabled,
}

impl ToggleState {
    #[must_use]
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled { Self::Enabled } else { Self::Disabled }
    }

    #[must_use]
    pub fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }

    /// The state the control moves to when activated.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Disabled => Self::Enabled,
            Self::Enabled => Self::Disabled,
        }
    }
}

impl std::fmt::Display for ToggleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => f.write_str("disabled"),
            Self::Enabled => f.write_str("enabled"),
        }
    }
}

impl std::str::FromStr for ToggleState {
    type Err = UnknownToggleState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "disabled" => Ok(Self::Disabled),
            "enabled" => Ok(Self::Enabled),
            other => Err(UnknownToggleState(other.to_string())),
        }
    }
}

/// Returned when parsing a [`ToggleState`] from an unknown string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown toggle state `{0}`")]
pub struct UnknownToggleState(pub String);

/// Labels shown on the control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlLabels {
    pub enable: String,
    pub disable: String,
}

/// What the control looks like for a given state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlView {
    /// Class of the container element; also used to find stale controls.
    pub container_class: String,
    /// Host button kind (e.g. `primary`).
    pub kind: String,
    pub label: String,
    /// Outlined buttons offer to enable; filled ones offer to disable.
    pub outline: bool,
    /// The state a click moves to.
    pub activates: ToggleState,
}

impl ControlView {
    #[must_use]
    pub fn for_state(
        state: ToggleState,
        container_class: &str,
        kind: &str,
        labels: &ControlLabels,
    ) -> Self {
        let label = match state {
            ToggleState::Disabled => labels.enable.clone(),
            ToggleState::Enabled => labels.disable.clone(),
        };
        Self {
            container_class: container_class.to_string(),
            kind: kind.to_string(),
            label,
            outline: !state.is_enabled(),
            activates: state.toggled(),
        }
    }
}
