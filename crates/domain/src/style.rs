//! Style profile: the page regions the compact layout touches and the
//! paired values each region takes in the original and updated layouts.
//!
//! Every rule stores both of its values, so applying the updated variant and
//! then the original one restores the region. Substitutions only match whole
//! CSS tokens; exact restoration of the surrounding text is the writer's job.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Which side of the profile to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// The host's own layout.
    Original,
    /// The compact layout.
    Updated,
}

/// How to find the element(s) of a region in the page.
///
/// These are host contract constants; changing one is a configuration change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum Locator {
    /// The element with this `id`.
    Id { id: String },
    /// The first element carrying `class`, optionally searched inside the
    /// element with id `within`, then `ancestor` parents up.
    Class {
        class: String,
        #[serde(default)]
        within: Option<String>,
        #[serde(default)]
        ancestor: u8,
    },
    /// Every element whose `class` attribute starts with `prefix`.
    ClassPrefix {
        prefix: String,
        #[serde(default)]
        within: Option<String>,
    },
}

impl Locator {
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id { id: id.into() }
    }

    #[must_use]
    pub fn class(class: impl Into<String>) -> Self {
        Self::Class {
            class: class.into(),
            within: None,
            ancestor: 0,
        }
    }

    #[must_use]
    pub fn class_prefix(prefix: impl Into<String>) -> Self {
        Self::ClassPrefix {
            prefix: prefix.into(),
            within: None,
        }
    }

    /// Restrict the search to descendants of the element with id `container`.
    #[must_use]
    pub fn within(self, container: impl Into<String>) -> Self {
        let container = Some(container.into());
        match self {
            Self::Id { id } => Self::Id { id },
            Self::Class {
                class, ancestor, ..
            } => Self::Class {
                class,
                within: container,
                ancestor,
            },
            Self::ClassPrefix { prefix, .. } => Self::ClassPrefix {
                prefix,
                within: container,
            },
        }
    }

    /// Climb `levels` parents from the matched element. Only meaningful for
    /// [`Locator::Class`]; other variants are returned unchanged.
    #[must_use]
    pub fn ancestor(self, levels: u8) -> Self {
        match self {
            Self::Class { class, within, .. } => Self::Class {
                class,
                within,
                ancestor: levels,
            },
            other => other,
        }
    }
}

/// One reversible change to a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StyleRule {
    /// An inline CSS property. `None` means the property is not set.
    Property {
        name: String,
        #[serde(default)]
        original: Option<String>,
        #[serde(default)]
        updated: Option<String>,
    },
    /// A substitution of whole CSS tokens inside the element's `style`
    /// attribute: `20px` matches in `gap: 20px` but not in `120px`.
    Substitute { original: String, updated: String },
}

/// A concrete write derived from a [`StyleRule`] for one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleEdit<'a> {
    SetProperty {
        name: &'a str,
        value: Option<&'a str>,
    },
    Replace {
        from: &'a str,
        to: &'a str,
    },
}

impl StyleRule {
    #[must_use]
    pub fn property(name: impl Into<String>, original: Option<&str>, updated: Option<&str>) -> Self {
        Self::Property {
            name: name.into(),
            original: original.map(str::to_string),
            updated: updated.map(str::to_string),
        }
    }

    #[must_use]
    pub fn substitute(original: impl Into<String>, updated: impl Into<String>) -> Self {
        Self::Substitute {
            original: original.into(),
            updated: updated.into(),
        }
    }

    /// The write that brings an element to `variant`.
    #[must_use]
    pub fn edit(&self, variant: Variant) -> StyleEdit<'_> {
        match (self, variant) {
            (
                Self::Property {
                    name, original, ..
                },
                Variant::Original,
            ) => StyleEdit::SetProperty {
                name,
                value: original.as_deref(),
            },
            (Self::Property { name, updated, .. }, Variant::Updated) => StyleEdit::SetProperty {
                name,
                value: updated.as_deref(),
            },
            (Self::Substitute { original, updated }, Variant::Original) => StyleEdit::Replace {
                from: updated,
                to: original,
            },
            (Self::Substitute { original, updated }, Variant::Updated) => StyleEdit::Replace {
                from: original,
                to: updated,
            },
        }
    }

    fn validate(&self, region: &str) -> Result<(), ValidationError> {
        match self {
            Self::Property {
                name,
                original,
                updated,
            } => {
                if name.trim().is_empty() {
                    return Err(ValidationError::EmptyPropertyName(region.to_string()));
                }
                if original == updated {
                    return Err(ValidationError::NoopRule(region.to_string()));
                }
            }
            Self::Substitute { original, updated } => {
                if original.is_empty() || updated.is_empty() || original == updated {
                    return Err(ValidationError::NoopRule(region.to_string()));
                }
            }
        }
        Ok(())
    }
}

/// Replace every whole-token occurrence of `from` in `style` with `to`.
///
/// An occurrence counts when it is not glued to a neighbouring digit, letter,
/// `.` or `_`. Returns `None` when nothing matched.
#[must_use]
pub fn substitute_tokens(style: &str, from: &str, to: &str) -> Option<String> {
    if from.is_empty() {
        return None;
    }
    let glued = |c: char| c.is_ascii_alphanumeric() || c == '.' || c == '_';
    let mut out = String::with_capacity(style.len());
    let mut last = 0;
    let mut matched = false;
    for (idx, _) in style.match_indices(from) {
        let end = idx + from.len();
        let before = style[..idx].chars().next_back();
        let after = style[end..].chars().next();
        if before.is_some_and(glued) || after.is_some_and(glued) {
            continue;
        }
        out.push_str(&style[last..idx]);
        out.push_str(to);
        last = end;
        matched = true;
    }
    if !matched {
        return None;
    }
    out.push_str(&style[last..]);
    Some(out)
}

/// A named page area and the rules applied to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionStyle {
    pub name: String,
    pub locator: Locator,
    pub rules: Vec<StyleRule>,
}

impl RegionStyle {
    #[must_use]
    pub fn new(name: impl Into<String>, locator: Locator) -> Self {
        Self {
            name: name.into(),
            locator,
            rules: Vec::new(),
        }
    }

    #[must_use]
    pub fn rule(mut self, rule: StyleRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// The writes that bring this region to `variant`, in declaration order.
    pub fn edits(&self, variant: Variant) -> impl Iterator<Item = StyleEdit<'_>> + Clone {
        self.rules.iter().map(move |rule| rule.edit(variant))
    }
}

/// The full set of regions the compact layout touches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleProfile {
    #[serde(default)]
    pub regions: Vec<RegionStyle>,
}

impl StyleProfile {
    #[must_use]
    pub fn new(regions: Vec<RegionStyle>) -> Self {
        Self { regions }
    }

    /// Check profile invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when a region name is empty or repeated,
    /// when a region has no rule, or when a rule is a no-op.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for region in &self.regions {
            if region.name.trim().is_empty() {
                return Err(ValidationError::EmptyRegionName);
            }
            if !seen.insert(region.name.as_str()) {
                return Err(ValidationError::DuplicateRegion(region.name.clone()));
            }
            if region.rules.is_empty() {
                return Err(ValidationError::EmptyRegion(region.name.clone()));
            }
            for rule in &region.rules {
                rule.validate(&region.name)?;
            }
        }
        Ok(())
    }

    /// Look a region up by name.
    #[must_use]
    pub fn region(&self, name: &str) -> Option<&RegionStyle> {
        self.regions.iter().find(|r| r.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> RegionStyle {
        RegionStyle::new("header", Locator::id("page-nav")).rule(StyleRule::property(
            "padding",
            Some("16px 16px"),
            Some("4px 16px 10px"),
        ))
    }

    #[test]
    fn should_pick_updated_value_for_updated_variant() {
        let region = header();
        let edits: Vec<_> = region.edits(Variant::Updated).collect();
        assert_eq!(
            edits,
            vec![StyleEdit::SetProperty {
                name: "padding",
                value: Some("4px 16px 10px"),
            }]
        );
    }

    #[test]
    fn should_pick_original_value_for_original_variant() {
        let region = header();
        let edits: Vec<_> = region.edits(Variant::Original).collect();
        assert_eq!(
            edits,
            vec![StyleEdit::SetProperty {
                name: "padding",
                value: Some("16px 16px"),
            }]
        );
    }

    #[test]
    fn should_swap_substitution_direction_for_original_variant() {
        let rule = StyleRule::substitute("20px", "10px");
        assert_eq!(
            rule.edit(Variant::Updated),
            StyleEdit::Replace {
                from: "20px",
                to: "10px"
            }
        );
        assert_eq!(
            rule.edit(Variant::Original),
            StyleEdit::Replace {
                from: "10px",
                to: "20px"
            }
        );
    }

    #[test]
    fn should_substitute_whole_tokens_only() {
        assert_eq!(
            substitute_tokens("height: 410px; gap: 20px; width: 1200px", "20px", "10px").as_deref(),
            Some("height: 410px; gap: 10px; width: 1200px")
        );
        assert_eq!(
            substitute_tokens("height: 410px; gap: 10px; width: 1200px", "10px", "20px").as_deref(),
            Some("height: 410px; gap: 20px; width: 1200px")
        );
        assert_eq!(
            substitute_tokens("gap:20px;padding:20px", "20px", "10px").as_deref(),
            Some("gap:10px;padding:10px")
        );
    }

    #[test]
    fn should_report_no_match_for_glued_tokens() {
        assert_eq!(substitute_tokens("width: 120px; top: 20.5px", "20px", "10px"), None);
        assert_eq!(substitute_tokens("height: 1.20px", "20px", "10px"), None);
        assert_eq!(substitute_tokens("gap: 20pxx", "20px", "10px"), None);
        assert_eq!(substitute_tokens("", "20px", "10px"), None);
    }

    #[test]
    fn should_accept_valid_profile() {
        let profile = StyleProfile::new(vec![
            header(),
            RegionStyle::new("filters", Locator::class("dashboard-rendered-filters").ancestor(1))
                .rule(StyleRule::property("display", None, Some("none"))),
        ]);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn should_reject_duplicate_region_names() {
        let profile = StyleProfile::new(vec![header(), header()]);
        assert!(matches!(
            profile.validate(),
            Err(ValidationError::DuplicateRegion(name)) if name == "header"
        ));
    }

    #[test]
    fn should_reject_region_without_rules() {
        let profile = StyleProfile::new(vec![RegionStyle::new("grid", Locator::id("grid"))]);
        assert!(matches!(
            profile.validate(),
            Err(ValidationError::EmptyRegion(_))
        ));
    }

    #[test]
    fn should_reject_noop_property_rule() {
        let profile = StyleProfile::new(vec![
            RegionStyle::new("grid", Locator::id("grid"))
                .rule(StyleRule::property("gap", Some("8px"), Some("8px"))),
        ]);
        assert!(matches!(profile.validate(), Err(ValidationError::NoopRule(_))));
    }

    #[test]
    fn should_reject_empty_region_name() {
        let profile = StyleProfile::new(vec![
            RegionStyle::new(" ", Locator::id("grid"))
                .rule(StyleRule::property("gap", None, Some("8px"))),
        ]);
        assert!(matches!(
            profile.validate(),
            Err(ValidationError::EmptyRegionName)
        ));
    }

    #[test]
    fn should_build_scoped_class_locator() {
        let locator = Locator::class("report-header").within("page-nav");
        assert_eq!(
            locator,
            Locator::Class {
                class: "report-header".to_string(),
                within: Some("page-nav".to_string()),
                ancestor: 0,
            }
        );
    }

    #[test]
    fn should_deserialize_profile_from_toml() {
        let toml = r#"
            [[regions]]
            name = "description"
            locator = { by = "class", class = "report-type-description", ancestor = 2 }
            rules = [{ kind = "property", name = "display", updated = "none" }]

            [[regions]]
            name = "panels"
            locator = { by = "class_prefix", prefix = "Dashboards--", within = "workspace-content" }
            rules = [{ kind = "substitute", original = "20px", updated = "10px" }]
        "#;
        let profile: StyleProfile = toml::from_str(toml).unwrap();
        assert_eq!(profile.regions.len(), 2);
        assert_eq!(
            profile.regions[0].locator,
            Locator::class("report-type-description").ancestor(2)
        );
        assert_eq!(
            profile.regions[0].rules[0],
            StyleRule::property("display", None, Some("none"))
        );
        assert_eq!(
            profile.regions[1].locator,
            Locator::class_prefix("Dashboards--").within("workspace-content")
        );
        assert!(profile.validate().is_ok());
    }
}
