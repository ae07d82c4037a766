//! Presence detector: is the dashboard view on screen, and which bookmark.

use flashboard_domain::identity::ViewIdentity;

use crate::ports::PageDom;
use crate::settings::MarkerSettings;

/// Stateless dashboard detection. Every call inspects the live page.
#[derive(Debug, Clone)]
pub struct PresenceDetector {
    markers: MarkerSettings,
}

impl PresenceDetector {
    pub fn new(markers: MarkerSettings) -> Self {
        Self { markers }
    }

    /// Whether the dashboard marker is present in the page.
    pub fn is_dashboard_view<D: PageDom>(&self, dom: &D) -> bool {
        self.marker(dom).is_some()
    }

    /// The bookmark id of the dashboard on screen.
    ///
    /// `None` off the dashboard view, or when the marker's props are missing,
    /// malformed, or carry no usable identifier.
    pub fn current_view_identity<D: PageDom>(&self, dom: &D) -> Option<ViewIdentity> {
        let marker = self.marker(dom)?;
        let props = dom.attribute(&marker, &self.markers.props_attribute)?;
        match ViewIdentity::from_props(&props, &self.markers.identity_pointer) {
            Ok(identity) => Some(identity),
            Err(err) => {
                tracing::debug!(error = %err, "dashboard marker carries no usable identity");
                None
            }
        }
    }

    fn marker<D: PageDom>(&self, dom: &D) -> Option<D::Node> {
        dom.elements_with_attribute(&self.markers.attribute, &self.markers.value)
            .into_iter()
            .next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashboard_domain::error::FlashboardError;
    use flashboard_domain::toggle::ControlView;
    use std::collections::HashMap;

    /// Flat page: a list of elements described by their attributes only.
    #[derive(Default)]
    struct FlatPage {
        elements: Vec<HashMap<String, String>>,
    }

    impl FlatPage {
        fn with(mut self, attrs: &[(&str, &str)]) -> Self {
            self.elements.push(
                attrs
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
            );
            self
        }
    }

    impl PageDom for FlatPage {
        type Node = usize;

        fn element_by_id(&self, id: &str) -> Option<usize> {
            self.elements_with_attribute("id", id).into_iter().next()
        }

        fn elements_with_attribute(&self, name: &str, value: &str) -> Vec<usize> {
            self.elements
                .iter()
                .enumerate()
                .filter(|(_, attrs)| attrs.get(name).is_some_and(|v| v == value))
                .map(|(idx, _)| idx)
                .collect()
        }

        fn elements_with_class(&self, _scope: Option<&usize>, _class: &str) -> Vec<usize> {
            Vec::new()
        }

        fn elements_with_class_prefix(&self, _scope: Option<&usize>, _prefix: &str) -> Vec<usize> {
            Vec::new()
        }

        fn parent(&self, _node: &usize) -> Option<usize> {
            None
        }

        fn attribute(&self, node: &usize, name: &str) -> Option<String> {
            self.elements.get(*node)?.get(name).cloned()
        }

        fn set_attribute(&self, _node: &usize, _name: &str, _value: &str) {}

        fn remove_attribute(&self, _node: &usize, _name: &str) {}

        fn style_property(&self, _node: &usize, _name: &str) -> Option<String> {
            None
        }

        fn set_style_property(&self, _node: &usize, _name: &str, _value: Option<&str>) {}

        fn remove(&self, _node: &usize) {}

        fn mount_control(&self, _host: &usize, _view: &ControlView) -> Result<usize, FlashboardError> {
            Ok(usize::MAX)
        }
    }

    fn detector() -> PresenceDetector {
        PresenceDetector::new(MarkerSettings::default())
    }

    #[test]
    fn should_not_detect_dashboard_on_empty_page() {
        let page = FlatPage::default();
        assert!(!detector().is_dashboard_view(&page));
        assert!(detector().current_view_identity(&page).is_none());
    }

    #[test]
    fn should_not_detect_dashboard_on_other_react_view() {
        let page = FlatPage::default().with(&[("data-react-class", "Roadmaps")]);
        assert!(!detector().is_dashboard_view(&page));
    }

    #[test]
    fn should_extract_identity_from_marker_props() {
        let page = FlatPage::default().with(&[
            ("data-react-class", "Dashboards"),
            ("data-react-props", r#"{"meta":{"bookmarkId":42}}"#),
        ]);
        assert!(detector().is_dashboard_view(&page));
        let identity = detector().current_view_identity(&page).unwrap();
        assert_eq!(identity.as_str(), "42");
    }

    #[test]
    fn should_return_none_when_props_attribute_missing() {
        let page = FlatPage::default().with(&[("data-react-class", "Dashboards")]);
        assert!(detector().is_dashboard_view(&page));
        assert!(detector().current_view_identity(&page).is_none());
    }

    #[test]
    fn should_return_none_when_props_are_malformed() {
        let page = FlatPage::default().with(&[
            ("data-react-class", "Dashboards"),
            ("data-react-props", "{oops"),
        ]);
        assert!(detector().current_view_identity(&page).is_none());
    }

    #[test]
    fn should_follow_configured_identity_pointer() {
        let markers = MarkerSettings {
            identity_pointer: "/bookmark/id".to_string(),
            ..MarkerSettings::default()
        };
        let page = FlatPage::default().with(&[
            ("data-react-class", "Dashboards"),
            ("data-react-props", r#"{"bookmark":{"id":"abc"}}"#),
        ]);
        let identity = PresenceDetector::new(markers)
            .current_view_identity(&page)
            .unwrap();
        assert_eq!(identity.as_str(), "abc");
    }
}
