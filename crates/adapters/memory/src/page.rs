//! In-memory page: an element tree with attributes, inline styles and text.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use flashboard_app::ports::PageDom;
use flashboard_domain::error::FlashboardError;
use flashboard_domain::toggle::{ControlView, ToggleState};

/// Tag of the button element inside a mounted control.
const BUTTON_TAG: &str = "aha-button";
/// Attribute recording the state a control's button activates.
const ACTIVATES_ATTRIBUTE: &str = "data-activates";

/// Handle to an element of a [`MemoryPage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct NodeData {
    tag: String,
    attributes: BTreeMap<String, String>,
    style: Vec<(String, String)>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            style: Vec::new(),
            text: None,
            parent: None,
            children: Vec::new(),
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.attributes
            .get("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    fn style_text(&self) -> Option<String> {
        if self.style.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .style
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect();
        Some(parts.join("; "))
    }

    fn set_style_text(&mut self, text: &str) {
        self.style = parse_style(text);
    }

    fn set_style(&mut self, name: &str, value: Option<&str>) {
        let position = self.style.iter().position(|(n, _)| n == name);
        match (position, value) {
            (Some(idx), Some(value)) => self.style[idx].1 = value.to_string(),
            (None, Some(value)) => self.style.push((name.to_string(), value.to_string())),
            (Some(idx), None) => {
                self.style.remove(idx);
            }
            (None, None) => {}
        }
    }
}

fn parse_style(text: &str) -> Vec<(String, String)> {
    text.split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let (name, value) = (name.trim(), value.trim());
            (!name.is_empty()).then(|| (name.to_string(), value.to_string()))
        })
        .collect()
}

/// Description of an element to insert, with its subtree.
#[derive(Debug, Clone, Default)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    style: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    /// Add a class token.
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if let Some((_, classes)) = self.attributes.iter_mut().find(|(n, _)| n == "class") {
            classes.push(' ');
            classes.push_str(&class);
            return self;
        }
        self.attributes.push(("class".to_string(), class));
        self
    }

    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Set an inline style property.
    #[must_use]
    pub fn style(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }
}

/// A page held in memory.
///
/// Inserting and clearing elements stands for the host rendering or
/// navigating; it is not counted as a mutation. Writes made through the
/// [`PageDom`] port are counted by [`mutations`](Self::mutations).
#[derive(Debug)]
pub struct MemoryPage {
    nodes: RefCell<Vec<NodeData>>,
    mutations: Cell<usize>,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPage {
    const BODY: NodeId = NodeId(0);

    /// An empty page with only a `<body>`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: RefCell::new(vec![NodeData::new("body")]),
            mutations: Cell::new(0),
        }
    }

    /// Render `element` and its subtree under `parent` (or `<body>`).
    pub fn insert(&self, parent: Option<NodeId>, element: Element) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        insert_into(&mut nodes, parent.unwrap_or(Self::BODY), element)
    }

    /// Drop everything under `<body>`, as when the host navigates away.
    pub fn clear(&self) {
        let mut nodes = self.nodes.borrow_mut();
        let children = std::mem::take(&mut nodes[Self::BODY.0].children);
        for child in children {
            nodes[child.0].parent = None;
        }
    }

    /// Number of writes made through the [`PageDom`] port.
    #[must_use]
    pub fn mutations(&self) -> usize {
        self.mutations.get()
    }

    /// Value of an inline style property.
    #[must_use]
    pub fn style_of(&self, node: NodeId, name: &str) -> Option<String> {
        let nodes = self.nodes.borrow();
        nodes[node.0]
            .style
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    /// The serialized `style` attribute.
    #[must_use]
    pub fn inline_style(&self, node: NodeId) -> Option<String> {
        self.nodes.borrow()[node.0].style_text()
    }

    #[must_use]
    pub fn attribute_of(&self, node: NodeId, name: &str) -> Option<String> {
        read_attribute(&self.nodes.borrow()[node.0], name)
    }

    #[must_use]
    pub fn text_of(&self, node: NodeId) -> Option<String> {
        self.nodes.borrow()[node.0].text.clone()
    }

    #[must_use]
    pub fn children_of(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes.borrow()[node.0].children.clone()
    }

    /// Every attached element carrying `class`, in document order.
    #[must_use]
    pub fn find_by_class(&self, class: &str) -> Vec<NodeId> {
        self.search(Self::BODY, |node| node.has_class(class))
    }

    /// The button of the first mounted control with container `class`.
    #[must_use]
    pub fn control_button(&self, class: &str) -> Option<NodeId> {
        let container = self.find_by_class(class).into_iter().next()?;
        let nodes = self.nodes.borrow();
        nodes[container.0]
            .children
            .iter()
            .copied()
            .find(|child| nodes[child.0].tag == BUTTON_TAG)
    }

    /// Click the first control with container `class` and return the state
    /// it asks for.
    #[must_use]
    pub fn click_control(&self, class: &str) -> Option<ToggleState> {
        let button = self.control_button(class)?;
        self.attribute_of(button, ACTIVATES_ATTRIBUTE)?.parse().ok()
    }

    fn search(&self, scope: NodeId, matches: impl Fn(&NodeData) -> bool) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = nodes[scope.0].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &nodes[id.0];
            if matches(node) {
                found.push(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        found
    }

    fn is_attached(&self, node: NodeId) -> bool {
        let nodes = self.nodes.borrow();
        let mut current = node;
        loop {
            if current == Self::BODY {
                return true;
            }
            match nodes[current.0].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn touch(&self) {
        self.mutations.set(self.mutations.get() + 1);
    }
}

fn insert_into(nodes: &mut Vec<NodeData>, parent: NodeId, element: Element) -> NodeId {
    let id = NodeId(nodes.len());
    let mut data = NodeData::new(&element.tag);
    for (name, value) in element.attributes {
        if name == "style" {
            data.set_style_text(&value);
        } else {
            data.attributes.insert(name, value);
        }
    }
    for (name, value) in element.style {
        data.set_style(&name, Some(&value));
    }
    data.text = element.text;
    data.parent = Some(parent);
    nodes.push(data);
    nodes[parent.0].children.push(id);
    for child in element.children {
        insert_into(nodes, id, child);
    }
    id
}

fn read_attribute(node: &NodeData, name: &str) -> Option<String> {
    if name == "style" {
        node.style_text()
    } else {
        node.attributes.get(name).cloned()
    }
}

impl PageDom for MemoryPage {
    type Node = NodeId;

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.search(Self::BODY, |node| {
            node.attributes.get("id").is_some_and(|v| v == id)
        })
        .into_iter()
        .next()
    }

    fn elements_with_attribute(&self, name: &str, value: &str) -> Vec<NodeId> {
        self.search(Self::BODY, |node| {
            read_attribute(node, name).is_some_and(|v| v == value)
        })
    }

    fn elements_with_class(&self, scope: Option<&NodeId>, class: &str) -> Vec<NodeId> {
        let scope = scope.copied().unwrap_or(Self::BODY);
        if !self.is_attached(scope) {
            return Vec::new();
        }
        self.search(scope, |node| node.has_class(class))
    }

    fn elements_with_class_prefix(&self, scope: Option<&NodeId>, prefix: &str) -> Vec<NodeId> {
        let scope = scope.copied().unwrap_or(Self::BODY);
        if !self.is_attached(scope) {
            return Vec::new();
        }
        self.search(scope, |node| {
            node.attributes
                .get("class")
                .is_some_and(|classes| classes.starts_with(prefix))
        })
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.borrow()[node.0]
            .parent
            .filter(|parent| *parent != Self::BODY)
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.attribute_of(*node, name)
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) {
        {
            let mut nodes = self.nodes.borrow_mut();
            let data = &mut nodes[node.0];
            if name == "style" {
                data.set_style_text(value);
            } else {
                data.attributes.insert(name.to_string(), value.to_string());
            }
        }
        self.touch();
    }

    fn remove_attribute(&self, node: &NodeId, name: &str) {
        {
            let mut nodes = self.nodes.borrow_mut();
            let data = &mut nodes[node.0];
            if name == "style" {
                data.style.clear();
            } else {
                data.attributes.remove(name);
            }
        }
        self.touch();
    }

    fn style_property(&self, node: &NodeId, name: &str) -> Option<String> {
        self.style_of(*node, name)
    }

    fn set_style_property(&self, node: &NodeId, name: &str, value: Option<&str>) {
        self.nodes.borrow_mut()[node.0].set_style(name, value);
        self.touch();
    }

    fn remove(&self, node: &NodeId) {
        {
            let mut nodes = self.nodes.borrow_mut();
            if let Some(parent) = nodes[node.0].parent.take() {
                nodes[parent.0].children.retain(|child| child != node);
            }
        }
        self.touch();
    }

    fn mount_control(&self, host: &NodeId, view: &ControlView) -> Result<NodeId, FlashboardError> {
        let mut button = Element::new(BUTTON_TAG)
            .attr("type", view.kind.as_str())
            .attr(ACTIVATES_ATTRIBUTE, view.activates.to_string())
            .text(view.label.as_str());
        if view.outline {
            button = button.attr("outline", "outline");
        }
        let container = Element::new("div")
            .class(view.container_class.as_str())
            .child(button);
        let id = self.insert(Some(*host), container);
        self.touch();
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashboard_domain::style::Locator;
    use flashboard_domain::toggle::ControlLabels;

    fn page_with_workspace() -> (MemoryPage, NodeId) {
        let page = MemoryPage::new();
        let workspace = page.insert(
            None,
            Element::new("div")
                .id("workspace-content")
                .child(Element::new("div").class("Dashboards--panel"))
                .child(
                    Element::new("div")
                        .class("Dashboards--panel")
                        .child(Element::new("span").class("label")),
                ),
        );
        page.insert(None, Element::new("div").class("Dashboards--outside"));
        (page, workspace)
    }

    #[test]
    fn should_find_element_by_id() {
        let (page, workspace) = page_with_workspace();
        assert_eq!(page.element_by_id("workspace-content"), Some(workspace));
        assert_eq!(page.element_by_id("missing"), None);
    }

    #[test]
    fn should_scope_class_prefix_search() {
        let (page, workspace) = page_with_workspace();
        assert_eq!(page.elements_with_class_prefix(None, "Dashboards--").len(), 3);
        assert_eq!(
            page.elements_with_class_prefix(Some(&workspace), "Dashboards--")
                .len(),
            2
        );
    }

    #[test]
    fn should_match_whole_class_tokens_only() {
        let page = MemoryPage::new();
        page.insert(None, Element::new("div").class("report-header-extra"));
        let header = page.insert(None, Element::new("div").class("nav").class("report-header"));
        assert_eq!(page.elements_with_class(None, "report-header"), vec![header]);
    }

    #[test]
    fn should_not_return_body_as_parent() {
        let (page, workspace) = page_with_workspace();
        assert_eq!(page.parent(&workspace), None);
        let child = page.children_of(workspace)[0];
        assert_eq!(page.parent(&child), Some(workspace));
    }

    #[test]
    fn should_locate_ancestor_of_class() {
        let (page, workspace) = page_with_workspace();
        let found = page.locate(&Locator::class("label").ancestor(2));
        assert_eq!(found, vec![workspace]);
    }

    #[test]
    fn should_locate_nothing_when_scope_missing() {
        let (page, _) = page_with_workspace();
        let found = page.locate(&Locator::class_prefix("Dashboards--").within("nope"));
        assert!(found.is_empty());
    }

    #[test]
    fn should_keep_style_attribute_and_properties_in_sync() {
        let page = MemoryPage::new();
        let grid = page.insert(
            None,
            Element::new("div").attr("style", "display: grid; gap: 20px"),
        );
        assert_eq!(page.style_of(grid, "gap").as_deref(), Some("20px"));

        page.set_style_property(&grid, "padding", Some("4px"));
        assert_eq!(
            page.attribute(&grid, "style").as_deref(),
            Some("display: grid; gap: 20px; padding: 4px")
        );

        page.set_attribute(&grid, "style", "gap: 10px");
        assert_eq!(page.style_of(grid, "display"), None);
        assert_eq!(page.style_of(grid, "gap").as_deref(), Some("10px"));
    }

    #[test]
    fn should_drop_removed_attribute() {
        let page = MemoryPage::new();
        let grid = page.insert(
            None,
            Element::new("div")
                .attr("data-saved", "gap: 20px")
                .attr("style", "gap: 10px"),
        );
        page.remove_attribute(&grid, "data-saved");
        page.remove_attribute(&grid, "style");
        assert_eq!(page.attribute_of(grid, "data-saved"), None);
        assert_eq!(page.inline_style(grid), None);
        assert_eq!(page.mutations(), 2);
    }

    #[test]
    fn should_remove_style_property_when_value_is_none() {
        let page = MemoryPage::new();
        let node = page.insert(None, Element::new("div").style("display", "none"));
        page.set_style_property(&node, "display", None);
        assert_eq!(page.inline_style(node), None);
    }

    #[test]
    fn should_count_port_mutations_only() {
        let (page, workspace) = page_with_workspace();
        assert_eq!(page.mutations(), 0);
        page.set_style_property(&workspace, "padding", Some("10px"));
        page.remove(&workspace);
        assert_eq!(page.mutations(), 2);
        assert_eq!(page.element_by_id("workspace-content"), None);
    }

    #[test]
    fn should_mount_clickable_control() {
        let page = MemoryPage::new();
        let host = page.insert(None, Element::new("div").class("report-header"));
        let labels = ControlLabels {
            enable: "Enable Flashboard".to_string(),
            disable: "Disable Flashboard".to_string(),
        };
        let view = ControlView::for_state(ToggleState::Disabled, "flashboard", "primary", &labels);
        page.mount_control(&host, &view).unwrap();

        let button = page.control_button("flashboard").unwrap();
        assert_eq!(page.text_of(button).as_deref(), Some("Enable Flashboard"));
        assert_eq!(page.attribute_of(button, "outline").as_deref(), Some("outline"));
        assert_eq!(page.attribute_of(button, "type").as_deref(), Some("primary"));
        assert_eq!(page.click_control("flashboard"), Some(ToggleState::Enabled));
    }

    #[test]
    fn should_detach_everything_on_clear() {
        let (page, workspace) = page_with_workspace();
        page.clear();
        assert!(page.find_by_class("Dashboards--panel").is_empty());
        assert!(page.elements_with_class(Some(&workspace), "label").is_empty());
    }
}
