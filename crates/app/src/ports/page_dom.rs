//! Page port: the host-rendered document as an external mutable resource.
//!
//! The page offers no transactions and may still be rendering when a call
//! arrives, so lookups return empty results rather than failing, and the
//! use-cases make every write idempotent.

use std::rc::Rc;

use flashboard_domain::error::FlashboardError;
use flashboard_domain::style::Locator;
use flashboard_domain::toggle::ControlView;

/// Element lookup and mutation primitives over the host page.
pub trait PageDom {
    /// Handle to a live element.
    type Node: Clone;

    /// The element with this `id`, if rendered.
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// Every element whose attribute `name` equals `value`, in document order.
    fn elements_with_attribute(&self, name: &str, value: &str) -> Vec<Self::Node>;

    /// Every element carrying `class`, in document order. With a `scope`,
    /// only its descendants are searched.
    fn elements_with_class(&self, scope: Option<&Self::Node>, class: &str) -> Vec<Self::Node>;

    /// Every element whose `class` attribute starts with `prefix`.
    fn elements_with_class_prefix(
        &self,
        scope: Option<&Self::Node>,
        prefix: &str,
    ) -> Vec<Self::Node>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);

    fn remove_attribute(&self, node: &Self::Node, name: &str);

    /// Inline style property value; `None` when the property is not set inline.
    fn style_property(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// Set an inline style property, or remove it when `value` is `None`.
    fn set_style_property(&self, node: &Self::Node, name: &str, value: Option<&str>);

    /// Detach an element from the page.
    fn remove(&self, node: &Self::Node);

    /// Append a control described by `view` to `host` and return its container.
    ///
    /// Activating the control must be reported through
    /// [`HostEvents::on_activate`](super::HostEvents::on_activate) with
    /// [`ControlView::activates`].
    ///
    /// # Errors
    ///
    /// Returns [`FlashboardError::Page`] when the page refuses to create it.
    fn mount_control(
        &self,
        host: &Self::Node,
        view: &ControlView,
    ) -> Result<Self::Node, FlashboardError>;

    /// Resolve a [`Locator`] to the elements it designates. Empty when any
    /// step of the lookup is not rendered.
    fn locate(&self, locator: &Locator) -> Vec<Self::Node> {
        match locator {
            Locator::Id { id } => self.element_by_id(id).into_iter().collect(),
            Locator::Class {
                class,
                within,
                ancestor,
            } => {
                let Some(scope) = resolve_scope(self, within.as_deref()) else {
                    return Vec::new();
                };
                let Some(mut node) = self
                    .elements_with_class(scope.as_ref(), class)
                    .into_iter()
                    .next()
                else {
                    return Vec::new();
                };
                for _ in 0..*ancestor {
                    match self.parent(&node) {
                        Some(parent) => node = parent,
                        None => return Vec::new(),
                    }
                }
                vec![node]
            }
            Locator::ClassPrefix { prefix, within } => {
                match resolve_scope(self, within.as_deref()) {
                    Some(scope) => self.elements_with_class_prefix(scope.as_ref(), prefix),
                    None => Vec::new(),
                }
            }
        }
    }
}

/// `Some(None)` for a document-wide search, `Some(Some(node))` for a scoped
/// one, `None` when the scope element is not rendered.
fn resolve_scope<D: PageDom + ?Sized>(dom: &D, within: Option<&str>) -> Option<Option<D::Node>> {
    match within {
        None => Some(None),
        Some(id) => dom.element_by_id(id).map(Some),
    }
}

impl<T: PageDom + ?Sized> PageDom for Rc<T> {
    type Node = T::Node;

    fn element_by_id(&self, id: &str) -> Option<Self::Node> {
        (**self).element_by_id(id)
    }

    fn elements_with_attribute(&self, name: &str, value: &str) -> Vec<Self::Node> {
        (**self).elements_with_attribute(name, value)
    }

    fn elements_with_class(&self, scope: Option<&Self::Node>, class: &str) -> Vec<Self::Node> {
        (**self).elements_with_class(scope, class)
    }

    fn elements_with_class_prefix(
        &self,
        scope: Option<&Self::Node>,
        prefix: &str,
    ) -> Vec<Self::Node> {
        (**self).elements_with_class_prefix(scope, prefix)
    }

    fn parent(&self, node: &Self::Node) -> Option<Self::Node> {
        (**self).parent(node)
    }

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String> {
        (**self).attribute(node, name)
    }

    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str) {
        (**self).set_attribute(node, name, value);
    }

    fn remove_attribute(&self, node: &Self::Node, name: &str) {
        (**self).remove_attribute(node, name);
    }

    fn style_property(&self, node: &Self::Node, name: &str) -> Option<String> {
        (**self).style_property(node, name)
    }

    fn set_style_property(&self, node: &Self::Node, name: &str, value: Option<&str>) {
        (**self).set_style_property(node, name, value);
    }

    fn remove(&self, node: &Self::Node) {
        (**self).remove(node);
    }

    fn mount_control(
        &self,
        host: &Self::Node,
        view: &ControlView,
    ) -> Result<Self::Node, FlashboardError> {
        (**self).mount_control(host, view)
    }
}
