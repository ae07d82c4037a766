//! [`PageDom`] over the live document.

use std::cell::RefCell;

use flashboard_app::ports::PageDom;
use flashboard_domain::error::FlashboardError;
use flashboard_domain::toggle::ControlView;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Element, HtmlCollection, HtmlElement, NodeList};

use crate::error::WebError;
use crate::host::Activations;

/// The host page as seen by flashboard.
pub struct WebPage {
    document: Document,
    activations: Activations,
    // Click handler of the mounted control. Replaced on every mount, which
    // always follows the removal of the previous control.
    listener: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl WebPage {
    pub fn new(document: Document, activations: Activations) -> Self {
        Self {
            document,
            activations,
            listener: RefCell::new(None),
        }
    }

    /// The page of the current browser window.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::NoWindow`] or [`WebError::NoDocument`] outside a
    /// browser page.
    pub fn from_window(activations: Activations) -> Result<Self, WebError> {
        let document = web_sys::window()
            .ok_or(WebError::NoWindow)?
            .document()
            .ok_or(WebError::NoDocument)?;
        Ok(Self::new(document, activations))
    }

    fn select_all(&self, scope: Option<&Element>, selector: &str) -> Vec<Element> {
        let found = match scope {
            Some(scope) => scope.query_selector_all(selector),
            None => self.document.query_selector_all(selector),
        };
        match found {
            Ok(list) => node_list(&list),
            Err(err) => {
                tracing::debug!(selector, error = %WebError::js(&err), "invalid selector");
                Vec::new()
            }
        }
    }

    fn build_control(&self, view: &ControlView) -> Result<Element, WebError> {
        let container = self
            .document
            .create_element("div")
            .map_err(|e| WebError::js(&e))?;
        container.set_class_name(&view.container_class);

        let button = self
            .document
            .create_element("aha-button")
            .map_err(|e| WebError::js(&e))?;
        button
            .set_attribute("type", &view.kind)
            .map_err(|e| WebError::js(&e))?;
        if view.outline {
            button
                .set_attribute("outline", "outline")
                .map_err(|e| WebError::js(&e))?;
        }
        button.set_text_content(Some(&view.label));

        let activations = self.activations.clone();
        let target = view.activates;
        let listener = Closure::<dyn FnMut()>::new(move || activations.emit(target));
        button
            .add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())
            .map_err(|e| WebError::js(&e))?;
        self.listener.replace(Some(listener));

        container
            .append_child(&button)
            .map_err(|e| WebError::js(&e))?;
        Ok(container)
    }
}

impl PageDom for WebPage {
    type Node = Element;

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn elements_with_attribute(&self, name: &str, value: &str) -> Vec<Element> {
        self.select_all(None, &format!("[{name}=\"{}\"]", escape(value)))
    }

    fn elements_with_class(&self, scope: Option<&Element>, class: &str) -> Vec<Element> {
        let collection = match scope {
            Some(scope) => scope.get_elements_by_class_name(class),
            None => self.document.get_elements_by_class_name(class),
        };
        html_collection(&collection)
    }

    fn elements_with_class_prefix(&self, scope: Option<&Element>, prefix: &str) -> Vec<Element> {
        self.select_all(scope, &format!("[class^=\"{}\"]", escape(prefix)))
    }

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) {
        if let Err(err) = node.set_attribute(name, value) {
            tracing::warn!(name, error = %WebError::js(&err), "failed to set attribute");
        }
    }

    fn remove_attribute(&self, node: &Element, name: &str) {
        if let Err(err) = node.remove_attribute(name) {
            tracing::warn!(name, error = %WebError::js(&err), "failed to remove attribute");
        }
    }

    fn style_property(&self, node: &Element, name: &str) -> Option<String> {
        let value = node
            .dyn_ref::<HtmlElement>()?
            .style()
            .get_property_value(name)
            .ok()?;
        (!value.is_empty()).then_some(value)
    }

    fn set_style_property(&self, node: &Element, name: &str, value: Option<&str>) {
        let Some(element) = node.dyn_ref::<HtmlElement>() else {
            tracing::debug!(name, "not an HTML element, style left untouched");
            return;
        };
        let style = element.style();
        let result = match value {
            Some(value) => style.set_property(name, value),
            None => style.remove_property(name).map(|_| ()),
        };
        if let Err(err) = result {
            tracing::warn!(name, error = %WebError::js(&err), "failed to write style property");
        }
    }

    fn remove(&self, node: &Element) {
        node.remove();
    }

    fn mount_control(&self, host: &Element, view: &ControlView) -> Result<Element, FlashboardError> {
        let container = self.build_control(view)?;
        host.append_child(&container)
            .map_err(|e| WebError::js(&e))?;
        Ok(container)
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn node_list(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|idx| list.item(idx))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn html_collection(collection: &HtmlCollection) -> Vec<Element> {
    (0..collection.length())
        .filter_map(|idx| collection.item(idx))
        .collect()
}
