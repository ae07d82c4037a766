//! Errors raised at the JavaScript boundary.

use flashboard_domain::error::FlashboardError;
use wasm_bindgen::JsValue;

#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("no browser window")]
    NoWindow,

    #[error("no document in the browser window")]
    NoDocument,

    /// A host API the extension relies on is not exposed.
    #[error("host API `{0}` is not available")]
    MissingApi(&'static str),

    /// A JavaScript call threw or a promise rejected.
    #[error("javascript error: {0}")]
    Js(String),

    #[error("invalid JSON at the JavaScript boundary")]
    Json(#[from] serde_json::Error),
}

impl WebError {
    pub(crate) fn js(value: &JsValue) -> Self {
        let message = value
            .as_string()
            .or_else(|| {
                js_sys::Reflect::get(value, &JsValue::from_str("message"))
                    .ok()
                    .and_then(|m| m.as_string())
            })
            .unwrap_or_else(|| format!("{value:?}"));
        Self::Js(message)
    }

    /// Report this failure as a field store error.
    pub(crate) fn persistence(self) -> FlashboardError {
        FlashboardError::Persistence(Box::new(self))
    }
}

impl From<WebError> for FlashboardError {
    fn from(err: WebError) -> Self {
        FlashboardError::Page(Box::new(err))
    }
}
