//! [`FieldStore`] over the host's `aha.user` extension field API.

use flashboard_app::ports::FieldStore;
use flashboard_domain::error::FlashboardError;
use js_sys::{Function, JSON, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::error::WebError;

/// Per-user extension fields of the signed-in user.
pub struct AhaFieldStore {
    user: JsValue,
}

impl AhaFieldStore {
    /// Bind to `aha.user`.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::MissingApi`] when the host does not expose it.
    pub fn new(aha: &JsValue) -> Result<Self, WebError> {
        let user = Reflect::get(aha, &JsValue::from_str("user"))
            .ok()
            .filter(|user| user.is_object())
            .ok_or(WebError::MissingApi("aha.user"))?;
        Ok(Self { user })
    }

    async fn call(
        &self,
        method: &'static str,
        args: &[JsValue],
    ) -> Result<JsValue, WebError> {
        let function: Function = Reflect::get(&self.user, &JsValue::from_str(method))
            .ok()
            .and_then(|f| f.dyn_into().ok())
            .ok_or(WebError::MissingApi(method))?;
        let this = &self.user;
        let returned = match args {
            [a, b] => function.call2(this, a, b),
            [a, b, c] => function.call3(this, a, b, c),
            _ => function.call0(this),
        }
        .map_err(|e| WebError::js(&e))?;
        // Plain values are accepted as well as promises.
        let promise = Promise::resolve(&returned);
        JsFuture::from(promise).await.map_err(|e| WebError::js(&e))
    }
}

fn from_js(value: &JsValue) -> Result<Option<serde_json::Value>, WebError> {
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    let text: String = JSON::stringify(value)
        .map_err(|e| WebError::js(&e))?
        .into();
    Ok(Some(serde_json::from_str(&text)?))
}

fn to_js(value: &serde_json::Value) -> Result<JsValue, WebError> {
    let text = serde_json::to_string(value)?;
    JSON::parse(&text).map_err(|e| WebError::js(&e))
}

impl FieldStore for AhaFieldStore {
    async fn get(
        &self,
        extension_id: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, FlashboardError> {
        let args = [JsValue::from_str(extension_id), JsValue::from_str(key)];
        let value = self
            .call("getExtensionField", &args)
            .await
            .map_err(WebError::persistence)?;
        from_js(&value).map_err(WebError::persistence)
    }

    async fn set(
        &self,
        extension_id: &str,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), FlashboardError> {
        let record = to_js(&value).map_err(WebError::persistence)?;
        let args = [JsValue::from_str(extension_id), JsValue::from_str(key), record];
        self.call("setExtensionField", &args)
            .await
            .map_err(WebError::persistence)?;
        Ok(())
    }
}
