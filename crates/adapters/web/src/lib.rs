//! # flashboard-adapter-web
//!
//! Browser entry point of the flashboard extension.
//!
//! ## Responsibilities
//! - Implement the `flashboard-app` ports against the real host:
//!   - [`WebPage`]: `PageDom` over `web_sys::Document`
//!   - [`AhaFieldStore`]: `FieldStore` over `aha.user.{get,set}ExtensionField`
//!   - [`AhaHostEvents`]: `HostEvents` over `aha.on({ event })`
//!   - [`GlooTimer`] / [`WasmSpawner`]: `setTimeout` and the microtask queue
//! - Route `tracing` output to the browser console
//! - Wire everything together in [`start`]
//!
//! Built with `wasm-pack build --target web`; excluded from the workspace.

mod error;
mod host;
mod logging;
mod page;
mod store;

use std::rc::Rc;

use flashboard_app::lifecycle::Lifecycle;
use flashboard_app::services::toggle_controller::ToggleController;
use flashboard_app::settings::Settings;
use js_sys::Reflect;
use wasm_bindgen::prelude::*;

pub use error::WebError;
pub use host::{Activations, AhaHostEvents, GlooTimer, WasmSpawner};
pub use page::WebPage;
pub use store::AhaFieldStore;

const EMBEDDED_SETTINGS: &str = include_str!("../../../../flashboard.toml");

fn wire() -> Result<(), WebError> {
    let (settings, rejected) = match Settings::from_toml_str(EMBEDDED_SETTINGS) {
        Ok(settings) => (settings, None),
        Err(err) => (Settings::default(), Some(err)),
    };
    logging::init(&settings.logging.filter);
    if let Some(err) = rejected {
        tracing::warn!(error = %err, "embedded settings rejected, using defaults");
    }

    let aha = Reflect::get(&js_sys::global(), &JsValue::from_str("aha"))
        .ok()
        .filter(|aha| aha.is_object())
        .ok_or(WebError::MissingApi("aha"))?;

    let activations = Activations::default();
    let page = WebPage::from_window(activations.clone())?;
    let store = AhaFieldStore::new(&aha)?;
    let events = AhaHostEvents::new(aha, activations)?;

    let controller = ToggleController::new(page, store, GlooTimer, settings);
    let lifecycle = Rc::new(Lifecycle::new(controller));
    lifecycle.attach(&events, &Rc::new(WasmSpawner));

    tracing::info!("flashboard attached");
    Ok(())
}

/// Module entry point, run once when the extension script loads.
///
/// # Errors
///
/// Returns the reason the extension could not attach to the host.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    wire().map_err(|err| {
        tracing::error!(error = %err, "flashboard failed to start");
        JsValue::from_str(&err.to_string())
    })
}
