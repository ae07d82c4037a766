//! Host lifecycle signals, timer and task spawner in the browser.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use flashboard_app::ports::{HostEvents, Spawn, Timer};
use flashboard_domain::toggle::ToggleState;
use futures_util::future::LocalBoxFuture;
use gloo_timers::future::TimeoutFuture;
use js_sys::{Function, Object, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

use crate::error::WebError;

const READY_EVENT: &str = "aha.extensions.ready";
const RELOADED_EVENT: &str = "aha.extensions.reloaded";

/// Fan-out of control clicks, shared by the page (which owns the buttons)
/// and the host events (which hand the clicks to the lifecycle).
#[derive(Clone, Default)]
pub struct Activations(Rc<RefCell<Vec<Box<dyn Fn(ToggleState)>>>>);

impl Activations {
    fn register(&self, handler: Box<dyn Fn(ToggleState)>) {
        self.0.borrow_mut().push(handler);
    }

    pub(crate) fn emit(&self, target: ToggleState) {
        for handler in self.0.borrow().iter() {
            handler(target);
        }
    }
}

/// Subscriptions to `aha.on({ event })`.
pub struct AhaHostEvents {
    aha: JsValue,
    on: Function,
    activations: Activations,
}

impl AhaHostEvents {
    /// Bind to `aha.on`.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::MissingApi`] when the host does not expose it.
    pub fn new(aha: JsValue, activations: Activations) -> Result<Self, WebError> {
        let on = Reflect::get(&aha, &JsValue::from_str("on"))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or(WebError::MissingApi("aha.on"))?;
        Ok(Self {
            aha,
            on,
            activations,
        })
    }

    fn subscribe(&self, event: &'static str, handler: Box<dyn Fn()>) {
        let filter = Object::new();
        if let Err(err) = Reflect::set(&filter, &JsValue::from_str("event"), &JsValue::from_str(event)) {
            tracing::warn!(event, error = %WebError::js(&err), "failed to build event filter");
            return;
        }
        let callback = Closure::<dyn Fn()>::wrap(handler);
        match self.on.call2(&self.aha, &filter, callback.as_ref().unchecked_ref()) {
            // Host subscriptions last for the page's lifetime.
            Ok(_) => callback.forget(),
            Err(err) => tracing::warn!(event, error = %WebError::js(&err), "failed to subscribe"),
        }
    }
}

impl HostEvents for AhaHostEvents {
    fn on_ready(&self, handler: Box<dyn Fn()>) {
        self.subscribe(READY_EVENT, handler);
    }

    fn on_reload(&self, handler: Box<dyn Fn()>) {
        self.subscribe(RELOADED_EVENT, handler);
    }

    fn on_activate(&self, handler: Box<dyn Fn(ToggleState)>) {
        self.activations.register(handler);
    }
}

/// [`Timer`] over `setTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooTimer;

impl Timer for GlooTimer {
    async fn sleep(&self, duration: Duration) {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        TimeoutFuture::new(millis).await;
    }
}

/// [`Spawn`] onto the browser's microtask queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct WasmSpawner;

impl Spawn for WasmSpawner {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}
