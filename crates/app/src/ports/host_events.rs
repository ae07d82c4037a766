//! Host event port: the app lifecycle signals and control activations.
//!
//! `ready` fires once per page load, `reloaded` any number of times after.
//! Handlers carry no payload except the target state of an activation.

use futures_util::future::LocalBoxFuture;

use flashboard_domain::toggle::ToggleState;

/// Subscription interface offered by the host application.
pub trait HostEvents {
    /// Register `handler` for the "app ready" signal.
    fn on_ready(&self, handler: Box<dyn Fn()>);

    /// Register `handler` for the "app reloaded" signal.
    fn on_reload(&self, handler: Box<dyn Fn()>);

    /// Register `handler` for clicks on the rendered control. The argument is
    /// the [`ControlView::activates`](flashboard_domain::toggle::ControlView::activates)
    /// state of the clicked control.
    fn on_activate(&self, handler: Box<dyn Fn(ToggleState)>);
}

/// Runs futures on the current thread's executor.
pub trait Spawn {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>);
}
