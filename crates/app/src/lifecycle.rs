//! Lifecycle: routes host signals to the toggle controller.
//!
//! "App ready" triggers an initialization right away and again after each
//! configured delay, so a host UI that renders late is still picked up.
//! "App reloaded" triggers one initialization. Control activations switch the
//! state. Every failure is logged here and goes no further.

use std::rc::Rc;
use std::time::Duration;

use futures_util::future::join_all;

use flashboard_domain::error::FlashboardError;
use flashboard_domain::toggle::ToggleState;

use crate::ports::{FieldStore, HostEvents, PageDom, Spawn, Timer};
use crate::services::toggle_controller::ToggleController;

/// A signal from the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Ready,
    Reloaded,
    /// The control was clicked; carries the state it asks for.
    Activated(ToggleState),
}

/// Drives a [`ToggleController`] from host signals.
pub struct Lifecycle<D, S, T> {
    controller: ToggleController<D, S, T>,
}

impl<D, S, T> Lifecycle<D, S, T>
where
    D: PageDom,
    S: FieldStore,
    T: Timer,
{
    pub fn new(controller: ToggleController<D, S, T>) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &ToggleController<D, S, T> {
        &self.controller
    }

    /// Handle one host signal to completion.
    pub async fn dispatch(&self, event: HostEvent) {
        tracing::debug!(?event, "host event");
        match event {
            HostEvent::Ready => self.on_ready().await,
            HostEvent::Reloaded => self.on_reload().await,
            HostEvent::Activated(target) => self.on_activate(target).await,
        }
    }

    /// Initialize now and at every configured re-check offset. The delayed
    /// checks run concurrently, so a slow one does not push the others back.
    pub async fn on_ready(&self) {
        let offsets = std::iter::once(Duration::ZERO)
            .chain(self.controller.settings().timing.recheck_delays());
        let checks = offsets.map(|offset| async move {
            if !offset.is_zero() {
                self.controller.timer().sleep(offset).await;
            }
            self.initialize().await;
        });
        join_all(checks).await;
    }

    pub async fn on_reload(&self) {
        self.initialize().await;
    }

    pub async fn on_activate(&self, target: ToggleState) {
        match self.controller.set_enabled(target.is_enabled()).await {
            Ok(state) => tracing::debug!(%state, "control activated"),
            Err(err) => absorb(&err, "activation"),
        }
    }

    async fn initialize(&self) {
        match self.controller.initialize().await {
            Ok(Some(state)) => tracing::debug!(%state, "initialized"),
            Ok(None) => {}
            Err(err) => absorb(&err, "initialization"),
        }
    }
}

impl<D, S, T> Lifecycle<D, S, T>
where
    D: PageDom + 'static,
    S: FieldStore + 'static,
    T: Timer + 'static,
{
    /// Subscribe to the host's signals. Each signal spawns its handling on
    /// `spawner`, so overlapping signals interleave on the current thread.
    pub fn attach<E, SP>(self: &Rc<Self>, events: &E, spawner: &Rc<SP>)
    where
        E: HostEvents + ?Sized,
        SP: Spawn + 'static,
    {
        events.on_ready(self.handler(spawner, || HostEvent::Ready));
        events.on_reload(self.handler(spawner, || HostEvent::Reloaded));

        let lifecycle = Rc::clone(self);
        let spawner = Rc::clone(spawner);
        events.on_activate(Box::new(move |target| {
            let lifecycle = Rc::clone(&lifecycle);
            spawner.spawn_local(Box::pin(async move {
                lifecycle.dispatch(HostEvent::Activated(target)).await;
            }));
        }));
    }

    fn handler<SP>(
        self: &Rc<Self>,
        spawner: &Rc<SP>,
        event: impl Fn() -> HostEvent + 'static,
    ) -> Box<dyn Fn()>
    where
        SP: Spawn + 'static,
    {
        let lifecycle = Rc::clone(self);
        let spawner = Rc::clone(spawner);
        Box::new(move || {
            let lifecycle = Rc::clone(&lifecycle);
            let event = event();
            spawner.spawn_local(Box::pin(async move {
                lifecycle.dispatch(event).await;
            }));
        })
    }
}

fn absorb(err: &FlashboardError, during: &str) {
    if err.is_transient() {
        tracing::debug!(error = %err, during, "nothing to do yet");
    } else {
        tracing::warn!(error = %err, during, "flashboard step failed");
    }
}

