//! Host signals, timer and spawner backed by tokio.

use std::cell::RefCell;
use std::time::Duration;

use futures_util::future::LocalBoxFuture;

use flashboard_app::ports::{HostEvents, Spawn, Timer};
use flashboard_domain::toggle::ToggleState;

/// Host event source fired by hand.
#[derive(Default)]
pub struct MemoryHostEvents {
    ready: RefCell<Vec<Box<dyn Fn()>>>,
    reloaded: RefCell<Vec<Box<dyn Fn()>>>,
    activated: RefCell<Vec<Box<dyn Fn(ToggleState)>>>,
}

impl std::fmt::Debug for MemoryHostEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryHostEvents")
            .field("ready", &self.ready.borrow().len())
            .field("reloaded", &self.reloaded.borrow().len())
            .field("activated", &self.activated.borrow().len())
            .finish()
    }
}

impl MemoryHostEvents {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit the "app ready" signal.
    pub fn fire_ready(&self) {
        for handler in self.ready.borrow().iter() {
            handler();
        }
    }

    /// Emit the "app reloaded" signal.
    pub fn fire_reload(&self) {
        for handler in self.reloaded.borrow().iter() {
            handler();
        }
    }

    /// Report a click on the control asking for `target`.
    pub fn activate(&self, target: ToggleState) {
        for handler in self.activated.borrow().iter() {
            handler(target);
        }
    }
}

impl HostEvents for MemoryHostEvents {
    fn on_ready(&self, handler: Box<dyn Fn()>) {
        self.ready.borrow_mut().push(handler);
    }

    fn on_reload(&self, handler: Box<dyn Fn()>) {
        self.reloaded.borrow_mut().push(handler);
    }

    fn on_activate(&self, handler: Box<dyn Fn(ToggleState)>) {
        self.activated.borrow_mut().push(handler);
    }
}

/// [`Timer`] over `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// [`Spawn`] over `tokio::task::spawn_local`.
///
/// Tasks must be spawned from inside a `tokio::task::LocalSet`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSpawner;

impl Spawn for LocalSpawner {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        tokio::task::spawn_local(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn should_call_every_registered_handler() {
        let events = MemoryHostEvents::new();
        let count = Rc::new(Cell::new(0));
        for _ in 0..2 {
            let count = Rc::clone(&count);
            events.on_ready(Box::new(move || count.set(count.get() + 1)));
        }
        events.fire_ready();
        events.fire_reload();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn should_pass_target_state_to_activation_handlers() {
        let events = MemoryHostEvents::new();
        let seen = Rc::new(Cell::new(None));
        let sink = Rc::clone(&seen);
        events.on_activate(Box::new(move |target| sink.set(Some(target))));
        events.activate(ToggleState::Enabled);
        assert_eq!(seen.get(), Some(ToggleState::Enabled));
    }

    #[tokio::test(start_paused = true)]
    async fn should_sleep_for_the_requested_duration() {
        let start = tokio::time::Instant::now();
        TokioTimer.sleep(Duration::from_millis(250)).await;
        assert!(start.elapsed() >= Duration::from_millis(250));
    }
}
