//! Timer port: fixed delays without blocking the UI thread.

use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

/// Suspends the calling task for a fixed duration.
pub trait Timer {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

impl<T: Timer> Timer for Rc<T> {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        (**self).sleep(duration)
    }
}
