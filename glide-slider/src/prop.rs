//! Shared callback handles used in slider configuration.

use std::sync::Arc;

/// Cloneable handle to a shared `Fn(T) -> R`.
pub struct CallbackWith<T, R = ()> {
    handler: Arc<dyn Fn(T) -> R + Send + Sync>,
}

impl<T, R> CallbackWith<T, R> {
    /// Create a callback handle from a closure.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Invoke the callback with an argument.
    pub fn call(&self, value: T) -> R {
        (self.handler)(value)
    }
}

impl<T, R> Clone for CallbackWith<T, R> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
        }
    }
}

/// Observer notified whenever the interaction flag flips.
///
/// Receives `true` when a gesture starts driving the value and `false` once
/// the settle delay after the commit has elapsed. It runs while the flag
/// transition is held and must not feed touches to the same slider.
pub type ActiveObserver = CallbackWith<bool>;

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_clones_share_the_handler() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let a = CallbackWith::new(move |step: usize| {
            counter.fetch_add(step, Ordering::SeqCst);
        });
        let b = a.clone();

        a.call(2);
        b.call(3);
        assert_eq!(hits.load(Ordering::SeqCst), 5);
    }
}
