//! The commit sink: where final slider values go.
//!
//! A sink may be synchronous or asynchronous and may fail. Failures, including
//! panics, are folded into [`CommitError`] by [`deliver`] so the interaction
//! state can always settle.

use std::{
    any::Any,
    future::Future,
    panic::{AssertUnwindSafe, catch_unwind},
};

use futures_util::{
    FutureExt,
    future::{self, BoxFuture},
};

use crate::error::CommitError;

/// Future returned by [`CommitSink::commit`].
pub type CommitFuture = BoxFuture<'static, Result<(), CommitError>>;

/// Receives the clamped final value at the end of every gesture.
///
/// Any `Fn(f32) -> impl Future<Output = Result<(), CommitError>>` closure is a
/// sink. Use [`sync_sink`] for plain synchronous closures.
pub trait CommitSink: Send + Sync + 'static {
    /// Starts committing `value`.
    fn commit(&self, value: f32) -> CommitFuture;
}

impl<F, Fut> CommitSink for F
where
    F: Fn(f32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), CommitError>> + Send + 'static,
{
    fn commit(&self, value: f32) -> CommitFuture {
        Box::pin(self(value))
    }
}

/// Sink that accepts every value and does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl CommitSink for NoopSink {
    fn commit(&self, _value: f32) -> CommitFuture {
        Box::pin(future::ready(Ok(())))
    }
}

/// Adapts a synchronous closure into a [`CommitSink`].
///
/// ```
/// use glide_slider::{CommitSink, sync_sink};
///
/// let sink = sync_sink(|value| {
///     println!("slider value: {value}");
///     Ok(())
/// });
/// let _pending = sink.commit(12.5);
/// ```
pub fn sync_sink<F>(handler: F) -> impl CommitSink
where
    F: Fn(f32) -> Result<(), CommitError> + Send + Sync + 'static,
{
    move |value: f32| future::ready(handler(value))
}

/// Drives `sink` for `value`, turning panics into [`CommitError::Panicked`].
pub(crate) async fn deliver(sink: &dyn CommitSink, value: f32) -> Result<(), CommitError> {
    let pending = catch_unwind(AssertUnwindSafe(|| sink.commit(value)))
        .map_err(|payload| CommitError::Panicked(panic_message(payload.as_ref())))?;

    match AssertUnwindSafe(pending).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(CommitError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[tokio::test]
    async fn test_async_closure_sink_receives_value() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let record = seen.clone();
        let sink = move |value: f32| {
            let record = record.clone();
            async move {
                record.lock().unwrap().push(value);
                Ok::<(), CommitError>(())
            }
        };

        deliver(&sink, 42.0).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![42.0]);
    }

    #[tokio::test]
    async fn test_rejection_is_returned() {
        let sink = sync_sink(|_| Err(CommitError::rejected("offline")));
        let err = deliver(&sink, 1.0).await.unwrap_err();
        assert!(matches!(err, CommitError::Rejected(ref msg) if msg == "offline"));
    }

    #[tokio::test]
    async fn test_panics_become_errors() {
        let eager = sync_sink(|_| panic!("sink exploded"));
        let err = deliver(&eager, 1.0).await.unwrap_err();
        assert!(matches!(err, CommitError::Panicked(ref msg) if msg == "sink exploded"));

        let lazy = |_: f32| async {
            if true {
                panic!("{}", String::from("late failure"));
            }
            Ok::<(), CommitError>(())
        };
        let err = deliver(&lazy, 1.0).await.unwrap_err();
        assert!(matches!(err, CommitError::Panicked(ref msg) if msg == "late failure"));
    }

    #[tokio::test]
    async fn test_noop_sink_accepts() {
        assert!(deliver(&NoopSink, 3.0).await.is_ok());
    }
}
