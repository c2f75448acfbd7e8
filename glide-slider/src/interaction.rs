//! Interaction state machine.
//!
//! ```text
//!          begin                    end / cancel
//!  Idle ───────────▶ Interacting ───────────────▶ Settling
//!   ▲                  ▲    │ update                 │
//!   │                  │ ◀──┘                        │
//!   │                  └────────── begin ────────────┤
//!   └──────────── settle delay elapsed ──────────────┘
//! ```
//!
//! The interaction flag and its generation live in one atomic word, so the
//! delayed clear only succeeds if no newer interaction started after it was
//! scheduled. Starting an interaction also wakes and cancels any pending
//! settle timer.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use parking_lot::Mutex;
use tokio::{runtime::Handle, sync::Notify, task::JoinHandle};
use tracing::{debug, error, instrument, trace};

use crate::{
    geometry::GeometryTracker,
    mapper::{ValueRange, absolute_to_value},
    prop::ActiveObserver,
    shared_value::SharedValue,
    sink::{CommitSink, deliver},
};

/// Debounce between a commit and the interaction flag clearing.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Observable phase of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionPhase {
    /// No gesture is driving the value and the flag is clear.
    Idle,
    /// A gesture is driving the value.
    Interacting,
    /// The gesture ended; the flag stays raised until the settle delay elapses.
    Settling,
}

const ACTIVE_BIT: u64 = 1;

/// Interaction flag packed with the generation of the interaction that last
/// raised it: `generation << 1 | active`.
///
/// Transitions and their observer calls happen under `transition`, so the
/// observer sees flips in the same order the flag takes them.
struct ActiveFlag {
    state: AtomicU64,
    transition: Mutex<()>,
    cancel_settle: Notify,
    observer: Option<ActiveObserver>,
}

impl ActiveFlag {
    fn new(observer: Option<ActiveObserver>) -> Self {
        Self {
            state: AtomicU64::new(0),
            transition: Mutex::new(()),
            cancel_settle: Notify::new(),
            observer,
        }
    }

    fn is_active(&self) -> bool {
        self.state.load(Ordering::Acquire) & ACTIVE_BIT != 0
    }

    fn generation(&self) -> u64 {
        self.state.load(Ordering::Acquire) >> 1
    }

    /// Starts a new interaction and returns its generation.
    fn raise(&self) -> u64 {
        let previous = {
            let _transition = self.transition.lock();
            let previous = self
                .state
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |state| {
                    Some((((state >> 1) + 1) << 1) | ACTIVE_BIT)
                })
                .unwrap_or_else(|state| state);
            if previous & ACTIVE_BIT == 0 {
                self.notify(true);
            }
            previous
        };
        self.cancel_settle.notify_waiters();
        (previous >> 1) + 1
    }

    /// Clears the flag if `generation` is still the latest interaction.
    fn clear_if_current(&self, generation: u64) -> bool {
        let raised = (generation << 1) | ACTIVE_BIT;
        let _transition = self.transition.lock();
        let cleared = self
            .state
            .compare_exchange(raised, generation << 1, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if cleared {
            self.notify(false);
        }
        cleared
    }

    fn notify(&self, active: bool) {
        if let Some(observer) = &self.observer {
            observer.call(active);
        }
    }
}

/// Drives the shared value from gesture callbacks and commits on release.
///
/// All methods run on the input context. Commit and settle work is spawned
/// on the configured runtime and never blocks the caller.
pub struct InteractionMachine {
    range: ValueRange,
    value: SharedValue,
    geometry: GeometryTracker,
    sink: Arc<dyn CommitSink>,
    flag: Arc<ActiveFlag>,
    runtime: Handle,
    settle_delay: Duration,
    interacting: bool,
}

impl InteractionMachine {
    pub fn new(
        range: ValueRange,
        value: SharedValue,
        geometry: GeometryTracker,
        sink: Arc<dyn CommitSink>,
        observer: Option<ActiveObserver>,
        runtime: Handle,
        settle_delay: Duration,
    ) -> Self {
        Self {
            range,
            value,
            geometry,
            sink,
            flag: Arc::new(ActiveFlag::new(observer)),
            runtime,
            settle_delay,
            interacting: false,
        }
    }

    pub fn phase(&self) -> InteractionPhase {
        if self.interacting {
            InteractionPhase::Interacting
        } else if self.flag.is_active() {
            InteractionPhase::Settling
        } else {
            InteractionPhase::Idle
        }
    }

    /// The interaction flag: raised from gesture start until the settle delay
    /// after the commit has elapsed.
    pub fn is_active(&self) -> bool {
        self.flag.is_active()
    }

    /// Generation of the most recent interaction.
    pub fn generation(&self) -> u64 {
        self.flag.generation()
    }

    /// Starts an interaction at absolute pointer x `x` and returns the value
    /// written.
    #[instrument(level = "debug", skip(self))]
    pub fn begin(&mut self, x: f32) -> f32 {
        let generation = self.flag.raise();
        self.interacting = true;
        let value = self.write(x);
        debug!(generation, value, "interaction started");
        value
    }

    /// Moves the value while interacting. Returns `None` for stray updates.
    pub fn update(&mut self, x: f32) -> Option<f32> {
        if !self.interacting {
            trace!(x, "ignoring update outside of an interaction");
            return None;
        }
        let value = self.write(x);
        trace!(value, "interaction updated");
        Some(value)
    }

    /// Ends the interaction at `x`, commits the final value and schedules
    /// the settle.
    ///
    /// Returns the task driving the commit and settle, or `None` if no
    /// interaction was in progress.
    #[instrument(level = "debug", skip(self))]
    pub fn end(&mut self, x: f32) -> Option<JoinHandle<()>> {
        if !self.interacting {
            trace!(x, "ignoring end outside of an interaction");
            return None;
        }
        self.interacting = false;
        let value = self.write(x);
        let generation = self.flag.generation();
        debug!(generation, value, "committing");

        let sink = Arc::clone(&self.sink);
        let flag = Arc::clone(&self.flag);
        let delay = self.settle_delay;
        Some(self.runtime.spawn(async move {
            if let Err(err) = deliver(sink.as_ref(), value).await {
                error!(%err, value, "failed to commit slider value");
            }
            settle(flag, generation, delay).await;
        }))
    }

    /// Abandons the interaction without mapping or committing a value.
    ///
    /// The flag still clears after the normal settle delay.
    pub fn cancel(&mut self) -> Option<JoinHandle<()>> {
        if !self.interacting {
            return None;
        }
        self.interacting = false;
        let generation = self.flag.generation();
        debug!(generation, "interaction cancelled");

        let flag = Arc::clone(&self.flag);
        let delay = self.settle_delay;
        Some(self.runtime.spawn(settle(flag, generation, delay)))
    }

    fn write(&self, x: f32) -> f32 {
        let value = absolute_to_value(x, &self.geometry.current(), self.range);
        self.value.set(value);
        value
    }
}

async fn settle(flag: Arc<ActiveFlag>, generation: u64, delay: Duration) {
    let superseded = flag.cancel_settle.notified();
    tokio::pin!(superseded);
    // Register before checking so a `begin` racing with us always wakes us.
    superseded.as_mut().enable();
    if flag.generation() != generation {
        trace!(generation, "settle skipped, newer interaction running");
        return;
    }

    tokio::select! {
        _ = tokio::time::sleep(delay) => {
            if flag.clear_if_current(generation) {
                debug!(generation, "interaction settled");
            }
        }
        _ = &mut superseded => {
            trace!(generation, "settle cancelled by a new interaction");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{error::CommitError, sink::sync_sink};

    fn machine_with(
        sink: Arc<dyn CommitSink>,
        observer: Option<ActiveObserver>,
    ) -> InteractionMachine {
        let geometry = GeometryTracker::new();
        geometry.on_layout(200.0, 0.0);
        InteractionMachine::new(
            ValueRange::new(100.0).unwrap(),
            SharedValue::new(0.0),
            geometry,
            sink,
            observer,
            Handle::current(),
            DEFAULT_SETTLE_DELAY,
        )
    }

    fn recording_sink() -> (Arc<dyn CommitSink>, Arc<Mutex<Vec<f32>>>) {
        let commits = Arc::new(Mutex::new(Vec::new()));
        let record = commits.clone();
        let sink = sync_sink(move |value| {
            record.lock().unwrap().push(value);
            Ok(())
        });
        (Arc::new(sink), commits)
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_interaction_commits_once_and_settles() {
        let (sink, commits) = recording_sink();
        let mut machine = machine_with(sink, None);
        assert_eq!(machine.phase(), InteractionPhase::Idle);

        assert_eq!(machine.begin(50.0), 25.0);
        assert_eq!(machine.phase(), InteractionPhase::Interacting);
        assert_eq!(machine.update(150.0), Some(75.0));
        assert_eq!(machine.value.get(), 75.0);

        let task = machine.end(200.0).unwrap();
        assert_eq!(machine.value.get(), 100.0);
        assert_eq!(machine.phase(), InteractionPhase::Settling);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(machine.is_active());

        task.await.unwrap();
        assert_eq!(machine.phase(), InteractionPhase::Idle);
        assert_eq!(*commits.lock().unwrap(), vec![100.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_outside_interaction_is_ignored() {
        let (sink, commits) = recording_sink();
        let mut machine = machine_with(sink, None);

        assert_eq!(machine.update(120.0), None);
        assert!(machine.end(120.0).is_none());
        assert_eq!(machine.value.get(), 0.0);
        assert_eq!(machine.value.version(), 0);
        assert!(commits.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_sink_still_settles() {
        let sink: Arc<dyn CommitSink> =
            Arc::new(sync_sink(|_| Err(CommitError::rejected("storage full"))));
        let mut machine = machine_with(sink, None);

        machine.begin(10.0);
        let task = machine.end(20.0).unwrap();
        task.await.unwrap();

        assert!(!machine.is_active());
        assert_eq!(machine.value.get(), 10.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_skips_commit_and_still_settles() {
        let (sink, commits) = recording_sink();
        let mut machine = machine_with(sink, None);

        machine.begin(100.0);
        let version = machine.value.version();
        let task = machine.cancel().unwrap();
        assert_eq!(machine.phase(), InteractionPhase::Settling);
        task.await.unwrap();

        assert_eq!(machine.phase(), InteractionPhase::Idle);
        assert_eq!(machine.value.version(), version);
        assert!(commits.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_interaction_is_not_cleared_by_stale_settle() {
        let (sink, commits) = recording_sink();
        let mut machine = machine_with(sink, None);

        machine.begin(40.0);
        let stale = machine.end(40.0).unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        machine.begin(80.0);
        stale.await.unwrap();
        tokio::time::sleep(DEFAULT_SETTLE_DELAY * 3).await;

        assert_eq!(machine.phase(), InteractionPhase::Interacting);
        assert!(machine.is_active());
        assert_eq!(*commits.lock().unwrap(), vec![20.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_sees_each_transition_once() {
        let (sink, _) = recording_sink();
        let transitions = Arc::new(Mutex::new(Vec::new()));
        let record = transitions.clone();
        let observer = ActiveObserver::new(move |active| record.lock().unwrap().push(active));
        let mut machine = machine_with(sink, Some(observer));

        machine.begin(0.0);
        machine.end(10.0).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        // Restarting during the settle keeps the flag raised.
        machine.begin(30.0);
        machine.end(30.0).unwrap().await.unwrap();

        assert_eq!(*transitions.lock().unwrap(), vec![true, false]);
        assert_eq!(machine.generation(), 2);
    }

    #[test]
    fn test_observer_order_matches_flag_under_contention() {
        let transitions = Arc::new(Mutex::new(Vec::new()));
        let record = transitions.clone();
        let flag = ActiveFlag::new(Some(ActiveObserver::new(move |active| {
            record.lock().unwrap().push(active)
        })));

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..10_000 {
                    flag.raise();
                }
            });
            scope.spawn(|| {
                for _ in 0..10_000 {
                    flag.clear_if_current(flag.generation());
                }
            });
        });

        let transitions = transitions.lock().unwrap();
        assert_eq!(transitions.first(), Some(&true));
        assert!(transitions.windows(2).all(|pair| pair[0] != pair[1]));
        assert_eq!(transitions.last().copied(), Some(flag.is_active()));
    }
}
