//! # Shared Value
//!
//! The slider value is the one piece of state read by both the input context
//! (gesture callbacks) and the render context (projection). [`SharedValue`]
//! stores it in a single atomic word, so a write from one side is visible to
//! the other without tearing and without either side taking a lock.
//!
//! Gesture delivery is sequential, so a single writer at a time is all the
//! cell needs to support. Concurrent writers resolve as last write wins.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU32, AtomicU64, Ordering},
    },
};

struct Inner {
    bits: AtomicU32,
    version: AtomicU64,
}

/// Cross-context `f32` cell owned by the caller and shared with the slider.
///
/// Cloning yields another handle to the same cell.
///
/// ```
/// use glide_slider::SharedValue;
///
/// let value = SharedValue::new(0.0);
/// let render_side = value.clone();
/// value.set(42.0);
/// assert_eq!(render_side.get(), 42.0);
/// ```
#[derive(Clone)]
pub struct SharedValue {
    inner: Arc<Inner>,
}

impl SharedValue {
    /// Creates a cell holding `initial`.
    pub fn new(initial: f32) -> Self {
        Self {
            inner: Arc::new(Inner {
                bits: AtomicU32::new(initial.to_bits()),
                version: AtomicU64::new(0),
            }),
        }
    }

    /// Reads the latest value.
    pub fn get(&self) -> f32 {
        f32::from_bits(self.inner.bits.load(Ordering::Acquire))
    }

    /// Publishes a new value and bumps the change version.
    pub fn set(&self, value: f32) {
        self.inner.bits.store(value.to_bits(), Ordering::Release);
        self.inner.version.fetch_add(1, Ordering::AcqRel);
    }

    /// Number of writes observed so far.
    ///
    /// A reader that observes a version also observes the value written
    /// before it, which lets derivations skip work when nothing changed.
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    /// Returns `true` if both handles point at the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for SharedValue {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl fmt::Debug for SharedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedValue")
            .field("value", &self.get())
            .field("version", &self.version())
            .finish()
    }
}
