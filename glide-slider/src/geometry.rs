//! Track geometry as reported by the layout notifier.
//!
//! The tracker only stores what layout delivers. It never triggers
//! recomputation on its own; consumers pull [`GeometryTracker::current`] and
//! compare [`GeometryTracker::generation`] when they need to know whether
//! anything moved.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use parking_lot::RwLock;
use tracing::trace;

/// Measured on-screen bounds of the slider track.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TrackGeometry {
    /// Track width, never negative. Zero means "not measured yet".
    pub width: f32,
    /// Horizontal position of the track's left edge in pointer coordinates.
    pub origin_offset: f32,
    /// Vertical position of the track's top edge in pointer coordinates.
    pub top: f32,
    /// Track height. Zero means the vertical span is unknown.
    pub height: f32,
}

impl TrackGeometry {
    /// Creates a horizontal-only geometry, sanitizing the inputs.
    pub fn new(width: f32, origin_offset: f32) -> Self {
        Self {
            width: sanitize_extent(width),
            origin_offset: sanitize_offset(origin_offset),
            top: 0.0,
            height: 0.0,
        }
    }

    /// Converts an absolute pointer x coordinate into a track-relative one.
    pub fn relative_x(&self, absolute_x: f32) -> f32 {
        absolute_x - self.origin_offset
    }

    /// Whether the track has a usable width.
    pub fn is_measured(&self) -> bool {
        self.width > 0.0
    }

    /// Whether a vertical span has been reported.
    pub fn has_vertical_span(&self) -> bool {
        self.height > 0.0
    }
}

/// Frame delivered by a layout notifier.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct LayoutRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LayoutRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

struct TrackerInner {
    geometry: RwLock<TrackGeometry>,
    generation: AtomicU64,
}

/// Shared holder for the latest [`TrackGeometry`].
///
/// Cloning yields another handle to the same storage, so the input context
/// and the render context observe the same layout.
#[derive(Clone)]
pub struct GeometryTracker {
    inner: Arc<TrackerInner>,
}

impl GeometryTracker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                geometry: RwLock::new(TrackGeometry::default()),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Stores a new width and horizontal offset, keeping the vertical span.
    pub fn on_layout(&self, width: f32, origin_offset: f32) {
        let mut geometry = self.inner.geometry.write();
        geometry.width = sanitize_extent(width);
        geometry.origin_offset = sanitize_offset(origin_offset);
        trace!(?geometry, "track layout changed");
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Stores a complete layout frame.
    pub fn on_layout_rect(&self, rect: LayoutRect) {
        let mut geometry = self.inner.geometry.write();
        *geometry = TrackGeometry {
            width: sanitize_extent(rect.width),
            origin_offset: sanitize_offset(rect.x),
            top: sanitize_offset(rect.y),
            height: sanitize_extent(rect.height),
        };
        trace!(?geometry, "track frame changed");
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Returns the latest measured geometry.
    pub fn current(&self) -> TrackGeometry {
        *self.inner.geometry.read()
    }

    /// Number of layout notifications received.
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }
}

impl Default for GeometryTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn sanitize_extent(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn sanitize_offset(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmeasured_track_is_zero_width() {
        let tracker = GeometryTracker::new();
        assert_eq!(tracker.current(), TrackGeometry::default());
        assert!(!tracker.current().is_measured());
        assert_eq!(tracker.generation(), 0);
    }

    #[test]
    fn test_invalid_width_clamps_to_zero() {
        let tracker = GeometryTracker::new();
        tracker.on_layout(-12.0, 4.0);
        assert_eq!(tracker.current().width, 0.0);
        assert_eq!(tracker.current().origin_offset, 4.0);

        tracker.on_layout(f32::NAN, f32::INFINITY);
        assert_eq!(tracker.current().width, 0.0);
        assert_eq!(tracker.current().origin_offset, 0.0);
        assert_eq!(tracker.generation(), 2);
    }

    #[test]
    fn test_on_layout_keeps_vertical_span() {
        let tracker = GeometryTracker::new();
        tracker.on_layout_rect(LayoutRect::new(10.0, 300.0, 200.0, 6.0));
        tracker.on_layout(180.0, 20.0);

        let geometry = tracker.current();
        assert_eq!(geometry.width, 180.0);
        assert_eq!(geometry.origin_offset, 20.0);
        assert_eq!(geometry.top, 300.0);
        assert!(geometry.has_vertical_span());
        assert_eq!(geometry.relative_x(70.0), 50.0);
    }

    #[test]
    fn test_clones_share_storage() {
        let tracker = GeometryTracker::new();
        let render_side = tracker.clone();
        tracker.on_layout(200.0, 0.0);
        assert_eq!(render_side.current().width, 200.0);
        assert_eq!(render_side.generation(), 1);
    }
}
