//! Render projection: value and geometry to thumb offset and fill width.
//!
//! [`project`] is the pure derivation. [`Projector`] is the render-context
//! side of it: it reads the shared value and geometry every frame and only
//! recomputes when one of them changed.

use bytemuck::{Pod, Zeroable};

use crate::{
    geometry::{GeometryTracker, TrackGeometry},
    mapper::{ValueRange, value_to_pixels},
    shared_value::SharedValue,
};

/// Visual outputs consumed by the drawing step.
#[derive(Debug, Default, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct SliderFrame {
    /// Horizontal translation of the thumb from the track's left edge.
    pub thumb_offset: f32,
    /// Width of the filled part of the track.
    pub fill_width: f32,
}

/// Derives the frame for `value`.
pub fn project(
    value: f32,
    geometry: &TrackGeometry,
    range: ValueRange,
    thumb_size: f32,
) -> SliderFrame {
    SliderFrame {
        thumb_offset: value_to_pixels(value, geometry, range, thumb_size),
        fill_width: value_to_pixels(value, geometry, range, 0.0),
    }
}

#[derive(Clone, Copy)]
struct CachedFrame {
    value_version: u64,
    geometry_generation: u64,
    frame: SliderFrame,
}

/// Reactive frame derivation owned by the render context.
///
/// Reading a frame never waits on the commit sink or any other input-side
/// work.
pub struct Projector {
    value: SharedValue,
    geometry: GeometryTracker,
    range: ValueRange,
    thumb_size: f32,
    cache: Option<CachedFrame>,
}

impl Projector {
    pub fn new(
        value: SharedValue,
        geometry: GeometryTracker,
        range: ValueRange,
        thumb_size: f32,
    ) -> Self {
        Self {
            value,
            geometry,
            range,
            thumb_size,
            cache: None,
        }
    }

    /// Whether the next [`frame`](Self::frame) call will recompute.
    pub fn is_stale(&self) -> bool {
        self.cache.is_none_or(|cached| {
            cached.value_version != self.value.version()
                || cached.geometry_generation != self.geometry.generation()
        })
    }

    /// Returns the frame for the latest value and geometry.
    pub fn frame(&mut self) -> SliderFrame {
        let value_version = self.value.version();
        let geometry_generation = self.geometry.generation();
        if let Some(cached) = self.cache
            && cached.value_version == value_version
            && cached.geometry_generation == geometry_generation
        {
            return cached.frame;
        }

        let frame = project(
            self.value.get(),
            &self.geometry.current(),
            self.range,
            self.thumb_size,
        );
        self.cache = Some(CachedFrame {
            value_version,
            geometry_generation,
            frame,
        });
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_thumb_and_fill() {
        let geometry = TrackGeometry::new(200.0, 0.0);
        let range = ValueRange::new(100.0).unwrap();

        assert_eq!(
            project(25.0, &geometry, range, 40.0),
            SliderFrame {
                thumb_offset: 40.0,
                fill_width: 50.0,
            }
        );
        assert_eq!(
            project(100.0, &geometry, range, 40.0),
            SliderFrame {
                thumb_offset: 160.0,
                fill_width: 200.0,
            }
        );
        assert_eq!(
            project(50.0, &TrackGeometry::default(), range, 40.0),
            SliderFrame::default()
        );
    }

    #[test]
    fn test_projector_recomputes_on_change_only() {
        let value = SharedValue::new(0.0);
        let geometry = GeometryTracker::new();
        let range = ValueRange::new(100.0).unwrap();
        let mut projector = Projector::new(value.clone(), geometry.clone(), range, 10.0);

        assert!(projector.is_stale());
        assert_eq!(projector.frame(), SliderFrame::default());
        assert!(!projector.is_stale());

        geometry.on_layout(110.0, 0.0);
        assert!(projector.is_stale());
        assert_eq!(projector.frame().thumb_offset, 0.0);

        value.set(50.0);
        assert!(projector.is_stale());
        assert_eq!(
            projector.frame(),
            SliderFrame {
                thumb_offset: 50.0,
                fill_width: 55.0,
            }
        );
        assert!(!projector.is_stale());
    }

    #[test]
    fn test_frame_is_plain_bytes() {
        let frame = SliderFrame {
            thumb_offset: 1.0,
            fill_width: 2.0,
        };
        let bytes: &[u8] = bytemuck::bytes_of(&frame);
        assert_eq!(bytes.len(), 8);
        assert_eq!(bytemuck::pod_read_unaligned::<SliderFrame>(bytes), frame);
    }
}
