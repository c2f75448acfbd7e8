//! Pixel offset ↔ value mapping.
//!
//! Everything here is pure. Clamping is always the last step, so no result
//! escapes its declared domain even for coordinates past the track edge,
//! an unmeasured track or a thumb wider than the track.

use crate::{error::RangeError, geometry::TrackGeometry};

/// Closed value interval `[min, max]` with `min` fixed at zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    max: f32,
}

impl ValueRange {
    /// The fixed lower bound.
    pub const MIN: f32 = 0.0;

    /// Creates a range `[0, max]`.
    pub fn new(max: f32) -> Result<Self, RangeError> {
        if max.is_finite() && max > Self::MIN {
            Ok(Self { max })
        } else {
            Err(RangeError::InvalidMax(max))
        }
    }

    pub fn min(&self) -> f32 {
        Self::MIN
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Clamps `value` into the range. NaN maps to the lower bound.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return Self::MIN;
        }
        value.clamp(Self::MIN, self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        (Self::MIN..=self.max).contains(&value)
    }
}

/// Behavior of [`interpolate`] outside the input interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Extrapolation {
    /// Pin to the nearest output bound.
    #[default]
    Clamp,
    /// Continue the line past the bounds.
    Extend,
}

/// Linearly maps `x` from `input` to `output`.
///
/// A zero-length or non-finite input interval and a NaN `x` both yield the
/// first output bound.
pub fn interpolate(
    x: f32,
    input: [f32; 2],
    output: [f32; 2],
    extrapolation: Extrapolation,
) -> f32 {
    let [in_start, in_end] = input;
    let [out_start, out_end] = output;
    let span = in_end - in_start;
    if span == 0.0 || !span.is_finite() || x.is_nan() {
        return out_start;
    }

    let t = (x - in_start) / span;
    let t = match extrapolation {
        Extrapolation::Clamp => t.clamp(0.0, 1.0),
        Extrapolation::Extend => t,
    };
    out_start + t * (out_end - out_start)
}

/// Maps a track-relative pixel offset to a value in `range`.
///
/// An unmeasured track (`width == 0`) yields `range.min()`.
///
/// ```
/// use glide_slider::{TrackGeometry, ValueRange, pixels_to_value};
///
/// let geometry = TrackGeometry::new(200.0, 0.0);
/// let range = ValueRange::new(100.0).unwrap();
/// assert_eq!(pixels_to_value(50.0, &geometry, range), 25.0);
/// assert_eq!(pixels_to_value(-30.0, &geometry, range), 0.0);
/// ```
pub fn pixels_to_value(pixel_x: f32, geometry: &TrackGeometry, range: ValueRange) -> f32 {
    if !geometry.is_measured() {
        return range.min();
    }
    let value = interpolate(
        pixel_x,
        [0.0, geometry.width],
        [range.min(), range.max()],
        Extrapolation::Clamp,
    );
    range.clamp(value)
}

/// Maps an absolute pointer x coordinate to a value in `range`.
pub fn absolute_to_value(absolute_x: f32, geometry: &TrackGeometry, range: ValueRange) -> f32 {
    pixels_to_value(geometry.relative_x(absolute_x), geometry, range)
}

/// Maps a value to a pixel offset in `[0, width - thumb_size]`.
///
/// Pass `thumb_size = 0` for the filled-track width.
pub fn value_to_pixels(
    value: f32,
    geometry: &TrackGeometry,
    range: ValueRange,
    thumb_size: f32,
) -> f32 {
    let thumb_size = if thumb_size.is_finite() {
        thumb_size.max(0.0)
    } else {
        0.0
    };
    let travel = (geometry.width - thumb_size).max(0.0);
    let offset = interpolate(
        value,
        [range.min(), range.max()],
        [0.0, travel],
        Extrapolation::Clamp,
    );
    offset.clamp(0.0, travel)
}
