//! # glide-slider
//!
//! Gesture-to-value engine for a horizontal touch slider.
//!
//! Raw touch events are arbitrated between a press recognizer, a drag
//! recognizer and the enclosing scroll surface. The winning gesture drives a
//! [`SharedValue`] clamped to `[0, max_value]`; the render context derives
//! the thumb offset and fill width from it through a [`Projector`]; the final
//! value of every gesture goes to a [`CommitSink`].
//!
//! ## Modules
//!
//! - [`geometry`]: track bounds from layout notifications
//! - [`mapper`]: pixel offset ↔ value mapping
//! - [`interaction`]: interaction state machine, commit and settle
//! - [`gesture`]: press/drag/passthrough recognizers and their composition
//! - [`projection`]: value → thumb offset and fill width
//! - [`slider`]: the component wiring everything together
//!
//! See [`Slider`] for an end-to-end example.

pub mod color;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod interaction;
pub mod mapper;
pub mod projection;
pub mod prop;
mod runtime;
pub mod shared_value;
pub mod sink;
pub mod slider;

pub use crate::{
    color::Color,
    error::{ColorParseError, CommitError, RangeError},
    geometry::{GeometryTracker, LayoutRect, TrackGeometry},
    gesture::{
        DEFAULT_HIT_SLOP, DEFAULT_TOUCH_SLOP, Gesture, GestureSource, HitSlop, ScrollState,
        TouchEvent, TouchPhase,
    },
    interaction::{DEFAULT_SETTLE_DELAY, InteractionMachine, InteractionPhase},
    mapper::{
        Extrapolation, ValueRange, absolute_to_value, interpolate, pixels_to_value,
        value_to_pixels,
    },
    projection::{Projector, SliderFrame, project},
    prop::{ActiveObserver, CallbackWith},
    shared_value::SharedValue,
    sink::{CommitFuture, CommitSink, NoopSink, sync_sink},
    slider::{DEFAULT_TRACK_HEIGHT, Slider, SliderArgs, SliderArgsBuilder, SliderArgsBuilderError},
};
