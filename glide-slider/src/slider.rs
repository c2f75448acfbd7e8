//! A touch slider for selecting a value in `[0, max_value]`.
//!
//! ## Usage
//!
//! Build [`SliderArgs`] with [`SliderArgsBuilder`], create a [`Slider`], then
//! forward layout notifications and raw touch events to it. The render
//! context reads frames from a [`Projector`] obtained via
//! [`Slider::projector`].
//!
//! ```
//! use glide_slider::{SharedValue, Slider, SliderArgsBuilder, TouchEvent, sync_sink};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let value = SharedValue::new(0.0);
//! let args = SliderArgsBuilder::default()
//!     .max_value(100.0)
//!     .value(value.clone())
//!     .on_value_change(sync_sink(|v| {
//!         println!("committed {v}");
//!         Ok(())
//!     }))
//!     .build()
//!     .unwrap();
//! let mut slider = Slider::new(args).unwrap();
//! slider.on_layout(200.0, 0.0);
//!
//! slider.handle_touch(TouchEvent::down(50.0, 0.0));
//! assert_eq!(value.get(), 25.0);
//! # }
//! ```

use std::{sync::Arc, time::Duration};

use derive_builder::Builder;
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, trace};

use crate::{
    color::Color,
    error::RangeError,
    geometry::{GeometryTracker, LayoutRect, TrackGeometry},
    gesture::{
        CallbackPhase, Callbacks, DEFAULT_HIT_SLOP, DEFAULT_TOUCH_SLOP, Gesture, GestureCallback,
        HitRegion, HitSlop, ScrollState, TouchContext, TouchEvent, slider_gesture,
    },
    interaction::{DEFAULT_SETTLE_DELAY, InteractionMachine, InteractionPhase},
    mapper::ValueRange,
    projection::{Projector, SliderFrame, project},
    prop::ActiveObserver,
    runtime,
    shared_value::SharedValue,
    sink::{CommitSink, NoopSink},
};

/// Default track thickness.
pub const DEFAULT_TRACK_HEIGHT: f32 = 6.0;

/// Arguments for the [`Slider`].
#[derive(Builder, Clone)]
#[builder(pattern = "owned", build_fn(validate = "Self::validate"))]
pub struct SliderArgs {
    /// Commit sink invoked with the clamped final value at every gesture end.
    #[builder(default = "Arc::new(NoopSink)", setter(custom))]
    pub on_value_change: Arc<dyn CommitSink>,

    /// Upper bound of the value range. The lower bound is always zero.
    pub max_value: f32,

    /// The shared value cell, owned by the caller.
    #[builder(default)]
    pub value: SharedValue,

    /// Thickness of the track.
    #[builder(default = "DEFAULT_TRACK_HEIGHT")]
    pub track_height: f32,

    /// Thumb width. Defaults to the track height.
    #[builder(default, setter(strip_option))]
    pub thumb_size: Option<f32>,

    /// Color of the unfilled track.
    #[builder(default = "Color::from_rgb_u8(0xcc, 0xcc, 0xcc)")]
    pub background_color: Color,

    /// Color of the filled track and the thumb.
    #[builder(default = "Color::new(0.2, 0.5, 0.8, 1.0)")]
    pub color: Color,

    #[builder(default, setter(strip_option))]
    pub thumb_shadow_color: Option<Color>,

    /// Touch margin around the track.
    #[builder(default = "DEFAULT_HIT_SLOP")]
    pub hit_slop: HitSlop,

    /// Notified whenever the interaction flag flips.
    #[builder(default, setter(strip_option))]
    pub on_active_change: Option<ActiveObserver>,

    /// Delay between a commit and the interaction flag clearing.
    #[builder(default = "DEFAULT_SETTLE_DELAY")]
    pub settle_delay: Duration,

    /// Movement that turns a press into a drag.
    #[builder(default = "DEFAULT_TOUCH_SLOP")]
    pub touch_slop: f32,

    /// Runtime for commit and settle tasks. Falls back to the ambient
    /// runtime, then to a shared one.
    #[builder(default, setter(strip_option))]
    pub runtime: Option<Handle>,

    /// Scroll activity of the enclosing scrollable surface.
    #[builder(default)]
    pub scroll: ScrollState,
}

impl SliderArgs {
    /// Thumb width used by the projection.
    pub fn thumb_size(&self) -> f32 {
        self.thumb_size.unwrap_or(self.track_height)
    }

    /// Height of the tallest drawn part, track or thumb.
    pub fn thickness(&self) -> f32 {
        self.track_height.max(self.thumb_size())
    }
}

impl SliderArgsBuilder {
    /// Sets the commit sink.
    pub fn on_value_change<S: CommitSink>(mut self, sink: S) -> Self {
        self.on_value_change = Some(Arc::new(sink));
        self
    }

    /// Sets the commit sink from a shared handle.
    pub fn on_value_change_shared(mut self, sink: Arc<dyn CommitSink>) -> Self {
        self.on_value_change = Some(sink);
        self
    }

    fn validate(&self) -> Result<(), String> {
        if let Some(max_value) = self.max_value {
            ValueRange::new(max_value).map_err(|err| err.to_string())?;
        }
        let non_negative = |name: &str, value: Option<f32>| match value {
            Some(v) if !(v.is_finite() && v >= 0.0) => {
                Err(format!("{name} must be finite and non-negative, got {v}"))
            }
            _ => Ok(()),
        };
        non_negative("track_height", self.track_height)?;
        non_negative("thumb_size", self.thumb_size.flatten())?;
        non_negative("touch_slop", self.touch_slop)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct TouchSequence {
    started: bool,
    settled: bool,
}

/// Interactive slider: geometry, gestures, interaction state and projection
/// wired together.
pub struct Slider {
    args: SliderArgs,
    range: ValueRange,
    geometry: GeometryTracker,
    machine: InteractionMachine,
    gesture: Gesture,
    sequence: TouchSequence,
}

impl Slider {
    /// Creates a slider. Values already in the cell are clamped into range.
    pub fn new(args: SliderArgs) -> Result<Self, RangeError> {
        let range = ValueRange::new(args.max_value)?;
        let current = args.value.get();
        if !range.contains(current) {
            args.value.set(range.clamp(current));
        }

        let geometry = GeometryTracker::new();
        let machine = InteractionMachine::new(
            range,
            args.value.clone(),
            geometry.clone(),
            Arc::clone(&args.on_value_change),
            args.on_active_change.clone(),
            runtime::resolve(args.runtime.as_ref()),
            args.settle_delay,
        );
        let gesture = slider_gesture(args.scroll.clone());

        Ok(Self {
            args,
            range,
            geometry,
            machine,
            gesture,
            sequence: TouchSequence::default(),
        })
    }

    pub fn args(&self) -> &SliderArgs {
        &self.args
    }

    pub fn range(&self) -> ValueRange {
        self.range
    }

    /// Latest value in the shared cell.
    pub fn value(&self) -> f32 {
        self.args.value.get()
    }

    pub fn geometry(&self) -> TrackGeometry {
        self.geometry.current()
    }

    pub fn is_active(&self) -> bool {
        self.machine.is_active()
    }

    pub fn phase(&self) -> InteractionPhase {
        self.machine.phase()
    }

    /// Layout notification with the track width and horizontal offset.
    pub fn on_layout(&self, width: f32, origin_offset: f32) {
        self.geometry.on_layout(width, origin_offset);
    }

    /// Layout notification with the full track frame.
    pub fn on_layout_rect(&self, rect: LayoutRect) {
        self.geometry.on_layout_rect(rect);
    }

    /// Frame for the current value and geometry.
    pub fn frame(&self) -> SliderFrame {
        project(
            self.value(),
            &self.geometry.current(),
            self.range,
            self.args.thumb_size(),
        )
    }

    /// A render-context projector sharing this slider's value and geometry.
    pub fn projector(&self) -> Projector {
        Projector::new(
            self.args.value.clone(),
            self.geometry.clone(),
            self.range,
            self.args.thumb_size(),
        )
    }

    /// Feeds one raw touch event.
    ///
    /// Returns the commit/settle task when this event ended or cancelled the
    /// interaction.
    pub fn handle_touch(&mut self, touch: TouchEvent) -> Option<JoinHandle<()>> {
        let cx = TouchContext {
            hit: HitRegion::new(
                &self.geometry.current(),
                &self.args.hit_slop,
                self.args.thickness(),
            ),
            touch_slop: self.args.touch_slop,
        };
        let mut callbacks = Callbacks::new();
        self.gesture.on_touch(&touch, &cx, &mut callbacks);

        let mut pending = None;
        for callback in callbacks {
            if let Some(task) = self.dispatch(callback) {
                pending = Some(task);
            }
        }

        if (touch.ends_sequence() || self.gesture.state().is_finished())
            && self.sequence.started
            && !self.sequence.settled
        {
            self.sequence.settled = true;
            if let Some(task) = self.machine.cancel() {
                pending = Some(task);
            }
        }

        if touch.ends_sequence() {
            self.gesture.reset();
            self.sequence = TouchSequence::default();
        }
        pending
    }

    fn dispatch(&mut self, callback: GestureCallback) -> Option<JoinHandle<()>> {
        trace!(?callback, "gesture callback");
        match callback.phase {
            CallbackPhase::Start if self.sequence.started => {
                self.machine.update(callback.x);
                None
            }
            CallbackPhase::Start => {
                self.sequence.started = true;
                self.machine.begin(callback.x);
                None
            }
            CallbackPhase::Update => {
                self.machine.update(callback.x);
                None
            }
            CallbackPhase::End if self.sequence.started && !self.sequence.settled => {
                self.sequence.settled = true;
                self.machine.end(callback.x)
            }
            CallbackPhase::End => None,
            CallbackPhase::Cancel => {
                debug!(source = ?callback.source, "recognizer finalized without success");
                None
            }
        }
    }
}
