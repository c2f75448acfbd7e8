//! # Gesture composition
//!
//! Raw touch events go through a tree of recognizers. Leaves implement
//! [`GestureSource`]; [`Gesture::simultaneous`] lets every member see every
//! event, and [`Gesture::race`] hands the touch sequence exclusively to the
//! first member that claims it.
//!
//! The slider uses:
//!
//! ```text
//! race ─┬─ passthrough (ancestor scroll)
//!       └─ simultaneous ─┬─ press
//!                        └─ drag
//! ```
//!
//! Within one event, race ties resolve in declaration order, so an ancestor
//! scroll that is already moving keeps the touch before the slider sees it.

use smallvec::SmallVec;
use tracing::debug;

use crate::geometry::TrackGeometry;

pub use recognizer::{DragRecognizer, PassthroughRecognizer, PressRecognizer, ScrollState};

mod recognizer;

/// Default touch-target expansion around the track, per edge.
pub const DEFAULT_HIT_SLOP: HitSlop = HitSlop::uniform(20.0);

/// Default movement separating a press from a drag.
pub const DEFAULT_TOUCH_SLOP: f32 = 10.0;

/// Phase of a raw touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// Raw touch event in absolute pointer coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub x: f32,
    pub y: f32,
}

impl TouchEvent {
    pub fn new(phase: TouchPhase, x: f32, y: f32) -> Self {
        Self { phase, x, y }
    }

    pub fn down(x: f32, y: f32) -> Self {
        Self::new(TouchPhase::Down, x, y)
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self::new(TouchPhase::Move, x, y)
    }

    pub fn up(x: f32, y: f32) -> Self {
        Self::new(TouchPhase::Up, x, y)
    }

    pub fn cancel(x: f32, y: f32) -> Self {
        Self::new(TouchPhase::Cancel, x, y)
    }

    /// Whether this event closes the touch sequence.
    pub fn ends_sequence(&self) -> bool {
        matches!(self.phase, TouchPhase::Up | TouchPhase::Cancel)
    }
}

/// Expansion of the touchable bounds beyond the visible track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitSlop {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl HitSlop {
    /// Same margin on every edge.
    pub const fn uniform(margin: f32) -> Self {
        Self {
            left: margin,
            top: margin,
            right: margin,
            bottom: margin,
        }
    }

    /// Separate horizontal and vertical margins.
    pub const fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self {
            left: horizontal,
            top: vertical,
            right: horizontal,
            bottom: vertical,
        }
    }
}

impl Default for HitSlop {
    fn default() -> Self {
        DEFAULT_HIT_SLOP
    }
}

/// Touchable area: track bounds grown by the hit slop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRegion {
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
}

impl HitRegion {
    /// Grows `geometry` by `slop`.
    ///
    /// `thickness` is the tallest drawn part of the slider (track or thumb),
    /// centred on the track. Until layout reports a vertical span the track
    /// is assumed to start at `geometry.top` and be `thickness` tall.
    pub fn new(geometry: &TrackGeometry, slop: &HitSlop, thickness: f32) -> Self {
        let thickness = if thickness.is_finite() {
            thickness.max(0.0)
        } else {
            0.0
        };
        let frame_height = if geometry.has_vertical_span() {
            geometry.height
        } else {
            thickness
        };
        let half_extent = frame_height.max(thickness) / 2.0;
        let center = geometry.top + frame_height / 2.0;
        Self {
            left: geometry.origin_offset - slop.left,
            right: geometry.origin_offset + geometry.width + slop.right,
            top: center - half_extent - slop.top,
            bottom: center + half_extent + slop.bottom,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

/// Per-event context handed to recognizers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchContext {
    pub hit: HitRegion,
    pub touch_slop: f32,
}

/// Which primitive recognizer produced a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Press,
    Drag,
    Passthrough,
}

/// Callback phase emitted by a recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackPhase {
    Start,
    Update,
    End,
    /// Finalized without success.
    Cancel,
}

/// One recognizer callback, carrying the absolute pointer x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureCallback {
    pub source: GestureKind,
    pub phase: CallbackPhase,
    pub x: f32,
}

impl GestureCallback {
    pub fn new(source: GestureKind, phase: CallbackPhase, x: f32) -> Self {
        Self { source, phase, x }
    }
}

/// Callbacks produced while handling one touch event.
pub type Callbacks = SmallVec<[GestureCallback; 4]>;

/// Recognition state of a recognizer or composed gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognizerState {
    /// Still watching the touch sequence.
    Possible,
    /// Claimed the touch sequence.
    Active,
    /// Claimed and completed successfully.
    Ended,
    /// Gave up, or lost a race.
    Failed,
}

impl RecognizerState {
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Ended | Self::Failed)
    }

    pub fn has_claimed(self) -> bool {
        matches!(self, Self::Active | Self::Ended)
    }
}

/// A primitive gesture recognizer.
///
/// Implementations consume raw touch events and emit start, update, end and
/// cancel callbacks. They are reset at the end of every touch sequence.
pub trait GestureSource: Send {
    fn state(&self) -> RecognizerState;

    /// Feeds one touch event. Only called while not finished.
    fn on_touch(&mut self, touch: &TouchEvent, cx: &TouchContext, out: &mut Callbacks);

    /// Forces the recognizer to fail, emitting a cancel if it had started.
    fn cancel(&mut self, out: &mut Callbacks);

    fn reset(&mut self);
}

/// A recognizer tree.
pub enum Gesture {
    Source(Box<dyn GestureSource>),
    Simultaneous(Vec<Gesture>),
    Race {
        members: Vec<Gesture>,
        winner: Option<usize>,
    },
}

impl Gesture {
    pub fn source(source: impl GestureSource + 'static) -> Self {
        Self::Source(Box::new(source))
    }

    pub fn press() -> Self {
        Self::source(PressRecognizer::new())
    }

    pub fn drag() -> Self {
        Self::source(DragRecognizer::new())
    }

    pub fn passthrough(scroll: ScrollState) -> Self {
        Self::source(PassthroughRecognizer::new(scroll))
    }

    /// Every member sees every event; any member may initiate.
    pub fn simultaneous(members: impl IntoIterator<Item = Gesture>) -> Self {
        Self::Simultaneous(members.into_iter().collect())
    }

    /// The first member to claim the touch sequence wins it exclusively.
    pub fn race(members: impl IntoIterator<Item = Gesture>) -> Self {
        Self::Race {
            members: members.into_iter().collect(),
            winner: None,
        }
    }

    pub fn state(&self) -> RecognizerState {
        match self {
            Self::Source(source) => source.state(),
            Self::Simultaneous(members) => combine(members.iter().map(Gesture::state)),
            Self::Race { members, winner } => match winner {
                Some(index) => members[*index].state(),
                None if members.iter().all(|m| m.state().is_finished()) => {
                    RecognizerState::Failed
                }
                None => RecognizerState::Possible,
            },
        }
    }

    /// Index of the race member that owns the current touch sequence.
    pub fn winner(&self) -> Option<usize> {
        match self {
            Self::Race { winner, .. } => *winner,
            _ => None,
        }
    }

    pub fn on_touch(&mut self, touch: &TouchEvent, cx: &TouchContext, out: &mut Callbacks) {
        match self {
            Self::Source(source) => {
                if !source.state().is_finished() {
                    source.on_touch(touch, cx, out);
                }
            }
            Self::Simultaneous(members) => {
                for member in members.iter_mut() {
                    member.on_touch(touch, cx, out);
                }
            }
            Self::Race { members, winner } => {
                if let Some(index) = *winner {
                    members[index].on_touch(touch, cx, out);
                    return;
                }

                for index in 0..members.len() {
                    if members[index].state().is_finished() {
                        continue;
                    }
                    let mut local = Callbacks::new();
                    members[index].on_touch(touch, cx, &mut local);
                    if !members[index].state().has_claimed() {
                        continue;
                    }

                    debug!(index, "race resolved");
                    *winner = Some(index);
                    out.extend(local);
                    let mut dropped = Callbacks::new();
                    for (other, member) in members.iter_mut().enumerate() {
                        if other != index {
                            member.cancel(&mut dropped);
                        }
                    }
                    return;
                }
            }
        }
    }

    pub fn cancel(&mut self, out: &mut Callbacks) {
        match self {
            Self::Source(source) => {
                if !source.state().is_finished() {
                    source.cancel(out);
                }
            }
            Self::Simultaneous(members) | Self::Race { members, .. } => {
                for member in members.iter_mut() {
                    member.cancel(out);
                }
            }
        }
    }

    /// Prepares the tree for the next touch sequence.
    pub fn reset(&mut self) {
        match self {
            Self::Source(source) => source.reset(),
            Self::Simultaneous(members) => members.iter_mut().for_each(Gesture::reset),
            Self::Race { members, winner } => {
                *winner = None;
                members.iter_mut().for_each(Gesture::reset);
            }
        }
    }
}

fn combine(states: impl Iterator<Item = RecognizerState>) -> RecognizerState {
    let mut any_possible = false;
    let mut any_ended = false;
    for state in states {
        match state {
            RecognizerState::Active => return RecognizerState::Active,
            RecognizerState::Possible => any_possible = true,
            RecognizerState::Ended => any_ended = true,
            RecognizerState::Failed => {}
        }
    }
    if any_possible {
        RecognizerState::Possible
    } else if any_ended {
        RecognizerState::Ended
    } else {
        RecognizerState::Failed
    }
}

/// The slider's recognizer tree: press and drag together, raced against the
/// ancestor scroll surface.
pub fn slider_gesture(scroll: ScrollState) -> Gesture {
    Gesture::race([
        Gesture::passthrough(scroll),
        Gesture::simultaneous([Gesture::press(), Gesture::drag()]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> TouchContext {
        TouchContext {
            hit: HitRegion::new(
                &TrackGeometry::new(200.0, 0.0),
                &HitSlop::uniform(10.0),
                6.0,
            ),
            touch_slop: DEFAULT_TOUCH_SLOP,
        }
    }

    fn feed(gesture: &mut Gesture, touch: TouchEvent) -> Vec<(GestureKind, CallbackPhase, f32)> {
        let mut out = Callbacks::new();
        gesture.on_touch(&touch, &context(), &mut out);
        out.into_iter().map(|c| (c.source, c.phase, c.x)).collect()
    }

    #[test]
    fn test_hit_region_applies_slop() {
        let mut geometry = TrackGeometry::new(200.0, 50.0);
        geometry.top = 100.0;
        geometry.height = 6.0;
        let hit = HitRegion::new(&geometry, &HitSlop::symmetric(0.0, 20.0), 6.0);
        assert!(hit.contains(50.0, 80.0));
        assert!(hit.contains(250.0, 126.0));
        assert!(!hit.contains(49.0, 100.0));
        assert!(!hit.contains(100.0, 127.0));

        // A thumb taller than the track widens the span around its centre.
        let hit = HitRegion::new(&geometry, &HitSlop::uniform(0.0), 40.0);
        assert!(hit.contains(100.0, 83.0));
        assert!(hit.contains(100.0, 123.0));
        assert!(!hit.contains(100.0, 82.5));
    }

    #[test]
    fn test_hit_region_without_vertical_frame_stays_bounded() {
        let cx = context();
        assert!(cx.hit.contains(-10.0, 0.0));
        assert!(cx.hit.contains(210.0, 16.0));
        assert!(cx.hit.contains(100.0, -10.0));
        assert!(!cx.hit.contains(-10.5, 0.0));
        assert!(!cx.hit.contains(100.0, 16.5));
        assert!(!cx.hit.contains(100.0, 5000.0));
        assert!(!cx.hit.contains(100.0, -5000.0));
    }

    #[test]
    fn test_touch_far_below_track_goes_to_scroll() {
        let mut gesture = slider_gesture(ScrollState::default());

        assert!(feed(&mut gesture, TouchEvent::down(150.0, 2000.0)).is_empty());
        assert_eq!(gesture.winner(), None);
        assert!(feed(&mut gesture, TouchEvent::moved(150.0, 1900.0)).is_empty());
        assert_eq!(gesture.winner(), Some(0));
        assert!(feed(&mut gesture, TouchEvent::up(150.0, 1900.0)).is_empty());
    }

    #[test]
    fn test_tap_produces_single_start_and_end() {
        let mut gesture = slider_gesture(ScrollState::default());

        assert_eq!(
            feed(&mut gesture, TouchEvent::down(50.0, 0.0)),
            vec![(GestureKind::Press, CallbackPhase::Start, 50.0)]
        );
        assert_eq!(gesture.winner(), Some(1));
        assert_eq!(
            feed(&mut gesture, TouchEvent::moved(53.0, 2.0)),
            Vec::new()
        );
        assert_eq!(
            feed(&mut gesture, TouchEvent::up(53.0, 2.0)),
            vec![(GestureKind::Press, CallbackPhase::End, 53.0)]
        );
        assert_eq!(gesture.state(), RecognizerState::Ended);
    }

    #[test]
    fn test_tap_turning_into_drag_hands_over_to_drag() {
        let mut gesture = slider_gesture(ScrollState::default());
        feed(&mut gesture, TouchEvent::down(50.0, 0.0));

        assert_eq!(
            feed(&mut gesture, TouchEvent::moved(150.0, 0.0)),
            vec![
                (GestureKind::Press, CallbackPhase::Cancel, 150.0),
                (GestureKind::Drag, CallbackPhase::Start, 150.0),
            ]
        );
        assert_eq!(
            feed(&mut gesture, TouchEvent::moved(170.0, 0.0)),
            vec![(GestureKind::Drag, CallbackPhase::Update, 170.0)]
        );
        assert_eq!(
            feed(&mut gesture, TouchEvent::up(200.0, 0.0)),
            vec![(GestureKind::Drag, CallbackPhase::End, 200.0)]
        );
    }

    #[test]
    fn test_active_scroll_wins_the_race() {
        let scroll = ScrollState::default();
        scroll.set_scrolling(true);
        let mut gesture = slider_gesture(scroll);

        assert!(feed(&mut gesture, TouchEvent::down(50.0, 0.0)).is_empty());
        assert_eq!(gesture.winner(), Some(0));
        assert!(feed(&mut gesture, TouchEvent::moved(150.0, 0.0)).is_empty());
        assert!(feed(&mut gesture, TouchEvent::up(150.0, 0.0)).is_empty());
    }

    #[test]
    fn test_vertical_swipe_outside_track_goes_to_scroll() {
        let mut gesture = slider_gesture(ScrollState::default());

        assert!(feed(&mut gesture, TouchEvent::down(400.0, 0.0)).is_empty());
        assert_eq!(gesture.winner(), None);
        assert!(feed(&mut gesture, TouchEvent::moved(400.0, 60.0)).is_empty());
        assert_eq!(gesture.winner(), Some(0));
    }

    #[test]
    fn test_reset_clears_the_winner() {
        let mut gesture = slider_gesture(ScrollState::default());
        feed(&mut gesture, TouchEvent::down(50.0, 0.0));
        feed(&mut gesture, TouchEvent::up(50.0, 0.0));
        gesture.reset();

        assert_eq!(gesture.winner(), None);
        assert_eq!(gesture.state(), RecognizerState::Possible);
    }

    #[test]
    fn test_cancelled_touch_cancels_the_active_member() {
        let mut gesture = slider_gesture(ScrollState::default());
        feed(&mut gesture, TouchEvent::down(20.0, 0.0));

        assert_eq!(
            feed(&mut gesture, TouchEvent::cancel(20.0, 0.0)),
            vec![(GestureKind::Press, CallbackPhase::Cancel, 20.0)]
        );
        assert_eq!(gesture.state(), RecognizerState::Failed);
    }
}
