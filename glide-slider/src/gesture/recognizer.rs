use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use super::{
    CallbackPhase, Callbacks, GestureCallback, GestureKind, GestureSource, RecognizerState,
    TouchContext, TouchEvent, TouchPhase,
};

fn distance(from: (f32, f32), touch: &TouchEvent) -> f32 {
    (touch.x - from.0).hypot(touch.y - from.1)
}

/// Recognized on first contact inside the hit region.
///
/// Drives an immediate position update on contact and a commit on release.
/// Moving past the touch slop finalizes it without success so a drag can take
/// over.
#[derive(Debug)]
pub struct PressRecognizer {
    state: RecognizerState,
    origin: Option<(f32, f32)>,
}

impl PressRecognizer {
    pub fn new() -> Self {
        Self {
            state: RecognizerState::Possible,
            origin: None,
        }
    }

    fn emit(&self, phase: CallbackPhase, x: f32, out: &mut Callbacks) {
        out.push(GestureCallback::new(GestureKind::Press, phase, x));
    }
}

impl Default for PressRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureSource for PressRecognizer {
    fn state(&self) -> RecognizerState {
        self.state
    }

    fn on_touch(&mut self, touch: &TouchEvent, cx: &TouchContext, out: &mut Callbacks) {
        match (touch.phase, self.state) {
            (TouchPhase::Down, RecognizerState::Possible) => {
                if cx.hit.contains(touch.x, touch.y) {
                    self.origin = Some((touch.x, touch.y));
                    self.state = RecognizerState::Active;
                    self.emit(CallbackPhase::Start, touch.x, out);
                } else {
                    self.state = RecognizerState::Failed;
                }
            }
            (TouchPhase::Move, RecognizerState::Active) => {
                if let Some(origin) = self.origin
                    && distance(origin, touch) > cx.touch_slop
                {
                    self.state = RecognizerState::Failed;
                    self.emit(CallbackPhase::Cancel, touch.x, out);
                }
            }
            (TouchPhase::Up, RecognizerState::Active) => {
                self.state = RecognizerState::Ended;
                self.emit(CallbackPhase::End, touch.x, out);
            }
            (TouchPhase::Cancel, RecognizerState::Active) => {
                self.state = RecognizerState::Failed;
                self.emit(CallbackPhase::Cancel, touch.x, out);
            }
            (TouchPhase::Up | TouchPhase::Cancel, RecognizerState::Possible) => {
                self.state = RecognizerState::Failed;
            }
            _ => {}
        }
    }

    fn cancel(&mut self, out: &mut Callbacks) {
        if self.state == RecognizerState::Active {
            let x = self.origin.map_or(0.0, |(x, _)| x);
            self.emit(CallbackPhase::Cancel, x, out);
        }
        self.state = RecognizerState::Failed;
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Recognized once a contact that started inside the hit region travels
/// past the touch slop.
#[derive(Debug)]
pub struct DragRecognizer {
    state: RecognizerState,
    origin: Option<(f32, f32)>,
    last_x: f32,
}

impl DragRecognizer {
    pub fn new() -> Self {
        Self {
            state: RecognizerState::Possible,
            origin: None,
            last_x: 0.0,
        }
    }

    fn emit(&mut self, phase: CallbackPhase, x: f32, out: &mut Callbacks) {
        self.last_x = x;
        out.push(GestureCallback::new(GestureKind::Drag, phase, x));
    }
}

impl Default for DragRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureSource for DragRecognizer {
    fn state(&self) -> RecognizerState {
        self.state
    }

    fn on_touch(&mut self, touch: &TouchEvent, cx: &TouchContext, out: &mut Callbacks) {
        match (touch.phase, self.state) {
            (TouchPhase::Down, RecognizerState::Possible) => {
                if cx.hit.contains(touch.x, touch.y) {
                    self.origin = Some((touch.x, touch.y));
                } else {
                    self.state = RecognizerState::Failed;
                }
            }
            (TouchPhase::Move, RecognizerState::Possible) => {
                if let Some(origin) = self.origin
                    && distance(origin, touch) > cx.touch_slop
                {
                    self.state = RecognizerState::Active;
                    self.emit(CallbackPhase::Start, touch.x, out);
                }
            }
            (TouchPhase::Move, RecognizerState::Active) => {
                self.emit(CallbackPhase::Update, touch.x, out);
            }
            (TouchPhase::Up, RecognizerState::Active) => {
                self.state = RecognizerState::Ended;
                self.emit(CallbackPhase::End, touch.x, out);
            }
            (TouchPhase::Cancel, RecognizerState::Active) => {
                self.state = RecognizerState::Failed;
                self.emit(CallbackPhase::Cancel, touch.x, out);
            }
            (TouchPhase::Up | TouchPhase::Cancel, RecognizerState::Possible) => {
                self.state = RecognizerState::Failed;
            }
            _ => {}
        }
    }

    fn cancel(&mut self, out: &mut Callbacks) {
        if self.state == RecognizerState::Active {
            let x = self.last_x;
            self.emit(CallbackPhase::Cancel, x, out);
        }
        self.state = RecognizerState::Failed;
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Scroll activity of the ancestor surface, shared with its host.
///
/// The host raises it while its scroll view is moving (dragging or flinging).
#[derive(Debug, Clone, Default)]
pub struct ScrollState {
    scrolling: Arc<AtomicBool>,
}

impl ScrollState {
    pub fn set_scrolling(&self, scrolling: bool) {
        self.scrolling.store(scrolling, Ordering::Release);
    }

    pub fn is_scrolling(&self) -> bool {
        self.scrolling.load(Ordering::Acquire)
    }
}

/// Stand-in for the ancestor's native scroll recognizer.
///
/// Emits nothing: the events it wins belong to the ancestor. It claims a
/// touch that lands while the ancestor is already scrolling, or one that
/// travels vertically past the touch slop before anyone else claimed it.
#[derive(Debug)]
pub struct PassthroughRecognizer {
    scroll: ScrollState,
    state: RecognizerState,
    origin: Option<(f32, f32)>,
}

impl PassthroughRecognizer {
    pub fn new(scroll: ScrollState) -> Self {
        Self {
            scroll,
            state: RecognizerState::Possible,
            origin: None,
        }
    }
}

impl GestureSource for PassthroughRecognizer {
    fn state(&self) -> RecognizerState {
        self.state
    }

    fn on_touch(&mut self, touch: &TouchEvent, cx: &TouchContext, _out: &mut Callbacks) {
        match (touch.phase, self.state) {
            (TouchPhase::Down, RecognizerState::Possible) => {
                self.origin = Some((touch.x, touch.y));
                if self.scroll.is_scrolling() {
                    self.state = RecognizerState::Active;
                }
            }
            (TouchPhase::Move, RecognizerState::Possible) => {
                if let Some((x, y)) = self.origin {
                    let dx = (touch.x - x).abs();
                    let dy = (touch.y - y).abs();
                    if dy > cx.touch_slop && dy > dx {
                        self.state = RecognizerState::Active;
                    }
                }
            }
            (TouchPhase::Up | TouchPhase::Cancel, RecognizerState::Active) => {
                self.state = RecognizerState::Ended;
            }
            (TouchPhase::Up | TouchPhase::Cancel, RecognizerState::Possible) => {
                self.state = RecognizerState::Failed;
            }
            _ => {}
        }
    }

    fn cancel(&mut self, _out: &mut Callbacks) {
        self.state = RecognizerState::Failed;
    }

    fn reset(&mut self) {
        self.state = RecognizerState::Possible;
        self.origin = None;
    }
}
