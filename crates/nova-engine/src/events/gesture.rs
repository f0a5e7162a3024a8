use crate::coords::Vec2;
use crate::input::{PointerEvent, PointerEventType, RawPointerEvent};

/// Multi-touch gesture capability.
///
/// Fed every primitive pointer event; returns the gesture events recognized so
/// far, which the app forwards to each event manager's gesture path.
pub trait GestureRecognizer {
    fn feed(&mut self, event: &RawPointerEvent) -> Vec<PointerEvent>;
}

/// Minimal recognizer for `tap` and `pan`.
///
/// A press released within `slop` logical pixels of where it started is a tap;
/// moving further while pressed emits `pan` on every move.
#[derive(Debug)]
pub struct TapPanRecognizer {
    slop: f32,
    start: Option<RawPointerEvent>,
    panning: bool,
}

impl TapPanRecognizer {
    pub fn new(slop: f32) -> Self {
        Self { slop, start: None, panning: false }
    }
}

impl Default for TapPanRecognizer {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl GestureRecognizer for TapPanRecognizer {
    fn feed(&mut self, event: &RawPointerEvent) -> Vec<PointerEvent> {
        let pos = Vec2::new(event.client_x, event.client_y);

        match event.kind {
            PointerEventType::MouseDown | PointerEventType::TouchStart => {
                self.start = Some(event.clone());
                self.panning = false;
                Vec::new()
            }

            PointerEventType::MouseMove | PointerEventType::TouchMove => {
                let Some(start) = &self.start else {
                    return Vec::new();
                };
                let origin = Vec2::new(start.client_x, start.client_y);
                if self.panning || origin.distance(pos) > self.slop {
                    self.panning = true;
                    vec![PointerEvent::gesture(PointerEventType::Pan, pos, vec![event.clone()])]
                } else {
                    Vec::new()
                }
            }

            PointerEventType::MouseUp | PointerEventType::TouchEnd => {
                let start = self.start.take();
                let panning = std::mem::replace(&mut self.panning, false);
                match start {
                    Some(start) if !panning => {
                        vec![PointerEvent::gesture(PointerEventType::Tap, pos, vec![start, event.clone()])]
                    }
                    _ => Vec::new(),
                }
            }

            PointerEventType::TouchCancel => {
                self.start = None;
                self.panning = false;
                Vec::new()
            }

            _ => Vec::new(),
        }
    }
}
