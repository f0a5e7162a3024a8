use std::collections::HashSet;

use super::types::{MouseButton, PointerEventType, PointerInput, RawPointerEvent, TouchPhase};

/// Current pointer state for a single window.
///
/// Turns low-level [`PointerInput`] into the primitive events the dispatcher
/// understands. A `click` is synthesized when the primary button is released
/// after having been pressed inside the window.
#[derive(Debug, Default)]
pub struct PointerState {
    /// Pointer position in logical pixels.
    pub pointer_pos: Option<(f32, f32)>,

    /// Set of currently held mouse buttons.
    pub buttons_down: HashSet<MouseButton>,
}

impl PointerState {
    pub fn apply(&mut self, input: PointerInput) -> Vec<RawPointerEvent> {
        let mut out = Vec::new();

        match input {
            PointerInput::Moved { x, y } => {
                self.pointer_pos = Some((x, y));
                out.push(RawPointerEvent::new(PointerEventType::MouseMove, x, y));
            }

            PointerInput::Left => {
                self.pointer_pos = None;
            }

            PointerInput::Focused(focused) => {
                if !focused {
                    // Avoids stuck buttons when focus changes mid-press.
                    self.buttons_down.clear();
                }
            }

            PointerInput::Button { button, pressed } => {
                let (x, y) = self.pointer_pos.unwrap_or((0.0, 0.0));

                if pressed {
                    if self.buttons_down.insert(button) {
                        out.push(RawPointerEvent::new(PointerEventType::MouseDown, x, y));
                    }
                } else if self.buttons_down.remove(&button) {
                    out.push(RawPointerEvent::new(PointerEventType::MouseUp, x, y));
                    if button == MouseButton::Left {
                        out.push(RawPointerEvent::new(PointerEventType::Click, x, y));
                    }
                }
            }

            PointerInput::Touch { id, phase, x, y } => {
                let kind = match phase {
                    TouchPhase::Started => PointerEventType::TouchStart,
                    TouchPhase::Moved => PointerEventType::TouchMove,
                    TouchPhase::Ended => PointerEventType::TouchEnd,
                    TouchPhase::Cancelled => PointerEventType::TouchCancel,
                };
                out.push(RawPointerEvent::new(kind, x, y).with_target(id));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(events: &[RawPointerEvent]) -> Vec<&str> {
        events.iter().map(|e| e.kind.as_str()).collect()
    }

    #[test]
    fn primary_release_synthesizes_click() {
        let mut s = PointerState::default();
        s.apply(PointerInput::Moved { x: 10.0, y: 20.0 });

        let down = s.apply(PointerInput::Button { button: MouseButton::Left, pressed: true });
        assert_eq!(kinds(&down), ["mousedown"]);

        let up = s.apply(PointerInput::Button { button: MouseButton::Left, pressed: false });
        assert_eq!(kinds(&up), ["mouseup", "click"]);
        assert_eq!((up[1].client_x, up[1].client_y), (10.0, 20.0));
    }

    #[test]
    fn secondary_release_has_no_click() {
        let mut s = PointerState::default();
        s.apply(PointerInput::Button { button: MouseButton::Right, pressed: true });
        let up = s.apply(PointerInput::Button { button: MouseButton::Right, pressed: false });
        assert_eq!(kinds(&up), ["mouseup"]);
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut s = PointerState::default();
        s.apply(PointerInput::Button { button: MouseButton::Left, pressed: true });
        s.apply(PointerInput::Focused(false));
        let up = s.apply(PointerInput::Button { button: MouseButton::Left, pressed: false });
        assert!(up.is_empty());
    }

    #[test]
    fn touches_carry_their_id() {
        let mut s = PointerState::default();
        let ev = s.apply(PointerInput::Touch { id: 7, phase: TouchPhase::Ended, x: 1.0, y: 2.0 });
        assert_eq!(kinds(&ev), ["touchend"]);
        assert_eq!(ev[0].target, Some(7));
    }
}
