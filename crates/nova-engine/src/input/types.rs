use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::coords::Vec2;

/// Name of a pointer or gesture event.
///
/// Primitive events mirror DOM pointer names; gesture events mirror the usual
/// recognizer names. Anything else is kept verbatim in `Other`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum PointerEventType {
    Click,
    MouseDown,
    MouseUp,
    MouseMove,
    TouchStart,
    TouchEnd,
    TouchMove,
    TouchCancel,

    // Gestures
    Press,
    Tap,
    PressUp,
    Pan,
    Swipe,

    Other(String),
}

impl PointerEventType {
    pub fn as_str(&self) -> &str {
        match self {
            PointerEventType::Click => "click",
            PointerEventType::MouseDown => "mousedown",
            PointerEventType::MouseUp => "mouseup",
            PointerEventType::MouseMove => "mousemove",
            PointerEventType::TouchStart => "touchstart",
            PointerEventType::TouchEnd => "touchend",
            PointerEventType::TouchMove => "touchmove",
            PointerEventType::TouchCancel => "touchcancel",
            PointerEventType::Press => "press",
            PointerEventType::Tap => "tap",
            PointerEventType::PressUp => "pressup",
            PointerEventType::Pan => "pan",
            PointerEventType::Swipe => "swipe",
            PointerEventType::Other(name) => name,
        }
    }

    /// Primitive events produced by the runtime by default.
    pub fn default_normal_events() -> Vec<PointerEventType> {
        vec![
            PointerEventType::Click,
            PointerEventType::MouseDown,
            PointerEventType::MouseUp,
            PointerEventType::TouchStart,
            PointerEventType::TouchEnd,
            PointerEventType::TouchMove,
            PointerEventType::MouseMove,
        ]
    }
}

impl FromStr for PointerEventType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "click" => PointerEventType::Click,
            "mousedown" => PointerEventType::MouseDown,
            "mouseup" => PointerEventType::MouseUp,
            "mousemove" => PointerEventType::MouseMove,
            "touchstart" => PointerEventType::TouchStart,
            "touchend" => PointerEventType::TouchEnd,
            "touchmove" => PointerEventType::TouchMove,
            "touchcancel" => PointerEventType::TouchCancel,
            "press" => PointerEventType::Press,
            "tap" => PointerEventType::Tap,
            "pressup" => PointerEventType::PressUp,
            "pan" => PointerEventType::Pan,
            "swipe" => PointerEventType::Swipe,
            other => PointerEventType::Other(other.to_string()),
        })
    }
}

impl From<&str> for PointerEventType {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for PointerEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a whitespace separated event list such as `"press tap pressup"`.
pub fn parse_event_list(list: &str) -> Vec<PointerEventType> {
    list.split_whitespace().map(PointerEventType::from).collect()
}

/// A primitive pointer event as delivered by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPointerEvent {
    pub kind: PointerEventType,
    /// Position in logical pixels relative to the surface, origin top-left.
    pub client_x: f32,
    pub client_y: f32,
    /// Host-side source of the event: touch id for touches, `None` for the mouse.
    pub target: Option<u64>,
}

impl RawPointerEvent {
    pub fn new(kind: PointerEventType, client_x: f32, client_y: f32) -> Self {
        Self { kind, client_x, client_y, target: None }
    }

    pub fn with_target(mut self, target: u64) -> Self {
        self.target = Some(target);
        self
    }
}

/// Canonical pointer/gesture event shape consumed by the ray-cast dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventType,
    /// Screen position in logical pixels.
    pub center: Vec2,
    pub target: Option<u64>,
    /// Primitive events this one was derived from.
    pub changed_pointers: Vec<RawPointerEvent>,
}

impl PointerEvent {
    /// Adapts a primitive event: `center = (client_x, client_y)`.
    pub fn from_raw(raw: &RawPointerEvent) -> Self {
        Self {
            kind: raw.kind.clone(),
            center: Vec2::new(raw.client_x, raw.client_y),
            target: raw.target,
            changed_pointers: vec![raw.clone()],
        }
    }

    /// A gesture event built by a recognizer.
    pub fn gesture(kind: PointerEventType, center: Vec2, changed_pointers: Vec<RawPointerEvent>) -> Self {
        let target = changed_pointers.first().and_then(|p| p.target);
        Self { kind, center, target, changed_pointers }
    }
}

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TouchPhase {
    Started,
    Moved,
    Ended,
    Cancelled,
}

/// Platform-agnostic pointer input emitted by the runtime.
///
/// Coordinates are logical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PointerInput {
    Moved { x: f32, y: f32 },
    Button { button: MouseButton, pressed: bool },
    Touch { id: u64, phase: TouchPhase, x: f32, y: f32 },

    /// Pointer left the window surface.
    Left,

    /// Window focus change.
    Focused(bool),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_display() {
        for kind in PointerEventType::default_normal_events() {
            assert_eq!(PointerEventType::from(kind.to_string().as_str()), kind);
        }
    }

    #[test]
    fn unknown_names_are_kept() {
        assert_eq!(PointerEventType::from("pinch"), PointerEventType::Other("pinch".into()));
        assert_eq!(PointerEventType::from("pinch").as_str(), "pinch");
    }

    #[test]
    fn event_list_splits_on_whitespace() {
        let list = parse_event_list(" press tap\tpressup  pan swipe ");
        assert_eq!(
            list,
            [
                PointerEventType::Press,
                PointerEventType::Tap,
                PointerEventType::PressUp,
                PointerEventType::Pan,
                PointerEventType::Swipe,
            ]
        );
        assert!(parse_event_list("").is_empty());
    }

    #[test]
    fn raw_events_normalise_to_center() {
        let raw = RawPointerEvent::new(PointerEventType::Click, 12.0, 34.0).with_target(5);
        let ev = PointerEvent::from_raw(&raw);
        assert_eq!(ev.center, Vec2::new(12.0, 34.0));
        assert_eq!(ev.target, Some(5));
        assert_eq!(ev.changed_pointers, [raw]);
    }
}
