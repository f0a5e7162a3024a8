use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton as WinitMouseButton, TouchPhase as WinitTouchPhase, WindowEvent};
use winit::window::Window;

use crate::input::{MouseButton, PointerInput, TouchPhase};

/// Translates a winit `WindowEvent` into an engine `PointerInput`.
///
/// Returns `None` for events not represented by the input subsystem.
pub(crate) fn translate_window_event(window: &Window, event: &WindowEvent) -> Option<PointerInput> {
    match event {
        WindowEvent::Focused(f) => Some(PointerInput::Focused(*f)),

        WindowEvent::CursorLeft { .. } => Some(PointerInput::Left),

        WindowEvent::CursorMoved { position, .. } => {
            let (x, y) = to_logical_f32(window, *position);
            Some(PointerInput::Moved { x, y })
        }

        WindowEvent::MouseInput { state, button, .. } => Some(PointerInput::Button {
            button: map_mouse_button(*button),
            pressed: *state == ElementState::Pressed,
        }),

        WindowEvent::Touch(touch) => {
            let (x, y) = to_logical_f32(window, touch.location);
            Some(PointerInput::Touch {
                id: touch.id,
                phase: map_touch_phase(touch.phase),
                x,
                y,
            })
        }

        _ => None,
    }
}

fn to_logical_f32(window: &Window, pos: PhysicalPosition<f64>) -> (f32, f32) {
    let scale = window.scale_factor();
    let logical = pos.to_logical::<f64>(scale);
    (logical.x as f32, logical.y as f32)
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

fn map_touch_phase(p: WinitTouchPhase) -> TouchPhase {
    match p {
        WinitTouchPhase::Started => TouchPhase::Started,
        WinitTouchPhase::Moved => TouchPhase::Moved,
        WinitTouchPhase::Ended => TouchPhase::Ended,
        WinitTouchPhase::Cancelled => TouchPhase::Cancelled,
    }
}
