//! Pointer input.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The runtime translates window events into [`PointerInput`]s, feeds them to a
//! [`PointerState`], and forwards the resulting [`RawPointerEvent`]s to the app.

pub(crate) mod platform;
mod state;
mod types;

pub use state::PointerState;
pub use types::{
    parse_event_list,
    MouseButton,
    PointerEvent,
    PointerEventType,
    PointerInput,
    RawPointerEvent,
    TouchPhase,
};
