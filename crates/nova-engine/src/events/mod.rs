//! Pointer-to-object dispatch.
//!
//! Each world owns one [`EventManager`]. Pointer and gesture events are turned
//! into a ray from the world's camera; the nearest non-penetrated receiver hit
//! by that ray gets the event.

mod gesture;
mod manager;
mod table;

pub use gesture::{GestureRecognizer, TapPanRecognizer};
pub use manager::{EventManager, Hit};
pub use table::Events;
