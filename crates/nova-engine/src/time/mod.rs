//! Frame timing.
//!
//! The app clock owns one `FrameClock` and produces a `FrameTime` per tick.
//! Worlds keep the last snapshot so render-loop entries (composers,
//! transitions) can read the frame delta without taking arguments.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
