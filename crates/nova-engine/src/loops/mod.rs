//! Frame-rate divisible callback scheduling.
//!
//! A [`LoopManager`] is the per-frame hook list used by the app and by every
//! world: logic runs in one manager, rendering in another.

mod key;
mod manager;

pub use key::LoopKey;
pub use manager::{callback, LoopCallback, LoopManager};
