//! Winit host and runtime loop.
//!
//! Owns the `winit` EventLoop and Window, and feeds redraws, resizes and
//! pointer input into an [`App`](crate::app::App).

mod host;
mod runtime;

pub use host::WinitHost;
pub use runtime::{Runtime, RuntimeConfig};
