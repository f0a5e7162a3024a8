//! Top-level application: state machine, frame callback and host boundary.

#[allow(clippy::module_inception)]
mod app;
mod capabilities;
mod host;
mod options;

pub use app::{App, AppState, VR_LOOP_KEY};
pub use capabilities::{Capabilities, VrDisplay};
pub use host::Host;
pub use options::{AppOptions, Precision, RendererOptions};
