//! Worlds: a scene, a camera and the two loops that update and draw them.

mod stage;
mod view;
#[allow(clippy::module_inception)]
mod world;

pub use stage::Stage;
pub use view::{View, ViewRegion};
pub use world::{RenderMode, World};
