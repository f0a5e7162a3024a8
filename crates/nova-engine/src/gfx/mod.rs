//! Boundary to the scene-graph / rendering collaborator.
//!
//! The engine never draws anything itself. It owns opaque handles, camera
//! projection parameters and shader material descriptions, and drives a
//! [`Renderer`] implementation supplied by the embedding application.

mod camera;
mod handle;
mod material;
mod renderer;

pub use camera::{Camera, Projection, SharedCamera};
pub use handle::{CameraHandle, MaterialHandle, NodeHandle, SceneHandle, TargetHandle, TextureHandle};
pub use material::{ShaderMaterial, TextureSource, Uniform};
pub use renderer::{
    Intersection, PixelRect, Renderer, SharedRenderer, StencilFunc, TargetParams, TextureFilter,
    TextureFormat,
};
