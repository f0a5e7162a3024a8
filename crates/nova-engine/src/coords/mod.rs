//! Coordinate and color types shared by the scheduler, the ray-cast dispatcher
//! and the post-processing passes.
//!
//! Screen space:
//! - Logical pixels (DPI-aware)
//! - Origin top-left
//! - +X right, +Y down
//!
//! Ray casting converts screen positions to normalized device coordinates
//! through [`Viewport::to_ndc`].

mod color;
mod vec2;
mod viewport;

pub use color::Rgb;
pub use vec2::Vec2;
pub use viewport::Viewport;
