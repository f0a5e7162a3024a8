//! Post-processing.
//!
//! An [`EffectComposer`] runs a chain of [`Pass`]es over two ping-ponged
//! offscreen buffers:
//!
//! ```text
//!   RenderPass      ShaderPass       GlitchPass (render_to_screen)
//!   scene → read    read → write     read → screen
//!                   swap
//! ```
//!
//! Attach a composer to a world with
//! [`World::attach_composer`](crate::world::World::attach_composer) so the
//! world's default render entry drives it every frame.

mod composer;
mod dot_screen;
mod glitch;
mod mask;
mod pass;
mod quad;
mod render_pass;
mod shader_pass;
pub mod shaders;

pub use composer::EffectComposer;
pub use dot_screen::DotScreenPass;
pub use glitch::GlitchPass;
pub use mask::{ClearMaskPass, MaskPass};
pub use pass::{MaskTransition, Pass, PassFlags};
pub use quad::FullscreenQuad;
pub use render_pass::RenderPass;
pub use shader_pass::ShaderPass;
