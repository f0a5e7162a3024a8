use anyhow::Result;

use crate::gfx::{Renderer, TargetHandle};

/// Scheduling flags shared by every pass.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PassFlags {
    /// Disabled passes are skipped by the composer.
    pub enabled: bool,
    /// Swap read and write buffers after this pass renders.
    pub needs_swap: bool,
    /// Clear the destination before rendering.
    pub clear: bool,
    /// Render to the screen instead of the write buffer.
    pub render_to_screen: bool,
}

impl Default for PassFlags {
    fn default() -> Self {
        Self {
            enabled: true,
            needs_swap: true,
            clear: false,
            render_to_screen: false,
        }
    }
}

/// Effect a pass has on the composer's stencil mask state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MaskTransition {
    None,
    Enter,
    Exit,
}

/// One step of an [`EffectComposer`](super::EffectComposer) chain.
///
/// Passes read the composer's read buffer and write either its write buffer or
/// the screen. Buffers are owned by the composer; passes only see handles for
/// the duration of `render`.
pub trait Pass {
    fn flags(&self) -> &PassFlags;
    fn flags_mut(&mut self) -> &mut PassFlags;

    /// Called with the composer's buffer size when added and on every resize.
    fn set_size(&mut self, _width: u32, _height: u32) {}

    fn render(
        &mut self,
        renderer: &mut dyn Renderer,
        write: TargetHandle,
        read: TargetHandle,
        delta: f32,
        mask_active: bool,
    ) -> Result<()>;

    fn mask_transition(&self) -> MaskTransition {
        MaskTransition::None
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.flags_mut().enabled = enabled;
    }

    /// Makes this pass the terminal one: it renders to the screen.
    fn set_render_to_screen(&mut self, on: bool) {
        self.flags_mut().render_to_screen = on;
    }
}
