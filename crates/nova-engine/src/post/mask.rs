use anyhow::Result;

use crate::gfx::{CameraHandle, Renderer, SceneHandle, StencilFunc, TargetHandle};

use super::{MaskTransition, Pass, PassFlags};

/// Writes a scene as stencil mask into both composer buffers. Passes after it
/// only touch the masked region until a [`ClearMaskPass`].
#[derive(Debug)]
pub struct MaskPass {
    flags: PassFlags,
    scene: SceneHandle,
    camera: CameraHandle,
    pub inverse: bool,
}

impl MaskPass {
    pub fn new(scene: SceneHandle, camera: CameraHandle) -> Self {
        Self {
            flags: PassFlags {
                clear: true,
                needs_swap: false,
                ..PassFlags::default()
            },
            scene,
            camera,
            inverse: false,
        }
    }
}

impl Pass for MaskPass {
    fn flags(&self) -> &PassFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut PassFlags {
        &mut self.flags
    }

    fn render(
        &mut self,
        renderer: &mut dyn Renderer,
        write: TargetHandle,
        read: TargetHandle,
        _delta: f32,
        _mask_active: bool,
    ) -> Result<()> {
        renderer.write_stencil_mask(self.scene, self.camera, &[read, write], self.inverse)?;
        renderer.set_stencil_func(StencilFunc::Equal(1));
        Ok(())
    }

    fn mask_transition(&self) -> MaskTransition {
        MaskTransition::Enter
    }
}

/// Ends the region started by a [`MaskPass`].
#[derive(Debug)]
pub struct ClearMaskPass {
    flags: PassFlags,
}

impl ClearMaskPass {
    pub fn new() -> Self {
        Self {
            flags: PassFlags {
                needs_swap: false,
                ..PassFlags::default()
            },
        }
    }
}

impl Default for ClearMaskPass {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for ClearMaskPass {
    fn flags(&self) -> &PassFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut PassFlags {
        &mut self.flags
    }

    fn render(
        &mut self,
        renderer: &mut dyn Renderer,
        _write: TargetHandle,
        _read: TargetHandle,
        _delta: f32,
        _mask_active: bool,
    ) -> Result<()> {
        renderer.clear_stencil_test();
        Ok(())
    }

    fn mask_transition(&self) -> MaskTransition {
        MaskTransition::Exit
    }
}
