use anyhow::Result;

use crate::gfx::{
    CameraHandle, MaterialHandle, Projection, Renderer, SceneHandle, ShaderMaterial, TargetHandle,
};

use super::PassFlags;

#[derive(Debug, Copy, Clone)]
struct QuadGpu {
    scene: SceneHandle,
    camera: CameraHandle,
    material: MaterialHandle,
}

/// A 2×2 plane seen by a unit orthographic camera: draws `material` over the
/// whole destination.
///
/// Collaborator objects are created lazily on the first draw.
#[derive(Debug)]
pub struct FullscreenQuad {
    material: ShaderMaterial,
    gpu: Option<QuadGpu>,
}

impl FullscreenQuad {
    pub fn new(material: ShaderMaterial) -> Self {
        Self { material, gpu: None }
    }

    #[inline]
    pub fn material(&self) -> &ShaderMaterial {
        &self.material
    }

    #[inline]
    pub fn material_mut(&mut self) -> &mut ShaderMaterial {
        &mut self.material
    }

    fn ensure_gpu(&mut self, renderer: &mut dyn Renderer) -> QuadGpu {
        if let Some(gpu) = self.gpu {
            return gpu;
        }

        let scene = renderer.create_scene();
        let camera = renderer.create_camera(&Projection::orthographic(-1.0, 1.0, 1.0, -1.0, 0.0, 1.0));
        let material = renderer.create_material(&self.material);
        renderer.create_plane(scene, 2.0, 2.0, material);

        let gpu = QuadGpu { scene, camera, material };
        self.gpu = Some(gpu);
        gpu
    }

    /// Uploads the current uniforms and draws into `target` (`None` = screen).
    pub fn draw(&mut self, renderer: &mut dyn Renderer, target: Option<TargetHandle>, clear: bool) -> Result<()> {
        let gpu = self.ensure_gpu(renderer);
        renderer.update_material(gpu.material, &self.material);
        renderer.render(gpu.scene, gpu.camera, target, clear)
    }

    /// Draws to the screen or to `write`, as `flags` say.
    pub fn draw_pass(&mut self, renderer: &mut dyn Renderer, flags: &PassFlags, write: TargetHandle) -> Result<()> {
        if flags.render_to_screen {
            self.draw(renderer, None, false)
        } else {
            self.draw(renderer, Some(write), flags.clear)
        }
    }
}
