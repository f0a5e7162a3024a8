use anyhow::Result;

use crate::coords::Vec2;
use crate::gfx::{Renderer, TargetHandle, TextureSource};

use super::{shaders, FullscreenQuad, Pass, PassFlags};

/// Halftone dot screen.
#[derive(Debug)]
pub struct DotScreenPass {
    flags: PassFlags,
    quad: FullscreenQuad,
}

impl DotScreenPass {
    pub fn new(center: Vec2, angle: f32, scale: f32) -> Self {
        Self {
            flags: PassFlags::default(),
            quad: FullscreenQuad::new(shaders::dot_screen(center, angle, scale)),
        }
    }

    pub fn set_angle(&mut self, angle: f32) {
        self.quad.material_mut().set_float("angle", angle);
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.quad.material_mut().set_float("scale", scale);
    }
}

impl Default for DotScreenPass {
    fn default() -> Self {
        Self::new(Vec2::new(0.5, 0.5), 1.57, 1.0)
    }
}

impl Pass for DotScreenPass {
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
        let (w, h) = renderer.target_size(read);
        let material = self.quad.material_mut();
        material.set_texture("tDiffuse", Some(TextureSource::Target(read)));
        material.set_vec2("tSize", [w as f32, h as f32]);

        self.quad.draw_pass(renderer, &self.flags, write)
    }
}
