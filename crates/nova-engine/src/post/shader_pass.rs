use anyhow::Result;

use crate::gfx::{Renderer, ShaderMaterial, TargetHandle, TextureSource};

use super::{FullscreenQuad, Pass, PassFlags};

/// Full-screen pass running an arbitrary material over the read buffer.
///
/// The read buffer is bound to the uniform named by `texture_id`
/// (`"tDiffuse"` by default) when the material declares it.
#[derive(Debug)]
pub struct ShaderPass {
    flags: PassFlags,
    quad: FullscreenQuad,
    texture_id: &'static str,
}

impl ShaderPass {
    pub fn new(material: ShaderMaterial) -> Self {
        Self {
            flags: PassFlags::default(),
            quad: FullscreenQuad::new(material),
            texture_id: "tDiffuse",
        }
    }

    pub fn with_texture_id(mut self, texture_id: &'static str) -> Self {
        self.texture_id = texture_id;
        self
    }

    pub fn material(&self) -> &ShaderMaterial {
        self.quad.material()
    }

    pub fn material_mut(&mut self) -> &mut ShaderMaterial {
        self.quad.material_mut()
    }
}

impl Pass for ShaderPass {
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
        if self.quad.material().has_uniform(self.texture_id) {
            self.quad
                .material_mut()
                .set_texture(self.texture_id, Some(TextureSource::Target(read)));
        }
        self.quad.draw_pass(renderer, &self.flags, write)
    }
}
