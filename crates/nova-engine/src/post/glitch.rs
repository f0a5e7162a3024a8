use std::f32::consts::PI;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::gfx::{Renderer, TargetHandle, TextureHandle, TextureSource};

use super::{shaders, FullscreenQuad, Pass, PassFlags};

/// Digital glitch effect.
///
/// Most frames pass the input through. Every `120..240` frames (re-rolled
/// after each trigger) a strong glitch fires, and during the first fifth of
/// each period a weaker one runs. With `go_wild` every frame is a strong
/// glitch.
#[derive(Debug)]
pub struct GlitchPass {
    flags: PassFlags,
    quad: FullscreenQuad,
    rng: StdRng,
    go_wild: bool,
    frame: u32,
    trigger_period: u32,
    size: u32,
    heightmap: Vec<f32>,
    heightmap_texture: Option<TextureHandle>,
}

impl GlitchPass {
    /// `size` is the edge of the square displacement texture.
    pub fn new(size: u32, go_wild: bool) -> Self {
        Self::with_rng(size, go_wild, StdRng::from_entropy())
    }

    /// Same as `new`, with a reproducible random sequence.
    pub fn with_seed(size: u32, go_wild: bool, seed: u64) -> Self {
        Self::with_rng(size, go_wild, StdRng::seed_from_u64(seed))
    }

    fn with_rng(size: u32, go_wild: bool, mut rng: StdRng) -> Self {
        let heightmap = generate_heightmap(&mut rng, size);
        let mut pass = Self {
            flags: PassFlags::default(),
            quad: FullscreenQuad::new(shaders::glitch()),
            rng,
            go_wild,
            frame: 0,
            trigger_period: 0,
            size,
            heightmap,
            heightmap_texture: None,
        };
        pass.generate_trigger();
        pass
    }

    pub fn go_wild(&self) -> bool {
        self.go_wild
    }

    pub fn set_go_wild(&mut self, go_wild: bool) {
        self.go_wild = go_wild;
    }

    /// Frames between two strong glitches, in `120..240`.
    pub fn trigger_period(&self) -> u32 {
        self.trigger_period
    }

    /// Displacement texture data, `size × size` RGB floats (gray).
    pub fn heightmap(&self) -> &[f32] {
        &self.heightmap
    }

    fn generate_trigger(&mut self) {
        self.trigger_period = self.rng.gen_range(120..240);
    }

    /// Rolls the uniforms for the current frame and advances the counter.
    fn advance(&mut self) {
        let rng = &mut self.rng;
        let material = self.quad.material_mut();

        material.set_float("seed", rng.gen_range(0.0..1.0));
        material.set_int("byp", 0);

        let phase = self.frame % self.trigger_period;
        if phase == 0 || self.go_wild {
            material.set_float("amount", rng.gen_range(0.0..1.0) / 30.0);
            material.set_float("angle", rng.gen_range(-PI..PI));
            material.set_float("seed_x", rng.gen_range(-1.0..1.0));
            material.set_float("seed_y", rng.gen_range(-1.0..1.0));
            material.set_float("distortion_x", rng.gen_range(0.0..1.0));
            material.set_float("distortion_y", rng.gen_range(0.0..1.0));
            self.frame = 0;
            self.generate_trigger();
        } else if (phase as f32) < self.trigger_period as f32 / 5.0 {
            material.set_float("amount", rng.gen_range(0.0..1.0) / 90.0);
            material.set_float("angle", rng.gen_range(-PI..PI));
            material.set_float("distortion_x", rng.gen_range(0.0..1.0));
            material.set_float("distortion_y", rng.gen_range(0.0..1.0));
            material.set_float("seed_x", rng.gen_range(-0.3..0.3));
            material.set_float("seed_y", rng.gen_range(-0.3..0.3));
        } else {
            material.set_int("byp", 1);
        }

        self.frame += 1;
    }
}

impl Default for GlitchPass {
    fn default() -> Self {
        Self::new(64, false)
    }
}

fn generate_heightmap(rng: &mut StdRng, size: u32) -> Vec<f32> {
    let texels = (size as usize) * (size as usize);
    let mut data = Vec::with_capacity(texels * 3);
    for _ in 0..texels {
        let v: f32 = rng.gen_range(0.0..1.0);
        data.extend_from_slice(&[v, v, v]);
    }
    data
}

impl Pass for GlitchPass {
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
        if self.heightmap_texture.is_none() {
            let texture = renderer.create_data_texture(self.size, self.size, &self.heightmap);
            self.heightmap_texture = Some(texture);
            self.quad
                .material_mut()
                .set_texture("tDisp", Some(TextureSource::Texture(texture)));
        }

        self.quad
            .material_mut()
            .set_texture("tDiffuse", Some(TextureSource::Target(read)));
        self.advance();

        self.quad.draw_pass(renderer, &self.flags, write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, RecordingRenderer};

    fn render_frames(pass: &mut GlitchPass, r: &mut RecordingRenderer, frames: usize) -> Vec<i32> {
        let read = r.create_render_target(64, 64, Default::default());
        let write = r.create_render_target(64, 64, Default::default());
        (0..frames)
            .map(|_| {
                pass.render(r, write, read, 0.016, false).unwrap();
                r.last_material().and_then(|m| m.int("byp")).unwrap()
            })
            .collect()
    }

    #[test]
    fn heightmap_is_gray_and_sized() {
        let pass = GlitchPass::with_seed(8, false, 1);
        let data = pass.heightmap();
        assert_eq!(data.len(), 8 * 8 * 3);
        for texel in data.chunks(3) {
            assert!(texel[0] == texel[1] && texel[1] == texel[2]);
            assert!((0.0..1.0).contains(&texel[0]));
        }
    }

    #[test]
    fn trigger_period_in_range() {
        for seed in 0..32 {
            let p = GlitchPass::with_seed(4, false, seed).trigger_period();
            assert!((120..240).contains(&p), "{p}");
        }
    }

    #[test]
    fn displacement_texture_uploaded_once() {
        let mut r = RecordingRenderer::new(64, 64);
        let mut pass = GlitchPass::with_seed(16, false, 7);
        render_frames(&mut pass, &mut r, 3);

        let uploads = r
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::CreateDataTexture { width: 16, height: 16, len: 768 }))
            .count();
        assert_eq!(uploads, 1);
    }

    #[test]
    fn first_frame_glitches_then_settles_into_bypass() {
        let mut r = RecordingRenderer::new(64, 64);
        let mut pass = GlitchPass::with_seed(4, false, 3);
        let byp = render_frames(&mut pass, &mut r, 60);

        assert_eq!(byp[0], 0);
        // Weak phase lasts at least 120 / 5 frames, then bypass.
        assert!(byp[1..24].iter().all(|&b| b == 0));
        assert_eq!(byp[59], 1);
    }

    #[test]
    fn go_wild_never_bypasses() {
        let mut r = RecordingRenderer::new(64, 64);
        let mut pass = GlitchPass::with_seed(4, true, 3);
        let byp = render_frames(&mut pass, &mut r, 300);
        assert!(byp.iter().all(|&b| b == 0));
    }
}
