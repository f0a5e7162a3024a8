//! Scene-to-scene crossfade.

use std::rc::Rc;

use anyhow::Result;

use crate::gfx::{MaterialHandle, Projection, ShaderMaterial, TextureSource};
use crate::post::shaders;
use crate::time::FrameTime;
use crate::world::{Stage, World};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransitionOptions {
    /// Wipe along the mask texture instead of a plain dissolve.
    pub use_texture: bool,
    /// Initial blend position, `0` = outgoing world, `1` = incoming world.
    pub mix_ratio: f32,
    /// Softness of the wipe edge.
    pub threshold: f32,
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self {
            use_texture: true,
            mix_ratio: 0.0,
            threshold: 0.3,
        }
    }
}

/// Blends two worlds into the screen.
///
/// Each update renders the outgoing world and then the incoming world into
/// their offscreen buffers, then draws a viewport-sized quad that mixes both.
/// The caller drives `mix_ratio`; no easing happens here.
pub struct Transitioner {
    stage: Stage,
    world: Rc<World>,
    incoming: Rc<World>,
    outgoing: Rc<World>,
    material: ShaderMaterial,
    material_handle: MaterialHandle,
    mix_ratio: f32,
    wants_texture: bool,
    has_mask: bool,
}

impl Transitioner {
    /// `incoming` fades in over `outgoing` as the mix ratio goes from 0 to 1.
    pub fn new(
        stage: &Stage,
        incoming: Rc<World>,
        outgoing: Rc<World>,
        mask: Option<TextureSource>,
        options: TransitionOptions,
    ) -> Self {
        let viewport = stage.viewport();
        let projection = Projection::centered_orthographic(viewport.width, viewport.height, -10.0, 10.0);
        let world = World::new(stage, Some(projection), None);
        // Only the scene and camera are used: the quad is drawn directly, so the
        // world's offscreen buffer, render entry and pointer dispatch go away.
        world.destroy();

        let mut material = shaders::transition(mask);
        material.set_texture("tDiffuse1", incoming.offscreen_buffer().map(TextureSource::Target));
        material.set_texture("tDiffuse2", outgoing.offscreen_buffer().map(TextureSource::Target));
        material.set_float("threshold", options.threshold);
        material.set_int("useTexture", i32::from(options.use_texture && mask.is_some()));

        let material_handle = {
            let mut r = stage.renderer().borrow_mut();
            let handle = r.create_material(&material);
            r.create_plane(world.scene(), viewport.width, viewport.height, handle);
            handle
        };

        Self {
            stage: stage.clone(),
            world,
            incoming,
            outgoing,
            material,
            material_handle,
            mix_ratio: options.mix_ratio,
            wants_texture: options.use_texture,
            has_mask: mask.is_some(),
        }
    }

    /// Stored as given; clamped to `[0, 1]` when applied.
    pub fn set_mix_ratio(&mut self, ratio: f32) {
        self.mix_ratio = ratio;
    }

    pub fn mix_ratio(&self) -> f32 {
        self.mix_ratio
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.material.set_float("threshold", threshold);
    }

    /// Requests the mask wipe. It only takes effect while a mask texture is
    /// set; without one the blend is a plain dissolve.
    pub fn use_texture(&mut self, on: bool) {
        self.wants_texture = on;
        self.apply_texture_mode();
    }

    pub fn set_mask_texture(&mut self, mask: Option<TextureSource>) {
        self.has_mask = mask.is_some();
        self.material.set_texture("tMixTexture", mask);
        self.apply_texture_mode();
    }

    fn apply_texture_mode(&mut self) {
        self.material
            .set_int("useTexture", i32::from(self.wants_texture && self.has_mask));
    }

    pub fn material(&self) -> &ShaderMaterial {
        &self.material
    }

    /// The world holding the compositing quad.
    pub fn world(&self) -> &Rc<World> {
        &self.world
    }

    pub fn update(&mut self, time: FrameTime) -> Result<()> {
        self.material.set_float("mixRatio", self.mix_ratio.clamp(0.0, 1.0));
        self.stage
            .renderer()
            .borrow_mut()
            .update_material(self.material_handle, &self.material);

        for source in [&self.outgoing, &self.incoming] {
            self.stage
                .renderer()
                .borrow_mut()
                .set_clear_color(source.clear_color(), 1.0);
            source.render_offscreen(time)?;
        }

        let camera = self.world.camera().borrow().handle();
        self.stage
            .renderer()
            .borrow_mut()
            .render(self.world.scene(), camera, None, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rgb;
    use crate::gfx::Renderer;
    use crate::testing::{recording_stage, Call};

    #[test]
    fn renders_outgoing_then_incoming_then_composite() {
        let (renderer, stage) = recording_stage(400.0, 300.0);
        let incoming = World::new(&stage, None, Some(Rgb(0x0000ff)));
        let outgoing = World::new(&stage, None, Some(Rgb(0xff0000)));
        let mut t = Transitioner::new(&stage, incoming.clone(), outgoing.clone(), None, TransitionOptions::default());

        t.update(FrameTime::zero()).unwrap();

        let r = renderer.borrow();
        let interesting: Vec<Call> = r
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Render { .. } | Call::SetClearColor(..)))
            .cloned()
            .collect();
        let cam = |w: &World| w.camera().borrow().handle();
        assert_eq!(
            interesting,
            [
                Call::SetClearColor(Rgb(0xff0000), 1.0),
                Call::Render {
                    scene: outgoing.scene(),
                    camera: cam(&outgoing),
                    target: outgoing.offscreen_buffer(),
                    force_clear: true,
                },
                Call::SetClearColor(Rgb(0x0000ff), 1.0),
                Call::Render {
                    scene: incoming.scene(),
                    camera: cam(&incoming),
                    target: incoming.offscreen_buffer(),
                    force_clear: true,
                },
                Call::Render { scene: t.world().scene(), camera: cam(t.world()), target: None, force_clear: true },
            ]
        );
    }

    #[test]
    fn binds_offscreen_buffers_and_clamps_ratio() {
        let (renderer, stage) = recording_stage(400.0, 300.0);
        let incoming = World::new(&stage, None, None);
        let outgoing = World::new(&stage, None, None);
        let mut t = Transitioner::new(&stage, incoming.clone(), outgoing.clone(), None, TransitionOptions::default());

        t.set_mix_ratio(1.7);
        t.update(FrameTime::zero()).unwrap();

        let m = renderer.borrow().last_material().unwrap();
        assert_eq!(m.float("mixRatio"), Some(1.0));
        assert_eq!(m.float("threshold"), Some(0.3));
        assert_eq!(m.int("useTexture"), Some(0));
        assert_eq!(m.texture("tDiffuse1"), incoming.offscreen_buffer().map(TextureSource::Target));
        assert_eq!(m.texture("tDiffuse2"), outgoing.offscreen_buffer().map(TextureSource::Target));

        t.set_mix_ratio(-0.5);
        t.use_texture(false);
        t.update(FrameTime::zero()).unwrap();
        let m = renderer.borrow().last_material().unwrap();
        assert_eq!(m.float("mixRatio"), Some(0.0));
        assert_eq!(m.int("useTexture"), Some(0));
    }

    #[test]
    fn quad_covers_the_viewport() {
        let (renderer, stage) = recording_stage(400.0, 300.0);
        let a = World::new(&stage, None, None);
        let b = World::new(&stage, None, None);
        let t = Transitioner::new(&stage, a, b, None, TransitionOptions::default());

        assert_eq!(
            *t.world().camera().borrow().projection(),
            Projection::orthographic(-200.0, 200.0, 150.0, -150.0, -10.0, 10.0)
        );
        assert!(renderer
            .borrow()
            .calls()
            .iter()
            .any(|c| matches!(c, Call::CreatePlane { width, height, .. } if *width == 400.0 && *height == 300.0)));
    }

    #[test]
    fn mask_wipe_needs_a_mask_texture() {
        let (renderer, stage) = recording_stage(400.0, 300.0);
        let a = World::new(&stage, None, None);
        let b = World::new(&stage, None, None);
        let mut t = Transitioner::new(&stage, a, b, None, TransitionOptions::default());
        assert_eq!(t.material().int("useTexture"), Some(0));

        let mask = renderer.borrow_mut().create_data_texture(2, 2, &[0.5; 12]);
        t.set_mask_texture(Some(TextureSource::Texture(mask)));
        assert_eq!(t.material().int("useTexture"), Some(1));

        t.use_texture(false);
        assert_eq!(t.material().int("useTexture"), Some(0));
        t.use_texture(true);
        assert_eq!(t.material().int("useTexture"), Some(1));

        t.set_mask_texture(None);
        assert_eq!(t.material().int("useTexture"), Some(0));
        assert_eq!(t.material().texture("tMixTexture"), None);
    }

    #[test]
    fn supplied_mask_enables_the_wipe() {
        let (renderer, stage) = recording_stage(400.0, 300.0);
        let a = World::new(&stage, None, None);
        let b = World::new(&stage, None, None);
        let mask = renderer.borrow_mut().create_data_texture(1, 1, &[1.0, 1.0, 1.0]);
        let t = Transitioner::new(&stage, a, b, Some(TextureSource::Texture(mask)), TransitionOptions::default());

        assert_eq!(t.material().int("useTexture"), Some(1));
        assert_eq!(t.material().texture("tMixTexture"), Some(TextureSource::Texture(mask)));
    }

    #[test]
    fn compositing_world_keeps_no_buffer_or_dispatch() {
        let (renderer, stage) = recording_stage(400.0, 300.0);
        let a = World::new(&stage, None, None);
        let b = World::new(&stage, None, None);
        let t = Transitioner::new(&stage, a, b, None, TransitionOptions::default());

        assert_eq!(t.world().offscreen_buffer(), None);
        assert!(t.world().render_loop().is_empty());
        assert!(!t.world().event_manager().is_enabled());
        assert_eq!(renderer.borrow().calls().iter().filter(|c| matches!(c, Call::DisposeTarget(_))).count(), 1);
    }
}
