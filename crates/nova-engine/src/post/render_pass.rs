use anyhow::Result;

use crate::coords::Rgb;
use crate::gfx::{CameraHandle, MaterialHandle, Renderer, SceneHandle, TargetHandle};

use super::{Pass, PassFlags};

/// Renders a scene into the read buffer (or the screen), so that following
/// passes process it.
///
/// The renderer's auto-clear flag, clear color and the scene's override
/// material are changed only for the duration of the draw.
#[derive(Debug)]
pub struct RenderPass {
    flags: PassFlags,
    scene: SceneHandle,
    camera: CameraHandle,
    pub override_material: Option<MaterialHandle>,
    pub clear_color: Option<Rgb>,
    pub clear_alpha: f32,
    pub clear_depth: bool,
}

impl RenderPass {
    pub fn new(scene: SceneHandle, camera: CameraHandle) -> Self {
        Self {
            flags: PassFlags {
                clear: true,
                needs_swap: false,
                ..PassFlags::default()
            },
            scene,
            camera,
            override_material: None,
            clear_color: None,
            clear_alpha: 0.0,
            clear_depth: false,
        }
    }

    pub fn with_override_material(mut self, material: MaterialHandle) -> Self {
        self.override_material = Some(material);
        self
    }

    pub fn with_clear_color(mut self, color: Rgb, alpha: f32) -> Self {
        self.clear_color = Some(color);
        self.clear_alpha = alpha;
        self
    }
}

/// Restores renderer state captured at construction when dropped.
struct RestoreOnDrop<'a> {
    renderer: &'a mut dyn Renderer,
    scene: SceneHandle,
    auto_clear: bool,
    override_material: Option<MaterialHandle>,
    clear: Option<(Rgb, f32)>,
}

impl<'a> RestoreOnDrop<'a> {
    fn capture(renderer: &'a mut dyn Renderer, scene: SceneHandle, with_clear_color: bool) -> Self {
        let auto_clear = renderer.auto_clear();
        let override_material = renderer.override_material(scene);
        let clear = with_clear_color.then(|| renderer.clear_color());
        Self { renderer, scene, auto_clear, override_material, clear }
    }
}

impl Drop for RestoreOnDrop<'_> {
    fn drop(&mut self) {
        if let Some((color, alpha)) = self.clear {
            self.renderer.set_clear_color(color, alpha);
        }
        self.renderer.set_override_material(self.scene, self.override_material);
        self.renderer.set_auto_clear(self.auto_clear);
    }
}

impl Pass for RenderPass {
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
        read: TargetHandle,
        _delta: f32,
        _mask_active: bool,
    ) -> Result<()> {
        let mut guard = RestoreOnDrop::capture(renderer, self.scene, self.clear_color.is_some());
        let r = &mut *guard.renderer;

        r.set_auto_clear(false);
        r.set_override_material(self.scene, self.override_material);
        if let Some(color) = self.clear_color {
            r.set_clear_color(color, self.clear_alpha);
        }
        if self.clear_depth {
            r.clear_depth();
        }

        let target = if self.flags.render_to_screen { None } else { Some(read) };
        r.render(self.scene, self.camera, target, self.flags.clear)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, RecordingRenderer};

    fn setup() -> (RecordingRenderer, TargetHandle, TargetHandle, SceneHandle) {
        let mut r = RecordingRenderer::new(100, 100);
        let write = r.create_render_target(100, 100, Default::default());
        let read = r.create_render_target(100, 100, Default::default());
        let scene = r.create_scene();
        r.set_clear_color(Rgb(0x112233), 0.5);
        (r, write, read, scene)
    }

    #[test]
    fn renders_into_read_buffer_with_clear() {
        let (mut r, write, read, scene) = setup();
        let mut pass = RenderPass::new(scene, CameraHandle(1));
        assert!(!pass.flags().needs_swap);

        pass.render(&mut r, write, read, 0.0, false).unwrap();
        assert_eq!(
            r.renders(),
            [Call::Render { scene, camera: CameraHandle(1), target: Some(read), force_clear: true }]
        );
    }

    #[test]
    fn state_is_restored_after_render() {
        let (mut r, write, read, scene) = setup();
        let mut pass = RenderPass::new(scene, CameraHandle(1))
            .with_clear_color(Rgb(0xff0000), 1.0)
            .with_override_material(MaterialHandle(9));

        pass.render(&mut r, write, read, 0.0, false).unwrap();

        assert!(r.auto_clear());
        assert_eq!(r.clear_color(), (Rgb(0x112233), 0.5));
        assert_eq!(r.override_material(scene), None);
        assert!(r.calls().contains(&Call::SetClearColor(Rgb(0xff0000), 1.0)));
    }

    #[test]
    fn state_is_restored_when_render_fails() {
        let (mut r, write, read, scene) = setup();
        r.fail_next_render();
        let mut pass = RenderPass::new(scene, CameraHandle(1)).with_clear_color(Rgb(0xff0000), 1.0);

        assert!(pass.render(&mut r, write, read, 0.0, false).is_err());
        assert!(r.auto_clear());
        assert_eq!(r.clear_color(), (Rgb(0x112233), 0.5));
    }
}
