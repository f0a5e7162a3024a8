use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::Result;

use crate::coords::Rgb;
use crate::events::EventManager;
use crate::gfx::{Camera, Projection, SceneHandle, SharedCamera, TargetHandle, TargetParams};
use crate::loops::{LoopKey, LoopManager};
use crate::post::EffectComposer;
use crate::time::FrameTime;

use super::Stage;

/// What the default render entry of a world draws to.
#[derive(Clone)]
pub enum RenderMode {
    /// Scene straight to the screen.
    Direct,
    /// Scene into the world's offscreen buffer, cleared first.
    Offscreen,
    /// The attached composer's pass chain.
    Composed(Rc<RefCell<EffectComposer>>),
}

impl RenderMode {
    pub fn name(&self) -> &'static str {
        match self {
            RenderMode::Direct => "direct",
            RenderMode::Offscreen => "offscreen",
            RenderMode::Composed(_) => "composed",
        }
    }
}

/// One scene, its camera, and two loops that run logic and rendering.
///
/// The render loop always starts with a default entry (see
/// [`default_render_key`](Self::default_render_key)) drawing the scene
/// according to the current [`RenderMode`]. `update` runs the logic loop and
/// then the render loop; pausing is the app's business.
pub struct World {
    stage: Stage,
    scene: SceneHandle,
    camera: SharedCamera,
    logic_loop: LoopManager,
    render_loop: LoopManager,
    event_manager: Rc<EventManager>,
    offscreen: Rc<Cell<Option<TargetHandle>>>,
    clear_color: Cell<Rgb>,
    mode: Rc<RefCell<RenderMode>>,
    last_time: Rc<Cell<FrameTime>>,
    default_render_key: LoopKey,
}

impl World {
    /// Creates a world on `stage`.
    ///
    /// Without a projection the camera is a 45° perspective fitted to the
    /// current viewport (near 0.01, far 5000).
    pub fn new(stage: &Stage, projection: Option<Projection>, clear_color: Option<Rgb>) -> Rc<World> {
        let viewport = stage.viewport();

        let (scene, camera, offscreen) = {
            let mut renderer = stage.renderer().borrow_mut();
            let scene = renderer.create_scene();
            let projection =
                projection.unwrap_or_else(|| Projection::perspective(45.0, viewport.aspect(), 0.01, 5000.0));
            let camera = Camera::new(&mut *renderer, projection);
            let (w, h) = viewport.pixel_size();
            let offscreen = renderer.create_render_target(w, h, TargetParams::rgb());
            (scene, camera, offscreen)
        };

        let camera = Rc::new(RefCell::new(camera));
        let offscreen = Rc::new(Cell::new(Some(offscreen)));
        let mode = Rc::new(RefCell::new(RenderMode::Direct));
        let last_time = Rc::new(Cell::new(FrameTime::zero()));

        let render_loop = LoopManager::new();
        let default_render_key = LoopKey::generate();
        {
            let renderer = stage.renderer().clone();
            let camera = camera.clone();
            let offscreen = offscreen.clone();
            let mode = mode.clone();
            let last_time = last_time.clone();

            render_loop.add_with_key(default_render_key.clone(), move || {
                let mode = mode.borrow().clone();
                let camera = camera.borrow().handle();
                match mode {
                    RenderMode::Direct => renderer.borrow_mut().render(scene, camera, None, false),
                    RenderMode::Offscreen => match offscreen.get() {
                        Some(target) => renderer.borrow_mut().render(scene, camera, Some(target), true),
                        None => Ok(()),
                    },
                    RenderMode::Composed(composer) => composer.borrow_mut().render(last_time.get().dt),
                }
            });
        }

        Rc::new_cyclic(|weak| {
            let event_manager = Rc::new(EventManager::new(weak.clone(), stage));
            stage.register(&event_manager);

            World {
                stage: stage.clone(),
                scene,
                camera,
                logic_loop: LoopManager::new(),
                render_loop,
                event_manager,
                offscreen,
                clear_color: Cell::new(clear_color.unwrap_or(Rgb::BLACK)),
                mode,
                last_time,
                default_render_key,
            }
        })
    }

    /// Runs the logic loop, then the render loop.
    pub fn update(&self, time: FrameTime) -> Result<()> {
        self.last_time.set(time);
        self.logic_loop.update()?;
        self.render_loop.update()?;
        Ok(())
    }

    /// Runs one update with the default entry drawing into the offscreen
    /// buffer, whatever the current mode. The mode is restored afterwards,
    /// also on error.
    pub fn render_offscreen(&self, time: FrameTime) -> Result<()> {
        let previous = self.mode.replace(RenderMode::Offscreen);
        let result = self.update(time);
        *self.mode.borrow_mut() = previous;
        result
    }

    /// Re-fits the camera and the offscreen buffer to `width × height`
    /// logical pixels. An attached composer follows the renderer's drawing
    /// buffer size.
    pub fn resize(&self, width: f32, height: f32) {
        let drawing_size = {
            let mut renderer = self.stage.renderer().borrow_mut();

            if let Err(e) = self.camera.borrow_mut().resize(&mut *renderer, width, height) {
                log::warn!("world resize: {e}");
            }

            if let Some(target) = self.offscreen.get() {
                let (w, h) = (width.max(0.0).round() as u32, height.max(0.0).round() as u32);
                renderer.resize_render_target(target, w, h);
            }

            renderer.drawing_buffer_size()
        };

        let mode = self.mode.borrow().clone();
        if let RenderMode::Composed(composer) = mode {
            composer.borrow_mut().set_size(drawing_size.0, drawing_size.1);
        }
    }

    /// Routes the default render entry through `composer`.
    pub fn attach_composer(&self, composer: Rc<RefCell<EffectComposer>>) {
        self.set_render_mode(RenderMode::Composed(composer));
    }

    /// Switches back to direct rendering, returning the composer if one was
    /// attached.
    pub fn detach_composer(&self) -> Option<Rc<RefCell<EffectComposer>>> {
        match self.mode.replace(RenderMode::Direct) {
            RenderMode::Composed(composer) => Some(composer),
            RenderMode::Direct | RenderMode::Offscreen => None,
        }
    }

    pub fn render_mode(&self) -> RenderMode {
        self.mode.borrow().clone()
    }

    pub fn set_render_mode(&self, mode: RenderMode) {
        log::debug!("world render mode: {}", mode.name());
        *self.mode.borrow_mut() = mode;
    }

    /// Clears both loops (the default render entry included), releases the
    /// offscreen buffer and stops event dispatch.
    pub fn destroy(&self) {
        self.logic_loop.remove_all();
        self.render_loop.remove_all();
        self.mode.replace(RenderMode::Direct);

        if let Some(target) = self.offscreen.take() {
            self.stage.renderer().borrow_mut().dispose_render_target(target);
        }

        self.event_manager.set_enabled(false);
    }

    #[inline]
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    #[inline]
    pub fn scene(&self) -> SceneHandle {
        self.scene
    }

    #[inline]
    pub fn camera(&self) -> &SharedCamera {
        &self.camera
    }

    #[inline]
    pub fn logic_loop(&self) -> &LoopManager {
        &self.logic_loop
    }

    #[inline]
    pub fn render_loop(&self) -> &LoopManager {
        &self.render_loop
    }

    #[inline]
    pub fn event_manager(&self) -> &Rc<EventManager> {
        &self.event_manager
    }

    /// Key of the render entry added at construction.
    #[inline]
    pub fn default_render_key(&self) -> &LoopKey {
        &self.default_render_key
    }

    /// `None` once the world is destroyed.
    #[inline]
    pub fn offscreen_buffer(&self) -> Option<TargetHandle> {
        self.offscreen.get()
    }

    #[inline]
    pub fn clear_color(&self) -> Rgb {
        self.clear_color.get()
    }

    pub fn set_clear_color(&self, color: Rgb) {
        self.clear_color.set(color);
    }

    /// Delta and elapsed time of the last `update`.
    #[inline]
    pub fn last_time(&self) -> FrameTime {
        self.last_time.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{recording_stage, Call};

    #[test]
    fn default_entry_renders_scene_to_screen() {
        let (renderer, stage) = recording_stage(800.0, 600.0);
        let world = World::new(&stage, None, None);
        assert!(world.render_loop().contains(world.default_render_key()));

        world.update(FrameTime::zero()).unwrap();

        let camera = world.camera().borrow().handle();
        assert_eq!(
            renderer.borrow().renders(),
            [Call::Render { scene: world.scene(), camera, target: None, force_clear: false }]
        );
    }

    #[test]
    fn default_camera_is_fitted_perspective() {
        let (_, stage) = recording_stage(800.0, 400.0);
        let world = World::new(&stage, None, None);
        assert_eq!(
            *world.camera().borrow().projection(),
            Projection::perspective(45.0, 2.0, 0.01, 5000.0)
        );
    }

    #[test]
    fn logic_runs_before_render() {
        let (_, stage) = recording_stage(800.0, 600.0);
        let world = World::new(&stage, None, None);
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = order.clone();
        world.render_loop().add(move || {
            o.borrow_mut().push("render");
            Ok(())
        });
        let o = order.clone();
        world.logic_loop().add(move || {
            o.borrow_mut().push("logic");
            Ok(())
        });

        world.update(FrameTime::zero()).unwrap();
        assert_eq!(*order.borrow(), ["logic", "render"]);
    }

    #[test]
    fn resize_twice_equals_resize_once() {
        let (_, stage) = recording_stage(800.0, 600.0);
        let world = World::new(&stage, None, None);

        world.resize(1024.0, 512.0);
        let once = world.camera().borrow().projection().clone();
        world.resize(1024.0, 512.0);
        assert_eq!(*world.camera().borrow().projection(), once);
        assert_eq!(once, Projection::perspective(45.0, 2.0, 0.01, 5000.0));
    }

    #[test]
    fn resize_refits_orthographic_and_offscreen() {
        let (renderer, stage) = recording_stage(800.0, 600.0);
        let ortho = Projection::orthographic(-1.0, 1.0, 1.0, -1.0, -10.0, 10.0);
        let world = World::new(&stage, Some(ortho), None);

        world.resize(200.0, 100.0);
        assert_eq!(
            *world.camera().borrow().projection(),
            Projection::orthographic(-100.0, 100.0, 50.0, -50.0, -10.0, 10.0)
        );

        let target = world.offscreen_buffer().unwrap();
        assert_eq!(renderer.borrow().target_size_of(target), Some((200, 100)));
    }

    #[test]
    fn unsupported_camera_resize_does_not_panic() {
        let (_, stage) = recording_stage(800.0, 600.0);
        let world = World::new(&stage, Some(Projection::Other { kind: "cube".into() }), None);
        world.resize(10.0, 10.0);
        assert_eq!(world.camera().borrow().projection().kind(), "cube");
    }

    #[test]
    fn render_offscreen_restores_mode() {
        let (renderer, stage) = recording_stage(800.0, 600.0);
        let world = World::new(&stage, None, None);

        world.render_offscreen(FrameTime::zero()).unwrap();
        assert!(matches!(world.render_mode(), RenderMode::Direct));

        let target = world.offscreen_buffer();
        let renders = renderer.borrow().renders();
        assert!(matches!(
            renders.as_slice(),
            [Call::Render { target: t, force_clear: true, .. }] if *t == target
        ));
    }

    #[test]
    fn destroy_empties_loops_and_releases_buffer() {
        let (renderer, stage) = recording_stage(800.0, 600.0);
        let world = World::new(&stage, None, None);
        let target = world.offscreen_buffer().unwrap();

        world.destroy();

        assert!(world.render_loop().is_empty());
        assert!(world.offscreen_buffer().is_none());
        assert!(!world.event_manager().is_enabled());
        assert!(renderer.borrow().calls().contains(&Call::DisposeTarget(target)));
    }

    #[test]
    fn worlds_register_their_event_managers() {
        let (_, stage) = recording_stage(800.0, 600.0);
        let a = World::new(&stage, None, None);
        let b = World::new(&stage, None, None);
        assert_eq!(stage.event_managers().len(), 2);

        drop(b);
        let managers = stage.event_managers();
        assert_eq!(managers.len(), 1);
        assert!(Rc::ptr_eq(&managers[0], a.event_manager()));
    }
}
