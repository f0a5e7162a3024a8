use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;

use crate::error::NovaError;
use crate::events::GestureRecognizer;
use crate::gfx::SharedRenderer;
use crate::input::RawPointerEvent;
use crate::loops::{LoopKey, LoopManager};
use crate::time::FrameClock;
use crate::world::{Stage, World};

use super::{AppOptions, Capabilities, Host, VrDisplay};

/// Render-loop key of the VR presentation entry.
pub const VR_LOOP_KEY: &str = "vr";

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum AppState {
    #[default]
    Stopped,
    Running,
    Paused,
}

/// Owns the primary world and the app-level loops, and drives them from the
/// host's frame callback.
///
/// A tick runs the app logic loop, then the primary world, then the app
/// render loop, but only while running. Paused apps keep re-arming the frame
/// callback so `resume` needs no restart.
pub struct App {
    host: Box<dyn Host>,
    options: AppOptions,
    stage: Stage,
    world: Rc<World>,
    logic_loop: LoopManager,
    render_loop: LoopManager,
    state: AppState,
    clock: FrameClock,
    armed: bool,
    fullscreen: bool,
    gesture: Option<Box<dyn GestureRecognizer>>,
    vr: Option<Rc<RefCell<Box<dyn VrDisplay>>>>,
}

impl App {
    pub fn new(
        host: impl Host + 'static,
        renderer: SharedRenderer,
        options: AppOptions,
        capabilities: Capabilities,
    ) -> Result<App> {
        let clear = &options.renderer;
        renderer.borrow_mut().set_clear_color(clear.clear_color, clear.clear_alpha);

        let stage = Stage::new(
            renderer,
            host.viewport(),
            options.normal_events.clone(),
            options.gesture_events.clone(),
        );
        let world = World::new(&stage, None, Some(options.renderer.clear_color));

        let Capabilities { gesture, vr } = capabilities;

        if gesture.is_none() && !options.gesture_events.is_empty() {
            log::warn!("{}", NovaError::missing("gesture recognizer", "gesture events are disabled"));
        }

        let vr = match (options.vr_support, vr) {
            (true, Some(display)) => Some(Rc::new(RefCell::new(display))),
            (true, None) => {
                log::warn!("{}", NovaError::missing("VR display", "VR mode cannot be opened"));
                None
            }
            (false, Some(_)) => {
                log::debug!("VR display supplied without vr_support; ignoring it");
                None
            }
            (false, None) => None,
        };

        let auto_start = options.auto_start;

        let mut app = App {
            host: Box::new(host),
            options,
            stage,
            world,
            logic_loop: LoopManager::new(),
            render_loop: LoopManager::new(),
            state: AppState::Stopped,
            clock: FrameClock::new(),
            armed: false,
            fullscreen: false,
            gesture,
            vr,
        };

        if auto_start {
            app.start()?;
        }

        Ok(app)
    }

    /// Attaches the surface, fits it to the host and runs the first tick,
    /// which arms the frame callback. No-op unless stopped.
    pub fn start(&mut self) -> Result<()> {
        if self.state != AppState::Stopped {
            return Ok(());
        }

        self.set_state(AppState::Running);
        self.host.attach();
        log::info!("surface attached");

        self.resize();
        self.clock.reset();
        self.armed = true;
        self.tick()
    }

    pub fn pause(&mut self) {
        if self.state == AppState::Running {
            self.set_state(AppState::Paused);
        }
    }

    pub fn resume(&mut self) {
        if self.state == AppState::Paused {
            self.clock.reset();
            self.set_state(AppState::Running);
        }
    }

    /// The frame callback.
    ///
    /// Once `start` has run, every tick requests the next frame, whatever the
    /// state. A failing callback returns its error before the next frame is
    /// requested, so the chain stops there.
    pub fn tick(&mut self) -> Result<()> {
        let time = self.clock.tick();

        if self.state == AppState::Running {
            self.logic_loop.update()?;
            self.world.update(time)?;
            self.render_loop.update()?;
        }

        if self.armed {
            self.host.request_frame();
        }
        Ok(())
    }

    /// Stops the app for good: clears the app loops and destroys the
    /// primary world. The frame chain keeps running idle.
    pub fn destroy(&mut self) {
        self.set_state(AppState::Stopped);
        self.logic_loop.remove_all();
        self.render_loop.remove_all();
        self.world.destroy();
    }

    /// Fits the renderer, the live viewport and the primary world to the
    /// host's current size.
    pub fn resize(&mut self) {
        let viewport = self.host.viewport();
        let ratio = self
            .options
            .renderer
            .pixel_ratio
            .unwrap_or_else(|| self.host.pixel_ratio());

        log::debug!("resize to {}x{} @{ratio}", viewport.width, viewport.height);

        self.stage.set_viewport(viewport);
        {
            let mut renderer = self.stage.renderer().borrow_mut();
            renderer.set_size(viewport.width, viewport.height);
            renderer.set_pixel_ratio(ratio);
        }
        self.world.resize(viewport.width, viewport.height);

        if let Some(vr) = &self.vr {
            vr.borrow_mut().set_size(viewport.width, viewport.height);
        }
    }

    /// Routes a primitive pointer event to every live world of the stage and
    /// feeds the gesture recognizer.
    pub fn handle_pointer(&mut self, raw: &RawPointerEvent) -> Result<()> {
        let managers = self.stage.event_managers();

        for manager in &managers {
            manager.handle_raw(raw)?;
        }

        if let Some(recognizer) = &mut self.gesture {
            for gesture in recognizer.feed(raw) {
                for manager in &managers {
                    manager.handle_gesture(&gesture)?;
                }
            }
        }

        Ok(())
    }

    pub fn open_fullscreen(&mut self) -> bool {
        self.fullscreen = self.host.set_fullscreen(true);
        self.fullscreen
    }

    pub fn close_fullscreen(&mut self) -> bool {
        self.host.set_fullscreen(false);
        self.fullscreen = false;
        self.fullscreen
    }

    pub fn toggle_fullscreen(&mut self) -> bool {
        if self.fullscreen {
            self.close_fullscreen()
        } else {
            self.open_fullscreen()
        }
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Presents the primary world through the VR display from the app render
    /// loop. Returns `false` when no display is available.
    pub fn open_vr(&mut self) -> Result<bool> {
        let Some(vr) = self.vr.clone() else {
            log::warn!("{}", NovaError::missing("VR display", "cannot enter VR mode"));
            return Ok(false);
        };

        let renderer = self.stage.renderer().clone();
        let world = self.world.clone();
        let display = vr.clone();
        self.render_loop.add_with_key(LoopKey::from(VR_LOOP_KEY), move || {
            let camera = world.camera().borrow().handle();
            display.borrow_mut().render(&mut *renderer.borrow_mut(), world.scene(), camera)
        });

        vr.borrow_mut().request_present()?;
        Ok(true)
    }

    pub fn close_vr(&mut self) {
        if self.render_loop.remove(&LoopKey::from(VR_LOOP_KEY)) {
            if let Some(vr) = &self.vr {
                vr.borrow_mut().exit_present();
            }
        }
    }

    pub fn is_vr_open(&self) -> bool {
        self.render_loop.contains(&LoopKey::from(VR_LOOP_KEY))
    }

    fn set_state(&mut self, state: AppState) {
        log::debug!("app state {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn options(&self) -> &AppOptions {
        &self.options
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn renderer(&self) -> &SharedRenderer {
        self.stage.renderer()
    }

    /// The primary world, updated between the app logic and render loops.
    pub fn world(&self) -> &Rc<World> {
        &self.world
    }

    pub fn logic_loop(&self) -> &LoopManager {
        &self.logic_loop
    }

    pub fn render_loop(&self) -> &LoopManager {
        &self.render_loop
    }
}
