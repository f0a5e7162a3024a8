use std::sync::Arc;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::app::App;
use crate::input::PointerState;
use crate::input::platform::winit::translate_window_event;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "nova".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Runs the event loop until the window closes or a frame fails.
    ///
    /// `build` is called once the event loop has resumed and a (hidden)
    /// window exists; it constructs the rendering collaborator and the app.
    pub fn run<F>(config: RuntimeConfig, build: F) -> Result<()>
    where
        F: FnOnce(Arc<Window>) -> Result<App> + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut state = RuntimeState {
            config,
            build: Some(build),
            window: None,
            app: None,
            pointer: PointerState::default(),
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        Ok(())
    }
}

struct RuntimeState<F> {
    config: RuntimeConfig,
    build: Option<F>,
    window: Option<Arc<Window>>,
    app: Option<App>,
    pointer: PointerState,
}

impl<F> RuntimeState<F>
where
    F: FnOnce(Arc<Window>) -> Result<App>,
{
    fn create(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_visible(false);

        let window = Arc::new(event_loop.create_window(attrs).context("failed to create window")?);
        self.window = Some(window.clone());

        if let Some(build) = self.build.take() {
            self.app = Some(build(window).context("failed to build app")?);
        }
        Ok(())
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(app) = &mut self.app {
            app.destroy();
        }
        event_loop.exit();
    }
}

impl<F> ApplicationHandler for RuntimeState<F>
where
    F: FnOnce(Arc<Window>) -> Result<App>,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.create(event_loop) {
            log::error!("{e:#}");
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let (Some(window), Some(app)) = (&self.window, &mut self.app) else {
            return;
        };

        let result = match &event {
            WindowEvent::CloseRequested => {
                self.shutdown(event_loop);
                return;
            }

            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if app.options().auto_resize {
                    app.resize();
                }
                Ok(())
            }

            WindowEvent::RedrawRequested => app.tick(),

            other => match translate_window_event(window, other) {
                Some(input) => self
                    .pointer
                    .apply(input)
                    .iter()
                    .try_for_each(|raw| app.handle_pointer(raw)),
                None => Ok(()),
            },
        };

        if let Err(e) = result {
            log::error!("frame failed: {e:#}");
            self.shutdown(event_loop);
        }
    }
}
