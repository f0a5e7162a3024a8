use std::sync::Arc;

use winit::window::{Fullscreen, Window};

use crate::app::Host;
use crate::coords::Viewport;

/// [`Host`] over a winit window.
///
/// The window is expected to be created hidden; `attach` shows it.
/// `request_frame` maps to `request_redraw`, which the runtime answers with
/// `App::tick`.
#[derive(Debug, Clone)]
pub struct WinitHost {
    window: Arc<Window>,
}

impl WinitHost {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

impl Host for WinitHost {
    fn attach(&mut self) {
        self.window.set_visible(true);
    }

    fn viewport(&self) -> Viewport {
        let size = self.window.inner_size().to_logical::<f32>(self.window.scale_factor());
        Viewport::new(size.width, size.height)
    }

    fn pixel_ratio(&self) -> f64 {
        self.window.scale_factor()
    }

    fn request_frame(&mut self) {
        self.window.request_redraw();
    }

    fn set_fullscreen(&mut self, on: bool) -> bool {
        self.window.set_fullscreen(on.then_some(Fullscreen::Borderless(None)));
        on
    }
}
