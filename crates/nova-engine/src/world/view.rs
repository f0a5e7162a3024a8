use std::rc::Rc;

use anyhow::Result;

use crate::coords::{Rgb, Viewport};
use crate::gfx::{Camera, PixelRect, Projection};

use super::World;

/// Sub-rectangle of the viewport, as fractions of its size.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewRegion {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewRegion {
    pub const FULL: ViewRegion = ViewRegion { left: 0.0, top: 0.0, width: 1.0, height: 1.0 };

    /// Pixel rectangle of this region inside `viewport`, floored.
    pub fn pixel_rect(&self, viewport: Viewport) -> PixelRect {
        let px = |v: f32| v.max(0.0).floor() as u32;
        PixelRect {
            x: px(viewport.width * self.left),
            y: px(viewport.height * self.top),
            width: px(viewport.width * self.width),
            height: px(viewport.height * self.height),
        }
    }
}

impl Default for ViewRegion {
    fn default() -> Self {
        Self::FULL
    }
}

/// A second look at a world: its scene through another camera, drawn into a
/// scissored part of the screen.
pub struct View {
    world: Rc<World>,
    camera: Camera,
    region: ViewRegion,
    clear_color: Rgb,
}

impl View {
    /// Without a projection the camera is a 45° perspective (near 0.01,
    /// far 1000) fitted to the region.
    pub fn new(world: Rc<World>, projection: Option<Projection>, region: ViewRegion, clear_color: Rgb) -> Self {
        let camera = {
            let mut renderer = world.stage().renderer().borrow_mut();
            let projection = projection.unwrap_or_else(|| Projection::perspective(45.0, 1.0, 0.01, 1000.0));
            Camera::new(&mut *renderer, projection)
        };

        let mut view = Self { world, camera, region, clear_color };
        view.resize();
        view
    }

    /// Re-fits the camera to the region's current pixel size.
    pub fn resize(&mut self) {
        let rect = self.region.pixel_rect(self.world.stage().viewport());
        let mut renderer = self.world.stage().renderer().borrow_mut();
        if let Err(e) = self.camera.resize(&mut *renderer, rect.width as f32, rect.height as f32) {
            log::warn!("view resize: {e}");
        }
    }

    pub fn render(&self) -> Result<()> {
        let rect = self.region.pixel_rect(self.world.stage().viewport());
        let mut renderer = self.world.stage().renderer().borrow_mut();
        renderer.set_viewport(rect);
        renderer.set_scissor(rect);
        renderer.set_scissor_test(true);
        renderer.set_clear_color(self.clear_color, 1.0);
        renderer.render(self.world.scene(), self.camera.handle(), None, false)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn region(&self) -> ViewRegion {
        self.region
    }

    pub fn set_region(&mut self, region: ViewRegion) {
        self.region = region;
        self.resize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{recording_stage, Call};

    #[test]
    fn region_rect_is_floored() {
        let region = ViewRegion { left: 0.5, top: 0.25, width: 0.5, height: 0.33 };
        let rect = region.pixel_rect(Viewport::new(801.0, 600.0));
        assert_eq!(rect, PixelRect { x: 400, y: 150, width: 400, height: 198 });
    }

    #[test]
    fn render_scissors_to_region() {
        let (renderer, stage) = recording_stage(800.0, 600.0);
        let world = World::new(&stage, None, None);
        let region = ViewRegion { left: 0.5, top: 0.0, width: 0.5, height: 1.0 };
        let view = View::new(world.clone(), None, region, Rgb::WHITE);

        assert_eq!(
            *view.camera().projection(),
            Projection::perspective(45.0, 400.0 / 600.0, 0.01, 1000.0)
        );

        view.render().unwrap();
        let rect = PixelRect { x: 400, y: 0, width: 400, height: 600 };
        let r = renderer.borrow();
        let calls = r.calls();
        let tail = &calls[calls.len() - 5..];
        assert_eq!(
            tail,
            [
                Call::SetViewport(rect),
                Call::SetScissor(rect),
                Call::SetScissorTest(true),
                Call::SetClearColor(Rgb::WHITE, 1.0),
                Call::Render { scene: world.scene(), camera: view.camera().handle(), target: None, force_clear: false },
            ]
        );
    }
}
