use crate::coords::Viewport;

/// The environment an [`App`](super::App) renders into.
///
/// Supplies the container size, pixel density and the "run on next display
/// refresh" primitive that drives [`App::tick`](super::App::tick).
pub trait Host {
    /// Makes the render surface visible in its container.
    fn attach(&mut self);

    /// Container size in logical pixels.
    fn viewport(&self) -> Viewport;

    /// Device pixels per logical pixel.
    fn pixel_ratio(&self) -> f64;

    /// Schedules one more call to `App::tick`.
    fn request_frame(&mut self);

    /// Enters or leaves fullscreen. Returns whether the container is now
    /// fullscreen.
    fn set_fullscreen(&mut self, on: bool) -> bool;
}
