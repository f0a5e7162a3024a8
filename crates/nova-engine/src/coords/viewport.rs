use super::Vec2;

/// Viewport size in logical pixels.
///
/// This is the size of the host container the app renders into. It is the
/// coordinate basis for converting pointer positions to NDC.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Width over height. Returns `1.0` for an invalid viewport so projection
    /// math never divides by zero.
    #[inline]
    pub fn aspect(self) -> f32 {
        if self.is_valid() { self.width / self.height } else { 1.0 }
    }

    /// Converts a screen position (top-left origin, +Y down) to normalized
    /// device coordinates (`[-1, 1]`, +Y up).
    #[inline]
    pub fn to_ndc(self, screen: Vec2) -> Vec2 {
        Vec2::new(
            2.0 * screen.x / self.width - 1.0,
            1.0 - 2.0 * screen.y / self.height,
        )
    }

    /// Size rounded to whole pixels, for render target allocation.
    #[inline]
    pub fn pixel_size(self) -> (u32, u32) {
        (self.width.max(0.0).round() as u32, self.height.max(0.0).round() as u32)
    }
}
