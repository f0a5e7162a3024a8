/// Opaque RGB color stored as a packed `0xRRGGBB` value.
///
/// Clear colors are configured as hex literals; alpha travels separately
/// (`clear_alpha`) because the renderer keeps it as independent state.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Rgb(pub u32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0x000000);
    pub const WHITE: Rgb = Rgb(0xffffff);

    #[inline]
    pub const fn from_hex(hex: u32) -> Self {
        Self(hex & 0x00ff_ffff)
    }

    #[inline]
    pub const fn hex(self) -> u32 {
        self.0
    }

    /// Channels in `[0, 1]`.
    #[inline]
    pub fn to_f32(self) -> [f32; 3] {
        let r = ((self.0 >> 16) & 0xff) as f32 / 255.0;
        let g = ((self.0 >> 8) & 0xff) as f32 / 255.0;
        let b = (self.0 & 0xff) as f32 / 255.0;
        [r, g, b]
    }
}

impl From<u32> for Rgb {
    fn from(hex: u32) -> Self {
        Rgb::from_hex(hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_masks_alpha_byte() {
        assert_eq!(Rgb::from_hex(0xff12_3456).hex(), 0x12_3456);
    }

    #[test]
    fn channels_are_normalized() {
        assert_eq!(Rgb::from_hex(0xff0000).to_f32(), [1.0, 0.0, 0.0]);
        assert_eq!(Rgb::BLACK.to_f32(), [0.0, 0.0, 0.0]);
    }
}
