use anyhow::Result;

use crate::events::GestureRecognizer;
use crate::gfx::{CameraHandle, Renderer, SceneHandle};

/// Stereo presentation device.
pub trait VrDisplay {
    /// Starts presenting to the device.
    fn request_present(&mut self) -> Result<()>;

    fn exit_present(&mut self) {}

    /// Output size in logical pixels.
    fn set_size(&mut self, _width: f32, _height: f32) {}

    /// Draws `scene` once per eye.
    fn render(&mut self, renderer: &mut dyn Renderer, scene: SceneHandle, camera: CameraHandle) -> Result<()>;
}

/// Optional features, supplied or absent.
///
/// Checked once when the app is built. Absent capabilities disable the
/// corresponding feature with a warning.
#[derive(Default)]
pub struct Capabilities {
    pub gesture: Option<Box<dyn GestureRecognizer>>,
    pub vr: Option<Box<dyn VrDisplay>>,
}

impl Capabilities {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_gesture(mut self, recognizer: impl GestureRecognizer + 'static) -> Self {
        self.gesture = Some(Box::new(recognizer));
        self
    }

    pub fn with_vr(mut self, display: impl VrDisplay + 'static) -> Self {
        self.vr = Some(Box::new(display));
        self
    }
}
