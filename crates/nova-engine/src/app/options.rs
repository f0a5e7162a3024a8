use crate::coords::Rgb;
use crate::input::{PointerEventType, parse_event_list};

/// Shader precision hint for the rendering collaborator.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Precision {
    #[default]
    High,
    Medium,
    Low,
}

impl Precision {
    pub fn as_str(self) -> &'static str {
        match self {
            Precision::High => "highp",
            Precision::Medium => "mediump",
            Precision::Low => "lowp",
        }
    }
}

/// Output settings.
///
/// `clear_color`, `clear_alpha` and `pixel_ratio` are applied by the app.
/// `precision`, `antialias` and `alpha` are read by whoever builds the
/// collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererOptions {
    pub clear_color: Rgb,
    pub clear_alpha: f32,
    /// `None` follows the host's pixel ratio.
    pub pixel_ratio: Option<f64>,
    pub precision: Precision,
    pub antialias: bool,
    pub alpha: bool,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            clear_color: Rgb::BLACK,
            clear_alpha: 1.0,
            pixel_ratio: None,
            precision: Precision::High,
            antialias: true,
            alpha: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppOptions {
    /// Start the frame loop from `App::new`.
    pub auto_start: bool,
    /// Follow host size changes.
    pub auto_resize: bool,
    pub vr_support: bool,
    pub renderer: RendererOptions,
    /// Primitive pointer events dispatched to objects. Each one costs a ray
    /// cast per occurrence.
    pub normal_events: Vec<PointerEventType>,
    pub gesture_events: Vec<PointerEventType>,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            auto_start: true,
            auto_resize: true,
            vr_support: false,
            renderer: RendererOptions::default(),
            normal_events: PointerEventType::default_normal_events(),
            gesture_events: parse_event_list("press tap pressup pan swipe"),
        }
    }
}
