use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;

use crate::coords::{Rgb, Vec2};

use super::{
    CameraHandle, MaterialHandle, NodeHandle, Projection, SceneHandle, ShaderMaterial, TargetHandle,
    TextureHandle,
};

/// One ray-cast hit. Lists of intersections are ordered nearest first.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Intersection {
    pub distance: f32,
    /// Node that was hit. With a recursive cast this may be a descendant of
    /// one of the candidates.
    pub node: NodeHandle,
    pub point: [f32; 3],
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum TextureFilter {
    Nearest,
    #[default]
    Linear,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum TextureFormat {
    Rgb,
    #[default]
    Rgba,
}

/// Offscreen target allocation parameters.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TargetParams {
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
    pub format: TextureFormat,
    pub stencil: bool,
}

impl TargetParams {
    /// Linear filtering, RGB, no stencil. Used for world offscreen buffers.
    pub const fn rgb() -> Self {
        Self {
            min_filter: TextureFilter::Linear,
            mag_filter: TextureFilter::Linear,
            format: TextureFormat::Rgb,
            stencil: false,
        }
    }

    /// Linear filtering, RGBA, no stencil. Used for composer buffers.
    pub const fn rgba() -> Self {
        Self {
            format: TextureFormat::Rgba,
            ..Self::rgb()
        }
    }
}

impl Default for TargetParams {
    fn default() -> Self {
        Self::rgba()
    }
}

/// Device-pixel rectangle, origin top-left.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Stencil comparison against a reference value.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StencilFunc {
    Equal(u32),
    NotEqual(u32),
}

/// Scene-graph and rendering collaborator.
///
/// Implemented by the embedding application on top of its GPU backend. All
/// calls happen on the frame thread; implementations never see concurrent use.
pub trait Renderer {
    // Scene graph.

    fn create_scene(&mut self) -> SceneHandle;

    /// Current top-level members of `scene`, in insertion order.
    fn scene_children(&self, scene: SceneHandle) -> Vec<NodeHandle>;

    fn create_camera(&mut self, projection: &Projection) -> CameraHandle;
    fn update_projection(&mut self, camera: CameraHandle, projection: &Projection);

    fn create_material(&mut self, material: &ShaderMaterial) -> MaterialHandle;
    fn update_material(&mut self, handle: MaterialHandle, material: &ShaderMaterial);

    /// Adds a `width × height` plane centered on the origin to `scene`.
    fn create_plane(&mut self, scene: SceneHandle, width: f32, height: f32, material: MaterialHandle) -> NodeHandle;

    fn override_material(&self, scene: SceneHandle) -> Option<MaterialHandle>;
    fn set_override_material(&mut self, scene: SceneHandle, material: Option<MaterialHandle>);

    /// Casts a ray from `camera` through `ndc` against `candidates`.
    ///
    /// Returns hits nearest first. With `recursive`, descendants of each
    /// candidate are tested too.
    fn raycast(&self, camera: CameraHandle, ndc: Vec2, candidates: &[NodeHandle], recursive: bool) -> Vec<Intersection>;

    // Targets and textures.

    fn create_render_target(&mut self, width: u32, height: u32, params: TargetParams) -> TargetHandle;

    /// Allocates a new target with the same size and parameters as `target`.
    fn clone_render_target(&mut self, target: TargetHandle) -> TargetHandle;
    fn resize_render_target(&mut self, target: TargetHandle, width: u32, height: u32);
    fn dispose_render_target(&mut self, target: TargetHandle);
    fn target_size(&self, target: TargetHandle) -> (u32, u32);

    /// Uploads a `width × height` RGB float texture (`rgb.len() == width * height * 3`).
    fn create_data_texture(&mut self, width: u32, height: u32, rgb: &[f32]) -> TextureHandle;

    // Output state.

    /// Size of the drawing buffer in device pixels.
    fn drawing_buffer_size(&self) -> (u32, u32);

    /// Sets the output size in logical pixels.
    fn set_size(&mut self, width: f32, height: f32);
    fn set_pixel_ratio(&mut self, ratio: f64);

    fn auto_clear(&self) -> bool;
    fn set_auto_clear(&mut self, auto_clear: bool);

    fn clear_color(&self) -> (Rgb, f32);
    fn set_clear_color(&mut self, color: Rgb, alpha: f32);
    fn clear_depth(&mut self);

    fn set_viewport(&mut self, rect: PixelRect);
    fn set_scissor(&mut self, rect: PixelRect);
    fn set_scissor_test(&mut self, enabled: bool);

    /// Draws `scene` through `camera` into `target`, or to the screen when
    /// `target` is `None`. With `force_clear` the destination is cleared first
    /// even if auto-clear is off.
    fn render(&mut self, scene: SceneHandle, camera: CameraHandle, target: Option<TargetHandle>, force_clear: bool) -> Result<()>;

    // Stencil. Backends without a stencil buffer keep the defaults.

    fn supports_stencil(&self) -> bool {
        false
    }

    fn set_stencil_func(&mut self, _func: StencilFunc) {}

    /// Writes `scene` as a stencil mask (value 1, or everything but the scene
    /// with `inverse`) into each of `targets`, then enables the stencil test.
    fn write_stencil_mask(
        &mut self,
        _scene: SceneHandle,
        _camera: CameraHandle,
        _targets: &[TargetHandle],
        _inverse: bool,
    ) -> Result<()> {
        Ok(())
    }

    fn clear_stencil_test(&mut self) {}
}

/// The collaborator as shared by every component of one app.
pub type SharedRenderer = Rc<RefCell<dyn Renderer>>;
