//! Test doubles for the rendering collaborator and the host.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{Result, bail};

use crate::app::Host;
use crate::coords::{Rgb, Vec2, Viewport};
use crate::gfx::{
    CameraHandle, Intersection, MaterialHandle, NodeHandle, PixelRect, Projection, Renderer,
    SceneHandle, ShaderMaterial, StencilFunc, TargetHandle, TargetParams, TextureHandle,
};
use crate::input::{PointerEventType, parse_event_list};
use crate::world::Stage;

/// One recorded collaborator call. Queries are not recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateScene(SceneHandle),
    CreateCamera(CameraHandle),
    UpdateProjection(CameraHandle, Projection),
    CreateMaterial(MaterialHandle),
    UpdateMaterial(MaterialHandle),
    CreatePlane { scene: SceneHandle, width: f32, height: f32, material: MaterialHandle },
    SetOverrideMaterial(SceneHandle, Option<MaterialHandle>),
    CreateTarget { target: TargetHandle, width: u32, height: u32 },
    ResizeTarget { target: TargetHandle, width: u32, height: u32 },
    DisposeTarget(TargetHandle),
    CreateDataTexture { width: u32, height: u32, len: usize },
    SetSize(f32, f32),
    SetPixelRatio(f64),
    SetAutoClear(bool),
    SetClearColor(Rgb, f32),
    ClearDepth,
    SetViewport(PixelRect),
    SetScissor(PixelRect),
    SetScissorTest(bool),
    Render { scene: SceneHandle, camera: CameraHandle, target: Option<TargetHandle>, force_clear: bool },
    SetStencilFunc(StencilFunc),
    WriteStencilMask { scene: SceneHandle, inverse: bool },
    ClearStencilTest,
}

impl Call {
    /// Destination of a `Render` call.
    pub fn render_target(&self) -> Option<Option<TargetHandle>> {
        match self {
            Call::Render { target, .. } => Some(*target),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RaycastRecord {
    pub ndc: Vec2,
    pub candidates: Vec<NodeHandle>,
    pub recursive: bool,
}

/// In-memory collaborator recording every call.
pub struct RecordingRenderer {
    next_handle: u64,
    calls: Vec<Call>,
    drawing_size: (u32, u32),
    children: HashMap<SceneHandle, Vec<NodeHandle>>,
    targets: HashMap<TargetHandle, (u32, u32, TargetParams)>,
    overrides: HashMap<SceneHandle, MaterialHandle>,
    last_material: Option<ShaderMaterial>,
    auto_clear: bool,
    clear_color: (Rgb, f32),
    stencil: bool,
    fail_next_render: bool,
    scripted_hits: Vec<Intersection>,
    last_raycast: RefCell<Option<RaycastRecord>>,
}

impl RecordingRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            next_handle: 1,
            calls: Vec::new(),
            drawing_size: (width, height),
            children: HashMap::new(),
            targets: HashMap::new(),
            overrides: HashMap::new(),
            last_material: None,
            auto_clear: true,
            clear_color: (Rgb::BLACK, 1.0),
            stencil: false,
            fail_next_render: false,
            scripted_hits: Vec::new(),
            last_raycast: RefCell::new(None),
        }
    }

    fn handle(&mut self) -> u64 {
        let h = self.next_handle;
        self.next_handle += 1;
        h
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn renders(&self) -> Vec<Call> {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Render { .. }))
            .cloned()
            .collect()
    }

    /// Material as passed to the most recent `update_material`.
    pub fn last_material(&self) -> Option<ShaderMaterial> {
        self.last_material.clone()
    }

    /// `None` once the target is disposed.
    pub fn target_size_of(&self, target: TargetHandle) -> Option<(u32, u32)> {
        self.targets.get(&target).map(|&(w, h, _)| (w, h))
    }

    pub fn add_child(&mut self, scene: SceneHandle, node: NodeHandle) {
        self.children.entry(scene).or_default().push(node);
    }

    pub fn remove_child(&mut self, scene: SceneHandle, node: NodeHandle) {
        if let Some(children) = self.children.get_mut(&scene) {
            children.retain(|n| *n != node);
        }
    }

    /// Every subsequent cast returns `hits`, whatever the candidates.
    pub fn script_raycast(&mut self, hits: Vec<Intersection>) {
        self.scripted_hits = hits;
    }

    pub fn last_raycast(&self) -> Option<RaycastRecord> {
        self.last_raycast.borrow().clone()
    }

    pub fn fail_next_render(&mut self) {
        self.fail_next_render = true;
    }

    pub fn set_drawing_buffer_size(&mut self, width: u32, height: u32) {
        self.drawing_size = (width, height);
    }

    pub fn set_stencil_support(&mut self, on: bool) {
        self.stencil = on;
    }
}

impl Renderer for RecordingRenderer {
    fn create_scene(&mut self) -> SceneHandle {
        let scene = SceneHandle(self.handle());
        self.calls.push(Call::CreateScene(scene));
        scene
    }

    fn scene_children(&self, scene: SceneHandle) -> Vec<NodeHandle> {
        self.children.get(&scene).cloned().unwrap_or_default()
    }

    fn create_camera(&mut self, _projection: &Projection) -> CameraHandle {
        let camera = CameraHandle(self.handle());
        self.calls.push(Call::CreateCamera(camera));
        camera
    }

    fn update_projection(&mut self, camera: CameraHandle, projection: &Projection) {
        self.calls.push(Call::UpdateProjection(camera, projection.clone()));
    }

    fn create_material(&mut self, _material: &ShaderMaterial) -> MaterialHandle {
        let material = MaterialHandle(self.handle());
        self.calls.push(Call::CreateMaterial(material));
        material
    }

    fn update_material(&mut self, handle: MaterialHandle, material: &ShaderMaterial) {
        self.last_material = Some(material.clone());
        self.calls.push(Call::UpdateMaterial(handle));
    }

    fn create_plane(&mut self, scene: SceneHandle, width: f32, height: f32, material: MaterialHandle) -> NodeHandle {
        let node = NodeHandle(self.handle());
        self.add_child(scene, node);
        self.calls.push(Call::CreatePlane { scene, width, height, material });
        node
    }

    fn override_material(&self, scene: SceneHandle) -> Option<MaterialHandle> {
        self.overrides.get(&scene).copied()
    }

    fn set_override_material(&mut self, scene: SceneHandle, material: Option<MaterialHandle>) {
        match material {
            Some(m) => self.overrides.insert(scene, m),
            None => self.overrides.remove(&scene),
        };
        self.calls.push(Call::SetOverrideMaterial(scene, material));
    }

    fn raycast(&self, _camera: CameraHandle, ndc: Vec2, candidates: &[NodeHandle], recursive: bool) -> Vec<Intersection> {
        *self.last_raycast.borrow_mut() = Some(RaycastRecord {
            ndc,
            candidates: candidates.to_vec(),
            recursive,
        });
        self.scripted_hits.clone()
    }

    fn create_render_target(&mut self, width: u32, height: u32, params: TargetParams) -> TargetHandle {
        let target = TargetHandle(self.handle());
        self.targets.insert(target, (width, height, params));
        self.calls.push(Call::CreateTarget { target, width, height });
        target
    }

    fn clone_render_target(&mut self, target: TargetHandle) -> TargetHandle {
        let (width, height, params) = self
            .targets
            .get(&target)
            .copied()
            .unwrap_or((0, 0, TargetParams::default()));
        self.create_render_target(width, height, params)
    }

    fn resize_render_target(&mut self, target: TargetHandle, width: u32, height: u32) {
        if let Some(entry) = self.targets.get_mut(&target) {
            entry.0 = width;
            entry.1 = height;
        }
        self.calls.push(Call::ResizeTarget { target, width, height });
    }

    fn dispose_render_target(&mut self, target: TargetHandle) {
        self.targets.remove(&target);
        self.calls.push(Call::DisposeTarget(target));
    }

    fn target_size(&self, target: TargetHandle) -> (u32, u32) {
        self.target_size_of(target).unwrap_or((0, 0))
    }

    fn create_data_texture(&mut self, width: u32, height: u32, rgb: &[f32]) -> TextureHandle {
        self.calls.push(Call::CreateDataTexture { width, height, len: rgb.len() });
        TextureHandle(self.handle())
    }

    fn drawing_buffer_size(&self) -> (u32, u32) {
        self.drawing_size
    }

    fn set_size(&mut self, width: f32, height: f32) {
        self.calls.push(Call::SetSize(width, height));
    }

    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.calls.push(Call::SetPixelRatio(ratio));
    }

    fn auto_clear(&self) -> bool {
        self.auto_clear
    }

    fn set_auto_clear(&mut self, auto_clear: bool) {
        self.auto_clear = auto_clear;
        self.calls.push(Call::SetAutoClear(auto_clear));
    }

    fn clear_color(&self) -> (Rgb, f32) {
        self.clear_color
    }

    fn set_clear_color(&mut self, color: Rgb, alpha: f32) {
        self.clear_color = (color, alpha);
        self.calls.push(Call::SetClearColor(color, alpha));
    }

    fn clear_depth(&mut self) {
        self.calls.push(Call::ClearDepth);
    }

    fn set_viewport(&mut self, rect: PixelRect) {
        self.calls.push(Call::SetViewport(rect));
    }

    fn set_scissor(&mut self, rect: PixelRect) {
        self.calls.push(Call::SetScissor(rect));
    }

    fn set_scissor_test(&mut self, enabled: bool) {
        self.calls.push(Call::SetScissorTest(enabled));
    }

    fn render(&mut self, scene: SceneHandle, camera: CameraHandle, target: Option<TargetHandle>, force_clear: bool) -> Result<()> {
        if std::mem::take(&mut self.fail_next_render) {
            bail!("scripted render failure");
        }
        self.calls.push(Call::Render { scene, camera, target, force_clear });
        Ok(())
    }

    fn supports_stencil(&self) -> bool {
        self.stencil
    }

    fn set_stencil_func(&mut self, func: StencilFunc) {
        self.calls.push(Call::SetStencilFunc(func));
    }

    fn write_stencil_mask(
        &mut self,
        scene: SceneHandle,
        _camera: CameraHandle,
        _targets: &[TargetHandle],
        inverse: bool,
    ) -> Result<()> {
        self.calls.push(Call::WriteStencilMask { scene, inverse });
        Ok(())
    }

    fn clear_stencil_test(&mut self) {
        self.calls.push(Call::ClearStencilTest);
    }
}

/// A stage over a fresh [`RecordingRenderer`] with the default event lists.
pub fn recording_stage(width: f32, height: f32) -> (Rc<RefCell<RecordingRenderer>>, Stage) {
    let renderer = Rc::new(RefCell::new(RecordingRenderer::new(width as u32, height as u32)));
    let stage = Stage::new(
        renderer.clone(),
        Viewport::new(width, height),
        PointerEventType::default_normal_events(),
        parse_event_list("press tap pressup pan swipe"),
    );
    (renderer, stage)
}

/// Host whose frame requests are only counted.
#[derive(Clone)]
pub struct ManualHost {
    pub viewport: Rc<Cell<Viewport>>,
    pub pixel_ratio: Rc<Cell<f64>>,
    pub frame_requests: Rc<Cell<u32>>,
    pub attached: Rc<Cell<u32>>,
    pub fullscreen: Rc<Cell<bool>>,
}

impl ManualHost {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            viewport: Rc::new(Cell::new(Viewport::new(width, height))),
            pixel_ratio: Rc::new(Cell::new(1.0)),
            frame_requests: Rc::new(Cell::new(0)),
            attached: Rc::new(Cell::new(0)),
            fullscreen: Rc::new(Cell::new(false)),
        }
    }
}

impl Host for ManualHost {
    fn attach(&mut self) {
        self.attached.set(self.attached.get() + 1);
    }

    fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio.get()
    }

    fn request_frame(&mut self) {
        self.frame_requests.set(self.frame_requests.get() + 1);
    }

    fn set_fullscreen(&mut self, on: bool) -> bool {
        self.fullscreen.set(on);
        true
    }
}
