use std::collections::HashMap;

use anyhow::Result;
use glam::{Mat4, Vec3};
use nova_engine::coords::{Rgb, Vec2};
use nova_engine::gfx::{
    CameraHandle, Intersection, MaterialHandle, NodeHandle, PixelRect, Projection, Renderer,
    SceneHandle, ShaderMaterial, TargetHandle, TargetParams, TextureFilter, TextureHandle,
    TextureSource, Uniform,
};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::gpu::Gpu;
use crate::layout::MaterialLayout;
use crate::mesh::{self, Shape, Vertex};

const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

struct Node {
    shape: Shape,
    position: Vec3,
    material: MaterialHandle,
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
    transform: wgpu::Buffer,
    transform_group: wgpu::BindGroup,
}

struct Material {
    desc: ShaderMaterial,
    layout: MaterialLayout,
    shader: wgpu::ShaderModule,
    bind_layout: wgpu::BindGroupLayout,
    params: Option<wgpu::Buffer>,
    pipelines: HashMap<wgpu::TextureFormat, wgpu::RenderPipeline>,
}

struct Target {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
    params: TargetParams,
}

struct Frame {
    texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

/// Reference collaborator: a flat in-memory scene graph drawn with wgpu.
///
/// Every `render` call records and submits its own encoder. Screen draws go to
/// the current surface texture, acquired on first use and shown by
/// [`present`](Self::present). No stencil buffer; mask passes are skipped by
/// the composer.
pub struct DemoRenderer {
    gpu: Gpu,
    next_handle: u64,
    logical_size: (f32, f32),
    pixel_ratio: f64,

    scenes: HashMap<SceneHandle, Vec<NodeHandle>>,
    nodes: HashMap<NodeHandle, Node>,
    cameras: HashMap<CameraHandle, Projection>,
    materials: HashMap<MaterialHandle, Material>,
    overrides: HashMap<SceneHandle, MaterialHandle>,
    targets: HashMap<TargetHandle, Target>,
    textures: HashMap<TextureHandle, wgpu::TextureView>,

    transform_layout: wgpu::BindGroupLayout,
    linear: wgpu::Sampler,
    nearest: wgpu::Sampler,
    fallback: wgpu::TextureView,

    auto_clear: bool,
    clear: (Rgb, f32),
    viewport: Option<PixelRect>,
    scissor: PixelRect,
    scissor_test: bool,

    frame: Option<Frame>,
}

impl DemoRenderer {
    pub fn new(gpu: Gpu, pixel_ratio: f64) -> Self {
        let device = gpu.device();

        let transform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("nova transform bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let sampler = |filter: wgpu::FilterMode| {
            device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("nova sampler"),
                mag_filter: filter,
                min_filter: filter,
                ..Default::default()
            })
        };
        let linear = sampler(wgpu::FilterMode::Linear);
        let nearest = sampler(wgpu::FilterMode::Nearest);

        let fallback = upload_rgba8(&gpu, 1, 1, &[255, 255, 255, 255], "nova fallback texture");

        let size = gpu.size();
        let logical_size = (
            (f64::from(size.width) / pixel_ratio) as f32,
            (f64::from(size.height) / pixel_ratio) as f32,
        );

        Self {
            gpu,
            next_handle: 1,
            logical_size,
            pixel_ratio,
            scenes: HashMap::new(),
            nodes: HashMap::new(),
            cameras: HashMap::new(),
            materials: HashMap::new(),
            overrides: HashMap::new(),
            targets: HashMap::new(),
            textures: HashMap::new(),
            transform_layout,
            linear,
            nearest,
            fallback,
            auto_clear: true,
            clear: (Rgb::BLACK, 1.0),
            viewport: None,
            scissor: PixelRect::default(),
            scissor_test: false,
            frame: None,
        }
    }

    fn handle(&mut self) -> u64 {
        let h = self.next_handle;
        self.next_handle += 1;
        h
    }

    /// Adds a sphere centered on the origin to `scene`.
    pub fn create_sphere(&mut self, scene: SceneHandle, radius: f32, material: MaterialHandle) -> NodeHandle {
        self.add_node(scene, Shape::Sphere { radius }, material)
    }

    pub fn set_position(&mut self, node: NodeHandle, position: Vec3) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.position = position;
        }
    }

    pub fn position(&self, node: NodeHandle) -> Option<Vec3> {
        self.nodes.get(&node).map(|n| n.position)
    }

    /// Shows the surface texture drawn this frame, if any.
    pub fn present(&mut self) {
        if let Some(frame) = self.frame.take() {
            frame.texture.present();
        }
    }

    fn add_node(&mut self, scene: SceneHandle, shape: Shape, material: MaterialHandle) -> NodeHandle {
        let node = NodeHandle(self.handle());
        let device = self.gpu.device();

        let (vertices, indices) = shape.geometry();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("nova node vbo"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("nova node ibo"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let transform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("nova node transform"),
            size: std::mem::size_of::<[f32; 16]>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let transform_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("nova node transform group"),
            layout: &self.transform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform.as_entire_binding(),
            }],
        });

        self.nodes.insert(
            node,
            Node {
                shape,
                position: Vec3::ZERO,
                material,
                vertices: vertex_buffer,
                indices: index_buffer,
                index_count: indices.len() as u32,
                transform,
                transform_group,
            },
        );
        self.scenes.entry(scene).or_default().push(node);
        node
    }

    fn ensure_pipeline(&mut self, material: MaterialHandle, format: wgpu::TextureFormat) {
        let device = self.gpu.device();
        let transform_layout = &self.transform_layout;
        let Some(m) = self.materials.get_mut(&material) else { return };

        if m.pipelines.contains_key(&format) {
            return;
        }

        let pipeline = {
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(m.desc.label),
                bind_group_layouts: &[&m.bind_layout, transform_layout],
                immediate_size: 0,
            });

            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(m.desc.label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &m.shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[Vertex::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &m.shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };
        m.pipelines.insert(format, pipeline);
    }

    fn material_group(&self, material: &Material) -> wgpu::BindGroup {
        let mut entries = Vec::new();

        if let Some(params) = &material.params {
            entries.push(wgpu::BindGroupEntry {
                binding: 0,
                resource: params.as_entire_binding(),
            });
        }

        for slot in &material.layout.textures {
            let source = match material.desc.uniform(&slot.name) {
                Some(Uniform::Texture(source)) => *source,
                _ => None,
            };
            let (view, sampler) = self.texture_binding(source);
            entries.push(wgpu::BindGroupEntry {
                binding: slot.binding,
                resource: wgpu::BindingResource::TextureView(view),
            });
            entries.push(wgpu::BindGroupEntry {
                binding: slot.binding + 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            });
        }

        self.gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(material.desc.label),
            layout: &material.bind_layout,
            entries: &entries,
        })
    }

    fn texture_binding(&self, source: Option<TextureSource>) -> (&wgpu::TextureView, &wgpu::Sampler) {
        match source {
            Some(TextureSource::Target(handle)) => match self.targets.get(&handle) {
                Some(t) if t.params.min_filter == TextureFilter::Nearest => (&t.view, &self.nearest),
                Some(t) => (&t.view, &self.linear),
                None => (&self.fallback, &self.linear),
            },
            Some(TextureSource::Texture(handle)) => {
                (self.textures.get(&handle).unwrap_or(&self.fallback), &self.linear)
            }
            None => (&self.fallback, &self.linear),
        }
    }

    fn physical_size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(
            (f64::from(self.logical_size.0) * self.pixel_ratio).round().max(0.0) as u32,
            (f64::from(self.logical_size.1) * self.pixel_ratio).round().max(0.0) as u32,
        )
    }
}

impl Renderer for DemoRenderer {
    fn create_scene(&mut self) -> SceneHandle {
        let scene = SceneHandle(self.handle());
        self.scenes.insert(scene, Vec::new());
        scene
    }

    fn scene_children(&self, scene: SceneHandle) -> Vec<NodeHandle> {
        self.scenes.get(&scene).cloned().unwrap_or_default()
    }

    fn create_camera(&mut self, projection: &Projection) -> CameraHandle {
        let camera = CameraHandle(self.handle());
        self.cameras.insert(camera, projection.clone());
        camera
    }

    fn update_projection(&mut self, camera: CameraHandle, projection: &Projection) {
        self.cameras.insert(camera, projection.clone());
    }

    fn create_material(&mut self, material: &ShaderMaterial) -> MaterialHandle {
        let handle = MaterialHandle(self.handle());
        let device = self.gpu.device();

        let mut source = String::new();
        for (name, value) in &material.defines {
            source.push_str(&format!("const {name} = {value};\n"));
        }
        source.push_str(&material.source);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(material.label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let layout = MaterialLayout::parse(&material.source);

        let mut entries = Vec::new();
        if layout.params_size > 0 {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            });
        }
        for slot in &layout.textures {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: slot.binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            });
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: slot.binding + 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            });
        }

        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(material.label),
            entries: &entries,
        });

        let params = (layout.params_size > 0).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(material.label),
                contents: &layout.pack(material),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
        });

        self.materials.insert(
            handle,
            Material {
                desc: material.clone(),
                layout,
                shader,
                bind_layout,
                params,
                pipelines: HashMap::new(),
            },
        );
        handle
    }

    fn update_material(&mut self, handle: MaterialHandle, material: &ShaderMaterial) {
        let Some(m) = self.materials.get_mut(&handle) else { return };
        if let Some(params) = &m.params {
            self.gpu.queue().write_buffer(params, 0, &m.layout.pack(material));
        }
        m.desc = material.clone();
    }

    fn create_plane(&mut self, scene: SceneHandle, width: f32, height: f32, material: MaterialHandle) -> NodeHandle {
        self.add_node(scene, Shape::Plane { width, height }, material)
    }

    fn override_material(&self, scene: SceneHandle) -> Option<MaterialHandle> {
        self.overrides.get(&scene).copied()
    }

    fn set_override_material(&mut self, scene: SceneHandle, material: Option<MaterialHandle>) {
        match material {
            Some(m) => self.overrides.insert(scene, m),
            None => self.overrides.remove(&scene),
        };
    }

    fn raycast(&self, camera: CameraHandle, ndc: Vec2, candidates: &[NodeHandle], _recursive: bool) -> Vec<Intersection> {
        let Some(projection) = self.cameras.get(&camera) else {
            return Vec::new();
        };
        let (origin, dir) = mesh::ray(projection, ndc);

        let mut hits: Vec<Intersection> = candidates
            .iter()
            .filter_map(|handle| {
                let node = self.nodes.get(handle)?;
                let distance = node.shape.intersect(node.position, origin, dir)?;
                Some(Intersection {
                    distance,
                    node: *handle,
                    point: (origin + dir * distance).to_array(),
                })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn create_render_target(&mut self, width: u32, height: u32, params: TargetParams) -> TargetHandle {
        let handle = TargetHandle(self.handle());
        let (texture, view) = target_texture(&self.gpu, width, height);
        self.targets.insert(handle, Target { texture, view, width, height, params });
        handle
    }

    fn clone_render_target(&mut self, target: TargetHandle) -> TargetHandle {
        let (width, height, params) = self
            .targets
            .get(&target)
            .map(|t| (t.width, t.height, t.params))
            .unwrap_or((1, 1, TargetParams::default()));
        self.create_render_target(width, height, params)
    }

    fn resize_render_target(&mut self, target: TargetHandle, width: u32, height: u32) {
        let (texture, view) = target_texture(&self.gpu, width, height);
        if let Some(t) = self.targets.get_mut(&target) {
            t.texture.destroy();
            *t = Target { texture, view, width, height, params: t.params };
        }
    }

    fn dispose_render_target(&mut self, target: TargetHandle) {
        if let Some(t) = self.targets.remove(&target) {
            t.texture.destroy();
        }
    }

    fn target_size(&self, target: TargetHandle) -> (u32, u32) {
        self.targets.get(&target).map_or((0, 0), |t| (t.width, t.height))
    }

    fn create_data_texture(&mut self, width: u32, height: u32, rgb: &[f32]) -> TextureHandle {
        let handle = TextureHandle(self.handle());
        let rgba: Vec<u8> = rgb
            .chunks_exact(3)
            .flat_map(|c| {
                let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
                [to_u8(c[0]), to_u8(c[1]), to_u8(c[2]), 255]
            })
            .collect();
        let view = upload_rgba8(&self.gpu, width, height, &rgba, "nova data texture");
        self.textures.insert(handle, view);
        handle
    }

    fn drawing_buffer_size(&self) -> (u32, u32) {
        let size = self.gpu.size();
        (size.width, size.height)
    }

    fn set_size(&mut self, width: f32, height: f32) {
        self.logical_size = (width, height);
        let size = self.physical_size();
        self.gpu.resize(size);
    }

    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
        let size = self.physical_size();
        self.gpu.resize(size);
    }

    fn auto_clear(&self) -> bool {
        self.auto_clear
    }

    fn set_auto_clear(&mut self, auto_clear: bool) {
        self.auto_clear = auto_clear;
    }

    fn clear_color(&self) -> (Rgb, f32) {
        self.clear
    }

    fn set_clear_color(&mut self, color: Rgb, alpha: f32) {
        self.clear = (color, alpha);
    }

    fn clear_depth(&mut self) {}

    fn set_viewport(&mut self, rect: PixelRect) {
        self.viewport = Some(rect);
    }

    fn set_scissor(&mut self, rect: PixelRect) {
        self.scissor = rect;
    }

    fn set_scissor_test(&mut self, enabled: bool) {
        self.scissor_test = enabled;
    }

    fn render(&mut self, scene: SceneHandle, camera: CameraHandle, target: Option<TargetHandle>, force_clear: bool) -> Result<()> {
        let (format, size) = match target {
            Some(t) => match self.targets.get(&t) {
                Some(t) => (TARGET_FORMAT, (t.width, t.height)),
                None => return Ok(()),
            },
            None => {
                if self.frame.is_none() {
                    let Some(texture) = self.gpu.acquire()? else {
                        return Ok(());
                    };
                    let view = texture.texture.create_view(&wgpu::TextureViewDescriptor::default());
                    self.frame = Some(Frame { texture, view });
                }
                (self.gpu.surface_format(), self.drawing_buffer_size())
            }
        };

        let projection = self
            .cameras
            .get(&camera)
            .map(mesh::projection_matrix)
            .unwrap_or(Mat4::IDENTITY);
        let override_material = self.overrides.get(&scene).copied();

        let mut draws: Vec<(NodeHandle, MaterialHandle)> = self
            .scenes
            .get(&scene)
            .into_iter()
            .flatten()
            .filter_map(|h| self.nodes.get(h).map(|n| (*h, override_material.unwrap_or(n.material))))
            .collect();
        // Painter's order: farthest first.
        draws.sort_by(|a, b| {
            let z = |h: &NodeHandle| self.nodes.get(h).map_or(0.0, |n| n.position.z);
            z(&a.0).total_cmp(&z(&b.0))
        });

        for (_, material) in &draws {
            self.ensure_pipeline(*material, format);
        }

        let mut groups = Vec::with_capacity(draws.len());
        for (node, material) in &draws {
            let (Some(n), Some(m)) = (self.nodes.get(node), self.materials.get(material)) else { continue };
            let transform = projection * Mat4::from_translation(n.position);
            self.gpu
                .queue()
                .write_buffer(&n.transform, 0, bytemuck::cast_slice(&transform.to_cols_array()));
            groups.push((n, m, self.material_group(m)));
        }

        let view = match target {
            Some(t) => self.targets.get(&t).map(|t| &t.view),
            None => self.frame.as_ref().map(|f| &f.view),
        };
        let Some(view) = view else { return Ok(()) };

        let load = if force_clear || self.auto_clear {
            let ([r, g, b], a) = (self.clear.0.to_f32(), self.clear.1);
            wgpu::LoadOp::Clear(wgpu::Color {
                r: f64::from(r),
                g: f64::from(g),
                b: f64::from(b),
                a: f64::from(a),
            })
        } else {
            wgpu::LoadOp::Load
        };

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("nova render encoder") });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("nova render pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations { load, store: wgpu::StoreOp::Store },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if target.is_none() {
                if let Some(vp) = self.viewport {
                    let (x, y, w, h) = clamp_rect(vp, size);
                    if w > 0 && h > 0 {
                        rpass.set_viewport(x as f32, y as f32, w as f32, h as f32, 0.0, 1.0);
                    }
                }
                if self.scissor_test {
                    let (x, y, w, h) = clamp_rect(self.scissor, size);
                    rpass.set_scissor_rect(x, y, w, h);
                }
            }

            for (node, material, group) in &groups {
                let Some(pipeline) = material.pipelines.get(&format) else { continue };
                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, group, &[]);
                rpass.set_bind_group(1, &node.transform_group, &[]);
                rpass.set_vertex_buffer(0, node.vertices.slice(..));
                rpass.set_index_buffer(node.indices.slice(..), wgpu::IndexFormat::Uint16);
                rpass.draw_indexed(0..node.index_count, 0, 0..1);
            }
        }

        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}

fn clamp_rect(rect: PixelRect, (width, height): (u32, u32)) -> (u32, u32, u32, u32) {
    let x = rect.x.min(width);
    let y = rect.y.min(height);
    (x, y, rect.width.min(width - x), rect.height.min(height - y))
}

fn target_texture(gpu: &Gpu, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
        label: Some("nova render target"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

fn upload_rgba8(gpu: &Gpu, width: u32, height: u32, rgba: &[u8], label: &str) -> wgpu::TextureView {
    let size = wgpu::Extent3d {
        width: width.max(1),
        height: height.max(1),
        depth_or_array_layers: 1,
    };
    let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    gpu.queue().write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * size.width),
            rows_per_image: Some(size.height),
        },
        size,
    );

    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
