//! CPU-side geometry: vertex data for the demo shapes and ray tests against
//! them.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use nova_engine::coords::Vec2;
use nova_engine::gfx::Projection;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x2  // uv
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Shape {
    /// Facing +Z, centered on the node position.
    Plane { width: f32, height: f32 },
    Sphere { radius: f32 },
}

impl Shape {
    pub fn geometry(self) -> (Vec<Vertex>, Vec<u16>) {
        match self {
            Shape::Plane { width, height } => plane(width, height),
            Shape::Sphere { radius } => sphere(radius, 24, 16),
        }
    }

    /// Distance along `dir` from `origin` to the nearest surface point of
    /// this shape placed at `center`.
    pub fn intersect(self, center: Vec3, origin: Vec3, dir: Vec3) -> Option<f32> {
        match self {
            Shape::Plane { width, height } => {
                if dir.z.abs() < f32::EPSILON {
                    return None;
                }
                let t = (center.z - origin.z) / dir.z;
                if t < 0.0 {
                    return None;
                }
                let p = origin + dir * t;
                let inside = (p.x - center.x).abs() <= width / 2.0 && (p.y - center.y).abs() <= height / 2.0;
                inside.then_some(t)
            }
            Shape::Sphere { radius } => {
                let oc = origin - center;
                let b = oc.dot(dir);
                let c = oc.length_squared() - radius * radius;
                let disc = b * b - c;
                if disc < 0.0 {
                    return None;
                }
                let root = disc.sqrt();
                [-b - root, -b + root].into_iter().find(|t| *t >= 0.0)
            }
        }
    }
}

fn plane(width: f32, height: f32) -> (Vec<Vertex>, Vec<u16>) {
    let (hw, hh) = (width / 2.0, height / 2.0);
    let vertices = vec![
        Vertex { position: [-hw, -hh, 0.0], uv: [0.0, 1.0] },
        Vertex { position: [hw, -hh, 0.0], uv: [1.0, 1.0] },
        Vertex { position: [hw, hh, 0.0], uv: [1.0, 0.0] },
        Vertex { position: [-hw, hh, 0.0], uv: [0.0, 0.0] },
    ];
    (vertices, vec![0, 1, 2, 0, 2, 3])
}

fn sphere(radius: f32, segments: u16, rings: u16) -> (Vec<Vertex>, Vec<u16>) {
    let mut vertices = Vec::with_capacity(usize::from(segments + 1) * usize::from(rings + 1));
    for ring in 0..=rings {
        let v = f32::from(ring) / f32::from(rings);
        let theta = v * std::f32::consts::PI;
        for seg in 0..=segments {
            let u = f32::from(seg) / f32::from(segments);
            let phi = u * std::f32::consts::TAU;
            let dir = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
            vertices.push(Vertex { position: (dir * radius).to_array(), uv: [u, v] });
        }
    }

    let mut indices = Vec::with_capacity(usize::from(segments) * usize::from(rings) * 6);
    let stride = segments + 1;
    for ring in 0..rings {
        for seg in 0..segments {
            let a = ring * stride + seg;
            let b = a + stride;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }

    (vertices, indices)
}

/// Projection matrix for a camera sitting at the origin looking down -Z.
pub fn projection_matrix(projection: &Projection) -> Mat4 {
    match *projection {
        Projection::Perspective { fov, aspect, near, far } => {
            Mat4::perspective_rh(fov.to_radians(), aspect, near, far)
        }
        Projection::Orthographic { left, right, top, bottom, near, far } => {
            Mat4::orthographic_rh(left, right, bottom, top, near, far)
        }
        Projection::Other { .. } => Mat4::IDENTITY,
    }
}

/// World-space ray through `ndc`: origin on the near plane, unit direction.
pub fn ray(projection: &Projection, ndc: Vec2) -> (Vec3, Vec3) {
    let inverse = projection_matrix(projection).inverse();
    let near = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
    let far = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
    (near, (far - near).normalize_or_zero())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_ray_hits_sphere_front() {
        let projection = Projection::perspective(45.0, 1.0, 0.1, 100.0);
        let (origin, dir) = ray(&projection, Vec2::zero());
        let t = Shape::Sphere { radius: 1.0 }
            .intersect(Vec3::new(0.0, 0.0, -5.0), origin, dir)
            .unwrap();
        let hit = origin + dir * t;
        assert!((hit.z + 4.0).abs() < 1e-3);
    }

    #[test]
    fn edge_ray_misses_small_sphere() {
        let projection = Projection::perspective(45.0, 1.0, 0.1, 100.0);
        let (origin, dir) = ray(&projection, Vec2::new(0.9, 0.9));
        assert!(Shape::Sphere { radius: 0.5 }.intersect(Vec3::new(0.0, 0.0, -5.0), origin, dir).is_none());
    }

    #[test]
    fn orthographic_rays_are_parallel() {
        let projection = Projection::centered_orthographic(200.0, 100.0, -10.0, 10.0);
        let plane = Shape::Plane { width: 200.0, height: 100.0 };
        for ndc in [Vec2::new(-0.9, 0.9), Vec2::new(0.5, -0.5)] {
            let (origin, dir) = ray(&projection, ndc);
            assert!((dir - Vec3::NEG_Z).length() < 1e-5);
            assert!(plane.intersect(Vec3::ZERO, origin, dir).is_some());
        }
    }

    #[test]
    fn sphere_indices_stay_in_range() {
        let (vertices, indices) = Shape::Sphere { radius: 2.0 }.geometry();
        assert!(indices.iter().all(|&i| usize::from(i) < vertices.len()));
        assert_eq!(indices.len() % 3, 0);
    }
}
