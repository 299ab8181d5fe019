use std::f32::consts::{PI, TAU};

use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::types::Vertex;

/// Triangle list on the CPU side, ready for upload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// UV sphere centred on the origin.
    ///
    /// `segments` vertices around the equator and `segments / 2` rings from
    /// pole to pole. Texture v is 0 at the south pole. Triangles wind
    /// counter-clockwise seen from outside.
    pub fn sphere(radius: f32, segments: u32) -> Self {
        let sectors = segments.max(3);
        let rings = (segments / 2).max(2);

        let mut vertices = Vec::with_capacity(((rings + 1) * (sectors + 1)) as usize);
        for i in 0..=rings {
            let theta = PI * i as f32 / rings as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();
            // The seam column is duplicated so u can run from 0 to 1.
            for j in 0..=sectors {
                let phi = TAU * j as f32 / sectors as f32;
                let (sin_phi, cos_phi) = phi.sin_cos();
                let normal = Vec3::new(sin_theta * sin_phi, cos_theta, sin_theta * cos_phi);
                vertices.push(Vertex::new(
                    (normal * radius).to_array(),
                    normal.to_array(),
                    [j as f32 / sectors as f32, 1.0 - i as f32 / rings as f32],
                ));
            }
        }

        let row = sectors + 1;
        let mut indices = Vec::with_capacity((rings * sectors * 6) as usize);
        for i in 0..rings {
            for j in 0..sectors {
                let a = i * row + j;
                let b = a + row;
                let c = b + 1;
                let d = a + 1;
                // Skip the zero-area halves of the quads that touch a pole.
                if i != 0 {
                    indices.extend_from_slice(&[a, c, d]);
                }
                if i != rings - 1 {
                    indices.extend_from_slice(&[a, b, c]);
                }
            }
        }

        Self { vertices, indices }
    }

    /// Axis-aligned box centred on the origin with side lengths `dx`, `dy`, `dz`.
    ///
    /// Four vertices per face so every face carries its own normal and the
    /// full [0, 1] texture square.
    pub fn cuboid(dx: f32, dy: f32, dz: f32) -> Self {
        let half = Vec3::new(dx, dy, dz) * 0.5;
        // (normal, u axis, v axis) with u x v == normal
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];
        let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, u, v) in faces {
            let base = vertices.len() as u32;
            for (su, sv) in corners {
                let position = (normal + u * su + v * sv) * half;
                vertices.push(Vertex::new(
                    position.to_array(),
                    normal.to_array(),
                    [(su + 1.0) * 0.5, (sv + 1.0) * 0.5],
                ));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self { vertices, indices }
    }

    /// Replace every normal with the area-weighted average of the faces that
    /// share the vertex.
    pub fn compute_smooth_normals(&mut self) {
        let mut sums = vec![Vec3::ZERO; self.vertices.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let pa = Vec3::from_array(self.vertices[a].position);
            let pb = Vec3::from_array(self.vertices[b].position);
            let pc = Vec3::from_array(self.vertices[c].position);
            // Unnormalised cross product: longer for larger triangles.
            let face = (pb - pa).cross(pc - pa);
            sums[a] += face;
            sums[b] += face;
            sums[c] += face;
        }
        for (vertex, sum) in self.vertices.iter_mut().zip(sums) {
            vertex.normal = sum.normalize_or_zero().to_array();
        }
    }
}

/// Drawable: a device-resident vertex/index buffer pair
///
/// Buffers are released when the mesh is dropped.
pub struct Mesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl Mesh {
    pub fn upload(device: &wgpu::Device, data: &MeshData, label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertices", label)),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Indices", label)),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::debug!(
            "Uploaded mesh '{}': {} vertices, {} triangles",
            label,
            data.vertices.len(),
            data.triangle_count()
        );

        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
        }
    }

    /// Issue the indexed draw for this buffer pair
    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}
