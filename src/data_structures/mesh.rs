//! Vertex layout and decoded mesh streams.

use std::mem;

/// A single vertex as stored in the shared vertex arena.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Decoded vertex and index streams of one mesh.
///
/// Indices are local to `vertices`; the mesh table rebases them with the
/// draw's base vertex.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// A single triangle in the z = 0 plane facing +z.
    pub fn triangle() -> Self {
        let normal = [0.0, 0.0, 1.0];
        Self::new(
            vec![
                Vertex::new([-0.5, -0.5, 0.0], normal, [0.0, 1.0]),
                Vertex::new([0.5, -0.5, 0.0], normal, [1.0, 1.0]),
                Vertex::new([0.0, 0.5, 0.0], normal, [0.5, 0.0]),
            ],
            vec![0, 1, 2],
        )
    }

    /// A quad covering clip space, used by full-screen passes.
    pub fn screen_quad() -> Self {
        let normal = [0.0, 0.0, 1.0];
        Self::new(
            vec![
                Vertex::new([-1.0, -1.0, 0.0], normal, [0.0, 1.0]),
                Vertex::new([1.0, -1.0, 0.0], normal, [1.0, 1.0]),
                Vertex::new([1.0, 1.0, 0.0], normal, [1.0, 0.0]),
                Vertex::new([-1.0, 1.0, 0.0], normal, [0.0, 0.0]),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    /// An axis aligned unit cube centered at the origin.
    pub fn cube() -> Self {
        const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            // normal, u axis, v axis
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ];
        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (n, u, v) in FACES {
            let base = vertices.len() as u32;
            for (su, sv, uv) in [
                (-0.5, -0.5, [0.0, 1.0]),
                (0.5, -0.5, [1.0, 1.0]),
                (0.5, 0.5, [1.0, 0.0]),
                (-0.5, 0.5, [0.0, 0.0]),
            ] {
                let position = [
                    n[0] * 0.5 + u[0] * su + v[0] * sv,
                    n[1] * 0.5 + u[1] * su + v[1] * sv,
                    n[2] * 0.5 + u[2] * su + v[2] * sv,
                ];
                vertices.push(Vertex::new(position, n, uv));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        Self::new(vertices, indices)
    }
}

impl std::fmt::Display for MeshData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Mesh data: v {}, i {}",
            self.vertices.len(),
            self.indices.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_matches_stride() {
        assert_eq!(mem::size_of::<Vertex>(), 32);
        assert_eq!(Vertex::desc().array_stride, 32);
    }

    #[test]
    fn cube_indices_stay_in_range() {
        let cube = MeshData::cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        assert!(cube.indices.iter().all(|&i| (i as usize) < cube.vertices.len()));
    }
}
