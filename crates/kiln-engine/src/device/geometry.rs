//! CPU-side geometry assembly for one batch.
//!
//! Every batch is uploaded as a single vertex buffer plus a single `u32` index
//! buffer, so the backend issues exactly one indexed draw per batch.

use bytemuck::{Pod, Zeroable};
use glam::Vec4;

use crate::batch::Batch;
use crate::submit::{DrawKind, DrawRequest};

/// Index value that restarts strip primitives.
pub(crate) const STRIP_RESTART: u32 = u32::MAX;

/// Vertex as seen by shaders: clip-space position and color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct GpuVertex {
    pub position: [f32; 4],
    pub color: [f32; 4],
}

impl GpuVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x4, // position
        1 => Float32x4  // color
    ];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }

    #[inline]
    fn new(position: Vec4, color: Vec4) -> Self {
        Self {
            position: position.to_array(),
            color: color.to_array(),
        }
    }
}

/// Full-target quad in clip space.
const QUAD_CORNERS: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

#[derive(Debug, Default)]
pub(crate) struct Geometry {
    pub vertices: Vec<GpuVertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Builds the vertex and index data for `batch`.
///
/// With `strips` set, mesh index runs are separated by [`STRIP_RESTART`] so
/// consecutive meshes do not join into one strip.
pub(crate) fn build_geometry(batch: &Batch, strips: bool) -> Geometry {
    let mut g = Geometry::default();

    match batch.kind {
        DrawKind::Quad => {
            for _ in batch.quads() {
                let base = g.vertices.len() as u32;
                g.vertices.extend(
                    QUAD_CORNERS
                        .iter()
                        .map(|[x, y]| GpuVertex::new(Vec4::new(*x, *y, 0.0, 1.0), Vec4::ONE)),
                );
                g.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
            }
        }
        DrawKind::Line => {
            for line in batch.lines() {
                let base = g.vertices.len() as u32;
                g.vertices.push(GpuVertex::new(line.from.extend(1.0), line.color));
                g.vertices.push(GpuVertex::new(line.to.extend(1.0), line.color));
                g.indices.extend([base, base + 1]);
            }
        }
        DrawKind::Mesh => {
            let (vertices, indices) = batch.meshes().fold((0, 0), |(v, i), m| {
                (v + m.mesh.vertices().len(), i + m.mesh.element_count() + 1)
            });
            g.vertices.reserve(vertices);
            g.indices.reserve(indices);

            for (n, request) in batch.meshes().enumerate() {
                if strips && n > 0 {
                    g.indices.push(STRIP_RESTART);
                }

                let base = g.vertices.len() as u32;
                let mesh = &request.mesh;
                g.vertices.extend(mesh.vertices().iter().map(|v| {
                    let p = request.transform * glam::Vec3::from(v.position).extend(1.0);
                    GpuVertex::new(p, Vec4::from(v.color))
                }));

                if mesh.indices().is_empty() {
                    g.indices.extend(base..base + mesh.vertices().len() as u32);
                } else {
                    g.indices.extend(mesh.indices().iter().map(|i| base + i));
                }
            }
        }
    }

    debug_assert!(
        batch.requests.iter().all(|r| matches!(
            (r, batch.kind),
            (DrawRequest::Quad(_), DrawKind::Quad)
                | (DrawRequest::Line(_), DrawKind::Line)
                | (DrawRequest::Mesh(_), DrawKind::Mesh)
        )),
        "batch holds requests of a different kind"
    );

    g
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::{Mat4, Vec3};

    use super::*;
    use crate::batch::BatchId;
    use crate::pipeline::PipelineDescriptor;
    use crate::resource::{HandleTable, Mesh, MeshVertex, Shader};
    use crate::submit::{LineRequest, MeshRequest, QuadRequest};

    fn batch(kind: DrawKind, requests: Vec<DrawRequest>) -> Batch {
        Batch {
            id: BatchId::new(0),
            kind,
            descriptor: PipelineDescriptor::new(),
            requests,
        }
    }

    fn triangle(indexed: bool) -> Arc<Mesh> {
        let v = vec![
            MeshVertex::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0, 1.0]),
            MeshVertex::new([1.0, 0.0, 0.0], [0.0, 1.0, 0.0, 1.0]),
            MeshVertex::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0, 1.0]),
        ];
        let i = if indexed { vec![2, 1, 0] } else { Vec::new() };
        Mesh::new("tri", v, i)
    }

    #[test]
    fn quads_cover_the_target() {
        let mut table = HandleTable::new();
        let s = Shader::from_wgsl("s", "");
        let b = batch(
            DrawKind::Quad,
            vec![
                DrawRequest::Quad(QuadRequest { shader: table.acquire(&s) }),
                DrawRequest::Quad(QuadRequest { shader: table.acquire(&s) }),
            ],
        );

        let g = build_geometry(&b, false);
        assert_eq!(g.vertices.len(), 8);
        assert_eq!(&g.indices[6..], &[4, 5, 6, 4, 6, 7]);
        assert_eq!(g.vertices[0].position, [-1.0, -1.0, 0.0, 1.0]);
    }

    #[test]
    fn lines_emit_two_vertices_each() {
        let color = Vec4::new(1.0, 0.0, 0.0, 1.0);
        let b = batch(
            DrawKind::Line,
            vec![
                DrawRequest::Line(LineRequest::new(Vec3::ZERO, Vec3::X).with_color(color)),
                DrawRequest::Line(LineRequest::new(Vec3::Y, Vec3::Z).with_color(color)),
            ],
        );

        let g = build_geometry(&b, false);
        assert_eq!(g.indices, vec![0, 1, 2, 3]);
        assert_eq!(g.vertices[3].position, [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(g.vertices[3].color, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn meshes_are_transformed_and_offset() {
        let mut table = HandleTable::new();
        let indexed = triangle(true);
        let plain = triangle(false);
        let b = batch(
            DrawKind::Mesh,
            vec![
                DrawRequest::Mesh(MeshRequest {
                    mesh: table.acquire(&indexed),
                    transform: Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)),
                    shader: None,
                }),
                DrawRequest::Mesh(MeshRequest {
                    mesh: table.acquire(&plain),
                    transform: Mat4::IDENTITY,
                    shader: None,
                }),
            ],
        );

        let g = build_geometry(&b, false);
        assert_eq!(g.indices, vec![2, 1, 0, 3, 4, 5]);
        assert_eq!(g.vertices[1].position, [3.0, 0.0, 0.0, 1.0]);
        assert_eq!(g.vertices[3].position, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn strips_are_separated_by_restart() {
        let mut table = HandleTable::new();
        let m = triangle(false);
        let b = batch(
            DrawKind::Mesh,
            vec![
                DrawRequest::Mesh(MeshRequest {
                    mesh: table.acquire(&m),
                    transform: Mat4::IDENTITY,
                    shader: None,
                }),
                DrawRequest::Mesh(MeshRequest {
                    mesh: table.acquire(&m),
                    transform: Mat4::IDENTITY,
                    shader: None,
                }),
            ],
        );

        let g = build_geometry(&b, true);
        assert_eq!(g.indices, vec![0, 1, 2, STRIP_RESTART, 3, 4, 5]);
    }

    #[test]
    fn empty_batch_has_no_geometry() {
        assert!(build_geometry(&batch(DrawKind::Line, Vec::new()), false).is_empty());
    }
}
