use core::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytemuck::{Pod, Zeroable};

use super::id::{ResourceId, SharedResource};
use super::shader::Shader;

/// Vertex format shared by meshes, quads and lines.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl MeshVertex {
    #[inline]
    pub const fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }
}

/// Opaque mesh resource: vertex data, optional index data and an optional
/// bound shader used when the mesh is submitted without an override.
pub struct Mesh {
    id: ResourceId,
    label: String,
    vertices: Vec<MeshVertex>,
    indices: Vec<u32>,
    shader: Option<Arc<Shader>>,
    retired: AtomicBool,
}

impl Mesh {
    /// Creates a mesh with no bound shader.
    ///
    /// An empty `indices` buffer means the vertices are drawn in order.
    pub fn new(label: impl Into<String>, vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Arc<Self> {
        Arc::new(Self::build(label.into(), vertices, indices, None))
    }

    /// Creates a mesh bound to `shader`.
    pub fn with_shader(
        label: impl Into<String>,
        vertices: Vec<MeshVertex>,
        indices: Vec<u32>,
        shader: &Arc<Shader>,
    ) -> Arc<Self> {
        Arc::new(Self::build(label.into(), vertices, indices, Some(Arc::clone(shader))))
    }

    fn build(
        label: String,
        vertices: Vec<MeshVertex>,
        indices: Vec<u32>,
        shader: Option<Arc<Shader>>,
    ) -> Self {
        Self {
            id: ResourceId::next(),
            label,
            vertices,
            indices,
            shader,
            retired: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn id(&self) -> ResourceId {
        self.id
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// The shader the mesh was bound to at load time, if any.
    #[inline]
    pub fn shader(&self) -> Option<&Arc<Shader>> {
        self.shader.as_ref()
    }

    /// Number of vertices the mesh emits when drawn.
    pub fn element_count(&self) -> usize {
        if self.indices.is_empty() {
            self.vertices.len()
        } else {
            self.indices.len()
        }
    }

    /// Withdraws the mesh from new submissions. See [`Shader::retire`].
    pub fn retire(&self) {
        self.retired.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }
}

impl SharedResource for Mesh {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn is_retired(&self) -> bool {
        Mesh::is_retired(self)
    }
}

impl fmt::Debug for Mesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mesh")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("vertices", &self.vertices.len())
            .field("indices", &self.indices.len())
            .field("shader", &self.shader.as_ref().map(|s| s.id()))
            .field("retired", &self.is_retired())
            .finish()
    }
}
