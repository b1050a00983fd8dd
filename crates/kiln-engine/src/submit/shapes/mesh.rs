use std::sync::Arc;

use glam::Mat4;

use crate::resource::{Handle, Mesh, Shader};
use crate::submit::{DrawRequest, SubmissionQueue};

/// Mesh instance with a model transform and the shader it is drawn with.
#[derive(Debug)]
pub struct MeshRequest {
    pub mesh: Handle<Mesh>,
    pub transform: Mat4,
    /// The override, or the mesh's bound shader as resolved at submission.
    /// `None` defers to the mesh's bound shader at batching time.
    pub shader: Option<Handle<Shader>>,
}

impl MeshRequest {
    /// The shader the mesh is drawn with: the override, else the mesh's bound shader.
    pub fn effective_shader(&self) -> Option<&Arc<Shader>> {
        match &self.shader {
            Some(shader) => Some(shader.shared()),
            None => self.mesh.shader(),
        }
    }
}

impl SubmissionQueue {
    /// Records a mesh draw request.
    #[inline]
    pub fn push_mesh(&mut self, mesh: Handle<Mesh>, transform: Mat4, shader: Option<Handle<Shader>>) {
        self.push(DrawRequest::Mesh(MeshRequest {
            mesh,
            transform,
            shader,
        }));
    }
}
