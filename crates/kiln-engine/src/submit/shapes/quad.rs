use crate::resource::{Handle, Shader};
use crate::submit::{DrawRequest, SubmissionQueue};

/// Full-target quad drawn with a caller-supplied shader.
#[derive(Debug)]
pub struct QuadRequest {
    pub shader: Handle<Shader>,
}

impl SubmissionQueue {
    /// Records a quad draw request.
    #[inline]
    pub fn push_quad(&mut self, shader: Handle<Shader>) {
        self.push(DrawRequest::Quad(QuadRequest { shader }));
    }
}
