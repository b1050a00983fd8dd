use glam::Vec4;

/// Process-wide mutable render state.
///
/// Mutated only through the renderer's setters; read by the batcher when it
/// forms batches. Persists across frames until shutdown.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderState {
    /// Color used by the next clear.
    pub clear_color: Vec4,
    /// Wireframe rendering for filled primitives (quads and meshes).
    pub line_rendering: bool,
    /// Width of wireframe edges.
    pub line_thickness: f32,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            clear_color: Vec4::ZERO,
            line_rendering: false,
            line_thickness: 1.0,
        }
    }
}
