/// Initialization parameters for the renderer.
///
/// Keep this structure small; defaults suit an interactive frame loop.
#[derive(Debug, Clone)]
pub struct RendererInit {
    /// Requests preallocated in the submission queue.
    ///
    /// The queue grows past this on demand; the value only avoids reallocation
    /// during the first frames.
    pub queue_capacity: usize,

    /// Label used in log output, useful when a tool hosts renderers sequentially.
    pub label: String,
}

impl Default for RendererInit {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            label: "kiln".to_string(),
        }
    }
}
