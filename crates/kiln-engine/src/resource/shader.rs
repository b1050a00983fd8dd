use core::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::id::{ResourceId, SharedResource};

/// Opaque shader program.
///
/// The source is WGSL and is only read by backends. The wgpu backend expects
/// the entry points `vs_main` and `fs_main`, with vertex inputs
/// `@location(0) position: vec4<f32>` (clip space, already transformed) and
/// `@location(1) color: vec4<f32>`.
pub struct Shader {
    id: ResourceId,
    label: String,
    source: String,
    retired: AtomicBool,
}

impl Shader {
    /// Creates a shared shader from WGSL source.
    pub fn from_wgsl(label: impl Into<String>, source: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: ResourceId::next(),
            label: label.into(),
            source: source.into(),
            retired: AtomicBool::new(false),
        })
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
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Withdraws the shader from new submissions.
    ///
    /// Submissions already queued or in flight keep the shader alive until their
    /// batch is consumed by the backend.
    pub fn retire(&self) {
        self.retired.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }
}

impl SharedResource for Shader {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn is_retired(&self) -> bool {
        Shader::is_retired(self)
    }
}

impl fmt::Debug for Shader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shader")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("retired", &self.is_retired())
            .finish_non_exhaustive()
    }
}
