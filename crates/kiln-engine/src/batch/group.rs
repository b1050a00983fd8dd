use core::fmt;

use crate::pipeline::PipelineDescriptor;
use crate::resource::AnyHandle;
use crate::submit::{DrawKind, DrawRequest, LineRequest, MeshRequest, QuadRequest};

/// Identity of an issued batch, used for the backend's consumption signal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct BatchId(u64);

impl BatchId {
    #[inline]
    pub const fn new(v: u64) -> Self {
        Self(v)
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "batch#{}", self.0)
    }
}

/// Run of same-kind requests sharing one pipeline descriptor.
///
/// Requests are stored in submission order. Batches are frame-transient: they
/// live from batch formation until the backend has been handed the draw, after
/// which their handles move into the handle table.
#[derive(Debug)]
pub struct Batch {
    pub id: BatchId,
    pub kind: DrawKind,
    pub descriptor: PipelineDescriptor,
    pub requests: Vec<DrawRequest>,
}

impl Batch {
    #[inline]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn quads(&self) -> impl Iterator<Item = &QuadRequest> {
        self.requests.iter().filter_map(|r| match r {
            DrawRequest::Quad(q) => Some(q),
            _ => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = &LineRequest> {
        self.requests.iter().filter_map(|r| match r {
            DrawRequest::Line(l) => Some(l),
            _ => None,
        })
    }

    pub fn meshes(&self) -> impl Iterator<Item = &MeshRequest> {
        self.requests.iter().filter_map(|r| match r {
            DrawRequest::Mesh(m) => Some(m),
            _ => None,
        })
    }

    /// Consumes the batch, returning every resource handle its requests held.
    pub fn into_handles(self) -> Vec<AnyHandle> {
        let mut out = Vec::with_capacity(self.requests.len());
        for request in self.requests {
            request.into_handles(&mut out);
        }
        out
    }
}
