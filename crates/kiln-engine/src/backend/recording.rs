use core::fmt;

use glam::Vec4;

use crate::batch::{Batch, BatchId};
use crate::pipeline::{BlendMode, DepthMode, PipelineDescriptor, PolygonMode, Topology};
use crate::resource::ResourceId;
use crate::submit::DrawKind;

use super::{BackendError, RenderBackend};

/// Pipeline state of a recorded bind.
///
/// The shader is kept by id only; a recording never extends a resource's lifetime.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundPipeline {
    pub shader: Option<ResourceId>,
    pub blend: BlendMode,
    pub depth: DepthMode,
    pub topology: Topology,
    pub polygon_mode: PolygonMode,
    pub line_thickness: Option<f32>,
}

impl From<&PipelineDescriptor> for BoundPipeline {
    fn from(d: &PipelineDescriptor) -> Self {
        Self {
            shader: d.shader_id(),
            blend: d.blend,
            depth: d.depth,
            topology: d.topology,
            polygon_mode: d.polygon_mode,
            line_thickness: d.line_thickness,
        }
    }
}

/// A call observed by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Clear(Vec4),
    BindPipeline(BoundPipeline),
    Draw {
        batch: BatchId,
        kind: DrawKind,
        count: usize,
    },
}

type RejectFn = Box<dyn Fn(&PipelineDescriptor) -> Option<String> + Send>;

/// In-memory backend that records every call instead of touching a device.
///
/// Consumption modes:
/// - immediate (default): a drawn batch is reported consumed on the next drain
/// - deferred: batches stay in flight until [`complete`](Self::complete) or
///   [`complete_all`](Self::complete_all) is called, like a GPU lagging behind
///
/// Used as the test double for the GPU boundary and as the headless fallback
/// when no adapter is available.
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    deferred: bool,
    in_flight: Vec<BatchId>,
    consumed: Vec<BatchId>,
    reject: Option<RejectFn>,
}

impl RecordingBackend {
    /// Backend that consumes batches as soon as they are drawn.
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            deferred: false,
            in_flight: Vec::new(),
            consumed: Vec::new(),
            reject: None,
        }
    }

    /// Backend that holds drawn batches in flight until told otherwise.
    pub fn deferred() -> Self {
        Self {
            deferred: true,
            ..Self::new()
        }
    }

    /// Rejects `bind_pipeline` for descriptors where `reject` returns a reason.
    pub fn with_rejection<F>(mut self, reject: F) -> Self
    where
        F: Fn(&PipelineDescriptor) -> Option<String> + Send + 'static,
    {
        self.reject = Some(Box::new(reject));
        self
    }

    #[inline]
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// `(batch, kind, request count)` for every recorded draw, in call order.
    pub fn draws(&self) -> Vec<(BatchId, DrawKind, usize)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                BackendCall::Draw { batch, kind, count } => Some((*batch, *kind, *count)),
                _ => None,
            })
            .collect()
    }

    /// Clear colors, in call order.
    pub fn clears(&self) -> Vec<Vec4> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                BackendCall::Clear(color) => Some(*color),
                _ => None,
            })
            .collect()
    }

    /// Batches drawn but not yet reported consumed.
    #[inline]
    pub fn in_flight(&self) -> &[BatchId] {
        &self.in_flight
    }

    /// Marks one in-flight batch consumed. Returns false if it was not in flight.
    pub fn complete(&mut self, batch: BatchId) -> bool {
        let Some(pos) = self.in_flight.iter().position(|b| *b == batch) else {
            return false;
        };
        self.in_flight.remove(pos);
        self.consumed.push(batch);
        true
    }

    /// Marks every in-flight batch consumed.
    pub fn complete_all(&mut self) {
        self.consumed.append(&mut self.in_flight);
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecordingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingBackend")
            .field("calls", &self.calls.len())
            .field("deferred", &self.deferred)
            .field("in_flight", &self.in_flight)
            .field("consumed", &self.consumed)
            .field("rejects", &self.reject.is_some())
            .finish()
    }
}

impl RenderBackend for RecordingBackend {
    fn issue_clear(&mut self, color: Vec4) -> Result<(), BackendError> {
        self.calls.push(BackendCall::Clear(color));
        Ok(())
    }

    fn bind_pipeline(&mut self, descriptor: &PipelineDescriptor) -> Result<(), BackendError> {
        if let Some(reason) = self.reject.as_ref().and_then(|reject| reject(descriptor)) {
            return Err(BackendError::rejected(reason));
        }
        self.calls.push(BackendCall::BindPipeline(descriptor.into()));
        Ok(())
    }

    fn issue_draw(&mut self, batch: &Batch) -> Result<(), BackendError> {
        self.calls.push(BackendCall::Draw {
            batch: batch.id,
            kind: batch.kind,
            count: batch.len(),
        });
        if self.deferred {
            self.in_flight.push(batch.id);
        } else {
            self.consumed.push(batch.id);
        }
        Ok(())
    }

    fn drain_consumed(&mut self, consumed: &mut Vec<BatchId>) {
        consumed.append(&mut self.consumed);
    }

    fn finish(&mut self) -> Result<(), BackendError> {
        self.complete_all();
        Ok(())
    }
}
