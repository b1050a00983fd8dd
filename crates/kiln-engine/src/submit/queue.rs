use std::sync::Arc;

use crate::pipeline::PipelineDescriptor;

use super::DrawRequest;

/// A request plus the state it was submitted under.
#[derive(Debug)]
pub struct QueuedRequest {
    pub request: DrawRequest,
    /// Pipeline active at submission time (`None` = defaults).
    pub pipeline: Option<Arc<PipelineDescriptor>>,
}

/// Ordered, append-only buffer of pending draw requests.
///
/// Performance characteristics:
/// - `push()` is O(1) amortized and never fails
/// - `drain()` hands the requests to the batcher and keeps the allocation for reuse
///
/// # Pipeline scope
///
/// [`set_pipeline`](Self::set_pipeline) works like a state register: every request
/// pushed afterwards inherits the pipeline until it is replaced or reset.
#[derive(Debug, Default)]
pub struct SubmissionQueue {
    items: Vec<QueuedRequest>,
    pipeline: Option<Arc<PipelineDescriptor>>,
}

impl SubmissionQueue {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Appends a request. It inherits the current pipeline.
    #[inline]
    pub fn push(&mut self, request: DrawRequest) {
        self.items.push(QueuedRequest {
            request,
            pipeline: self.pipeline.clone(),
        });
    }

    /// Replaces the pipeline inherited by subsequent pushes.
    #[inline]
    pub fn set_pipeline(&mut self, pipeline: Option<Arc<PipelineDescriptor>>) {
        self.pipeline = pipeline;
    }

    #[inline]
    pub fn pipeline(&self) -> Option<&Arc<PipelineDescriptor>> {
        self.pipeline.as_ref()
    }

    /// Returns pending requests in submission order.
    #[inline]
    pub fn items(&self) -> &[QueuedRequest] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Removes all pending requests in submission order.
    ///
    /// The pipeline register is left untouched.
    pub fn drain(&mut self) -> std::vec::Drain<'_, QueuedRequest> {
        self.items.drain(..)
    }
}
