use crate::backend::BackendError;
use crate::batch::BatchId;
use crate::submit::DrawKind;

/// Running counters kept by the renderer.
///
/// Every dropped request and every failed batch is counted here in addition to
/// being logged.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Requests accepted into the submission queue.
    pub submitted: u64,
    /// Requests dropped because of a resource error.
    pub resource_errors: u64,
    /// Flushes that issued at least one batch.
    pub flushes: u64,
    /// Batches handed to the backend successfully.
    pub batches_issued: u64,
    /// Batches the backend rejected.
    pub batch_failures: u64,
    /// Clears the backend rejected.
    pub clear_failures: u64,
    /// Handles released after backend consumption.
    pub handles_released: u64,
    /// Completed `end_frame` calls.
    pub frames: u64,
}

/// A batch the backend refused.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    pub batch: BatchId,
    pub kind: DrawKind,
    pub error: BackendError,
}

/// Outcome of a single flush.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlushReport {
    /// Requests drained from the queue.
    pub requests: usize,
    /// Batches issued successfully, in issue order.
    pub issued: Vec<BatchId>,
    /// Batches the backend rejected, in issue order.
    pub failures: Vec<BatchFailure>,
}

impl FlushReport {
    /// Total batches formed (issued or failed).
    #[inline]
    pub fn batches(&self) -> usize {
        self.issued.len() + self.failures.len()
    }

    /// True when the flush had nothing to do.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.requests == 0
    }

    /// True when no batch failed.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}
