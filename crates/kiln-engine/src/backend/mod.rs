//! GPU backend boundary.
//!
//! The submission engine drives a backend through four operations and one
//! completion signal. Backends own every device object; the engine only ever
//! hands them batches and pipeline descriptors.

mod error;
mod recording;

pub use error::BackendError;
pub use recording::{BackendCall, BoundPipeline, RecordingBackend};

use glam::Vec4;

use crate::batch::{Batch, BatchId};
use crate::pipeline::PipelineDescriptor;

/// Primitive draw operations the renderer requires.
///
/// Calls arrive in program order from a single producer. `issue_draw` may hand
/// work to the device asynchronously; the backend later reports the batch through
/// [`drain_consumed`](Self::drain_consumed) once the device no longer reads any
/// resource the batch referenced.
pub trait RenderBackend {
    /// Clears the color target immediately.
    fn issue_clear(&mut self, color: Vec4) -> Result<(), BackendError>;

    /// Binds the pipeline state for the next draw.
    fn bind_pipeline(&mut self, descriptor: &PipelineDescriptor) -> Result<(), BackendError>;

    /// Draws one batch. All requests in `batch` share `batch.kind`.
    fn issue_draw(&mut self, batch: &Batch) -> Result<(), BackendError>;

    /// Appends the ids of batches consumed since the last call.
    fn drain_consumed(&mut self, consumed: &mut Vec<BatchId>);

    /// Blocks until all issued work has been consumed.
    fn finish(&mut self) -> Result<(), BackendError>;
}
