//! Batch formation.
//!
//! The batcher walks the submission queue once and partitions it into maximal
//! runs of requests that share one effective pipeline state. Each batch becomes a
//! single backend draw operation.

mod group;
mod batcher;

pub use group::{Batch, BatchId};
pub use batcher::{Batcher, effective_descriptor};
