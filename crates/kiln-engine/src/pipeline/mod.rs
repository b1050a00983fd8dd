//! Pipeline state snapshots.
//!
//! A [`PipelineDescriptor`] is the unit draw calls are grouped by: two requests
//! whose effective descriptors compare equal may share a batch.

mod descriptor;

pub use descriptor::{BlendMode, DepthMode, PipelineDescriptor, PolygonMode, Topology};
