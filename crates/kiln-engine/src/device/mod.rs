//! Headless wgpu device and the backend that renders batches with it.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue and an offscreen target
//! - translating pipeline descriptors into cached render pipelines
//! - assembling batch geometry and reporting batch completion

mod backend;
mod geometry;
mod gpu;
mod init;
mod pipelines;

pub use backend::WgpuBackend;
pub use gpu::HeadlessGpu;
pub use init::GpuInit;
