//! Kiln engine crate.
//!
//! Frame submission and batching: draw requests are queued in program order,
//! partitioned into batches by exact pipeline state, and handed to a
//! [`backend::RenderBackend`]. Resources referenced by in-flight work are kept
//! alive by a handle table until the backend reports the batch consumed.

pub mod backend;
pub mod batch;
pub mod device;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod resource;
pub mod submit;

pub use backend::{BackendError, RecordingBackend, RenderBackend};
pub use pipeline::PipelineDescriptor;
pub use render::{Renderer, RendererInit};
pub use resource::{Mesh, MeshVertex, ResourceError, Shader};
