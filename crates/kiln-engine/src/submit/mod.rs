//! Submission stream types.
//!
//! Responsibilities:
//! - store draw requests in call order until the next flush
//! - carry the shared resource handles each request needs
//! - keep shape-specific payloads and push helpers isolated under `submit::shapes`

mod queue;
mod request;

mod shapes;

pub use queue::{QueuedRequest, SubmissionQueue};
pub use request::{DrawKind, DrawRequest};
pub use shapes::line::LineRequest;
pub use shapes::mesh::MeshRequest;
pub use shapes::quad::QuadRequest;
