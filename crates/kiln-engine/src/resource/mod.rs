//! Shared GPU resources referenced by draw requests.
//!
//! Shaders and meshes are opaque to the submission engine: it only reads their
//! identity and retirement flag, and extends their lifetime while GPU work that
//! references them is pending. The backend is the only consumer of their contents.

mod error;
mod handles;
mod id;
mod mesh;
mod shader;

pub use error::ResourceError;
pub use handles::{AnyHandle, Handle, HandleTable};
pub use id::{ResourceId, SharedResource};
pub use mesh::{Mesh, MeshVertex};
pub use shader::Shader;
