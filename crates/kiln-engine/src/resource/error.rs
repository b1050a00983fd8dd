use std::fmt;

use super::id::ResourceId;

/// A submission referenced a resource that cannot be drawn.
///
/// Recoverable: the offending request is dropped and the frame continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// The shader was retired by its owner before submission.
    RetiredShader { id: ResourceId, label: String },
    /// The mesh was retired by its owner before submission.
    RetiredMesh { id: ResourceId, label: String },
    /// `submit_mesh` was called for a mesh that has no bound shader.
    MeshWithoutShader { id: ResourceId, label: String },
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetiredShader { id, label } => {
                write!(f, "shader {id} ({label}) is retired")
            }
            Self::RetiredMesh { id, label } => {
                write!(f, "mesh {id} ({label}) is retired")
            }
            Self::MeshWithoutShader { id, label } => {
                write!(f, "mesh {id} ({label}) has no bound shader and no override was given")
            }
        }
    }
}

impl std::error::Error for ResourceError {}
