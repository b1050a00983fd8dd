use core::fmt;

use crate::resource::AnyHandle;
use crate::submit::shapes::line::LineRequest;
use crate::submit::shapes::mesh::MeshRequest;
use crate::submit::shapes::quad::QuadRequest;

/// Pending draw request.
///
/// The set of shapes is closed: the batcher dispatches on it exhaustively.
/// Adding a shape means adding a payload module under `submit::shapes`, a
/// variant here, a [`DrawKind`], and a matching draw path in every backend.
#[derive(Debug)]
pub enum DrawRequest {
    Quad(QuadRequest),
    Line(LineRequest),
    Mesh(MeshRequest),
}

/// Shape discriminant. A batch only ever holds requests of one kind.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DrawKind {
    Quad,
    Line,
    Mesh,
}

impl DrawRequest {
    #[inline]
    pub fn kind(&self) -> DrawKind {
        match self {
            Self::Quad(_) => DrawKind::Quad,
            Self::Line(_) => DrawKind::Line,
            Self::Mesh(_) => DrawKind::Mesh,
        }
    }

    /// Moves the request's resource handles into `out`, consuming the request.
    pub fn into_handles(self, out: &mut Vec<AnyHandle>) {
        match self {
            Self::Quad(q) => out.push(q.shader.into()),
            Self::Line(_) => {}
            Self::Mesh(m) => {
                out.push(m.mesh.into());
                if let Some(shader) = m.shader {
                    out.push(shader.into());
                }
            }
        }
    }
}

impl fmt::Display for DrawKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Quad => "quad",
            Self::Line => "line",
            Self::Mesh => "mesh",
        })
    }
}
