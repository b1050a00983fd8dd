//! Renderer facade.
//!
//! The [`Renderer`] owns the render state, the submission queue and the handle
//! table for its whole lifetime, and drives the batcher at flush points. It is
//! passed to calling code by reference; at most one exists per process.

mod diagnostics;
mod init;
mod renderer;
mod state;

pub use diagnostics::{BatchFailure, Diagnostics, FlushReport};
pub use init::RendererInit;
pub use renderer::Renderer;
pub use state::RenderState;
