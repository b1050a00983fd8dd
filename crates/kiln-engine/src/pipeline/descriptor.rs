use std::sync::Arc;

use crate::resource::{ResourceId, Shader};

/// Color blending applied by the pipeline.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum BlendMode {
    /// Source replaces destination.
    Opaque,
    /// Straight-alpha "over" blending.
    #[default]
    Alpha,
    /// Premultiplied-alpha "over" blending.
    PremultipliedAlpha,
    /// Source is added to destination.
    Additive,
}

/// Depth testing and writing.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum DepthMode {
    #[default]
    Disabled,
    /// Test against existing depth (less-or-equal) without writing.
    Test,
    /// Test (less) and write depth.
    TestWrite,
}

/// Primitive assembly.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Topology {
    #[default]
    TriangleList,
    TriangleStrip,
    LineList,
    LineStrip,
    PointList,
}

/// Rasterization of filled primitives.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum PolygonMode {
    #[default]
    Fill,
    /// Wireframe: triangle edges are rasterized as lines.
    Line,
}

/// Immutable snapshot of GPU state.
///
/// Equality is exact across every field. The shader compares by identity
/// ([`ResourceId`]), and `line_thickness` uses exact float equality; no
/// tolerance is applied, so batch boundaries are reproducible.
#[derive(Debug, Clone, Default)]
pub struct PipelineDescriptor {
    /// `None` selects the backend's built-in shader for the primitive kind.
    pub shader: Option<Arc<Shader>>,
    pub blend: BlendMode,
    pub depth: DepthMode,
    pub topology: Topology,
    pub polygon_mode: PolygonMode,
    /// Width of rasterized lines. `None` leaves the global line thickness in charge.
    pub line_thickness: Option<f32>,
}

impl PipelineDescriptor {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shader(mut self, shader: &Arc<Shader>) -> Self {
        self.shader = Some(Arc::clone(shader));
        self
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    pub fn with_depth(mut self, depth: DepthMode) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_polygon_mode(mut self, polygon_mode: PolygonMode) -> Self {
        self.polygon_mode = polygon_mode;
        self
    }

    pub fn with_line_thickness(mut self, thickness: f32) -> Self {
        self.line_thickness = Some(thickness);
        self
    }

    #[inline]
    pub fn shader_id(&self) -> Option<ResourceId> {
        self.shader.as_ref().map(|s| s.id())
    }
}

impl PartialEq for PipelineDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.shader_id() == other.shader_id()
            && self.blend == other.blend
            && self.depth == other.depth
            && self.topology == other.topology
            && self.polygon_mode == other.polygon_mode
            && self.line_thickness == other.line_thickness
    }
}
