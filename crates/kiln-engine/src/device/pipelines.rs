//! Pipeline state translation and caching for the wgpu backend.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use crate::pipeline::{BlendMode, DepthMode, PipelineDescriptor, PolygonMode, Topology};
use crate::resource::{ResourceId, Shader};

use super::geometry::GpuVertex;
use super::gpu::DEPTH_FORMAT;

/// Built-in shader used by batches whose descriptor names no shader.
const BUILTIN_WGSL: &str = include_str!("shaders/builtin.wgsl");

/// Everything that selects a distinct `wgpu::RenderPipeline`.
///
/// Line thickness is absent: wgpu rasterizes all lines one pixel wide.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) struct PipelineKey {
    pub shader: Option<ResourceId>,
    pub blend: BlendMode,
    pub depth: DepthMode,
    pub topology: Topology,
    pub polygon_mode: PolygonMode,
}

impl PipelineKey {
    pub fn of(descriptor: &PipelineDescriptor) -> Self {
        Self {
            shader: descriptor.shader_id(),
            blend: descriptor.blend,
            depth: descriptor.depth,
            topology: descriptor.topology,
            polygon_mode: descriptor.polygon_mode,
        }
    }

    #[inline]
    pub fn is_strip(&self) -> bool {
        matches!(self.topology, Topology::TriangleStrip | Topology::LineStrip)
    }
}

pub(crate) fn blend_state(blend: BlendMode) -> wgpu::BlendState {
    match blend {
        BlendMode::Opaque => wgpu::BlendState::REPLACE,
        BlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
        BlendMode::PremultipliedAlpha => wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING,
        BlendMode::Additive => {
            let add = wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            };
            wgpu::BlendState {
                color: add,
                alpha: add,
            }
        }
    }
}

pub(crate) fn depth_state(depth: DepthMode) -> Option<wgpu::DepthStencilState> {
    let (depth_write_enabled, depth_compare) = match depth {
        DepthMode::Disabled => return None,
        DepthMode::Test => (false, wgpu::CompareFunction::LessEqual),
        DepthMode::TestWrite => (true, wgpu::CompareFunction::Less),
    };
    Some(wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled,
        depth_compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    })
}

pub(crate) fn primitive_topology(topology: Topology) -> wgpu::PrimitiveTopology {
    match topology {
        Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
        Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        Topology::LineList => wgpu::PrimitiveTopology::LineList,
        Topology::LineStrip => wgpu::PrimitiveTopology::LineStrip,
        Topology::PointList => wgpu::PrimitiveTopology::PointList,
    }
}

pub(crate) fn polygon_mode(mode: PolygonMode) -> wgpu::PolygonMode {
    match mode {
        PolygonMode::Fill => wgpu::PolygonMode::Fill,
        PolygonMode::Line => wgpu::PolygonMode::Line,
    }
}

struct CachedModule {
    /// Dead once every holder of the shader is gone; the module is then evicted.
    owner: Weak<Shader>,
    module: wgpu::ShaderModule,
}

/// Compiled shader modules and render pipelines, keyed by resource identity.
#[derive(Default)]
pub(crate) struct PipelineCache {
    builtin: Option<wgpu::ShaderModule>,
    modules: HashMap<ResourceId, CachedModule>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl PipelineCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &PipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(key)
    }

    /// Creates the pipeline for `descriptor` unless cached. Returns its key.
    ///
    /// Shader compilation errors are captured through a validation error scope
    /// and returned as text instead of reaching the uncaptured-error handler.
    pub fn ensure(
        &mut self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        descriptor: &PipelineDescriptor,
    ) -> Result<PipelineKey, String> {
        let key = PipelineKey::of(descriptor);
        if self.pipelines.contains_key(&key) {
            return Ok(key);
        }

        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = {
            let module = self.module(device, descriptor.shader.as_ref());
            create_pipeline(device, format, module, &key)
        };
        if let Some(err) = pollster::block_on(scope.pop()) {
            if let Some(id) = key.shader {
                self.modules.remove(&id);
            }
            return Err(err.to_string());
        }

        log::debug!("created render pipeline {key:?}");
        self.pipelines.insert(key, pipeline);
        Ok(key)
    }

    /// Drops modules and pipelines of shaders that no longer exist.
    pub fn evict_dead(&mut self) -> usize {
        let dead: Vec<ResourceId> = self
            .modules
            .iter()
            .filter(|(_, m)| m.owner.strong_count() == 0)
            .map(|(id, _)| *id)
            .collect();

        for id in &dead {
            self.modules.remove(id);
        }
        if !dead.is_empty() {
            self.pipelines
                .retain(|key, _| key.shader.is_none_or(|id| !dead.contains(&id)));
            log::debug!("evicted {} shader module(s)", dead.len());
        }
        dead.len()
    }

    fn module(&mut self, device: &wgpu::Device, shader: Option<&Arc<Shader>>) -> &wgpu::ShaderModule {
        let Some(shader) = shader else {
            return self.builtin.get_or_insert_with(|| {
                device.create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some("kiln builtin shader"),
                    source: wgpu::ShaderSource::Wgsl(BUILTIN_WGSL.into()),
                })
            });
        };

        &self
            .modules
            .entry(shader.id())
            .or_insert_with(|| CachedModule {
                owner: Arc::downgrade(shader),
                module: device.create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some(shader.label()),
                    source: wgpu::ShaderSource::Wgsl(shader.source().into()),
                }),
            })
            .module
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    module: &wgpu::ShaderModule,
    key: &PipelineKey,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("kiln pipeline layout"),
        bind_group_layouts: &[],
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("kiln pipeline"),
        layout: Some(&layout),

        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[GpuVertex::layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend_state(key.blend)),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: primitive_topology(key.topology),
            strip_index_format: key.is_strip().then_some(wgpu::IndexFormat::Uint32),
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: polygon_mode(key.polygon_mode),
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: depth_state(key.depth),
        multisample: wgpu::MultisampleState::default(),

        multiview_mask: None,
        cache: None,
    })
}
