use anyhow::{Context, Result};

use super::GpuInit;

/// Depth format of the offscreen depth target.
pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Owns wgpu core objects and an offscreen render target.
///
/// This type is the low-level rendering context for the wgpu backend:
/// - creates and stores Adapter/Device/Queue
/// - creates the offscreen color and depth targets
/// - records which optional features the device ended up with
pub struct HeadlessGpu {
    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,

    /// Owns the texture behind `target_view`.
    _target: wgpu::Texture,
    target_view: wgpu::TextureView,

    /// Depth target matching `target` in size.
    depth_view: wgpu::TextureView,

    format: wgpu::TextureFormat,
    size: (u32, u32),
}

impl HeadlessGpu {
    /// Creates a GPU context with no surface.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(init: GpuInit) -> Result<Self> {
        let (width, height) = init.target_size;
        anyhow::ensure!(width > 0 && height > 0, "render target has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: None,
                force_fallback_adapter: init.force_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let optional = adapter.features() & wgpu::Features::POLYGON_MODE_LINE;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("kiln device"),
                required_features: init.required_features | optional,
                required_limits: init.required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("kiln color target"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: init.target_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("kiln depth target"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        log::info!(
            "headless gpu ready: {} ({:?}), target {}x{} {:?}",
            adapter.get_info().name,
            adapter.get_info().backend,
            width,
            height,
            init.target_format
        );

        Ok(Self {
            device,
            queue,
            _target: target,
            target_view,
            depth_view,
            format: init.target_format,
            size: (width, height),
        })
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn target_view(&self) -> &wgpu::TextureView {
        &self.target_view
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    /// Color target format.
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Color target size in pixels.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Whether the device was created with `feature`.
    pub fn has_feature(&self, feature: wgpu::Features) -> bool {
        self.device.features().contains(feature)
    }
}
