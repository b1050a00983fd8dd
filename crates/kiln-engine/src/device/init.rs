/// Initialization parameters for the headless GPU context.
///
/// Keep this structure stable and minimal. Add configuration flags only when a
/// concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Offscreen color target size in pixels.
    pub target_size: (u32, u32),

    /// Offscreen color target format.
    ///
    /// sRGB keeps blending results comparable with on-screen output.
    pub target_format: wgpu::TextureFormat,

    /// Adapter selection preference.
    pub power_preference: wgpu::PowerPreference,

    /// Use a software adapter even if hardware is available.
    pub force_fallback_adapter: bool,

    /// Required wgpu features.
    ///
    /// `POLYGON_MODE_LINE` is requested on top of these when the adapter
    /// supports it; without it wireframe batches are reported unsupported.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            target_size: (800, 600),
            target_format: wgpu::TextureFormat::Rgba8UnormSrgb,
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
        }
    }
}
