use anyhow::Result;
use glam::{Mat4, Vec3, Vec4};

use kiln_engine::backend::{RecordingBackend, RenderBackend};
use kiln_engine::device::{GpuInit, WgpuBackend};
use kiln_engine::logging::{LoggingConfig, init_logging};
use kiln_engine::pipeline::{BlendMode, DepthMode, PipelineDescriptor};
use kiln_engine::render::{Renderer, RendererInit};
use kiln_engine::resource::{Mesh, MeshVertex, Shader};

const FRAMES: u32 = 3;

const TINT_WGSL: &str = r#"
struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(@location(0) position: vec4<f32>, @location(1) color: vec4<f32>) -> VsOut {
    var out: VsOut;
    out.clip = position;
    out.color = color;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color.rgb * 0.5, in.color.a);
}
"#;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    match WgpuBackend::headless(GpuInit::default()) {
        Ok(backend) => {
            let (width, height) = backend.gpu().size();
            log::info!(
                "rendering {FRAMES} frame(s) offscreen at {width}x{height} {:?}",
                backend.gpu().format()
            );
            run(backend)
        }
        Err(err) => {
            log::warn!("no usable GPU ({err:#}); rendering into a recording backend");
            run(RecordingBackend::new())
        }
    }
}

fn run<B: RenderBackend>(backend: B) -> Result<()> {
    let mut renderer = Renderer::initialize(
        backend,
        RendererInit {
            label: "kiln-studio".to_string(),
            ..RendererInit::default()
        },
    );

    let tint = Shader::from_wgsl("tint", TINT_WGSL);
    let triangle = Mesh::with_shader(
        "triangle",
        vec![
            MeshVertex::new([-0.5, -0.5, 0.0], [1.0, 0.2, 0.2, 1.0]),
            MeshVertex::new([0.5, -0.5, 0.0], [0.2, 1.0, 0.2, 1.0]),
            MeshVertex::new([0.0, 0.5, 0.0], [0.2, 0.2, 1.0, 1.0]),
        ],
        vec![0, 1, 2],
        &tint,
    );

    renderer.set_clear_color(Vec4::new(0.05, 0.05, 0.08, 1.0));

    for frame in 0..FRAMES {
        renderer.clear()?;

        renderer.submit_quad(&tint)?;

        let angle = frame as f32 * 0.3;
        for i in 0..4 {
            let offset = Vec3::new(-0.6 + 0.4 * i as f32, 0.0, 0.0);
            let transform = Mat4::from_translation(offset) * Mat4::from_rotation_z(angle);
            renderer.submit_mesh(&triangle, transform)?;
        }

        renderer.submit_pipeline(
            PipelineDescriptor::new()
                .with_blend(BlendMode::Additive)
                .with_depth(DepthMode::Disabled),
        )?;
        for i in 0..8 {
            let y = -0.8 + 0.2 * i as f32;
            renderer.submit_line(
                Vec3::new(-0.9, y, 0.0),
                Vec3::new(0.9, y, 0.0),
                Vec4::new(0.9, 0.9, 0.9, 1.0),
                1.0,
            );
        }

        // Second half of the frame in wireframe.
        let forced = renderer.render_lines(frame % 2 == 1);
        renderer.submit_mesh(&triangle, Mat4::from_scale(Vec3::splat(0.5)))?;

        let report = renderer.end_frame();
        log::info!(
            "frame {frame}: {} request(s) in {} batch(es), {} failed (+{} forced)",
            report.requests,
            report.batches(),
            report.failures.len(),
            forced.batches()
        );
        for failure in &report.failures {
            log::warn!("  {} {}: {}", failure.kind, failure.batch, failure.error);
        }
    }

    let diagnostics = *renderer.diagnostics();
    renderer.shutdown();
    log::info!("done: {diagnostics:?}");
    Ok(())
}
