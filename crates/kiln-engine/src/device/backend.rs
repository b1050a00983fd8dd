use std::sync::mpsc;

use anyhow::Result;
use glam::Vec4;
use wgpu::util::DeviceExt;

use crate::backend::{BackendError, RenderBackend};
use crate::batch::{Batch, BatchId};
use crate::pipeline::{DepthMode, PipelineDescriptor, PolygonMode};

use super::geometry::build_geometry;
use super::pipelines::{PipelineCache, PipelineKey};
use super::{GpuInit, HeadlessGpu};

/// [`RenderBackend`] that renders into the offscreen target of a [`HeadlessGpu`].
///
/// Each batch becomes one render pass and one queue submission. Consumption is
/// reported from `Queue::on_submitted_work_done`, so a batch's resources stay
/// held until the device has actually finished with it.
pub struct WgpuBackend {
    gpu: HeadlessGpu,
    pipelines: PipelineCache,
    bound: Option<PipelineKey>,

    done_tx: mpsc::Sender<BatchId>,
    done_rx: mpsc::Receiver<BatchId>,

    warned_thickness: bool,
}

impl WgpuBackend {
    pub fn new(gpu: HeadlessGpu) -> Self {
        let (done_tx, done_rx) = mpsc::channel();
        Self {
            gpu,
            pipelines: PipelineCache::new(),
            bound: None,
            done_tx,
            done_rx,
            warned_thickness: false,
        }
    }

    /// Creates the GPU context and backend, blocking on adapter/device acquisition.
    pub fn headless(init: GpuInit) -> Result<Self> {
        let gpu = pollster::block_on(HeadlessGpu::new(init))?;
        Ok(Self::new(gpu))
    }

    #[inline]
    pub fn gpu(&self) -> &HeadlessGpu {
        &self.gpu
    }

    fn clear_color(color: Vec4) -> wgpu::Color {
        wgpu::Color {
            r: color.x as f64,
            g: color.y as f64,
            b: color.z as f64,
            a: color.w as f64,
        }
    }

    fn submit(&self, encoder: wgpu::CommandEncoder, batch: Option<BatchId>) {
        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        if let Some(id) = batch {
            let tx = self.done_tx.clone();
            self.gpu.queue().on_submitted_work_done(move || {
                // Receiver is gone only when the backend was dropped.
                let _ = tx.send(id);
            });
        }
    }
}

impl RenderBackend for WgpuBackend {
    fn issue_clear(&mut self, color: Vec4) -> Result<(), BackendError> {
        let device = self.gpu.device();
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("kiln clear encoder"),
        });

        {
            let _rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("kiln clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.gpu.target_view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(Self::clear_color(color)),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.gpu.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        self.submit(encoder, None);
        Ok(())
    }

    fn bind_pipeline(&mut self, descriptor: &PipelineDescriptor) -> Result<(), BackendError> {
        self.bound = None;

        if descriptor.polygon_mode == PolygonMode::Line
            && !self.gpu.has_feature(wgpu::Features::POLYGON_MODE_LINE)
        {
            return Err(BackendError::Unsupported {
                feature: "POLYGON_MODE_LINE",
            });
        }

        if descriptor.line_thickness.is_some_and(|t| t != 1.0) && !self.warned_thickness {
            self.warned_thickness = true;
            log::debug!("wgpu backend: line thickness is ignored, lines are one pixel wide");
        }

        self.pipelines.evict_dead();
        let key = self
            .pipelines
            .ensure(self.gpu.device(), self.gpu.format(), descriptor)
            .map_err(BackendError::device)?;

        self.bound = Some(key);
        Ok(())
    }

    fn issue_draw(&mut self, batch: &Batch) -> Result<(), BackendError> {
        let key = PipelineKey::of(&batch.descriptor);
        if self.bound != Some(key) {
            return Err(BackendError::rejected(format!(
                "{} drawn without its pipeline bound",
                batch.id
            )));
        }
        let pipeline = self
            .pipelines
            .get(&key)
            .ok_or_else(|| BackendError::rejected("bound pipeline was evicted"))?;

        let geometry = build_geometry(batch, key.is_strip());
        if geometry.is_empty() {
            // Nothing reaches the device; the batch is done as soon as it is seen.
            let _ = self.done_tx.send(batch.id);
            return Ok(());
        }

        let device = self.gpu.device();
        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("kiln batch vertices"),
            contents: bytemuck::cast_slice(&geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("kiln batch indices"),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("kiln batch encoder"),
        });

        {
            let depth_stencil_attachment =
                (key.depth != DepthMode::Disabled).then(|| wgpu::RenderPassDepthStencilAttachment {
                    view: self.gpu.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                });

            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("kiln batch pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.gpu.target_view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_pipeline(pipeline);
            rpass.set_vertex_buffer(0, vbo.slice(..));
            rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..geometry.indices.len() as u32, 0, 0..1);
        }

        self.submit(encoder, Some(batch.id));
        Ok(())
    }

    fn drain_consumed(&mut self, consumed: &mut Vec<BatchId>) {
        if let Err(err) = self.gpu.device().poll(wgpu::PollType::Poll) {
            log::warn!("wgpu backend: device poll failed: {err}");
        }
        consumed.extend(self.done_rx.try_iter());
    }

    fn finish(&mut self) -> Result<(), BackendError> {
        self.gpu
            .device()
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            })
            .map_err(|err| BackendError::device(err.to_string()))?;
        Ok(())
    }
}
