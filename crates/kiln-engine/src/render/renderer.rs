use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use glam::{Mat4, Vec3, Vec4};

use crate::backend::{BackendError, RenderBackend};
use crate::batch::{Batch, BatchId, Batcher};
use crate::pipeline::PipelineDescriptor;
use crate::resource::{AnyHandle, Handle, HandleTable, Mesh, ResourceError, Shader};
use crate::submit::{LineRequest, SubmissionQueue};

use super::{BatchFailure, Diagnostics, FlushReport, RenderState, RendererInit};

/// Set while a renderer is alive; enforces one renderer per process.
static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Immediate-mode submission facade.
///
/// Frame flow:
/// 1) `clear()` / `set_clear_color()`
/// 2) any number of `submit_*` calls, appended in call order
/// 3) `end_frame()` (or `flush()`), which batches the queue and issues it
///
/// Submissions become visible on the backend only at a flush: an explicit one,
/// a setter that changes line state while requests are pending, or shutdown.
///
/// # Ownership
///
/// The renderer owns the render state, the submission queue and the handle table.
/// Producers reach it through `&mut Renderer`, which also makes queue appends and
/// flush drains mutually exclusive without a lock.
///
/// # Panics
///
/// [`initialize`](Self::initialize) panics if another renderer is alive.
/// `shutdown` consumes the renderer, so use after shutdown does not compile.
pub struct Renderer<B: RenderBackend> {
    backend: B,
    init: RendererInit,
    state: RenderState,
    queue: SubmissionQueue,
    handles: HandleTable,
    /// Keeps the shader of the active `submit_pipeline` counted while it is in scope.
    pipeline_shader: Option<Handle<Shader>>,
    batcher: Batcher,
    diagnostics: Diagnostics,
    consumed: Vec<BatchId>,
    live: bool,
}

impl<B: RenderBackend> Renderer<B> {
    /// Creates the process-wide renderer over `backend`.
    ///
    /// Render state starts as: transparent black clear color, line rendering off,
    /// line thickness 1.0.
    pub fn initialize(backend: B, init: RendererInit) -> Self {
        let claimed = INITIALIZED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        assert!(
            claimed,
            "Renderer::initialize called while another renderer is alive; call shutdown first"
        );

        log::info!("{}: renderer initialized", init.label);

        Self {
            backend,
            queue: SubmissionQueue::with_capacity(init.queue_capacity),
            init,
            state: RenderState::default(),
            handles: HandleTable::new(),
            pipeline_shader: None,
            batcher: Batcher::new(),
            diagnostics: Diagnostics::default(),
            consumed: Vec::new(),
            live: true,
        }
    }

    /// Whether a renderer is currently alive in this process.
    pub fn is_initialized() -> bool {
        INITIALIZED.load(Ordering::Acquire)
    }

    /// Flushes pending submissions, waits for the backend to drain, releases every
    /// held resource and frees the process-wide slot.
    ///
    /// Returns the report of the implicit flush.
    pub fn shutdown(mut self) -> FlushReport {
        self.teardown()
    }

    // ── state ─────────────────────────────────────────────────────────────

    /// Clears the target with the current clear color. Does not touch the queue.
    pub fn clear(&mut self) -> Result<(), BackendError> {
        match self.backend.issue_clear(self.state.clear_color) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.diagnostics.clear_failures += 1;
                log::warn!("{}: clear failed: {err}", self.init.label);
                Err(err)
            }
        }
    }

    /// Sets the color used by the next `clear()`.
    #[inline]
    pub fn set_clear_color(&mut self, color: Vec4) {
        self.state.clear_color = color;
    }

    /// Toggles wireframe rendering of quads and meshes.
    ///
    /// A change flushes pending requests first, so no batch mixes old and new
    /// state. Returns that flush's report (empty when nothing was flushed).
    pub fn render_lines(&mut self, enable: bool) -> FlushReport {
        if self.state.line_rendering == enable {
            return FlushReport::default();
        }
        let report = self.flush_pending("line rendering changed");
        self.state.line_rendering = enable;
        report
    }

    /// Sets the wireframe edge width. Flushes like [`render_lines`](Self::render_lines).
    ///
    /// Non-finite or non-positive widths are ignored with a warning.
    pub fn set_line_thickness(&mut self, thickness: f32) -> FlushReport {
        if !thickness.is_finite() || thickness <= 0.0 {
            log::warn!(
                "{}: line thickness {thickness} ignored, keeping {}",
                self.init.label,
                self.state.line_thickness
            );
            return FlushReport::default();
        }
        if self.state.line_thickness == thickness {
            return FlushReport::default();
        }
        let report = self.flush_pending("line thickness changed");
        self.state.line_thickness = thickness;
        report
    }

    // ── submission ────────────────────────────────────────────────────────

    /// Queues a full-target quad drawn with `shader`.
    pub fn submit_quad(&mut self, shader: &Arc<Shader>) -> Result<(), ResourceError> {
        self.check_shader(shader)?;
        let handle = self.handles.acquire(shader);
        self.queue.push_quad(handle);
        self.diagnostics.submitted += 1;
        Ok(())
    }

    /// Queues a line segment.
    pub fn submit_line(&mut self, from: Vec3, to: Vec3, color: Vec4, thickness: f32) {
        self.submit_line_request(
            LineRequest::new(from, to)
                .with_color(color)
                .with_thickness(thickness),
        );
    }

    /// Queues a prepared line request.
    pub fn submit_line_request(&mut self, line: LineRequest) {
        self.queue.push_line(line);
        self.diagnostics.submitted += 1;
    }

    /// Queues `mesh` drawn with its bound shader.
    pub fn submit_mesh(&mut self, mesh: &Arc<Mesh>, transform: Mat4) -> Result<(), ResourceError> {
        self.check_mesh(mesh)?;
        let Some(bound) = mesh.shader() else {
            return Err(self.drop_request(ResourceError::MeshWithoutShader {
                id: mesh.id(),
                label: mesh.label().to_string(),
            }));
        };
        self.check_shader(bound)?;

        let shader = self.handles.acquire(bound);
        let handle = self.handles.acquire(mesh);
        self.queue.push_mesh(handle, transform, Some(shader));
        self.diagnostics.submitted += 1;
        Ok(())
    }

    /// Queues `mesh` drawn with `shader` instead of its bound shader.
    pub fn submit_mesh_with_shader(
        &mut self,
        mesh: &Arc<Mesh>,
        transform: Mat4,
        shader: &Arc<Shader>,
    ) -> Result<(), ResourceError> {
        self.check_mesh(mesh)?;
        self.check_shader(shader)?;

        let mesh = self.handles.acquire(mesh);
        let shader = self.handles.acquire(shader);
        self.queue.push_mesh(mesh, transform, Some(shader));
        self.diagnostics.submitted += 1;
        Ok(())
    }

    /// Makes `pipeline` the state for every request submitted until the next
    /// `submit_pipeline` or frame flush.
    ///
    /// Submitting a pipeline equal to the current one does not split batches.
    pub fn submit_pipeline(&mut self, pipeline: PipelineDescriptor) -> Result<(), ResourceError> {
        let shader = match pipeline.shader.as_ref() {
            Some(shader) => {
                self.check_shader(shader)?;
                Some(self.handles.acquire(shader))
            }
            None => None,
        };
        self.end_pipeline_scope();
        self.pipeline_shader = shader;
        self.queue.set_pipeline(Some(Arc::new(pipeline)));
        Ok(())
    }

    // ── flushing ──────────────────────────────────────────────────────────

    /// Batches and issues every pending request, then ends the pipeline scope.
    pub fn flush(&mut self) -> FlushReport {
        let report = self.flush_pending("explicit flush");
        self.end_pipeline_scope();
        report
    }

    /// Frame boundary: flushes and counts the frame.
    pub fn end_frame(&mut self) -> FlushReport {
        let report = self.flush();
        self.diagnostics.frames += 1;
        report
    }

    /// Releases handles of every batch the backend reports consumed.
    ///
    /// Returns the number of batches released.
    pub fn poll_completions(&mut self) -> usize {
        self.backend.drain_consumed(&mut self.consumed);

        let consumed = std::mem::take(&mut self.consumed);
        let mut released = 0;
        for &batch in &consumed {
            if self.on_batch_consumed(batch) {
                released += 1;
            }
        }

        // Reuse the allocation.
        self.consumed = consumed;
        self.consumed.clear();
        released
    }

    /// Completion signal: the backend no longer reads resources of `batch`.
    ///
    /// Returns false for batches that are unknown or already released.
    pub fn on_batch_consumed(&mut self, batch: BatchId) -> bool {
        if !self.handles.is_held(batch) {
            log::debug!("{}: consumption of unknown {batch} ignored", self.init.label);
            return false;
        }
        let released = self.handles.release_all(batch);
        self.diagnostics.handles_released += released as u64;
        true
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn state(&self) -> &RenderState {
        &self.state
    }

    #[inline]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Requests waiting for the next flush.
    #[inline]
    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn handles(&self) -> &HandleTable {
        &self.handles
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    // ── internals ─────────────────────────────────────────────────────────

    fn flush_pending(&mut self, reason: &str) -> FlushReport {
        self.poll_completions();

        if self.queue.is_empty() {
            return FlushReport::default();
        }

        let requests = self.queue.len();
        let batches = self.batcher.build(self.queue.drain(), &self.state);

        let mut report = FlushReport {
            requests,
            ..FlushReport::default()
        };
        let mut bound: Option<PipelineDescriptor> = None;

        for batch in batches {
            let id = batch.id;
            let kind = batch.kind;
            let result = self.issue(&batch, &mut bound);
            let held = self.collect_handles(batch);
            self.handles.hold(id, held);

            match result {
                Ok(()) => report.issued.push(id),
                Err(error) => {
                    log::warn!("{}: {kind} {id} failed: {error}", self.init.label);
                    // Never reached the device; nothing will report it consumed.
                    self.handles.release_all(id);
                    bound = None;
                    report.failures.push(BatchFailure {
                        batch: id,
                        kind,
                        error,
                    });
                }
            }
        }

        self.diagnostics.flushes += 1;
        self.diagnostics.batches_issued += report.issued.len() as u64;
        self.diagnostics.batch_failures += report.failures.len() as u64;

        log::debug!(
            "{}: flush ({reason}): {} request(s) -> {} batch(es), {} failed",
            self.init.label,
            report.requests,
            report.batches(),
            report.failures.len()
        );

        report
    }

    fn issue(
        &mut self,
        batch: &Batch,
        bound: &mut Option<PipelineDescriptor>,
    ) -> Result<(), BackendError> {
        if bound.as_ref() != Some(&batch.descriptor) {
            *bound = None;
            self.backend.bind_pipeline(&batch.descriptor)?;
            *bound = Some(batch.descriptor.clone());
        }
        self.backend.issue_draw(batch)
    }

    /// Handles a batch keeps alive until consumed: its requests' handles plus the
    /// shader of its descriptor, which may come from a submitted pipeline.
    fn collect_handles(&mut self, batch: Batch) -> Vec<AnyHandle> {
        let pipeline_shader = batch
            .descriptor
            .shader
            .as_ref()
            .map(|shader| self.handles.acquire(shader));

        let mut held = batch.into_handles();
        if let Some(shader) = pipeline_shader {
            held.push(shader.into());
        }
        held
    }

    /// Resets the pipeline register. Batches already issued hold their own
    /// reference to the pipeline shader.
    fn end_pipeline_scope(&mut self) {
        self.queue.set_pipeline(None);
        if let Some(shader) = self.pipeline_shader.take() {
            self.handles.release(shader);
        }
    }

    fn check_shader(&mut self, shader: &Arc<Shader>) -> Result<(), ResourceError> {
        if shader.is_retired() {
            return Err(self.drop_request(ResourceError::RetiredShader {
                id: shader.id(),
                label: shader.label().to_string(),
            }));
        }
        Ok(())
    }

    fn check_mesh(&mut self, mesh: &Arc<Mesh>) -> Result<(), ResourceError> {
        if mesh.is_retired() {
            return Err(self.drop_request(ResourceError::RetiredMesh {
                id: mesh.id(),
                label: mesh.label().to_string(),
            }));
        }
        Ok(())
    }

    fn drop_request(&mut self, err: ResourceError) -> ResourceError {
        self.diagnostics.resource_errors += 1;
        log::warn!("{}: request dropped: {err}", self.init.label);
        err
    }

    fn teardown(&mut self) -> FlushReport {
        let report = self.flush_pending("shutdown");
        self.end_pipeline_scope();

        if let Err(err) = self.backend.finish() {
            log::error!("{}: backend failed to drain at shutdown: {err}", self.init.label);
        }
        self.poll_completions();

        let unreported = self.handles.in_flight_batches();
        if unreported > 0 {
            log::warn!(
                "{}: {unreported} batch(es) never reported consumed; releasing at shutdown",
                self.init.label
            );
        }
        self.handles.release_everything();

        self.live = false;
        INITIALIZED.store(false, Ordering::Release);
        log::info!(
            "{}: renderer shut down ({} frame(s), {} batch(es) issued)",
            self.init.label,
            self.diagnostics.frames,
            self.diagnostics.batches_issued
        );
        report
    }
}

impl<B: RenderBackend> Drop for Renderer<B> {
    fn drop(&mut self) {
        if !self.live {
            return;
        }
        if std::thread::panicking() {
            self.live = false;
            INITIALIZED.store(false, Ordering::Release);
            return;
        }
        log::error!("{}: renderer dropped without shutdown", self.init.label);
        self.teardown();
    }
}
