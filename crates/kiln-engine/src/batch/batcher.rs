use std::sync::Arc;

use crate::pipeline::{PipelineDescriptor, PolygonMode, Topology};
use crate::render::RenderState;
use crate::submit::{DrawRequest, QueuedRequest};

use super::{Batch, BatchId};

/// Computes the pipeline state a queued request is drawn with.
///
/// Rules:
/// - base: the pipeline active at submission, else defaults
/// - quad: its own shader, triangle list
/// - line: base shader, line list, its own thickness, never wireframe
/// - mesh: override shader else the mesh's bound shader, base topology
/// - quads and meshes become wireframe while line rendering is enabled; the
///   edge width is the pipeline's explicit thickness, else the global one
pub fn effective_descriptor(item: &QueuedRequest, state: &RenderState) -> PipelineDescriptor {
    let mut desc = item.pipeline.as_deref().cloned().unwrap_or_default();

    match &item.request {
        DrawRequest::Quad(quad) => {
            desc.shader = Some(Arc::clone(quad.shader.shared()));
            desc.topology = Topology::TriangleList;
            apply_fill_state(&mut desc, state);
        }
        DrawRequest::Line(line) => {
            desc.topology = Topology::LineList;
            desc.polygon_mode = PolygonMode::Fill;
            desc.line_thickness = Some(line.thickness);
        }
        DrawRequest::Mesh(mesh) => {
            desc.shader = mesh.effective_shader().cloned();
            apply_fill_state(&mut desc, state);
        }
    }

    desc
}

fn apply_fill_state(desc: &mut PipelineDescriptor, state: &RenderState) {
    if state.line_rendering {
        desc.polygon_mode = PolygonMode::Line;
    }
    if desc.polygon_mode == PolygonMode::Line && desc.line_thickness.is_none() {
        desc.line_thickness = Some(state.line_thickness);
    }
}

/// Partitions drained requests into batches.
///
/// Single pass, O(n). A new batch opens whenever the request's kind or
/// effective descriptor differs from the open batch's. Batch ids are allocated
/// from a counter owned by the batcher so they stay unique for its lifetime.
#[derive(Debug, Default)]
pub struct Batcher {
    next_id: u64,
}

impl Batcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds batches in the order they close. Request order within each batch
    /// equals submission order.
    pub fn build<I>(&mut self, items: I, state: &RenderState) -> Vec<Batch>
    where
        I: IntoIterator<Item = QueuedRequest>,
    {
        let mut batches: Vec<Batch> = Vec::new();

        for item in items {
            let kind = item.request.kind();
            let descriptor = effective_descriptor(&item, state);

            let continues_open = batches
                .last()
                .is_some_and(|open| open.kind == kind && open.descriptor == descriptor);

            if !continues_open {
                let id = self.allocate_id();
                batches.push(Batch {
                    id,
                    kind,
                    descriptor,
                    requests: Vec::new(),
                });
            }

            // A batch was pushed above if none was open.
            if let Some(open) = batches.last_mut() {
                open.requests.push(item.request);
            }
        }

        batches
    }

    fn allocate_id(&mut self) -> BatchId {
        let id = BatchId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3, Vec4};

    use super::*;
    use crate::pipeline::BlendMode;
    use crate::resource::{HandleTable, Mesh, MeshVertex, Shader};
    use crate::submit::{DrawKind, LineRequest, SubmissionQueue};

    fn shader(label: &str) -> Arc<Shader> {
        Shader::from_wgsl(label, "")
    }

    fn triangle(shader: Option<&Arc<Shader>>) -> Arc<Mesh> {
        let v = vec![
            MeshVertex::new([0.0, 0.0, 0.0], [1.0; 4]),
            MeshVertex::new([1.0, 0.0, 0.0], [1.0; 4]),
            MeshVertex::new([0.0, 1.0, 0.0], [1.0; 4]),
        ];
        match shader {
            Some(s) => Mesh::with_shader("tri", v, Vec::new(), s),
            None => Mesh::new("tri", v, Vec::new()),
        }
    }

    fn red_line(thickness: f32) -> LineRequest {
        LineRequest::new(Vec3::ZERO, Vec3::Y)
            .with_color(Vec4::new(1.0, 0.0, 0.0, 1.0))
            .with_thickness(thickness)
    }

    fn build(queue: &mut SubmissionQueue, state: &RenderState) -> Vec<Batch> {
        Batcher::new().build(queue.drain(), state)
    }

    fn sizes(batches: &[Batch]) -> Vec<usize> {
        batches.iter().map(Batch::len).collect()
    }

    // ── partitioning ──────────────────────────────────────────────────────

    #[test]
    fn empty_queue_yields_no_batches() {
        let mut q = SubmissionQueue::new();
        assert!(build(&mut q, &RenderState::default()).is_empty());
    }

    #[test]
    fn uniform_stream_is_one_batch_in_order() {
        let mut table = HandleTable::new();
        let mut q = SubmissionQueue::new();
        for t in [1.0, 1.0, 1.0, 1.0] {
            q.push_line(red_line(t).with_color(Vec4::splat(t)));
        }
        let a = shader("a");
        let mut q2 = SubmissionQueue::new();
        for _ in 0..5 {
            q2.push_quad(table.acquire(&a));
        }

        let lines = build(&mut q, &RenderState::default());
        assert_eq!(sizes(&lines), vec![4]);

        let quads = build(&mut q2, &RenderState::default());
        assert_eq!(sizes(&quads), vec![5]);
        assert_eq!(quads[0].kind, DrawKind::Quad);
    }

    #[test]
    fn request_order_within_batch_matches_submission() {
        let mut q = SubmissionQueue::new();
        for i in 0..4 {
            q.push_line(LineRequest::new(Vec3::splat(i as f32), Vec3::ZERO));
        }
        let batches = build(&mut q, &RenderState::default());
        let froms: Vec<f32> = batches[0].lines().map(|l| l.from.x).collect();
        assert_eq!(froms, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn shader_change_splits_quads() {
        let mut table = HandleTable::new();
        let (a, b) = (shader("a"), shader("b"));
        let mut q = SubmissionQueue::new();
        q.push_quad(table.acquire(&a));
        q.push_quad(table.acquire(&a));
        q.push_quad(table.acquire(&b));

        let batches = build(&mut q, &RenderState::default());
        assert_eq!(sizes(&batches), vec![2, 1]);
        assert_eq!(batches[0].descriptor.shader_id(), Some(a.id()));
        assert_eq!(batches[1].descriptor.shader_id(), Some(b.id()));
    }

    #[test]
    fn returning_to_earlier_state_opens_new_batch() {
        let mut table = HandleTable::new();
        let (a, b) = (shader("a"), shader("b"));
        let mut q = SubmissionQueue::new();
        q.push_quad(table.acquire(&a));
        q.push_quad(table.acquire(&b));
        q.push_quad(table.acquire(&a));

        // No reordering: only contiguous runs merge.
        assert_eq!(sizes(&build(&mut q, &RenderState::default())), vec![1, 1, 1]);
    }

    #[test]
    fn line_thickness_splits_lines() {
        let mut q = SubmissionQueue::new();
        q.push_line(red_line(2.0));
        q.push_line(red_line(4.0));

        let batches = build(&mut q, &RenderState::default());
        assert_eq!(sizes(&batches), vec![1, 1]);
        assert_eq!(batches[0].descriptor.line_thickness, Some(2.0));
        assert_eq!(batches[1].descriptor.line_thickness, Some(4.0));
    }

    #[test]
    fn kinds_never_share_a_batch() {
        let mut table = HandleTable::new();
        let a = shader("a");
        let mesh = triangle(Some(&a));
        let mut q = SubmissionQueue::new();
        q.push_quad(table.acquire(&a));
        q.push_mesh(table.acquire(&mesh), Mat4::IDENTITY, None);

        let batches = build(&mut q, &RenderState::default());
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].descriptor, batches[1].descriptor);
        assert_eq!(batches[1].kind, DrawKind::Mesh);
    }

    #[test]
    fn identical_pipelines_merge() {
        let mut table = HandleTable::new();
        let a = shader("a");
        let p1 = PipelineDescriptor::new().with_blend(BlendMode::Additive);
        let mut q = SubmissionQueue::new();

        q.set_pipeline(Some(Arc::new(p1.clone())));
        q.push_quad(table.acquire(&a));
        q.set_pipeline(Some(Arc::new(p1)));
        q.push_quad(table.acquire(&a));

        let batches = build(&mut q, &RenderState::default());
        assert_eq!(sizes(&batches), vec![2]);
        assert_eq!(batches[0].descriptor.blend, BlendMode::Additive);
    }

    #[test]
    fn differing_pipelines_split() {
        let mut table = HandleTable::new();
        let a = shader("a");
        let mut q = SubmissionQueue::new();

        q.push_quad(table.acquire(&a));
        q.set_pipeline(Some(Arc::new(PipelineDescriptor::new().with_blend(BlendMode::Opaque))));
        q.push_quad(table.acquire(&a));

        assert_eq!(sizes(&build(&mut q, &RenderState::default())), vec![1, 1]);
    }

    #[test]
    fn every_request_lands_in_exactly_one_batch() {
        let mut table = HandleTable::new();
        let (a, b) = (shader("a"), shader("b"));
        let mesh = triangle(Some(&b));
        let mut q = SubmissionQueue::new();
        q.push_quad(table.acquire(&a));
        q.push_line(red_line(1.0));
        q.push_line(red_line(1.0));
        q.push_mesh(table.acquire(&mesh), Mat4::IDENTITY, None);
        q.push_quad(table.acquire(&b));
        q.push_quad(table.acquire(&b));

        let batches = build(&mut q, &RenderState::default());
        assert_eq!(batches.iter().map(Batch::len).sum::<usize>(), 6);
        assert_eq!(sizes(&batches), vec![1, 2, 1, 2]);
    }

    #[test]
    fn batch_ids_are_unique_across_builds() {
        let mut batcher = Batcher::new();
        let mut q = SubmissionQueue::new();
        q.push_line(red_line(1.0));
        q.push_line(red_line(2.0));
        let first = batcher.build(q.drain(), &RenderState::default());
        q.push_line(red_line(1.0));
        let second = batcher.build(q.drain(), &RenderState::default());

        assert_eq!(first[0].id, BatchId::new(0));
        assert_eq!(first[1].id, BatchId::new(1));
        assert_eq!(second[0].id, BatchId::new(2));
    }

    // ── effective descriptor ──────────────────────────────────────────────

    #[test]
    fn mesh_override_matching_bound_shader_batches_with_default() {
        let mut table = HandleTable::new();
        let a = shader("a");
        let mesh = triangle(Some(&a));
        let mut q = SubmissionQueue::new();
        q.push_mesh(table.acquire(&mesh), Mat4::IDENTITY, None);
        q.push_mesh(table.acquire(&mesh), Mat4::IDENTITY, Some(table.acquire(&a)));

        assert_eq!(sizes(&build(&mut q, &RenderState::default())), vec![2]);
    }

    #[test]
    fn mesh_override_with_other_shader_splits() {
        let mut table = HandleTable::new();
        let (a, b) = (shader("a"), shader("b"));
        let mesh = triangle(Some(&a));
        let mut q = SubmissionQueue::new();
        q.push_mesh(table.acquire(&mesh), Mat4::IDENTITY, None);
        q.push_mesh(table.acquire(&mesh), Mat4::IDENTITY, Some(table.acquire(&b)));

        let batches = build(&mut q, &RenderState::default());
        assert_eq!(sizes(&batches), vec![1, 1]);
        assert_eq!(batches[1].descriptor.shader_id(), Some(b.id()));
    }

    #[test]
    fn wireframe_applies_to_quads_and_meshes_only() {
        let mut table = HandleTable::new();
        let a = shader("a");
        let state = RenderState {
            line_rendering: true,
            line_thickness: 3.0,
            ..RenderState::default()
        };
        let mut q = SubmissionQueue::new();
        q.push_quad(table.acquire(&a));
        q.push_line(red_line(1.0));

        let batches = build(&mut q, &state);
        assert_eq!(batches[0].descriptor.polygon_mode, PolygonMode::Line);
        assert_eq!(batches[0].descriptor.line_thickness, Some(3.0));
        assert_eq!(batches[1].descriptor.polygon_mode, PolygonMode::Fill);
        assert_eq!(batches[1].descriptor.line_thickness, Some(1.0));
    }

    #[test]
    fn explicit_pipeline_thickness_wins_over_global() {
        let mut table = HandleTable::new();
        let a = shader("a");
        let state = RenderState {
            line_rendering: true,
            line_thickness: 3.0,
            ..RenderState::default()
        };
        let mut q = SubmissionQueue::new();
        q.set_pipeline(Some(Arc::new(PipelineDescriptor::new().with_line_thickness(6.0))));
        q.push_quad(table.acquire(&a));

        let batches = build(&mut q, &state);
        assert_eq!(batches[0].descriptor.line_thickness, Some(6.0));
    }

    #[test]
    fn lines_use_pipeline_shader() {
        let a = shader("a");
        let mut q = SubmissionQueue::new();
        q.push_line(red_line(1.0));
        q.set_pipeline(Some(Arc::new(PipelineDescriptor::new().with_shader(&a))));
        q.push_line(red_line(1.0));

        let batches = build(&mut q, &RenderState::default());
        assert_eq!(batches[0].descriptor.shader_id(), None);
        assert_eq!(batches[1].descriptor.shader_id(), Some(a.id()));
        assert_eq!(batches[1].descriptor.topology, Topology::LineList);
    }
}
