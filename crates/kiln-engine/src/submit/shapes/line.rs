use glam::{Vec3, Vec4};

use crate::submit::{DrawRequest, SubmissionQueue};

/// Single line segment.
///
/// Lines reference no resources; they are drawn with the active pipeline's
/// shader, or the backend's built-in line shader when there is none.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LineRequest {
    pub from: Vec3,
    pub to: Vec3,
    pub color: Vec4,
    pub thickness: f32,
}

impl LineRequest {
    /// Transparent black, one unit thick.
    #[inline]
    pub fn new(from: Vec3, to: Vec3) -> Self {
        Self {
            from,
            to,
            color: Vec4::ZERO,
            thickness: 1.0,
        }
    }

    #[inline]
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    #[inline]
    pub fn with_thickness(mut self, thickness: f32) -> Self {
        self.thickness = thickness;
        self
    }
}

impl SubmissionQueue {
    /// Records a line draw request.
    #[inline]
    pub fn push_line(&mut self, line: LineRequest) {
        self.push(DrawRequest::Line(line));
    }
}
