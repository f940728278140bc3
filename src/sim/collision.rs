//! Axis-aligned collision tests
//!
//! Every game on the cabinet is built from rectangles, so a single AABB type
//! covers bricks, paddles, invaders and bullets. The three tests differ in
//! edge handling and each game uses the one its rules call for.

use glam::Vec2;

/// Axis-aligned bounding box in canvas pixels (top-left + size)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn from_pos(pos: Vec2, size: Vec2) -> Self {
        Self { min: pos, size }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Strict overlap: touching edges do not count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        self.min.x < b_max.x
            && a_max.x > other.min.x
            && self.min.y < b_max.y
            && a_max.y > other.min.y
    }

    /// Inclusive point test: points on the border are inside
    pub fn contains_point(&self, p: Vec2) -> bool {
        let max = self.max();
        p.x >= self.min.x && p.x <= max.x && p.y >= self.min.y && p.y <= max.y
    }

    /// Inclusive vertical span test
    pub fn spans_y(&self, y: f32) -> bool {
        y >= self.min.y && y <= self.max().y
    }

    /// Inclusive horizontal span test
    pub fn spans_x(&self, x: f32) -> bool {
        x >= self.min.x && x <= self.max().x
    }
}

/// Clamp the leading edge of an entity of `size` so it stays inside `[0, extent]`
#[inline]
pub fn clamp_span(pos: f32, size: f32, extent: f32) -> f32 {
    pos.clamp(0.0, (extent - size).max(0.0))
}
