//! Canvas display list to triangle list
//!
//! Rectangles arrive in canvas pixels and leave as NDC vertices, letterboxed
//! into the surface so the game keeps its aspect ratio.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::canvas::{Canvas, FilledRect, Rgba};

/// 2D vertex with position (NDC) and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: Rgba) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Where the canvas lands on the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    surface: Vec2,
    /// Canvas pixels to surface pixels
    scale: f32,
    /// Top-left corner of the canvas on the surface (surface pixels)
    offset: Vec2,
}

impl Viewport {
    /// Fit `canvas` inside `surface`, centred, preserving aspect ratio
    pub fn letterbox(surface: (u32, u32), canvas: (f32, f32)) -> Self {
        let surface = Vec2::new(surface.0.max(1) as f32, surface.1.max(1) as f32);
        let canvas = Vec2::new(canvas.0.max(1.0), canvas.1.max(1.0));
        let scale = (surface.x / canvas.x).min(surface.y / canvas.y);
        let offset = (surface - canvas * scale) * 0.5;
        Self {
            surface,
            scale,
            offset,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Canvas pixel to normalized device coordinates (y up)
    pub fn to_ndc(&self, p: Vec2) -> Vec2 {
        let px = self.offset + p * self.scale;
        Vec2::new(
            px.x / self.surface.x * 2.0 - 1.0,
            1.0 - px.y / self.surface.y * 2.0,
        )
    }

    fn push_rect(&self, out: &mut Vec<Vertex>, rect: &FilledRect) {
        let tl = self.to_ndc(Vec2::new(rect.x, rect.y));
        let br = self.to_ndc(Vec2::new(rect.x + rect.w, rect.y + rect.h));
        let c = rect.color;

        out.push(Vertex::new(tl.x, tl.y, c));
        out.push(Vertex::new(tl.x, br.y, c));
        out.push(Vertex::new(br.x, tl.y, c));

        out.push(Vertex::new(br.x, tl.y, c));
        out.push(Vertex::new(tl.x, br.y, c));
        out.push(Vertex::new(br.x, br.y, c));
    }
}

/// Background first, then every rectangle in draw order
pub fn tessellate(canvas: &Canvas, viewport: &Viewport) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((canvas.rects().len() + 1) * 6);
    let background = FilledRect {
        x: 0.0,
        y: 0.0,
        w: canvas.width,
        h: canvas.height,
        color: canvas.background,
    };
    viewport.push_rect(&mut vertices, &background);
    for rect in canvas.rects() {
        viewport.push_rect(&mut vertices, rect);
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::palette;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_exact_fit_maps_corners() {
        let vp = Viewport::letterbox((600, 400), (600.0, 400.0));
        assert!(approx(vp.to_ndc(Vec2::ZERO), Vec2::new(-1.0, 1.0)));
        assert!(approx(vp.to_ndc(Vec2::new(600.0, 400.0)), Vec2::new(1.0, -1.0)));
        assert!(approx(vp.to_ndc(Vec2::new(300.0, 200.0)), Vec2::ZERO));
    }

    #[test]
    fn test_wide_surface_pillarboxes() {
        // 400x400 canvas on an 800x400 surface: bars left and right
        let vp = Viewport::letterbox((800, 400), (400.0, 400.0));
        assert_eq!(vp.scale(), 1.0);
        assert!(approx(vp.to_ndc(Vec2::ZERO), Vec2::new(-0.5, 1.0)));
        assert!(approx(vp.to_ndc(Vec2::new(400.0, 400.0)), Vec2::new(0.5, -1.0)));
    }

    #[test]
    fn test_tall_surface_letterboxes() {
        let vp = Viewport::letterbox((600, 800), (600.0, 400.0));
        assert!(approx(vp.to_ndc(Vec2::ZERO), Vec2::new(-1.0, 0.5)));
    }

    #[test]
    fn test_zero_surface_does_not_divide_by_zero() {
        let vp = Viewport::letterbox((0, 0), (600.0, 400.0));
        assert!(vp.to_ndc(Vec2::new(10.0, 10.0)).is_finite());
    }

    #[test]
    fn test_tessellate_two_triangles_per_rect() {
        let mut canvas = Canvas::new(200.0, 400.0);
        canvas.fill_rect(0.0, 0.0, 100.0, 200.0, palette::RED);
        canvas.fill_rect(10.0, 10.0, 5.0, 5.0, palette::GREEN);
        let vp = Viewport::letterbox((200, 400), (200.0, 400.0));
        let verts = tessellate(&canvas, &vp);
        assert_eq!(verts.len(), 18);
        // Background comes first and covers the full canvas
        assert_eq!(verts[0].color, palette::BLACK);
        assert_eq!(verts[0].position, [-1.0, 1.0]);
        // Red rect covers the top-left quadrant
        let red: Vec<_> = verts[6..12].iter().map(|v| v.position).collect();
        assert!(red.contains(&[0.0, 0.0]));
        assert!(red.iter().all(|p| p[0] <= 0.0 && p[1] >= 0.0));
    }
}
