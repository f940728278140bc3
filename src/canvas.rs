//! Display list of filled rectangles
//!
//! Games paint into a `Canvas` in canvas pixels (origin top-left, y down).
//! The renderer turns the list into triangles; nothing here touches the GPU.

/// Linear RGBA color
pub type Rgba = [f32; 4];

/// Convert a 0xRRGGBB literal to an opaque color
pub const fn hex(rgb: u32) -> Rgba {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
        1.0,
    ]
}

/// Colors used by the games
pub mod palette {
    use super::{Rgba, hex};

    pub const BLACK: Rgba = hex(0x000000);
    pub const GREEN: Rgba = hex(0x00ff00);
    pub const RED: Rgba = hex(0xff0000);
    pub const ORANGE: Rgba = hex(0xff6600);
    pub const YELLOW: Rgba = hex(0xffff00);
    pub const GRID: Rgba = hex(0x333333);
    /// Surface area outside the letterboxed canvas
    pub const CABINET: Rgba = [0.02, 0.02, 0.05, 1.0];
}

/// A filled, axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilledRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub color: Rgba,
}

/// One frame worth of drawing for a game
#[derive(Debug, Clone)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
    pub background: Rgba,
    rects: Vec<FilledRect>,
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            background: palette::BLACK,
            rects: Vec::with_capacity(256),
        }
    }

    /// Drop everything drawn so far and set the background
    pub fn clear(&mut self, color: Rgba) {
        self.background = color;
        self.rects.clear();
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        self.rects.push(FilledRect { x, y, w, h, color });
    }

    /// 1 px horizontal line from x0 to x1
    pub fn hline(&mut self, x0: f32, x1: f32, y: f32, color: Rgba) {
        self.fill_rect(x0.min(x1), y - 0.5, (x1 - x0).abs(), 1.0, color);
    }

    /// 1 px vertical line from y0 to y1
    pub fn vline(&mut self, x: f32, y0: f32, y1: f32, color: Rgba) {
        self.fill_rect(x - 0.5, y0.min(y1), 1.0, (y1 - y0).abs(), color);
    }

    /// Dashed vertical line: `dash` px drawn, `gap` px skipped, starting at y0
    pub fn dashed_vline(&mut self, x: f32, y0: f32, y1: f32, dash: f32, gap: f32, color: Rgba) {
        let period = dash + gap;
        if period <= 0.0 {
            return;
        }
        let mut y = y0;
        while y < y1 {
            let end = (y + dash).min(y1);
            self.vline(x, y, end, color);
            y += period;
        }
    }

    pub fn rects(&self) -> &[FilledRect] {
        &self.rects
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_channels() {
        assert_eq!(hex(0xff6600), [1.0, 0.4, 0.0, 1.0]);
        assert_eq!(palette::BLACK, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_degenerate_rects_skipped() {
        let mut canvas = Canvas::new(100.0, 100.0);
        canvas.fill_rect(0.0, 0.0, 0.0, 10.0, palette::GREEN);
        canvas.fill_rect(0.0, 0.0, 10.0, -1.0, palette::GREEN);
        assert!(canvas.is_empty());
    }

    #[test]
    fn test_dashed_line_segments() {
        let mut canvas = Canvas::new(600.0, 400.0);
        canvas.dashed_vline(300.0, 0.0, 400.0, 5.0, 15.0, palette::GREEN);
        // 400 / (5 + 15) dashes
        assert_eq!(canvas.rects().len(), 20);
        assert!(canvas.rects().iter().all(|r| r.h == 5.0 && r.w == 1.0));
    }

    #[test]
    fn test_clear_resets() {
        let mut canvas = Canvas::new(10.0, 10.0);
        canvas.fill_rect(1.0, 1.0, 2.0, 2.0, palette::RED);
        canvas.clear(palette::GRID);
        assert!(canvas.is_empty());
        assert_eq!(canvas.background, palette::GRID);
    }
}
