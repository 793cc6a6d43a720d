//! Pixel-level drawing primitives for the raster target.
//!
//! All primitives composite source-over onto a straight-alpha RGBA buffer and
//! clip to the buffer bounds. Coordinates are device pixels as `f32`; edges
//! are rounded to the nearest pixel except for circles, which are
//! anti-aliased.

use image::{Rgba, RgbaImage};

use crate::template::Color;

/// Axis-aligned rectangle in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Integer bounds `(x0, y0, x1, y1)`, half-open, clipped to `w` x `h`.
    fn clipped(&self, w: u32, h: u32) -> Option<(u32, u32, u32, u32)> {
        let x0 = self.x.round().max(0.0);
        let y0 = self.y.round().max(0.0);
        let x1 = (self.x + self.width).round().min(w as f32);
        let y1 = (self.y + self.height).round().min(h as f32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}

/// Composite `color` over the pixel at (x, y) with extra `coverage` (0..=1).
#[inline]
pub fn blend_pixel(img: &mut RgbaImage, x: u32, y: u32, color: Color, coverage: f32) {
    if x >= img.width() || y >= img.height() {
        return;
    }
    let sa = (color.a as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let dst = img.get_pixel_mut(x, y);
    if sa >= 1.0 {
        *dst = Rgba([color.r, color.g, color.b, 255]);
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let mix = |s: u8, d: u8| -> u8 {
        let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    *dst = Rgba([
        mix(color.r, dst[0]),
        mix(color.g, dst[1]),
        mix(color.b, dst[2]),
        (out_a * 255.0).round() as u8,
    ]);
}

/// Fill a rectangle.
pub fn fill_rect(img: &mut RgbaImage, rect: Rect, color: Color) {
    let Some((x0, y0, x1, y1)) = rect.clipped(img.width(), img.height()) else {
        return;
    };
    for y in y0..y1 {
        for x in x0..x1 {
            blend_pixel(img, x, y, color, 1.0);
        }
    }
}

/// Stroke a rectangle outline of `line_width`, centered on the edges.
pub fn stroke_rect(img: &mut RgbaImage, rect: Rect, color: Color, line_width: f32) {
    if line_width <= 0.0 {
        return;
    }
    let half = line_width / 2.0;
    let outer_w = rect.width + line_width;
    // top, bottom
    fill_rect(img, Rect::new(rect.x - half, rect.y - half, outer_w, line_width), color);
    fill_rect(
        img,
        Rect::new(rect.x - half, rect.y + rect.height - half, outer_w, line_width),
        color,
    );
    // left, right (between the horizontal bands so corners are not blended twice)
    let inner_h = rect.height - line_width;
    if inner_h > 0.0 {
        fill_rect(img, Rect::new(rect.x - half, rect.y + half, line_width, inner_h), color);
        fill_rect(
            img,
            Rect::new(rect.x + rect.width - half, rect.y + half, line_width, inner_h),
            color,
        );
    }
}

/// Fill a disc centered at (cx, cy), anti-aliased on the rim.
pub fn fill_circle(img: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Color) {
    if radius <= 0.0 {
        return;
    }
    let x0 = (cx - radius - 1.0).floor().max(0.0) as u32;
    let y0 = (cy - radius - 1.0).floor().max(0.0) as u32;
    let x1 = ((cx + radius + 1.0).ceil().max(0.0) as u32).min(img.width());
    let y1 = ((cy + radius + 1.0).ceil().max(0.0) as u32).min(img.height());
    for y in y0..y1 {
        for x in x0..x1 {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let d = (dx * dx + dy * dy).sqrt();
            let coverage = (radius - d + 0.5).clamp(0.0, 1.0);
            if coverage > 0.0 {
                blend_pixel(img, x, y, color, coverage);
            }
        }
    }
}

/// Stroke a horizontal segment of `length` starting at (x, y).
pub fn hline(img: &mut RgbaImage, x: f32, y: f32, length: f32, color: Color, line_width: f32) {
    if line_width <= 0.0 || length <= 0.0 {
        return;
    }
    fill_rect(img, Rect::new(x, y - line_width / 2.0, length, line_width), color);
}

/// Composite a bitmap with its top-left at (x, y).
pub fn draw_bitmap(img: &mut RgbaImage, bitmap: &RgbaImage, x: f32, y: f32) {
    image::imageops::overlay(img, bitmap, x.round() as i64, y.round() as i64);
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    fn white(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]))
    }

    #[test]
    fn test_fill_rect_covers_exact_area() {
        let mut img = white(10, 10);
        fill_rect(&mut img, Rect::new(2.0, 3.0, 4.0, 2.0), RED);
        assert_eq!(img.get_pixel(2, 3), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(5, 4), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(6, 4), &Rgba([255, 255, 255, 255]));
        assert_eq!(img.get_pixel(2, 5), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut img = white(4, 4);
        fill_rect(&mut img, Rect::new(-10.0, -10.0, 100.0, 100.0), BLUE);
        assert!(img.pixels().all(|p| *p == Rgba([0, 0, 255, 255])));
    }

    #[test]
    fn test_half_opacity_blends() {
        let mut img = white(1, 1);
        blend_pixel(&mut img, 0, 0, Color::BLACK.with_opacity(0.5), 1.0);
        let p = img.get_pixel(0, 0);
        assert!((p[0] as i32 - 127).abs() <= 1, "{:?}", p);
        assert_eq!(p[3], 255);
    }

    #[test]
    fn test_later_fill_wins() {
        let mut img = white(10, 10);
        fill_rect(&mut img, Rect::new(0.0, 0.0, 6.0, 6.0), RED);
        fill_rect(&mut img, Rect::new(4.0, 4.0, 6.0, 6.0), BLUE);
        assert_eq!(img.get_pixel(5, 5), &Rgba([0, 0, 255, 255]));
        assert_eq!(img.get_pixel(1, 1), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_stroke_leaves_interior() {
        let mut img = white(20, 20);
        stroke_rect(&mut img, Rect::new(5.0, 5.0, 10.0, 10.0), RED, 2.0);
        assert_eq!(img.get_pixel(5, 10), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(10, 10), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_circle_center_and_outside() {
        let mut img = white(20, 20);
        fill_circle(&mut img, 10.0, 10.0, 5.0, RED);
        assert_eq!(img.get_pixel(10, 10), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(img.get_pixel(18, 10), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_hline() {
        let mut img = white(10, 10);
        hline(&mut img, 1.0, 5.0, 8.0, BLUE, 2.0);
        assert_eq!(img.get_pixel(1, 4), &Rgba([0, 0, 255, 255]));
        assert_eq!(img.get_pixel(8, 5), &Rgba([0, 0, 255, 255]));
        assert_eq!(img.get_pixel(9, 5), &Rgba([255, 255, 255, 255]));
        assert_eq!(img.get_pixel(5, 7), &Rgba([255, 255, 255, 255]));
    }
}
