//! QR code encoding for card verification links.
//!
//! Codes are always encoded at error-correction level H (~30% damage
//! tolerance) with no quiet zone; the card layout provides the margin. The
//! module matrix is rendered two ways: as an SVG for the interactive tree and
//! rasterized by module sampling for pixel output, so every module edge lands
//! on a pixel boundary at any DPI.

use image::RgbaImage;
use qrcode::{Color as QrColor, EcLevel, QrCode};

use super::paint::{Rect, fill_rect};
use crate::error::LanyardError;
use crate::template::Color;

/// An encoded QR symbol as a square grid of modules.
#[derive(Debug, Clone, PartialEq)]
pub struct QrMatrix {
    width: usize,
    modules: Vec<bool>,
}

/// Encode `data` at error-correction level H.
pub fn encode(data: &str) -> Result<QrMatrix, LanyardError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::H)
        .map_err(|e| LanyardError::Qr(format!("QR code generation failed: {}", e)))?;
    let width = code.width();
    let modules = code
        .to_colors()
        .into_iter()
        .map(|c| c == QrColor::Dark)
        .collect();
    Ok(QrMatrix { width, modules })
}

impl QrMatrix {
    /// Modules per side.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.modules[y * self.width + x]
    }

    /// Scalable SVG, one unit per module, filling its container.
    pub fn to_svg(&self, dark: Color, light: Color) -> String {
        let n = self.width;
        let mut path = String::new();
        for y in 0..n {
            let mut x = 0;
            while x < n {
                if !self.is_dark(x, y) {
                    x += 1;
                    continue;
                }
                // Merge horizontal runs into one subpath.
                let start = x;
                while x < n && self.is_dark(x, y) {
                    x += 1;
                }
                path.push_str(&format!("M{} {}h{}v1h-{}z", start, y, x - start, x - start));
            }
        }
        format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {n} {n}" "#,
                r#"width="100%" height="100%" shape-rendering="crispEdges">"#,
                r#"<rect width="{n}" height="{n}" fill="{light}"/>"#,
                r#"<path fill="{dark}" d="{path}"/></svg>"#
            ),
            n = n,
            light = light.to_css(),
            dark = dark.to_css(),
            path = path,
        )
    }

    /// Rasterize into `img` as a `size` x `size` pixel square at (x, y).
    ///
    /// Each pixel takes the module under its center, so modules differ by at
    /// most one pixel in size when `size` is not a multiple of the width.
    pub fn draw(&self, img: &mut RgbaImage, x: f32, y: f32, size: f32, dark: Color, light: Color) {
        let n = self.width;
        if n == 0 || size < 1.0 {
            return;
        }
        fill_rect(img, Rect::new(x, y, size, size), light);

        let x0 = x.round() as i64;
        let y0 = y.round() as i64;
        let side = size.round() as i64;
        for py in 0..side {
            let my = ((py as f32 + 0.5) * n as f32 / side as f32) as usize;
            for px in 0..side {
                let mx = ((px as f32 + 0.5) * n as f32 / side as f32) as usize;
                if !self.is_dark(mx, my) {
                    continue;
                }
                let (ix, iy) = (x0 + px, y0 + py);
                if ix >= 0 && iy >= 0 && (ix as u32) < img.width() && (iy as u32) < img.height() {
                    super::paint::blend_pixel(img, ix as u32, iy as u32, dark, 1.0);
                }
            }
        }
    }
}
