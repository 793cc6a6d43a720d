//! Text measurement, word wrap and glyph drawing for raster output.
//!
//! Fonts come from the system via `fontdb` (a sans-serif face, regular and
//! bold) and are rasterized with `ab_glyph`. When no system font is available
//! the Spleen 12x24 bitmap font is used instead, scaled nearest-neighbor, so
//! rendering never fails for lack of fonts.
//!
//! Sizes are device pixels: the raster target converts CSS font sizes at the
//! render DPI before calling in here.

use std::sync::OnceLock;

use ab_glyph::{Font, FontArc, FontVec, PxScale, ScaleFont, point};
use image::RgbaImage;
use spleen_font::{FONT_12X24, PSF2Font};
use tracing::{debug, warn};

use super::paint::blend_pixel;
use crate::template::{Color, FontWeight, TextAlign};

/// Line advance as a multiple of the font size.
pub const LINE_HEIGHT: f32 = 1.2;

const BITMAP_W: usize = 12;
const BITMAP_H: usize = 24;

static SHARED: OnceLock<FontBook> = OnceLock::new();

#[derive(Clone)]
enum Face {
    Outline(FontArc),
    Bitmap,
}

/// Regular and bold faces used for card text.
#[derive(Clone)]
pub struct FontBook {
    regular: Face,
    bold: Face,
    /// Bold is emulated by drawing the regular face twice.
    synthetic_bold: bool,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("bitmap", &self.is_bitmap())
            .field("synthetic_bold", &self.synthetic_bold)
            .finish()
    }
}

impl FontBook {
    /// Load a sans-serif system font, falling back to the bitmap font.
    pub fn system() -> Self {
        use fontdb::{Database, Family, Query, Stretch, Style, Weight};

        let mut db = Database::new();
        db.load_system_fonts();

        let load = |weight: Weight| -> Option<FontArc> {
            let id = db.query(&Query {
                families: &[
                    Family::Name("Arial"),
                    Family::Name("Helvetica"),
                    Family::Name("DejaVu Sans"),
                    Family::SansSerif,
                ],
                weight,
                stretch: Stretch::Normal,
                style: Style::Normal,
            })?;
            db.with_face_data(id, |data, index| {
                FontVec::try_from_vec_and_index(data.to_vec(), index)
                    .ok()
                    .map(FontArc::new)
            })
            .flatten()
        };

        let Some(regular) = load(Weight::NORMAL) else {
            warn!("no system sans-serif font found, using bitmap font");
            return Self::bitmap();
        };
        match load(Weight::BOLD) {
            Some(bold) => Self {
                regular: Face::Outline(regular),
                bold: Face::Outline(bold),
                synthetic_bold: false,
            },
            None => {
                debug!("no bold system face, emulating bold");
                Self {
                    regular: Face::Outline(regular.clone()),
                    bold: Face::Outline(regular),
                    synthetic_bold: true,
                }
            }
        }
    }

    /// The built-in bitmap font only. Metrics are fixed (advance = size / 2),
    /// which keeps layout identical on every machine.
    pub fn bitmap() -> Self {
        Self {
            regular: Face::Bitmap,
            bold: Face::Bitmap,
            synthetic_bold: true,
        }
    }

    /// Process-wide font book, loaded on first use.
    pub fn shared() -> &'static FontBook {
        SHARED.get_or_init(Self::system)
    }

    pub fn is_bitmap(&self) -> bool {
        matches!(self.regular, Face::Bitmap)
    }

    /// A face at `px` device pixels.
    pub fn face(&self, weight: FontWeight, px: f32) -> FontFace<'_> {
        let (face, double) = match weight {
            FontWeight::Normal => (&self.regular, false),
            FontWeight::Bold => (&self.bold, self.synthetic_bold),
        };
        FontFace { face, px, double }
    }
}

/// A face bound to a size.
pub struct FontFace<'a> {
    face: &'a Face,
    px: f32,
    double: bool,
}

impl FontFace<'_> {
    pub fn size(&self) -> f32 {
        self.px
    }

    /// Advance width of `text` in pixels.
    pub fn measure(&self, text: &str) -> f32 {
        let extra = if self.double && !text.is_empty() { 1.0 } else { 0.0 };
        match self.face {
            Face::Bitmap => text.chars().count() as f32 * self.px * 0.5 + extra,
            Face::Outline(font) => {
                let scaled = font.as_scaled(outline_scale(font, self.px));
                let mut width = 0.0;
                let mut prev = None;
                for ch in text.chars() {
                    let id = scaled.glyph_id(ch);
                    if let Some(p) = prev {
                        width += scaled.kern(p, id);
                    }
                    width += scaled.h_advance(id);
                    prev = Some(id);
                }
                width + extra
            }
        }
    }

    /// Draw one line with its top-left corner at (x, y).
    pub fn draw(&self, img: &mut RgbaImage, text: &str, x: f32, y: f32, color: Color) {
        self.draw_once(img, text, x, y, color);
        if self.double {
            self.draw_once(img, text, x + 1.0, y, color);
        }
    }

    fn draw_once(&self, img: &mut RgbaImage, text: &str, x: f32, y: f32, color: Color) {
        match self.face {
            Face::Bitmap => draw_bitmap_text(img, text, x, y, self.px, color),
            Face::Outline(font) => {
                let scale = outline_scale(font, self.px);
                let scaled = font.as_scaled(scale);
                let baseline = y + scaled.ascent();
                let mut caret = x;
                let mut prev = None;
                for ch in text.chars() {
                    let id = scaled.glyph_id(ch);
                    if let Some(p) = prev {
                        caret += scaled.kern(p, id);
                    }
                    let glyph = id.with_scale_and_position(scale, point(caret, baseline));
                    caret += scaled.h_advance(id);
                    prev = Some(id);

                    let Some(outlined) = font.outline_glyph(glyph) else {
                        continue;
                    };
                    let bounds = outlined.px_bounds();
                    outlined.draw(|gx, gy, coverage| {
                        let px = bounds.min.x as i32 + gx as i32;
                        let py = bounds.min.y as i32 + gy as i32;
                        if px >= 0 && py >= 0 {
                            blend_pixel(img, px as u32, py as u32, color, coverage);
                        }
                    });
                }
            }
        }
    }
}

/// `ab_glyph` scales by ascent-to-descent height; CSS sizes are em sizes.
fn outline_scale(font: &FontArc, px: f32) -> PxScale {
    let upem = font.units_per_em().unwrap_or(1000.0);
    PxScale::from(px * font.height_unscaled() / upem)
}

fn draw_bitmap_text(img: &mut RgbaImage, text: &str, x: f32, y: f32, px: f32, color: Color) {
    let Ok(mut font) = PSF2Font::new(FONT_12X24) else {
        return;
    };
    let scale = px / BITMAP_H as f32;
    if scale <= 0.0 {
        return;
    }
    let cell_w = (BITMAP_W as f32 * scale).ceil() as i64;
    let cell_h = (BITMAP_H as f32 * scale).ceil() as i64;
    let top = y.round() as i64;

    for (i, ch) in text.chars().enumerate() {
        let utf8 = ch.to_string();
        let Some(glyph) = font.glyph_for_utf8(utf8.as_bytes()) else {
            continue;
        };
        let rows: Vec<Vec<bool>> = glyph.map(|row| row.collect()).collect();
        let left = (x + i as f32 * px * 0.5).round() as i64;
        for ty in 0..cell_h {
            let sy = ((ty as f32 / scale) as usize).min(BITMAP_H - 1);
            let Some(row) = rows.get(sy) else { continue };
            for tx in 0..cell_w {
                let sx = ((tx as f32 / scale) as usize).min(BITMAP_W - 1);
                if row.get(sx).copied().unwrap_or(false) {
                    let (ix, iy) = (left + tx, top + ty);
                    if ix >= 0 && iy >= 0 {
                        blend_pixel(img, ix as u32, iy as u32, color, 1.0);
                    }
                }
            }
        }
    }
}

/// Greedy word wrap.
///
/// Words are split on single spaces and added to the current line while the
/// line still fits `max_width`. A word that does not fit starts a new line;
/// words are never split, so a single long word may overflow.
pub fn wrap_words(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split(' ') {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", line, word)
        };
        if measure(&candidate) > max_width && !line.is_empty() {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// A line of text positioned in device pixels (top-left corner).
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
}

/// Break and position `text` for a box at (x, y).
///
/// With a `width`, lines wrap to it and advance by `size * 1.2`. Alignment
/// anchors at the box's left edge, center or right edge. Without a width the
/// text is a single line anchored at `x`.
pub fn layout_text(
    face: &FontFace<'_>,
    text: &str,
    x: f32,
    y: f32,
    width: Option<f32>,
    align: TextAlign,
) -> Vec<PlacedLine> {
    let box_w = width.unwrap_or(0.0);
    let anchor = match align {
        TextAlign::Left => x,
        TextAlign::Center => x + box_w / 2.0,
        TextAlign::Right => x + box_w,
    };

    let lines = match width {
        Some(w) => wrap_words(text, w, |s| face.measure(s)),
        None if text.is_empty() => Vec::new(),
        None => vec![text.to_string()],
    };

    let advance = face.size() * LINE_HEIGHT;
    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let w = face.measure(&line);
            let left = match align {
                TextAlign::Left => anchor,
                TextAlign::Center => anchor - w / 2.0,
                TextAlign::Right => anchor - w,
            };
            PlacedLine {
                text: line,
                x: left,
                y: y + i as f32 * advance,
                width: w,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use pretty_assertions::assert_eq;

    fn chars(s: &str) -> f32 {
        s.chars().count() as f32
    }

    #[test]
    fn test_wrap_greedy() {
        let lines = wrap_words("the quick brown fox", 9.0, chars);
        assert_eq!(lines, vec!["the quick", "brown fox"]);
    }

    #[test]
    fn test_wrap_long_word_not_split() {
        let lines = wrap_words("SECURITY GUARD", 3.0, chars);
        assert_eq!(lines, vec!["SECURITY", "GUARD"]);
    }

    #[test]
    fn test_wrap_fits_on_one_line() {
        assert_eq!(wrap_words("John Doe", 100.0, chars), vec!["John Doe"]);
        assert!(wrap_words("", 10.0, chars).is_empty());
    }

    #[test]
    fn test_bitmap_metrics() {
        let book = FontBook::bitmap();
        let face = book.face(FontWeight::Normal, 12.0);
        assert_eq!(face.measure("ABC"), 18.0);
        assert_eq!(face.measure(""), 0.0);
        // Synthetic bold is one pixel wider.
        assert_eq!(book.face(FontWeight::Bold, 12.0).measure("ABC"), 19.0);
    }

    #[test]
    fn test_layout_alignment() {
        let book = FontBook::bitmap();
        let face = book.face(FontWeight::Normal, 12.0);

        let left = layout_text(&face, "AB", 10.0, 5.0, Some(100.0), TextAlign::Left);
        assert_eq!(left[0].x, 10.0);
        let center = layout_text(&face, "AB", 10.0, 5.0, Some(100.0), TextAlign::Center);
        assert_eq!(center[0].x, 60.0 - 6.0);
        let right = layout_text(&face, "AB", 10.0, 5.0, Some(100.0), TextAlign::Right);
        assert_eq!(right[0].x, 110.0 - 12.0);
    }

    #[test]
    fn test_layout_line_advance() {
        let book = FontBook::bitmap();
        let face = book.face(FontWeight::Normal, 10.0);
        let lines = layout_text(&face, "SECURITY GUARD", 0.0, 2.0, Some(15.0), TextAlign::Left);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].y, 2.0);
        assert_eq!(lines[1].y, 14.0);
    }

    #[test]
    fn test_layout_without_width_is_single_line() {
        let book = FontBook::bitmap();
        let face = book.face(FontWeight::Normal, 12.0);
        let lines = layout_text(&face, "SECURITY GUARD", 4.0, 0.0, None, TextAlign::Left);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "SECURITY GUARD");
        assert_eq!(lines[0].x, 4.0);
    }

    #[test]
    fn test_bitmap_draws_ink() {
        let book = FontBook::bitmap();
        let face = book.face(FontWeight::Normal, 24.0);
        let mut img = RgbaImage::from_pixel(40, 30, Rgba([255, 255, 255, 255]));
        face.draw(&mut img, "H", 0.0, 0.0, Color::BLACK);
        assert!(img.pixels().any(|p| *p == Rgba([0, 0, 0, 255])));
        // Nothing drawn past the glyph cell.
        assert!((13..40).all(|x| (0..30).all(|y| *img.get_pixel(x, y) == Rgba([255, 255, 255, 255]))));
    }
}
