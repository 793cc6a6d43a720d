//! # Coordinate Mapping
//!
//! Element geometry is authored once, in inches. This module maps it into the
//! two spaces the render targets work in:
//!
//! - **Percent of card** for the interactive tree, so the design scales with
//!   whatever container displays it.
//! - **Device pixels** at a chosen DPI for raster output.
//!
//! ```text
//! left%  = x / card_width  * 100        px = inches * dpi
//! top%   = y / card_height * 100
//! ```
//!
//! ## Example
//!
//! ```
//! use lanyard::geometry::InchBox;
//!
//! let b = InchBox { x: 0.5, y: 0.25, width: Some(1.0), height: None };
//! let pct = b.to_percent(2.0, 1.0);
//! assert_eq!(pct.left, 25.0);
//! assert_eq!(pct.top, 25.0);
//! assert_eq!(pct.width, Some(50.0));
//!
//! let px = b.to_pixels(300.0);
//! assert_eq!(px.x, 150.0);
//! ```

use serde::Serialize;

use crate::error::LanyardError;

/// Box in inches, relative to the card's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InchBox {
    pub x: f32,
    pub y: f32,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

/// Box in percent of the card's width (horizontal) and height (vertical).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentBox {
    pub left: f32,
    pub top: f32,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

/// Box in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelBox {
    pub x: f32,
    pub y: f32,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

/// Convert a length in inches to pixels.
#[inline]
pub fn inches_to_px(inches: f32, dpi: f32) -> f32 {
    inches * dpi
}

/// Convert a length in CSS pixels (1/96 inch) to pixels at `dpi`.
///
/// Font sizes and stroke widths are authored in CSS pixels.
#[inline]
pub fn css_px_to_px(css_px: f32, dpi: f32) -> f32 {
    css_px * dpi / crate::config::SCREEN_DPI
}

/// Longest raster side, in pixels.
pub const MAX_RASTER_SIDE: u32 = 16_384;

/// Largest raster area, in pixels (128 MiB of RGBA).
pub const MAX_RASTER_PIXELS: u64 = 32 * 1024 * 1024;

/// Whether a `width` x `height` pixel buffer fits the raster limits.
pub fn within_raster_limits(width: f64, height: f64) -> bool {
    width.is_finite()
        && height.is_finite()
        && width <= MAX_RASTER_SIDE as f64
        && height <= MAX_RASTER_SIDE as f64
        && width * height <= MAX_RASTER_PIXELS as f64
}

fn raw_pixel_size(width_in: f32, height_in: f32, dpi: f32) -> (f64, f64) {
    let w = (width_in as f64 * dpi as f64).round().max(1.0);
    let h = (height_in as f64 * dpi as f64).round().max(1.0);
    (w, h)
}

/// Card size in whole pixels (at least 1x1).
///
/// Sizes past the raster limits are scaled down to fit, keeping the aspect
/// ratio as far as whole pixels allow. Use [`raster_size`] to reject them
/// instead.
pub fn card_pixel_size(width_in: f32, height_in: f32, dpi: f32) -> (u32, u32) {
    let (w, h) = raw_pixel_size(width_in, height_in, dpi);
    let side = MAX_RASTER_SIDE as f64;
    let (w, h) = (w.min(side), h.min(side));
    let area = w * h;
    let (w, h) = if area > MAX_RASTER_PIXELS as f64 {
        let k = (MAX_RASTER_PIXELS as f64 / area).sqrt();
        ((w * k).floor().max(1.0), (h * k).floor().max(1.0))
    } else {
        (w, h)
    };
    (w as u32, h as u32)
}

/// Card size in whole pixels, or an error if it exceeds the raster limits.
pub fn raster_size(width_in: f32, height_in: f32, dpi: f32) -> Result<(u32, u32), LanyardError> {
    let (w, h) = raw_pixel_size(width_in, height_in, dpi);
    if !within_raster_limits(w, h) {
        return Err(LanyardError::Config(format!(
            "{}x{} in at {} DPI is {}x{} px, over the raster limit ({} px per side, {} px total)",
            width_in, height_in, dpi, w, h, MAX_RASTER_SIDE, MAX_RASTER_PIXELS
        )));
    }
    Ok((w as u32, h as u32))
}

impl InchBox {
    /// Map into percent of a `card_width` x `card_height` inch card.
    pub fn to_percent(&self, card_width: f32, card_height: f32) -> PercentBox {
        PercentBox {
            left: self.x / card_width * 100.0,
            top: self.y / card_height * 100.0,
            width: self.width.map(|w| w / card_width * 100.0),
            height: self.height.map(|h| h / card_height * 100.0),
        }
    }

    /// Map into device pixels at `dpi`.
    pub fn to_pixels(&self, dpi: f32) -> PixelBox {
        PixelBox {
            x: inches_to_px(self.x, dpi),
            y: inches_to_px(self.y, dpi),
            width: self.width.map(|w| inches_to_px(w, dpi)),
            height: self.height.map(|h| inches_to_px(h, dpi)),
        }
    }
}

impl PercentBox {
    /// Inverse of [`InchBox::to_percent`].
    pub fn to_inches(&self, card_width: f32, card_height: f32) -> InchBox {
        InchBox {
            x: self.left / 100.0 * card_width,
            y: self.top / 100.0 * card_height,
            width: self.width.map(|w| w / 100.0 * card_width),
            height: self.height.map(|h| h / 100.0 * card_height),
        }
    }
}

impl PixelBox {
    /// Integer pixel rectangle `(x, y, w, h)`, using `fallback` for missing
    /// dimensions. Width and height are rounded from the box's far edge so
    /// adjacent boxes tile without gaps.
    pub fn to_rect(&self, fallback: (f32, f32)) -> (i32, i32, u32, u32) {
        let w = self.width.unwrap_or(fallback.0).max(0.0);
        let h = self.height.unwrap_or(fallback.1).max(0.0);
        let x0 = self.x.round() as i32;
        let y0 = self.y.round() as i32;
        let x1 = (self.x + w).round() as i32;
        let y1 = (self.y + h).round() as i32;
        (x0, y0, (x1 - x0).max(0) as u32, (y1 - y0).max(0) as u32)
    }
}
