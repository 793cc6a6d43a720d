//! # Card Rendering
//!
//! One element walk, two outputs. [`render`] visits a template's elements in
//! order, resolves substitution tokens, fills in per-kind defaults and hands
//! each element to a [`RenderTarget`]:
//!
//! - [`dom::InteractiveTarget`] builds a retained visual tree for screen
//!   display (percent geometry, soft-wrapped text, images by reference).
//! - [`raster::RasterTarget`] builds a display list that paints into a pixel
//!   buffer at the configured DPI, with images composited as they load.
//!
//! Both targets see the same resolved values, so a card looks the same in the
//! preview and on paper.
//!
//! ## Defaults
//!
//! | Kind | Default |
//! |------|---------|
//! | rectangle | no fill unless `backgroundColor`; border only with both color and width |
//! | circle | black fill |
//! | line | black, 1px |
//! | text | black, 12px, normal weight, left aligned |
//! | image | skipped when the source resolves to nothing |
//! | qrcode | 0.5in on any missing side; square of the smaller side |

pub mod dom;
pub mod paint;
pub mod qr;
pub mod raster;
pub mod text;

use tracing::{debug, instrument, warn};

use crate::config::RenderConfig;
use crate::records::DataContext;
use crate::substitute::{resolve_image_source, substitute};
use crate::template::{CardElement, CardTemplate, Color, ElementKind, FontWeight, TextAlign};
use crate::verify::verification_url;

use self::qr::QrMatrix;

/// Side of a QR code along an axis the element leaves unsized, in inches.
pub const DEFAULT_QR_SIDE: f32 = 0.5;

/// A resolved outline: color and width in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

impl Stroke {
    /// A stroke is drawn only when both parts are present and the width is positive.
    fn from_parts(color: Option<Color>, width: Option<f32>) -> Option<Self> {
        match (color, width) {
            (Some(color), Some(width)) if width > 0.0 => Some(Self { color, width }),
            _ => None,
        }
    }
}

/// Substituted text with its resolved style.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    /// CSS pixels.
    pub font_size: f32,
    pub weight: FontWeight,
    pub color: Color,
    pub align: TextAlign,
}

/// An encoded verification QR code and the square it occupies.
#[derive(Debug, Clone)]
pub struct QrPlacement {
    pub url: String,
    pub matrix: QrMatrix,
    /// Side length in inches.
    pub side: f32,
}

/// Receives resolved elements from the shared walk.
///
/// Geometry arrives in inches on the element itself; each target maps it into
/// its own space. Calls arrive in template order, which is paint order.
pub trait RenderTarget {
    type Output;

    /// Start a card. Called once, before any element.
    fn begin(&mut self, template: &CardTemplate);

    fn rectangle(&mut self, element: &CardElement, fill: Option<Color>, border: Option<Stroke>);

    /// Disc of `radius` inches centered at (x + radius, y + radius).
    fn circle(&mut self, element: &CardElement, radius: f32, fill: Color);

    /// Horizontal segment from (x, y), `width` inches long.
    fn line(&mut self, element: &CardElement, stroke: Stroke);

    fn text(&mut self, element: &CardElement, run: TextRun);

    /// `source` is already substituted and known to be usable.
    fn image(&mut self, element: &CardElement, source: String, border: Option<Stroke>);

    fn qr_code(&mut self, element: &CardElement, qr: QrPlacement);

    fn finish(self) -> Self::Output;
}

/// Walk `template` against `ctx`, driving `target`.
///
/// Never fails: data problems degrade to blank regions and are logged.
#[instrument(skip_all, fields(template = %template.id, employee = %ctx.employee.employee_id))]
pub fn render<T: RenderTarget>(
    template: &CardTemplate,
    ctx: &DataContext,
    config: &RenderConfig,
    mut target: T,
) -> T::Output {
    target.begin(template);

    for element in &template.elements {
        match &element.kind {
            ElementKind::Rectangle {
                background_color,
                opacity,
                border_color,
                border_width,
            } => {
                let fill = background_color.map(|c| c.with_opacity(*opacity));
                target.rectangle(element, fill, Stroke::from_parts(*border_color, *border_width));
            }
            ElementKind::Circle {
                background_color,
                radius,
            } => {
                target.circle(element, *radius, background_color.unwrap_or(Color::BLACK));
            }
            ElementKind::Line {
                border_color,
                border_width,
            } => {
                let stroke = Stroke {
                    color: border_color.unwrap_or(Color::BLACK),
                    width: border_width.filter(|w| *w > 0.0).unwrap_or(1.0),
                };
                target.line(element, stroke);
            }
            ElementKind::Text {
                text,
                font_size,
                font_weight,
                color,
                align,
            } => {
                let run = TextRun {
                    text: substitute(text, ctx),
                    font_size: *font_size,
                    weight: *font_weight,
                    color: color.unwrap_or(Color::BLACK),
                    align: *align,
                };
                target.text(element, run);
            }
            ElementKind::Image {
                source,
                border_color,
                border_width,
            } => match resolve_image_source(source, ctx) {
                Some(resolved) => {
                    target.image(element, resolved, Stroke::from_parts(*border_color, *border_width))
                }
                None => debug!(element = %element.id, "image source unresolved, skipping"),
            },
            ElementKind::QrCode => {
                let url = verification_url(&ctx.employee.employee_id, &config.verification_base_url);
                match qr::encode(&url) {
                    Ok(matrix) => {
                        let side = element
                            .width
                            .unwrap_or(DEFAULT_QR_SIDE)
                            .min(element.height.unwrap_or(DEFAULT_QR_SIDE));
                        target.qr_code(element, QrPlacement { url, matrix, side });
                    }
                    Err(e) => warn!(element = %element.id, error = %e, "skipping QR code"),
                }
            }
            ElementKind::Unknown => {
                debug!(element = %element.id, "unknown element type, skipping");
            }
        }
    }

    target.finish()
}
