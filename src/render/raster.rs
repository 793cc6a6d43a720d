//! # Raster Target
//!
//! Renders a card into an RGBA pixel buffer at a chosen DPI.
//!
//! The element walk produces a [`DisplayList`]: an ordered list of draw
//! operations in device pixels. Painting the list onto a cleared buffer is
//! synchronous and deterministic. Images are the exception: each image
//! element holds a slot in the list, and its bitmap arrives later from an
//! [`ImageLoader`] task.
//!
//! ## Surfaces and generations
//!
//! A [`RasterCard`] owns the buffer a caller displays. Every call to
//! [`RasterCard::render`] starts a new *generation*: the list is replaced,
//! loaded images are dropped and the buffer is repainted from scratch. Image
//! tasks remember the generation they were started under. When one finishes
//! after a newer render began, its bitmap is discarded instead of being drawn
//! into a card it no longer belongs to.
//!
//! When a bitmap does land, the whole list is repainted with it in place. An
//! image therefore sits at its template position in the paint order no
//! matter when it arrives, and elements declared after it still cover it.
//!
//! ```no_run
//! use std::sync::Arc;
//! use lanyard::config::RenderConfig;
//! use lanyard::loader::HttpImageLoader;
//! use lanyard::render::raster::render_to_buffer;
//! # async fn demo(template: lanyard::template::CardTemplate, ctx: lanyard::records::DataContext) {
//! let loader = Arc::new(HttpImageLoader::new().unwrap());
//! let img = render_to_buffer(&template, &ctx, &RenderConfig::default(), loader).await;
//! img.save("card.png").ok();
//! # }
//! ```

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbaImage};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::paint::{Rect, draw_bitmap, fill_circle, fill_rect, hline, stroke_rect};
use super::qr::QrMatrix;
use super::text::{FontBook, PlacedLine, layout_text};
use super::{QrPlacement, RenderTarget, Stroke, TextRun};
use crate::config::RenderConfig;
use crate::error::LanyardError;
use crate::geometry::{card_pixel_size, css_px_to_px, inches_to_px, within_raster_limits};
use crate::loader::ImageLoader;
use crate::records::DataContext;
use crate::template::{CardElement, CardTemplate, Color, FontWeight};

/// One paint step, in device pixels.
#[derive(Debug, Clone)]
pub enum DrawOp {
    Fill {
        rect: Rect,
        color: Color,
    },
    Stroke {
        rect: Rect,
        color: Color,
        width: f32,
    },
    Circle {
        cx: f32,
        cy: f32,
        radius: f32,
        color: Color,
    },
    Line {
        x: f32,
        y: f32,
        length: f32,
        color: Color,
        width: f32,
    },
    Text {
        lines: Vec<PlacedLine>,
        size: f32,
        weight: FontWeight,
        color: Color,
    },
    /// Drawn only once the bitmap for `slot` has loaded.
    Image {
        slot: usize,
        x: f32,
        y: f32,
        border: Option<(Color, f32)>,
    },
    Qr {
        matrix: QrMatrix,
        x: f32,
        y: f32,
        size: f32,
    },
}

/// An image the list is waiting for.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub slot: usize,
    pub source: String,
    /// Target size in pixels; `None` keeps the bitmap's natural size on that axis.
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// A card as ordered draw operations.
#[derive(Debug, Clone)]
pub struct DisplayList {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub ops: Vec<DrawOp>,
    pub images: Vec<ImageRequest>,
}

impl DisplayList {
    /// Paint onto a fresh buffer filled with the background.
    ///
    /// Image ops draw only if their slot is present in `images`.
    pub fn paint(&self, fonts: &FontBook, images: &HashMap<usize, RgbaImage>) -> RgbaImage {
        let mut img = RgbaImage::from_pixel(self.width, self.height, self.background.to_rgba());

        for op in &self.ops {
            match op {
                DrawOp::Fill { rect, color } => fill_rect(&mut img, *rect, *color),
                DrawOp::Stroke { rect, color, width } => stroke_rect(&mut img, *rect, *color, *width),
                DrawOp::Circle { cx, cy, radius, color } => {
                    fill_circle(&mut img, *cx, *cy, *radius, *color)
                }
                DrawOp::Line { x, y, length, color, width } => {
                    hline(&mut img, *x, *y, *length, *color, *width)
                }
                DrawOp::Text { lines, size, weight, color } => {
                    let face = fonts.face(*weight, *size);
                    for line in lines {
                        face.draw(&mut img, &line.text, line.x, line.y, *color);
                    }
                }
                DrawOp::Image { slot, x, y, border } => {
                    let Some(bitmap) = images.get(slot) else {
                        continue;
                    };
                    if let Some((color, width)) = border {
                        let rect = Rect::new(*x, *y, bitmap.width() as f32, bitmap.height() as f32);
                        stroke_rect(&mut img, rect, *color, *width);
                    }
                    draw_bitmap(&mut img, bitmap, *x, *y);
                }
                DrawOp::Qr { matrix, x, y, size } => {
                    matrix.draw(&mut img, *x, *y, *size, Color::BLACK, Color::WHITE)
                }
            }
        }
        img
    }

    /// Text lines of the op at `index`, if it is a text op.
    pub fn text_lines(&self, index: usize) -> Option<&[PlacedLine]> {
        match self.ops.get(index) {
            Some(DrawOp::Text { lines, .. }) => Some(lines),
            _ => None,
        }
    }
}

/// Builds a [`DisplayList`] from the shared element walk.
pub struct RasterTarget<'f> {
    fonts: &'f FontBook,
    dpi: f32,
    list: DisplayList,
}

impl<'f> RasterTarget<'f> {
    pub fn new(fonts: &'f FontBook, dpi: f32) -> Self {
        Self {
            fonts,
            dpi,
            list: DisplayList {
                width: 1,
                height: 1,
                background: Color::WHITE,
                ops: Vec::new(),
                images: Vec::new(),
            },
        }
    }

    fn px(&self, inches: f32) -> f32 {
        inches_to_px(inches, self.dpi)
    }

    fn stroke_px(&self, css_px: f32) -> f32 {
        css_px_to_px(css_px, self.dpi)
    }

    /// Declared size in whole pixels. Zero-sized axes count as unsized.
    fn declared_px(&self, inches: Option<f32>) -> Option<u32> {
        inches
            .map(|v| self.px(v).round())
            .filter(|v| *v >= 1.0)
            .map(|v| v as u32)
    }
}

impl RenderTarget for RasterTarget<'_> {
    type Output = DisplayList;

    fn begin(&mut self, template: &CardTemplate) {
        let (width, height) = card_pixel_size(template.width, template.height, self.dpi);
        self.list.width = width;
        self.list.height = height;
        self.list.background = template.background_color;
    }

    fn rectangle(&mut self, e: &CardElement, fill: Option<Color>, border: Option<Stroke>) {
        let rect = Rect::new(
            self.px(e.x),
            self.px(e.y),
            self.px(e.width.unwrap_or(0.0)),
            self.px(e.height.unwrap_or(0.0)),
        );
        if let Some(color) = fill {
            self.list.ops.push(DrawOp::Fill { rect, color });
        }
        if let Some(stroke) = border {
            let width = self.stroke_px(stroke.width);
            self.list.ops.push(DrawOp::Stroke { rect, color: stroke.color, width });
        }
    }

    fn circle(&mut self, e: &CardElement, radius: f32, fill: Color) {
        let r = self.px(radius);
        self.list.ops.push(DrawOp::Circle {
            cx: self.px(e.x) + r,
            cy: self.px(e.y) + r,
            radius: r,
            color: fill,
        });
    }

    fn line(&mut self, e: &CardElement, stroke: Stroke) {
        self.list.ops.push(DrawOp::Line {
            x: self.px(e.x),
            y: self.px(e.y),
            length: self.px(e.width.unwrap_or(0.0)),
            color: stroke.color,
            width: self.stroke_px(stroke.width),
        });
    }

    fn text(&mut self, e: &CardElement, run: TextRun) {
        let size = self.stroke_px(run.font_size);
        let face = self.fonts.face(run.weight, size);
        let lines = layout_text(
            &face,
            &run.text,
            self.px(e.x),
            self.px(e.y),
            e.width.map(|w| self.px(w)),
            run.align,
        );
        self.list.ops.push(DrawOp::Text {
            lines,
            size,
            weight: run.weight,
            color: run.color,
        });
    }

    fn image(&mut self, e: &CardElement, source: String, border: Option<Stroke>) {
        let (width, height) = (self.declared_px(e.width), self.declared_px(e.height));
        let box_w = width.map_or(1.0, f64::from);
        let box_h = height.map_or(1.0, f64::from);
        if !within_raster_limits(box_w, box_h) {
            warn!(element = %e.id, width = box_w, height = box_h, "image box over raster limit, skipping");
            return;
        }
        let slot = self.list.images.len();
        let border = border.map(|s| (s.color, self.stroke_px(s.width)));
        let (x, y) = (self.px(e.x), self.px(e.y));
        self.list.images.push(ImageRequest { slot, source, width, height });
        self.list.ops.push(DrawOp::Image { slot, x, y, border });
    }

    fn qr_code(&mut self, e: &CardElement, qr: QrPlacement) {
        // Centered in the declared box, like the interactive target.
        let side = self.px(qr.side);
        let box_w = e.width.map(|w| self.px(w)).unwrap_or(side);
        let box_h = e.height.map(|h| self.px(h)).unwrap_or(side);
        self.list.ops.push(DrawOp::Qr {
            matrix: qr.matrix,
            x: self.px(e.x) + (box_w - side) / 2.0,
            y: self.px(e.y) + (box_h - side) / 2.0,
            size: side,
        });
    }

    fn finish(self) -> DisplayList {
        self.list
    }
}

/// Build the display list for a card without painting it.
pub fn display_list(
    template: &CardTemplate,
    ctx: &DataContext,
    config: &RenderConfig,
    fonts: &FontBook,
) -> DisplayList {
    super::render(template, ctx, config, RasterTarget::new(fonts, config.dpi))
}

/// Scale a loaded bitmap to its target box, cropping to cover.
///
/// `None` when the result would exceed the raster limits.
fn fit_image(img: DynamicImage, width: Option<u32>, height: Option<u32>) -> Option<RgbaImage> {
    let w = width.unwrap_or(img.width());
    let h = height.unwrap_or(img.height());
    if !within_raster_limits(f64::from(w), f64::from(h)) {
        return None;
    }
    if (w, h) == (img.width(), img.height()) {
        return Some(img.into_rgba8());
    }
    Some(img.resize_to_fill(w, h, FilterType::Lanczos3).into_rgba8())
}

struct SurfaceState {
    list: DisplayList,
    images: HashMap<usize, RgbaImage>,
    buffer: RgbaImage,
}

struct Surface {
    generation: AtomicU64,
    fonts: FontBook,
    state: Mutex<SurfaceState>,
}

impl Surface {
    fn lock(&self) -> MutexGuard<'_, SurfaceState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn current(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Place a loaded bitmap and repaint, unless `generation` is stale.
    fn composite(&self, generation: u64, slot: usize, bitmap: RgbaImage) -> bool {
        if self.current() != generation {
            debug!(generation, slot, "discarding image from superseded render");
            return false;
        }
        let mut state = self.lock();
        // A newer render may have started while the bitmap was being scaled.
        if self.current() != generation {
            debug!(generation, slot, "discarding image from superseded render");
            return false;
        }
        state.images.insert(slot, bitmap);
        let buffer = state.list.paint(&self.fonts, &state.images);
        state.buffer = buffer;
        true
    }
}

/// A displayed card buffer that survives re-renders.
#[derive(Clone)]
pub struct RasterCard {
    surface: Arc<Surface>,
}

/// Image loads started by one [`RasterCard::render`] call.
#[derive(Debug)]
pub struct RenderPass {
    pub generation: u64,
    handles: Vec<JoinHandle<()>>,
}

impl RenderPass {
    /// Number of image loads in flight for this pass.
    pub fn pending(&self) -> usize {
        self.handles.len()
    }

    /// Wait for every image load of this pass to finish (or be discarded).
    pub async fn settle(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "image task failed");
            }
        }
    }
}

impl RasterCard {
    pub fn new(fonts: FontBook) -> Self {
        let list = DisplayList {
            width: 1,
            height: 1,
            background: Color::WHITE,
            ops: Vec::new(),
            images: Vec::new(),
        };
        let buffer = RgbaImage::from_pixel(1, 1, Color::WHITE.to_rgba());
        Self {
            surface: Arc::new(Surface {
                generation: AtomicU64::new(0),
                fonts,
                state: Mutex::new(SurfaceState {
                    list,
                    images: HashMap::new(),
                    buffer,
                }),
            }),
        }
    }

    /// Current generation; increases with every render.
    pub fn generation(&self) -> u64 {
        self.surface.current()
    }

    /// Copy of the buffer as currently painted.
    pub fn snapshot(&self) -> RgbaImage {
        self.surface.lock().buffer.clone()
    }

    /// Redraw the card from scratch and start loading its images.
    ///
    /// Everything except images is painted before this returns. Images are
    /// loaded on the current tokio runtime and composited as they arrive;
    /// outside a runtime they are skipped.
    pub fn render(
        &self,
        template: &CardTemplate,
        ctx: &DataContext,
        config: &RenderConfig,
        loader: Arc<dyn ImageLoader>,
    ) -> RenderPass {
        let list = display_list(template, ctx, config, &self.surface.fonts);
        let requests = list.images.clone();

        let generation = {
            let mut state = self.surface.lock();
            let generation = self.surface.generation.fetch_add(1, Ordering::AcqRel) + 1;
            state.images.clear();
            state.buffer = list.paint(&self.surface.fonts, &state.images);
            state.list = list;
            generation
        };
        debug!(
            template = %template.id,
            generation,
            images = requests.len(),
            "raster pass painted"
        );

        if requests.is_empty() {
            return RenderPass { generation, handles: Vec::new() };
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(
                template = %template.id,
                images = requests.len(),
                "no async runtime, skipping image loads"
            );
            return RenderPass { generation, handles: Vec::new() };
        };

        let deadline = config.image_timeout;
        let handles = requests
            .into_iter()
            .map(|request| {
                let surface = Arc::clone(&self.surface);
                let loader = Arc::clone(&loader);
                runtime.spawn(async move {
                    let image = match tokio::time::timeout(deadline, loader.load(&request.source)).await {
                        Ok(Ok(image)) => image,
                        Ok(Err(e)) => {
                            warn!(source = %request.source, error = %e, "image load failed");
                            return;
                        }
                        Err(_) => {
                            warn!(source = %request.source, timeout = ?deadline, "image load timed out");
                            return;
                        }
                    };
                    if surface.current() != generation {
                        debug!(generation, slot = request.slot, "discarding image from superseded render");
                        return;
                    }
                    let Some(bitmap) = fit_image(image, request.width, request.height) else {
                        warn!(source = %request.source, "image over raster limit, skipping");
                        return;
                    };
                    surface.composite(generation, request.slot, bitmap);
                })
            })
            .collect();

        RenderPass { generation, handles }
    }
}

/// Render a card and wait for its images.
///
/// Failed loads leave their region as background.
pub async fn render_to_buffer(
    template: &CardTemplate,
    ctx: &DataContext,
    config: &RenderConfig,
    loader: Arc<dyn ImageLoader>,
) -> RgbaImage {
    let card = RasterCard::new(FontBook::shared().clone());
    card.render(template, ctx, config, loader).settle().await;
    card.snapshot()
}

/// Encode a buffer as PNG.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, LanyardError> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .map_err(|e| LanyardError::Image(format!("PNG encoding failed: {}", e)))?;
    Ok(out.into_inner())
}
