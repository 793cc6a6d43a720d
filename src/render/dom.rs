//! # Interactive Target
//!
//! Builds a retained visual tree for screen display: one [`VisualNode`] per
//! drawn element, in template order, positioned in percent of the card.
//!
//! The tree is plain data. It serializes to JSON for front ends that build
//! their own DOM, and to an HTML fragment via [`InteractiveCard::to_html`].
//! Lengths that are not positions (font sizes, stroke widths) are expressed in
//! `cqw`, percent of the card's width, with the card element declared as a
//! size container. The whole card therefore scales with whatever box
//! displays it.
//!
//! Nothing here loads images: image nodes carry their resolved source and
//! the host environment fetches them.

use serde::Serialize;

use super::{QrPlacement, RenderTarget, Stroke, TextRun};
use crate::config::{RenderConfig, SCREEN_DPI};
use crate::records::DataContext;
use crate::template::{CardElement, CardTemplate, Color, FontWeight, TextAlign};

/// What a node draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Rectangle,
    Circle,
    Line,
    Text,
    Image,
    QrCode,
}

/// Node payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeContent {
    Empty,
    Text { text: String },
    Image { src: String, alt: String },
    /// Inline SVG, already sized to fill its box.
    Svg { svg: String, side: f32 },
}

/// Presentation of a node. Positions and sizes are percent of the card;
/// other lengths are `cqw`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
    pub left: f32,
    pub top: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Border width in `cqw` and its color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<(f32, String)>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub rounded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
}

impl NodeStyle {
    /// Inline CSS declarations.
    pub fn to_css(&self) -> String {
        let mut decls = vec![
            "position:absolute".to_string(),
            "box-sizing:border-box".to_string(),
            format!("left:{}%", fmt_num(self.left)),
            format!("top:{}%", fmt_num(self.top)),
        ];
        if let Some(w) = self.width {
            decls.push(format!("width:{}%", fmt_num(w)));
        }
        if let Some(h) = self.height {
            decls.push(format!("height:{}%", fmt_num(h)));
        }
        if let Some(bg) = &self.background {
            decls.push(format!("background-color:{}", bg));
        }
        if let Some(color) = &self.color {
            decls.push(format!("color:{}", color));
        }
        if let Some((width, color)) = &self.border {
            decls.push(format!("border:{}cqw solid {}", fmt_num(*width), color));
        }
        if self.rounded {
            decls.push("border-radius:50%".to_string());
        }
        if let Some(size) = self.font_size {
            decls.push(format!("font-size:{}cqw", fmt_num(size)));
            decls.push("line-height:1.2".to_string());
            decls.push(format!("font-weight:{}", if self.bold { "bold" } else { "normal" }));
        }
        if let Some(align) = self.text_align {
            decls.push(format!("text-align:{}", align.as_css()));
        }
        decls.join(";")
    }
}

/// One element of the card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualNode {
    pub id: String,
    pub kind: NodeKind,
    pub style: NodeStyle,
    pub content: NodeContent,
}

/// A card as a tree of visual nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveCard {
    pub template_id: String,
    /// Inches.
    pub width: f32,
    pub height: f32,
    pub background: String,
    pub nodes: Vec<VisualNode>,
}

impl InteractiveCard {
    pub fn node(&self, id: &str) -> Option<&VisualNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// HTML fragment. The card fills the width of its container and keeps
    /// its aspect ratio.
    pub fn to_html(&self) -> String {
        let mut html = format!(
            concat!(
                r#"<div class="id-card" data-template="{}" style="position:relative;"#,
                r#"width:100%;aspect-ratio:{} / {};container-type:inline-size;"#,
                r#"overflow:hidden;background-color:{};font-family:Arial, sans-serif">"#
            ),
            escape_html(&self.template_id),
            fmt_num(self.width),
            fmt_num(self.height),
            self.background,
        );
        for node in &self.nodes {
            html.push_str(&node_html(node));
        }
        html.push_str("</div>");
        html
    }

    /// Standalone HTML page showing the card at its physical size.
    pub fn to_document(&self, title: &str) -> String {
        format!(
            concat!(
                "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n",
                "<title>{}</title>\n</head>\n<body>\n",
                "<div style=\"width:{}in\">{}</div>\n</body>\n</html>\n"
            ),
            escape_html(title),
            fmt_num(self.width),
            self.to_html(),
        )
    }
}

fn node_html(node: &VisualNode) -> String {
    let style = node.style.to_css();
    let id = escape_html(&node.id);
    match &node.content {
        NodeContent::Empty => format!(r#"<div data-id="{}" style="{}"></div>"#, id, style),
        NodeContent::Text { text } => format!(
            r#"<div data-id="{}" style="{};white-space:normal;overflow-wrap:break-word;overflow:hidden">{}</div>"#,
            id,
            style,
            escape_html(text)
        ),
        NodeContent::Image { src, alt } => format!(
            r#"<img data-id="{}" src="{}" alt="{}" style="{};object-fit:cover">"#,
            id,
            escape_html(src),
            escape_html(alt),
            style
        ),
        NodeContent::Svg { svg, side } => format!(
            concat!(
                r#"<div data-id="{}" style="{};display:flex;align-items:center;justify-content:center">"#,
                r#"<div style="width:{}%;aspect-ratio:1 / 1">{}</div></div>"#
            ),
            id,
            style,
            fmt_num(*side),
            svg
        ),
    }
}

pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Compact decimal: at most four places, no trailing zeros.
fn fmt_num(v: f32) -> String {
    let s = format!("{:.4}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// Builds an [`InteractiveCard`] from the shared element walk.
#[derive(Debug, Default)]
pub struct InteractiveTarget {
    card_width: f32,
    card_height: f32,
    card: Option<InteractiveCard>,
}

impl InteractiveTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Card-relative box for an element.
    fn style(&self, e: &CardElement) -> NodeStyle {
        let pct = e.inch_box().to_percent(self.card_width, self.card_height);
        NodeStyle {
            left: pct.left,
            top: pct.top,
            width: pct.width,
            height: pct.height,
            ..NodeStyle::default()
        }
    }

    /// CSS pixels as percent of the card width.
    fn cqw(&self, css_px: f32) -> f32 {
        css_px / (self.card_width * SCREEN_DPI) * 100.0
    }

    fn push(&mut self, e: &CardElement, kind: NodeKind, style: NodeStyle, content: NodeContent) {
        if let Some(card) = &mut self.card {
            card.nodes.push(VisualNode {
                id: e.id.clone(),
                kind,
                style,
                content,
            });
        }
    }
}

impl RenderTarget for InteractiveTarget {
    type Output = InteractiveCard;

    fn begin(&mut self, template: &CardTemplate) {
        self.card_width = template.width;
        self.card_height = template.height;
        self.card = Some(InteractiveCard {
            template_id: template.id.clone(),
            width: template.width,
            height: template.height,
            background: template.background_color.to_css(),
            nodes: Vec::new(),
        });
    }

    fn rectangle(&mut self, e: &CardElement, fill: Option<Color>, border: Option<Stroke>) {
        let mut style = self.style(e);
        style.background = fill.map(|c| c.to_css());
        style.border = border.map(|s| (self.cqw(s.width), s.color.to_css()));
        self.push(e, NodeKind::Rectangle, style, NodeContent::Empty);
    }

    fn circle(&mut self, e: &CardElement, radius: f32, fill: Color) {
        let mut style = self.style(e);
        style.width = Some(2.0 * radius / self.card_width * 100.0);
        style.height = Some(2.0 * radius / self.card_height * 100.0);
        style.background = Some(fill.to_css());
        style.rounded = true;
        self.push(e, NodeKind::Circle, style, NodeContent::Empty);
    }

    fn line(&mut self, e: &CardElement, stroke: Stroke) {
        // A bar as tall as the stroke, centered on y like the raster stroke.
        let mut style = self.style(e);
        let thickness = stroke.width / SCREEN_DPI / self.card_height * 100.0;
        style.top -= thickness / 2.0;
        style.width = Some(style.width.unwrap_or(0.0));
        style.height = Some(thickness);
        style.background = Some(stroke.color.to_css());
        self.push(e, NodeKind::Line, style, NodeContent::Empty);
    }

    fn text(&mut self, e: &CardElement, run: TextRun) {
        let mut style = self.style(e);
        style.color = Some(run.color.to_css());
        style.font_size = Some(self.cqw(run.font_size));
        style.bold = run.weight == FontWeight::Bold;
        style.text_align = Some(run.align);
        self.push(e, NodeKind::Text, style, NodeContent::Text { text: run.text });
    }

    fn image(&mut self, e: &CardElement, source: String, border: Option<Stroke>) {
        let mut style = self.style(e);
        style.border = border.map(|s| (self.cqw(s.width), s.color.to_css()));
        let content = NodeContent::Image {
            src: source,
            alt: e.id.clone(),
        };
        self.push(e, NodeKind::Image, style, content);
    }

    fn qr_code(&mut self, e: &CardElement, qr: QrPlacement) {
        let mut style = self.style(e);
        // Unsized axes take the QR side, so the code is centered in its box.
        let box_w = e.width.unwrap_or(qr.side);
        style.width = Some(box_w / self.card_width * 100.0);
        style.height = Some(e.height.unwrap_or(qr.side) / self.card_height * 100.0);
        let content = NodeContent::Svg {
            svg: qr.matrix.to_svg(Color::BLACK, Color::WHITE),
            side: qr.side / box_w * 100.0,
        };
        self.push(e, NodeKind::QrCode, style, content);
    }

    fn finish(self) -> InteractiveCard {
        self.card.unwrap_or(InteractiveCard {
            template_id: String::new(),
            width: 0.0,
            height: 0.0,
            background: Color::WHITE.to_css(),
            nodes: Vec::new(),
        })
    }
}

/// Render a card as a visual tree.
pub fn render_interactive(
    template: &CardTemplate,
    ctx: &DataContext,
    config: &RenderConfig,
) -> InteractiveCard {
    super::render(template, ctx, config, InteractiveTarget::new())
}
