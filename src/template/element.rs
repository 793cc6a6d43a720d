//! Card element types.
//!
//! A [`CardElement`] is one visual primitive placed on a card. The common
//! geometry (id, position, optional size) lives on the struct; everything
//! kind-specific lives in the closed [`ElementKind`] sum type, so each render
//! target matches it exhaustively.
//!
//! ## JSON shape
//!
//! ```json
//! { "id": "name", "type": "text", "x": 1.2, "y": 0.6, "width": 2.0,
//!   "text": "{{employee_name}}", "fontSize": 14, "fontWeight": "bold" }
//! ```
//!
//! Element `type` tags are lowercase; kind fields are camelCase. An unknown
//! `type` deserializes to [`ElementKind::Unknown`] and renders nothing.

use serde::{Deserialize, Serialize};

use super::Color;
use crate::geometry::InchBox;

/// Default text size, in CSS pixels (1/96 inch).
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

fn default_opacity() -> f32 {
    1.0
}

fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE
}

/// Font weight for text elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Horizontal text alignment within the element box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_css(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// One visual primitive on a card.
///
/// Positions and sizes are in inches, relative to the card's top-left corner.
/// `font_size` and `border_width` are in CSS pixels (1/96 inch) so that a
/// 96 DPI raster matches the on-screen preview exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardElement {
    /// Stable identifier, unique within a template.
    pub id: String,
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(flatten)]
    pub kind: ElementKind,
}

/// Kind-specific element data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ElementKind {
    /// Filled and/or stroked box.
    Rectangle {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        background_color: Option<Color>,
        #[serde(default = "default_opacity")]
        opacity: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        border_color: Option<Color>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        border_width: Option<f32>,
    },
    /// Filled disc whose bounding box starts at (x, y).
    Circle {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        background_color: Option<Color>,
        #[serde(default)]
        radius: f32,
    },
    /// Horizontal rule of `width` inches starting at (x, y).
    Line {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        border_color: Option<Color>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        border_width: Option<f32>,
    },
    /// Literal or templated text.
    Text {
        #[serde(default)]
        text: String,
        #[serde(default = "default_font_size")]
        font_size: f32,
        #[serde(default)]
        font_weight: FontWeight,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<Color>,
        #[serde(default)]
        align: TextAlign,
    },
    /// Bitmap from a literal URL or a `{{logo_url}}` / `{{employee_photo}}` token.
    Image {
        #[serde(default)]
        source: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        border_color: Option<Color>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        border_width: Option<f32>,
    },
    /// QR code encoding the employee's verification URL.
    QrCode,
    /// Any element type this version does not know. Renders nothing.
    #[serde(other)]
    Unknown,
}

impl ElementKind {
    /// The lowercase type tag, as it appears in template JSON.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Rectangle { .. } => "rectangle",
            Self::Circle { .. } => "circle",
            Self::Line { .. } => "line",
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::QrCode => "qrcode",
            Self::Unknown => "unknown",
        }
    }
}

impl CardElement {
    pub fn new(id: impl Into<String>, x: f32, y: f32, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            width: None,
            height: None,
            kind,
        }
    }

    /// Set the declared size, in inches.
    pub fn sized(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    /// Geometry in inches.
    pub fn inch_box(&self) -> InchBox {
        InchBox {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    pub fn text(id: impl Into<String>, x: f32, y: f32, text: impl Into<String>) -> Self {
        Self::new(
            id,
            x,
            y,
            ElementKind::Text {
                text: text.into(),
                font_size: DEFAULT_FONT_SIZE,
                font_weight: FontWeight::Normal,
                color: None,
                align: TextAlign::Left,
            },
        )
    }

    pub fn rectangle(id: impl Into<String>, x: f32, y: f32, fill: Color) -> Self {
        Self::new(
            id,
            x,
            y,
            ElementKind::Rectangle {
                background_color: Some(fill),
                opacity: 1.0,
                border_color: None,
                border_width: None,
            },
        )
    }

    pub fn image(id: impl Into<String>, x: f32, y: f32, source: impl Into<String>) -> Self {
        Self::new(
            id,
            x,
            y,
            ElementKind::Image {
                source: source.into(),
                border_color: None,
                border_width: None,
            },
        )
    }

    pub fn qr_code(id: impl Into<String>, x: f32, y: f32) -> Self {
        Self::new(id, x, y, ElementKind::QrCode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deserialize_text_element() {
        let json = r##"{"id":"name","type":"text","x":1.2,"y":0.6,"width":2,
            "text":"{{employee_name}}","fontSize":14,"fontWeight":"bold","align":"center","color":"#111111"}"##;
        let el: CardElement = serde_json::from_str(json).unwrap();
        assert_eq!(el.id, "name");
        assert_eq!(el.width, Some(2.0));
        assert_eq!(
            el.kind,
            ElementKind::Text {
                text: "{{employee_name}}".into(),
                font_size: 14.0,
                font_weight: FontWeight::Bold,
                color: Some(Color::rgb(0x11, 0x11, 0x11)),
                align: TextAlign::Center,
            }
        );
    }

    #[test]
    fn test_deserialize_defaults() {
        let el: CardElement =
            serde_json::from_str(r##"{"id":"bg","type":"rectangle","x":0,"y":0,"backgroundColor":"#fff"}"##)
                .unwrap();
        match el.kind {
            ElementKind::Rectangle { opacity, border_color, .. } => {
                assert_eq!(opacity, 1.0);
                assert_eq!(border_color, None);
            }
            other => panic!("expected rectangle, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_qrcode_and_unknown() {
        let qr: CardElement =
            serde_json::from_str(r#"{"id":"qr","type":"qrcode","x":2.5,"y":1.2,"width":0.7,"height":0.7}"#)
                .unwrap();
        assert_eq!(qr.kind, ElementKind::QrCode);

        let future: CardElement =
            serde_json::from_str(r#"{"id":"h","type":"hologram","x":0,"y":0,"sparkle":9}"#).unwrap();
        assert_eq!(future.kind, ElementKind::Unknown);
        assert_eq!(future.kind.type_name(), "unknown");
    }

    #[test]
    fn test_serialize_uses_json_names() {
        let el = CardElement::rectangle("band", 0.0, 0.0, Color::rgb(0, 0, 0)).sized(3.375, 0.5);
        let value = serde_json::to_value(&el).unwrap();
        assert_eq!(value["type"], "rectangle");
        assert_eq!(value["backgroundColor"], "#000000");
        assert_eq!(value["opacity"], 1.0);
    }
}
