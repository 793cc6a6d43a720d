//! # Card Template Model
//!
//! A template is a named, reusable card layout in physical units: a fixed
//! size in inches, a background color and an ordered element list. Element
//! order is paint order: later elements draw over earlier ones.
//!
//! Templates are pure data. They are checked once when defined (positive
//! size, unique element ids) and never mutated by a render.
//!
//! ```
//! use lanyard::template::{CardTemplate, CardElement, Color};
//!
//! let template = CardTemplate::new("badge", "Badge", 3.375, 2.125)
//!     .with_element(CardElement::rectangle("band", 0.0, 0.0, Color::rgb(30, 58, 138)).sized(3.375, 0.5))
//!     .with_element(CardElement::text("name", 0.2, 0.7, "{{employee_name}}"));
//! template.validate().unwrap();
//! ```

mod color;
mod element;

pub use color::Color;
pub use element::{CardElement, DEFAULT_FONT_SIZE, ElementKind, FontWeight, TextAlign};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::LanyardError;

/// A card design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardTemplate {
    pub id: String,
    pub name: String,
    /// Free-form grouping tag ("Professional", "Security", ...).
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// Card width in inches.
    pub width: f32,
    /// Card height in inches.
    pub height: f32,
    #[serde(default = "default_background")]
    pub background_color: Color,
    /// Paint order: later elements draw over earlier ones.
    #[serde(default)]
    pub elements: Vec<CardElement>,
}

fn default_background() -> Color {
    Color::WHITE
}

impl CardTemplate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: String::new(),
            description: String::new(),
            width,
            height,
            background_color: Color::WHITE,
            elements: Vec::new(),
        }
    }

    pub fn with_element(mut self, element: CardElement) -> Self {
        self.elements.push(element);
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Check definition-time invariants.
    ///
    /// - width and height are finite and positive
    /// - element ids are non-empty and unique
    pub fn validate(&self) -> Result<(), LanyardError> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(LanyardError::Template(format!(
                "{}: width must be positive, got {}",
                self.id, self.width
            )));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(LanyardError::Template(format!(
                "{}: height must be positive, got {}",
                self.id, self.height
            )));
        }

        let mut seen = HashSet::new();
        for (i, element) in self.elements.iter().enumerate() {
            if element.id.is_empty() {
                return Err(LanyardError::Template(format!(
                    "{}: elements[{}] has an empty id",
                    self.id, i
                )));
            }
            if !seen.insert(element.id.as_str()) {
                return Err(LanyardError::Template(format!(
                    "{}: duplicate element id '{}'",
                    self.id, element.id
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate a template from JSON.
    pub fn from_json(json: &str) -> Result<Self, LanyardError> {
        let template: Self = serde_json::from_str(json)?;
        template.validate()?;
        Ok(template)
    }

    pub fn element(&self, id: &str) -> Option<&CardElement> {
        self.elements.iter().find(|e| e.id == id)
    }
}
