//! Built-in card designs.
//!
//! Every design is CR80 (3.375in x 2.125in, the standard ID-1 card size) and
//! uses only the recognized substitution tokens, so any of them renders for any
//! employee.
//!
//! | Id | Category |
//! |----|----------|
//! | `corporate-blue` | Professional |
//! | `modern-minimal` | Modern |
//! | `executive-gold` | Premium |
//! | `security-guard` | Security |
//! | `field-staff` | Specialized |

use crate::template::{CardElement, CardTemplate, Color, ElementKind, FontWeight, TextAlign};

/// CR80 card width in inches.
pub const CR80_WIDTH: f32 = 3.375;

/// CR80 card height in inches.
pub const CR80_HEIGHT: f32 = 2.125;

const IDS: [&str; 5] = [
    "corporate-blue",
    "modern-minimal",
    "executive-gold",
    "security-guard",
    "field-staff",
];

/// Ids of all built-in templates, in display order.
pub fn list_templates() -> Vec<&'static str> {
    IDS.to_vec()
}

/// Look up a built-in template by id.
pub fn by_name(id: &str) -> Option<CardTemplate> {
    match id {
        "corporate-blue" => Some(corporate_blue()),
        "modern-minimal" => Some(modern_minimal()),
        "executive-gold" => Some(executive_gold()),
        "security-guard" => Some(security_guard()),
        "field-staff" => Some(field_staff()),
        _ => None,
    }
}

/// All built-in templates, in display order.
pub fn all() -> Vec<CardTemplate> {
    IDS.iter().filter_map(|id| by_name(id)).collect()
}

fn card(id: &str, name: &str, category: &str, description: &str, background: Color) -> CardTemplate {
    let mut t = CardTemplate::new(id, name, CR80_WIDTH, CR80_HEIGHT).with_background(background);
    t.category = category.to_string();
    t.description = description.to_string();
    t
}

fn rect(id: &str, x: f32, y: f32, w: f32, h: f32, fill: Color) -> CardElement {
    CardElement::rectangle(id, x, y, fill).sized(w, h)
}

#[allow(clippy::too_many_arguments)]
fn label(id: &str, x: f32, y: f32, w: f32, text: &str, size: f32, bold: bool, color: Color) -> CardElement {
    aligned(id, x, y, w, text, size, bold, color, TextAlign::Left)
}

#[allow(clippy::too_many_arguments)]
fn aligned(
    id: &str,
    x: f32,
    y: f32,
    w: f32,
    text: &str,
    size: f32,
    bold: bool,
    color: Color,
    align: TextAlign,
) -> CardElement {
    CardElement::new(
        id,
        x,
        y,
        ElementKind::Text {
            text: text.to_string(),
            font_size: size,
            font_weight: if bold { FontWeight::Bold } else { FontWeight::Normal },
            color: Some(color),
            align,
        },
    )
    .with_width(w)
}

fn photo(x: f32, y: f32, w: f32, h: f32, border: Option<Color>) -> CardElement {
    CardElement::new(
        "photo",
        x,
        y,
        ElementKind::Image {
            source: "{{employee_photo}}".to_string(),
            border_color: border,
            border_width: border.map(|_| 2.0),
        },
    )
    .sized(w, h)
}

fn logo(x: f32, y: f32, side: f32) -> CardElement {
    CardElement::image("logo", x, y, "{{logo_url}}").sized(side, side)
}

fn rule(id: &str, x: f32, y: f32, w: f32, color: Color, width: f32) -> CardElement {
    CardElement::new(
        id,
        x,
        y,
        ElementKind::Line {
            border_color: Some(color),
            border_width: Some(width),
        },
    )
    .with_width(w)
}

fn corporate_blue() -> CardTemplate {
    let navy = Color::rgb(30, 58, 138);
    let ink = Color::rgb(17, 24, 39);
    let muted = Color::rgb(75, 85, 99);
    card(
        "corporate-blue",
        "Corporate Blue",
        "Professional",
        "Navy header band with photo, name, designation and verification code.",
        Color::WHITE,
    )
    .with_element(rect("header", 0.0, 0.0, CR80_WIDTH, 0.45, navy))
    .with_element(logo(0.1, 0.07, 0.31))
    .with_element(label("company", 0.5, 0.12, 2.7, "{{company_name}}", 12.0, true, Color::WHITE))
    .with_element(photo(0.15, 0.6, 0.85, 1.05, Some(navy)))
    .with_element(label("name", 1.15, 0.62, 1.55, "{{employee_name}}", 12.0, true, ink))
    .with_element(label("designation", 1.15, 0.98, 1.55, "{{designation_name}}", 9.0, false, muted))
    .with_element(label("department", 1.15, 1.2, 1.55, "{{department_name}}", 9.0, false, muted))
    .with_element(label("employee-id", 1.15, 1.42, 1.55, "ID: {{employee_id}}", 9.0, true, ink))
    .with_element(CardElement::qr_code("qr", 2.7, 1.35).sized(0.55, 0.55))
    .with_element(rect("footer", 0.0, 2.0, CR80_WIDTH, 0.125, navy))
}

fn modern_minimal() -> CardTemplate {
    let accent = Color::rgb(124, 58, 237);
    let ink = Color::rgb(31, 41, 55);
    let muted = Color::rgb(107, 114, 128);
    card(
        "modern-minimal",
        "Modern Minimal",
        "Modern",
        "Clean white card with a violet side stripe and round accent.",
        Color::WHITE,
    )
    .with_element(rect("stripe", 0.0, 0.0, 0.12, CR80_HEIGHT, accent))
    .with_element(CardElement::new(
        "accent",
        2.85,
        0.1,
        ElementKind::Circle {
            background_color: Some(accent.with_opacity(0.15)),
            radius: 0.2,
        },
    ))
    .with_element(label("company", 0.3, 0.15, 2.4, "{{company_name}}", 10.0, true, accent))
    .with_element(photo(0.3, 0.5, 0.8, 0.8, None))
    .with_element(label("name", 1.25, 0.55, 1.95, "{{employee_name}}", 13.0, true, ink))
    .with_element(label("designation", 1.25, 0.9, 1.95, "{{designation_name}}", 9.0, false, muted))
    .with_element(rule("divider", 0.3, 1.5, 2.2, Color::rgb(229, 231, 235), 1.0))
    .with_element(label("employee-id", 0.3, 1.62, 1.5, "{{employee_id}}", 9.0, true, ink))
    .with_element(label("valid", 0.3, 1.82, 2.0, "Valid till {{id_valid_until_short}}", 8.0, false, muted))
    .with_element(CardElement::qr_code("qr", 2.65, 1.4).sized(0.6, 0.6))
}

fn executive_gold() -> CardTemplate {
    let gold = Color::rgb(202, 138, 4);
    let cream = Color::rgb(254, 252, 232);
    card(
        "executive-gold",
        "Executive Gold",
        "Premium",
        "Dark card with gold trim for senior staff.",
        Color::rgb(17, 24, 39),
    )
    .with_element(CardElement::new(
        "frame",
        0.08,
        0.08,
        ElementKind::Rectangle {
            background_color: None,
            opacity: 1.0,
            border_color: Some(gold),
            border_width: Some(1.5),
        },
    )
    .sized(CR80_WIDTH - 0.16, CR80_HEIGHT - 0.16))
    .with_element(aligned("company", 0.2, 0.18, 2.975, "{{company_name}}", 11.0, true, gold, TextAlign::Center))
    .with_element(photo(0.25, 0.55, 0.85, 1.05, Some(gold)))
    .with_element(label("name", 1.25, 0.6, 1.9, "{{employee_name}}", 13.0, true, cream))
    .with_element(label("designation", 1.25, 0.95, 1.9, "{{designation_name}}", 9.0, false, gold))
    .with_element(label("employee-id", 1.25, 1.25, 1.2, "{{employee_id}}", 9.0, false, cream))
    .with_element(CardElement::qr_code("qr", 2.6, 1.3).sized(0.55, 0.55))
}

fn security_guard() -> CardTemplate {
    let red = Color::rgb(185, 28, 28);
    let ink = Color::rgb(17, 24, 39);
    card(
        "security-guard",
        "Security Personnel",
        "Security",
        "High-visibility red header for guards, with location and validity.",
        Color::WHITE,
    )
    .with_element(rect("header", 0.0, 0.0, CR80_WIDTH, 0.5, red))
    .with_element(aligned("title", 0.0, 0.08, CR80_WIDTH, "SECURITY", 14.0, true, Color::WHITE, TextAlign::Center))
    .with_element(aligned("company", 0.0, 0.3, CR80_WIDTH, "{{company_name}}", 8.0, false, Color::WHITE, TextAlign::Center))
    .with_element(photo(0.15, 0.62, 0.85, 1.05, Some(red)))
    .with_element(label("name", 1.15, 0.65, 1.5, "{{employee_name}}", 12.0, true, ink))
    .with_element(label("designation", 1.15, 1.0, 1.5, "{{designation_name}}", 9.0, false, red))
    .with_element(label("location", 1.15, 1.22, 1.5, "{{location_name}}", 8.0, false, ink))
    .with_element(label("employee-id", 1.15, 1.44, 1.5, "{{employee_id}}", 9.0, true, ink))
    .with_element(label("phone", 1.15, 1.64, 1.5, "{{employee_phone}}", 8.0, false, ink))
    .with_element(CardElement::qr_code("qr", 2.7, 1.4).sized(0.55, 0.55))
    .with_element(rect("footer", 0.0, 2.025, CR80_WIDTH, 0.1, red))
}

fn field_staff() -> CardTemplate {
    let green = Color::rgb(21, 128, 61);
    let ink = Color::rgb(20, 83, 45);
    card(
        "field-staff",
        "Field Staff",
        "Specialized",
        "Green card for field operations listing department, location and validity period.",
        Color::rgb(240, 253, 244),
    )
    .with_element(rect("band", 0.0, 0.0, 0.9, CR80_HEIGHT, green))
    .with_element(photo(0.1, 0.2, 0.7, 0.85, Some(Color::WHITE)))
    .with_element(logo(0.25, 1.4, 0.4))
    .with_element(label("company", 1.05, 0.15, 2.2, "{{company_name}}", 10.0, true, green))
    .with_element(label("name", 1.05, 0.42, 2.2, "{{employee_name}}", 12.0, true, ink))
    .with_element(label("department", 1.05, 0.75, 2.2, "{{department_name}} / {{location_name}}", 8.0, false, ink))
    .with_element(label("employee-id", 1.05, 1.0, 1.5, "{{employee_id}}", 9.0, true, ink))
    .with_element(label(
        "validity",
        1.05,
        1.25,
        1.5,
        "{{id_valid_from_short}} - {{id_valid_until_short}}",
        8.0,
        false,
        ink,
    ))
    .with_element(CardElement::qr_code("qr", 2.6, 1.35).sized(0.6, 0.6))
}
