//! # Card Rendering Tests
//!
//! End-to-end checks across the public API: geometry mapping, substitution,
//! both render targets, verification URLs and batch printing.
//!
//! No test touches the network; images come from a `StaticImageLoader`.

use image::{DynamicImage, RgbaImage};
use lanyard::config::{OutputProfile, RenderConfig};
use lanyard::geometry::InchBox;
use lanyard::loader::StaticImageLoader;
use lanyard::print::{CardBody, PrintComposer};
use lanyard::records::{CompanySettings, DataContext, Employee, NamedRef};
use lanyard::render::dom::{NodeContent, render_interactive};
use lanyard::render::qr;
use lanyard::render::raster::{display_list, render_to_buffer};
use lanyard::render::text::FontBook;
use lanyard::substitute::substitute;
use lanyard::template::{CardElement, CardTemplate, Color, FontWeight};
use lanyard::templates;
use lanyard::verify::verification_url;
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::sync::Arc;

const GREEN: Color = Color::rgb(0, 255, 0);
const BLUE: Color = Color::rgb(0, 0, 255);

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn john() -> Employee {
    let mut employee = Employee::new("SF-0001", "John Doe");
    employee.phone = "+91 98765 43210".to_string();
    employee.designation = Some(NamedRef::new("Security Guard"));
    employee.department = Some(NamedRef::new("Operations"));
    employee.location = Some(NamedRef::new("Pune"));
    employee
}

fn ctx(employee: Employee) -> DataContext {
    DataContext::new(employee, CompanySettings::new("SecureForce"))
}

fn config() -> RenderConfig {
    RenderConfig::new(OutputProfile::Screen, "https://example.com")
}

fn solid(color: Color, w: u32, h: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, color.to_rgba()))
}

fn photo_template() -> CardTemplate {
    CardTemplate::new("photo", "Photo", 1.0, 1.0)
        .with_element(CardElement::image("photo", 0.0, 0.0, "{{employee_photo}}").sized(0.5, 0.5))
}

// ============================================================================
// GEOMETRY
// ============================================================================

#[test]
fn test_percent_round_trip_for_builtin_templates() {
    for template in templates::all() {
        for element in &template.elements {
            let inches = element.inch_box();
            let back = inches
                .to_percent(template.width, template.height)
                .to_inches(template.width, template.height);

            let close = |a: f32, b: f32| (a - b).abs() < 1e-4;
            assert!(close(back.x, inches.x), "{}/{} x", template.id, element.id);
            assert!(close(back.y, inches.y), "{}/{} y", template.id, element.id);
            match (back.width, inches.width) {
                (Some(a), Some(b)) => assert!(close(a, b)),
                (a, b) => assert_eq!(a, b),
            }
            match (back.height, inches.height) {
                (Some(a), Some(b)) => assert!(close(a, b)),
                (a, b) => assert_eq!(a, b),
            }
        }
    }
}

#[test]
fn test_pixel_geometry_scales_linearly() {
    let b = InchBox {
        x: 0.3,
        y: 1.1,
        width: Some(2.0),
        height: Some(0.45),
    };
    for (d1, d2) in [(96.0_f32, 300.0_f32), (72.0, 600.0), (150.0, 96.0)] {
        let p1 = b.to_pixels(d1);
        let p2 = b.to_pixels(d2);
        let k = d2 / d1;
        let close = |a: f32, b: f32| (a - b).abs() <= 1e-3 * b.abs().max(1.0);
        assert!(close(p2.x, p1.x * k));
        assert!(close(p2.y, p1.y * k));
        assert!(close(p2.width.unwrap(), p1.width.unwrap() * k));
        assert!(close(p2.height.unwrap(), p1.height.unwrap() * k));
    }
}

// ============================================================================
// SUBSTITUTION
// ============================================================================

#[test]
fn test_name_and_id_substitution() {
    assert_eq!(
        substitute("{{employee_name}} ({{employee_id}})", &ctx(john())),
        "John Doe (SF-0001)"
    );
}

#[test]
fn test_substitution_in_both_targets() {
    let template = CardTemplate::new("t", "T", 2.0, 1.0)
        .with_element(CardElement::text("who", 0.1, 0.1, "{{employee_name}} ({{employee_id}})"));

    let card = render_interactive(&template, &ctx(john()), &config());
    assert_eq!(
        card.node("who").map(|n| n.content.clone()),
        Some(NodeContent::Text {
            text: "John Doe (SF-0001)".to_string()
        })
    );

    let fonts = FontBook::bitmap();
    let list = display_list(&template, &ctx(john()), &config(), &fonts);
    let lines = list.text_lines(0).unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].text, "John Doe (SF-0001)");
}

// ============================================================================
// MISSING DATA
// ============================================================================

#[test]
fn test_missing_photo_emits_no_node() {
    let employee = john();
    assert_eq!(employee.photo_url, None);
    let card = render_interactive(&photo_template(), &ctx(employee), &config());
    assert!(card.node("photo").is_none());
    assert!(card.nodes.is_empty());
}

#[tokio::test]
async fn test_missing_photo_leaves_background() {
    let template = photo_template().with_background(BLUE);
    let loader = Arc::new(StaticImageLoader::new());
    let img = render_to_buffer(&template, &ctx(john()), &config(), loader).await;
    assert_eq!(img.dimensions(), (96, 96));
    assert_eq!(img.get_pixel(20, 20), &BLUE.to_rgba());
}

#[tokio::test]
async fn test_photo_is_drawn_when_present() {
    let mut employee = john();
    employee.photo_url = Some("mem://john.png".to_string());
    let loader = Arc::new(StaticImageLoader::new().with_image("mem://john.png", solid(GREEN, 8, 8)));
    let img = render_to_buffer(&photo_template(), &ctx(employee), &config(), loader).await;
    assert_eq!(img.get_pixel(20, 20), &GREEN.to_rgba());
    assert_eq!(img.get_pixel(70, 70), &Color::WHITE.to_rgba());
}

// ============================================================================
// VERIFICATION
// ============================================================================

#[test]
fn test_verification_url() {
    assert_eq!(
        verification_url("SF-0042", "https://example.com"),
        "https://example.com/verify/SF-0042"
    );
}

#[test]
fn test_qr_node_encodes_configured_base() {
    let template = CardTemplate::new("t", "T", 2.0, 1.0)
        .with_element(CardElement::qr_code("qr", 1.0, 0.2).sized(0.6, 0.6));
    let card = render_interactive(&template, &ctx(john()), &config());
    let node = card.node("qr").unwrap();
    let NodeContent::Svg { svg, .. } = &node.content else {
        panic!("expected inline SVG, got {:?}", node.content);
    };

    let expected = qr::encode("https://example.com/verify/SF-0001")
        .unwrap()
        .to_svg(Color::BLACK, Color::WHITE);
    assert_eq!(svg, &expected);

    let other_base = RenderConfig::new(OutputProfile::Screen, "https://cards.example.org");
    let card = render_interactive(&template, &ctx(john()), &other_base);
    let NodeContent::Svg { svg, .. } = &card.node("qr").unwrap().content else {
        panic!("expected inline SVG");
    };
    assert_ne!(svg, &expected);
}

// ============================================================================
// WORD WRAP AND PAINT ORDER
// ============================================================================

#[test]
fn test_security_guard_wraps_in_narrow_box() {
    let fonts = FontBook::bitmap();
    let face = fonts.face(FontWeight::Normal, 12.0);
    let box_width = face.measure("abc");

    let template = CardTemplate::new("t", "T", 2.0, 1.0)
        .with_element(CardElement::text("role", 0.1, 0.1, "SECURITY GUARD").with_width(box_width / 96.0));
    let list = display_list(&template, &ctx(john()), &config(), &fonts);
    let lines = list.text_lines(0).unwrap();

    assert!(lines.len() >= 2);
    let longest_word = ["SECURITY", "GUARD"]
        .iter()
        .map(|w| face.measure(w))
        .fold(0.0_f32, f32::max);
    for line in lines {
        assert!(!line.text.contains(' '), "multi-word line {:?}", line.text);
        assert!(line.width <= box_width.max(longest_word) + 1e-3);
    }
}

#[tokio::test]
async fn test_later_element_paints_over_earlier() {
    let template = CardTemplate::new("t", "T", 1.0, 1.0)
        .with_element(CardElement::rectangle("a", 0.0, 0.0, BLUE).sized(0.75, 0.75))
        .with_element(CardElement::rectangle("b", 0.25, 0.25, GREEN).sized(0.75, 0.75));

    let img = render_to_buffer(&template, &ctx(john()), &config(), Arc::new(StaticImageLoader::new())).await;
    assert_eq!(img.get_pixel(48, 48), &GREEN.to_rgba());
    assert_eq!(img.get_pixel(10, 10), &BLUE.to_rgba());
    assert_eq!(img.get_pixel(90, 90), &GREEN.to_rgba());

    let card = render_interactive(&template, &ctx(john()), &config());
    let order: Vec<&str> = card.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(order, vec!["a", "b"]);
}

#[test]
fn test_display_list_ignores_unloaded_images() {
    let fonts = FontBook::bitmap();
    let mut employee = john();
    employee.photo_url = Some("mem://john.png".to_string());
    let list = display_list(&photo_template(), &ctx(employee), &config(), &fonts);
    assert_eq!(list.images.len(), 1);
    let img = list.paint(&fonts, &HashMap::new());
    assert_eq!(img.get_pixel(10, 10), &Color::WHITE.to_rgba());
}

// ============================================================================
// BATCH
// ============================================================================

#[test]
fn test_batch_outputs_are_independent() {
    let template = templates::by_name("security-guard").unwrap();
    let mut employees = vec![john(), Employee::new("SF-0002", "Jane Roe")];
    let composer = PrintComposer::new(template, CompanySettings::new("SecureForce"), config());

    let sheet = composer.compose_interactive(&employees);
    assert_eq!(sheet.len(), 2);
    let before = sheet.cards[1].clone();

    // Changing card 0's input and re-rendering leaves card 1 untouched.
    employees[0].name = "Someone Else".to_string();
    let again = composer.compose_interactive(&employees[..1]);
    assert_eq!(sheet.cards[1], before);
    assert_ne!(again.cards[0], sheet.cards[0]);

    let CardBody::Interactive(card) = &sheet.cards[1].body else {
        panic!("expected interactive body");
    };
    assert!(card.to_html().contains("Jane Roe"));
    assert!(!card.to_html().contains("John Doe"));
}

#[tokio::test]
async fn test_raster_batch_survives_broken_photo() {
    let template = photo_template();
    let mut broken = john();
    broken.photo_url = Some("mem://missing.png".to_string());
    let mut ok = Employee::new("SF-0002", "Jane Roe");
    ok.photo_url = Some("mem://jane.png".to_string());

    let loader = Arc::new(StaticImageLoader::new().with_image("mem://jane.png", solid(GREEN, 8, 8)));
    let composer = PrintComposer::new(template, CompanySettings::default(), config());
    let sheet = composer.compose_raster(&[broken, ok], loader).await;

    let ids: Vec<&str> = sheet.cards.iter().map(|c| c.employee_id.as_str()).collect();
    assert_eq!(ids, vec!["SF-0001", "SF-0002"]);

    let CardBody::Png(png) = &sheet.cards[1].body else {
        panic!("expected PNG body");
    };
    let img = image::load_from_memory(png).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(20, 20), &GREEN.to_rgba());
}

#[test]
fn test_print_sheet_keeps_cards_whole() {
    let template = templates::by_name("corporate-blue").unwrap();
    let composer = PrintComposer::new(template, CompanySettings::new("Acme"), config());
    let html = composer.compose_interactive(&[john()]).to_html();
    assert!(html.contains("<title>Acme - ID Cards</title>"));
    assert!(html.contains("page-break-inside: avoid"));
    assert!(html.contains("margin: 0.25in"));
    assert!(html.contains("width:3.375in;height:2.125in"));
}
