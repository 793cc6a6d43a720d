//! # Lanyard - ID Card Rendering Library
//!
//! Lanyard turns a card template (a fixed-size layout in inches holding
//! rectangles, circles, lines, text, images and a QR code) plus one
//! employee's data into a rendered card. It provides:
//!
//! - **Interactive target**: an HTML-ready visual tree in percent units that
//!   scales with its container
//! - **Raster target**: a pixel image at any DPI, repainted as images arrive
//! - **Print sheets**: many cards composed into one printable page
//! - **Verification**: the URL a card's QR code points to
//!
//! Both targets walk the same template through the same code, so text
//! substitution, element defaults and paint order never drift apart.
//!
//! ## Quick Start
//!
//! ```
//! use lanyard::{
//!     config::RenderConfig,
//!     records::{CompanySettings, DataContext, Employee},
//!     render::dom::render_interactive,
//!     templates,
//! };
//!
//! let template = templates::by_name("corporate-blue").unwrap();
//! let ctx = DataContext::new(
//!     Employee::new("SF-0042", "Jane Roe"),
//!     CompanySettings::new("Acme"),
//! );
//!
//! let card = render_interactive(&template, &ctx, &RenderConfig::default());
//! assert!(card.to_html().contains("Jane Roe"));
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`template`] | Template and element model |
//! | [`templates`] | Built-in card designs |
//! | [`records`] | Employee and company input records |
//! | [`substitute`] | `{{token}}` replacement |
//! | [`geometry`] | Inch, percent and pixel conversions |
//! | [`render`] | Shared walk, interactive and raster targets |
//! | [`loader`] | Image fetching and caching |
//! | [`print`] | Print sheet composition |
//! | [`verify`] | Verification URLs and card status |
//! | [`server`] | HTTP API |
//! | [`config`] | Output profiles and render settings |
//! | [`error`] | Error types |

pub mod config;
pub mod error;
pub mod geometry;
pub mod loader;
pub mod print;
pub mod records;
pub mod render;
pub mod server;
pub mod substitute;
pub mod template;
pub mod templates;
pub mod verify;

// Re-exports for convenience
pub use config::RenderConfig;
pub use error::LanyardError;
pub use render::dom::render_interactive;
pub use render::raster::render_to_buffer;
pub use template::CardTemplate;
pub use verify::verification_url;
