//! # Error Types
//!
//! This module defines error types used throughout the lanyard library.
//!
//! Rendering a card never fails as a whole: missing data, broken images and
//! unencodable QR payloads degrade to "draw nothing" and are logged. The
//! variants here cover the operations around rendering (loading templates,
//! fetching images, parsing configuration, writing output).

use thiserror::Error;

/// Main error type for lanyard operations
#[derive(Debug, Error)]
pub enum LanyardError {
    /// Template failed validation (non-positive size, duplicate element id)
    #[error("Invalid template: {0}")]
    Template(String),

    /// Image fetching or decoding error
    #[error("Image error: {0}")]
    Image(String),

    /// QR code could not be encoded
    #[error("QR code error: {0}")]
    Qr(String),

    /// No usable font for raster text
    #[error("Font error: {0}")]
    Font(String),

    /// Invalid configuration value (profile, DPI, address)
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
