//! # Render Configuration
//!
//! Everything a render call needs besides the template and the data: the
//! output resolution and the origin used to build verification URLs.
//!
//! Configuration is always passed explicitly. Only [`RenderConfig::from_env`]
//! reads the environment, and only the binary and the server call it.
//!
//! ## Profiles
//!
//! | Profile | DPI | Used for |
//! |---------|-----|----------|
//! | `screen` | 96 | On-screen preview parity with CSS pixels |
//! | `print` | 300 | Print-quality raster output |
//! | `dpi:N` | N | Anything else |
//!
//! ```
//! use lanyard::config::OutputProfile;
//!
//! let profile = OutputProfile::parse("print").unwrap();
//! assert_eq!(profile.dpi(), 300.0);
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::LanyardError;

/// CSS reference pixel density. Screen previews render at this DPI.
pub const SCREEN_DPI: f32 = 96.0;

/// Print-quality raster density.
pub const PRINT_DPI: f32 = 300.0;

/// Verification origin used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Environment variable holding the verification origin.
pub const BASE_URL_ENV: &str = "LANYARD_BASE_URL";

/// How long a raster render waits for one image before giving up on it.
pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Output resolution selected by render target.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputProfile {
    /// 96 DPI, matches the interactive preview.
    #[default]
    Screen,
    /// 300 DPI, for printers and exported images.
    Print,
    /// Arbitrary positive DPI.
    Custom { dpi: f32 },
}

impl OutputProfile {
    /// Dots per inch for this profile.
    pub fn dpi(&self) -> f32 {
        match self {
            Self::Screen => SCREEN_DPI,
            Self::Print => PRINT_DPI,
            Self::Custom { dpi } => *dpi,
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> String {
        match self {
            Self::Screen => "screen".to_string(),
            Self::Print => "print".to_string(),
            Self::Custom { dpi } => format!("dpi:{}", dpi),
        }
    }

    /// Parse a profile string (CLI args, query strings).
    ///
    /// Formats:
    /// - `"screen"` → 96 DPI
    /// - `"print"` → 300 DPI
    /// - `"dpi:N"` or a bare number → custom DPI
    pub fn parse(s: &str) -> Result<Self, LanyardError> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "screen" => Ok(Self::Screen),
            "print" => Ok(Self::Print),
            other => {
                let raw = other.strip_prefix("dpi:").unwrap_or(other);
                let dpi: f32 = raw.parse().map_err(|_| {
                    LanyardError::Config(format!(
                        "Unknown profile '{}'. Use 'screen', 'print' or 'dpi:N'",
                        s
                    ))
                })?;
                if !dpi.is_finite() || dpi <= 0.0 {
                    return Err(LanyardError::Config(format!("DPI must be positive, got {}", dpi)));
                }
                Ok(Self::Custom { dpi })
            }
        }
    }
}

/// Parameters shared by every render call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Raster resolution. The interactive target ignores it.
    pub dpi: f32,
    /// Origin for verification URLs (e.g. `https://cards.example.com`).
    pub verification_base_url: String,
    /// Per-image load deadline for raster renders. An image that misses it
    /// is treated as failed and its region keeps the background.
    #[serde(default = "default_image_timeout")]
    pub image_timeout: Duration,
}

fn default_image_timeout() -> Duration {
    DEFAULT_IMAGE_TIMEOUT
}

impl RenderConfig {
    pub fn new(profile: OutputProfile, verification_base_url: impl Into<String>) -> Self {
        Self {
            dpi: profile.dpi(),
            verification_base_url: verification_base_url.into(),
            image_timeout: DEFAULT_IMAGE_TIMEOUT,
        }
    }

    /// Build a config from `LANYARD_BASE_URL`, falling back to the local default.
    pub fn from_env(profile: OutputProfile) -> Self {
        let base = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::new(profile, base)
    }

    /// Same config at a different resolution.
    pub fn with_dpi(&self, dpi: f32) -> Self {
        Self {
            dpi,
            ..self.clone()
        }
    }

    /// Same config with a different per-image deadline.
    pub fn with_image_timeout(&self, image_timeout: Duration) -> Self {
        Self {
            image_timeout,
            ..self.clone()
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new(OutputProfile::Screen, DEFAULT_BASE_URL)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_profiles() {
        assert_eq!(OutputProfile::parse("screen").unwrap(), OutputProfile::Screen);
        assert_eq!(OutputProfile::parse("PRINT").unwrap(), OutputProfile::Print);
    }

    #[test]
    fn test_parse_custom_dpi() {
        let p = OutputProfile::parse("dpi:150").unwrap();
        assert_eq!(p.dpi(), 150.0);
        assert_eq!(OutputProfile::parse("203").unwrap().dpi(), 203.0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(OutputProfile::parse("fax").is_err());
        assert!(OutputProfile::parse("dpi:0").is_err());
        assert!(OutputProfile::parse("dpi:-3").is_err());
    }

    #[test]
    fn test_default_config_is_screen_local() {
        let config = RenderConfig::default();
        assert_eq!(config.dpi, SCREEN_DPI);
        assert_eq!(config.verification_base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_with_dpi_keeps_base_url() {
        let config = RenderConfig::new(OutputProfile::Screen, "https://example.com");
        let print = config.with_dpi(PRINT_DPI);
        assert_eq!(print.dpi, 300.0);
        assert_eq!(print.verification_base_url, "https://example.com");
        assert_eq!(print.image_timeout, DEFAULT_IMAGE_TIMEOUT);
    }

    #[test]
    fn test_image_timeout_defaults_when_absent() {
        let config: RenderConfig =
            serde_json::from_str(r#"{"dpi": 300.0, "verification_base_url": "https://example.com"}"#).unwrap();
        assert_eq!(config.image_timeout, DEFAULT_IMAGE_TIMEOUT);
        let quick = config.with_image_timeout(Duration::from_millis(50));
        assert_eq!(quick.image_timeout, Duration::from_millis(50));
        assert_eq!(quick.dpi, 300.0);
    }
}
