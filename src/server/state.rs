//! Server state and configuration.

use std::sync::Arc;

use crate::config::RenderConfig;
use crate::error::LanyardError;
use crate::loader::{HttpImageLoader, ImageLoader};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Defaults for every render; PNG requests may override the DPI.
    pub render: RenderConfig,
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    /// Shared so logos and photos are cached across requests.
    pub loader: Arc<dyn ImageLoader>,
}

impl AppState {
    /// State with a network loader. Request-supplied sources never reach
    /// the local filesystem.
    pub fn new(config: ServerConfig) -> Result<Self, LanyardError> {
        let loader = HttpImageLoader::new()?.with_local_files(false);
        Ok(Self::with_loader(config, Arc::new(loader)))
    }

    pub fn with_loader(config: ServerConfig, loader: Arc<dyn ImageLoader>) -> Self {
        Self { config, loader }
    }
}
