//! Image loading for raster output.
//!
//! The raster target never fetches anything itself; it asks an
//! [`ImageLoader`] for each image source. [`HttpImageLoader`] is the
//! production loader (HTTP(S) and `data:` URIs, local paths when enabled,
//! with a bounded in-memory cache). [`StaticImageLoader`] serves a fixed map
//! of images and is what tests and offline renders use.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::DynamicImage;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::LanyardError;

/// Request timeout for HTTP fetches.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Decoded images kept by a loader before the oldest is evicted.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Resolves an image source to a decoded bitmap.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, source: &str) -> Result<DynamicImage, LanyardError>;
}

/// Insertion-ordered cache that evicts the oldest entry when full.
#[derive(Debug)]
struct ImageCache {
    entries: HashMap<String, DynamicImage>,
    order: VecDeque<String>,
    capacity: usize,
}

impl ImageCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    fn get(&self, key: &str) -> Option<&DynamicImage> {
        self.entries.get(key)
    }

    fn insert(&mut self, key: String, image: DynamicImage) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.insert(key.clone(), image).is_some() {
            return;
        }
        self.order.push_back(key);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Loads images over HTTP(S), from `data:` URIs and, when enabled, from the
/// filesystem.
///
/// Fetched images are cached by URL, so a company logo shared by a whole
/// print batch is downloaded once. `data:` URIs carry their own bytes and
/// are never cached. Local files are off by default: a server rendering
/// request-supplied templates must not read its own disk.
#[derive(Clone)]
pub struct HttpImageLoader {
    client: reqwest::Client,
    cache: Arc<RwLock<ImageCache>>,
    local_files: bool,
}

impl HttpImageLoader {
    pub fn new() -> Result<Self, LanyardError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("lanyard/", env!("CARGO_PKG_VERSION")))
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| LanyardError::Image(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            cache: Arc::new(RwLock::new(ImageCache::new(DEFAULT_CACHE_CAPACITY))),
            local_files: false,
        }
    }

    /// Allow plain paths and `file://` sources.
    pub fn with_local_files(mut self, enabled: bool) -> Self {
        self.local_files = enabled;
        self
    }

    /// Keep at most `capacity` decoded images (0 disables caching).
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = Arc::new(RwLock::new(ImageCache::new(capacity)));
        self
    }

    /// Number of cached images.
    pub async fn cached(&self) -> usize {
        self.cache.read().await.len()
    }

    async fn fetch(&self, url: &str) -> Result<DynamicImage, LanyardError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LanyardError::Image(format!("Failed to download {}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(LanyardError::Image(format!(
                "Failed to download {}: HTTP {}",
                url,
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| LanyardError::Image(format!("Failed to read image data: {}", e)))?;
        decode(&bytes)
    }

    async fn read_local(&self, source: &str) -> Result<DynamicImage, LanyardError> {
        if !self.local_files {
            return Err(LanyardError::Image(format!(
                "Local image sources are disabled: {}",
                truncate(source)
            )));
        }
        let path = source.strip_prefix("file://").unwrap_or(source);
        let bytes = tokio::fs::read(Path::new(path)).await?;
        decode(&bytes)
    }
}

#[async_trait]
impl ImageLoader for HttpImageLoader {
    async fn load(&self, source: &str) -> Result<DynamicImage, LanyardError> {
        if source.starts_with("data:") {
            return decode_data_uri(source);
        }
        if let Some(image) = self.cache.read().await.get(source) {
            return Ok(image.clone());
        }

        let image = if source.starts_with("http://") || source.starts_with("https://") {
            self.fetch(source).await?
        } else {
            self.read_local(source).await?
        };

        debug!(source = %truncate(source), "image loaded");
        self.cache.write().await.insert(source.to_string(), image.clone());
        Ok(image)
    }
}

/// Serves images from a fixed map. Unknown sources fail like a 404.
#[derive(Debug, Clone, Default)]
pub struct StaticImageLoader {
    images: HashMap<String, DynamicImage>,
}

impl StaticImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, source: impl Into<String>, image: DynamicImage) -> Self {
        self.images.insert(source.into(), image);
        self
    }
}

#[async_trait]
impl ImageLoader for StaticImageLoader {
    async fn load(&self, source: &str) -> Result<DynamicImage, LanyardError> {
        self.images
            .get(source)
            .cloned()
            .ok_or_else(|| LanyardError::Image(format!("No image for {}", source)))
    }
}

fn decode(bytes: &[u8]) -> Result<DynamicImage, LanyardError> {
    image::load_from_memory(bytes)
        .map_err(|e| LanyardError::Image(format!("Failed to decode image: {}", e)))
}

/// Decode a base64 `data:` URI (`data:image/png;base64,...`).
pub fn decode_data_uri(uri: &str) -> Result<DynamicImage, LanyardError> {
    let (meta, payload) = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or_else(|| LanyardError::Image("Malformed data URI".to_string()))?;
    if !meta.ends_with(";base64") {
        return Err(LanyardError::Image("Only base64 data URIs are supported".to_string()));
    }
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| LanyardError::Image(format!("Invalid base64 image data: {}", e)))?;
    decode(&bytes)
}

/// Data URIs are long; keep log lines readable.
fn truncate(source: &str) -> &str {
    match source.char_indices().nth(64) {
        Some((i, _)) => &source[..i],
        None => source,
    }
}
