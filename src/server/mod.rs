//! # HTTP Server for Card Previews and Print Sheets
//!
//! Serves the renderer over HTTP so a web front end can show live previews,
//! fetch print-quality PNGs and open print sheets.
//!
//! ## Usage
//!
//! ```bash
//! LANYARD_BASE_URL=https://cards.example.com lanyard serve --listen 0.0.0.0:8080
//! ```
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /api/templates` | Built-in templates as JSON |
//! | `POST /api/cards/preview` | Visual tree as JSON |
//! | `POST /api/cards/png?dpi=300` | PNG |
//! | `POST /api/cards/print` | Print sheet HTML |
//! | `GET /api/verify-url/:employee_id` | Verification URL as text |

mod handlers;
mod state;

pub use state::{AppState, ServerConfig};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::LanyardError;

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/templates", get(handlers::templates::list))
        .route("/api/cards/preview", post(handlers::cards::preview))
        .route("/api/cards/png", post(handlers::cards::png))
        .route("/api/cards/print", post(handlers::cards::print))
        .route("/api/verify-url/:employee_id", get(handlers::cards::verify_url))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use lanyard::config::RenderConfig;
/// use lanyard::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), lanyard::LanyardError> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
///     render: RenderConfig::default(),
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), LanyardError> {
    let app = router(Arc::new(AppState::new(config.clone())?));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| LanyardError::Config(format!("Failed to bind to {}: {}", config.listen_addr, e)))?;

    info!(
        listen = %config.listen_addr,
        verification_base = %config.render.verification_base_url,
        dpi = config.render.dpi,
        "lanyard HTTP server listening"
    );

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::loader::StaticImageLoader;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    fn app() -> Router {
        let config = ServerConfig {
            listen_addr: "127.0.0.1:0".to_string(),
            render: RenderConfig::new(crate::config::OutputProfile::Screen, "https://example.com"),
        };
        router(Arc::new(AppState::with_loader(
            config,
            Arc::new(StaticImageLoader::new()),
        )))
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_string(res: axum::response::Response) -> String {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_list_templates() {
        let res = app()
            .oneshot(Request::get("/api/templates").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let list: serde_json::Value = serde_json::from_str(&body_string(res).await).unwrap();
        assert_eq!(list.as_array().unwrap().len(), crate::templates::list_templates().len());
    }

    #[tokio::test]
    async fn test_verify_url() {
        let res = app()
            .oneshot(Request::get("/api/verify-url/SF-0042").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_string(res).await, "https://example.com/verify/SF-0042");
    }

    #[tokio::test]
    async fn test_preview_by_id() {
        let req = post_json(
            "/api/cards/preview",
            serde_json::json!({
                "template": "corporate-blue",
                "employee": { "employee_id": "SF-0001", "name": "John Doe" },
                "company": { "company_name": "Acme" }
            }),
        );
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_string(res).await;
        assert!(body.contains("John Doe"));
        assert!(body.contains("\"templateId\":\"corporate-blue\""));
    }

    #[tokio::test]
    async fn test_unknown_template_is_404() {
        let req = post_json(
            "/api/cards/preview",
            serde_json::json!({
                "template": "nope",
                "employee": { "employee_id": "SF-0001", "name": "John Doe" }
            }),
        );
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_inline_template_is_400() {
        let req = post_json(
            "/api/cards/preview",
            serde_json::json!({
                "template": { "id": "bad", "name": "Bad", "width": 0.0, "height": 2.0 },
                "employee": { "employee_id": "SF-0001", "name": "John Doe" }
            }),
        );
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_png() {
        let req = post_json(
            "/api/cards/png?dpi=150",
            serde_json::json!({
                "template": { "id": "plain", "name": "Plain", "width": 2.0, "height": 1.0 },
                "employee": { "employee_id": "SF-0001", "name": "John Doe" }
            }),
        );
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "image/png");
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (300, 150));
    }

    #[tokio::test]
    async fn test_oversized_png_is_400() {
        let req = post_json(
            "/api/cards/png",
            serde_json::json!({
                "template": { "id": "huge", "name": "Huge", "width": 1e8, "height": 1e8 },
                "employee": { "employee_id": "SF-0001", "name": "John Doe" }
            }),
        );
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_oversized_raster_print_is_400() {
        let req = post_json(
            "/api/cards/print",
            serde_json::json!({
                "template": { "id": "huge", "name": "Huge", "width": 500.0, "height": 500.0 },
                "employees": [{ "employee_id": "SF-0001", "name": "John Doe" }],
                "raster": true
            }),
        );
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_server_loader_ignores_local_paths() {
        let path = std::env::temp_dir().join(format!("lanyard-server-{}.png", std::process::id()));
        let green = image::RgbaImage::from_pixel(4, 4, image::Rgba([0, 255, 0, 255]));
        std::fs::write(&path, crate::render::raster::encode_png(&green).unwrap()).unwrap();

        let config = ServerConfig {
            listen_addr: "127.0.0.1:0".to_string(),
            render: RenderConfig::new(crate::config::OutputProfile::Screen, "https://example.com"),
        };
        let app = router(Arc::new(AppState::new(config).unwrap()));
        let req = post_json(
            "/api/cards/png",
            serde_json::json!({
                "template": {
                    "id": "photo", "name": "Photo", "width": 1.0, "height": 1.0,
                    "elements": [{
                        "type": "image", "id": "photo", "x": 0.0, "y": 0.0,
                        "width": 1.0, "height": 1.0, "source": "{{employee_photo}}"
                    }]
                },
                "employee": {
                    "employee_id": "SF-0001", "name": "John Doe",
                    "photo_url": path.to_string_lossy()
                }
            }),
        );
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(48, 48), &image::Rgba([255, 255, 255, 255]));
    }

    #[tokio::test]
    async fn test_print_sheet() {
        let req = post_json(
            "/api/cards/print",
            serde_json::json!({
                "template": "security-guard",
                "employees": [
                    { "employee_id": "SF-0001", "name": "John Doe" },
                    { "employee_id": "SF-0002", "name": "Jane Roe" }
                ],
                "company": { "company_name": "SecureForce" }
            }),
        );
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let html = body_string(res).await;
        assert!(html.contains("<title>SecureForce - ID Cards</title>"));
        assert_eq!(html.matches("data-employee=").count(), 2);
    }
}
