//! Built-in template listing.

use axum::Json;

use crate::template::CardTemplate;
use crate::templates;

/// Handle GET /api/templates - list built-in templates with their elements.
pub async fn list() -> Json<Vec<CardTemplate>> {
    Json(templates::all())
}
