//! Card preview, raster and print handlers.
//!
//! Every request names a template, either by built-in id or inline as full
//! template JSON, and carries the employee (and optionally company) records
//! to render it with.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::geometry::raster_size;
use crate::records::{CompanySettings, DataContext, Employee};
use crate::print::PrintComposer;
use crate::render::dom::{InteractiveCard, render_interactive};
use crate::render::raster::{encode_png, render_to_buffer};
use crate::template::CardTemplate;
use crate::templates;
use crate::verify::verification_url;

use super::super::state::AppState;

type HandlerError = (StatusCode, String);

/// A built-in template id or a complete inline template.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TemplateRef {
    Id(String),
    Inline(CardTemplate),
}

impl TemplateRef {
    fn resolve(self) -> Result<CardTemplate, HandlerError> {
        match self {
            Self::Id(id) => templates::by_name(&id)
                .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Unknown template: {}", id))),
            Self::Inline(template) => {
                template
                    .validate()
                    .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
                Ok(template)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CardRequest {
    pub template: TemplateRef,
    pub employee: Employee,
    #[serde(default)]
    pub company: CompanySettings,
}

#[derive(Debug, Deserialize)]
pub struct PrintRequest {
    pub template: TemplateRef,
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub company: CompanySettings,
    /// Embed 300 DPI PNGs instead of live card markup.
    #[serde(default)]
    pub raster: bool,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PngQuery {
    pub dpi: Option<f32>,
}

/// Handle POST /api/cards/preview - render a card as a visual tree.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CardRequest>,
) -> Result<Json<InteractiveCard>, HandlerError> {
    let template = req.template.resolve()?;
    let ctx = DataContext::new(req.employee, req.company);
    Ok(Json(render_interactive(&template, &ctx, &state.config.render)))
}

/// Handle POST /api/cards/png - render a card as PNG.
pub async fn png(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PngQuery>,
    Json(req): Json<CardRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let template = req.template.resolve()?;
    let config = match query.dpi {
        Some(dpi) if dpi.is_finite() && dpi > 0.0 && dpi <= 1200.0 => state.config.render.with_dpi(dpi),
        Some(dpi) => return Err((StatusCode::BAD_REQUEST, format!("Invalid DPI: {}", dpi))),
        None => state.config.render.clone(),
    };
    raster_size(template.width, template.height, config.dpi)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let ctx = DataContext::new(req.employee, req.company);

    let img = render_to_buffer(&template, &ctx, &config, Arc::clone(&state.loader)).await;
    let png_bytes = encode_png(&img).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Preview render failed: {}", e),
        )
    })?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png_bytes))
}

/// Handle POST /api/cards/print - compose a print sheet.
pub async fn print(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PrintRequest>,
) -> Result<Html<String>, HandlerError> {
    let template = req.template.resolve()?;
    let config = if req.raster {
        state.config.render.with_dpi(crate::config::PRINT_DPI)
    } else {
        state.config.render.clone()
    };
    if req.raster {
        raster_size(template.width, template.height, config.dpi)
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    }
    let mut composer = PrintComposer::new(template, req.company, config);
    if let Some(title) = req.title {
        composer = composer.with_title(title);
    }

    let sheet = if req.raster {
        composer
            .compose_raster(&req.employees, Arc::clone(&state.loader))
            .await
    } else {
        // rayon fan-out; keep it off the async workers.
        let employees = req.employees;
        tokio::task::spawn_blocking(move || composer.compose_interactive(&employees))
            .await
            .map_err(|e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Print sheet render failed: {}", e),
                )
            })?
    };
    info!(cards = sheet.len(), raster = req.raster, "print sheet ready");
    Ok(Html(sheet.to_html()))
}

/// Handle GET /api/verify-url/:employee_id - the URL a card's QR code encodes.
pub async fn verify_url(
    State(state): State<Arc<AppState>>,
    Path(employee_id): Path<String>,
) -> String {
    verification_url(&employee_id, &state.config.render.verification_base_url)
}
