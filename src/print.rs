//! # Print Composer
//!
//! Collects rendered cards into one print-ready HTML document. Each card
//! occupies a box of the template's physical size; boxes flow in a wrapping
//! grid on landscape pages and are never split across a page break.
//!
//! Cards are rendered independently, each from its own data context. Interactive
//! batches render in parallel on the rayon pool; raster batches run one tokio
//! task per card. A card that fails to render is logged and left out of the
//! sheet without affecting the rest of the batch.

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::config::RenderConfig;
use crate::loader::ImageLoader;
use crate::records::{CompanySettings, DataContext, Employee};
use crate::render::dom::{InteractiveCard, escape_html, render_interactive};
use crate::render::raster::{encode_png, render_to_buffer};
use crate::template::CardTemplate;

/// Page margin on every side.
pub const PAGE_MARGIN: &str = "0.25in";

/// Gap between cards.
pub const CARD_GAP: &str = "12px";

/// Rendered body of one card.
#[derive(Debug, Clone, PartialEq)]
pub enum CardBody {
    Interactive(InteractiveCard),
    Png(Vec<u8>),
}

/// One card in a print sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintCard {
    pub employee_id: String,
    /// Inches.
    pub width: f32,
    pub height: f32,
    pub body: CardBody,
}

impl PrintCard {
    fn to_html(&self) -> String {
        let inner = match &self.body {
            CardBody::Interactive(card) => card.to_html(),
            CardBody::Png(png) => format!(
                r#"<img src="data:image/png;base64,{}" alt="{}" style="display:block;width:100%;height:100%">"#,
                STANDARD.encode(png),
                escape_html(&self.employee_id)
            ),
        };
        format!(
            r#"<div class="id-card" data-employee="{}" style="width:{}in;height:{}in">{}</div>"#,
            escape_html(&self.employee_id),
            self.width,
            self.height,
            inner
        )
    }
}

/// A print document of cards.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintSheet {
    pub title: String,
    pub cards: Vec<PrintCard>,
}

impl PrintSheet {
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The complete HTML document, ready for a print dialog.
    pub fn to_html(&self) -> String {
        let mut cards = String::new();
        for card in &self.cards {
            cards.push_str(&card.to_html());
            cards.push('\n');
        }
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
* {{ margin: 0; padding: 0; box-sizing: border-box; }}
body {{ font-family: Arial, sans-serif; }}
@page {{ size: landscape; margin: {margin}; }}
.id-cards-grid {{ display: flex; flex-wrap: wrap; gap: {gap}; justify-content: center; }}
.id-cards-grid > .id-card {{ border: 1px solid #ddd; overflow: hidden; page-break-inside: avoid; break-inside: avoid; }}
</style>
</head>
<body>
<div class="id-cards-grid">
{cards}</div>
</body>
</html>
"#,
            title = escape_html(&self.title),
            margin = PAGE_MARGIN,
            gap = CARD_GAP,
            cards = cards,
        )
    }
}

/// Default sheet title for a company.
pub fn sheet_title(company: &CompanySettings) -> String {
    if company.company_name.trim().is_empty() {
        "ID Cards".to_string()
    } else {
        format!("{} - ID Cards", company.company_name)
    }
}

/// Renders batches of cards for one template and company.
pub struct PrintComposer {
    template: Arc<CardTemplate>,
    company: CompanySettings,
    config: RenderConfig,
    title: String,
}

impl PrintComposer {
    pub fn new(template: CardTemplate, company: CompanySettings, config: RenderConfig) -> Self {
        let title = sheet_title(&company);
        Self {
            template: Arc::new(template),
            company,
            config,
            title,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    fn context(&self, employee: &Employee) -> DataContext {
        DataContext::new(employee.clone(), self.company.clone())
    }

    /// Render every employee's card as a visual tree, in input order.
    #[instrument(skip_all, fields(template = %self.template.id, cards = employees.len()))]
    pub fn compose_interactive(&self, employees: &[Employee]) -> PrintSheet {
        let cards: Vec<PrintCard> = employees
            .par_iter()
            .map(|employee| {
                let card = render_interactive(&self.template, &self.context(employee), &self.config);
                PrintCard {
                    employee_id: employee.employee_id.clone(),
                    width: self.template.width,
                    height: self.template.height,
                    body: CardBody::Interactive(card),
                }
            })
            .collect();
        info!(cards = cards.len(), "composed interactive print sheet");
        PrintSheet {
            title: self.title.clone(),
            cards,
        }
    }

    /// Render every employee's card as a PNG at the configured DPI, waiting
    /// for images. Cards that fail are dropped from the sheet.
    #[instrument(skip_all, fields(template = %self.template.id, cards = employees.len()))]
    pub async fn compose_raster(
        &self,
        employees: &[Employee],
        loader: Arc<dyn ImageLoader>,
    ) -> PrintSheet {
        let tasks: Vec<_> = employees
            .iter()
            .map(|employee| {
                let template = Arc::clone(&self.template);
                let ctx = self.context(employee);
                let config = self.config.clone();
                let loader = Arc::clone(&loader);
                let employee_id = employee.employee_id.clone();
                let handle = tokio::spawn(async move {
                    let img = render_to_buffer(&template, &ctx, &config, loader).await;
                    encode_png(&img)
                });
                (employee_id, handle)
            })
            .collect();

        let mut cards = Vec::with_capacity(tasks.len());
        for (employee_id, handle) in tasks {
            match handle.await {
                Ok(Ok(png)) => cards.push(PrintCard {
                    employee_id,
                    width: self.template.width,
                    height: self.template.height,
                    body: CardBody::Png(png),
                }),
                Ok(Err(e)) => warn!(employee = %employee_id, error = %e, "card skipped"),
                Err(e) => warn!(employee = %employee_id, error = %e, "card render task failed"),
            }
        }
        info!(cards = cards.len(), "composed raster print sheet");
        PrintSheet {
            title: self.title.clone(),
            cards,
        }
    }
}
