//! # Lanyard CLI
//!
//! Command-line interface for rendering ID cards.
//!
//! ## Usage
//!
//! ```bash
//! # List built-in templates
//! lanyard templates
//!
//! # Render one card to PNG at print resolution
//! lanyard render corporate-blue --employee john.json --company acme.json -o john.png --profile print
//!
//! # Write the interactive preview as a standalone HTML page
//! lanyard preview security-guard --employee john.json -o john.html
//!
//! # Compose a print sheet for many employees
//! lanyard print field-staff --employees staff.json -o sheet.html
//!
//! # Run the HTTP server
//! lanyard serve --listen 0.0.0.0:8080
//! ```
//!
//! Templates are given as a built-in id or a path to template JSON.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use lanyard::{
    LanyardError,
    config::{BASE_URL_ENV, DEFAULT_BASE_URL, OutputProfile, RenderConfig},
    geometry::raster_size,
    loader::{HttpImageLoader, ImageLoader},
    print::PrintComposer,
    records::{CompanySettings, DataContext, Employee},
    render::{dom::render_interactive, raster::render_to_buffer},
    server::{self, ServerConfig},
    template::CardTemplate,
    templates,
    verify::{next_employee_id, verification_url},
};

/// Lanyard - ID card renderer
#[derive(Parser, Debug)]
#[command(name = "lanyard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Origin encoded into verification QR codes
    #[arg(long, global = true, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List built-in templates
    Templates {
        /// Dump full template JSON instead of ids
        #[arg(long)]
        json: bool,
    },

    /// Render one card to PNG
    Render {
        /// Built-in template id or template JSON file
        template: String,

        /// Employee record (JSON)
        #[arg(long, value_name = "FILE")]
        employee: PathBuf,

        /// Company settings (JSON)
        #[arg(long, value_name = "FILE")]
        company: Option<PathBuf>,

        /// Output PNG path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Output profile: screen, print or dpi:N
        #[arg(long, default_value = "screen")]
        profile: String,
    },

    /// Write a card's interactive preview as an HTML page
    Preview {
        /// Built-in template id or template JSON file
        template: String,

        /// Employee record (JSON)
        #[arg(long, value_name = "FILE")]
        employee: PathBuf,

        /// Company settings (JSON)
        #[arg(long, value_name = "FILE")]
        company: Option<PathBuf>,

        /// Output HTML path (stdout if omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Print the visual tree as JSON instead of HTML
        #[arg(long)]
        json: bool,
    },

    /// Compose a print sheet for a list of employees
    Print {
        /// Built-in template id or template JSON file
        template: String,

        /// Employee records (JSON array)
        #[arg(long, value_name = "FILE")]
        employees: PathBuf,

        /// Company settings (JSON)
        #[arg(long, value_name = "FILE")]
        company: Option<PathBuf>,

        /// Output HTML path (stdout if omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Embed 300 DPI PNGs instead of live card markup
        #[arg(long)]
        raster: bool,

        /// Sheet title (defaults to "<company> - ID Cards")
        #[arg(long)]
        title: Option<String>,
    },

    /// Print the verification URL for an employee id
    VerifyUrl {
        employee_id: String,
    },

    /// Print the next id in the SF-XXXX sequence
    NextId {
        /// Last issued id
        last: Option<String>,
    },

    /// Run the HTTP server
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "0.0.0.0:8080")]
        listen: String,

        /// Default profile for PNG responses
        #[arg(long, default_value = "screen")]
        profile: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), LanyardError> {
    let cli = Cli::parse();
    let base_url = cli.base_url;

    match cli.command {
        Commands::Templates { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&templates::all())?);
            } else {
                println!("Available templates:");
                for template in templates::all() {
                    println!("  {:<16} {} ({})", template.id, template.name, template.category);
                }
            }
        }

        Commands::Render {
            template,
            employee,
            company,
            output,
            profile,
        } => {
            let template = load_template(&template)?;
            let ctx = load_context(&employee, company.as_deref())?;
            let config = RenderConfig::new(OutputProfile::parse(&profile)?, base_url);
            raster_size(template.width, template.height, config.dpi)?;
            let loader: Arc<dyn ImageLoader> = Arc::new(HttpImageLoader::new()?.with_local_files(true));

            let img = runtime()?.block_on(render_to_buffer(&template, &ctx, &config, loader));
            img.save(&output)
                .map_err(|e| LanyardError::Image(format!("Failed to save PNG: {}", e)))?;
            println!(
                "Saved {}x{} card to {}",
                img.width(),
                img.height(),
                output.display()
            );
        }

        Commands::Preview {
            template,
            employee,
            company,
            output,
            json,
        } => {
            let template = load_template(&template)?;
            let ctx = load_context(&employee, company.as_deref())?;
            let config = RenderConfig::new(OutputProfile::Screen, base_url);

            let card = render_interactive(&template, &ctx, &config);
            let body = if json {
                serde_json::to_string_pretty(&card)?
            } else {
                card.to_document(&format!("{} - {}", ctx.employee.name, template.name))
            };
            write_output(output.as_deref(), &body)?;
        }

        Commands::Print {
            template,
            employees,
            company,
            output,
            raster,
            title,
        } => {
            let template = load_template(&template)?;
            let employees: Vec<Employee> = read_json(&employees)?;
            let company = load_company(company.as_deref())?;
            let config = if raster {
                RenderConfig::new(OutputProfile::Print, base_url)
            } else {
                RenderConfig::new(OutputProfile::Screen, base_url)
            };

            if raster {
                raster_size(template.width, template.height, config.dpi)?;
            }
            let mut composer = PrintComposer::new(template, company, config);
            if let Some(title) = title {
                composer = composer.with_title(title);
            }
            let sheet = if raster {
                let loader: Arc<dyn ImageLoader> = Arc::new(HttpImageLoader::new()?.with_local_files(true));
                runtime()?.block_on(composer.compose_raster(&employees, loader))
            } else {
                composer.compose_interactive(&employees)
            };
            write_output(output.as_deref(), &sheet.to_html())?;
        }

        Commands::VerifyUrl { employee_id } => {
            println!("{}", verification_url(&employee_id, &base_url));
        }

        Commands::NextId { last } => {
            println!("{}", next_employee_id(last.as_deref()));
        }

        Commands::Serve { listen, profile } => {
            let config = ServerConfig {
                listen_addr: listen,
                render: RenderConfig::new(OutputProfile::parse(&profile)?, base_url),
            };
            runtime()?.block_on(server::serve(config))?;
        }
    }

    Ok(())
}

fn runtime() -> Result<tokio::runtime::Runtime, LanyardError> {
    Ok(tokio::runtime::Runtime::new()?)
}

/// Built-in id first, then a path to template JSON.
fn load_template(name: &str) -> Result<CardTemplate, LanyardError> {
    if let Some(template) = templates::by_name(name) {
        return Ok(template);
    }
    let path = Path::new(name);
    if !path.exists() {
        return Err(LanyardError::Template(format!(
            "Unknown template '{}'. Run `lanyard templates` to see built-in ids.",
            name
        )));
    }
    CardTemplate::from_json(&std::fs::read_to_string(path)?)
}

fn load_company(path: Option<&Path>) -> Result<CompanySettings, LanyardError> {
    match path {
        Some(path) => read_json(path),
        None => Ok(CompanySettings::default()),
    }
}

fn load_context(employee: &Path, company: Option<&Path>) -> Result<DataContext, LanyardError> {
    Ok(DataContext::new(read_json(employee)?, load_company(company)?))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, LanyardError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn write_output(path: Option<&Path>, body: &str) -> Result<(), LanyardError> {
    match path {
        Some(path) => {
            std::fs::write(path, body)?;
            println!("Wrote {}", path.display());
        }
        None => println!("{}", body),
    }
    Ok(())
}
