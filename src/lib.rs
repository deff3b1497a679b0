use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod api;
pub mod assets;
pub mod config;
pub mod export;
pub mod format;
pub mod invoice;
pub mod payroll;
pub mod sheet;
pub mod state;
pub mod workspace;

pub use crate::config::AppConfig;
pub use crate::state::AppState;

use crate::sheet::ValidationError;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// 1-based rows that failed required-field validation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<usize>,
    /// Header fields that failed validation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<ValidationError>,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            rows: Vec::new(),
            fields: Vec::new(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn conflict(message: &str) -> Self {
        Self::new("Conflict", message)
    }

    pub fn validation(message: &str) -> Self {
        Self::new("ValidationFailed", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }

    pub fn with_rows(mut self, rows: Vec<usize>) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_fields(mut self, fields: Vec<ValidationError>) -> Self {
        self.fields = fields;
        self
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::workspace::get_workspace,
        crate::api::workspace::set_tab,
        crate::api::workspace::update_invoice_header,
        crate::api::workspace::preview_invoice,
        crate::api::workspace::preview_payroll,
        crate::api::sheets::get_sheet,
        crate::api::sheets::add_row,
        crate::api::sheets::remove_row,
        crate::api::sheets::update_field,
        crate::api::sheets::paste,
        crate::api::sheets::validate,
        crate::api::export::request_export,
        crate::api::export::confirm_export,
        crate::api::export::cancel_export,
        crate::api::export::export_status,
        crate::api::export::download,
        crate::api::assets::upload_asset,
        crate::api::assets::clear_asset
    ),
    components(
        schemas(
            api::models::WorkspaceSnapshot,
            api::models::SheetSnapshot,
            api::models::CellError,
            api::models::AssetInfo,
            api::models::SetTabRequest,
            api::models::UpdateFieldRequest,
            api::models::PasteRequest,
            api::models::PasteResponse,
            api::models::ValidateResponse,
            api::models::ExportDocument,
            api::models::ExportRequest,
            api::models::ExportReportResponse,
            api::models::ExportStatusResponse,
            api::models::ClearAssetResponse,
            api::models::UploadAssetRequest,
            export::ExportOutcome,
            export::ExportScope,
            export::ExportState,
            export::BatchReport,
            export::ExportedFile,
            export::FailedExport,
            invoice::InvoiceHeader,
            invoice::InvoiceView,
            invoice::InvoiceTotals,
            invoice::ComputedLine,
            invoice::derive::LineView,
            payroll::PayslipView,
            payroll::PayAmounts,
            sheet::PasteOutcome,
            sheet::FieldDef,
            sheet::FieldKind,
            sheet::ValidationError,
            assets::AssetSlot,
            workspace::Tab,
            workspace::SheetId,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Workspace", description = "Session state and active tab."),
        (name = "Sheets", description = "Row editing, paste-to-fill and validation."),
        (name = "Payroll", description = "Pay slip previews."),
        (name = "Invoice", description = "Invoice header and preview."),
        (name = "Export", description = "Confirmation-gated PDF generation and downloads."),
        (name = "Assets", description = "Logo and signature images.")
    ),
    servers(
        (url = "http://127.0.0.1:8080", description = "Local server")
    )
)]
pub struct ApiDoc;

/// Every route except Swagger UI and metrics.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api").configure(api::config))
        .service(
            web::resource("/downloads/{filename}").route(web::get().to(api::export::download)),
        );
}

pub async fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    dotenvy::dotenv().ok(); // Load .env file
    let config = AppConfig::from_env().context("invalid configuration")?;
    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    let bind = (config.bind_addr.clone(), config.port);
    log::info!(
        "Starting server at http://{}:{} (output: {}, typst: {})",
        bind.0,
        bind.1,
        config.output_dir.display(),
        config.typst_bin
    );

    let app_state = web::Data::new(AppState::new(config));

    let prometheus = PrometheusMetricsBuilder::new("techchef_forms")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create Prometheus metrics middleware: {}", e))?;

    HttpServer::new(move || {
        let app_state = app_state.clone();
        let prometheus = prometheus.clone();
        let cors = Cors::default()
            .allowed_origin("http://localhost:5173")
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://localhost:8080")
            .allowed_origin("http://127.0.0.1:8080")
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus)
            .wrap(cors)
            .app_data(app_state)
            .configure(routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
