use actix_files::NamedFile;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{info, warn};
use sanitize_filename::sanitize;

use super::export_error_response;
use super::models::{ExportReportResponse, ExportRequest, ExportStatusResponse};
use crate::export::{ExportOutcome, ExportScope};
use crate::state::AppState;
use crate::ErrorResponse;

#[utoipa::path(
    context_path = "/api",
    tag = "Export",
    post,
    path = "/export",
    request_body = ExportRequest,
    responses(
        (status = 202, description = "Validated; awaiting confirmation", body = ExportOutcome),
        (status = 200, description = "Generated without confirmation", body = ExportReportResponse),
        (status = 409, description = "Another export is pending or running", body = ErrorResponse),
        (status = 422, description = "Required fields are missing", body = ErrorResponse)
    )
)]
pub async fn request_export(
    state: web::Data<AppState>,
    item: web::Json<ExportRequest>,
) -> impl Responder {
    info!("export requested: {:?}", item.target());
    match state
        .exporter
        .request(&state.workspace, item.target(), item.skip_confirmation)
        .await
    {
        Ok(outcome @ ExportOutcome::ConfirmationRequired { .. }) => {
            HttpResponse::Accepted().json(outcome)
        }
        Ok(ExportOutcome::Completed { report }) => {
            HttpResponse::Ok().json(ExportReportResponse::from(report))
        }
        Err(e) => export_error_response(&e),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Export",
    post,
    path = "/export/confirm",
    responses(
        (status = 200, description = "Documents generated; per-document outcome", body = ExportReportResponse),
        (status = 409, description = "Nothing awaiting confirmation", body = ErrorResponse),
        (status = 422, description = "Rows became invalid while the prompt was open", body = ErrorResponse)
    )
)]
pub async fn confirm_export(state: web::Data<AppState>) -> impl Responder {
    match state.exporter.confirm(&state.workspace).await {
        Ok(report) => HttpResponse::Ok().json(ExportReportResponse::from(report)),
        Err(e) => export_error_response(&e),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Export",
    post,
    path = "/export/cancel",
    responses(
        (status = 200, description = "Pending export dismissed", body = ExportScope),
        (status = 409, description = "Nothing awaiting confirmation", body = ErrorResponse)
    )
)]
pub async fn cancel_export(state: web::Data<AppState>) -> impl Responder {
    match state.exporter.cancel(&state.workspace) {
        Ok(scope) => HttpResponse::Ok().json(scope),
        Err(e) => export_error_response(&e),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Export",
    get,
    path = "/export",
    responses(
        (status = 200, description = "Export state and documents currently rendering", body = ExportStatusResponse)
    )
)]
pub async fn export_status(state: web::Data<AppState>) -> impl Responder {
    let export = state.workspace.lock().export.clone();
    HttpResponse::Ok().json(ExportStatusResponse {
        export,
        staged_documents: state.exporter.staging().mounted_labels(),
    })
}

#[utoipa::path(
    tag = "Export",
    get,
    path = "/downloads/{filename}",
    params(
        ("filename" = String, Path, description = "File name from an export report")
    ),
    responses(
        (status = 200, description = "Generated PDF", content_type = "application/pdf"),
        (status = 400, description = "Invalid file name", body = ErrorResponse),
        (status = 404, description = "No such file", body = ErrorResponse)
    )
)]
pub async fn download(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let requested = path.into_inner();
    let filename = sanitize(&requested);
    if filename.is_empty() || filename != requested {
        warn!("rejected download path '{}'", requested);
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request("Invalid file name"));
    }

    match NamedFile::open_async(state.config.output_dir.join(&filename)).await {
        Ok(file) => file
            .set_content_disposition(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(filename)],
            })
            .into_response(&req),
        Err(_) => HttpResponse::NotFound().json(ErrorResponse::not_found("File not found")),
    }
}
