//! HTTP surface over the shared workspace.
//!
//! Handlers lock the workspace only for the duration of a synchronous edit;
//! export handlers hand the mutex to the `Exporter`, which releases it before
//! rendering.

pub mod assets;
pub mod export;
pub mod models;
pub mod sheets;
pub mod workspace;

use actix_web::{web, HttpResponse};

use crate::export::ExportError;
use crate::sheet::EditorError;
use crate::workspace::WorkspaceError;
use crate::ErrorResponse;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/workspace").route(web::get().to(workspace::get_workspace)),
    )
    .service(web::resource("/workspace/tab").route(web::put().to(workspace::set_tab)))
    .service(web::resource("/invoice/header").route(web::put().to(workspace::update_invoice_header)))
    .service(web::resource("/invoice/preview").route(web::get().to(workspace::preview_invoice)))
    .service(web::resource("/payroll/preview").route(web::get().to(workspace::preview_payroll)))
    .service(web::resource("/sheets/{sheet}").route(web::get().to(sheets::get_sheet)))
    .service(web::resource("/sheets/{sheet}/rows").route(web::post().to(sheets::add_row)))
    .service(
        web::resource("/sheets/{sheet}/rows/{index}")
            .route(web::put().to(sheets::update_field))
            .route(web::delete().to(sheets::remove_row)),
    )
    .service(web::resource("/sheets/{sheet}/paste").route(web::post().to(sheets::paste)))
    .service(web::resource("/sheets/{sheet}/validate").route(web::post().to(sheets::validate)))
    .service(
        web::resource("/export")
            .route(web::get().to(export::export_status))
            .route(web::post().to(export::request_export)),
    )
    .service(web::resource("/export/confirm").route(web::post().to(export::confirm_export)))
    .service(web::resource("/export/cancel").route(web::post().to(export::cancel_export)))
    .service(
        web::resource("/assets/{slot}")
            .route(web::post().to(assets::upload_asset))
            .route(web::delete().to(assets::clear_asset)),
    );
}

pub(crate) fn editor_error_response(err: &EditorError) -> HttpResponse {
    let message = err.to_string();
    match err {
        EditorError::RowOutOfRange { .. } => {
            HttpResponse::NotFound().json(ErrorResponse::not_found(&message))
        }
        EditorError::LastRow => HttpResponse::Conflict().json(ErrorResponse::conflict(&message)),
        EditorError::UnknownField(_) | EditorError::FieldOutOfRange { .. } => {
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&message))
        }
    }
}

pub(crate) fn workspace_error_response(err: &WorkspaceError) -> HttpResponse {
    match err {
        WorkspaceError::Busy => {
            HttpResponse::Conflict().json(ErrorResponse::conflict(&err.to_string()))
        }
        WorkspaceError::Editor(e) => editor_error_response(e),
    }
}

pub(crate) fn export_error_response(err: &ExportError) -> HttpResponse {
    let message = err.to_string();
    match err {
        ExportError::InvalidRows(rows) => HttpResponse::UnprocessableEntity()
            .json(ErrorResponse::validation(&message).with_rows(rows.row_numbers().to_vec())),
        ExportError::InvalidHeader(errors) => HttpResponse::UnprocessableEntity()
            .json(ErrorResponse::validation(&message).with_fields(errors.errors().to_vec())),
        ExportError::Busy(_) | ExportError::NothingPending => {
            HttpResponse::Conflict().json(ErrorResponse::conflict(&message))
        }
        ExportError::Editor(e) => editor_error_response(e),
    }
}
