use actix_web::{web, HttpResponse, Responder};
use log::info;

use super::models::{PasteRequest, PasteResponse, SheetSnapshot, UpdateFieldRequest, ValidateResponse};
use super::workspace_error_response;
use crate::state::AppState;
use crate::workspace::SheetId;
use crate::ErrorResponse;

#[utoipa::path(
    context_path = "/api",
    tag = "Sheets",
    get,
    path = "/sheets/{sheet}",
    params(
        ("sheet" = SheetId, Path, description = "`payroll` or `invoice-items`")
    ),
    responses(
        (status = 200, description = "Rows and flagged cells", body = SheetSnapshot)
    )
)]
pub async fn get_sheet(state: web::Data<AppState>, path: web::Path<SheetId>) -> impl Responder {
    let sheet = path.into_inner();
    let workspace = state.workspace.lock();
    HttpResponse::Ok().json(SheetSnapshot::new(sheet, workspace.sheet(sheet)))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Sheets",
    post,
    path = "/sheets/{sheet}/rows",
    params(
        ("sheet" = SheetId, Path, description = "`payroll` or `invoice-items`")
    ),
    responses(
        (status = 201, description = "Empty row appended", body = SheetSnapshot),
        (status = 409, description = "An export is in progress", body = ErrorResponse)
    )
)]
pub async fn add_row(state: web::Data<AppState>, path: web::Path<SheetId>) -> impl Responder {
    let sheet = path.into_inner();
    let mut workspace = state.workspace.lock();
    match workspace.add_row(sheet) {
        Ok(index) => {
            info!("{}: added row {}", sheet, index + 1);
            HttpResponse::Created().json(SheetSnapshot::new(sheet, workspace.sheet(sheet)))
        }
        Err(e) => workspace_error_response(&e),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Sheets",
    delete,
    path = "/sheets/{sheet}/rows/{index}",
    params(
        ("sheet" = SheetId, Path, description = "`payroll` or `invoice-items`"),
        ("index" = usize, Path, description = "0-based row index")
    ),
    responses(
        (status = 200, description = "Row removed", body = SheetSnapshot),
        (status = 404, description = "No such row", body = ErrorResponse),
        (status = 409, description = "Last remaining row, or an export is in progress", body = ErrorResponse)
    )
)]
pub async fn remove_row(
    state: web::Data<AppState>,
    path: web::Path<(SheetId, usize)>,
) -> impl Responder {
    let (sheet, index) = path.into_inner();
    let mut workspace = state.workspace.lock();
    match workspace.remove_row(sheet, index) {
        Ok(()) => {
            info!("{}: removed row {}", sheet, index + 1);
            HttpResponse::Ok().json(SheetSnapshot::new(sheet, workspace.sheet(sheet)))
        }
        Err(e) => workspace_error_response(&e),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Sheets",
    put,
    path = "/sheets/{sheet}/rows/{index}",
    params(
        ("sheet" = SheetId, Path, description = "`payroll` or `invoice-items`"),
        ("index" = usize, Path, description = "0-based row index")
    ),
    request_body = UpdateFieldRequest,
    responses(
        (status = 200, description = "Field normalized and stored", body = SheetSnapshot),
        (status = 400, description = "Unknown field", body = ErrorResponse),
        (status = 404, description = "No such row", body = ErrorResponse)
    )
)]
pub async fn update_field(
    state: web::Data<AppState>,
    path: web::Path<(SheetId, usize)>,
    item: web::Json<UpdateFieldRequest>,
) -> impl Responder {
    let (sheet, index) = path.into_inner();
    let mut workspace = state.workspace.lock();
    match workspace.set_field(sheet, index, &item.field, &item.value) {
        Ok(()) => HttpResponse::Ok().json(SheetSnapshot::new(sheet, workspace.sheet(sheet))),
        Err(e) => workspace_error_response(&e),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Sheets",
    post,
    path = "/sheets/{sheet}/paste",
    params(
        ("sheet" = SheetId, Path, description = "`payroll` or `invoice-items`")
    ),
    request_body = PasteRequest,
    responses(
        (status = 200, description = "Block applied, or plain text left alone", body = PasteResponse),
        (status = 400, description = "Start column outside the schema", body = ErrorResponse),
        (status = 404, description = "Start row does not exist", body = ErrorResponse)
    )
)]
pub async fn paste(
    state: web::Data<AppState>,
    path: web::Path<SheetId>,
    item: web::Json<PasteRequest>,
) -> impl Responder {
    let sheet = path.into_inner();
    let mut workspace = state.workspace.lock();
    match workspace.paste(sheet, item.row, item.column, &item.text) {
        Ok(outcome) => {
            info!("{}: paste at row {} column {}: {:?}", sheet, item.row + 1, item.column, outcome);
            HttpResponse::Ok().json(PasteResponse {
                outcome,
                sheet: SheetSnapshot::new(sheet, workspace.sheet(sheet)),
            })
        }
        Err(e) => workspace_error_response(&e),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Sheets",
    post,
    path = "/sheets/{sheet}/validate",
    params(
        ("sheet" = SheetId, Path, description = "`payroll` or `invoice-items`")
    ),
    responses(
        (status = 200, description = "Every row validated; error set rebuilt", body = ValidateResponse)
    )
)]
pub async fn validate(state: web::Data<AppState>, path: web::Path<SheetId>) -> impl Responder {
    let sheet = path.into_inner();
    let mut workspace = state.workspace.lock();
    let invalid_rows = match workspace.sheet_mut(sheet).validate_all() {
        Ok(()) => Vec::new(),
        Err(rows) => rows.0,
    };

    HttpResponse::Ok().json(ValidateResponse {
        valid: invalid_rows.is_empty(),
        invalid_rows,
        sheet: SheetSnapshot::new(sheet, workspace.sheet(sheet)),
    })
}
