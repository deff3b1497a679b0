use actix_web::{web, HttpResponse, Responder};
use log::{debug, info};

use super::models::{SetTabRequest, TabQuery, UpdateFieldRequest, WorkspaceSnapshot};
use super::workspace_error_response;
use crate::invoice::{derive_invoice, InvoiceHeader, InvoiceView};
use crate::payroll::{derive_payslip, PayslipView};
use crate::state::AppState;
use crate::workspace::Tab;
use crate::ErrorResponse;

#[utoipa::path(
    context_path = "/api",
    tag = "Workspace",
    get,
    path = "/workspace",
    params(TabQuery),
    responses(
        (status = 200, description = "Current rows, errors, assets and export state", body = WorkspaceSnapshot)
    )
)]
pub async fn get_workspace(
    state: web::Data<AppState>,
    query: web::Query<TabQuery>,
) -> impl Responder {
    let mut workspace = state.workspace.lock();
    if query.tab.is_some() {
        workspace.tab = Tab::from_query(query.tab.as_deref());
        debug!("active tab synced from query: {}", workspace.tab.as_str());
    }
    HttpResponse::Ok().json(WorkspaceSnapshot::new(&workspace))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Workspace",
    put,
    path = "/workspace/tab",
    request_body = SetTabRequest,
    responses(
        (status = 200, description = "Active tab changed", body = SetTabRequest)
    )
)]
pub async fn set_tab(state: web::Data<AppState>, item: web::Json<SetTabRequest>) -> impl Responder {
    state.workspace.lock().tab = item.tab;
    info!("active tab set to {}", item.tab.as_str());
    HttpResponse::Ok().json(SetTabRequest { tab: item.tab })
}

#[utoipa::path(
    context_path = "/api",
    tag = "Invoice",
    put,
    path = "/invoice/header",
    request_body = UpdateFieldRequest,
    responses(
        (status = 200, description = "Header field stored", body = InvoiceHeader),
        (status = 400, description = "Unknown header field", body = ErrorResponse)
    )
)]
pub async fn update_invoice_header(
    state: web::Data<AppState>,
    item: web::Json<UpdateFieldRequest>,
) -> impl Responder {
    let mut workspace = state.workspace.lock();
    match workspace.set_invoice_field(&item.field, &item.value) {
        Ok(()) => HttpResponse::Ok().json(&workspace.invoice.header),
        Err(e) => workspace_error_response(&e),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Invoice",
    get,
    path = "/invoice/preview",
    responses(
        (status = 200, description = "Derived invoice lines and totals", body = InvoiceView)
    )
)]
pub async fn preview_invoice(state: web::Data<AppState>) -> impl Responder {
    let workspace = state.workspace.lock();
    let view = derive_invoice(&workspace.invoice, state.exporter.settings());
    HttpResponse::Ok().json(view)
}

#[utoipa::path(
    context_path = "/api",
    tag = "Payroll",
    get,
    path = "/payroll/preview",
    responses(
        (status = 200, description = "Derived pay slip values for every row", body = Vec<PayslipView>),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn preview_payroll(state: web::Data<AppState>) -> impl Responder {
    let workspace = state.workspace.lock();
    let views: Result<Vec<PayslipView>, _> = (0..workspace.payroll.len())
        .map(|row| derive_payslip(&workspace.payroll, row, state.exporter.settings()))
        .collect();

    match views {
        Ok(views) => HttpResponse::Ok().json(views),
        Err(e) => HttpResponse::InternalServerError()
            .json(ErrorResponse::internal_error(&e.to_string())),
    }
}
