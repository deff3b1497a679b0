mod common;

use actix_web::{http::StatusCode, test, App};
use common::{test_state, RecordingRenderer};
use serde_json::{json, Value};
use techchef_forms::routes;

const BOUNDARY: &str = "techchef-test-boundary";
const PNG_BYTES: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x01];

fn multipart_body(filename: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_content_type() -> (&'static str, String) {
    (
        "content-type",
        format!("multipart/form-data; boundary={BOUNDARY}"),
    )
}

#[actix_web::test]
async fn test_workspace_snapshot_syncs_tab_from_query() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path(), RecordingRenderer::new(dir.path()));
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    let req = test::TestRequest::get()
        .uri("/api/workspace?tab=invoice")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["tab"], "invoice");
    assert_eq!(body["payroll"]["rows"].as_array().unwrap().len(), 1);
    assert_eq!(body["invoice_items"]["sheet"], "invoice-items");
    assert_eq!(body["export"]["state"], "idle");
    assert!(body["logo"].is_null());

    let req = test::TestRequest::get()
        .uri("/api/workspace?tab=reports")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["tab"], "payroll");
}

#[actix_web::test]
async fn test_paste_and_validate_through_api() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path(), RecordingRenderer::new(dir.path()));
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/sheets/payroll/paste")
        .set_json(json!({ "row": 0, "column": 0, "text": "Ana Cruz\tCook\nBen Reyes\tServer" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["outcome"]["kind"], "applied");
    assert_eq!(body["outcome"]["rows_added"], 1);
    assert_eq!(body["sheet"]["rows"][1]["employee_name"], "Ben Reyes");

    let req = test::TestRequest::post()
        .uri("/api/sheets/payroll/validate")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["valid"], false);
    assert_eq!(body["invalid_rows"], json!([1, 2]));
    assert!(body["sheet"]["errors"]
        .as_array()
        .unwrap()
        .contains(&json!({ "row_number": 2, "field": "pay_date" })));
}

#[actix_web::test]
async fn test_single_token_paste_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path(), RecordingRenderer::new(dir.path()));
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/sheets/invoice-items/paste")
        .set_json(json!({ "row": 0, "column": 0, "text": "Catering" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["outcome"]["kind"], "plain_text");
    assert_eq!(body["sheet"]["rows"][0]["description"], "");
}

#[actix_web::test]
async fn test_row_add_remove_and_last_row_guard() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path(), RecordingRenderer::new(dir.path()));
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/sheets/invoice-items/rows")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::delete()
        .uri("/api/sheets/invoice-items/rows/1")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::delete()
        .uri("/api/sheets/invoice-items/rows/0")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Conflict");

    let req = test::TestRequest::delete()
        .uri("/api/sheets/invoice-items/rows/7")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/sheets/timesheet/rows")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_numeric_field_is_normalized() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path(), RecordingRenderer::new(dir.path()));
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    let req = test::TestRequest::put()
        .uri("/api/sheets/payroll/rows/0")
        .set_json(json!({ "field": "hourly_rate", "value": "₱1,250.75/hr" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["rows"][0]["hourly_rate"], "1250.75");

    let req = test::TestRequest::put()
        .uri("/api/sheets/payroll/rows/0")
        .set_json(json!({ "field": "salary", "value": "1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_export_with_blank_rows_is_unprocessable() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = RecordingRenderer::new(dir.path());
    let state = test_state(dir.path(), renderer.clone());
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/export")
        .set_json(json!({ "document": "payroll" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "ValidationFailed");
    assert_eq!(body["rows"], json!([1]));
    assert_eq!(renderer.call_count(), 0);
    assert!(state.workspace.lock().export.is_idle());
}

#[actix_web::test]
async fn test_invoice_export_with_missing_header_lists_fields() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path(), RecordingRenderer::new(dir.path()));
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/export")
        .set_json(json!({ "document": "invoice" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["invoice_number", "client_name", "issue_date"]);
}

#[actix_web::test]
async fn test_confirmed_export_can_be_downloaded() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = RecordingRenderer::new(dir.path());
    let state = test_state(dir.path(), renderer.clone());
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    for (field, value) in [
        ("invoice_number", "INV-42"),
        ("client_name", "Bistro Uno"),
        ("issue_date", "2025-03-05"),
        ("marketing_unit_price", "1000"),
    ] {
        let req = test::TestRequest::put()
            .uri("/api/invoice/header")
            .set_json(json!({ "field": field, "value": value }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get().uri("/api/invoice/preview").to_request();
    let preview: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(preview["amount_due"], "₱1,120.00");

    let req = test::TestRequest::post()
        .uri("/api/export")
        .set_json(json!({ "document": "invoice" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "confirmation_required");
    assert_eq!(body["prompt"], "Generate invoice INV-42?");
    assert_eq!(renderer.call_count(), 0);

    let req = test::TestRequest::get().uri("/api/export").to_request();
    let status: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(status["export"]["state"], "confirming");

    let req = test::TestRequest::post().uri("/api/export/confirm").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["downloads"], json!(["/downloads/inv-42-techchef-invoice.pdf"]));
    assert_eq!(body["summary"], "1 of 1 document(s) exported");
    assert_eq!(renderer.call_count(), 1);

    let req = test::TestRequest::get()
        .uri("/downloads/inv-42-techchef-invoice.pdf")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = test::read_body(resp).await;
    assert!(bytes.starts_with(b"%PDF"));

    let req = test::TestRequest::get().uri("/api/export").to_request();
    let status: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(status["export"]["state"], "idle");
    assert_eq!(status["staged_documents"], json!([]));
}

#[actix_web::test]
async fn test_cancel_without_pending_export_conflicts() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path(), RecordingRenderer::new(dir.path()));
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    let req = test::TestRequest::post().uri("/api/export/cancel").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post().uri("/api/export/confirm").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_download_rejects_unsafe_names() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path(), RecordingRenderer::new(dir.path()));
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    let req = test::TestRequest::get().uri("/downloads/a:b.pdf").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get().uri("/downloads/missing.pdf").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_non_image_upload_keeps_previous_asset() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path(), RecordingRenderer::new(dir.path()));
    let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/assets/logo")
        .insert_header(multipart_content_type())
        .set_payload(multipart_body("logo.png", "image/png", PNG_BYTES))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["mime_type"], "image/png");
    assert!(body["data_url"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));

    let req = test::TestRequest::post()
        .uri("/api/assets/logo")
        .insert_header(multipart_content_type())
        .set_payload(multipart_body("notes.txt", "text/plain", b"not an image"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let logo = state
        .workspace
        .lock()
        .assets
        .get(techchef_forms::assets::AssetSlot::Logo)
        .map(|asset| asset.filename.clone());
    assert_eq!(logo.as_deref(), Some("logo.png"));

    let req = test::TestRequest::delete().uri("/api/assets/logo").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["cleared"], true);

    let req = test::TestRequest::delete().uri("/api/assets/banner").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
