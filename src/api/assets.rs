use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use futures_util::TryStreamExt;
use log::{debug, info, warn};
use sanitize_filename::sanitize;

use super::models::{AssetInfo, ClearAssetResponse, UploadAssetRequest};
use super::workspace_error_response;
use crate::assets::{AssetSlot, ImageAsset};
use crate::state::AppState;
use crate::ErrorResponse;

struct UploadedFile {
    filename: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

/// Read the `file` field of a multipart payload into memory.
async fn read_upload(mut payload: Multipart) -> Result<UploadedFile, String> {
    while let Some(mut field) = payload.try_next().await.map_err(|e| e.to_string())? {
        let content_disposition = field
            .content_disposition()
            .ok_or("Content-Disposition not set")?;
        if content_disposition.get_name() != Some("file") {
            continue;
        }

        let filename = content_disposition
            .get_filename()
            .map(sanitize)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = field.content_type().map(|mime| mime.essence_str().to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(|e| e.to_string())? {
            bytes.extend_from_slice(&chunk);
        }

        return Ok(UploadedFile {
            filename,
            content_type,
            bytes,
        });
    }

    Err("No file was uploaded".to_string())
}

#[utoipa::path(
    context_path = "/api",
    tag = "Assets",
    post,
    path = "/assets/{slot}",
    params(
        ("slot" = AssetSlot, Path, description = "`logo` or `signature`")
    ),
    request_body(content = inline(UploadAssetRequest), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image stored in the slot", body = AssetInfo),
        (status = 400, description = "Not an image, or unknown slot; the slot is unchanged", body = ErrorResponse),
        (status = 409, description = "An export is in progress", body = ErrorResponse)
    )
)]
pub async fn upload_asset(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: Multipart,
) -> impl Responder {
    let slot = match path.parse::<AssetSlot>() {
        Ok(slot) => slot,
        Err(e) => return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e.to_string())),
    };

    let upload = match read_upload(payload).await {
        Ok(upload) => upload,
        Err(e) => {
            warn!("{} upload failed: {}", slot, e);
            return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e));
        }
    };
    debug!(
        "{} upload '{}' ({} bytes, declared {:?})",
        slot,
        upload.filename,
        upload.bytes.len(),
        upload.content_type
    );

    let asset = match ImageAsset::from_upload(
        &upload.filename,
        upload.content_type.as_deref(),
        &upload.bytes,
    ) {
        Ok(asset) => asset,
        Err(e) => return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e.to_string())),
    };

    let info = AssetInfo::new(slot, &asset);
    let mut workspace = state.workspace.lock();
    match workspace.set_asset(slot, asset) {
        Ok(()) => HttpResponse::Ok().json(info),
        Err(e) => workspace_error_response(&e),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Assets",
    delete,
    path = "/assets/{slot}",
    params(
        ("slot" = AssetSlot, Path, description = "`logo` or `signature`")
    ),
    responses(
        (status = 200, description = "Slot cleared", body = ClearAssetResponse),
        (status = 400, description = "Unknown slot", body = ErrorResponse),
        (status = 409, description = "An export is in progress", body = ErrorResponse)
    )
)]
pub async fn clear_asset(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let slot = match path.parse::<AssetSlot>() {
        Ok(slot) => slot,
        Err(e) => return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e.to_string())),
    };

    let mut workspace = state.workspace.lock();
    match workspace.clear_asset(slot) {
        Ok(cleared) => {
            info!("{} slot cleared (had image: {})", slot, cleared);
            HttpResponse::Ok().json(ClearAssetResponse { slot, cleared })
        }
        Err(e) => workspace_error_response(&e),
    }
}
