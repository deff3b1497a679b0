use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

use crate::assets::{AssetSlot, ImageAsset};
use crate::export::{BatchReport, ExportState, ExportTarget};
use crate::invoice::InvoiceHeader;
use crate::sheet::{FieldDef, PasteOutcome, RowCollection};
use crate::workspace::{SheetId, Tab, Workspace};

#[derive(Debug, Deserialize, IntoParams)]
pub struct TabQuery {
    /// `payroll` or `invoice`; anything else falls back to payroll
    pub tab: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetTabRequest {
    pub tab: Tab,
}

/// A `(row, field)` pair that failed required-field validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CellError {
    /// 1-based
    pub row_number: usize,
    pub field: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SheetSnapshot {
    pub sheet: SheetId,
    pub fields: Vec<FieldDef>,
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<BTreeMap<String, String>>,
    pub errors: Vec<CellError>,
}

impl SheetSnapshot {
    pub fn new(sheet: SheetId, rows: &RowCollection) -> Self {
        Self {
            sheet,
            fields: rows.schema().fields().to_vec(),
            rows: rows.to_maps(),
            errors: rows
                .errors()
                .iter()
                .map(|(index, field)| CellError {
                    row_number: index + 1,
                    field: field.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssetInfo {
    pub slot: AssetSlot,
    pub filename: String,
    pub mime_type: String,
    /// Ready to use as an `<img src>`
    pub data_url: String,
}

impl AssetInfo {
    pub fn new(slot: AssetSlot, asset: &ImageAsset) -> Self {
        Self {
            slot,
            filename: asset.filename.clone(),
            mime_type: asset.mime_type.clone(),
            data_url: asset.data_url.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WorkspaceSnapshot {
    pub tab: Tab,
    pub payroll: SheetSnapshot,
    pub invoice_header: InvoiceHeader,
    pub invoice_items: SheetSnapshot,
    pub logo: Option<AssetInfo>,
    pub signature: Option<AssetInfo>,
    pub export: ExportState,
}

impl WorkspaceSnapshot {
    pub fn new(workspace: &Workspace) -> Self {
        let asset = |slot| workspace.assets.get(slot).map(|a| AssetInfo::new(slot, a));
        Self {
            tab: workspace.tab,
            payroll: SheetSnapshot::new(SheetId::Payroll, &workspace.payroll),
            invoice_header: workspace.invoice.header.clone(),
            invoice_items: SheetSnapshot::new(SheetId::InvoiceItems, &workspace.invoice.items),
            logo: asset(AssetSlot::Logo),
            signature: asset(AssetSlot::Signature),
            export: workspace.export.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateFieldRequest {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PasteRequest {
    /// 0-based row the block starts at
    pub row: usize,
    /// 0-based field position the block starts at
    pub column: usize,
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PasteResponse {
    pub outcome: PasteOutcome,
    pub sheet: SheetSnapshot,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidateResponse {
    pub valid: bool,
    /// 1-based
    pub invalid_rows: Vec<usize>,
    pub sheet: SheetSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportDocument {
    Payroll,
    Invoice,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExportRequest {
    pub document: ExportDocument,
    /// 0-based payroll row for a single pay slip; omit for every row
    #[serde(default)]
    pub row: Option<usize>,
    /// Generate immediately instead of waiting for confirmation
    #[serde(default)]
    pub skip_confirmation: bool,
}

impl ExportRequest {
    pub fn target(&self) -> ExportTarget {
        match self.document {
            ExportDocument::Payroll => ExportTarget::Payroll { row: self.row },
            ExportDocument::Invoice => ExportTarget::Invoice,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExportReportResponse {
    pub summary: String,
    /// Download paths of the files that were generated
    pub downloads: Vec<String>,
    pub report: BatchReport,
}

impl From<BatchReport> for ExportReportResponse {
    fn from(report: BatchReport) -> Self {
        Self {
            summary: report.summary(),
            downloads: report
                .succeeded
                .iter()
                .map(|file| format!("/downloads/{}", file.filename))
                .collect(),
            report,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExportStatusResponse {
    pub export: ExportState,
    pub staged_documents: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClearAssetResponse {
    pub slot: AssetSlot,
    pub cleared: bool,
}

/// Multipart form accepted by the asset upload endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadAssetRequest {
    #[allow(unused)]
    pub file: Vec<u8>,
}
