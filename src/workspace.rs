//! The per-session application state.
//!
//! One `Workspace` holds both tabs' data, the image slots and the export
//! state. Row add/remove, pastes that would append rows and asset changes
//! are refused while an export is generating, so a running export always
//! sees the rows it validated.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

use crate::assets::{AssetSlot, AssetSlots, ImageAsset};
use crate::export::ExportState;
use crate::invoice::InvoiceDraft;
use crate::payroll;
use crate::sheet::clipboard::parse_block;
use crate::sheet::{EditorError, PasteOutcome, RowCollection};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkspaceError {
    #[error("an export is in progress; try again when it finishes")]
    Busy,
    #[error(transparent)]
    Editor(#[from] EditorError),
}

/// Active feature tab, mirrored in the `tab` query parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Payroll,
    Invoice,
}

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Payroll => "payroll",
            Self::Invoice => "invoice",
        }
    }

    /// Read the tab from a query value; anything unrecognized means payroll.
    pub fn from_query(value: Option<&str>) -> Self {
        value
            .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
                "payroll" => Some(Self::Payroll),
                "invoice" => Some(Self::Invoice),
                _ => None,
            })
            .unwrap_or_default()
    }
}

/// The two editable row collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SheetId {
    Payroll,
    InvoiceItems,
}

impl SheetId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Payroll => "payroll",
            Self::InvoiceItems => "invoice-items",
        }
    }
}

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Workspace {
    pub tab: Tab,
    pub payroll: RowCollection,
    pub invoice: InvoiceDraft,
    pub assets: AssetSlots,
    pub export: ExportState,
}

impl Default for Workspace {
    fn default() -> Self {
        Self {
            tab: Tab::default(),
            payroll: payroll::new_sheet(),
            invoice: InvoiceDraft::default(),
            assets: AssetSlots::default(),
            export: ExportState::Idle,
        }
    }
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(&self, id: SheetId) -> &RowCollection {
        match id {
            SheetId::Payroll => &self.payroll,
            SheetId::InvoiceItems => &self.invoice.items,
        }
    }

    pub fn sheet_mut(&mut self, id: SheetId) -> &mut RowCollection {
        match id {
            SheetId::Payroll => &mut self.payroll,
            SheetId::InvoiceItems => &mut self.invoice.items,
        }
    }

    fn ensure_not_generating(&self) -> Result<(), WorkspaceError> {
        if self.export.is_generating() {
            return Err(WorkspaceError::Busy);
        }
        Ok(())
    }

    pub fn add_row(&mut self, id: SheetId) -> Result<usize, WorkspaceError> {
        self.ensure_not_generating()?;
        Ok(self.sheet_mut(id).add_row())
    }

    pub fn remove_row(&mut self, id: SheetId, index: usize) -> Result<(), WorkspaceError> {
        self.ensure_not_generating()?;
        Ok(self.sheet_mut(id).remove_row(index)?)
    }

    pub fn set_field(
        &mut self,
        id: SheetId,
        index: usize,
        key: &str,
        value: &str,
    ) -> Result<(), WorkspaceError> {
        Ok(self.sheet_mut(id).set_field(index, key, value)?)
    }

    pub fn paste(
        &mut self,
        id: SheetId,
        start_index: usize,
        start_field: usize,
        text: &str,
    ) -> Result<PasteOutcome, WorkspaceError> {
        let block_rows = parse_block(text).map_or(0, |block| block.len());
        if start_index + block_rows > self.sheet(id).len() {
            self.ensure_not_generating()?;
        }
        Ok(self.sheet_mut(id).paste_block(start_index, start_field, text)?)
    }

    pub fn set_invoice_field(&mut self, key: &str, value: &str) -> Result<(), WorkspaceError> {
        Ok(self.invoice.header.set(key, value)?)
    }

    pub fn set_asset(&mut self, slot: AssetSlot, asset: ImageAsset) -> Result<(), WorkspaceError> {
        self.ensure_not_generating()?;
        log::info!("stored {} image '{}'", slot, asset.filename);
        self.assets.set(slot, asset);
        Ok(())
    }

    pub fn clear_asset(&mut self, slot: AssetSlot) -> Result<bool, WorkspaceError> {
        self.ensure_not_generating()?;
        Ok(self.assets.clear(slot).is_some())
    }
}
