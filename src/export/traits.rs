//! The seam between the export pipeline and whatever turns markup into a PDF.

use async_trait::async_trait;
use std::path::PathBuf;

use super::options::ExportOptions;
use super::RenderError;
use crate::assets::{AssetError, AssetSlot, ImageAsset};

/// A binary file the markup refers to by name (logo, signature).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Static, non-interactive document markup plus the files it embeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderFragment {
    pub markup: String,
    pub attachments: Vec<Attachment>,
}

impl RenderFragment {
    /// Decode `asset` into an attachment named after its slot.
    ///
    /// Returns the attachment file name for the markup to reference, or
    /// `None` if the slot is empty.
    pub fn attach_asset(
        &mut self,
        slot: AssetSlot,
        asset: Option<&ImageAsset>,
    ) -> Result<Option<String>, AssetError> {
        let Some(asset) = asset else {
            return Ok(None);
        };

        let name = format!("{}.{}", slot.as_str(), asset.extension());
        self.attachments.push(Attachment {
            name: name.clone(),
            bytes: asset.decode()?,
        });
        Ok(Some(name))
    }
}

/// A finished file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub filename: String,
    pub path: PathBuf,
    pub size_bytes: usize,
}

/// External rendering primitive: static markup in, downloaded file out.
#[async_trait]
pub trait RenderPrimitive: Send + Sync {
    async fn render(
        &self,
        fragment: &RenderFragment,
        options: &ExportOptions,
    ) -> Result<RenderedFile, RenderError>;
}
