//! Logo and signature images embedded into generated documents.
//!
//! Each slot holds at most one image, stored as an inline base64 data URL.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("'{filename}' is not an image (detected {mime_type})")]
    NotAnImage { filename: String, mime_type: String },
    #[error("uploaded file is empty")]
    Empty,
    #[error("unknown asset slot '{0}'")]
    UnknownSlot(String),
    #[error("stored image data is corrupt: {0}")]
    Decode(#[from] base64::DecodeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssetSlot {
    Logo,
    Signature,
}

impl AssetSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Logo => "logo",
            Self::Signature => "signature",
        }
    }
}

impl fmt::Display for AssetSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetSlot {
    type Err = AssetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "logo" => Ok(Self::Logo),
            "signature" => Ok(Self::Signature),
            other => Err(AssetError::UnknownSlot(other.to_string())),
        }
    }
}

/// Detect MIME type from file content magic bytes.
fn sniff_mime(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return Some("image/png");
    }
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some("image/gif");
    }
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    if data.starts_with(b"%PDF") {
        return Some("application/pdf");
    }
    None
}

/// An accepted image, kept as an inline data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub filename: String,
    pub mime_type: String,
    pub data_url: String,
}

impl ImageAsset {
    /// Accept an uploaded file if it is an image.
    ///
    /// The type is taken from the content when recognizable, then from the
    /// declared content type, then from the file extension.
    pub fn from_upload(
        filename: &str,
        declared_mime: Option<&str>,
        bytes: &[u8],
    ) -> Result<Self, AssetError> {
        if bytes.is_empty() {
            return Err(AssetError::Empty);
        }

        let declared = declared_mime
            .map(str::trim)
            .filter(|mime| !mime.is_empty() && *mime != "application/octet-stream");

        let mime_type = sniff_mime(bytes)
            .map(str::to_string)
            .or_else(|| declared.map(str::to_string))
            .or_else(|| {
                mime_guess::from_path(filename)
                    .first()
                    .map(|mime| mime.essence_str().to_string())
            })
            .unwrap_or_else(|| "application/octet-stream".to_string());

        if !mime_type.starts_with("image/") {
            log::warn!("rejected upload '{}' ({})", filename, mime_type);
            return Err(AssetError::NotAnImage {
                filename: filename.to_string(),
                mime_type,
            });
        }

        Ok(Self {
            filename: filename.to_string(),
            data_url: format!("data:{};base64,{}", mime_type, BASE64.encode(bytes)),
            mime_type,
        })
    }

    /// Decode the data URL back to raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, AssetError> {
        let payload = self
            .data_url
            .split_once(',')
            .map(|(_, data)| data)
            .unwrap_or(&self.data_url);
        Ok(BASE64.decode(payload)?)
    }

    /// File extension the renderer uses to pick an image decoder.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/jpeg" => "jpg",
            "image/gif" => "gif",
            "image/svg+xml" => "svg",
            "image/webp" => "webp",
            other => mime_guess::get_mime_extensions_str(other)
                .and_then(|exts| exts.first().copied())
                .unwrap_or("img"),
        }
    }
}

/// The two optional image slots of a workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetSlots {
    logo: Option<ImageAsset>,
    signature: Option<ImageAsset>,
}

impl AssetSlots {
    pub fn get(&self, slot: AssetSlot) -> Option<&ImageAsset> {
        match slot {
            AssetSlot::Logo => self.logo.as_ref(),
            AssetSlot::Signature => self.signature.as_ref(),
        }
    }

    /// Store an image, replacing the previous one. Returns the replaced image.
    pub fn set(&mut self, slot: AssetSlot, asset: ImageAsset) -> Option<ImageAsset> {
        self.slot_mut(slot).replace(asset)
    }

    pub fn clear(&mut self, slot: AssetSlot) -> Option<ImageAsset> {
        self.slot_mut(slot).take()
    }

    fn slot_mut(&mut self, slot: AssetSlot) -> &mut Option<ImageAsset> {
        match slot {
            AssetSlot::Logo => &mut self.logo,
            AssetSlot::Signature => &mut self.signature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00];

    #[test]
    fn png_bytes_are_accepted_and_round_trip() {
        let asset = ImageAsset::from_upload("logo.png", Some("image/png"), PNG_HEADER).unwrap();
        assert_eq!(asset.mime_type, "image/png");
        assert!(asset.data_url.starts_with("data:image/png;base64,"));
        assert_eq!(asset.decode().unwrap(), PNG_HEADER);
        assert_eq!(asset.extension(), "png");
    }

    #[test]
    fn content_wins_over_misleading_name() {
        let err = ImageAsset::from_upload("photo.png", None, b"%PDF-1.7 ...").unwrap_err();
        assert!(matches!(err, AssetError::NotAnImage { .. }));
    }

    #[test]
    fn falls_back_to_extension() {
        let asset = ImageAsset::from_upload("mark.svg", None, b"<svg xmlns='x'/>").unwrap();
        assert_eq!(asset.mime_type, "image/svg+xml");
        assert_eq!(asset.extension(), "svg");

        let err = ImageAsset::from_upload("notes.txt", None, b"plain words").unwrap_err();
        assert!(matches!(err, AssetError::NotAnImage { .. }));
    }

    #[test]
    fn empty_upload_is_rejected() {
        assert!(matches!(
            ImageAsset::from_upload("a.png", None, b""),
            Err(AssetError::Empty)
        ));
    }

    #[test]
    fn slots_are_independent() {
        let mut slots = AssetSlots::default();
        let asset = ImageAsset::from_upload("logo.png", None, PNG_HEADER).unwrap();
        assert!(slots.set(AssetSlot::Logo, asset.clone()).is_none());
        assert!(slots.get(AssetSlot::Signature).is_none());
        assert_eq!(slots.clear(AssetSlot::Logo), Some(asset));
        assert!(slots.get(AssetSlot::Logo).is_none());
    }

    #[test]
    fn slot_names_parse() {
        assert_eq!("Logo".parse::<AssetSlot>().unwrap(), AssetSlot::Logo);
        assert!("banner".parse::<AssetSlot>().is_err());
    }
}
