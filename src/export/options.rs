//! Fixed page setup handed to the rendering primitive with every document.

use serde::Serialize;
use utoipa::ToSchema;

pub const PAGE_MARGIN_MM: f32 = 10.0;
pub const RASTER_SCALE: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Margins {
    pub top_mm: f32,
    pub right_mm: f32,
    pub bottom_mm: f32,
    pub left_mm: f32,
}

impl Margins {
    pub const fn uniform(mm: f32) -> Self {
        Self {
            top_mm: mm,
            right_mm: mm,
            bottom_mm: mm,
            left_mm: mm,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    A4,
}

impl PageFormat {
    /// Paper name understood by the Typst `page` rule.
    pub fn paper_name(&self) -> &'static str {
        match self {
            Self::A4 => "a4",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ExportOptions {
    pub margins: Margins,
    pub scale: f32,
    pub page: PageFormat,
    pub orientation: Orientation,
    pub filename: String,
}

impl ExportOptions {
    /// The one configuration every document uses: A4 portrait, 10 mm margins,
    /// 2x scale.
    pub fn a4_portrait(filename: impl Into<String>) -> Self {
        Self {
            margins: Margins::uniform(PAGE_MARGIN_MM),
            scale: RASTER_SCALE,
            page: PageFormat::A4,
            orientation: Orientation::Portrait,
            filename: filename.into(),
        }
    }
}
