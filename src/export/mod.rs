//! Export pipeline: validate, confirm, render, download.
//!
//! - `state` - the `Idle | Confirming | Generating` machine and export scopes
//! - `pipeline` - the `Exporter` driving a workspace through that machine
//! - `traits` - the `RenderPrimitive` seam and the fragment it consumes
//! - `engine` - the Typst-backed rendering primitive
//! - `options` - fixed page setup (A4 portrait, margins, scale)
//! - `staging` - fragments currently mounted for rendering

pub mod engine;
pub mod options;
pub mod pipeline;
pub mod staging;
pub mod state;
pub mod traits;

pub use engine::TypstRenderEngine;
pub use options::ExportOptions;
pub use pipeline::{BatchReport, ExportOutcome, ExportedFile, Exporter, FailedExport};
pub use staging::StagingSurface;
pub use state::{ExportScope, ExportState, ExportTarget};
pub use traits::{Attachment, RenderFragment, RenderPrimitive, RenderedFile};

use thiserror::Error;

use crate::sheet::{EditorError, InvalidRows, ValidationErrors};

/// Failures of the rendering primitive for a single document.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("failed to write document source: {0}")]
    WriteSource(#[source] std::io::Error),
    #[error("failed to write embedded image: {0}")]
    WriteAttachment(#[source] std::io::Error),
    #[error("Typst CLI execution failed: {0}")]
    CompilerIo(#[source] std::io::Error),
    #[error("Typst CLI exited with status {code}: {stderr}")]
    CompilerExit { code: i32, stderr: String },
    #[error("failed to read generated PDF: {0}")]
    ReadPdf(#[source] std::io::Error),
    #[error("failed to store generated PDF: {0}")]
    Persist(#[source] std::io::Error),
    #[error("{0}")]
    Other(String),
}

/// Reasons an export request is refused before anything is rendered.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot export: {0}")]
    InvalidRows(InvalidRows),
    #[error("cannot export: {0}")]
    InvalidHeader(ValidationErrors),
    #[error("an export is already {0}")]
    Busy(&'static str),
    #[error("no export is awaiting confirmation")]
    NothingPending,
    #[error(transparent)]
    Editor(#[from] EditorError),
}
