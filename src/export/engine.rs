//! Typst rendering engine.
//!
//! Writes the document source and its attachments to a temporary directory,
//! invokes the Typst compiler, and stores the resulting PDF in the output
//! directory. The temporary directory is removed when rendering returns,
//! whether it succeeded or not.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};
use tokio::fs;
use tokio::process::Command;

use super::options::{ExportOptions, Orientation};
use super::traits::{RenderFragment, RenderPrimitive, RenderedFile};
use super::RenderError;

const SOURCE_FILE: &str = "document.typ";
const OUTPUT_FILE: &str = "document.pdf";

/// Renders Typst markup to PDF through the `typst` CLI.
#[derive(Debug, Clone)]
pub struct TypstRenderEngine {
    binary: String,
    output_dir: PathBuf,
}

impl TypstRenderEngine {
    pub fn new(binary: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Prefix the fragment with the page rule derived from `options`.
    pub fn compose_source(fragment: &RenderFragment, options: &ExportOptions) -> String {
        let m = &options.margins;
        format!(
            "#set page(paper: \"{}\", flipped: {}, margin: (top: {}mm, right: {}mm, bottom: {}mm, left: {}mm))\n#set text(size: 10pt)\n\n{}",
            options.page.paper_name(),
            options.orientation == Orientation::Landscape,
            m.top_mm,
            m.right_mm,
            m.bottom_mm,
            m.left_mm,
            fragment.markup,
        )
    }
}

#[async_trait]
impl RenderPrimitive for TypstRenderEngine {
    async fn render(
        &self,
        fragment: &RenderFragment,
        options: &ExportOptions,
    ) -> Result<RenderedFile, RenderError> {
        let temp_dir = tempdir().map_err(RenderError::TempDir)?;

        fs::write(
            temp_dir.path().join(SOURCE_FILE),
            Self::compose_source(fragment, options),
        )
        .await
        .map_err(RenderError::WriteSource)?;

        for attachment in &fragment.attachments {
            fs::write(temp_dir.path().join(&attachment.name), &attachment.bytes)
                .await
                .map_err(RenderError::WriteAttachment)?;
        }

        let pdf = compile_typst_to_pdf(&self.binary, &temp_dir).await?;

        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(RenderError::Persist)?;
        let path = self.output_dir.join(&options.filename);
        fs::write(&path, &pdf).await.map_err(RenderError::Persist)?;

        log::info!("rendered {} ({} bytes)", options.filename, pdf.len());

        Ok(RenderedFile {
            filename: options.filename.clone(),
            path,
            size_bytes: pdf.len(),
        })
    }
}

/// Compile the source file in `temp_dir` to PDF.
async fn compile_typst_to_pdf(binary: &str, temp_dir: &TempDir) -> Result<Vec<u8>, RenderError> {
    let source_path = temp_dir.path().join(SOURCE_FILE);
    let output_path = temp_dir.path().join(OUTPUT_FILE);

    let output = Command::new(binary)
        .arg("compile")
        .arg(&source_path)
        .arg(&output_path)
        .current_dir(temp_dir.path())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(RenderError::CompilerIo)?;

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(RenderError::CompilerExit { code, stderr });
    }

    fs::read(&output_path).await.map_err(RenderError::ReadPdf)
}
