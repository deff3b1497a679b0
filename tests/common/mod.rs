#![allow(dead_code)]

use actix_web::web;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use techchef_forms::export::{
    ExportOptions, RenderError, RenderFragment, RenderPrimitive, RenderedFile,
};
use techchef_forms::workspace::Workspace;
use techchef_forms::{AppConfig, AppState};

/// Renderer double that records what it was asked to render.
///
/// Files whose name is listed in `fail_on` are rejected; everything else is
/// written as a tiny placeholder PDF under `output_dir`.
pub struct RecordingRenderer {
    output_dir: PathBuf,
    fail_on: Vec<String>,
    rendered: Mutex<Vec<(String, String)>>,
}

impl RecordingRenderer {
    pub fn new(output_dir: &Path) -> Arc<Self> {
        Self::failing_on(output_dir, &[])
    }

    pub fn failing_on(output_dir: &Path, filenames: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            output_dir: output_dir.to_path_buf(),
            fail_on: filenames.iter().map(|name| name.to_string()).collect(),
            rendered: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.rendered.lock().len()
    }

    pub fn filenames(&self) -> Vec<String> {
        self.rendered.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn markup(&self, index: usize) -> String {
        self.rendered.lock()[index].1.clone()
    }
}

#[async_trait]
impl RenderPrimitive for RecordingRenderer {
    async fn render(
        &self,
        fragment: &RenderFragment,
        options: &ExportOptions,
    ) -> Result<RenderedFile, RenderError> {
        self.rendered
            .lock()
            .push((options.filename.clone(), fragment.markup.clone()));

        if self.fail_on.contains(&options.filename) {
            return Err(RenderError::Other(format!(
                "renderer rejected {}",
                options.filename
            )));
        }

        let bytes = b"%PDF-1.7\n%%EOF\n";
        let path = self.output_dir.join(&options.filename);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(RenderError::Persist)?;

        Ok(RenderedFile {
            filename: options.filename.clone(),
            path,
            size_bytes: bytes.len(),
        })
    }
}

pub fn test_config(output_dir: &Path) -> AppConfig {
    let output = output_dir.display().to_string();
    AppConfig::from_lookup(move |key: &str| match key {
        "TECHCHEF_OUTPUT_DIR" => Some(output.clone()),
        _ => None,
    })
    .expect("test configuration is valid")
}

pub fn test_state(output_dir: &Path, renderer: Arc<RecordingRenderer>) -> web::Data<AppState> {
    web::Data::new(AppState::with_renderer(test_config(output_dir), renderer))
}

/// Fill every required payroll field of `row`.
pub fn fill_payroll_row(workspace: &mut Workspace, row: usize, name: &str) {
    for (key, value) in [
        ("employee_name", name),
        ("pay_period", "March 1-15, 2025"),
        ("pay_date", "2025-03-15"),
        ("hourly_rate", "150"),
        ("hours_worked", "80"),
    ] {
        workspace
            .payroll
            .set_field(row, key, value)
            .expect("payroll field exists");
    }
}

/// Fill the required invoice header fields.
pub fn fill_invoice_header(workspace: &mut Workspace, number: &str) {
    for (key, value) in [
        ("invoice_number", number),
        ("client_name", "Bistro Uno"),
        ("issue_date", "2025-03-05"),
    ] {
        workspace
            .set_invoice_field(key, value)
            .expect("invoice header field exists");
    }
}
