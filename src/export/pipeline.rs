//! Drives a workspace through validate, confirm and generate.
//!
//! The workspace lock is only held while validating and snapshotting the
//! documents to render; rendering itself runs unlocked, one document at a
//! time, while the `Generating` state keeps row and asset changes out.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::options::ExportOptions;
use super::staging::StagingSurface;
use super::state::{ExportScope, ExportState, ExportTarget};
use super::traits::{RenderFragment, RenderPrimitive};
use super::ExportError;
use crate::assets::AssetError;
use crate::config::DocumentSettings;
use crate::sheet::InvalidRows;
use crate::workspace::Workspace;
use crate::{invoice, payroll};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ExportedFile {
    /// 1-based payroll row, absent for invoices
    pub row_number: Option<usize>,
    pub filename: String,
    pub size_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FailedExport {
    pub row_number: Option<usize>,
    pub filename: String,
    pub message: String,
}

/// Per-document outcome of one export run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BatchReport {
    #[schema(value_type = String)]
    pub job_id: Uuid,
    pub scope: ExportScope,
    pub succeeded: Vec<ExportedFile>,
    pub failed: Vec<FailedExport>,
}

impl BatchReport {
    fn new(job_id: Uuid, scope: ExportScope) -> Self {
        Self {
            job_id,
            scope,
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    /// Short notification text, e.g. "3 of 4 document(s) exported; failed: row 2".
    pub fn summary(&self) -> String {
        let total = self.success_count() + self.failure_count();
        if self.failed.is_empty() {
            return format!("{} of {} document(s) exported", self.success_count(), total);
        }

        let failed: Vec<String> = self
            .failed
            .iter()
            .map(|failure| match failure.row_number {
                Some(row) => format!("row {}", row),
                None => failure.filename.clone(),
            })
            .collect();
        format!(
            "{} of {} document(s) exported; failed: {}",
            self.success_count(),
            total,
            failed.join(", ")
        )
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExportOutcome {
    ConfirmationRequired { scope: ExportScope, prompt: String },
    Completed { report: BatchReport },
}

struct PreparedDocument {
    row_number: Option<usize>,
    fragment: Result<RenderFragment, AssetError>,
    options: ExportOptions,
}

/// Rename documents whose filename is shared within one job, tagging them
/// with their row number, so every success in a batch is a distinct file.
fn disambiguate_filenames(documents: &mut [PreparedDocument]) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for document in documents.iter() {
        *counts.entry(document.options.filename.clone()).or_default() += 1;
    }

    let mut used = HashSet::new();
    for document in documents.iter_mut() {
        let base = document.options.filename.clone();
        let row = document.row_number.map(|n| n.to_string()).unwrap_or_default();
        let shared = counts.get(&base).copied().unwrap_or(0) > 1;

        let mut candidate = if shared && !row.is_empty() {
            payroll::tagged_payslip_filename(&base, &row)
        } else {
            base.clone()
        };
        let mut attempt = 1;
        while !used.insert(candidate.clone()) {
            let tag = if attempt == 1 {
                row.clone()
            } else {
                format!("{row}-{attempt}")
            };
            candidate = payroll::tagged_payslip_filename(&base, &tag);
            attempt += 1;
        }

        if candidate != base {
            log::debug!("renamed duplicate {} to {}", base, candidate);
        }
        document.options.filename = candidate;
    }
}

struct ExportJob {
    id: Uuid,
    scope: ExportScope,
    documents: Vec<PreparedDocument>,
}

/// Puts the workspace back to `Idle` when a run ends, however it ends.
struct IdleOnDrop<'a> {
    workspace: &'a Mutex<Workspace>,
}

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        self.workspace.lock().export = ExportState::Idle;
    }
}

pub struct Exporter {
    renderer: Arc<dyn RenderPrimitive>,
    staging: StagingSurface,
    settings: DocumentSettings,
}

impl Exporter {
    pub fn new(renderer: Arc<dyn RenderPrimitive>, settings: DocumentSettings) -> Self {
        Self {
            renderer,
            staging: StagingSurface::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &DocumentSettings {
        &self.settings
    }

    pub fn staging(&self) -> &StagingSurface {
        &self.staging
    }

    /// Validate `target` and either park it for confirmation or, with
    /// `skip_confirmation`, generate right away.
    pub async fn request(
        &self,
        workspace: &Mutex<Workspace>,
        target: ExportTarget,
        skip_confirmation: bool,
    ) -> Result<ExportOutcome, ExportError> {
        let job = {
            let mut ws = workspace.lock();
            if !ws.export.is_idle() {
                return Err(ExportError::Busy(ws.export.label()));
            }

            let scope = Self::gate(&mut ws, target)?;
            if !skip_confirmation {
                let prompt = scope.prompt();
                log::info!("export awaiting confirmation: {}", prompt);
                ws.export = ExportState::Confirming {
                    scope: scope.clone(),
                };
                return Ok(ExportOutcome::ConfirmationRequired { scope, prompt });
            }

            self.begin(&mut ws, scope)?
        };

        Ok(ExportOutcome::Completed {
            report: self.run(workspace, job).await,
        })
    }

    /// Accept the pending confirmation and generate.
    ///
    /// The rows are validated again since they may have been edited while
    /// the prompt was open; on failure the prompt is dropped.
    pub async fn confirm(&self, workspace: &Mutex<Workspace>) -> Result<BatchReport, ExportError> {
        let job = {
            let mut ws = workspace.lock();
            let pending = match &ws.export {
                ExportState::Confirming { scope } => scope.clone(),
                ExportState::Generating { .. } => return Err(ExportError::Busy(ws.export.label())),
                ExportState::Idle => return Err(ExportError::NothingPending),
            };

            ws.export = ExportState::Idle;
            let scope = Self::gate(&mut ws, pending.target())?;
            self.begin(&mut ws, scope)?
        };

        Ok(self.run(workspace, job).await)
    }

    /// Dismiss the pending confirmation. Nothing else changes.
    pub fn cancel(&self, workspace: &Mutex<Workspace>) -> Result<ExportScope, ExportError> {
        let mut ws = workspace.lock();
        match &ws.export {
            ExportState::Confirming { scope } => {
                let scope = scope.clone();
                ws.export = ExportState::Idle;
                log::info!("export cancelled: {}", scope.prompt());
                Ok(scope)
            }
            ExportState::Generating { .. } => Err(ExportError::Busy(ws.export.label())),
            ExportState::Idle => Err(ExportError::NothingPending),
        }
    }

    /// Required-field gate. Refuses with the offending rows or header fields.
    fn gate(ws: &mut Workspace, target: ExportTarget) -> Result<ExportScope, ExportError> {
        match target {
            ExportTarget::Payroll { row: Some(row) } => {
                if !ws.payroll.validate_row(row)? {
                    return Err(ExportError::InvalidRows(InvalidRows(vec![row + 1])));
                }
                let employee = ws.payroll.value(row, "employee_name")?.trim().to_string();
                Ok(ExportScope::Payslip { row, employee })
            }
            ExportTarget::Payroll { row: None } => {
                ws.payroll
                    .validate_all()
                    .map_err(ExportError::InvalidRows)?;
                Ok(ExportScope::AllPayslips {
                    count: ws.payroll.len(),
                })
            }
            ExportTarget::Invoice => {
                ws.invoice
                    .header
                    .validate()
                    .map_err(ExportError::InvalidHeader)?;
                ws.invoice
                    .items
                    .validate_all()
                    .map_err(ExportError::InvalidRows)?;
                Ok(ExportScope::Invoice {
                    number: ws.invoice.header.invoice_number.trim().to_string(),
                })
            }
        }
    }

    /// Snapshot the documents for `scope` and enter `Generating`.
    fn begin(&self, ws: &mut Workspace, scope: ExportScope) -> Result<ExportJob, ExportError> {
        let documents = self.prepare(ws, &scope)?;
        ws.export = ExportState::Generating {
            scope: scope.clone(),
        };

        Ok(ExportJob {
            id: Uuid::new_v4(),
            scope,
            documents,
        })
    }

    fn prepare(&self, ws: &Workspace, scope: &ExportScope) -> Result<Vec<PreparedDocument>, ExportError> {
        let payslip = |row: usize| -> Result<PreparedDocument, ExportError> {
            let view = payroll::derive_payslip(&ws.payroll, row, &self.settings)?;
            Ok(PreparedDocument {
                row_number: Some(view.row_number),
                fragment: payroll::render_payslip(&view, &ws.assets),
                options: ExportOptions::a4_portrait(view.filename),
            })
        };

        match scope {
            ExportScope::Payslip { row, .. } => Ok(vec![payslip(*row)?]),
            ExportScope::AllPayslips { count } => {
                let mut documents = (0..*count).map(payslip).collect::<Result<Vec<_>, _>>()?;
                disambiguate_filenames(&mut documents);
                Ok(documents)
            }
            ExportScope::Invoice { .. } => {
                let view = invoice::derive_invoice(&ws.invoice, &self.settings);
                Ok(vec![PreparedDocument {
                    row_number: None,
                    fragment: invoice::render_invoice(&view, &ws.assets),
                    options: ExportOptions::a4_portrait(view.filename),
                }])
            }
        }
    }

    /// Render every document in order. A failed document is recorded and the
    /// run moves on to the next one.
    async fn run(&self, workspace: &Mutex<Workspace>, job: ExportJob) -> BatchReport {
        let _idle = IdleOnDrop { workspace };
        let mut report = BatchReport::new(job.id, job.scope);

        log::info!(
            "export {} started: {} document(s)",
            job.id,
            job.documents.len()
        );

        for document in job.documents {
            let filename = document.options.filename.clone();
            let result = match document.fragment {
                Ok(fragment) => {
                    let _staged = self.staging.mount(filename.clone());
                    self.renderer
                        .render(&fragment, &document.options)
                        .await
                        .map_err(|e| e.to_string())
                }
                Err(e) => Err(e.to_string()),
            };

            match result {
                Ok(file) => report.succeeded.push(ExportedFile {
                    row_number: document.row_number,
                    filename: file.filename,
                    size_bytes: file.size_bytes,
                }),
                Err(message) => {
                    log::error!("export {} failed for {}: {}", job.id, filename, message);
                    report.failed.push(FailedExport {
                        row_number: document.row_number,
                        filename,
                        message,
                    });
                }
            }
        }

        log::info!("export {} finished: {}", job.id, report.summary());
        report
    }
}
