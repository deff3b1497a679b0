//! Export state machine
//!
//! `Idle -> Confirming -> Generating -> Idle`, with `Idle -> Generating` when
//! the caller skips the confirmation prompt.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// What the caller asked to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum ExportTarget {
    /// One pay slip for the given 0-based row, or all of them when `row` is absent.
    Payroll {
        #[serde(default)]
        row: Option<usize>,
    },
    Invoice,
}

/// The validated set of documents an export covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExportScope {
    Payslip { row: usize, employee: String },
    AllPayslips { count: usize },
    Invoice { number: String },
}

impl ExportScope {
    pub fn document_count(&self) -> usize {
        match self {
            Self::AllPayslips { count } => *count,
            Self::Payslip { .. } | Self::Invoice { .. } => 1,
        }
    }

    /// The target that produces this scope again when re-validated.
    pub fn target(&self) -> ExportTarget {
        match self {
            Self::Payslip { row, .. } => ExportTarget::Payroll { row: Some(*row) },
            Self::AllPayslips { .. } => ExportTarget::Payroll { row: None },
            Self::Invoice { .. } => ExportTarget::Invoice,
        }
    }

    /// Confirmation prompt text.
    pub fn prompt(&self) -> String {
        match self {
            Self::Payslip { row, employee } => format!(
                "Generate the pay slip for {} (row {})?",
                employee,
                row + 1
            ),
            Self::AllPayslips { count: 1 } => "Generate the pay slip for 1 employee?".to_string(),
            Self::AllPayslips { count } => {
                format!("Generate pay slips for all {} employees?", count)
            }
            Self::Invoice { number } => format!("Generate invoice {}?", number),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ExportState {
    #[default]
    Idle,
    Confirming {
        scope: ExportScope,
    },
    Generating {
        scope: ExportScope,
    },
}

impl ExportState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_generating(&self) -> bool {
        matches!(self, Self::Generating { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Confirming { .. } => "awaiting confirmation",
            Self::Generating { .. } => "in progress",
        }
    }
}
