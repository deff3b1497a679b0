//! Payroll tab: one row per employee, one pay slip per row.

pub mod derive;
pub mod template;

use crate::sheet::{FieldDef, FieldKind, FieldSchema, RowCollection};

pub use derive::{compute_pay, derive_payslip, payslip_filename, tagged_payslip_filename, PayAmounts, PayslipView};
pub use template::render_payslip;

/// Multiplier applied to the hourly rate for overtime hours.
pub const OVERTIME_MULTIPLIER: f64 = 1.25;

pub const PAYSLIP_SUFFIX: &str = "-pay-slip.pdf";

const PAYROLL_FIELDS: &[FieldDef] = &[
    FieldDef::required("employee_name", "Employee Name", FieldKind::Text),
    FieldDef::optional("designation", "Designation", FieldKind::Text),
    FieldDef::required("pay_period", "Pay Period", FieldKind::Text),
    FieldDef::required("pay_date", "Pay Date", FieldKind::Date),
    FieldDef::required("hourly_rate", "Hourly Rate", FieldKind::Numeric),
    FieldDef::required("hours_worked", "Hours Worked", FieldKind::Numeric),
    FieldDef::optional("overtime_hours", "Overtime Hours", FieldKind::Numeric),
    FieldDef::optional("allowances", "Allowances", FieldKind::Numeric),
    FieldDef::optional("deductions", "Deductions", FieldKind::Numeric),
];

pub const PAYROLL_SCHEMA: FieldSchema = FieldSchema::new(PAYROLL_FIELDS);

/// A fresh payroll sheet with one empty employee row.
pub fn new_sheet() -> RowCollection {
    RowCollection::new(PAYROLL_SCHEMA)
}
