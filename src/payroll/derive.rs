//! Pure pay slip derivation. Reads a row, never writes it.

use serde::Serialize;
use utoipa::ToSchema;

use super::{OVERTIME_MULTIPLIER, PAYSLIP_SUFFIX};
use crate::config::DocumentSettings;
use crate::format::{
    format_currency, format_display_date, format_quantity, number_or_zero, sanitize_filename,
};
use crate::sheet::{EditorError, RowCollection};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct PayAmounts {
    pub basic_pay: f64,
    pub overtime_pay: f64,
    pub allowances: f64,
    pub gross_pay: f64,
    pub deductions: f64,
    pub net_pay: f64,
}

/// Basic, overtime, gross and net pay from the raw inputs.
pub fn compute_pay(
    hourly_rate: f64,
    hours_worked: f64,
    overtime_hours: f64,
    allowances: f64,
    deductions: f64,
) -> PayAmounts {
    let basic_pay = hourly_rate * hours_worked;
    let overtime_pay = hourly_rate * overtime_hours * OVERTIME_MULTIPLIER;
    let gross_pay = basic_pay + overtime_pay + allowances;

    PayAmounts {
        basic_pay,
        overtime_pay,
        allowances,
        gross_pay,
        deductions,
        net_pay: gross_pay - deductions,
    }
}

/// Display-ready pay slip for one employee row.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PayslipView {
    /// 1-based row number in the payroll sheet
    pub row_number: usize,
    pub employee_name: String,
    pub designation: String,
    pub pay_period: String,
    pub pay_date: String,
    pub hourly_rate: String,
    pub hours_worked: String,
    pub overtime_hours: String,
    pub basic_pay: String,
    pub overtime_pay: String,
    pub allowances: String,
    pub gross_pay: String,
    pub deductions: String,
    pub net_pay: String,
    pub amounts: PayAmounts,
    pub filename: String,
}

pub fn payslip_filename(employee_name: &str) -> String {
    format!("{}{}", sanitize_filename(employee_name, "employee"), PAYSLIP_SUFFIX)
}

/// Insert `tag` before the pay slip suffix: `ana-cruz-pay-slip.pdf` with
/// tag `2` becomes `ana-cruz-2-pay-slip.pdf`.
pub fn tagged_payslip_filename(filename: &str, tag: &str) -> String {
    let stem = filename.strip_suffix(PAYSLIP_SUFFIX).unwrap_or(filename);
    format!("{stem}-{tag}{PAYSLIP_SUFFIX}")
}

pub fn derive_payslip(
    sheet: &RowCollection,
    index: usize,
    settings: &DocumentSettings,
) -> Result<PayslipView, EditorError> {
    let text = |key: &str| sheet.value(index, key).map(|value| value.trim().to_string());
    let number = |key: &str| sheet.value(index, key).map(number_or_zero);

    let hourly_rate = number("hourly_rate")?;
    let hours_worked = number("hours_worked")?;
    let overtime_hours = number("overtime_hours")?;
    let amounts = compute_pay(
        hourly_rate,
        hours_worked,
        overtime_hours,
        number("allowances")?,
        number("deductions")?,
    );

    let money = |amount: f64| format_currency(amount, &settings.currency_prefix);
    let employee_name = text("employee_name")?;

    Ok(PayslipView {
        row_number: index + 1,
        filename: payslip_filename(&employee_name),
        employee_name,
        designation: text("designation")?,
        pay_period: text("pay_period")?,
        pay_date: format_display_date(sheet.value(index, "pay_date")?),
        hourly_rate: money(hourly_rate),
        hours_worked: format_quantity(hours_worked),
        overtime_hours: format_quantity(overtime_hours),
        basic_pay: money(amounts.basic_pay),
        overtime_pay: money(amounts.overtime_pay),
        allowances: money(amounts.allowances),
        gross_pay: money(amounts.gross_pay),
        deductions: money(amounts.deductions),
        net_pay: money(amounts.net_pay),
        amounts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payroll::new_sheet;

    #[test]
    fn overtime_is_paid_at_premium() {
        let pay = compute_pay(100.0, 40.0, 4.0, 500.0, 250.0);
        assert_eq!(pay.basic_pay, 4000.0);
        assert_eq!(pay.overtime_pay, 500.0);
        assert_eq!(pay.gross_pay, 5000.0);
        assert_eq!(pay.net_pay, 4750.0);
    }

    #[test]
    fn derive_formats_without_touching_the_row() {
        let mut sheet = new_sheet();
        sheet.set_field(0, "employee_name", " Maria Santos ").unwrap();
        sheet.set_field(0, "pay_period", "March 1-15").unwrap();
        sheet.set_field(0, "pay_date", "2025-03-15").unwrap();
        sheet.set_field(0, "hourly_rate", "150").unwrap();
        sheet.set_field(0, "hours_worked", "80").unwrap();
        let before = sheet.row(0).unwrap().clone();

        let view = derive_payslip(&sheet, 0, &DocumentSettings::default()).unwrap();

        assert_eq!(sheet.row(0).unwrap(), &before);
        assert_eq!(view.employee_name, "Maria Santos");
        assert_eq!(view.pay_date, "March 15, 2025");
        assert_eq!(view.basic_pay, "₱12,000.00");
        assert_eq!(view.overtime_pay, "₱0.00");
        assert_eq!(view.net_pay, "₱12,000.00");
        assert_eq!(view.hours_worked, "80");
        assert_eq!(view.filename, "maria-santos-pay-slip.pdf");
        assert_eq!(view.row_number, 1);
    }

    #[test]
    fn out_of_range_row_is_an_error() {
        let sheet = new_sheet();
        assert!(derive_payslip(&sheet, 5, &DocumentSettings::default()).is_err());
    }
}
