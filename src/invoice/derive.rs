//! Invoice totals: marketing fee, per-line tax, subtotal and amount due.
//!
//! Everything here is recomputed from the draft on every call; nothing is
//! cached or written back.

use serde::Serialize;
use utoipa::ToSchema;

use super::{InvoiceDraft, INVOICE_SUFFIX, MARKETING_FEE_LABEL};
use crate::config::DocumentSettings;
use crate::format::{
    format_currency, format_display_date, format_percent, format_quantity, number_or_zero,
    parse_number, sanitize_filename,
};
use crate::sheet::RowCollection;

/// One line item with its numbers parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct LineInput {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    /// Explicit tax percent; `None` falls back to the default.
    pub tax_rate: Option<f64>,
}

impl LineInput {
    /// Parse every row of a line item sheet.
    pub fn from_rows(items: &RowCollection) -> Vec<LineInput> {
        let schema = items.schema();
        let position = |key: &str| schema.position(key).unwrap_or(usize::MAX);
        let (description, quantity, unit_price, tax_rate) = (
            position("description"),
            position("quantity"),
            position("unit_price"),
            position("tax_rate"),
        );

        items
            .rows()
            .iter()
            .map(|row| LineInput {
                description: row.value(description).trim().to_string(),
                quantity: number_or_zero(row.value(quantity)),
                unit_price: number_or_zero(row.value(unit_price)),
                tax_rate: parse_number(row.value(tax_rate)),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ComputedLine {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub tax_percent: f64,
    pub base_amount: f64,
    pub tax_amount: f64,
    pub line_total: f64,
}

impl ComputedLine {
    fn new(description: String, quantity: f64, unit_price: f64, tax_percent: f64) -> Self {
        let base_amount = quantity * unit_price;
        let tax_amount = base_amount * tax_percent / 100.0;
        Self {
            description,
            quantity,
            unit_price,
            tax_percent,
            base_amount,
            tax_amount,
            line_total: base_amount + tax_amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct InvoiceTotals {
    pub lines: Vec<ComputedLine>,
    pub subtotal: f64,
    pub tax_total: f64,
    pub grand_total: f64,
    pub amount_due: f64,
}

/// Compute lines and totals.
///
/// A supplied marketing price adds a leading fee line (quantity 1, default
/// tax). Lines with no description and a zero base amount are left out.
pub fn compute_invoice(
    marketing_unit_price: Option<f64>,
    items: &[LineInput],
    default_tax_percent: f64,
) -> InvoiceTotals {
    let mut lines = Vec::with_capacity(items.len() + 1);

    if let Some(price) = marketing_unit_price {
        lines.push(ComputedLine::new(
            MARKETING_FEE_LABEL.to_string(),
            1.0,
            price,
            default_tax_percent,
        ));
    }

    for item in items {
        let tax_percent = item.tax_rate.unwrap_or(default_tax_percent).max(0.0);
        let line = ComputedLine::new(
            item.description.clone(),
            item.quantity,
            item.unit_price,
            tax_percent,
        );
        if line.description.is_empty() && line.base_amount == 0.0 {
            continue;
        }
        lines.push(line);
    }

    let subtotal: f64 = lines.iter().map(|line| line.base_amount).sum();
    let tax_total: f64 = lines.iter().map(|line| line.tax_amount).sum();
    let grand_total = subtotal + tax_total;

    InvoiceTotals {
        lines,
        subtotal,
        tax_total,
        grand_total,
        // No partial payments are tracked.
        amount_due: grand_total,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LineView {
    pub description: String,
    pub quantity: String,
    pub unit_price: String,
    pub tax_rate: String,
    pub tax_amount: String,
    pub amount: String,
}

/// Display-ready invoice.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct InvoiceView {
    pub invoice_number: String,
    pub client_name: String,
    pub client_address: String,
    pub issue_date: String,
    pub due_date: String,
    pub notes: String,
    pub lines: Vec<LineView>,
    pub subtotal: String,
    pub tax_total: String,
    pub grand_total: String,
    pub amount_due: String,
    pub totals: InvoiceTotals,
    pub filename: String,
}

pub fn invoice_filename(invoice_number: &str) -> String {
    format!("{}{}", sanitize_filename(invoice_number, "invoice"), INVOICE_SUFFIX)
}

pub fn derive_invoice(draft: &InvoiceDraft, settings: &DocumentSettings) -> InvoiceView {
    let header = &draft.header;
    let totals = compute_invoice(
        parse_number(&header.marketing_unit_price),
        &LineInput::from_rows(&draft.items),
        settings.default_tax_percent,
    );
    let money = |amount: f64| format_currency(amount, &settings.currency_prefix);

    let lines = totals
        .lines
        .iter()
        .map(|line| LineView {
            description: line.description.clone(),
            quantity: format_quantity(line.quantity),
            unit_price: money(line.unit_price),
            tax_rate: format_percent(line.tax_percent),
            tax_amount: money(line.tax_amount),
            amount: money(line.line_total),
        })
        .collect();

    InvoiceView {
        invoice_number: header.invoice_number.trim().to_string(),
        client_name: header.client_name.trim().to_string(),
        client_address: header.client_address.trim().to_string(),
        issue_date: format_display_date(&header.issue_date),
        due_date: format_display_date(&header.due_date),
        notes: header.notes.trim().to_string(),
        lines,
        subtotal: money(totals.subtotal),
        tax_total: money(totals.tax_total),
        grand_total: money(totals.grand_total),
        amount_due: money(totals.amount_due),
        filename: invoice_filename(&header.invoice_number),
        totals,
    }
}
