//! Typst markup for the printable pay slip.

use crate::assets::{AssetError, AssetSlot, AssetSlots};
use crate::export::RenderFragment;
use crate::format::{today_display, typst_text};

use super::derive::PayslipView;

fn pair(label: &str, value: &str) -> String {
    format!("  [{}], [{}],\n", typst_text(label), typst_text(value))
}

fn amount_row(label: &str, value: &str) -> String {
    format!(
        "  [{}], align(right)[{}],\n",
        typst_text(label),
        typst_text(value)
    )
}

/// Build the static pay slip document for `view`.
pub fn render_payslip(view: &PayslipView, assets: &AssetSlots) -> Result<RenderFragment, AssetError> {
    let mut fragment = RenderFragment::default();
    let logo = fragment.attach_asset(AssetSlot::Logo, assets.get(AssetSlot::Logo))?;
    let signature = fragment.attach_asset(AssetSlot::Signature, assets.get(AssetSlot::Signature))?;

    let mut markup = String::new();

    let logo_cell = logo
        .map(|name| format!("image(\"{}\", height: 16mm)", name))
        .unwrap_or_else(|| "[]".to_string());
    markup.push_str(&format!(
        "#grid(columns: (1fr, auto), align: (left + horizon, right + horizon),\n  {},\n  text(size: 18pt, weight: \"bold\")[{}],\n)\n#line(length: 100%)\n\n",
        logo_cell,
        typst_text("PAY SLIP"),
    ));

    markup.push_str("#table(columns: (auto, 1fr), stroke: none,\n");
    markup.push_str(&pair("Employee", &view.employee_name));
    if !view.designation.is_empty() {
        markup.push_str(&pair("Designation", &view.designation));
    }
    markup.push_str(&pair("Pay Period", &view.pay_period));
    markup.push_str(&pair("Pay Date", &view.pay_date));
    markup.push_str(&pair("Hourly Rate", &view.hourly_rate));
    markup.push_str(&pair("Hours Worked", &view.hours_worked));
    markup.push_str(&pair("Overtime Hours", &view.overtime_hours));
    markup.push_str(")\n\n");

    markup.push_str("#table(columns: (1fr, auto), stroke: 0.5pt + gray,\n");
    markup.push_str(&amount_row("Basic Pay", &view.basic_pay));
    markup.push_str(&amount_row("Overtime Pay", &view.overtime_pay));
    markup.push_str(&amount_row("Allowances", &view.allowances));
    markup.push_str(&amount_row("Gross Pay", &view.gross_pay));
    markup.push_str(&amount_row("Deductions", &view.deductions));
    markup.push_str(&format!(
        "  text(weight: \"bold\")[{}], align(right, text(weight: \"bold\")[{}]),\n)\n\n",
        typst_text("Net Pay"),
        typst_text(&view.net_pay),
    ));

    markup.push_str("#v(18mm)\n");
    if let Some(name) = signature {
        markup.push_str(&format!("#image(\"{}\", height: 14mm)\n", name));
    }
    markup.push_str(&format!(
        "#line(length: 60mm)\n{}\n\n#align(right, text(size: 8pt, fill: gray)[{}])\n",
        typst_text("Authorized Signature"),
        typst_text(&format!("Generated {}", today_display())),
    ));

    fragment.markup = markup;
    Ok(fragment)
}
