//! Typst markup for the printable invoice.

use crate::assets::{AssetError, AssetSlot, AssetSlots};
use crate::export::RenderFragment;
use crate::format::typst_text;

use super::derive::InvoiceView;

const COMPANY_NAME: &str = "TechChef";

fn cell(value: &str) -> String {
    format!("[{}]", typst_text(value))
}

fn right(value: &str) -> String {
    format!("align(right)[{}]", typst_text(value))
}

pub fn render_invoice(view: &InvoiceView, assets: &AssetSlots) -> Result<RenderFragment, AssetError> {
    let mut fragment = RenderFragment::default();
    let logo = fragment.attach_asset(AssetSlot::Logo, assets.get(AssetSlot::Logo))?;
    let signature = fragment.attach_asset(AssetSlot::Signature, assets.get(AssetSlot::Signature))?;

    let mut markup = String::new();

    let brand = match logo {
        Some(name) => format!("image(\"{}\", height: 18mm)", name),
        None => format!("text(size: 16pt, weight: \"bold\")[{}]", typst_text(COMPANY_NAME)),
    };
    markup.push_str(&format!(
        "#grid(columns: (1fr, auto), align: (left + horizon, right + horizon),\n  {},\n  text(size: 20pt, weight: \"bold\")[{}],\n)\n#line(length: 100%)\n\n",
        brand,
        typst_text("INVOICE"),
    ));

    markup.push_str("#grid(columns: (1fr, 1fr), gutter: 8mm,\n");
    markup.push_str(&format!(
        "  [*Bill To* \\ {} \\ {}],\n",
        typst_text(&view.client_name),
        typst_text(&view.client_address),
    ));
    markup.push_str(&format!(
        "  align(right)[*Invoice No.* {} \\ *Issued* {} \\ *Due* {}],\n)\n\n",
        typst_text(&view.invoice_number),
        typst_text(&view.issue_date),
        typst_text(&view.due_date),
    ));

    markup.push_str(
        "#table(columns: (1fr, auto, auto, auto, auto, auto), stroke: 0.5pt + gray,\n  table.header([*Description*], [*Qty*], [*Unit Price*], [*Tax*], [*Tax Amount*], [*Amount*]),\n",
    );
    for line in &view.lines {
        markup.push_str(&format!(
            "  {}, {}, {}, {}, {}, {},\n",
            cell(&line.description),
            right(&line.quantity),
            right(&line.unit_price),
            right(&line.tax_rate),
            right(&line.tax_amount),
            right(&line.amount),
        ));
    }
    markup.push_str(")\n\n");

    markup.push_str("#align(right, table(columns: (auto, auto), stroke: none,\n");
    for (label, value) in [
        ("Subtotal", &view.subtotal),
        ("Tax", &view.tax_total),
        ("Total", &view.grand_total),
    ] {
        markup.push_str(&format!("  {}, {},\n", cell(label), right(value)));
    }
    markup.push_str(&format!(
        "  [*{}*], align(right)[*{}*],\n))\n\n",
        typst_text("Amount Due"),
        typst_text(&view.amount_due),
    ));

    if !view.notes.is_empty() {
        markup.push_str(&format!("*Notes* \\ {}\n\n", typst_text(&view.notes)));
    }

    markup.push_str("#v(14mm)\n");
    if let Some(name) = signature {
        markup.push_str(&format!("#image(\"{}\", height: 14mm)\n", name));
    }
    markup.push_str(&format!(
        "#line(length: 60mm)\n{}\n",
        typst_text(&format!("For {}", COMPANY_NAME)),
    ));

    fragment.markup = markup;
    Ok(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocumentSettings;
    use crate::invoice::{derive_invoice, InvoiceDraft};

    #[test]
    fn one_table_row_per_computed_line() {
        let mut draft = InvoiceDraft::default();
        draft.header.set("invoice_number", "INV-7").unwrap();
        draft.header.set("marketing_unit_price", "100").unwrap();
        draft.items.set_field(0, "description", "Recipe costing").unwrap();
        draft.items.set_field(0, "quantity", "3").unwrap();
        draft.items.set_field(0, "unit_price", "40").unwrap();

        let view = derive_invoice(&draft, &DocumentSettings::default());
        let fragment = render_invoice(&view, &AssetSlots::default()).unwrap();

        assert!(fragment.markup.contains("#\"Marketing Fee\""));
        assert!(fragment.markup.contains("#\"Recipe costing\""));
        assert!(fragment.markup.contains("#\"INV-7\""));
        assert!(fragment.markup.contains(&view.amount_due));
        assert!(fragment.markup.contains("#\"TechChef\""));
        assert!(fragment.attachments.is_empty());
    }
}
