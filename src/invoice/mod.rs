//! Invoice tab: a header form plus an editable list of line items.

pub mod derive;
pub mod template;

use serde::Serialize;
use utoipa::ToSchema;

use crate::sheet::validation::{validate_number_optional, validate_required};
use crate::sheet::{
    EditorError, FieldDef, FieldKind, FieldSchema, RowCollection, ValidationErrors,
};

pub use derive::{
    compute_invoice, derive_invoice, invoice_filename, ComputedLine, InvoiceTotals, InvoiceView,
    LineInput,
};
pub use template::render_invoice;

pub const INVOICE_SUFFIX: &str = "-techchef-invoice.pdf";
pub const MARKETING_FEE_LABEL: &str = "Marketing Fee";

const HEADER_FIELDS: &[FieldDef] = &[
    FieldDef::required("invoice_number", "Invoice Number", FieldKind::Text),
    FieldDef::required("client_name", "Client Name", FieldKind::Text),
    FieldDef::optional("client_address", "Client Address", FieldKind::Text),
    FieldDef::required("issue_date", "Issue Date", FieldKind::Date),
    FieldDef::optional("due_date", "Due Date", FieldKind::Date),
    FieldDef::optional("marketing_unit_price", "Marketing Unit Price", FieldKind::Numeric),
    FieldDef::optional("notes", "Notes", FieldKind::Text),
];

pub const HEADER_SCHEMA: FieldSchema = FieldSchema::new(HEADER_FIELDS);

const LINE_ITEM_FIELDS: &[FieldDef] = &[
    FieldDef::optional("description", "Description", FieldKind::Text),
    FieldDef::optional("quantity", "Quantity", FieldKind::Numeric),
    FieldDef::optional("unit_price", "Unit Price", FieldKind::Numeric),
    FieldDef::optional("tax_rate", "Tax Rate (%)", FieldKind::Numeric),
];

pub const LINE_ITEM_SCHEMA: FieldSchema = FieldSchema::new(LINE_ITEM_FIELDS);

/// Invoice header as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct InvoiceHeader {
    pub invoice_number: String,
    pub client_name: String,
    pub client_address: String,
    pub issue_date: String,
    pub due_date: String,
    pub marketing_unit_price: String,
    pub notes: String,
}

impl InvoiceHeader {
    /// Normalize `raw_value` by the field's kind and store it.
    pub fn set(&mut self, key: &str, raw_value: &str) -> Result<(), EditorError> {
        let field = HEADER_SCHEMA
            .field(key)
            .ok_or_else(|| EditorError::UnknownField(key.to_string()))?;
        let value = field.kind.normalize(raw_value);

        let slot = match field.key {
            "invoice_number" => &mut self.invoice_number,
            "client_name" => &mut self.client_name,
            "client_address" => &mut self.client_address,
            "issue_date" => &mut self.issue_date,
            "due_date" => &mut self.due_date,
            "marketing_unit_price" => &mut self.marketing_unit_price,
            "notes" => &mut self.notes,
            other => return Err(EditorError::UnknownField(other.to_string())),
        };
        *slot = value;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        validate_required(&self.invoice_number, "invoice_number", "Invoice Number", &mut errors);
        validate_required(&self.client_name, "client_name", "Client Name", &mut errors);
        validate_required(&self.issue_date, "issue_date", "Issue Date", &mut errors);
        validate_number_optional(
            &self.marketing_unit_price,
            "marketing_unit_price",
            "Marketing Unit Price",
            &mut errors,
        );

        errors.into_result()
    }
}

/// Everything the invoice tab holds.
#[derive(Debug, Clone)]
pub struct InvoiceDraft {
    pub header: InvoiceHeader,
    pub items: RowCollection,
}

impl Default for InvoiceDraft {
    fn default() -> Self {
        Self {
            header: InvoiceHeader::default(),
            items: RowCollection::new(LINE_ITEM_SCHEMA),
        }
    }
}
