//! Spreadsheet-like row editing shared by the payroll and invoice forms.
//!
//! - `schema` - static field definitions and per-kind normalization
//! - `clipboard` - tab/newline block parsing for paste-to-fill
//! - `editor` - the row collection with its required-field error set
//! - `validation` - field-level checks for single-record forms

pub mod clipboard;
pub mod editor;
pub mod schema;
pub mod validation;

pub use editor::{EditorError, InvalidRows, PasteOutcome, RowCollection, RowRecord};
pub use schema::{FieldDef, FieldKind, FieldSchema};
pub use validation::{ValidationError, ValidationErrors};
