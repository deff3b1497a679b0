//! Ordered, editable row collection with a required-field error set.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

use super::clipboard::parse_block;
use super::schema::FieldSchema;

/// Errors raised by row collection edits.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("row {index} does not exist (collection has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("field position {position} is outside the schema ({len} fields)")]
    FieldOutOfRange { position: usize, len: usize },
    #[error("at least one row must remain")]
    LastRow,
}

/// 1-based numbers of rows that failed required-field validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidRows(pub Vec<usize>);

impl InvalidRows {
    pub fn row_numbers(&self) -> &[usize] {
        &self.0
    }
}

impl fmt::Display for InvalidRows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let numbers: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(
            f,
            "missing required fields in row(s) {}",
            numbers.join(", ")
        )
    }
}

impl std::error::Error for InvalidRows {}

/// What a paste did to the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PasteOutcome {
    /// Single-line text without tabs; left to ordinary text entry.
    PlainText,
    Applied { rows_touched: usize, rows_added: usize },
}

/// One record, positionally aligned with its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRecord {
    values: Vec<String>,
}

impl RowRecord {
    fn empty(width: usize) -> Self {
        Self {
            values: vec![String::new(); width],
        }
    }

    pub fn value(&self, position: usize) -> &str {
        self.values.get(position).map(String::as_str).unwrap_or("")
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// Row collection editor. Never holds fewer than one row.
#[derive(Debug, Clone)]
pub struct RowCollection {
    schema: FieldSchema,
    rows: Vec<RowRecord>,
    errors: BTreeSet<(usize, &'static str)>,
}

impl RowCollection {
    pub fn new(schema: FieldSchema) -> Self {
        Self {
            schema,
            rows: vec![RowRecord::empty(schema.len())],
            errors: BTreeSet::new(),
        }
    }

    pub fn schema(&self) -> FieldSchema {
        self.schema
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[RowRecord] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Result<&RowRecord, EditorError> {
        self.rows.get(index).ok_or(EditorError::RowOutOfRange {
            index,
            len: self.rows.len(),
        })
    }

    /// Raw value of `key` in row `index`.
    pub fn value(&self, index: usize, key: &str) -> Result<&str, EditorError> {
        let position = self
            .schema
            .position(key)
            .ok_or_else(|| EditorError::UnknownField(key.to_string()))?;
        Ok(self.row(index)?.value(position))
    }

    /// Current error set as `(row index, field key)` pairs.
    pub fn errors(&self) -> &BTreeSet<(usize, &'static str)> {
        &self.errors
    }

    pub fn has_error(&self, index: usize, key: &str) -> bool {
        self.errors
            .iter()
            .any(|(row, field)| *row == index && *field == key)
    }

    /// Rows keyed by field name, for previews and snapshots.
    pub fn to_maps(&self) -> Vec<BTreeMap<String, String>> {
        self.rows
            .iter()
            .map(|row| {
                self.schema
                    .fields()
                    .iter()
                    .zip(row.values())
                    .map(|(field, value)| (field.key.to_string(), value.clone()))
                    .collect()
            })
            .collect()
    }

    /// Append an empty row and return its index.
    pub fn add_row(&mut self) -> usize {
        self.rows.push(RowRecord::empty(self.schema.len()));
        self.rows.len() - 1
    }

    /// Remove the row at `index`. Refuses to remove the last remaining row.
    pub fn remove_row(&mut self, index: usize) -> Result<(), EditorError> {
        self.row(index)?;
        if self.rows.len() == 1 {
            log::warn!("refused to remove the only remaining row");
            return Err(EditorError::LastRow);
        }

        self.rows.remove(index);
        self.errors = std::mem::take(&mut self.errors)
            .into_iter()
            .filter(|(row, _)| *row != index)
            .map(|(row, key)| if row > index { (row - 1, key) } else { (row, key) })
            .collect();

        Ok(())
    }

    /// Normalize and store a value. A non-blank value clears that cell's error.
    pub fn set_field(&mut self, index: usize, key: &str, raw_value: &str) -> Result<(), EditorError> {
        let position = self
            .schema
            .position(key)
            .ok_or_else(|| EditorError::UnknownField(key.to_string()))?;
        let len = self.rows.len();
        let field = self.schema.fields()[position];
        let row = self
            .rows
            .get_mut(index)
            .ok_or(EditorError::RowOutOfRange { index, len })?;

        let normalized = field.kind.normalize(raw_value);
        let blank = normalized.trim().is_empty();
        row.values[position] = normalized;

        if !blank {
            self.errors.remove(&(index, field.key));
        }

        Ok(())
    }

    /// Fill a tab-separated block starting at `(start_index, start_field)`.
    ///
    /// Cells beyond the last schema field are dropped, missing rows are
    /// appended, and the error set is rebuilt for the whole collection.
    pub fn paste_block(
        &mut self,
        start_index: usize,
        start_field: usize,
        clipboard_text: &str,
    ) -> Result<PasteOutcome, EditorError> {
        let Some(block) = parse_block(clipboard_text) else {
            return Ok(PasteOutcome::PlainText);
        };

        self.row(start_index)?;
        if start_field >= self.schema.len() {
            return Err(EditorError::FieldOutOfRange {
                position: start_field,
                len: self.schema.len(),
            });
        }

        let mut rows_added = 0;
        for (offset, cells) in block.iter().enumerate() {
            let target = start_index + offset;
            while target >= self.rows.len() {
                self.add_row();
                rows_added += 1;
            }

            for (position, cell) in (start_field..self.schema.len()).zip(cells) {
                let kind = self.schema.fields()[position].kind;
                self.rows[target].values[position] = kind.normalize(cell);
            }
        }

        self.errors.clear();
        for index in 0..self.rows.len() {
            self.flag_row(index);
        }

        log::debug!(
            "pasted {} row(s) at ({}, {}), {} appended",
            block.len(),
            start_index,
            start_field,
            rows_added
        );

        Ok(PasteOutcome::Applied {
            rows_touched: block.len(),
            rows_added,
        })
    }

    /// Re-check the required fields of one row. Returns whether it is valid.
    pub fn validate_row(&mut self, index: usize) -> Result<bool, EditorError> {
        self.row(index)?;
        Ok(self.flag_row(index))
    }

    /// Validate every row; the error lists the 1-based numbers of invalid rows.
    pub fn validate_all(&mut self) -> Result<(), InvalidRows> {
        let invalid: Vec<usize> = (0..self.rows.len())
            .filter(|&index| !self.flag_row(index))
            .map(|index| index + 1)
            .collect();

        if invalid.is_empty() {
            Ok(())
        } else {
            Err(InvalidRows(invalid))
        }
    }

    fn flag_row(&mut self, index: usize) -> bool {
        let mut valid = true;
        for (position, field) in self.schema.fields().iter().enumerate() {
            if !field.required {
                continue;
            }
            if self.rows[index].value(position).trim().is_empty() {
                self.errors.insert((index, field.key));
                valid = false;
            } else {
                self.errors.remove(&(index, field.key));
            }
        }
        valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::schema::{FieldDef, FieldKind};

    const FIELDS: &[FieldDef] = &[
        FieldDef::required("name", "Name", FieldKind::Text),
        FieldDef::required("rate", "Rate", FieldKind::Numeric),
        FieldDef::optional("note", "Note", FieldKind::Text),
    ];

    fn collection() -> RowCollection {
        RowCollection::new(FieldSchema::new(FIELDS))
    }

    #[test]
    fn starts_with_one_empty_row() {
        let rows = collection();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.value(0, "name").unwrap(), "");
        assert!(rows.errors().is_empty());
    }

    #[test]
    fn last_row_cannot_be_removed() {
        let mut rows = collection();
        assert_eq!(rows.remove_row(0), Err(EditorError::LastRow));
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn remove_row_shifts_error_indices() {
        let mut rows = collection();
        rows.add_row();
        rows.add_row();
        rows.set_field(0, "name", "A").unwrap();
        rows.set_field(0, "rate", "1").unwrap();
        rows.set_field(2, "name", "C").unwrap();
        assert!(rows.validate_all().is_err());
        assert!(rows.has_error(1, "name"));
        assert!(rows.has_error(2, "rate"));

        rows.remove_row(1).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(!rows.has_error(1, "name"));
        assert!(rows.has_error(1, "rate"));
        assert_eq!(rows.value(1, "name").unwrap(), "C");
    }

    #[test]
    fn set_field_normalizes_numbers_and_clears_one_flag() {
        let mut rows = collection();
        assert!(!rows.validate_row(0).unwrap());
        assert!(rows.has_error(0, "name"));
        assert!(rows.has_error(0, "rate"));

        rows.set_field(0, "rate", "₱1,250.75").unwrap();
        assert_eq!(rows.value(0, "rate").unwrap(), "1250.75");
        assert!(!rows.has_error(0, "rate"));
        assert!(rows.has_error(0, "name"));
    }

    #[test]
    fn blank_edit_keeps_existing_flag() {
        let mut rows = collection();
        rows.validate_row(0).unwrap();
        rows.set_field(0, "name", "   ").unwrap();
        assert!(rows.has_error(0, "name"));
    }

    #[test]
    fn unknown_field_and_row_are_errors() {
        let mut rows = collection();
        assert_eq!(
            rows.set_field(0, "bogus", "x"),
            Err(EditorError::UnknownField("bogus".to_string()))
        );
        assert_eq!(
            rows.set_field(3, "name", "x"),
            Err(EditorError::RowOutOfRange { index: 3, len: 1 })
        );
    }

    #[test]
    fn paste_fills_and_extends() {
        let mut rows = collection();
        let outcome = rows.paste_block(0, 0, "A\tB\nC\tD").unwrap();
        assert_eq!(
            outcome,
            PasteOutcome::Applied {
                rows_touched: 2,
                rows_added: 1
            }
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.value(0, "name").unwrap(), "A");
        // "B" is normalized away by the numeric rate column.
        assert_eq!(rows.value(0, "rate").unwrap(), "");
        assert_eq!(rows.value(1, "name").unwrap(), "C");
        assert!(rows.has_error(0, "rate"));
        assert!(rows.has_error(1, "rate"));
        assert!(!rows.has_error(0, "name"));
    }

    #[test]
    fn paste_drops_cells_past_the_schema() {
        let mut rows = collection();
        rows.paste_block(0, 1, "10\tnote\textra\tmore").unwrap();
        assert_eq!(rows.value(0, "rate").unwrap(), "10");
        assert_eq!(rows.value(0, "note").unwrap(), "note");
        assert_eq!(rows.row(0).unwrap().values().len(), 3);
    }

    #[test]
    fn plain_paste_is_ignored() {
        let mut rows = collection();
        rows.set_field(0, "name", "keep").unwrap();
        assert_eq!(rows.paste_block(0, 0, "token").unwrap(), PasteOutcome::PlainText);
        assert_eq!(rows.value(0, "name").unwrap(), "keep");
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn validate_all_reports_one_based_rows() {
        let mut rows = collection();
        rows.add_row();
        rows.add_row();
        rows.set_field(1, "name", "B").unwrap();
        rows.set_field(1, "rate", "2").unwrap();
        assert_eq!(rows.validate_all(), Err(InvalidRows(vec![1, 3])));
    }
}
