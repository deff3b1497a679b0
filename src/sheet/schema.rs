//! Static field schemas for row collections.

use serde::Serialize;
use utoipa::ToSchema;

/// How a field's raw input is normalized and interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Numeric,
    Date,
}

impl FieldKind {
    /// Normalize raw input for this kind.
    ///
    /// Numeric fields keep only ASCII digits and the first decimal point.
    /// Text and date fields pass through untouched.
    pub fn normalize(self, raw: &str) -> String {
        match self {
            FieldKind::Text | FieldKind::Date => raw.to_string(),
            FieldKind::Numeric => {
                let mut seen_point = false;
                raw.chars()
                    .filter(|ch| {
                        if ch.is_ascii_digit() {
                            true
                        } else if *ch == '.' && !seen_point {
                            seen_point = true;
                            true
                        } else {
                            false
                        }
                    })
                    .collect()
            }
        }
    }
}

/// One column of a row record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldDef {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldDef {
    pub const fn required(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: true,
        }
    }

    pub const fn optional(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: false,
        }
    }
}

/// Fixed, ordered list of fields. Field position matters for clipboard paste.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSchema {
    fields: &'static [FieldDef],
}

impl FieldSchema {
    pub const fn new(fields: &'static [FieldDef]) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &'static [FieldDef] {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&'static FieldDef> {
        self.fields.get(position)
    }

    /// Position of `key` in the schema.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.key == key)
    }

    pub fn field(&self, key: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|field| field.key == key)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &'static FieldDef> {
        self.fields.iter().filter(|field| field.required)
    }
}
