use crate::record::schema::{FieldKind, Schema, SchemaError};
use std::fmt;
use std::sync::Arc;

/// A known field value. Absence is modelled as `None` around this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Flag(_) => None,
        }
    }

    /// Cell representation: text verbatim, `true` / `false` for flags
    pub fn to_cell(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Flag(flag) => flag.to_string(),
        }
    }

    fn from_cell(cell: &str, kind: FieldKind) -> Option<Self> {
        if cell.is_empty() {
            return None;
        }
        match (kind, cell) {
            (FieldKind::Flag, "true") => Some(Self::Flag(true)),
            (FieldKind::Flag, "false") => Some(Self::Flag(false)),
            _ => Some(Self::Text(cell.to_string())),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cell())
    }
}

/// One extracted listing
///
/// Values are stored positionally against the schema, so every record
/// has exactly the schema's keys: setting a name outside the schema is
/// refused and nothing can be removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRecord {
    schema: Arc<Schema>,
    values: Vec<Option<FieldValue>>,
}

impl ListingRecord {
    /// Creates a record with every field absent except the identity URL
    pub fn new(schema: Arc<Schema>, url: &str) -> Self {
        let mut values = vec![None; schema.len()];
        values[schema.identity_position()] = Some(FieldValue::Text(url.to_string()));
        Self { schema, values }
    }

    /// Rebuilds a record from CSV cells laid out in schema order
    pub fn from_row<'a, I>(schema: Arc<Schema>, cells: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let cells: Vec<&str> = cells.into_iter().collect();
        if cells.len() != schema.len() {
            return Err(SchemaError::RowWidth {
                expected: schema.len(),
                found: cells.len(),
            });
        }

        let values = schema
            .fields()
            .iter()
            .zip(cells)
            .map(|(field, cell)| FieldValue::from_cell(cell, field.kind))
            .collect();

        Ok(Self { schema, values })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn url(&self) -> &str {
        self.values[self.schema.identity_position()]
            .as_ref()
            .and_then(FieldValue::as_text)
            .unwrap_or_default()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.schema
            .position(field)
            .and_then(|position| self.values[position].as_ref())
    }

    /// Sets a field; returns false (and changes nothing) when the name is
    /// not part of the schema or is the identity field
    pub fn set(&mut self, field: &str, value: FieldValue) -> bool {
        match self.schema.position(field) {
            Some(position) if position != self.schema.identity_position() => {
                self.values[position] = Some(value);
                true
            }
            _ => false,
        }
    }

    /// Field name / value pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&FieldValue>)> {
        self.schema.names().zip(self.values.iter().map(Option::as_ref))
    }

    /// Number of known fields, identity excluded
    pub fn populated_count(&self) -> usize {
        let identity = self.schema.identity_position();
        self.values
            .iter()
            .enumerate()
            .filter(|(position, value)| *position != identity && value.is_some())
            .count()
    }

    /// CSV cells in schema order; absent fields become empty cells
    pub fn to_row(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|value| value.as_ref().map(FieldValue::to_cell).unwrap_or_default())
            .collect()
    }
}
