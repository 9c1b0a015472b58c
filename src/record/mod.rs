//! Record Module
//!
//! A stored row: the auto-increment id plus one typed value per declared
//! column, in schema order.
//!
//! ## Line Format
//! ```text
//! {"id":1,"name":"Kamil","active":true}
//! {"id":2,"name":"Kriss","active":false}
//! ```
//! `id` first, then declared columns. Every declared column is present and
//! no other keys are allowed.

mod value;

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{FlintError, Result};
use crate::schema::{TableSchema, ID_COLUMN};

pub use value::Value;

/// One row of a table, detached from storage
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: u64,
    /// (column, value) in schema order, starting with `id`
    values: Vec<(String, Value)>,
}

impl Record {
    /// Get the auto-increment id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Value of `column`, including `id`
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Iterate (column, value) pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of columns, `id` included
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    // =========================================================================
    // Construction from user input
    // =========================================================================

    /// Validate an insert against `schema` and attach `id`
    ///
    /// Every declared column must be supplied exactly once; `id` must not be.
    pub(crate) fn from_input(
        schema: &TableSchema,
        id: u64,
        input: Vec<(String, Value)>,
    ) -> Result<Self> {
        let mut slots: Vec<Option<Value>> = vec![None; schema.columns().len()];

        for (column, value) in input {
            let position = Self::writable_position(schema, &column)?;
            if slots[position].is_some() {
                return Err(FlintError::InvalidRecord(format!(
                    "column \"{}\" supplied more than once",
                    column
                )));
            }
            let ty = schema.columns()[position].column_type;
            slots[position] = Some(value.coerce_to(&column, ty)?);
        }

        let stored_id = i64::try_from(id)
            .map_err(|_| FlintError::InvalidRecord(format!("id {} is out of range", id)))?;

        let mut values = Vec::with_capacity(slots.len());
        values.push((ID_COLUMN.to_string(), Value::Integer(stored_id)));

        for (column, slot) in schema.columns().iter().zip(slots).skip(1) {
            match slot {
                Some(value) => values.push((column.name.clone(), value)),
                None => {
                    return Err(FlintError::InvalidRecord(format!(
                        "missing value for column \"{}\"",
                        column.name
                    )))
                }
            }
        }

        Ok(Self { id, values })
    }

    /// Apply a partial update; `id` cannot change
    pub(crate) fn apply(&mut self, schema: &TableSchema, changes: Vec<(String, Value)>) -> Result<()> {
        for (column, value) in changes {
            let position = Self::writable_position(schema, &column)?;
            let ty = schema.columns()[position].column_type;
            self.values[position].1 = value.coerce_to(&column, ty)?;
        }
        Ok(())
    }

    fn writable_position(schema: &TableSchema, column: &str) -> Result<usize> {
        if column == ID_COLUMN {
            return Err(FlintError::InvalidRecord(
                "\"id\" is assigned by the store and cannot be written".into(),
            ));
        }
        schema
            .position(column)
            .ok_or_else(|| FlintError::ColumnNotFound {
                table: schema.name().to_string(),
                column: column.to_string(),
            })
    }

    // =========================================================================
    // Line Encoding
    // =========================================================================

    /// Encode as a single JSON line (no trailing newline)
    pub(crate) fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode one stored line against `schema`
    ///
    /// The error string describes why the line is unusable; the caller
    /// attaches table and line number.
    pub(crate) fn decode(line: &str, schema: &TableSchema) -> std::result::Result<Self, String> {
        let StoredLine(fields) =
            serde_json::from_str(line).map_err(|e| format!("malformed line: {}", e))?;

        if let Some((extra, _)) = fields.iter().find(|(key, _)| !schema.has_column(key)) {
            return Err(format!("undeclared column \"{}\"", extra));
        }

        let mut values = Vec::with_capacity(schema.columns().len());
        for column in schema.columns() {
            let raw = fields
                .iter()
                .find(|(key, _)| *key == column.name)
                .map(|(_, raw)| raw)
                .ok_or_else(|| format!("missing column \"{}\"", column.name))?;
            let value = Value::from_json(raw, column.column_type).ok_or_else(|| {
                format!(
                    "column \"{}\" expected {}, found {}",
                    column.name, column.column_type, raw
                )
            })?;
            values.push((column.name.clone(), value));
        }

        let id = match values.first() {
            Some((_, Value::Integer(id))) if *id > 0 => *id as u64,
            _ => return Err("id must be a positive integer".to_string()),
        };

        Ok(Self { id, values })
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in &self.values {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

// =============================================================================
// Line Decoding
// =============================================================================

/// Fields of one stored line, in file order; duplicate keys are rejected
struct StoredLine(Vec<(String, serde_json::Value)>);

impl<'de> Deserialize<'de> for StoredLine {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct StoredLineVisitor;

        impl<'de> Visitor<'de> for StoredLineVisitor {
            type Value = StoredLine;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<StoredLine, A::Error> {
                let mut fields: Vec<(String, serde_json::Value)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(key) = access.next_key::<String>()? {
                    if fields.iter().any(|(seen, _)| *seen == key) {
                        return Err(de::Error::custom(format!("duplicate key \"{}\"", key)));
                    }
                    let value = access.next_value()?;
                    fields.push((key, value));
                }
                Ok(StoredLine(fields))
            }
        }

        deserializer.deserialize_map(StoredLineVisitor)
    }
}
