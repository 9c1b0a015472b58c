//! Schema Module
//!
//! Column declarations for a table and the store that persists them.
//!
//! ## Responsibilities
//! - Declared column types (integer, string, boolean, float)
//! - Create-time validation of table names and column lists
//! - Persisting the schema descriptor together with the id counter
//!
//! ## Config File Format
//! ```text
//! {
//!   "last_id": 4,
//!   "schema": {
//!     "id": "integer",        <- implicit, always first
//!     "name": "string",
//!     "active": "boolean"     <- declaration order preserved
//!   }
//! }
//! ```

mod store;

use std::fmt;
use std::str::FromStr;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{FlintError, Result};

pub use store::SchemaStore;

/// Name of the implicit auto-increment column
pub const ID_COLUMN: &str = "id";

/// Largest id the store hands out; ids are stored as JSON integers (i64)
pub const MAX_ID: u64 = i64::MAX as u64;

// =============================================================================
// Column Types
// =============================================================================

/// Declared type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    String,
    Boolean,
    Float,
}

impl ColumnType {
    /// Returns the type name as written in the config file
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::String => "string",
            ColumnType::Boolean => "boolean",
            ColumnType::Float => "float",
        }
    }

    /// Integer and float columns compare numerically
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for ColumnType {
    type Err = FlintError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "integer" | "int" => Ok(ColumnType::Integer),
            "string" | "str" => Ok(ColumnType::String),
            "boolean" | "bool" => Ok(ColumnType::Boolean),
            "float" | "double" => Ok(ColumnType::Float),
            other => Err(FlintError::Parse(format!("unknown column type \"{}\"", other))),
        }
    }
}

// =============================================================================
// Table Schema
// =============================================================================

/// A single column declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Immutable column layout of one table
///
/// The implicit `id` column is always present and always first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    name: String,
    columns: Vec<Column>,
}

impl TableSchema {
    /// Build a schema from user-declared columns
    ///
    /// Rejects an empty column list, empty or duplicate names, and any
    /// attempt to declare `id` (it is added automatically).
    pub fn new(name: impl Into<String>, declared: Vec<Column>) -> Result<Self> {
        let name = name.into();
        validate_table_name(&name)?;

        if declared.is_empty() {
            return Err(FlintError::InvalidSchema(format!(
                "table \"{}\" must declare at least one column",
                name
            )));
        }

        let mut columns = Vec::with_capacity(declared.len() + 1);
        columns.push(Column::new(ID_COLUMN, ColumnType::Integer));

        for column in declared {
            if column.name.is_empty() {
                return Err(FlintError::InvalidSchema("column names must not be empty".into()));
            }
            if column.name == ID_COLUMN {
                return Err(FlintError::InvalidSchema(
                    "column \"id\" is reserved for the auto-increment key".into(),
                ));
            }
            if columns.iter().any(|c| c.name == column.name) {
                return Err(FlintError::InvalidSchema(format!(
                    "duplicate column \"{}\"",
                    column.name
                )));
            }
            columns.push(column);
        }

        Ok(Self { name, columns })
    }

    /// Rebuild from a persisted column map (which already carries `id`)
    fn from_persisted(name: &str, map: ColumnMap) -> Result<Self> {
        let mut columns = map.0.into_iter();
        match columns.next() {
            Some(first) if first.name == ID_COLUMN && first.column_type == ColumnType::Integer => {}
            _ => {
                return Err(FlintError::Serialization(format!(
                    "schema of table \"{}\" must start with \"id\": \"integer\"",
                    name
                )))
            }
        }
        Self::new(name, columns.collect())
    }

    /// Get the table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All columns including `id`, in declaration order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// User-declared columns (everything except `id`)
    pub fn declared_columns(&self) -> &[Column] {
        &self.columns[1..]
    }

    /// Declared type of `column`, if the table has it
    pub fn column_type(&self, column: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| c.column_type)
    }

    /// Whether the table has a column named `column`
    pub fn has_column(&self, column: &str) -> bool {
        self.column_type(column).is_some()
    }

    /// Position of `column` in declaration order
    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == column)
    }
}

/// Table names double as file name prefixes: `[A-Za-z0-9_-]+`
pub fn validate_table_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(FlintError::InvalidTableName(name.to_string()))
    }
}

// =============================================================================
// Persisted Form
// =============================================================================

/// Contents of `<table>.config.<ext>`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TableConfig {
    /// Highest id ever handed out (0 = none yet)
    pub last_id: u64,
    pub schema: ColumnMap,
}

/// Columns serialized as a JSON object whose key order is the column order
#[derive(Debug, Clone)]
pub(crate) struct ColumnMap(pub Vec<Column>);

impl From<&TableSchema> for ColumnMap {
    fn from(schema: &TableSchema) -> Self {
        ColumnMap(schema.columns.clone())
    }
}

impl Serialize for ColumnMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for column in &self.0 {
            map.serialize_entry(&column.name, &column.column_type)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ColumnMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ColumnMapVisitor;

        impl<'de> Visitor<'de> for ColumnMapVisitor {
            type Value = ColumnMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of column name to column type")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<ColumnMap, A::Error> {
                let mut columns = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, column_type)) = access.next_entry::<String, ColumnType>()? {
                    columns.push(Column { name, column_type });
                }
                Ok(ColumnMap(columns))
            }
        }

        deserializer.deserialize_map(ColumnMapVisitor)
    }
}
