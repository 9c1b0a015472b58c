//! Result types for query execution
//!
//! A `ResultSet` is a frozen snapshot: it owns copies of the matching
//! records and never looks at the data file again.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::error::{FlintError, Result};
use crate::record::{Record, Value};
use crate::schema::TableSchema;

// =============================================================================
// Result Set
// =============================================================================

/// Ordered records produced by `QueryBuilder::find_all`
#[derive(Debug, Clone)]
pub struct ResultSet {
    schema: Arc<TableSchema>,
    records: Vec<Record>,
}

impl ResultSet {
    pub(crate) fn new(schema: Arc<TableSchema>, records: Vec<Record>) -> Self {
        Self { schema, records }
    }

    /// Name of the table the records came from
    pub fn table(&self) -> &str {
        self.schema.name()
    }

    /// Number of records retained
    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record in result order
    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    /// Iterate records in result order; restartable
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Encode as a pretty-printed JSON array of objects
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    // =========================================================================
    // Projections
    // =========================================================================

    /// Materialize the set as a sequence or a mapping
    ///
    /// | key    | value  | result                                   |
    /// |--------|--------|------------------------------------------|
    /// | `None` | `None` | every record, in order                   |
    /// | `Some` | `None` | key value → record                       |
    /// | `None` | `Some` | the value field of every record, in order|
    /// | `Some` | `Some` | key value → value field                  |
    ///
    /// On duplicate keys the later record wins; the key keeps the position
    /// where it first appeared. Naming a column the table doesn't have is a
    /// `ColumnNotFound` error.
    pub fn as_array(&self, key_field: Option<&str>, value_field: Option<&str>) -> Result<Projection> {
        match (key_field, value_field) {
            (None, None) => Ok(Projection::Records(self.records.clone())),
            (Some(key), None) => Ok(Projection::KeyedRecords(self.key_by(key)?)),
            (None, Some(value)) => Ok(Projection::Values(self.column(value)?)),
            (Some(key), Some(value)) => Ok(Projection::KeyedValues(self.pairs(key, value)?)),
        }
    }

    /// Values of `field`, one per record
    pub fn column(&self, field: &str) -> Result<Vec<Value>> {
        self.require_column(field)?;
        Ok(self
            .records
            .iter()
            .filter_map(|record| record.get(field).cloned())
            .collect())
    }

    /// Records keyed by the value of `key_field`
    pub fn key_by(&self, key_field: &str) -> Result<KeyedMap<Record>> {
        self.require_column(key_field)?;
        let mut map = KeyedMap::new();
        for record in &self.records {
            if let Some(key) = record.get(key_field) {
                map.insert(key.clone(), record.clone());
            }
        }
        Ok(map)
    }

    /// `value_field` keyed by `key_field`
    pub fn pairs(&self, key_field: &str, value_field: &str) -> Result<KeyedMap<Value>> {
        self.require_column(key_field)?;
        self.require_column(value_field)?;
        let mut map = KeyedMap::new();
        for record in &self.records {
            if let (Some(key), Some(value)) = (record.get(key_field), record.get(value_field)) {
                map.insert(key.clone(), value.clone());
            }
        }
        Ok(map)
    }

    fn require_column(&self, field: &str) -> Result<()> {
        if self.schema.has_column(field) {
            Ok(())
        } else {
            Err(FlintError::ColumnNotFound {
                table: self.schema.name().to_string(),
                column: field.to_string(),
            })
        }
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.records.len()))?;
        for record in &self.records {
            seq.serialize_element(record)?;
        }
        seq.end()
    }
}

// =============================================================================
// Projection
// =============================================================================

/// Output of `ResultSet::as_array`
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Records(Vec<Record>),
    Values(Vec<Value>),
    KeyedRecords(KeyedMap<Record>),
    KeyedValues(KeyedMap<Value>),
}

impl Projection {
    /// Number of entries (positions or keys)
    pub fn len(&self) -> usize {
        match self {
            Projection::Records(records) => records.len(),
            Projection::Values(values) => values.len(),
            Projection::KeyedRecords(map) => map.len(),
            Projection::KeyedValues(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this is one of the keyed (mapping) shapes
    pub fn is_keyed(&self) -> bool {
        matches!(self, Projection::KeyedRecords(_) | Projection::KeyedValues(_))
    }

    /// Encode as pretty-printed JSON (array or object by shape)
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Serialize for Projection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Projection::Records(records) => records.serialize(serializer),
            Projection::Values(values) => values.serialize(serializer),
            Projection::KeyedRecords(map) => map.serialize(serializer),
            Projection::KeyedValues(map) => map.serialize(serializer),
        }
    }
}

// =============================================================================
// Keyed Map
// =============================================================================

/// Insertion-ordered map keyed by column values
///
/// Entries keep insertion order; a hash index maps each key to its slot.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedMap<T> {
    entries: Vec<(Value, T)>,
    index: HashMap<IndexKey, usize>,
}

/// Hashable form of a `Value`
///
/// Floats hash by their bits, with `-0.0` folded into `0.0` so the index
/// agrees with `Value` equality. NaN never reaches a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum IndexKey {
    Integer(i64),
    String(String),
    Boolean(bool),
    Float(u64),
}

impl From<&Value> for IndexKey {
    fn from(value: &Value) -> Self {
        match value {
            Value::Integer(i) => IndexKey::Integer(*i),
            Value::String(s) => IndexKey::String(s.clone()),
            Value::Boolean(b) => IndexKey::Boolean(*b),
            Value::Float(f) if *f == 0.0 => IndexKey::Float(0.0f64.to_bits()),
            Value::Float(f) => IndexKey::Float(f.to_bits()),
        }
    }
}

impl<T> KeyedMap<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert or overwrite; an existing key keeps its position
    ///
    /// Returns the value that was replaced, if any.
    pub fn insert(&mut self, key: Value, value: T) -> Option<T> {
        match self.index.entry(IndexKey::from(&key)) {
            Entry::Occupied(slot) => {
                let position = *slot.get();
                Some(std::mem::replace(&mut self.entries[position].1, value))
            }
            Entry::Vacant(slot) => {
                slot.insert(self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &Value) -> Option<&T> {
        self.index
            .get(&IndexKey::from(key))
            .map(|position| &self.entries[*position].1)
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &T)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for KeyedMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialized as a JSON object; keys are rendered with `Display`
impl<T: Serialize> Serialize for KeyedMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(&key.to_string(), value)?;
        }
        map.end()
    }
}
