//! Record Store
//!
//! Reads and writes `<table>.data.<ext>`.
//!
//! ## Responsibilities
//! - Create the empty data file for a new table
//! - Decode every line on scan, failing the whole scan on the first bad one
//! - Append new records; rewrite the file for update/delete
//! - Keep ids strictly increasing and untouched records in place

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{FlintError, Result};
use crate::fs::FileSystem;
use crate::record::{Record, Value};
use crate::schema::TableSchema;

/// Persists table records through a `FileSystem`
///
/// Every operation reads or writes the whole file; there is no cache, so a
/// scan always reflects the bytes on disk at the time of the call.
#[derive(Clone)]
pub struct RecordStore {
    fs: Arc<dyn FileSystem>,
    config: Arc<Config>,
}

impl RecordStore {
    pub fn new(fs: Arc<dyn FileSystem>, config: Arc<Config>) -> Self {
        Self { fs, config }
    }

    /// Create an empty data file for `name`
    ///
    /// A leftover data file without a schema is overwritten.
    pub fn initialize(&self, name: &str) -> Result<()> {
        let path = self.config.data_file(name);
        if self.fs.exists(&path)? {
            warn!(table = name, path = %path, "overwriting orphaned data file");
        }
        self.fs.write_all(&path, b"")
    }

    /// Whether the data file for `name` exists
    pub fn exists(&self, name: &str) -> Result<bool> {
        self.fs.exists(&self.config.data_file(name))
    }

    /// Read every record in insertion order
    ///
    /// Fails with `TableNotFound` when the data file is missing and with
    /// `CorruptRecord` on the first line that does not decode, or whose id
    /// is not greater than the one before it.
    pub fn scan_all(&self, schema: &TableSchema) -> Result<Vec<Record>> {
        let name = schema.name();
        let contents = self.read_data(name)?;

        let text = std::str::from_utf8(&contents).map_err(|e| FlintError::CorruptRecord {
            table: name.to_string(),
            line: 0,
            reason: format!("data file is not UTF-8: {}", e),
        })?;

        let mut records: Vec<Record> = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            let corrupt = |reason: String| FlintError::CorruptRecord {
                table: name.to_string(),
                line: index + 1,
                reason,
            };

            let record = Record::decode(line, schema).map_err(corrupt)?;
            if let Some(previous) = records.last() {
                if record.id() <= previous.id() {
                    return Err(corrupt(format!(
                        "id {} does not follow id {}",
                        record.id(),
                        previous.id()
                    )));
                }
            }
            records.push(record);
        }

        debug!(table = name, records = records.len(), "scanned data file");
        Ok(records)
    }

    /// Append one record to the end of the data file
    ///
    /// Refuses a record whose id does not follow the last stored id.
    pub fn append(&self, name: &str, record: &Record) -> Result<()> {
        let existing = self.read_data(name)?;

        if let Some(last) = last_stored_id(&existing) {
            if record.id() <= last {
                return Err(FlintError::InvalidRecord(format!(
                    "id {} does not follow stored id {}",
                    record.id(),
                    last
                )));
            }
        }

        let line = record.encode()?;
        let mut contents = Vec::with_capacity(existing.len() + line.len() + 1);
        contents.extend_from_slice(&existing);
        if !contents.is_empty() && !contents.ends_with(b"\n") {
            contents.push(b'\n');
        }
        contents.extend_from_slice(line.as_bytes());
        contents.push(b'\n');

        self.fs.write_all(&self.config.data_file(name), &contents)?;
        debug!(table = name, id = record.id(), "appended record");
        Ok(())
    }

    /// Replace the data file with `records`, in the given order
    pub fn rewrite(&self, name: &str, records: &[Record]) -> Result<()> {
        let mut contents = String::new();
        for record in records {
            contents.push_str(&record.encode()?);
            contents.push('\n');
        }
        self.fs.write_all(&self.config.data_file(name), contents.as_bytes())
    }

    /// Apply `changes` to the record with `id` and persist the table
    pub fn update(
        &self,
        schema: &TableSchema,
        id: u64,
        changes: Vec<(String, Value)>,
    ) -> Result<Record> {
        let mut records = self.scan_all(schema)?;
        let target = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| FlintError::RecordNotFound {
                table: schema.name().to_string(),
                id,
            })?;

        target.apply(schema, changes)?;
        let updated = target.clone();

        self.rewrite(schema.name(), &records)?;
        debug!(table = schema.name(), id, "updated record");
        Ok(updated)
    }

    /// Remove the record with `id` and persist the table
    pub fn delete(&self, schema: &TableSchema, id: u64) -> Result<Record> {
        let mut records = self.scan_all(schema)?;
        let position = records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| FlintError::RecordNotFound {
                table: schema.name().to_string(),
                id,
            })?;

        let removed = records.remove(position);
        self.rewrite(schema.name(), &records)?;
        debug!(table = schema.name(), id, "deleted record");
        Ok(removed)
    }

    /// Delete the data file
    ///
    /// Fails with `TableNotFound` if it is absent.
    pub fn remove(&self, name: &str) -> Result<()> {
        if !self.exists(name)? {
            return Err(FlintError::TableNotFound(name.to_string()));
        }
        self.fs.delete(&self.config.data_file(name))?;

        debug!(table = name, "data file removed");
        Ok(())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn read_data(&self, name: &str) -> Result<bytes::Bytes> {
        if !self.exists(name)? {
            return Err(FlintError::TableNotFound(name.to_string()));
        }
        self.fs.read_all(&self.config.data_file(name))
    }
}

#[derive(Deserialize)]
struct StoredId {
    id: u64,
}

/// Id of the last non-blank line, if it has one
fn last_stored_id(contents: &[u8]) -> Option<u64> {
    let text = std::str::from_utf8(contents).ok()?;
    let line = text.lines().rev().find(|line| !line.trim().is_empty())?;
    serde_json::from_str::<StoredId>(line).ok().map(|stored| stored.id)
}
