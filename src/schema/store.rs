//! Schema Store
//!
//! Reads and writes `<table>.config.<ext>`.
//!
//! ## Responsibilities
//! - Table existence (the config file is authoritative)
//! - Create/load/remove schema descriptors
//! - Hand out auto-increment ids from the persisted `last_id` counter

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{FlintError, Result};
use crate::fs::FileSystem;

use super::{validate_table_name, Column, ColumnMap, TableConfig, TableSchema, MAX_ID};

/// Persists table schemas through a `FileSystem`
#[derive(Clone)]
pub struct SchemaStore {
    fs: Arc<dyn FileSystem>,
    config: Arc<Config>,
}

impl SchemaStore {
    pub fn new(fs: Arc<dyn FileSystem>, config: Arc<Config>) -> Self {
        Self { fs, config }
    }

    /// Write a new schema descriptor
    ///
    /// Fails with `DuplicateTable` if a config file for `name` already exists.
    pub fn create(&self, name: &str, columns: Vec<Column>) -> Result<TableSchema> {
        let schema = TableSchema::new(name, columns)?;

        if self.exists(name)? {
            return Err(FlintError::DuplicateTable(name.to_string()));
        }

        let descriptor = TableConfig {
            last_id: 0,
            schema: ColumnMap::from(&schema),
        };
        self.write_config(name, &descriptor)?;

        debug!(table = name, columns = schema.columns().len(), "schema written");
        Ok(schema)
    }

    /// Whether a schema descriptor exists for `name`
    pub fn exists(&self, name: &str) -> Result<bool> {
        validate_table_name(name)?;
        self.fs.exists(&self.config.config_file(name))
    }

    /// Load the column declarations of `name`
    pub fn load(&self, name: &str) -> Result<TableSchema> {
        let descriptor = self.read_config(name)?;
        TableSchema::from_persisted(name, descriptor.schema)
    }

    /// Highest id handed out so far for `name` (0 if none)
    pub fn last_id(&self, name: &str) -> Result<u64> {
        Ok(self.read_config(name)?.last_id)
    }

    /// Reserve the next id for `name` and persist the counter
    ///
    /// Ids are never reused: the counter is written before the record, so a
    /// failed append burns the id rather than handing it out twice.
    pub fn next_id(&self, name: &str) -> Result<u64> {
        self.next_id_after(name, 0)
    }

    /// Reserve an id greater than both the counter and `floor`
    ///
    /// `floor` is the highest id present in the data file; a counter that
    /// fell behind it (hand edit, restored config) is moved past it.
    pub fn next_id_after(&self, name: &str, floor: u64) -> Result<u64> {
        let mut descriptor = self.read_config(name)?;
        let next = descriptor
            .last_id
            .max(floor)
            .checked_add(1)
            .filter(|id| *id <= MAX_ID)
            .ok_or_else(|| {
                FlintError::Serialization(format!(
                    "id counter of table \"{}\" is exhausted",
                    name
                ))
            })?;

        if descriptor.last_id < floor {
            warn!(
                table = name,
                counter = descriptor.last_id,
                stored = floor,
                "id counter behind data file"
            );
        }
        descriptor.last_id = next;
        self.write_config(name, &descriptor)?;
        Ok(next)
    }

    /// Delete the schema descriptor
    ///
    /// Fails with `TableNotFound` if it is absent.
    pub fn remove(&self, name: &str) -> Result<()> {
        if !self.exists(name)? {
            return Err(FlintError::TableNotFound(name.to_string()));
        }
        self.fs.delete(&self.config.config_file(name))?;

        debug!(table = name, "schema removed");
        Ok(())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn read_config(&self, name: &str) -> Result<TableConfig> {
        if !self.exists(name)? {
            return Err(FlintError::TableNotFound(name.to_string()));
        }

        let bytes = self.fs.read_all(&self.config.config_file(name))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            FlintError::Serialization(format!("config of table \"{}\": {}", name, e))
        })
    }

    fn write_config(&self, name: &str, descriptor: &TableConfig) -> Result<()> {
        let encoded = if self.config.pretty_schema {
            serde_json::to_vec_pretty(descriptor)?
        } else {
            serde_json::to_vec(descriptor)?
        };
        self.fs.write_all(&self.config.config_file(name), &encoded)
    }
}
