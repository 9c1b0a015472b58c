//! Database Module
//!
//! The store entry point: binds a filesystem and a config, and hands out
//! table handles.
//!
//! ## Responsibilities
//! - Create and remove tables (schema + data file as one operation)
//! - Resolve table names to `TableHandle`s
//!
//! ## Concurrency Model
//! Synchronous and single-actor. Every call runs to completion; nothing is
//! locked across calls, and concurrent writers from other processes are not
//! coordinated.

use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::fs::{FileSystem, LocalFs, MemoryFs};
use crate::schema::{Column, ColumnType, SchemaStore};
use crate::storage::RecordStore;
use crate::table::TableHandle;

/// A directory (or in-memory map) of tables
pub struct Database {
    config: Arc<Config>,
    schemas: SchemaStore,
    records: RecordStore,
}

impl Database {
    /// Open or create a store rooted at `config.data_dir`
    pub fn open(config: Config) -> Result<Self> {
        let fs = LocalFs::open(&config.data_dir)?;
        Ok(Self::with_fs(config, Arc::new(fs)))
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// A store that lives only in memory
    pub fn in_memory() -> Self {
        Self::with_fs(Config::default(), Arc::new(MemoryFs::new()))
    }

    /// Bind to any `FileSystem` implementation
    pub fn with_fs(config: Config, fs: Arc<dyn FileSystem>) -> Self {
        let config = Arc::new(config);
        Self {
            schemas: SchemaStore::new(Arc::clone(&fs), Arc::clone(&config)),
            records: RecordStore::new(fs, Arc::clone(&config)),
            config,
        }
    }

    /// Create a table with the given columns, in order
    ///
    /// `id` is added automatically and must not be declared.
    pub fn create<I, N>(&self, name: &str, columns: I) -> Result<TableHandle>
    where
        I: IntoIterator<Item = (N, ColumnType)>,
        N: Into<String>,
    {
        let columns = columns
            .into_iter()
            .map(|(column, ty)| Column::new(column, ty))
            .collect();
        TableHandle::create(self.schemas.clone(), self.records.clone(), name, columns)
    }

    /// Remove a table and both of its files
    pub fn remove(&self, name: &str) -> Result<()> {
        self.table(name)?.remove()
    }

    /// Bind to an existing table
    pub fn table(&self, name: &str) -> Result<TableHandle> {
        TableHandle::open(self.schemas.clone(), self.records.clone(), name)
    }

    /// Whether a table named `name` exists
    pub fn exists(&self, name: &str) -> Result<bool> {
        self.schemas.exists(name)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
