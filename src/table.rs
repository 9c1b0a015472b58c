//! Table Handle
//!
//! The façade bound to one table name. Query entry points start a
//! `QueryBuilder`; mutations go straight to the stores.
//!
//! A handle does not cache the schema: every call reloads it, so a handle
//! to a removed table fails with `TableNotFound` instead of reading stale
//! state.

use tracing::{debug, info};

use crate::error::{FlintError, Result};
use crate::query::{Direction, Operator, QueryBuilder, ResultSet};
use crate::record::{Record, Value};
use crate::schema::{Column, SchemaStore, TableSchema};
use crate::storage::RecordStore;

/// A table bound by name
#[derive(Clone)]
pub struct TableHandle {
    name: String,
    schemas: SchemaStore,
    records: RecordStore,
}

impl TableHandle {
    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Write the schema, then an empty data file
    ///
    /// If the data file cannot be written the schema is removed again so
    /// no half-created table is left behind. When that removal fails too
    /// the result is `InconsistentTable`.
    pub(crate) fn create(
        schemas: SchemaStore,
        records: RecordStore,
        name: &str,
        columns: Vec<Column>,
    ) -> Result<Self> {
        let schema = schemas.create(name, columns)?;

        if let Err(e) = records.initialize(name) {
            if let Err(rollback) = schemas.remove(name) {
                return Err(FlintError::InconsistentTable {
                    table: name.to_string(),
                    detail: format!(
                        "data file could not be written ({}) and schema could not be removed ({})",
                        e, rollback
                    ),
                });
            }
            return Err(e);
        }

        info!(table = name, columns = schema.declared_columns().len(), "table created");
        Ok(Self {
            name: name.to_string(),
            schemas,
            records,
        })
    }

    /// Bind to an existing table
    ///
    /// Existence is decided by the schema file alone.
    pub(crate) fn open(schemas: SchemaStore, records: RecordStore, name: &str) -> Result<Self> {
        if !schemas.exists(name)? {
            return Err(FlintError::TableNotFound(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            schemas,
            records,
        })
    }

    /// Delete both files of the table
    ///
    /// The schema goes first, so `table()` stops finding the table even if
    /// the data file then fails to delete. Outcomes:
    /// - schema missing: `TableNotFound`, nothing deleted
    /// - schema present, data missing: schema deleted, `TableNotFound`
    /// - data delete fails after the schema is gone: `InconsistentTable`
    pub fn remove(self) -> Result<()> {
        let name = self.name;
        self.schemas.remove(&name)?;

        match self.records.remove(&name) {
            Ok(()) => {
                info!(table = %name, "table removed");
                Ok(())
            }
            Err(FlintError::TableNotFound(_)) => {
                info!(table = %name, "table removed; data file was already missing");
                Err(FlintError::TableNotFound(name))
            }
            Err(e) => Err(FlintError::InconsistentTable {
                detail: format!("schema removed but data file could not be deleted: {}", e),
                table: name,
            }),
        }
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    /// Get the table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Load the current schema
    pub fn schema(&self) -> Result<TableSchema> {
        self.schemas.load(&self.name)
    }

    /// Highest id ever assigned in this table (0 if none)
    pub fn last_id(&self) -> Result<u64> {
        self.schemas.last_id(&self.name)
    }

    pub(crate) fn records(&self) -> &RecordStore {
        &self.records
    }

    // =========================================================================
    // Query Entry Points
    // =========================================================================

    /// Start an empty query
    pub fn query(&self) -> QueryBuilder {
        QueryBuilder::new(self.clone())
    }

    /// Start a query with one condition
    pub fn filter(&self, column: impl Into<String>, operator: Operator, value: impl Into<Value>) -> QueryBuilder {
        self.query().filter(column, operator, value)
    }

    /// Start a query with one sort key
    pub fn order_by(&self, column: impl Into<String>, direction: Direction) -> QueryBuilder {
        self.query().order_by(column, direction)
    }

    /// Start a query with an ascending sort key
    pub fn order_by_asc(&self, column: impl Into<String>) -> QueryBuilder {
        self.query().order_by_asc(column)
    }

    /// Start a query with a limit
    pub fn limit(&self, n: usize) -> QueryBuilder {
        self.query().limit(n)
    }

    /// Start a query with an offset
    pub fn offset(&self, n: usize) -> QueryBuilder {
        self.query().offset(n)
    }

    /// Every record, in insertion order
    pub fn find_all(&self) -> Result<ResultSet> {
        self.query().find_all()
    }

    /// Number of records in the table
    pub fn count(&self) -> Result<usize> {
        self.query().count()
    }

    /// Record with the given id, if present
    pub fn find(&self, id: u64) -> Result<Option<Record>> {
        let schema = self.schema()?;
        Ok(self
            .records
            .scan_all(&schema)?
            .into_iter()
            .find(|record| record.id() == id))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Insert a record; every declared column must be supplied
    ///
    /// The id is reserved from the persisted counter before the record is
    /// appended, so ids are never reused. The counter is never trusted
    /// below the highest id already in the data file.
    pub fn insert<I, K>(&self, values: I) -> Result<Record>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let schema = self.schema()?;
        let input: Vec<(String, Value)> = values.into_iter().map(|(k, v)| (k.into(), v)).collect();

        // Validate before reserving, so a rejected insert doesn't burn an id.
        Record::from_input(&schema, 1, input.clone())?;

        let stored_max = self
            .records
            .scan_all(&schema)?
            .last()
            .map(|record| record.id())
            .unwrap_or(0);
        let id = self.schemas.next_id_after(&self.name, stored_max)?;
        let record = Record::from_input(&schema, id, input)?;
        self.records.append(&self.name, &record)?;

        debug!(table = %self.name, id, "inserted record");
        Ok(record)
    }

    /// Change some columns of the record with `id`
    pub fn update<I, K>(&self, id: u64, changes: I) -> Result<Record>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let schema = self.schema()?;
        let changes = changes.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.records.update(&schema, id, changes)
    }

    /// Delete the record with `id`, returning it
    pub fn delete(&self, id: u64) -> Result<Record> {
        let schema = self.schema()?;
        self.records.delete(&schema, id)
    }
}

impl std::fmt::Debug for TableHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableHandle").field("name", &self.name).finish()
    }
}
