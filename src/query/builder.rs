//! Query Builder
//!
//! Accumulates filters, sort keys, offset and limit for one table. Every
//! chain call consumes the builder and returns the updated one; running it
//! borrows, so a builder can be executed, extended and executed again.

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::record::{Record, Value};
use crate::table::TableHandle;

use super::filter::{FilterCondition, Operator, PredicateFilter};
use super::result::ResultSet;
use super::sort::{Direction, ResultSorter, SortKey};

/// A not-yet-executed query bound to one table
#[derive(Clone)]
pub struct QueryBuilder {
    table: TableHandle,
    conditions: Vec<FilterCondition>,
    sort_keys: Vec<SortKey>,
    offset: usize,
    limit: Option<usize>,
}

impl QueryBuilder {
    pub(crate) fn new(table: TableHandle) -> Self {
        Self {
            table,
            conditions: Vec::new(),
            sort_keys: Vec::new(),
            offset: 0,
            limit: None,
        }
    }

    /// Add a condition; all conditions must hold (AND)
    ///
    /// The column and literal type are not checked here. A column the
    /// table doesn't have makes the query match nothing; a literal of the
    /// wrong type fails `find_all` with `TypeMismatch`.
    pub fn filter(mut self, column: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        self.conditions.push(FilterCondition::new(column, operator, value));
        self
    }

    /// Add a sort key; the first key added is the primary one
    pub fn order_by(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.sort_keys.push(SortKey::new(column, direction));
        self
    }

    /// Add an ascending sort key
    pub fn order_by_asc(self, column: impl Into<String>) -> Self {
        self.order_by(column, Direction::Asc)
    }

    /// Cap the number of returned records (applied after filter and sort)
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Skip `n` records after sorting, before the limit
    pub fn offset(mut self, n: usize) -> Self {
        self.offset = n;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the bound table name
    pub fn table_name(&self) -> &str {
        self.table.name()
    }

    pub fn conditions(&self) -> &[FilterCondition] {
        &self.conditions
    }

    pub fn sort_keys(&self) -> &[SortKey] {
        &self.sort_keys
    }

    pub fn limit_value(&self) -> Option<usize> {
        self.limit
    }

    pub fn offset_value(&self) -> usize {
        self.offset
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Run the query
    ///
    /// Pipeline:
    /// 1. Load the schema (fails if the table was removed)
    /// 2. Type-check every condition
    /// 3. Full scan of the data file
    /// 4. Filter (AND)
    /// 5. Stable multi-key sort
    /// 6. Offset, then limit
    pub fn find_all(&self) -> Result<ResultSet> {
        let schema = self.table.schema()?;
        PredicateFilter::check_all(&schema, &self.conditions)?;

        let scanned = self.table.records().scan_all(&schema)?;
        let scanned_count = scanned.len();

        let mut retained: Vec<Record> = scanned
            .into_iter()
            .filter(|record| PredicateFilter::matches(record, &self.conditions))
            .collect();
        let matched_count = retained.len();

        ResultSorter::sort(&mut retained, &self.sort_keys);

        let retained: Vec<Record> = retained
            .into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .collect();

        debug!(
            table = self.table.name(),
            scanned = scanned_count,
            matched = matched_count,
            returned = retained.len(),
            "query executed"
        );

        Ok(ResultSet::new(Arc::new(schema), retained))
    }

    /// Number of records `find_all` would return
    pub fn count(&self) -> Result<usize> {
        Ok(self.find_all()?.count())
    }

    /// First record `find_all` would return
    pub fn first(&self) -> Result<Option<Record>> {
        Ok(self.clone().limit(1).find_all()?.into_records().into_iter().next())
    }
}
