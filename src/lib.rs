//! # FlintDB
//!
//! An embedded, file-backed table store with:
//! - One schema descriptor and one JSON-lines data file per table
//! - Typed columns (integer, string, boolean, float) checked on every read
//! - A fluent query builder: filter, multi-key sort, offset, limit
//! - Snapshot result sets with array/map projections
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Database                              │
//! │              create / remove / table(name)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      TableHandle                             │
//! │     insert / update / delete      filter / order_by / limit  │
//! └──────────┬───────────────────────────────────┬──────────────┘
//!            │                                   │
//!            ▼                                   ▼
//!   ┌─────────────────┐                 ┌─────────────────┐
//!   │   SchemaStore   │                 │  QueryBuilder   │──▶ ResultSet
//!   │ (.config.json)  │                 └────────┬────────┘
//!   └────────┬────────┘                          │
//!            │          ┌─────────────────┐      │
//!            │          │   RecordStore   │◀─────┘
//!            │          │  (.data.json)   │
//!            │          └────────┬────────┘
//!            ▼                   ▼
//!   ┌─────────────────────────────────────────┐
//!   │     FileSystem (LocalFs / MemoryFs)      │
//!   └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use flintdb::{ColumnType, Database, Direction, Operator, Value};
//!
//! # fn main() -> flintdb::Result<()> {
//! let db = Database::open_path(std::path::Path::new("./data"))?;
//! let users = db.create("users", [("name", ColumnType::String), ("age", ColumnType::Integer)])?;
//! users.insert([("name", Value::from("Kriss")), ("age", Value::from(31))])?;
//!
//! let adults = users
//!     .filter("age", Operator::Ge, 18)
//!     .order_by("name", Direction::Asc)
//!     .limit(10)
//!     .find_all()?;
//! println!("{} adults", adults.count());
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod fs;
pub mod schema;
pub mod record;
pub mod storage;
pub mod query;
pub mod table;
pub mod database;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FlintError, Result};
pub use config::Config;
pub use database::Database;
pub use query::{Direction, Operator, Projection, QueryBuilder, ResultSet};
pub use record::{Record, Value};
pub use schema::{Column, ColumnType, TableSchema};
pub use table::TableHandle;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of FlintDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
