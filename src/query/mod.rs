//! Query Module
//!
//! Fluent query building and the filter → sort → limit pipeline.
//!
//! ## Flow
//! ```text
//!   TableHandle ──filter/order_by/limit──▶ QueryBuilder ──find_all──▶ ResultSet
//!                                               │                         │
//!                                               ▼                         ▼
//!                                      RecordStore::scan_all        count / iter /
//!                                      → filter → sort → limit      as_array
//! ```
//!
//! Every query is a full-table scan; there are no indexes.

mod builder;
mod filter;
mod result;
mod sort;

pub use builder::QueryBuilder;
pub use filter::{FilterCondition, Operator, PredicateFilter};
pub use result::{KeyedMap, Projection, ResultSet};
pub use sort::{Direction, ResultSorter, SortKey};
