//! Storage Module
//!
//! Persistent record storage: one JSON-lines data file per table.
//!
//! ## Responsibilities
//! - Initialize and remove data files
//! - Full-table scans in insertion order (no indexes)
//! - Line-level append and full-file rewrite for mutations
//!
//! ## File Format
//! ```text
//! ┌────────────────────────────────────────┐
//! │ {"id":1, ...declared columns...}\n     │
//! │ {"id":2, ...}\n                        │
//! │ ... one line per record, ids strictly  │
//! │     increasing top to bottom           │
//! └────────────────────────────────────────┘
//! ```

mod manager;

pub use manager::RecordStore;
