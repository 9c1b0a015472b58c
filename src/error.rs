//! Error types for FlintDB
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using FlintError
pub type Result<T> = std::result::Result<T, FlintError>;

/// Unified error type for FlintDB operations
#[derive(Debug, Error)]
pub enum FlintError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Table Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Table \"{0}\" already exists")]
    DuplicateTable(String),

    #[error("Table \"{0}\" does not exist")]
    TableNotFound(String),

    #[error("Table \"{table}\" is inconsistent: {detail}")]
    InconsistentTable { table: String, detail: String },

    #[error("Invalid table name \"{0}\": only letters, digits, '_' and '-' are allowed")]
    InvalidTableName(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt record in table \"{table}\" at line {line}: {reason}")]
    CorruptRecord {
        table: String,
        line: usize,
        reason: String,
    },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Record {id} not found in table \"{table}\"")]
    RecordNotFound { table: String, id: u64 },

    // -------------------------------------------------------------------------
    // Query Errors
    // -------------------------------------------------------------------------
    #[error("Type mismatch on column \"{column}\": {detail}")]
    TypeMismatch { column: String, detail: String },

    #[error("Column \"{column}\" does not exist in table \"{table}\"")]
    ColumnNotFound { table: String, column: String },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for FlintError {
    fn from(err: serde_json::Error) -> Self {
        FlintError::Serialization(err.to_string())
    }
}
