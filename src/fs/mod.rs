//! Filesystem Module
//!
//! The byte-stream file abstraction the stores are written against.
//!
//! ## Responsibilities
//! - Existence checks, whole-file reads, whole-file writes, deletes
//! - Nothing else: no directory listing, no partial writes, no locking
//!
//! Each call is expected to be atomic from the caller's point of view: a
//! `read_all` never observes half of a concurrent `write_all`.
//!
//! ## Implementations
//! - [`LocalFs`]: files under a root directory on disk
//! - [`MemoryFs`]: an in-process map, for tests and benchmarks

mod local;
mod memory;

use bytes::Bytes;

use crate::error::Result;

pub use local::LocalFs;
pub use memory::MemoryFs;

/// Byte-level file access used by `SchemaStore` and `RecordStore`
///
/// Paths are plain file names relative to whatever root the implementation
/// is bound to.
pub trait FileSystem: Send + Sync {
    /// Whether a file exists at `path`
    fn exists(&self, path: &str) -> Result<bool>;

    /// Read the whole file
    ///
    /// Fails with `FlintError::Io` (kind `NotFound`) when the file is absent.
    fn read_all(&self, path: &str) -> Result<Bytes>;

    /// Replace the whole file, creating it if needed
    fn write_all(&self, path: &str, contents: &[u8]) -> Result<()>;

    /// Delete the file
    ///
    /// Fails with `FlintError::Io` (kind `NotFound`) when the file is absent.
    fn delete(&self, path: &str) -> Result<()>;
}
