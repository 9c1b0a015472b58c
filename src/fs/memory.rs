//! In-memory filesystem backend
//!
//! HashMap of file name → contents behind a RwLock. Cloning shares the
//! underlying files.

use std::collections::HashMap;
use std::io::{Error, ErrorKind};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;

use crate::error::Result;

use super::FileSystem;

/// Process-local file store
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    files: Arc<RwLock<HashMap<String, Bytes>>>,
}

impl MemoryFs {
    /// Create an empty in-memory filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of files currently stored
    pub fn file_count(&self) -> usize {
        self.files.read().len()
    }

    fn not_found(path: &str) -> Error {
        Error::new(ErrorKind::NotFound, format!("{}: file does not exist", path))
    }
}

impl FileSystem for MemoryFs {
    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.files.read().contains_key(path))
    }

    fn read_all(&self, path: &str) -> Result<Bytes> {
        self.files
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| Self::not_found(path).into())
    }

    fn write_all(&self, path: &str, contents: &[u8]) -> Result<()> {
        self.files
            .write()
            .insert(path.to_string(), Bytes::copy_from_slice(contents));
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<()> {
        match self.files.write().remove(path) {
            Some(_) => Ok(()),
            None => Err(Self::not_found(path).into()),
        }
    }
}
