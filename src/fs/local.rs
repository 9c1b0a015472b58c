//! Local filesystem backend
//!
//! Maps file names onto a root directory using std::fs.

use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::warn;

use crate::error::Result;

use super::FileSystem;

/// Files stored under a single directory
#[derive(Debug, Clone)]
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    /// Bind to `root`, creating the directory if it doesn't exist
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Get the root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl FileSystem for LocalFs {
    fn exists(&self, path: &str) -> Result<bool> {
        match fs::metadata(self.resolve(path)) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn read_all(&self, path: &str) -> Result<Bytes> {
        Ok(Bytes::from(fs::read(self.resolve(path))?))
    }

    /// Writes to a sibling temp file and renames it over the target, so a
    /// reader sees either the old contents or the new ones. The temp file
    /// is removed again if any step fails.
    fn write_all(&self, path: &str, contents: &[u8]) -> Result<()> {
        let target = self.resolve(path);
        let staging = self.resolve(&format!("{}.tmp", path));

        if let Err(e) = stage_and_rename(&staging, &target, contents) {
            if let Err(cleanup) = fs::remove_file(&staging) {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(path = %staging.display(), error = %cleanup, "could not remove temp file");
                }
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<()> {
        fs::remove_file(self.resolve(path))?;
        Ok(())
    }
}

fn stage_and_rename(staging: &Path, target: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(staging)?;
    file.write_all(contents)?;
    file.sync_all()?;
    drop(file);

    fs::rename(staging, target)
}
