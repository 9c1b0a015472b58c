//! Configuration for FlintDB
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a FlintDB store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all table files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── {table}.config.{ext}   (schema descriptor + id counter)
    ///     └── {table}.data.{ext}     (one JSON record per line)
    pub data_dir: PathBuf,

    /// Extension shared by config and data files
    pub file_extension: String,

    // -------------------------------------------------------------------------
    // Encoding Configuration
    // -------------------------------------------------------------------------
    /// Write schema descriptors as indented JSON
    pub pretty_schema: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./flintdb_data"),
            file_extension: "json".to_string(),
            pretty_schema: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// File name of the schema descriptor for `table`
    pub fn config_file(&self, table: &str) -> String {
        format!("{}.config.{}", table, self.file_extension)
    }

    /// File name of the data file for `table`
    pub fn data_file(&self, table: &str) -> String {
        format!("{}.data.{}", table, self.file_extension)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all table files)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the file extension (without the leading dot)
    pub fn file_extension(mut self, ext: impl Into<String>) -> Self {
        self.config.file_extension = ext.into();
        self
    }

    /// Write schema descriptors pretty-printed or compact
    pub fn pretty_schema(mut self, pretty: bool) -> Self {
        self.config.pretty_schema = pretty;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
