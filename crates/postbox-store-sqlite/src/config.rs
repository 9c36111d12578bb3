//! Store configuration, deserialised by the binary from its config sources.

use std::path::PathBuf;

use serde::Deserialize;

use crate::connection::StoreLocation;

/// File name of the database inside the data directory.
pub const DATABASE_FILE: &str = "example_db.sqlite3";

/// Path value that selects an in-memory database.
const MEMORY_PATH: &str = ":memory:";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
  /// Database file; [`default_database_path`] when unset.
  pub database_path:    Option<PathBuf>,
  /// Abort and roll back a batch upsert when one of its inserts fails,
  /// instead of skipping that message.
  pub strict_upsert:    bool,
  /// Surface a failed column migration as an error instead of logging it.
  pub strict_migration: bool,
}

impl StoreConfig {
  pub fn location(&self) -> StoreLocation {
    match &self.database_path {
      Some(path) if path.as_os_str() == MEMORY_PATH => StoreLocation::Memory,
      Some(path) => StoreLocation::File(path.clone()),
      None => StoreLocation::File(default_database_path()),
    }
  }
}

/// `<data-dir>/postbox/example_db.sqlite3`, or a path relative to the
/// working directory when the platform has no data directory.
pub fn default_database_path() -> PathBuf {
  dirs::data_dir()
    .unwrap_or_else(|| PathBuf::from("."))
    .join("postbox")
    .join(DATABASE_FILE)
}
