//! Error type for `postbox-store-sqlite`.
//!
//! Each variant is one failure kind; an operation fails with exactly one of
//! them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The database could not be opened. Every operation reports this when the
  /// lazy handle is unavailable.
  #[error("database unavailable: {0}")]
  Connect(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("invalid message: {0}")]
  InvalidData(#[from] postbox_core::Error),

  #[error("failed to create table: {0}")]
  CreateTable(#[source] tokio_rusqlite::Error),

  #[error("failed to drop table: {0}")]
  DropTable(#[source] tokio_rusqlite::Error),

  #[error("failed to insert message: {0}")]
  Insert(#[source] tokio_rusqlite::Error),

  #[error("failed to update message: {0}")]
  Update(#[source] tokio_rusqlite::Error),

  #[error("failed to delete message {code:?}: {failure}")]
  Delete {
    code:    String,
    #[source]
    failure: DeleteFailure,
  },

  #[error("failed to delete all messages: {0}")]
  DeleteAll(#[source] tokio_rusqlite::Error),

  #[error("query failed: {0}")]
  Query(#[source] tokio_rusqlite::Error),

  #[error("transaction failed: {0}")]
  Transaction(#[source] tokio_rusqlite::Error),

  /// Only raised when the store is configured with strict migrations.
  #[error("schema migration failed: {0}")]
  Migration(#[source] tokio_rusqlite::Error),
}

/// Why a single-message delete did not remove exactly one row.
#[derive(Debug, Error)]
pub enum DeleteFailure {
  #[error("no row matched")]
  NotFound,

  /// More than one row matched; the delete was rolled back.
  #[error("{0} rows matched, expected exactly one")]
  Ambiguous(usize),

  #[error("database error: {0}")]
  Database(#[source] tokio_rusqlite::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
