//! Lazily-opened connection handle.

use std::{path::PathBuf, time::Duration};

use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::{Error, Result};

/// How many times a statement is retried while another connection holds the
/// lock.
pub const BUSY_RETRY_LIMIT: i32 = 3;

/// Window over which the busy retries are spread.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const BUSY_BACKOFF: Duration =
  Duration::from_millis(BUSY_TIMEOUT.as_millis() as u64 / BUSY_RETRY_LIMIT as u64);

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
  Memory,
  /// Created on first open, along with any missing parent directories.
  File(PathBuf),
}

/// A single connection, opened on first use and reused afterwards.
///
/// A failed open leaves the cell empty, so the next operation tries again.
pub(crate) struct LazyConnection {
  location: StoreLocation,
  cell:     OnceCell<tokio_rusqlite::Connection>,
}

impl LazyConnection {
  pub fn new(location: StoreLocation) -> Self {
    Self { location, cell: OnceCell::new() }
  }

  pub fn location(&self) -> &StoreLocation { &self.location }

  /// The open handle, opening it first if needed.
  pub async fn get(&self) -> Result<&tokio_rusqlite::Connection> {
    self.cell.get_or_try_init(|| open(&self.location)).await
  }
}

async fn open(location: &StoreLocation) -> Result<tokio_rusqlite::Connection> {
  let conn = match location {
    StoreLocation::Memory => tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(|e| Error::Connect(Box::new(e)))?,
    StoreLocation::File(path) => {
      if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
          .await
          .map_err(|e| Error::Connect(Box::new(e)))?;
      }
      tokio_rusqlite::Connection::open(path.clone())
        .await
        .map_err(|e| Error::Connect(Box::new(e)))?
    }
  };

  conn
    .call(|conn| {
      conn.busy_handler(Some(retry_on_busy))?;
      Ok(())
    })
    .await
    .map_err(|e| Error::Connect(Box::new(e)))?;

  info!(?location, "opened database");
  Ok(conn)
}

/// SQLite busy handler; `attempt` counts the previous invocations for the
/// same lock.
fn retry_on_busy(attempt: i32) -> bool {
  if attempt >= BUSY_RETRY_LIMIT {
    debug!(attempt, "database still locked, giving up");
    return false;
  }
  std::thread::sleep(BUSY_BACKOFF);
  true
}
