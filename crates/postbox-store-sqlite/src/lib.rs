//! SQLite backend for the postbox message store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on the connection's
//! own thread without blocking the async runtime. The connection is opened
//! lazily on first use and shared by every clone of the store.

mod config;
mod connection;
mod encode;
mod migrate;
mod store;

pub mod error;
pub mod schema;

pub use config::{DATABASE_FILE, StoreConfig, default_database_path};
pub use connection::{BUSY_RETRY_LIMIT, BUSY_TIMEOUT, StoreLocation};
pub use error::{DeleteFailure, Error, Result};
pub use store::SqliteStore;
