//! Error types for `postbox-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The message carries no business key and can never be persisted.
  #[error("message has no code")]
  MissingCode,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
