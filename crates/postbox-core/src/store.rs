//! The `MessageStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `postbox-store-sqlite`).
//! The command-line front end depends on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use crate::message::Message;

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`MessageStore::find_filtered`].
///
/// Every set field must match exactly; unset fields match anything. An empty
/// filter selects every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageFilter {
  pub code:   Option<String>,
  pub title:  Option<String>,
  pub detail: Option<String>,
  pub unread: Option<bool>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

impl MessageFilter {
  pub fn new() -> Self { Self::default() }

  pub fn code(mut self, code: impl Into<String>) -> Self {
    self.code = Some(code.into());
    self
  }

  pub fn title(mut self, title: impl Into<String>) -> Self {
    self.title = Some(title.into());
    self
  }

  pub fn detail(mut self, detail: impl Into<String>) -> Self {
    self.detail = Some(detail.into());
    self
  }

  pub fn unread(mut self, unread: bool) -> Self {
    self.unread = Some(unread);
    self
  }

  pub fn limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }

  pub fn offset(mut self, offset: usize) -> Self {
    self.offset = Some(offset);
    self
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a postbox message store backend.
///
/// Messages are matched by their business `code`; a message without one is
/// rejected by every write. All methods return `Send` futures so the trait can
/// be used from multi-threaded runtimes.
pub trait MessageStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Table ─────────────────────────────────────────────────────────────

  /// Create the messages table if it does not already exist.
  fn create_table(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Create the table by running a literal SQL script verbatim. Keeping the
  /// script consistent with the structured definition is up to the caller.
  fn create_table_from_sql(
    &self,
    sql: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Drop the messages table if it exists and reset the schema version.
  fn drop_table(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Insert a new message and return its storage row id. Fails if the code
  /// is already taken.
  fn insert(
    &self,
    message: Message,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// Overwrite title, detail and unread flag of the rows matching the
  /// message's code. Returns the number of rows changed; zero is not an
  /// error.
  fn update(
    &self,
    message: Message,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Delete the single row matching the message's code. Removing zero rows,
  /// or more than one, is an error.
  fn delete(
    &self,
    message: Message,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete every row, returning how many were removed.
  fn delete_all(
    &self,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Insert new messages and, when `update_existing` is set, overwrite the
  /// ones whose code is already stored, all inside one transaction.
  /// Messages without a code are skipped.
  fn upsert(
    &self,
    messages: Vec<Message>,
    update_existing: bool,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn total_count(
    &self,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Fetch a message by storage row id. Returns `None` if not found.
  fn get(
    &self,
    row_id: i64,
  ) -> impl Future<Output = Result<Option<Message>, Self::Error>> + Send + '_;

  /// Every stored message that decodes cleanly, in insertion order. Rows that
  /// do not decode are left out rather than reported.
  fn find_all(
    &self,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + '_;

  /// Like [`find_all`](Self::find_all), restricted by `filter`.
  fn find_filtered<'a>(
    &'a self,
    filter: &'a MessageFilter,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + 'a;

  // ── Schema ────────────────────────────────────────────────────────────

  /// The persisted schema version. Starts at zero.
  fn schema_version(
    &self,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// Add the migration column and advance the schema version to 1. A no-op
  /// once the version has been advanced.
  fn migrate_add_column(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
