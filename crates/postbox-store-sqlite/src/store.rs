//! [`SqliteStore`], the SQLite implementation of [`MessageStore`].

use std::{path::PathBuf, sync::Arc};

use postbox_core::{
  message::Message,
  store::{MessageFilter, MessageStore},
};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use tracing::{debug, info, warn};

use crate::{
  DeleteFailure, Error, Result, StoreConfig,
  connection::{LazyConnection, StoreLocation},
  encode::{RawMessage, count_code, decode_rows, insert_row, select_filtered, update_row},
  migrate::{EXTRA_COLUMN_VERSION, add_extra_column, drop_messages_table, read_version},
  schema::{CODE, MESSAGES, ROW_ID, TABLE},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A postbox message store backed by a single SQLite database.
///
/// Constructing a store does no I/O; the database is opened by the first
/// operation. Cloning is cheap and clones share the connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn:   Arc<LazyConnection>,
  policy: Policy,
}

/// Whether the two tolerated failure paths are tolerated.
#[derive(Debug, Clone, Copy, Default)]
struct Policy {
  strict_upsert:    bool,
  strict_migration: bool,
}

impl SqliteStore {
  pub fn new(location: StoreLocation) -> Self {
    Self {
      conn:   Arc::new(LazyConnection::new(location)),
      policy: Policy::default(),
    }
  }

  pub fn from_config(config: &StoreConfig) -> Self {
    Self::new(config.location())
      .strict_upsert(config.strict_upsert)
      .strict_migration(config.strict_migration)
  }

  /// A store over the database file at `path`.
  pub fn open(path: impl Into<PathBuf>) -> Self {
    Self::new(StoreLocation::File(path.into()))
  }

  /// An in-memory store, useful for testing.
  pub fn open_in_memory() -> Self { Self::new(StoreLocation::Memory) }

  /// Abort a batch upsert when one of its inserts fails.
  pub fn strict_upsert(mut self, strict: bool) -> Self {
    self.policy.strict_upsert = strict;
    self
  }

  /// Report a failed column migration instead of only logging it.
  pub fn strict_migration(mut self, strict: bool) -> Self {
    self.policy.strict_migration = strict;
    self
  }

  pub fn location(&self) -> &StoreLocation { self.conn.location() }

  /// The underlying connection, opened on first call.
  pub async fn handle(&self) -> Result<&tokio_rusqlite::Connection> {
    self.conn.get().await
  }

  async fn scan(&self, filter: MessageFilter) -> Result<Vec<Message>> {
    let conn = self.handle().await?;
    let (sql, params) = select_filtered(&filter);

    let raws: Vec<RawMessage> = conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), |row| {
            Ok(RawMessage::from_row(row))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::Query)?;

    let (messages, dropped) = decode_rows(raws);
    if dropped > 0 {
      debug!(dropped, "skipped rows that did not decode");
    }
    debug!(count = messages.len(), "queried messages");
    Ok(messages)
  }
}

// ─── MessageStore impl ───────────────────────────────────────────────────────

impl MessageStore for SqliteStore {
  type Error = Error;

  // ── Table ─────────────────────────────────────────────────────────────────

  async fn create_table(&self) -> Result<()> {
    let conn = self.handle().await?;
    let sql = MESSAGES.create_sql(true);

    // The version is only logged, so failing to read it is not an error.
    let version = conn
      .call(move |conn| {
        conn.execute_batch(&sql)?;
        Ok(read_version(conn).ok())
      })
      .await
      .map_err(Error::CreateTable)?;

    debug!(?version, "created table {TABLE}");
    Ok(())
  }

  async fn create_table_from_sql(&self, sql: String) -> Result<()> {
    let conn = self.handle().await?;

    conn
      .call(move |conn| {
        conn.execute_batch(&sql)?;
        Ok(())
      })
      .await
      .map_err(Error::CreateTable)?;

    debug!("created table from sql script");
    Ok(())
  }

  /// Also resets the schema version, so a table created afterwards is
  /// migrated again.
  async fn drop_table(&self) -> Result<()> {
    let conn = self.handle().await?;

    conn
      .call(|conn| Ok(drop_messages_table(conn)?))
      .await
      .map_err(Error::DropTable)?;

    debug!("dropped table {TABLE}");
    Ok(())
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn insert(&self, message: Message) -> Result<i64> {
    let conn = self.handle().await?;
    let code = message.require_code()?.to_owned();

    let row_id = conn
      .call(move |conn| Ok(insert_row(conn, &code, &message)?))
      .await
      .map_err(Error::Insert)?;

    debug!(row_id, "inserted message");
    Ok(row_id)
  }

  async fn update(&self, message: Message) -> Result<usize> {
    let conn = self.handle().await?;
    let code = message.require_code()?.to_owned();

    let rows = conn
      .call(move |conn| Ok(update_row(conn, &code, &message)?))
      .await
      .map_err(Error::Update)?;

    debug!(rows, "updated message");
    Ok(rows)
  }

  async fn delete(&self, message: Message) -> Result<()> {
    let conn = self.handle().await?;
    let code = message.require_code()?.to_owned();
    let code_param = code.clone();

    // Anything other than a single removed row is rolled back.
    let removed = conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let removed = tx.execute(
          &format!("DELETE FROM {TABLE} WHERE {CODE} = ?1"),
          rusqlite::params![code_param],
        )?;
        if removed == 1 {
          tx.commit()?;
        }
        Ok(removed)
      })
      .await
      .map_err(|e| Error::Delete {
        code:    code.clone(),
        failure: DeleteFailure::Database(e),
      })?;

    match removed {
      1 => {
        debug!(code = %code, "deleted message");
        Ok(())
      }
      0 => Err(Error::Delete { code, failure: DeleteFailure::NotFound }),
      n => Err(Error::Delete { code, failure: DeleteFailure::Ambiguous(n) }),
    }
  }

  async fn delete_all(&self) -> Result<usize> {
    let conn = self.handle().await?;

    let rows = conn
      .call(|conn| Ok(conn.execute(&format!("DELETE FROM {TABLE}"), [])?))
      .await
      .map_err(Error::DeleteAll)?;

    debug!(rows, "deleted all messages");
    Ok(rows)
  }

  async fn upsert(&self, messages: Vec<Message>, update_existing: bool) -> Result<()> {
    let conn = self.handle().await?;
    if messages.is_empty() {
      return Ok(());
    }

    let strict = self.policy.strict_upsert;
    debug!(count = messages.len(), update_existing, "upserting messages");

    conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        for message in &messages {
          let Some(code) = message.code.as_deref() else {
            debug!("skipping message without code");
            continue;
          };

          let existing = count_code(&tx, code)?;
          if existing > 0 {
            if !update_existing {
              debug!(code, "message exists, leaving it unchanged");
              continue;
            }
            let rows = update_row(&tx, code, message)?;
            debug!(code, rows, "updated existing message");
            continue;
          }

          // A failed INSERT only aborts its own statement, so the
          // transaction stays usable when the failure is skipped.
          match insert_row(&tx, code, message) {
            Ok(row_id) => debug!(code, row_id, "inserted message"),
            Err(e) if !strict => warn!(code, error = %e, "insert failed, skipping message"),
            Err(e) => return Err(e.into()),
          }
        }

        tx.commit()?;
        Ok(())
      })
      .await
      .map_err(|e| {
        warn!(error = %e, "upsert transaction rolled back");
        Error::Transaction(e)
      })
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn total_count(&self) -> Result<usize> {
    let conn = self.handle().await?;

    let count: i64 = conn
      .call(|conn| {
        Ok(conn.query_row(&format!("SELECT count(*) FROM {TABLE}"), [], |r| r.get(0))?)
      })
      .await
      .map_err(Error::Query)?;

    debug!(count, "counted messages");
    Ok(count as usize)
  }

  async fn get(&self, row_id: i64) -> Result<Option<Message>> {
    let conn = self.handle().await?;

    let raw: Option<RawMessage> = conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT * FROM {TABLE} WHERE {ROW_ID} = ?1"),
              rusqlite::params![row_id],
              |row| Ok(RawMessage::from_row(row)),
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::Query)?;

    Ok(raw.and_then(RawMessage::into_message))
  }

  async fn find_all(&self) -> Result<Vec<Message>> {
    self.scan(MessageFilter::default()).await
  }

  async fn find_filtered(&self, filter: &MessageFilter) -> Result<Vec<Message>> {
    self.scan(filter.clone()).await
  }

  // ── Schema ────────────────────────────────────────────────────────────────

  async fn schema_version(&self) -> Result<i64> {
    let conn = self.handle().await?;
    conn
      .call(|conn| Ok(read_version(conn)?))
      .await
      .map_err(Error::Query)
  }

  async fn migrate_add_column(&self) -> Result<()> {
    let conn = self.handle().await?;

    let version = self.schema_version().await?;
    if version >= EXTRA_COLUMN_VERSION {
      debug!(version, "schema already migrated");
      return Ok(());
    }

    info!(version, "adding extra column to {TABLE}");
    match conn.call(|conn| Ok(add_extra_column(conn)?)).await {
      Ok(()) => {
        info!(version = EXTRA_COLUMN_VERSION, "schema migrated");
        Ok(())
      }
      Err(e) if self.policy.strict_migration => Err(Error::Migration(e)),
      Err(e) => {
        warn!(version, error = %e, "failed to add extra column");
        Ok(())
      }
    }
  }
}
