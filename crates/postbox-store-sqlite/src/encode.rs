//! Decoding between stored rows and [`Message`], plus the SQL fragments that
//! bind a message's fields.
//!
//! Rows are first read as loosely-typed [`Value`]s looked up by column name,
//! then decoded. A row whose required columns are missing or mistyped decodes
//! to `None` and is filtered out by the caller; it is never an error.

use postbox_core::{message::Message, store::MessageFilter};
use rusqlite::{Connection, Row, types::Value};

use crate::schema::{CODE, DETAIL, EXTRA, ROW_ID, TABLE, TITLE, UNREAD};

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `t_messages` row. Columns absent from the
/// table (such as the migration column before migrating) read as `Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
  pub code:   Value,
  pub title:  Value,
  pub detail: Value,
  pub unread: Value,
  pub extra:  Value,
}

impl RawMessage {
  pub fn from_row(row: &Row<'_>) -> Self {
    Self {
      code:   column(row, CODE),
      title:  column(row, TITLE),
      detail: column(row, DETAIL),
      unread: column(row, UNREAD),
      extra:  column(row, EXTRA),
    }
  }

  /// The decoded message, or `None` when `code` is not text or `unread` is
  /// not an integer. Optional text columns fall back to empty.
  pub fn into_message(self) -> Option<Message> {
    let code = match self.code {
      Value::Text(code) => code,
      _ => return None,
    };
    let unread = match self.unread {
      Value::Integer(flag) => flag != 0,
      _ => return None,
    };

    Some(Message {
      code: Some(code),
      title: text_or_empty(self.title),
      detail: text_or_empty(self.detail),
      unread,
      extra: text_or_empty(self.extra),
    })
  }
}

fn column(row: &Row<'_>, name: &str) -> Value {
  row.get::<_, Value>(name).unwrap_or(Value::Null)
}

fn text_or_empty(value: Value) -> String {
  match value {
    Value::Text(s) => s,
    _ => String::new(),
  }
}

/// Decode every raw row, dropping the ones that do not decode. Returns the
/// messages and the number of rows dropped.
pub fn decode_rows(raws: Vec<RawMessage>) -> (Vec<Message>, usize) {
  let total = raws.len();
  let messages: Vec<Message> = raws
    .into_iter()
    .filter_map(RawMessage::into_message)
    .collect();
  let dropped = total - messages.len();
  (messages, dropped)
}

// ─── Statements ──────────────────────────────────────────────────────────────

pub fn insert_row(conn: &Connection, code: &str, message: &Message) -> rusqlite::Result<i64> {
  conn.execute(
    &format!("INSERT INTO {TABLE} ({CODE}, {TITLE}, {DETAIL}, {UNREAD}) VALUES (?1, ?2, ?3, ?4)"),
    rusqlite::params![code, message.title, message.detail, message.unread],
  )?;
  Ok(conn.last_insert_rowid())
}

pub fn update_row(conn: &Connection, code: &str, message: &Message) -> rusqlite::Result<usize> {
  conn.execute(
    &format!("UPDATE {TABLE} SET {TITLE} = ?1, {DETAIL} = ?2, {UNREAD} = ?3 WHERE {CODE} = ?4"),
    rusqlite::params![message.title, message.detail, message.unread, code],
  )
}

pub fn count_code(conn: &Connection, code: &str) -> rusqlite::Result<i64> {
  conn.query_row(
    &format!("SELECT count(*) FROM {TABLE} WHERE {CODE} = ?1"),
    rusqlite::params![code],
    |r| r.get(0),
  )
}

/// Build a `SELECT *` over the table with the filter's conditions, returning
/// the SQL and its positional parameters.
pub fn select_filtered(filter: &MessageFilter) -> (String, Vec<Value>) {
  let mut conds: Vec<String> = vec![];
  let mut params: Vec<Value> = vec![];

  let mut push = |column: &str, value: Value| {
    params.push(value);
    conds.push(format!("{column} = ?{}", params.len()));
  };
  if let Some(code) = &filter.code {
    push(CODE, Value::Text(code.clone()));
  }
  if let Some(title) = &filter.title {
    push(TITLE, Value::Text(title.clone()));
  }
  if let Some(detail) = &filter.detail {
    push(DETAIL, Value::Text(detail.clone()));
  }
  if let Some(unread) = filter.unread {
    push(UNREAD, Value::Integer(i64::from(unread)));
  }

  let where_clause = if conds.is_empty() {
    String::new()
  } else {
    format!(" WHERE {}", conds.join(" AND "))
  };

  // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded.
  let limit_clause = match (filter.limit, filter.offset) {
    (None, None) => String::new(),
    (limit, offset) => format!(
      " LIMIT {} OFFSET {}",
      limit.map_or(-1, clamp_to_i64),
      offset.map_or(0, clamp_to_i64)
    ),
  };

  let sql = format!("SELECT * FROM {TABLE}{where_clause} ORDER BY {ROW_ID}{limit_clause}");
  (sql, params)
}

/// SQLite reads a negative LIMIT as "no limit", so oversized values saturate.
fn clamp_to_i64(n: usize) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }
