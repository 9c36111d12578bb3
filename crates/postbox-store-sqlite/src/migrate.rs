//! Schema versioning through `PRAGMA user_version`.
//!
//! Version 0 is the table as created; version 1 adds the extra column. The
//! version check makes the migration safe to run any number of times.

use rusqlite::Connection;

use crate::schema::{EXTRA_COLUMN, MESSAGES};

/// The version reached once the extra column has been added.
pub const EXTRA_COLUMN_VERSION: i64 = 1;

pub fn read_version(conn: &Connection) -> rusqlite::Result<i64> {
  conn.pragma_query_value(None, "user_version", |row| row.get(0))
}

/// Add the extra column and bump the version in one transaction, so a failed
/// `ALTER TABLE` leaves the version untouched.
pub fn add_extra_column(conn: &mut Connection) -> rusqlite::Result<()> {
  let tx = conn.transaction()?;
  tx.execute_batch(&MESSAGES.add_column_sql(&EXTRA_COLUMN))?;
  tx.pragma_update(None, "user_version", EXTRA_COLUMN_VERSION)?;
  tx.commit()
}

/// Drop the table and return the schema to version 0 in one transaction. The
/// version is database-wide, so leaving it behind would stop a recreated
/// table from ever gaining the extra column.
pub fn drop_messages_table(conn: &mut Connection) -> rusqlite::Result<()> {
  let tx = conn.transaction()?;
  tx.execute_batch(&MESSAGES.drop_sql(true))?;
  tx.pragma_update(None, "user_version", 0i64)?;
  tx.commit()
}
