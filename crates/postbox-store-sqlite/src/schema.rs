//! Structured definition of the messages table.
//!
//! The table is declared as data and rendered to DDL, so the create, drop
//! and migration statements all come from one description. A hand-written
//! equivalent lives in `sql/create_table_msg.sql` for the script-based
//! creation path.

use std::fmt::Write as _;

/// The bundled table-creation script, run verbatim by
/// [`SqliteStore::create_table_from_sql`](crate::SqliteStore).
pub const BUNDLED_CREATE_SQL: &str = include_str!("../sql/create_table_msg.sql");

pub const TABLE: &str = "t_messages";

pub const ROW_ID: &str = "primary_key";
pub const CODE: &str = "message_code";
pub const TITLE: &str = "message_title";
pub const DETAIL: &str = "message_detail";
pub const UNREAD: &str = "message_unread";
/// Added by the version 1 migration.
pub const EXTRA: &str = "message_new_column";

// ─── Definition types ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
  Integer,
  Text,
  Boolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
  /// `PRIMARY KEY AUTOINCREMENT`; row ids are never reused.
  PrimaryKey,
  NotNull,
  Unique,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
  Text(&'static str),
  Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
  pub name:        &'static str,
  pub ty:          ColumnType,
  pub constraints: &'static [Constraint],
  pub default:     Option<DefaultValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
  pub name:    &'static str,
  pub columns: &'static [ColumnDef],
}

// ─── The messages table ──────────────────────────────────────────────────────

pub const MESSAGES: TableDef = TableDef {
  name:    TABLE,
  columns: &[
    ColumnDef {
      name:        ROW_ID,
      ty:          ColumnType::Integer,
      constraints: &[Constraint::PrimaryKey],
      default:     None,
    },
    ColumnDef {
      name:        CODE,
      ty:          ColumnType::Text,
      constraints: &[Constraint::NotNull, Constraint::Unique],
      default:     None,
    },
    ColumnDef {
      name:        TITLE,
      ty:          ColumnType::Text,
      constraints: &[Constraint::NotNull],
      default:     Some(DefaultValue::Text("")),
    },
    ColumnDef {
      name:        DETAIL,
      ty:          ColumnType::Text,
      constraints: &[Constraint::NotNull],
      default:     Some(DefaultValue::Text("")),
    },
    ColumnDef {
      name:        UNREAD,
      ty:          ColumnType::Boolean,
      constraints: &[Constraint::NotNull],
      default:     Some(DefaultValue::Bool(true)),
    },
  ],
};

/// Nullable, so `ALTER TABLE ... ADD COLUMN` accepts it on a populated table.
pub const EXTRA_COLUMN: ColumnDef = ColumnDef {
  name:        EXTRA,
  ty:          ColumnType::Text,
  constraints: &[],
  default:     Some(DefaultValue::Text("")),
};

// ─── Rendering ───────────────────────────────────────────────────────────────

impl ColumnType {
  fn as_sql(self) -> &'static str {
    match self {
      ColumnType::Integer => "INTEGER",
      ColumnType::Text => "TEXT",
      ColumnType::Boolean => "BOOLEAN",
    }
  }
}

impl Constraint {
  fn as_sql(self) -> &'static str {
    match self {
      Constraint::PrimaryKey => "PRIMARY KEY AUTOINCREMENT",
      Constraint::NotNull => "NOT NULL",
      Constraint::Unique => "UNIQUE",
    }
  }
}

impl DefaultValue {
  fn to_sql(self) -> String {
    match self {
      DefaultValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
      DefaultValue::Bool(b) => String::from(if b { "1" } else { "0" }),
    }
  }
}

impl ColumnDef {
  /// The column clause, e.g. `message_title TEXT NOT NULL DEFAULT ''`.
  pub fn to_sql(&self) -> String {
    let mut sql = format!("{} {}", self.name, self.ty.as_sql());
    for constraint in self.constraints {
      sql.push(' ');
      sql.push_str(constraint.as_sql());
    }
    if let Some(default) = self.default {
      let _ = write!(sql, " DEFAULT {}", default.to_sql());
    }
    sql
  }
}

impl TableDef {
  pub fn create_sql(&self, if_not_exists: bool) -> String {
    let columns = self
      .columns
      .iter()
      .map(|c| format!("    {}", c.to_sql()))
      .collect::<Vec<_>>()
      .join(",\n");
    let guard = if if_not_exists { "IF NOT EXISTS " } else { "" };
    format!("CREATE TABLE {guard}{} (\n{columns}\n)", self.name)
  }

  pub fn drop_sql(&self, if_exists: bool) -> String {
    let guard = if if_exists { "IF EXISTS " } else { "" };
    format!("DROP TABLE {guard}{}", self.name)
  }

  pub fn add_column_sql(&self, column: &ColumnDef) -> String {
    format!("ALTER TABLE {} ADD COLUMN {}", self.name, column.to_sql())
  }
}
