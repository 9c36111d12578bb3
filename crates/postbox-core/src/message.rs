//! Message: the single record type held by the store.
//!
//! A message is identified by its business `code`. The storage row id is
//! assigned by the backend and never appears on the record itself.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Message ─────────────────────────────────────────────────────────────────

/// An in-memory message, as built from external input or decoded from a row.
///
/// `code` is optional here because input may lack it; such a message is
/// rejected before it reaches storage. Field names accept both the short form
/// (`code`) and the column form (`message_code`) when deserialising.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
  #[serde(default, alias = "message_code")]
  pub code:   Option<String>,
  #[serde(default, alias = "message_title")]
  pub title:  String,
  #[serde(default, alias = "message_detail")]
  pub detail: String,
  #[serde(default = "default_unread", alias = "message_unread")]
  pub unread: bool,
  /// Filled by the schema migration; empty until then.
  #[serde(default, alias = "message_new_column")]
  pub extra:  String,
}

fn default_unread() -> bool { true }

impl Default for Message {
  fn default() -> Self {
    Self {
      code:   None,
      title:  String::new(),
      detail: String::new(),
      unread: default_unread(),
      extra:  String::new(),
    }
  }
}

impl Message {
  /// Convenience constructor with every other field at its default.
  pub fn new(code: impl Into<String>) -> Self {
    Self { code: Some(code.into()), ..Self::default() }
  }

  pub fn with_title(mut self, title: impl Into<String>) -> Self {
    self.title = title.into();
    self
  }

  pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
    self.detail = detail.into();
    self
  }

  pub fn with_unread(mut self, unread: bool) -> Self {
    self.unread = unread;
    self
  }

  /// The business key, or [`Error::MissingCode`] if the message has none.
  pub fn require_code(&self) -> Result<&str> {
    self.code.as_deref().ok_or(Error::MissingCode)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn deserialize_applies_defaults() {
    let msg: Message = serde_json::from_str(r#"{"code": "101"}"#).unwrap();
    assert_eq!(msg, Message::new("101"));
    assert!(msg.unread);
    assert!(msg.title.is_empty());
  }

  #[test]
  fn deserialize_accepts_column_names() {
    let msg: Message = serde_json::from_str(
      r#"{
        "message_code": "106",
        "message_title": "msg5",
        "message_detail": "body",
        "message_unread": false
      }"#,
    )
    .unwrap();

    assert_eq!(msg.code.as_deref(), Some("106"));
    assert_eq!(msg.title, "msg5");
    assert_eq!(msg.detail, "body");
    assert!(!msg.unread);
  }

  #[test]
  fn missing_code_is_rejected() {
    let msg: Message = serde_json::from_str(r#"{"title": "orphan"}"#).unwrap();
    assert!(matches!(msg.require_code(), Err(Error::MissingCode)));
    assert_eq!(Message::new("7").require_code().unwrap(), "7");
  }
}
