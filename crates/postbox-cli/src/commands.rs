//! Subcommands and their dispatch onto a [`MessageStore`].

use std::{io::Write, path::PathBuf};

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use postbox_core::{
  message::Message,
  store::{MessageFilter, MessageStore},
};
use postbox_store_sqlite::schema::BUNDLED_CREATE_SQL;

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Create the messages table.
  Create {
    /// Run this SQL script instead of the structured definition.
    #[arg(long, value_name = "FILE", conflicts_with = "bundled")]
    sql:     Option<PathBuf>,
    /// Run the SQL script bundled with the store.
    #[arg(long)]
    bundled: bool,
  },
  /// Drop the messages table.
  Drop,
  /// Insert one message.
  Insert(MessageArgs),
  /// Overwrite the message with the same code.
  Update(MessageArgs),
  /// Delete the message with the given code.
  Delete {
    #[arg(long)]
    code: String,
  },
  /// Delete every message.
  DeleteAll,
  /// Print the number of stored messages.
  Count,
  /// Print stored messages as JSON, optionally filtered.
  List {
    #[arg(long)]
    code:   Option<String>,
    #[arg(long)]
    title:  Option<String>,
    #[arg(long)]
    unread: Option<bool>,
    #[arg(long)]
    limit:  Option<usize>,
    #[arg(long)]
    offset: Option<usize>,
  },
  /// Insert (and optionally update) the messages in a JSON array file.
  Batch {
    file:            PathBuf,
    /// Overwrite messages whose code is already stored.
    #[arg(long)]
    update_existing: bool,
  },
  /// Add the extra column if the schema has not been migrated yet.
  Migrate,
  /// Print the schema version.
  Version,
}

#[derive(Args, Debug)]
pub struct MessageArgs {
  #[arg(long)]
  code:   String,
  #[arg(long, default_value = "")]
  title:  String,
  #[arg(long, default_value = "")]
  detail: String,
  /// Store the message as already read.
  #[arg(long)]
  read:   bool,
}

impl From<MessageArgs> for Message {
  fn from(args: MessageArgs) -> Self {
    Message::new(args.code)
      .with_title(args.title)
      .with_detail(args.detail)
      .with_unread(!args.read)
  }
}

/// Run one command against `store`, writing results to `out`.
pub async fn run<S: MessageStore>(
  store:   &S,
  command: Command,
  out:     &mut impl Write,
) -> Result<()> {
  match command {
    Command::Create { sql: Some(path), .. } => {
      let sql = std::fs::read_to_string(&path)
        .with_context(|| format!("reading sql script {}", path.display()))?;
      store
        .create_table_from_sql(sql)
        .await
        .context("creating table from script")?;
      tracing::info!(script = %path.display(), "table created");
    }
    Command::Create { bundled: true, .. } => {
      store
        .create_table_from_sql(BUNDLED_CREATE_SQL.to_owned())
        .await
        .context("creating table from bundled script")?;
      tracing::info!("table created from bundled script");
    }
    Command::Create { .. } => {
      store.create_table().await.context("creating table")?;
      tracing::info!("table created");
    }
    Command::Drop => {
      store.drop_table().await.context("dropping table")?;
      tracing::info!("table dropped");
    }
    Command::Insert(args) => {
      let row_id = store.insert(args.into()).await.context("inserting message")?;
      writeln!(out, "{row_id}")?;
    }
    Command::Update(args) => {
      let rows = store.update(args.into()).await.context("updating message")?;
      writeln!(out, "{rows}")?;
    }
    Command::Delete { code } => {
      store
        .delete(Message::new(code))
        .await
        .context("deleting message")?;
    }
    Command::DeleteAll => {
      let rows = store.delete_all().await.context("deleting all messages")?;
      writeln!(out, "{rows}")?;
    }
    Command::Count => {
      let count = store.total_count().await.context("counting messages")?;
      writeln!(out, "{count}")?;
    }
    Command::List { code, title, unread, limit, offset } => {
      let filter = MessageFilter {
        code,
        title,
        detail: None,
        unread,
        limit,
        offset,
      };
      let messages = store
        .find_filtered(&filter)
        .await
        .context("querying messages")?;
      writeln!(out, "{}", serde_json::to_string_pretty(&messages)?)?;
    }
    Command::Batch { file, update_existing } => {
      let raw = std::fs::read_to_string(&file)
        .with_context(|| format!("reading batch file {}", file.display()))?;
      let messages: Vec<Message> =
        serde_json::from_str(&raw).context("parsing batch file")?;
      let count = messages.len();
      store
        .upsert(messages, update_existing)
        .await
        .context("writing batch")?;
      tracing::info!(count, update_existing, "batch written");
    }
    Command::Migrate => {
      store.migrate_add_column().await.context("migrating schema")?;
      let version = store.schema_version().await.context("reading schema version")?;
      writeln!(out, "{version}")?;
    }
    Command::Version => {
      let version = store.schema_version().await.context("reading schema version")?;
      writeln!(out, "{version}")?;
    }
  }
  Ok(())
}
