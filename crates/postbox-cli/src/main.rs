//! `postbox`: command-line front end for the postbox message store.
//!
//! Reads `postbox.toml` (or the path given with `--config`) and `POSTBOX_*`
//! environment variables, opens the SQLite store and runs one action.
//!
//! ```
//! postbox create
//! postbox insert --code 106 --title msg5
//! postbox list --code 106
//! postbox batch messages.json --update-existing
//! ```

mod commands;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use postbox_store_sqlite::{SqliteStore, StoreConfig};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use commands::Command;

#[derive(Parser)]
#[command(author, version, about = "Message store demo over SQLite")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "postbox.toml")]
  config: PathBuf,

  /// Database file, overriding the configuration. `:memory:` opens a
  /// throwaway database.
  #[arg(long, value_name = "FILE")]
  database: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration; the command line wins over file and environment.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("POSTBOX"))
    .build()
    .context("failed to read config file")?;

  let mut store_cfg: StoreConfig = settings
    .try_deserialize()
    .context("failed to deserialise StoreConfig")?;

  if let Some(database) = cli.database {
    store_cfg.database_path = Some(database);
  }
  store_cfg.database_path = store_cfg.database_path.as_deref().map(expand_tilde);

  let store = SqliteStore::from_config(&store_cfg);
  tracing::debug!(location = ?store.location(), "using database");

  commands::run(&store, cli.command, &mut std::io::stdout()).await
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
