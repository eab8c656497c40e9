//! `brickyard`: reconcile LEGO part identifiers against the Rebrickable
//! catalog.
//!
//! # Usage
//!
//! ```text
//! brickyard                                  # resolve existing placeholders
//! brickyard instabrick_inventory.xml         # ingest an export first
//! brickyard --sync-colors --interactive --json
//! ```
//!
//! Settings come from `brickyard.toml` (or `--config`), then `BRICKYARD_*`
//! environment variables, then flags. The process exits non-zero only when
//! setup fails or the remote catalog becomes unusable; unresolved aliases
//! are reported, not treated as errors.

mod prompt;
mod settings;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use brickyard_rebrickable::RebrickableClient;
use brickyard_reconcile::{ReconcileOptions, ReconcileReport, Reconciler};
use brickyard_store_sqlite::SqliteStore;
use clap::Parser;
use prompt::TerminalPrompt;
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Reconcile LEGO part ids against the Rebrickable catalog")]
struct Cli {
  /// Instabrick XML export to ingest before reconciling.
  export: Option<PathBuf>,

  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "brickyard.toml")]
  config: PathBuf,

  /// SQLite database file (overrides `db_path`).
  #[arg(long, value_name = "FILE")]
  db: Option<PathBuf>,

  /// Rebrickable API key (overrides `api_key`).
  #[arg(long, env = "REBRICKABLE_API_KEY", hide_env_values = true)]
  api_key: Option<String>,

  /// Rebrickable user token (overrides `user_token`).
  #[arg(long, env = "REBRICKABLE_USER_TOKEN", hide_env_values = true)]
  user_token: Option<String>,

  /// Ids per bulk request and aliases per commit (1..=100).
  #[arg(long)]
  chunk_size: Option<usize>,

  /// Ask on the terminal for aliases no automatic strategy resolved.
  #[arg(short, long)]
  interactive: bool,

  /// Refresh the colour catalog before reconciling.
  #[arg(long)]
  sync_colors: bool,

  /// Print the run report as JSON on stdout.
  #[arg(long)]
  json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let mut settings =
    Settings::load(cli.config.clone()).context("failed to read config file")?;
  if let Some(db) = cli.db {
    settings.db_path = db;
  }
  if cli.api_key.is_some() {
    settings.api_key = cli.api_key;
  }
  if cli.user_token.is_some() {
    settings.user_token = cli.user_token;
  }
  if let Some(chunk_size) = cli.chunk_size {
    settings.chunk_size = chunk_size;
  }

  let api_key = settings
    .api_key()
    .map(str::to_owned)
    .context("no Rebrickable API key: set REBRICKABLE_API_KEY or `api_key` in the config file")?;
  if settings.user_token.is_some() {
    tracing::debug!("user token configured");
  }

  // Parse the export before touching the database so a bad file changes
  // nothing.
  let export = match &cli.export {
    Some(path) => {
      let xml = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read export {path:?}"))?;
      let items = brickyard_instabrick::parse(&xml)
        .with_context(|| format!("failed to parse export {path:?}"))?;
      tracing::info!(items = items.len(), "loaded export {path:?}");
      Some(items)
    }
    None => None,
  };

  let db_path = expand_tilde(&settings.db_path);
  if let Some(parent) = db_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let store = SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("failed to open store at {db_path:?}"))?;

  let client = RebrickableClient::new(settings.client_config(api_key))
    .context("failed to build HTTP client")?;

  let options = ReconcileOptions {
    chunk_size:  settings.chunk_size,
    interactive: cli.interactive,
    sync_colors: cli.sync_colors,
  };
  let mut reconciler =
    Reconciler::new(store, client, options).context("invalid settings")?;
  if cli.interactive {
    reconciler = reconciler.with_manual(Box::new(TerminalPrompt));
  }

  let report = reconciler.run(export).await.context("reconciliation aborted")?;

  if cli.json {
    println!("{}", serde_json::to_string_pretty(&report)?);
  } else {
    print_summary(&report);
  }

  Ok(())
}

fn print_summary(report: &ReconcileReport) {
  println!("Resolved {}/{} aliases.", report.resolved(), report.attempted);
  for (strategy, count) in &report.resolved_by {
    println!("  {strategy:<26} {count}");
  }
  if !report.unresolved.is_empty() {
    println!("Unresolved: {}", report.unresolved.join(", "));
  }
  for failure in &report.commit_failures {
    println!("Failed to commit {}: {}", failure.alias_id, failure.error);
  }
  if report.orphaned_rows > 0 {
    println!("{} inventory rows reference a missing part.", report.orphaned_rows);
  }
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
