//! rosterd server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the directory API over HTTP.
//!
//! # Session token provisioning
//!
//! Sessions are declared in `config.toml` as `(principal_id, token digest)`
//! pairs. To generate the digest for `token_sha256`:
//!
//! ```
//! cargo run -p roster-server --bin rosterd -- --hash-token
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use roster_api::ApiState;
use roster_server::{ConfigSessions, DiskAvatars, ServerConfig, sessions};
use roster_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Roster directory server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the SHA-256 digest for a token entered on stdin and exit.
  #[arg(long)]
  hash_token: bool,
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

  // Helper mode: digest a token and exit.
  if cli.hash_token {
    let token = read_line("Token: ")?;
    println!("{}", sessions::token_digest(&token));
    return Ok(());
  }

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("ROSTER"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in filesystem paths.
  let store_path = expand_tilde(&server_cfg.store_path);
  let avatar_dir = expand_tilde(&server_cfg.avatar_dir);

  tokio::fs::create_dir_all(&avatar_dir)
    .await
    .with_context(|| format!("failed to create avatar dir {avatar_dir:?}"))?;

  // Open SQLite store (creates schema and seed roles on first run).
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Build application state.
  let state = ApiState::new(
    Arc::new(store),
    Arc::new(ConfigSessions::from_entries(&server_cfg.sessions)),
    Arc::new(DiskAvatars::new(
      avatar_dir.clone(),
      server_cfg.public_base_url.clone(),
    )),
  );

  let app = roster_server::router(state, &avatar_dir);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Prompt and read one trimmed line from stdin.
fn read_line(prompt: &str) -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("{prompt}");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
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
