mod app;
mod cache;
mod commands;
mod config;
mod event;
mod filter;
mod github;
mod lists;
mod logging;
mod operation;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "gh9s")]
#[command(about = "A terminal UI for GitHub repositories and issues, inspired by k9s")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/gh9s/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Open on this repository's issues (OWNER/NAME)
  #[arg(short, long)]
  repo: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = logging::init()?;

  let config = config::Config::load(args.config.as_deref())?;

  let repository = match args.repo.as_deref() {
    Some(repo) => Some(config::parse_repository(repo)?),
    None => config.default_repository().transpose()?,
  };
  info!(
    endpoint = %config.github.url,
    page_size = config.page_size,
    repository = ?repository,
    "starting"
  );

  let mut app = app::App::new(config, repository)?;
  app.run().await?;

  Ok(())
}
