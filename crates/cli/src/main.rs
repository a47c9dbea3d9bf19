//! roster command line.
//!
//! Operates on the same store as the MCP server. Scrapes triggered here run
//! inline instead of through the background queue, so each command returns
//! once its member has settled.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use roster_client::GithubScraper;
use roster_core::{AppConfig, MemberStore, ScrapeJob};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(author, version, about = "Track a roster of GitHub profiles")]
struct Cli {
    /// SQLite database path (overrides ROSTER_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Scrape one profile and print the result as JSON, without storing it
    Scrape {
        /// Profile url, `github.com/<user>` path, or bare username
        input: String,
    },
    /// Add a member and scrape their profile
    Add { name: String, url: String },
    /// List every member
    List,
    /// Show one member as JSON
    Show { id: i64 },
    /// Reset a member to pending and scrape again
    Rescan { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    let scraper = GithubScraper::from_config(&config)?;

    if let Command::Scrape { input } = &cli.command {
        return commands::scrape(&scraper, input).await;
    }

    let store = MemberStore::from_config(&config).await?;
    let job = ScrapeJob::new(Arc::new(store.clone()), Arc::new(scraper));

    match cli.command {
        Command::Scrape { .. } => Ok(()),
        Command::Add { name, url } => commands::add(&store, &job, &name, &url).await,
        Command::List => commands::list(&store).await,
        Command::Show { id } => commands::show(&store, id).await,
        Command::Rescan { id } => commands::rescan(&store, &job, id).await,
    }
}
