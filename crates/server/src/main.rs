//! roster MCP server entry point.
//!
//! Boots the member store and the background scrape queue, then serves the
//! roster tools on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use roster_client::GithubScraper;
use roster_core::{AppConfig, MemberStore, ScrapeJob, ScrapeQueue};
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(db_path = %config.db_path.display(), "Starting roster server on stdio transport");

    let store = MemberStore::from_config(&config).await?;
    let scraper = GithubScraper::from_config(&config)?;
    let job = ScrapeJob::new(Arc::new(store.clone()), Arc::new(scraper));
    let (queue, dispatcher) = ScrapeQueue::start(job, config.max_concurrent_jobs);

    let handler = handler::RosterServer::new(store, queue);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    dispatcher.abort();
    Ok(())
}
