//! Subcommand bodies.

use anyhow::{Context, Result, bail};
use roster_client::GithubScraper;
use roster_core::{JobOutcome, Member, MemberChanges, MemberStore, ScrapeJob};

pub async fn scrape(scraper: &GithubScraper, input: &str) -> Result<()> {
    let profile = scraper.scrape(input).await?;
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

pub async fn add(store: &MemberStore, job: &ScrapeJob, name: &str, url: &str) -> Result<()> {
    let member = store.create_member(name, url).await?;
    settle(store, job, member.id).await
}

pub async fn list(store: &MemberStore) -> Result<()> {
    for member in store.list_members().await? {
        println!("{}", summary_line(&member));
    }
    Ok(())
}

pub async fn show(store: &MemberStore, id: i64) -> Result<()> {
    let member = store.get_member(id).await?.with_context(|| format!("member {id} not found"))?;
    println!("{}", serde_json::to_string_pretty(&member)?);
    Ok(())
}

/// Rewrite the url with its current value, which resets the member to pending.
pub async fn rescan(store: &MemberStore, job: &ScrapeJob, id: i64) -> Result<()> {
    let member = store.get_member(id).await?.with_context(|| format!("member {id} not found"))?;
    let changes = MemberChanges { name: None, url: Some(member.url) };
    store.update_member(id, changes).await?;
    settle(store, job, id).await
}

async fn settle(store: &MemberStore, job: &ScrapeJob, id: i64) -> Result<()> {
    let outcome = job.perform(id).await;
    if let Some(member) = store.get_member(id).await? {
        println!("{}", summary_line(&member));
    }

    match outcome {
        JobOutcome::Completed | JobOutcome::Superseded => Ok(()),
        JobOutcome::Failed(reason) => bail!("scrape failed for member {id}: {reason}"),
        JobOutcome::MemberMissing => bail!("member {id} not found"),
    }
}

fn summary_line(member: &Member) -> String {
    let count = |value: Option<u64>| value.map_or_else(|| "-".to_string(), |v| v.to_string());
    format!(
        "{:>4}  {:<10}  {:<24}  followers={}  stars={}  contributions={}  {}",
        member.id,
        member.scraping_status,
        member.name,
        count(member.followers_count),
        count(member.starts_count),
        count(member.total_contributions_last_year),
        member.short_url.as_deref().unwrap_or(""),
    )
}
