//! The per-member scrape job.
//!
//! Drives `pending -> processing -> completed | failed` for one member.
//! A job makes at most one scrape attempt and never returns an error:
//! every failure ends as a `failed` status plus a log line, and the only
//! way to retry is to trigger a new job.

use std::sync::Arc;

use super::{MemberRepository, ProfileScraper};
use crate::member::ScrapingStatus;

/// How a job run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Profile fields were written and the member is `completed`.
    Completed,
    /// The job failed. The member is `failed` with its previous fields intact, unless the
    /// store could not be read or a newer scrape has taken over.
    Failed(String),
    /// The member was deleted before the job started.
    MemberMissing,
    /// A status write was rejected, meaning another write moved the member on.
    Superseded,
}

/// Runs scrape jobs against a member repository.
#[derive(Clone)]
pub struct ScrapeJob {
    members: Arc<dyn MemberRepository>,
    scraper: Arc<dyn ProfileScraper>,
}

impl ScrapeJob {
    pub fn new(members: Arc<dyn MemberRepository>, scraper: Arc<dyn ProfileScraper>) -> Self {
        Self { members, scraper }
    }

    /// Run one scrape cycle for `member_id`.
    pub async fn perform(&self, member_id: i64) -> JobOutcome {
        let member = match self.members.find_member(member_id).await {
            Ok(Some(member)) => member,
            Ok(None) => {
                tracing::error!(member_id, "Member {member_id} not found");
                return JobOutcome::MemberMissing;
            }
            Err(e) => return Self::unrecorded(member_id, e.to_string()),
        };

        let generation = match self.members.begin_scrape(member_id).await {
            Ok(Some(generation)) => generation,
            Ok(None) => {
                tracing::warn!(
                    member_id,
                    from = %member.scraping_status,
                    "could not move member to processing; skipping scrape"
                );
                return JobOutcome::Superseded;
            }
            Err(e) => return Self::unrecorded(member_id, e.to_string()),
        };

        tracing::info!(member_id, generation, url = %member.url, "scraping GitHub profile");

        let scraper = Arc::clone(&self.scraper);
        let url = member.url.clone();
        let profile = match tokio::spawn(async move { scraper.scrape(&url).await }).await {
            Ok(Ok(profile)) => profile,
            Ok(Err(e)) => return self.fail(member_id, generation, e.to_string()).await,
            Err(e) => return self.fail(member_id, generation, format!("scrape task aborted: {e}")).await,
        };

        match self.members.apply_profile(member_id, generation, &profile).await {
            Ok(true) => {
                tracing::info!(member_id, username = %profile.username, "scrape completed");
                JobOutcome::Completed
            }
            Ok(false) => {
                tracing::warn!(member_id, generation, "member changed while scraping; discarding result");
                JobOutcome::Superseded
            }
            Err(e) => self.fail(member_id, generation, e.to_string()).await,
        }
    }

    /// Mark a member whose job died without reporting back.
    ///
    /// Only a member still in `processing` is touched.
    pub async fn abandon(&self, member_id: i64, reason: &str) {
        tracing::error!(member_id, "Scrape job for member {member_id} died: {reason}");

        if let Err(e) = self.members.set_scraping_status(member_id, ScrapingStatus::Failed).await {
            tracing::error!(member_id, "could not mark member as failed: {e}");
        }
    }

    async fn fail(&self, member_id: i64, generation: i64, message: String) -> JobOutcome {
        tracing::error!(member_id, "Failed to scrape GitHub profile for member {member_id}: {message}");

        match self.members.fail_scrape(member_id, generation).await {
            Ok(true) => {}
            Ok(false) => tracing::warn!(member_id, generation, "member changed while scraping; not marking failed"),
            Err(e) => tracing::error!(member_id, "could not mark member as failed: {e}"),
        }

        JobOutcome::Failed(message)
    }

    /// A store error before the job owned a scrape: report it, leave the status alone.
    fn unrecorded(member_id: i64, message: String) -> JobOutcome {
        tracing::error!(
            member_id,
            "Failed to scrape GitHub profile for member {member_id}: {message}; status left unchanged"
        );
        JobOutcome::Failed(message)
    }
}
