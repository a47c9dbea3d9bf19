//! Background scrape jobs.
//!
//! A job is triggered by a member id only; it re-reads the member when it
//! starts so it never acts on state captured at enqueue time.

pub mod queue;
pub mod runner;

pub use queue::ScrapeQueue;
pub use runner::{JobOutcome, ScrapeJob};

use crate::Error;
use crate::member::{Member, ProfileScrapeResult, ScrapingStatus};

/// Persistence seam used by the job runner.
#[async_trait::async_trait]
pub trait MemberRepository: Send + Sync {
    /// Load a member, `None` if it no longer exists.
    async fn find_member(&self, id: i64) -> Result<Option<Member>, Error>;

    /// Guarded status write; false if the member is gone or the transition was rejected.
    async fn set_scraping_status(&self, id: i64, status: ScrapingStatus) -> Result<bool, Error>;

    /// Enter `processing`, returning the scrape generation the caller now owns.
    async fn begin_scrape(&self, id: i64) -> Result<Option<i64>, Error>;

    /// Write the scraped fields and `completed` in one update, if `generation` is still current.
    async fn apply_profile(&self, id: i64, generation: i64, profile: &ProfileScrapeResult) -> Result<bool, Error>;

    /// Mark `failed`, if `generation` is still current.
    async fn fail_scrape(&self, id: i64, generation: i64) -> Result<bool, Error>;
}

/// Profile scraping seam, implemented by the GitHub scraper.
#[async_trait::async_trait]
pub trait ProfileScraper: Send + Sync {
    /// Scrape the profile behind a raw url or bare username.
    async fn scrape(&self, raw_url: &str) -> Result<ProfileScrapeResult, Error>;
}
