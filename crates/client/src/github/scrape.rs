//! Profile scrape orchestration.

use std::sync::Arc;

use reqwest::header::HeaderMap;
use roster_core::{AppConfig, Error, ProfileScrapeResult, ProfileScraper};

use super::contributions::fetch_contributions;
use super::extract::ProfileFields;
use super::url::ProfileUrl;
use crate::fetch::{FetchClient, FetchConfig, HttpFetch};

/// Scrapes public GitHub profile pages.
#[derive(Clone)]
pub struct GithubScraper {
    fetch: Arc<dyn HttpFetch>,
}

impl GithubScraper {
    pub fn new(fetch: Arc<dyn HttpFetch>) -> Self {
        Self { fetch }
    }

    /// Scraper over a reqwest client configured from `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let client = FetchClient::new(FetchConfig::from(config))?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Normalize `raw_url`, fetch and parse the profile page, then fetch the
    /// contributions count.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidProfileUrl` when no username can be read from the input
    /// - `Error::ProfileFetch` when the profile page answers with a non-success status
    /// - `Error::HttpError` when the profile request itself fails
    ///
    /// A failing contributions fetch is not an error; the count is 0.
    pub async fn scrape(&self, raw_url: &str) -> Result<ProfileScrapeResult, Error> {
        let ProfileUrl { url, username } = ProfileUrl::parse(raw_url)?;

        let response = self.fetch.get(&url, HeaderMap::new()).await?;
        if !response.is_success() {
            return Err(Error::ProfileFetch { status: response.status.as_u16() });
        }

        let fields = ProfileFields::parse(&response.body, &username);
        let total_contributions_last_year = fetch_contributions(self.fetch.as_ref(), &username).await;

        tracing::debug!(
            %username,
            followers = fields.followers_count,
            organizations = fields.organizations.len(),
            total_contributions_last_year,
            "parsed profile"
        );

        Ok(ProfileScrapeResult {
            username,
            name: fields.name,
            avatar_url: fields.avatar_url,
            followers_count: fields.followers_count,
            following_count: fields.following_count,
            starts_count: fields.starts_count,
            public_repos_count: fields.public_repos_count,
            total_contributions_last_year,
            organizations: fields.organizations,
            location: fields.location,
            url,
        })
    }
}

#[async_trait::async_trait]
impl ProfileScraper for GithubScraper {
    async fn scrape(&self, raw_url: &str) -> Result<ProfileScrapeResult, Error> {
        GithubScraper::scrape(self, raw_url).await
    }
}
