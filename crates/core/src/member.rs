//! Roster member model and scraping lifecycle.

use serde::{Deserialize, Serialize};

/// Lifecycle stage of a member's profile scrape.
///
/// Stored as an integer column: the discriminants are part of the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScrapingStatus {
    #[default]
    Pending = 0,
    Processing = 1,
    Completed = 2,
    Failed = 3,
}

impl ScrapingStatus {
    pub const ALL: [ScrapingStatus; 4] =
        [ScrapingStatus::Pending, ScrapingStatus::Processing, ScrapingStatus::Completed, ScrapingStatus::Failed];

    /// Whether the state machine allows moving from `self` to `next`.
    ///
    /// - anything -> Pending (a url write always re-enters the cycle)
    /// - Pending | Completed | Failed -> Processing
    /// - Processing -> Completed | Failed
    pub fn can_transition_to(self, next: ScrapingStatus) -> bool {
        use ScrapingStatus::*;

        match next {
            Pending => true,
            Processing => matches!(self, Pending | Completed | Failed),
            Completed | Failed => self == Processing,
        }
    }

    /// Statuses from which `self` may be entered.
    pub fn predecessors(self) -> Vec<ScrapingStatus> {
        Self::ALL.into_iter().filter(|from| from.can_transition_to(self)).collect()
    }

    pub fn as_i64(self) -> i64 {
        self as i64
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(ScrapingStatus::Pending),
            1 => Some(ScrapingStatus::Processing),
            2 => Some(ScrapingStatus::Completed),
            3 => Some(ScrapingStatus::Failed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScrapingStatus::Pending => "pending",
            ScrapingStatus::Processing => "processing",
            ScrapingStatus::Completed => "completed",
            ScrapingStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ScrapingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A tracked person, keyed by their GitHub profile url.
///
/// Scrape-derived fields stay `None` until the first scrape completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub followers_count: Option<u64>,
    pub following_count: Option<u64>,
    pub starts_count: Option<u64>,
    pub public_repos_count: Option<u64>,
    pub total_contributions_last_year: Option<u64>,
    pub organizations: Vec<String>,
    pub location: Option<String>,
    pub scraping_status: ScrapingStatus,
    pub short_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Partial update of the user-editable member fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct MemberChanges {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// Structured record produced by one profile scrape.
///
/// Lives only between the scraper and the member update; never stored on its own.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileScrapeResult {
    pub username: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub followers_count: u64,
    pub following_count: u64,
    pub starts_count: u64,
    pub public_repos_count: u64,
    pub total_contributions_last_year: u64,
    pub organizations: Vec<String>,
    pub location: Option<String>,
    pub url: String,
}
