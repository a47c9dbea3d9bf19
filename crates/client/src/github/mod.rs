//! GitHub profile scraping.
//!
//! `scrape::GithubScraper` ties the pieces together: `url` normalizes the
//! input, `extract` reads the profile page through `locate` fallback chains,
//! and `contributions` fetches the yearly count from a separate fragment.

pub mod contributions;
pub mod extract;
pub mod locate;
pub mod number;
pub mod scrape;
pub mod url;

pub use contributions::{fetch_contributions, parse_contributions};
pub use extract::ProfileFields;
pub use number::parse_count;
pub use scrape::GithubScraper;
pub use url::{ProfileUrl, extract_username, normalize_profile_url};
