//! Profile url normalization.
//!
//! Accepts a bare username, a scheme-less `github.com/...` path or a full
//! url, and produces an absolute profile url plus the username in it.

use std::sync::LazyLock;

use regex::Regex;
use roster_core::Error;

static SCHEME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^https?://").expect("invalid regex"));
static GITHUB_PATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^github\.com/").expect("invalid regex"));
static USERNAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"github\.com/([^/?#]+)").expect("invalid regex"));

/// A normalized profile url and the username extracted from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUrl {
    pub url: String,
    pub username: String,
}

impl ProfileUrl {
    /// Normalize `input` and extract its username.
    ///
    /// # Errors
    ///
    /// `Error::InvalidProfileUrl` when the normalized url has no
    /// `github.com/<username>` segment.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let url = normalize_profile_url(input);
        let username = extract_username(&url)?;
        Ok(Self { url, username })
    }
}

/// Turn free-form input into an absolute url.
///
/// 1. `http(s)://...` is kept as-is
/// 2. `github.com/...` gets `https://` prepended
/// 3. anything else is a username: `https://github.com/<input>`
pub fn normalize_profile_url(input: &str) -> String {
    let input = input.trim();

    if SCHEME.is_match(input) {
        input.to_string()
    } else if GITHUB_PATH.is_match(input) {
        format!("https://{input}")
    } else {
        format!("https://github.com/{input}")
    }
}

/// The path segment right after `github.com/`, up to `/`, `?` or `#`.
pub fn extract_username(url: &str) -> Result<String, Error> {
    USERNAME
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| Error::InvalidProfileUrl(url.to_string()))
}
