//! Yearly contribution count, read from the profile's contributions fragment.
//!
//! The count is not part of the profile page. It comes from a partial
//! render GitHub serves to its own in-page fetches, so the request mimics
//! one. Every failure here is absorbed: the count falls back to 0 and the
//! scrape carries on.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use scraper::Html;
use url::Url;

use roster_core::Error;

use super::locate::{parse, text_of};
use crate::fetch::HttpFetch;

const FRAGMENT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36";
const GITHUB_CLIENT_VERSION: &str = "ecad3eec465beddbe739bccfec4334bdfea35cc3";

static LEADING_COUNT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d[\d,]*)").expect("invalid regex"));
static MENTIONS_CONTRIBUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)contribution").expect("invalid regex"));

/// Endpoint rendering the contributions summary for `username`.
pub fn contributions_url(username: &str) -> Result<Url, Error> {
    let mut url = Url::parse("https://github.com/")
        .and_then(|base| base.join(username))
        .map_err(|e| Error::ContributionsFetch(format!("bad contributions url for {username}: {e}")))?;
    url.query_pairs_mut()
        .append_pair("action", "show")
        .append_pair("controller", "profiles")
        .append_pair("tab", "contributions")
        .append_pair("user_id", username);
    Ok(url)
}

/// Headers of an in-page partial fetch made from the profile of `username`.
///
/// The nonce pair carries a fresh random value on every call.
pub fn fragment_headers(username: &str) -> Result<HeaderMap, Error> {
    let nonce = format!("v2:{}", uuid::Uuid::new_v4());
    let invalid = |e: header::InvalidHeaderValue| Error::ContributionsFetch(format!("invalid header value: {e}"));

    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("text/html"));
    headers.insert(header::USER_AGENT, HeaderValue::from_static(FRAGMENT_USER_AGENT));
    headers.insert(HeaderName::from_static("x-requested-with"), HeaderValue::from_static("XMLHttpRequest"));
    headers.insert(header::REFERER, HeaderValue::from_str(&format!("https://github.com/{username}")).map_err(invalid)?);
    headers.insert(HeaderName::from_static("x-fetch-nonce"), HeaderValue::from_str(&nonce).map_err(invalid)?);
    headers.insert(HeaderName::from_static("x-fetch-nonce-to-validate"), HeaderValue::from_str(&nonce).map_err(invalid)?);
    headers.insert(HeaderName::from_static("x-github-client-version"), HeaderValue::from_static(GITHUB_CLIENT_VERSION));
    Ok(headers)
}

/// Count in the fragment's summary heading, `None` if no heading has one.
///
/// Tries the activity description heading, then the first `h2`/`h3`
/// mentioning contributions with a digit in it. A fragment without any
/// such heading but with a contribution calendar is summed cell by cell.
pub fn parse_contributions(html: &str) -> Option<u64> {
    let doc = Html::parse_document(html);
    summary_heading(&doc)
        .and_then(|text| leading_count(&text))
        .or_else(|| calendar_total(&doc))
}

fn has_digit(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

fn summary_heading(doc: &Html) -> Option<String> {
    let described = parse("#js-contribution-activity-description")
        .and_then(|sel| doc.select(&sel).next())
        .map(text_of)
        .filter(|text| has_digit(text));
    if described.is_some() {
        return described;
    }

    let headings = parse("h2, h3")?;
    doc.select(&headings)
        .map(text_of)
        .find(|text| MENTIONS_CONTRIBUTION.is_match(text) && has_digit(text))
}

fn leading_count(text: &str) -> Option<u64> {
    let digits = LEADING_COUNT.captures(text)?.get(1)?.as_str().replace(',', "");
    digits.parse().ok()
}

fn calendar_total(doc: &Html) -> Option<u64> {
    let cells = parse(".js-calendar-graph [data-count]")?;
    let total: u64 = doc
        .select(&cells)
        .filter_map(|cell| cell.value().attr("data-count"))
        .filter_map(|count| count.trim().parse::<u64>().ok())
        .sum();
    (total > 0).then_some(total)
}

/// Fetch and parse the contributions count for `username`, 0 on any failure.
pub async fn fetch_contributions(fetch: &dyn HttpFetch, username: &str) -> u64 {
    match try_fetch_contributions(fetch, username).await {
        Ok(count) => count,
        Err(e) => {
            tracing::error!("Failed to fetch contributions for {username}: {e}");
            0
        }
    }
}

async fn try_fetch_contributions(fetch: &dyn HttpFetch, username: &str) -> Result<u64, Error> {
    let url = contributions_url(username)?;
    let headers = fragment_headers(username)?;

    let response = fetch.get(url.as_str(), headers).await?;
    if !response.is_success() {
        return Err(Error::ContributionsFetch(format!("status {}", response.status.as_u16())));
    }

    Ok(parse_contributions(&response.body).unwrap_or(0))
}
