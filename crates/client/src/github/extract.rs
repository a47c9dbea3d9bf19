//! Profile page field extractors.
//!
//! Each extractor is a pure function of the parsed page (and the username
//! being viewed) returning `None` when nothing usable was found. Defaults
//! are applied in one place, `ProfileFields::from_document`: 0 for counts,
//! absent for text, the username for the display name.

use std::collections::HashSet;

use scraper::{ElementRef, Html};

use super::locate::{Chain, Locate, non_empty, parse, text_of, text_preferring};
use super::number::parse_count;

const GITHUB_ORIGIN: &str = "https://github.com";

/// Every field read from the profile page itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileFields {
    pub name: String,
    pub avatar_url: Option<String>,
    pub followers_count: u64,
    pub following_count: u64,
    pub starts_count: u64,
    pub public_repos_count: u64,
    pub organizations: Vec<String>,
    pub location: Option<String>,
}

impl ProfileFields {
    /// Parse `html` and run every extractor against it.
    pub fn parse(html: &str, username: &str) -> Self {
        let doc = Html::parse_document(html);
        Self::from_document(&doc, username)
    }

    pub fn from_document(doc: &Html, username: &str) -> Self {
        Self {
            name: extract_name(doc).unwrap_or_else(|| username.to_string()),
            avatar_url: extract_avatar_url(doc, username),
            followers_count: extract_tab_count(doc, username, "followers").unwrap_or(0),
            following_count: extract_tab_count(doc, username, "following").unwrap_or(0),
            starts_count: extract_stars_count(doc, username).unwrap_or(0),
            public_repos_count: extract_public_repos_count(doc, username).unwrap_or(0),
            organizations: extract_organizations(doc, username),
            location: extract_location(doc),
        }
    }
}

/// Display name, from the vcard `p-name` markup.
pub fn extract_name(doc: &Html) -> Option<String> {
    Chain::new(vec![
        Locate::css("span.p-name"),
        Locate::css("h1.vcard-names .p-name"),
        Locate::css("[itemprop='name']"),
    ])
    .first_with(doc, |el| non_empty(text_of(el)))
}

/// Absolute avatar image url.
pub fn extract_avatar_url(doc: &Html, username: &str) -> Option<String> {
    Chain::new(vec![
        Locate::css("img.avatar"),
        Locate::css(format!("img[alt='@{username}']")),
        Locate::css("[itemprop='image']"),
    ])
    .first_with(doc, |el| {
        let value = el.value();
        value.attr("src").or_else(|| value.attr("data-src")).map(str::trim).filter(|src| !src.is_empty()).map(absolutize)
    })
}

fn absolutize(src: &str) -> String {
    if src.starts_with("//") {
        format!("https:{src}")
    } else if src.starts_with('/') {
        format!("{GITHUB_ORIGIN}{src}")
    } else {
        src.to_string()
    }
}

/// Anchors linking to one of the profile tabs, most specific first.
fn tab_anchor(username: &str, tab: &str) -> Chain {
    Chain::new(vec![
        Locate::css(format!("a[href='/{username}?tab={tab}']")),
        Locate::css(format!("a[href*='tab={tab}']")),
        Locate::HrefContains(format!("tab={tab}")),
    ])
}

/// Count shown on a `?tab=<tab>` link, preferring the number in a nested span.
///
/// Used for `followers` and `following`.
pub fn extract_tab_count(doc: &Html, username: &str, tab: &str) -> Option<u64> {
    tab_anchor(username, tab)
        .first(doc)
        .map(|anchor| parse_count(&text_preferring(anchor, "span")))
}

/// Starred repositories count.
///
/// Without a stars tab link, falls back to the bold numbers of the profile
/// card whose surrounding text mentions stars.
pub fn extract_stars_count(doc: &Html, username: &str) -> Option<u64> {
    if let Some(anchor) = tab_anchor(username, "stars").first(doc) {
        return Some(parse_count(&text_preferring(anchor, "span")));
    }

    let bold = parse(".js-profile-editable-replace .text-bold")?;
    doc.select(&bold).find_map(|stat| {
        let parent = stat.parent().and_then(ElementRef::wrap)?;
        text_of(parent)
            .to_lowercase()
            .contains("star")
            .then(|| parse_count(&text_of(stat)))
    })
}

/// Public repositories count, read from the tab's `Counter` badge when present.
pub fn extract_public_repos_count(doc: &Html, username: &str) -> Option<u64> {
    let anchor = tab_anchor(username, "repositories").first(doc)?;
    let counter = [".Counter", "span"]
        .iter()
        .filter_map(|sel| parse(sel))
        .find_map(|sel| anchor.select(&sel).next());

    let text = counter.map(text_of).unwrap_or_else(|| text_of(anchor));
    Some(parse_count(&text))
}

/// Organizations the user belongs to, in first-seen order.
///
/// Three passes are unioned: organization hovercard links, then (only when
/// the first pass found nothing) single-segment avatar group links, then
/// every `/orgs/<name>` link. The viewed user never appears in the list.
pub fn extract_organizations(doc: &Html, username: &str) -> Vec<String> {
    let mut found = hovercard_organizations(doc);
    if found.is_empty() {
        found.extend(avatar_group_organizations(doc, username));
    }
    found.extend(orgs_path_organizations(doc));

    let mut seen = HashSet::new();
    found
        .into_iter()
        .filter(|org| !org.is_empty() && org != username)
        .filter(|org| seen.insert(org.clone()))
        .collect()
}

fn hrefs<'a>(doc: &'a Html, selector: &str) -> Vec<&'a str> {
    let Some(selector) = parse(selector) else {
        return Vec::new();
    };
    doc.select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .collect()
}

fn hovercard_organizations(doc: &Html) -> Vec<String> {
    hrefs(doc, "a[data-hovercard-type='organization']")
        .into_iter()
        .map(|href| {
            let path = href.strip_prefix('/').unwrap_or(href);
            path.strip_prefix("orgs/").unwrap_or(path).trim().to_string()
        })
        .collect()
}

fn avatar_group_organizations(doc: &Html, username: &str) -> Vec<String> {
    let own_profile = format!("/{username}");
    hrefs(doc, "a.avatar-group-item")
        .into_iter()
        .filter(|href| *href != own_profile)
        .filter_map(|href| href.strip_prefix('/'))
        .filter(|name| !name.is_empty() && !name.contains('/'))
        .map(|name| name.trim().to_string())
        .collect()
}

fn orgs_path_organizations(doc: &Html) -> Vec<String> {
    hrefs(doc, "a[href^='/orgs/']")
        .into_iter()
        .filter_map(|href| href.strip_prefix("/orgs/"))
        .filter_map(|rest| rest.split('/').next())
        .map(|name| name.trim().to_string())
        .collect()
}

/// Home location from the vcard details.
pub fn extract_location(doc: &Html) -> Option<String> {
    Chain::new(vec![
        Locate::css("li[itemprop='homeLocation']"),
        Locate::Containing { container: ".vcard-detail".into(), child: "svg.octicon-location".into() },
        Locate::css("[itemprop='homeLocation'] span"),
        Locate::css(".p-label"),
    ])
    .first_with(doc, |el| non_empty(text_preferring(el, "span")))
}
