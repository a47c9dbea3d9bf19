//! Count parsing for profile stat badges ("1,234", "1.5k", "2.5m").

use std::sync::LazyLock;

use regex::Regex;

static LEADING_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d*)(?:\.(\d+))?").expect("invalid regex"));
static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("invalid regex"));

/// Parse a displayed count, 0 when there is nothing numeric in it.
///
/// Commas are dropped. Text containing `k` or `m` (any case) scales its
/// leading decimal by a thousand or a million, truncating; otherwise the
/// first run of digits is the value.
pub fn parse_count(text: &str) -> u64 {
    let text = text.replace(',', "");
    let text = text.trim();
    let lower = text.to_lowercase();

    if lower.contains('k') {
        scaled(text, 3)
    } else if lower.contains('m') {
        scaled(text, 6)
    } else {
        DIGITS
            .find(text)
            .map(|m| m.as_str().parse().unwrap_or(u64::MAX))
            .unwrap_or(0)
    }
}

/// Leading decimal times `10^places`, computed on the digits so "4.35k" is 4350.
fn scaled(text: &str, places: u32) -> u64 {
    let Some(caps) = LEADING_DECIMAL.captures(text) else {
        return 0;
    };

    let whole = caps.get(1).map_or("", |m| m.as_str());
    let fraction = caps.get(2).map_or("", |m| m.as_str());
    if whole.is_empty() && fraction.is_empty() {
        return 0;
    }

    let whole: u64 = if whole.is_empty() { 0 } else { whole.parse().unwrap_or(u64::MAX) };
    let mut fraction: String = fraction.chars().take(places as usize).collect();
    while fraction.len() < places as usize {
        fraction.push('0');
    }
    let fraction: u64 = fraction.parse().unwrap_or(0);

    whole.saturating_mul(10u64.pow(places)).saturating_add(fraction)
}
