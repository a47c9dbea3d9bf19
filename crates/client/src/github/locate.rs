//! Ordered-fallback element lookup.
//!
//! GitHub's profile markup changes without notice, so every field is found
//! through a chain of strategies tried in order. The first strategy that
//! yields a usable value wins. A strategy whose selector does not parse
//! (a username with quotes in it, say) simply finds nothing.

use scraper::{ElementRef, Html, Selector};

/// One way of finding an element in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locate {
    /// First element matching a CSS selector.
    Css(String),
    /// First anchor whose href contains the given substring.
    HrefContains(String),
    /// First element matching `container` with a descendant matching `child`.
    Containing { container: String, child: String },
}

impl Locate {
    pub fn css(selector: impl Into<String>) -> Self {
        Locate::Css(selector.into())
    }

    /// First element this strategy finds, if any.
    pub fn find<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        match self {
            Locate::Css(selector) => doc.select(&parse(selector)?).next(),
            Locate::HrefContains(needle) => doc
                .select(&parse("a")?)
                .find(|a| a.value().attr("href").is_some_and(|href| href.contains(needle.as_str()))),
            Locate::Containing { container, child } => {
                let child = parse(child)?;
                doc.select(&parse(container)?)
                    .find(|el| el.select(&child).next().is_some())
            }
        }
    }
}

/// Strategies for one field, most specific first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain(Vec<Locate>);

impl Chain {
    pub fn new(strategies: Vec<Locate>) -> Self {
        Self(strategies)
    }

    /// Element found by the first strategy that finds anything.
    pub fn first<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        self.0.iter().find_map(|strategy| strategy.find(doc))
    }

    /// First `Some` produced by `read` over each strategy's element.
    ///
    /// A strategy that finds an element `read` rejects (empty text, missing
    /// attribute) falls through to the next one.
    pub fn first_with<'a, T>(&self, doc: &'a Html, read: impl Fn(ElementRef<'a>) -> Option<T>) -> Option<T> {
        self.0.iter().filter_map(|strategy| strategy.find(doc)).find_map(read)
    }
}

pub(crate) fn parse(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::debug!("skipping unparsable selector {selector:?}: {e}");
            None
        }
    }
}

/// Whitespace-trimmed text content of an element.
pub fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Trimmed text of the first descendant matching `child`, else of `el` itself.
pub fn text_preferring(el: ElementRef<'_>, child: &str) -> String {
    parse(child)
        .and_then(|sel| el.select(&sel).next())
        .map(text_of)
        .unwrap_or_else(|| text_of(el))
}

/// `Some(text)` unless it is empty.
pub fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}
