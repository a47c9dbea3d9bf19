//! Outbound side of the roster.
//!
//! This crate provides the HTTP fetch capability and the GitHub profile
//! scraper built on it, shared by the server and CLI.

pub mod fetch;
pub mod github;

pub use fetch::{FetchClient, FetchConfig, FetchResponse, HttpFetch};
pub use github::{GithubScraper, ProfileFields, ProfileUrl};
