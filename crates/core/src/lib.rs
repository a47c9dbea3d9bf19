//! Core types and shared functionality for the roster.
//!
//! This crate provides:
//! - The member model and its scraping state machine
//! - SQLite-backed member store with short codes
//! - The scrape job runner and its in-process queue
//! - Unified error types and layered configuration

pub mod config;
pub mod error;
pub mod jobs;
pub mod member;
pub mod store;

pub use config::AppConfig;
pub use error::Error;
pub use jobs::{JobOutcome, MemberRepository, ProfileScraper, ScrapeJob, ScrapeQueue};
pub use member::{Member, MemberChanges, ProfileScrapeResult, ScrapingStatus};
pub use store::{MemberStore, ShortCodec};
