//! SQLite-backed member store.
//!
//! Persistent storage for roster members using SQLite with async access via
//! tokio-rusqlite:
//!
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Scrape-state writes guarded by the status state machine
//! - Short urls assigned on insert

pub mod connection;
pub mod members;
pub mod migrations;
pub mod short_code;

pub use crate::Error;

pub use connection::MemberStore;
pub use short_code::ShortCodec;
