//! Database connection management with pragma configuration.
//!
//! Opens the SQLite database, applies WAL pragmas and runs migrations.

use super::migrations;
use super::short_code::ShortCodec;
use crate::Error;
use crate::config::AppConfig;
use std::path::Path;
use tokio_rusqlite::Connection;

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
     PRAGMA synchronous=NORMAL;
     PRAGMA temp_store=MEMORY;
     PRAGMA foreign_keys=ON;";

/// Member database handle.
///
/// Wraps a tokio-rusqlite Connection that runs database operations
/// on a background thread. Cloning shares the same connection.
#[derive(Clone, Debug)]
pub struct MemberStore {
    pub(crate) conn: Connection,
    pub(crate) codec: ShortCodec,
}

impl MemberStore {
    /// Open a database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies pragmas,
    /// and runs any pending migrations.
    pub async fn open(path: impl AsRef<Path>, codec: ShortCodec) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::prepare(conn, codec).await
    }

    /// Open the database described by the application config.
    pub async fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let codec = ShortCodec::new(config.short_url_host.clone(), config.short_code_min_length)?;
        Self::open(&config.db_path, codec).await
    }

    /// Open an in-memory database with the default short code settings.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let config = AppConfig::default();
        let codec = ShortCodec::new(config.short_url_host, config.short_code_min_length)?;
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::prepare(conn, codec).await
    }

    async fn prepare(conn: Connection, codec: ShortCodec) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(PRAGMAS)?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        migrations::run(&conn).await?;

        Ok(Self { conn, codec })
    }

    pub fn codec(&self) -> &ShortCodec {
        &self.codec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory() {
        let db = MemberStore::open_in_memory().await.unwrap();
        let version = db
            .conn
            .call(|conn| conn.query_row("SELECT sqlite_version()", [], |row| row.get::<_, String>(0)))
            .await
            .unwrap();
        assert!(!version.is_empty());
    }

    #[tokio::test]
    async fn test_open_file_runs_migrations() {
        let path = std::env::temp_dir().join(format!("roster-test-{}.sqlite", std::process::id()));
        let codec = ShortCodec::new("https://ros.tr", 6).unwrap();

        let db = MemberStore::open(&path, codec).await.unwrap();
        let members = db.list_members().await.unwrap();
        assert!(members.is_empty());
        assert_eq!(db.codec().host(), "https://ros.tr");

        drop(db);
        let _ = std::fs::remove_file(&path);
    }
}
