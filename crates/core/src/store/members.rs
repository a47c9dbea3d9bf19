//! Member CRUD operations and scrape-state writes.

use super::connection::MemberStore;
use crate::Error;
use crate::jobs::MemberRepository;
use crate::member::{Member, MemberChanges, ProfileScrapeResult, ScrapingStatus};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension};

const MEMBER_COLUMNS: &str = "id, name, url, username, avatar_url, followers_count, following_count, starts_count,
     public_repos_count, total_contributions_last_year, organizations, location, scraping_status,
     short_url, created_at, updated_at";

fn member_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Member> {
    let organizations: String = row.get(10)?;
    let organizations = serde_json::from_str(&organizations)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(10, rusqlite::types::Type::Text, Box::new(e)))?;

    let status: i64 = row.get(12)?;
    let scraping_status =
        ScrapingStatus::from_i64(status).ok_or(rusqlite::Error::IntegralValueOutOfRange(12, status))?;

    Ok(Member {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        username: row.get(3)?,
        avatar_url: row.get(4)?,
        followers_count: count_from_sql(row.get(5)?),
        following_count: count_from_sql(row.get(6)?),
        starts_count: count_from_sql(row.get(7)?),
        public_repos_count: count_from_sql(row.get(8)?),
        total_contributions_last_year: count_from_sql(row.get(9)?),
        organizations,
        location: row.get(11)?,
        scraping_status,
        short_url: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

fn count_from_sql(value: Option<i64>) -> Option<u64> {
    value.map(|v| u64::try_from(v).unwrap_or(0))
}

fn count_to_sql(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Comma-separated integer list for an `IN (...)` guard.
fn status_guard(next: ScrapingStatus) -> String {
    next.predecessors()
        .iter()
        .map(|s| s.as_i64().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn required(field: &str, value: &str) -> Result<String, Error> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidInput(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn select_member(conn: &rusqlite::Connection, id: i64) -> Result<Option<Member>, Error> {
    conn.query_row(
        &format!("SELECT {MEMBER_COLUMNS} FROM members WHERE id = ?1"),
        params![id],
        member_from_row,
    )
    .optional()
    .map_err(Error::from)
}

impl MemberStore {
    /// Insert a new member in `pending` state and assign its short url.
    ///
    /// The short url is derived from the new id inside the same transaction,
    /// so a member is never visible without one.
    pub async fn create_member(&self, name: &str, url: &str) -> Result<Member, Error> {
        let name = required("name", name)?;
        let url = required("url", url)?;
        let codec = self.codec.clone();

        self.conn
            .call(move |conn| -> Result<Member, Error> {
                let now = chrono::Utc::now().to_rfc3339();
                let tx = conn.transaction()?;

                tx.execute(
                    "INSERT INTO members (name, url, scraping_status, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?4)",
                    params![&name, &url, ScrapingStatus::Pending.as_i64(), &now],
                )
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        Error::InvalidInput(format!("url {url} has already been taken"))
                    } else {
                        Error::from(e)
                    }
                })?;

                let id = tx.last_insert_rowid();
                let short_url = codec.short_url(id)?;
                tx.execute("UPDATE members SET short_url = ?1 WHERE id = ?2", params![&short_url, id])?;
                tx.commit()?;

                select_member(conn, id)?.ok_or(Error::MemberNotFound(id))
            })
            .await
            .map_err(Error::from)
    }

    /// Apply a partial name/url update.
    ///
    /// The url is required on every member, so each successful update also
    /// resets the status to `pending` in the same write; the caller is then
    /// expected to enqueue a scrape. Returns `None` if the member is gone.
    pub async fn update_member(&self, id: i64, changes: MemberChanges) -> Result<Option<Member>, Error> {
        let name = changes.name.as_deref().map(|n| required("name", n)).transpose()?;
        let url = changes.url.as_deref().map(|u| required("url", u)).transpose()?;

        self.conn
            .call(move |conn| -> Result<Option<Member>, Error> {
                let Some(current) = select_member(conn, id)? else {
                    return Ok(None);
                };

                let name = name.unwrap_or(current.name);
                let url = url.unwrap_or(current.url);
                let now = chrono::Utc::now().to_rfc3339();

                conn.execute(
                    "UPDATE members SET name = ?1, url = ?2, scraping_status = ?3, updated_at = ?4 WHERE id = ?5",
                    params![&name, &url, ScrapingStatus::Pending.as_i64(), &now, id],
                )
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        Error::InvalidInput(format!("url {url} has already been taken"))
                    } else {
                        Error::from(e)
                    }
                })?;

                select_member(conn, id)
            })
            .await
            .map_err(Error::from)
    }

    /// Get a member by id.
    pub async fn get_member(&self, id: i64) -> Result<Option<Member>, Error> {
        self.conn
            .call(move |conn| select_member(conn, id))
            .await
            .map_err(Error::from)
    }

    /// All members, oldest first.
    pub async fn list_members(&self) -> Result<Vec<Member>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<Member>, Error> {
                let mut stmt = conn.prepare(&format!("SELECT {MEMBER_COLUMNS} FROM members ORDER BY id"))?;
                let members = stmt
                    .query_map([], member_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(members)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a member. Returns false if no such member existed.
    pub async fn delete_member(&self, id: i64) -> Result<bool, Error> {
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM members WHERE id = ?1", params![id])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Resolve a short code to the member it was generated for.
    pub async fn find_by_short_code(&self, code: &str) -> Result<Option<Member>, Error> {
        match self.codec.decode(code) {
            Some(id) => self.get_member(id).await,
            None => Ok(None),
        }
    }

    /// Move a member to `next` if the state machine allows it from its current status.
    ///
    /// Entering `processing` opens a new scrape generation, the same as
    /// [`MemberStore::begin_scrape`]. Returns false when the member is gone or
    /// the transition was rejected.
    pub async fn set_scraping_status(&self, id: i64, next: ScrapingStatus) -> Result<bool, Error> {
        let guard = status_guard(next);
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let updated = conn.execute(
                    &format!(
                        "UPDATE members SET
                            scraping_status = ?1,
                            scrape_generation = scrape_generation + (?1 = ?2),
                            updated_at = ?3
                         WHERE id = ?4 AND scraping_status IN ({guard})"
                    ),
                    params![next.as_i64(), ScrapingStatus::Processing.as_i64(), chrono::Utc::now().to_rfc3339(), id],
                )?;
                Ok(updated > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Move a member to `processing` and return the generation this scrape owns.
    ///
    /// `None` when the member is gone or is already being scraped.
    pub async fn begin_scrape(&self, id: i64) -> Result<Option<i64>, Error> {
        let guard = status_guard(ScrapingStatus::Processing);
        self.conn
            .call(move |conn| -> Result<Option<i64>, Error> {
                let tx = conn.transaction()?;
                let updated = tx.execute(
                    &format!(
                        "UPDATE members SET
                            scraping_status = ?1,
                            scrape_generation = scrape_generation + 1,
                            updated_at = ?2
                         WHERE id = ?3 AND scraping_status IN ({guard})"
                    ),
                    params![ScrapingStatus::Processing.as_i64(), chrono::Utc::now().to_rfc3339(), id],
                )?;
                if updated == 0 {
                    return Ok(None);
                }

                let generation =
                    tx.query_row("SELECT scrape_generation FROM members WHERE id = ?1", params![id], |row| row.get(0))?;
                tx.commit()?;
                Ok(Some(generation))
            })
            .await
            .map_err(Error::from)
    }

    /// Mark `failed` the scrape that owns `generation`.
    ///
    /// False if the member has since been reset or picked up by a newer scrape.
    pub async fn fail_scrape(&self, id: i64, generation: i64) -> Result<bool, Error> {
        let guard = status_guard(ScrapingStatus::Failed);
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let updated = conn.execute(
                    &format!(
                        "UPDATE members SET scraping_status = ?1, updated_at = ?2
                         WHERE id = ?3 AND scrape_generation = ?4 AND scraping_status IN ({guard})"
                    ),
                    params![ScrapingStatus::Failed.as_i64(), chrono::Utc::now().to_rfc3339(), id, generation],
                )?;
                Ok(updated > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Write every scraped field and mark the member `completed`, in one statement.
    ///
    /// Only the scrape that owns `generation` can complete the member.
    pub async fn apply_profile(&self, id: i64, generation: i64, profile: &ProfileScrapeResult) -> Result<bool, Error> {
        let profile = profile.clone();
        let organizations =
            serde_json::to_string(&profile.organizations).map_err(|e| Error::InvalidInput(e.to_string()))?;
        let guard = status_guard(ScrapingStatus::Completed);

        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let updated = conn.execute(
                    &format!(
                        "UPDATE members SET
                            username = ?1,
                            name = ?2,
                            avatar_url = ?3,
                            followers_count = ?4,
                            following_count = ?5,
                            starts_count = ?6,
                            public_repos_count = ?7,
                            total_contributions_last_year = ?8,
                            organizations = ?9,
                            location = ?10,
                            scraping_status = ?11,
                            updated_at = ?12
                         WHERE id = ?13 AND scrape_generation = ?14 AND scraping_status IN ({guard})"
                    ),
                    params![
                        &profile.username,
                        &profile.name,
                        &profile.avatar_url,
                        count_to_sql(profile.followers_count),
                        count_to_sql(profile.following_count),
                        count_to_sql(profile.starts_count),
                        count_to_sql(profile.public_repos_count),
                        count_to_sql(profile.total_contributions_last_year),
                        &organizations,
                        &profile.location,
                        ScrapingStatus::Completed.as_i64(),
                        chrono::Utc::now().to_rfc3339(),
                        id,
                        generation,
                    ],
                )?;
                Ok(updated > 0)
            })
            .await
            .map_err(Error::from)
    }
}

#[async_trait::async_trait]
impl MemberRepository for MemberStore {
    async fn find_member(&self, id: i64) -> Result<Option<Member>, Error> {
        self.get_member(id).await
    }

    async fn set_scraping_status(&self, id: i64, status: ScrapingStatus) -> Result<bool, Error> {
        MemberStore::set_scraping_status(self, id, status).await
    }

    async fn begin_scrape(&self, id: i64) -> Result<Option<i64>, Error> {
        MemberStore::begin_scrape(self, id).await
    }

    async fn apply_profile(&self, id: i64, generation: i64, profile: &ProfileScrapeResult) -> Result<bool, Error> {
        MemberStore::apply_profile(self, id, generation, profile).await
    }

    async fn fail_scrape(&self, id: i64, generation: i64) -> Result<bool, Error> {
        MemberStore::fail_scrape(self, id, generation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ProfileScrapeResult {
        ProfileScrapeResult {
            username: "testuser".into(),
            name: "Test User".into(),
            avatar_url: Some("https://avatars.githubusercontent.com/u/123?v=4".into()),
            followers_count: 100,
            following_count: 50,
            starts_count: 200,
            public_repos_count: 30,
            total_contributions_last_year: 1234,
            organizations: vec!["org1".into(), "org2".into()],
            location: Some("San Francisco, CA".into()),
            url: "https://github.com/testuser".into(),
        }
    }

    #[tokio::test]
    async fn test_create_member_is_pending_with_short_url() {
        let db = MemberStore::open_in_memory().await.unwrap();
        let member = db.create_member("Test", "testuser").await.unwrap();

        assert_eq!(member.scraping_status, ScrapingStatus::Pending);
        assert_eq!(member.name, "Test");
        assert_eq!(member.url, "testuser");
        assert!(member.username.is_none());
        assert!(member.followers_count.is_none());
        assert!(member.organizations.is_empty());

        let short_url = member.short_url.unwrap();
        let code = short_url.rsplit('/').next().unwrap();
        assert_eq!(db.codec().decode(code), Some(member.id));
    }

    #[tokio::test]
    async fn test_create_member_requires_name_and_url() {
        let db = MemberStore::open_in_memory().await.unwrap();
        assert!(matches!(db.create_member("  ", "testuser").await, Err(Error::InvalidInput(_))));
        assert!(matches!(db.create_member("Test", "").await, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_create_member_rejects_duplicate_url() {
        let db = MemberStore::open_in_memory().await.unwrap();
        db.create_member("One", "testuser").await.unwrap();
        let result = db.create_member("Two", "testuser").await;
        assert!(matches!(result, Err(Error::InvalidInput(msg)) if msg.contains("already been taken")));
    }

    #[tokio::test]
    async fn test_short_urls_are_unique() {
        let db = MemberStore::open_in_memory().await.unwrap();
        let a = db.create_member("A", "alice").await.unwrap();
        let b = db.create_member("B", "bob").await.unwrap();
        assert_ne!(a.short_url, b.short_url);
    }

    #[tokio::test]
    async fn test_update_member_resets_pending() {
        let db = MemberStore::open_in_memory().await.unwrap();
        let member = db.create_member("Test", "testuser").await.unwrap();
        assert!(db.set_scraping_status(member.id, ScrapingStatus::Processing).await.unwrap());
        assert!(db.set_scraping_status(member.id, ScrapingStatus::Failed).await.unwrap());

        let changes = MemberChanges { name: None, url: Some("https://github.com/other".into()) };
        let updated = db.update_member(member.id, changes).await.unwrap().unwrap();

        assert_eq!(updated.scraping_status, ScrapingStatus::Pending);
        assert_eq!(updated.url, "https://github.com/other");
        assert_eq!(updated.name, "Test");
        assert_eq!(updated.short_url, member.short_url);
    }

    #[tokio::test]
    async fn test_update_missing_member() {
        let db = MemberStore::open_in_memory().await.unwrap();
        let result = db.update_member(99, MemberChanges::default()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_member() {
        let db = MemberStore::open_in_memory().await.unwrap();
        let member = db.create_member("Test", "testuser").await.unwrap();

        assert!(db.delete_member(member.id).await.unwrap());
        assert!(!db.delete_member(member.id).await.unwrap());
        assert!(db.get_member(member.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_short_code() {
        let db = MemberStore::open_in_memory().await.unwrap();
        let member = db.create_member("Test", "testuser").await.unwrap();
        let code = db.codec().encode(member.id).unwrap();

        let found = db.find_by_short_code(&code).await.unwrap().unwrap();
        assert_eq!(found.id, member.id);
        assert!(db.find_by_short_code("zzzz").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_status_guard_rejects_skipping_processing() {
        let db = MemberStore::open_in_memory().await.unwrap();
        let member = db.create_member("Test", "testuser").await.unwrap();

        assert!(!db.set_scraping_status(member.id, ScrapingStatus::Completed).await.unwrap());
        assert!(!db.apply_profile(member.id, 0, &profile()).await.unwrap());

        let reloaded = db.get_member(member.id).await.unwrap().unwrap();
        assert_eq!(reloaded.scraping_status, ScrapingStatus::Pending);
        assert!(reloaded.username.is_none());
    }

    #[tokio::test]
    async fn test_apply_profile_writes_all_fields() {
        let db = MemberStore::open_in_memory().await.unwrap();
        let member = db.create_member("Test", "testuser").await.unwrap();
        let generation = db.begin_scrape(member.id).await.unwrap().unwrap();
        assert!(db.apply_profile(member.id, generation, &profile()).await.unwrap());

        let m = db.get_member(member.id).await.unwrap().unwrap();
        assert_eq!(m.scraping_status, ScrapingStatus::Completed);
        assert_eq!(m.username.as_deref(), Some("testuser"));
        assert_eq!(m.name, "Test User");
        assert_eq!(m.followers_count, Some(100));
        assert_eq!(m.following_count, Some(50));
        assert_eq!(m.starts_count, Some(200));
        assert_eq!(m.public_repos_count, Some(30));
        assert_eq!(m.total_contributions_last_year, Some(1234));
        assert_eq!(m.organizations, vec!["org1".to_string(), "org2".to_string()]);
        assert_eq!(m.location.as_deref(), Some("San Francisco, CA"));
    }

    #[tokio::test]
    async fn test_set_status_on_missing_member() {
        let db = MemberStore::open_in_memory().await.unwrap();
        assert!(!db.set_scraping_status(42, ScrapingStatus::Processing).await.unwrap());
    }

    #[tokio::test]
    async fn test_begin_scrape_opens_a_new_generation() {
        let db = MemberStore::open_in_memory().await.unwrap();
        let member = db.create_member("Test", "testuser").await.unwrap();

        let first = db.begin_scrape(member.id).await.unwrap().unwrap();
        assert_eq!(db.begin_scrape(member.id).await.unwrap(), None);

        assert!(db.fail_scrape(member.id, first).await.unwrap());
        let second = db.begin_scrape(member.id).await.unwrap().unwrap();
        assert!(second > first);
        assert_eq!(db.begin_scrape(42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_stale_generation_cannot_finish_a_newer_scrape() {
        let db = MemberStore::open_in_memory().await.unwrap();
        let member = db.create_member("Test", "testuser").await.unwrap();

        let stale = db.begin_scrape(member.id).await.unwrap().unwrap();
        db.update_member(member.id, MemberChanges { name: None, url: Some("newuser".into()) })
            .await
            .unwrap();
        let current = db.begin_scrape(member.id).await.unwrap().unwrap();

        assert!(!db.apply_profile(member.id, stale, &profile()).await.unwrap());
        assert!(!db.fail_scrape(member.id, stale).await.unwrap());

        let m = db.get_member(member.id).await.unwrap().unwrap();
        assert_eq!(m.scraping_status, ScrapingStatus::Processing);
        assert!(m.username.is_none());

        assert!(db.apply_profile(member.id, current, &profile()).await.unwrap());
    }

    #[tokio::test]
    async fn test_plain_status_write_to_processing_also_opens_a_generation() {
        let db = MemberStore::open_in_memory().await.unwrap();
        let member = db.create_member("Test", "testuser").await.unwrap();

        let stale = db.begin_scrape(member.id).await.unwrap().unwrap();
        assert!(db.set_scraping_status(member.id, ScrapingStatus::Pending).await.unwrap());
        assert!(db.set_scraping_status(member.id, ScrapingStatus::Processing).await.unwrap());

        assert!(!db.apply_profile(member.id, stale, &profile()).await.unwrap());
    }
}
