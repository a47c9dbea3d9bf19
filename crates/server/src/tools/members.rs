//! Member roster tools.
//!
//! Create and update persist the member as `pending` before a scrape is
//! enqueued, so a caller reading the member right after never sees the
//! status from before the trigger.

use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use roster_core::{Error, Member, MemberChanges, MemberStore, ScrapeQueue};

use super::json_result;

/// Input parameters for member_list tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct MemberListParams {}

/// Output structure for member_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MemberListOutput {
    pub members: Vec<Member>,
    pub count: usize,
}

/// Input parameters for member_get and member_delete tools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MemberIdParams {
    /// Member id.
    pub id: i64,
}

/// Input parameters for member_create tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MemberCreateParams {
    /// Display name.
    pub name: String,

    /// GitHub profile url, `github.com/<user>` path, or bare username.
    pub url: String,
}

/// Input parameters for member_update tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MemberUpdateParams {
    /// Member id.
    pub id: i64,

    /// New display name.
    #[serde(default)]
    pub name: Option<String>,

    /// New profile url.
    #[serde(default)]
    pub url: Option<String>,
}

/// Output structure for member_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MemberDeleteOutput {
    pub id: i64,
    pub message: String,
}

pub async fn list_impl(store: &MemberStore, _params: MemberListParams) -> Result<CallToolResult, McpError> {
    let members = store.list_members().await?;
    let output = MemberListOutput { count: members.len(), members };
    Ok(json_result(&output))
}

pub async fn get_impl(store: &MemberStore, params: MemberIdParams) -> Result<CallToolResult, McpError> {
    let member = store.get_member(params.id).await?.ok_or(Error::MemberNotFound(params.id))?;
    Ok(json_result(&member))
}

pub async fn create_impl(
    store: &MemberStore, queue: &ScrapeQueue, params: MemberCreateParams,
) -> Result<CallToolResult, McpError> {
    let member = store.create_member(&params.name, &params.url).await?;
    queue.enqueue(member.id)?;

    tracing::info!(member_id = member.id, url = %member.url, "member created");
    Ok(json_result(&member))
}

pub async fn update_impl(
    store: &MemberStore, queue: &ScrapeQueue, params: MemberUpdateParams,
) -> Result<CallToolResult, McpError> {
    if params.name.is_none() && params.url.is_none() {
        return Err(Error::InvalidInput("nothing to update: pass name or url".into()).into());
    }

    let changes = MemberChanges { name: params.name, url: params.url };
    let member = store
        .update_member(params.id, changes)
        .await?
        .ok_or(Error::MemberNotFound(params.id))?;
    queue.enqueue(member.id)?;

    tracing::info!(member_id = member.id, "member updated");
    Ok(json_result(&member))
}

pub async fn delete_impl(store: &MemberStore, params: MemberIdParams) -> Result<CallToolResult, McpError> {
    if !store.delete_member(params.id).await? {
        return Err(Error::MemberNotFound(params.id).into());
    }

    let output = MemberDeleteOutput { id: params.id, message: "Member deleted successfully".into() };
    Ok(json_result(&output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::result_text as text_of;
    use roster_core::ScrapingStatus;

    #[tokio::test]
    async fn test_create_persists_pending_then_enqueues() {
        let store = MemberStore::open_in_memory().await.unwrap();
        let (queue, mut rx) = ScrapeQueue::channel();

        let params = MemberCreateParams { name: "Ada".into(), url: "testuser".into() };
        let result = create_impl(&store, &queue, params).await.unwrap();
        let member: Member = serde_json::from_str(&text_of(&result)).unwrap();

        assert_eq!(member.scraping_status, ScrapingStatus::Pending);
        assert!(member.short_url.is_some());
        assert_eq!(rx.try_recv().unwrap(), member.id);
    }

    #[tokio::test]
    async fn test_create_duplicate_url_fails_without_enqueue() {
        let store = MemberStore::open_in_memory().await.unwrap();
        let (queue, mut rx) = ScrapeQueue::channel();
        store.create_member("Ada", "testuser").await.unwrap();

        let params = MemberCreateParams { name: "Bob".into(), url: "testuser".into() };
        let err = create_impl(&store, &queue, params).await.unwrap_err();

        assert_eq!(err.code.0, -32602);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_create_empty_name_is_rejected() {
        let store = MemberStore::open_in_memory().await.unwrap();
        let (queue, _rx) = ScrapeQueue::channel();

        let params = MemberCreateParams { name: "".into(), url: "testuser".into() };
        assert!(create_impl(&store, &queue, params).await.is_err());
    }

    #[tokio::test]
    async fn test_update_resets_status_and_enqueues() {
        let store = MemberStore::open_in_memory().await.unwrap();
        let (queue, mut rx) = ScrapeQueue::channel();
        let created = store.create_member("Ada", "testuser").await.unwrap();
        store.set_scraping_status(created.id, ScrapingStatus::Processing).await.unwrap();
        store.set_scraping_status(created.id, ScrapingStatus::Failed).await.unwrap();

        let params = MemberUpdateParams { id: created.id, name: None, url: Some("other".into()) };
        let result = update_impl(&store, &queue, params).await.unwrap();
        let member: Member = serde_json::from_str(&text_of(&result)).unwrap();

        assert_eq!(member.url, "other");
        assert_eq!(member.scraping_status, ScrapingStatus::Pending);
        assert_eq!(rx.try_recv().unwrap(), created.id);
    }

    #[tokio::test]
    async fn test_update_requires_a_change() {
        let store = MemberStore::open_in_memory().await.unwrap();
        let (queue, _rx) = ScrapeQueue::channel();
        let created = store.create_member("Ada", "testuser").await.unwrap();

        let params = MemberUpdateParams { id: created.id, name: None, url: None };
        let err = update_impl(&store, &queue, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn test_update_missing_member() {
        let store = MemberStore::open_in_memory().await.unwrap();
        let (queue, mut rx) = ScrapeQueue::channel();

        let params = MemberUpdateParams { id: 99, name: Some("x".into()), url: None };
        let err = update_impl(&store, &queue, params).await.unwrap_err();

        assert_eq!(err.code.0, -32001);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_list_and_get() {
        let store = MemberStore::open_in_memory().await.unwrap();
        let ada = store.create_member("Ada", "ada").await.unwrap();
        store.create_member("Bob", "bob").await.unwrap();

        let result = list_impl(&store, MemberListParams::default()).await.unwrap();
        let output: MemberListOutput = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(output.count, 2);

        let result = get_impl(&store, MemberIdParams { id: ada.id }).await.unwrap();
        let member: Member = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(member.name, "Ada");

        let err = get_impl(&store, MemberIdParams { id: 404 }).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemberStore::open_in_memory().await.unwrap();
        let ada = store.create_member("Ada", "ada").await.unwrap();

        assert!(delete_impl(&store, MemberIdParams { id: ada.id }).await.is_ok());
        assert!(store.get_member(ada.id).await.unwrap().is_none());
        assert!(delete_impl(&store, MemberIdParams { id: ada.id }).await.is_err());
    }
}
