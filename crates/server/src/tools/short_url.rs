//! short_url_resolve tool implementation.
//!
//! Resolves the code at the end of a member's short url back to the profile
//! url it redirects to.

use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use roster_core::{Error, MemberStore};

use super::json_result;

/// Input parameters for short_url_resolve tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ShortUrlResolveParams {
    /// The short code, or a full short url ending in one.
    pub code: String,
}

/// Output structure for short_url_resolve tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ShortUrlResolveOutput {
    pub member_id: i64,
    /// Redirect target: the member's stored url.
    pub url: String,
}

/// Implementation of the short_url_resolve tool.
pub async fn resolve_impl(store: &MemberStore, params: ShortUrlResolveParams) -> Result<CallToolResult, McpError> {
    let code = params.code.trim().trim_end_matches('/');
    let code = code.rsplit('/').next().unwrap_or(code);
    if code.is_empty() {
        return Err(Error::InvalidInput("code cannot be empty".into()).into());
    }

    let member = store
        .find_by_short_code(code)
        .await?
        .filter(|m| !m.url.is_empty())
        .ok_or_else(|| Error::ShortCode("invalid URL".into()))?;

    let output = ShortUrlResolveOutput { member_id: member.id, url: member.url };
    Ok(json_result(&output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::result_text;

    #[tokio::test]
    async fn test_resolve_code() {
        let store = MemberStore::open_in_memory().await.unwrap();
        let member = store.create_member("Ada", "https://github.com/ada").await.unwrap();
        let code = store.codec().encode(member.id).unwrap();

        let result = resolve_impl(&store, ShortUrlResolveParams { code }).await.unwrap();
        let output: ShortUrlResolveOutput = serde_json::from_str(&result_text(&result)).unwrap();

        assert_eq!(output.member_id, member.id);
        assert_eq!(output.url, "https://github.com/ada");
    }

    #[tokio::test]
    async fn test_resolve_full_short_url() {
        let store = MemberStore::open_in_memory().await.unwrap();
        let member = store.create_member("Ada", "ada").await.unwrap();
        let short_url = member.short_url.clone().unwrap();

        let result = resolve_impl(&store, ShortUrlResolveParams { code: short_url }).await.unwrap();
        let output: ShortUrlResolveOutput = serde_json::from_str(&result_text(&result)).unwrap();
        assert_eq!(output.url, "ada");
    }

    #[tokio::test]
    async fn test_resolve_deleted_member() {
        let store = MemberStore::open_in_memory().await.unwrap();
        let member = store.create_member("Ada", "ada").await.unwrap();
        let code = store.codec().encode(member.id).unwrap();
        store.delete_member(member.id).await.unwrap();

        let err = resolve_impl(&store, ShortUrlResolveParams { code }).await.unwrap_err();
        assert_eq!(err.code.0, -32004);
    }

    #[tokio::test]
    async fn test_resolve_garbage() {
        let store = MemberStore::open_in_memory().await.unwrap();

        let err = resolve_impl(&store, ShortUrlResolveParams { code: "!!".into() }).await.unwrap_err();
        assert_eq!(err.code.0, -32004);

        let err = resolve_impl(&store, ShortUrlResolveParams { code: "  ".into() }).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }
}
