//! MCP tool implementations.
//!
//! This module contains all tools exposed by the roster server.

pub mod members;
pub mod short_url;

pub use members::{MemberCreateParams, MemberIdParams, MemberListParams, MemberUpdateParams};
pub use short_url::ShortUrlResolveParams;

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

/// Pretty JSON text result, the shape every tool returns.
pub(crate) fn json_result<T: Serialize>(output: &T) -> CallToolResult {
    CallToolResult::success(vec![Content::text(serde_json::to_string_pretty(output).unwrap_or_default())])
}

#[cfg(test)]
pub(crate) fn result_text(result: &CallToolResult) -> String {
    result
        .content
        .first()
        .and_then(|c| c.as_text())
        .map(|t| t.text.clone())
        .unwrap_or_default()
}
