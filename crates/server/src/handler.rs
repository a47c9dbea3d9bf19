//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::tools::{
    MemberCreateParams, MemberIdParams, MemberListParams, MemberUpdateParams, ShortUrlResolveParams, members,
    short_url,
};

use roster_core::{MemberStore, ScrapeQueue};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for the member roster.
#[derive(Clone)]
pub struct RosterServer {
    tool_router: ToolRouter<Self>,
    store: MemberStore,
    queue: ScrapeQueue,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl RosterServer {
    /// Create a new server handler over an open store and a running scrape queue.
    pub fn new(store: MemberStore, queue: ScrapeQueue) -> Self {
        Self { tool_router: Self::tool_router(), store, queue }
    }

    #[tool(description = "List every member of the roster with their scraped GitHub statistics.")]
    async fn member_list(&self, params: Parameters<MemberListParams>) -> Result<CallToolResult, McpError> {
        members::list_impl(&self.store, params.0).await
    }

    #[tool(description = "Get one member by id, including scraping status and short url.")]
    async fn member_get(&self, params: Parameters<MemberIdParams>) -> Result<CallToolResult, McpError> {
        members::get_impl(&self.store, params.0).await
    }

    /// Add a member.
    ///
    /// The member is stored as pending and a profile scrape is scheduled in the background.
    #[tool(
        description = "Add a member by name and GitHub profile url (or bare username). Schedules a background profile scrape; poll member_get for the result."
    )]
    async fn member_create(&self, params: Parameters<MemberCreateParams>) -> Result<CallToolResult, McpError> {
        members::create_impl(&self.store, &self.queue, params.0).await
    }

    #[tool(description = "Change a member's name and/or url. Any successful update resets the member to pending and rescans.")]
    async fn member_update(&self, params: Parameters<MemberUpdateParams>) -> Result<CallToolResult, McpError> {
        members::update_impl(&self.store, &self.queue, params.0).await
    }

    #[tool(description = "Delete a member by id.")]
    async fn member_delete(&self, params: Parameters<MemberIdParams>) -> Result<CallToolResult, McpError> {
        members::delete_impl(&self.store, params.0).await
    }

    #[tool(description = "Resolve a member short code (or full short url) to the profile url it redirects to.")]
    async fn short_url_resolve(&self, params: Parameters<ShortUrlResolveParams>) -> Result<CallToolResult, McpError> {
        short_url::resolve_impl(&self.store, params.0).await
    }
}

impl ServerHandler for RosterServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "roster".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
