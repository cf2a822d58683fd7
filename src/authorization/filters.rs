//! Concrete filters (SPEC_FULL.md §C): ready-made building blocks for
//! common authorization policies, built on [`super::filter::ToolFilter`]
//! rather than left for every embedder to reimplement.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::context::ToolAuthorizationContext;
use super::filter::ToolFilter;
use super::result::AuthorizationResult;

/// Matches a tool name against a glob pattern (e.g. `admin_*`).
///
/// Falls back to a literal comparison if `pattern` isn't a valid glob,
/// rather than denying or panicking on a malformed filter configuration.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    match glob::Pattern::new(pattern) {
        Ok(compiled) => compiled.matches(name),
        Err(_) => pattern == name,
    }
}

/// A filter that always allows — the convenience default so a fresh
/// [`super::service::ToolAuthorizationService`] starts permissive.
/// Sorts last (`i32::MAX`, the "allow-all has priority +∞" convention).
pub struct AllowAllFilter;

#[async_trait]
impl ToolFilter for AllowAllFilter {
    fn priority(&self) -> i32 {
        i32::MAX
    }

    fn filter_type_name(&self) -> &str {
        "AllowAllFilter"
    }

    async fn should_include_tool(
        &self,
        _ctx: &ToolAuthorizationContext,
        _tool_name: &str,
        _cancellation: &CancellationToken,
    ) -> bool {
        true
    }

    async fn can_execute_tool(
        &self,
        _ctx: &ToolAuthorizationContext,
        _tool_name: &str,
        _cancellation: &CancellationToken,
    ) -> AuthorizationResult {
        AuthorizationResult::allow()
    }
}

/// Excludes/denies tools whose name matches a glob pattern, e.g. hiding
/// every `admin_*` tool from callers that shouldn't see them at all.
pub struct ToolNamePatternFilter {
    priority: i32,
    pattern: String,
}

impl ToolNamePatternFilter {
    /// Build a filter that denies tools matching `pattern` at `priority`.
    pub fn new(priority: i32, pattern: impl Into<String>) -> Self {
        Self {
            priority,
            pattern: pattern.into(),
        }
    }
}

#[async_trait]
impl ToolFilter for ToolNamePatternFilter {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn filter_type_name(&self) -> &str {
        "ToolNamePatternFilter"
    }

    async fn should_include_tool(
        &self,
        _ctx: &ToolAuthorizationContext,
        tool_name: &str,
        _cancellation: &CancellationToken,
    ) -> bool {
        !glob_match(&self.pattern, tool_name)
    }

    async fn can_execute_tool(
        &self,
        _ctx: &ToolAuthorizationContext,
        tool_name: &str,
        _cancellation: &CancellationToken,
    ) -> AuthorizationResult {
        if glob_match(&self.pattern, tool_name) {
            AuthorizationResult::deny(format!("Tool matches restricted pattern '{}'", self.pattern))
        } else {
            AuthorizationResult::allow()
        }
    }
}

/// Requires `required_role` to list or execute any tool matching
/// `tool_pattern`; tools that don't match pass through unaffected.
pub struct RoleRequiredFilter {
    priority: i32,
    tool_pattern: String,
    required_role: String,
}

impl RoleRequiredFilter {
    /// Build a filter gating tools matching `tool_pattern` behind
    /// `required_role`.
    pub fn new(priority: i32, tool_pattern: impl Into<String>, required_role: impl Into<String>) -> Self {
        Self {
            priority,
            tool_pattern: tool_pattern.into(),
            required_role: required_role.into(),
        }
    }
}

#[async_trait]
impl ToolFilter for RoleRequiredFilter {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn filter_type_name(&self) -> &str {
        "RoleRequiredFilter"
    }

    async fn should_include_tool(
        &self,
        ctx: &ToolAuthorizationContext,
        tool_name: &str,
        _cancellation: &CancellationToken,
    ) -> bool {
        if !glob_match(&self.tool_pattern, tool_name) {
            return true;
        }
        ctx.has_role(&self.required_role)
    }

    async fn can_execute_tool(
        &self,
        ctx: &ToolAuthorizationContext,
        tool_name: &str,
        _cancellation: &CancellationToken,
    ) -> AuthorizationResult {
        if !glob_match(&self.tool_pattern, tool_name) {
            return AuthorizationResult::allow();
        }
        if ctx.has_role(&self.required_role) {
            AuthorizationResult::allow()
        } else {
            AuthorizationResult::deny(format!("Requires role '{}'", self.required_role))
        }
    }
}
