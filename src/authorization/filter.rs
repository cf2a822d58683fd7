//! The `ToolFilter` trait: one link in the authorization chain (spec.md
//! §4.8).

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::context::ToolAuthorizationContext;
use super::result::AuthorizationResult;

/// A single filter in the tool authorization pipeline.
///
/// Filters are evaluated in ascending priority order (lower numbers
/// first — spec.md §9 fixes this direction). Both methods take the
/// same cancellation token and honor it identically: a cancelled token
/// should make the filter return promptly rather than complete its
/// check, per spec.md §9's resolved open question that `filterTools`
/// and `authorizeToolExecution` share cancellation semantics.
#[async_trait]
pub trait ToolFilter: Send + Sync {
    /// Priority this filter is evaluated at. Lower runs earlier. Ties
    /// break by registration order (the service is responsible for
    /// this, not the filter).
    fn priority(&self) -> i32;

    /// A short name for diagnostics and synthetic deny reasons on
    /// filter panics/errors (e.g. `"Filter error: {filter_type_name}"`).
    fn filter_type_name(&self) -> &str;

    /// Whether `tool_name` should appear in a `tools/list` response for
    /// `ctx`. A `false` here silently drops the tool from the listing —
    /// it is not an error condition.
    async fn should_include_tool(
        &self,
        ctx: &ToolAuthorizationContext,
        tool_name: &str,
        cancellation: &CancellationToken,
    ) -> bool;

    /// Whether `ctx` may execute `tool_name` right now. A denial here
    /// surfaces as a JSON-RPC `InvalidParams` error, optionally carrying
    /// a [`super::challenge::AuthorizationChallenge`].
    async fn can_execute_tool(
        &self,
        ctx: &ToolAuthorizationContext,
        tool_name: &str,
        cancellation: &CancellationToken,
    ) -> AuthorizationResult;
}
