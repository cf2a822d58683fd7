//! The ordered filter chain (spec.md §4.8 state machine:
//! `LookupTool → FilterCollectionSnapshot → IterateByPriority → Allow |
//! Deny | FilterException→Deny → ReturnResult`).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{Error, Result};

use super::context::ToolAuthorizationContext;
use super::filter::ToolFilter;
use super::result::AuthorizationResult;

struct Registered {
    seq: usize,
    filter: Arc<dyn ToolFilter>,
}

/// Holds a priority-ordered, concurrency-safe collection of
/// [`ToolFilter`]s and evaluates them for listing and execution
/// decisions.
///
/// Registration order breaks ties between filters of equal priority
/// (stable ordering), tracked via a monotonic sequence counter rather
/// than relying on insertion order of the backing collection, since the
/// lock is taken fresh on every snapshot.
pub struct ToolAuthorizationService {
    filters: RwLock<Vec<Registered>>,
    next_seq: AtomicUsize,
}

impl Default for ToolAuthorizationService {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolAuthorizationService {
    /// An empty service — with no filters registered, every tool is
    /// listed and every execution allowed.
    pub fn new() -> Self {
        Self {
            filters: RwLock::new(Vec::new()),
            next_seq: AtomicUsize::new(0),
        }
    }

    /// Register a filter. Returns the registration sequence number,
    /// useful for tests asserting tie-break order.
    pub fn register(&self, filter: Arc<dyn ToolFilter>) -> usize {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.filters.write().push(Registered { seq, filter });
        seq
    }

    fn snapshot(&self) -> Vec<Arc<dyn ToolFilter>> {
        self.snapshot_excluding(None)
    }

    /// Same as [`Self::snapshot`], but omits any filter whose data
    /// pointer matches `exclude` — used by [`super::aggregator::ToolFilterAggregator`]
    /// to keep itself out of its own delegated evaluation when it is
    /// registered into the same service it aggregates.
    pub(super) fn snapshot_excluding(
        &self,
        exclude: Option<&Arc<dyn ToolFilter>>,
    ) -> Vec<Arc<dyn ToolFilter>> {
        let guard = self.filters.read();
        let mut entries: Vec<(i32, usize, Arc<dyn ToolFilter>)> = guard
            .iter()
            .filter(|r| match exclude {
                Some(excluded) => !Arc::ptr_eq(excluded, &r.filter),
                None => true,
            })
            .map(|r| (r.filter.priority(), r.seq, Arc::clone(&r.filter)))
            .collect();
        drop(guard);
        entries.sort_by_key(|(priority, seq, _)| (*priority, *seq));
        entries.into_iter().map(|(_, _, filter)| filter).collect()
    }

    /// Run `should_include_tool` across every registered filter in
    /// priority order. Returns the subset to include; the first `false`
    /// (or filter panic, treated as fail-closed) excludes a tool from
    /// the result. Cancellation during evaluation raises
    /// [`Error::Cancelled`] rather than returning a partial list
    /// (spec.md §4.8).
    pub async fn filter_tools(
        &self,
        ctx: &ToolAuthorizationContext,
        tool_names: &[String],
        cancellation: &CancellationToken,
    ) -> Result<Vec<String>> {
        self.filter_tools_excluding(ctx, tool_names, cancellation, None)
            .await
    }

    /// Same as [`Self::filter_tools`], excluding the filter matching
    /// `exclude`'s data pointer, if given.
    pub(super) async fn filter_tools_excluding(
        &self,
        ctx: &ToolAuthorizationContext,
        tool_names: &[String],
        cancellation: &CancellationToken,
        exclude: Option<&Arc<dyn ToolFilter>>,
    ) -> Result<Vec<String>> {
        let filters = self.snapshot_excluding(exclude);
        let mut included = Vec::with_capacity(tool_names.len());
        for name in tool_names {
            if cancellation.is_cancelled() {
                return Err(Error::Cancelled);
            }
            if self.should_include(&filters, ctx, name, cancellation).await? {
                included.push(name.clone());
            }
        }
        Ok(included)
    }

    async fn should_include(
        &self,
        filters: &[Arc<dyn ToolFilter>],
        ctx: &ToolAuthorizationContext,
        tool_name: &str,
        cancellation: &CancellationToken,
    ) -> Result<bool> {
        for filter in filters {
            if cancellation.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let filter = Arc::clone(filter);
            let ctx = ctx.clone();
            let tool_name = tool_name.to_string();
            let token = cancellation.clone();
            let outcome = tokio::spawn(async move {
                filter.should_include_tool(&ctx, &tool_name, &token).await
            })
            .await;
            match outcome {
                Ok(true) => continue,
                Ok(false) => {
                    debug!(target: "mcp.authorization", tool = tool_name, "excluded by filter");
                    return Ok(false);
                },
                Err(join_err) => {
                    warn!(
                        target: "mcp.authorization",
                        tool = tool_name,
                        error = %join_err,
                        "filter panicked during should_include_tool; excluding fail-closed"
                    );
                    return Ok(false);
                },
            }
        }
        Ok(true)
    }

    /// Run `can_execute_tool` across every registered filter in
    /// priority order. The first denial (explicit or from a panicking
    /// filter) short-circuits and is returned; if every filter allows,
    /// an unconditional allow is returned. Cancellation during
    /// evaluation raises [`Error::Cancelled`] rather than a fabricated
    /// deny (spec.md §4.8).
    pub async fn authorize_tool_execution(
        &self,
        ctx: &ToolAuthorizationContext,
        tool_name: &str,
        cancellation: &CancellationToken,
    ) -> Result<AuthorizationResult> {
        self.authorize_tool_execution_excluding(ctx, tool_name, cancellation, None)
            .await
    }

    /// Same as [`Self::authorize_tool_execution`], excluding the filter
    /// matching `exclude`'s data pointer, if given.
    pub(super) async fn authorize_tool_execution_excluding(
        &self,
        ctx: &ToolAuthorizationContext,
        tool_name: &str,
        cancellation: &CancellationToken,
        exclude: Option<&Arc<dyn ToolFilter>>,
    ) -> Result<AuthorizationResult> {
        let filters = self.snapshot_excluding(exclude);
        for filter in &filters {
            if cancellation.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let filter_type = filter.filter_type_name().to_string();
            let filter = Arc::clone(filter);
            let ctx_clone = ctx.clone();
            let tool_name_owned = tool_name.to_string();
            let token = cancellation.clone();
            let outcome = tokio::spawn(async move {
                filter
                    .can_execute_tool(&ctx_clone, &tool_name_owned, &token)
                    .await
            })
            .await;
            match outcome {
                Ok(result) if !result.is_authorized => {
                    debug!(
                        target: "mcp.authorization",
                        tool = tool_name,
                        reason = result.reason.as_deref().unwrap_or(""),
                        "execution denied"
                    );
                    return Ok(result);
                },
                Ok(_) => continue,
                Err(join_err) => {
                    warn!(
                        target: "mcp.authorization",
                        tool = tool_name,
                        error = %join_err,
                        "filter panicked during can_execute_tool; denying fail-closed"
                    );
                    return Ok(AuthorizationResult::deny(format!("Filter error: {filter_type}")));
                },
            }
        }
        Ok(AuthorizationResult::allow_with_reason("All filters passed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct AlwaysAllow;

    #[async_trait]
    impl ToolFilter for AlwaysAllow {
        fn priority(&self) -> i32 {
            i32::MAX
        }

        fn filter_type_name(&self) -> &str {
            "AlwaysAllow"
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

    struct DenyNamed(&'static str);

    #[async_trait]
    impl ToolFilter for DenyNamed {
        fn priority(&self) -> i32 {
            0
        }

        fn filter_type_name(&self) -> &str {
            "DenyNamed"
        }

        async fn should_include_tool(
            &self,
            _ctx: &ToolAuthorizationContext,
            tool_name: &str,
            _cancellation: &CancellationToken,
        ) -> bool {
            tool_name != self.0
        }

        async fn can_execute_tool(
            &self,
            _ctx: &ToolAuthorizationContext,
            tool_name: &str,
            _cancellation: &CancellationToken,
        ) -> AuthorizationResult {
            if tool_name == self.0 {
                AuthorizationResult::deny("named deny")
            } else {
                AuthorizationResult::allow()
            }
        }
    }

    #[tokio::test]
    async fn empty_service_allows_everything() {
        let service = ToolAuthorizationService::new();
        let ctx = ToolAuthorizationContext::new("s1");
        let token = CancellationToken::new();
        let names = vec!["a".to_string(), "b".to_string()];
        let listed = service.filter_tools(&ctx, &names, &token).await.unwrap();
        assert_eq!(listed, names);
        let result = service
            .authorize_tool_execution(&ctx, "a", &token)
            .await
            .unwrap();
        assert!(result.is_authorized);
        assert_eq!(result.reason.as_deref(), Some("All filters passed"));
    }

    #[tokio::test]
    async fn deny_filter_excludes_and_denies_named_tool_only() {
        use pretty_assertions::assert_eq;

        let service = ToolAuthorizationService::new();
        service.register(Arc::new(DenyNamed("admin_reset")));
        service.register(Arc::new(AlwaysAllow));
        let ctx = ToolAuthorizationContext::new("s1");
        let token = CancellationToken::new();
        let names = vec!["admin_reset".to_string(), "read_file".to_string()];
        let listed = service.filter_tools(&ctx, &names, &token).await.unwrap();
        assert_eq!(listed, vec!["read_file".to_string()]);

        let denied = service
            .authorize_tool_execution(&ctx, "admin_reset", &token)
            .await
            .unwrap();
        assert!(!denied.is_authorized);
        let allowed = service
            .authorize_tool_execution(&ctx, "read_file", &token)
            .await
            .unwrap();
        assert!(allowed.is_authorized);
    }

    #[tokio::test]
    async fn cancellation_raises_error_instead_of_deny() {
        let service = ToolAuthorizationService::new();
        service.register(Arc::new(AlwaysAllow));
        let ctx = ToolAuthorizationContext::new("s1");
        let token = CancellationToken::new();
        token.cancel();

        let names = vec!["a".to_string()];
        let err = service
            .filter_tools(&ctx, &names, &token)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());

        let err = service
            .authorize_tool_execution(&ctx, "a", &token)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn registration_order_breaks_priority_ties() {
        let service = ToolAuthorizationService::new();
        let first = service.register(Arc::new(AlwaysAllow));
        let second = service.register(Arc::new(AlwaysAllow));
        assert!(first < second);
    }
}
