//! `ToolFilterAggregator` — a filter that delegates to a whole
//! [`ToolAuthorizationService`], for composing one service as a single
//! link inside another (spec.md §4.8).

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::context::ToolAuthorizationContext;
use super::filter::ToolFilter;
use super::result::AuthorizationResult;
use super::service::ToolAuthorizationService;

/// Adapts an entire [`ToolAuthorizationService`] into a single
/// [`ToolFilter`], so a host can nest one authorization pipeline inside
/// another (e.g. a shared organization-wide service composed alongside
/// per-deployment filters).
///
/// Always evaluated first: its priority is `i32::MIN`, the pipeline's
/// −∞ per spec.md §9. If this aggregator is itself registered into the
/// service it wraps, it excludes itself (by `Arc` identity, not type)
/// from the delegated evaluation to avoid recursing into itself
/// forever.
pub struct ToolFilterAggregator {
    inner: Arc<ToolAuthorizationService>,
    self_ref: Weak<dyn ToolFilter>,
}

impl ToolFilterAggregator {
    /// Wrap `inner` as a filter. Returns an `Arc` because the aggregator
    /// must know its own identity (via a weak back-reference) before it
    /// can exclude itself from `inner`'s snapshot.
    pub fn new(inner: Arc<ToolAuthorizationService>) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let self_ref: Weak<dyn ToolFilter> = weak.clone() as Weak<dyn ToolFilter>;
            Self { inner, self_ref }
        })
    }
}

#[async_trait]
impl ToolFilter for ToolFilterAggregator {
    fn priority(&self) -> i32 {
        i32::MIN
    }

    fn filter_type_name(&self) -> &str {
        "ToolFilterAggregator"
    }

    async fn should_include_tool(
        &self,
        ctx: &ToolAuthorizationContext,
        tool_name: &str,
        cancellation: &CancellationToken,
    ) -> bool {
        let exclude = self.self_ref.upgrade();
        let names = vec![tool_name.to_string()];
        // `ToolFilter` has no way to surface a cancellation error of its
        // own, so a cancellation observed only inside the delegated
        // service (the outer pipeline already checks the same token
        // before calling into this filter at all) fails closed here,
        // the same as a panicking filter does.
        match self
            .inner
            .filter_tools_excluding(ctx, &names, cancellation, exclude.as_ref())
            .await
        {
            Ok(included) => !included.is_empty(),
            Err(_) => false,
        }
    }

    async fn can_execute_tool(
        &self,
        ctx: &ToolAuthorizationContext,
        tool_name: &str,
        cancellation: &CancellationToken,
    ) -> AuthorizationResult {
        let exclude = self.self_ref.upgrade();
        match self
            .inner
            .authorize_tool_execution_excluding(ctx, tool_name, cancellation, exclude.as_ref())
            .await
        {
            Ok(result) => result,
            Err(_) => AuthorizationResult::deny("cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authorization::filter::ToolFilter as _;

    struct DenyAll;

    #[async_trait]
    impl ToolFilter for DenyAll {
        fn priority(&self) -> i32 {
            0
        }

        fn filter_type_name(&self) -> &str {
            "DenyAll"
        }

        async fn should_include_tool(
            &self,
            _ctx: &ToolAuthorizationContext,
            _tool_name: &str,
            _cancellation: &CancellationToken,
        ) -> bool {
            false
        }

        async fn can_execute_tool(
            &self,
            _ctx: &ToolAuthorizationContext,
            _tool_name: &str,
            _cancellation: &CancellationToken,
        ) -> AuthorizationResult {
            AuthorizationResult::deny("denied by DenyAll")
        }
    }

    #[tokio::test]
    async fn aggregator_delegates_to_inner_service() {
        let inner = Arc::new(ToolAuthorizationService::new());
        inner.register(Arc::new(DenyAll));
        let aggregator = ToolFilterAggregator::new(Arc::clone(&inner));

        let ctx = ToolAuthorizationContext::new("s1");
        let token = CancellationToken::new();
        let included = aggregator
            .should_include_tool(&ctx, "any_tool", &token)
            .await;
        assert!(!included);

        let result = aggregator.can_execute_tool(&ctx, "any_tool", &token).await;
        assert!(!result.is_authorized);
    }

    #[tokio::test]
    async fn aggregator_excludes_itself_when_registered_into_its_own_service() {
        let service = Arc::new(ToolAuthorizationService::new());
        let aggregator = ToolFilterAggregator::new(Arc::clone(&service));
        // Registering the aggregator into the very service it wraps
        // would recurse without self-exclusion.
        service.register(aggregator.clone());

        let ctx = ToolAuthorizationContext::new("s1");
        let token = CancellationToken::new();
        // No other filters registered, so delegating (minus itself)
        // allows everything — this call must return promptly rather
        // than recursing.
        let result = aggregator.can_execute_tool(&ctx, "any_tool", &token).await;
        assert!(result.is_authorized);
    }
}
