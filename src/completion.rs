//! Argument completion (C9, spec.md §4.9): `completion/complete`.
//!
//! This crate validates that a completion request targets a prompt or
//! resource template that actually exists, then delegates candidate
//! generation to an embedder-supplied [`CompletionProvider`] — ranking
//! and filtering candidates is inherently domain-specific and out of
//! scope here, the same way tool/prompt/resource handlers themselves
//! are embedder-supplied.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::types::protocol::{CompletionArgument, CompletionReference, CompletionValues};

/// Maximum number of completion candidates returned in one response,
/// per spec.md §4.9. Providers may return more; the dispatcher
/// truncates and forces `has_more`.
pub const MAX_COMPLETION_VALUES: usize = 100;

/// Supplies completion candidates for a validated reference/argument
/// pair.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Return candidate completions for `argument` on `reference`.
    async fn complete(
        &self,
        reference: &CompletionReference,
        argument: &CompletionArgument,
    ) -> Result<CompletionValues>;
}

/// Lets a type-erased `Arc<dyn CompletionProvider>` stand in for a
/// concrete provider, so a non-generic host (e.g. `Server`) can hold a
/// [`CompletionDispatcher`] over whatever provider it was configured
/// with.
#[async_trait]
impl CompletionProvider for Arc<dyn CompletionProvider> {
    async fn complete(
        &self,
        reference: &CompletionReference,
        argument: &CompletionArgument,
    ) -> Result<CompletionValues> {
        (**self).complete(reference, argument).await
    }
}

/// Validates a completion reference against known prompt names and
/// resource template URIs before delegating to a [`CompletionProvider`].
pub struct CompletionDispatcher<P: CompletionProvider> {
    provider: P,
}

impl<P: CompletionProvider> CompletionDispatcher<P> {
    /// Build a dispatcher wrapping `provider`.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Handle `completion/complete`, rejecting references to unknown
    /// prompts/templates with [`Error::invalid_params`] before the
    /// provider is ever consulted.
    pub async fn complete(
        &self,
        reference: CompletionReference,
        argument: CompletionArgument,
        known_prompt_names: &[String],
        known_template_uris: &[String],
    ) -> Result<CompletionValues> {
        match &reference {
            CompletionReference::Prompt { name } => {
                if !known_prompt_names.iter().any(|n| n == name) {
                    return Err(Error::invalid_params(format!("unknown prompt '{name}'")));
                }
            },
            CompletionReference::ResourceTemplate { uri } => {
                if !known_template_uris.iter().any(|u| u == uri) {
                    return Err(Error::invalid_params(format!(
                        "unknown resource template '{uri}'"
                    )));
                }
            },
        }
        let mut result = self.provider.complete(&reference, &argument).await?;
        if result.values.len() > MAX_COMPLETION_VALUES {
            result.values.truncate(MAX_COMPLETION_VALUES);
            result.has_more = true;
        }
        Ok(result)
    }
}
