//! Embedder-supplied handlers the server dispatcher invokes once a call
//! has passed authorization.

use async_trait::async_trait;
use serde_json::Value;

use crate::authorization::ToolAuthorizationContext;
use crate::error::Result;
use crate::types::protocol::{GetPromptResult, ReadResourceResult, ToolCallResult};

/// Executes a single registered tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Run the tool against `arguments`, already validated to be a
    /// JSON object by the caller.
    async fn call(&self, arguments: Value, ctx: &ToolAuthorizationContext) -> Result<ToolCallResult>;
}

/// Resolves a single registered prompt template into messages.
#[async_trait]
pub trait PromptHandler: Send + Sync {
    /// Resolve the prompt with `arguments`.
    async fn get(&self, arguments: Value) -> Result<GetPromptResult>;
}

/// Reads a single registered resource (or one matching a template).
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// Read the resource at `uri`.
    async fn read(&self, uri: &str) -> Result<ReadResourceResult>;
}
