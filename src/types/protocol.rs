//! Wire data transfer objects for the primitives and results exchanged
//! once a session is active (spec.md §3 Data Model).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::jsonrpc::RequestId;

/// Identifies a peer in `initialize` — `clientInfo`/`serverInfo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Implementation {
    /// Implementation name.
    pub name: String,
    /// Implementation version string.
    pub version: String,
}

/// `initialize` request params.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// The protocol version the client wants to use.
    pub protocol_version: String,
    /// Capabilities the client advertises.
    pub capabilities: super::capabilities::ClientCapabilities,
    /// The connecting client's identity.
    pub client_info: Implementation,
}

/// `initialize` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// The protocol version the server negotiated (spec.md §4.2).
    pub protocol_version: String,
    /// Capabilities the server advertises.
    pub capabilities: super::capabilities::ServerCapabilities,
    /// The server's identity.
    pub server_info: Implementation,
    /// Freeform usage guidance for the connecting client.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// A conversational role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System-authored content (instructions, context).
    System,
    /// User-authored content.
    User,
    /// Assistant-authored content.
    Assistant,
}

/// A unit of content carried in prompt messages, tool results, and
/// resource reads. Discriminated on the wire by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    /// Plain text.
    Text {
        /// The text itself.
        text: String,
        /// Client display hints.
        #[serde(skip_serializing_if = "Option::is_none")]
        annotations: Option<Value>,
    },
    /// Inline base64-encoded image data.
    Image {
        /// Base64-encoded image bytes.
        data: String,
        /// The image's MIME type, e.g. `"image/png"`.
        mime_type: String,
        /// Client display hints.
        #[serde(skip_serializing_if = "Option::is_none")]
        annotations: Option<Value>,
    },
    /// Inline base64-encoded audio data.
    Audio {
        /// Base64-encoded audio bytes.
        data: String,
        /// The audio's MIME type, e.g. `"audio/wav"`.
        mime_type: String,
        /// Client display hints.
        #[serde(skip_serializing_if = "Option::is_none")]
        annotations: Option<Value>,
    },
    /// An embedded resource, e.g. a file a tool call produced.
    Resource {
        /// The resource's contents.
        resource: ResourceContents,
        /// Client display hints.
        #[serde(skip_serializing_if = "Option::is_none")]
        annotations: Option<Value>,
    },
}

impl Content {
    /// Build a [`Content::Text`] with no annotations.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            annotations: None,
        }
    }
}

/// The contents of a resource: a bespoke tagged union discriminated by
/// field presence (`text` vs `blob`), distinct from [`Content`] since a
/// resource read can return either shape without the `type` tag
/// `Content` uses (spec.md §4.1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceContents {
    /// Textual resource contents.
    Text {
        /// The resource's URI.
        uri: String,
        /// The resource's MIME type, if known.
        #[serde(skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        /// The text itself.
        text: String,
    },
    /// Binary resource contents, base64-encoded.
    Blob {
        /// The resource's URI.
        uri: String,
        /// The resource's MIME type, if known.
        #[serde(skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        /// Base64-encoded bytes.
        blob: String,
    },
}

/// Behavioral hints about a tool, advisory only — never enforced by the
/// runtime itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolAnnotations {
    /// A human-friendly title, distinct from `name`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Hints that the tool only reads, never writes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only_hint: Option<bool>,
    /// Hints that the tool may perform destructive updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destructive_hint: Option<bool>,
    /// Hints that repeated identical calls are safe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotent_hint: Option<bool>,
    /// Hints that the tool interacts with state outside the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_world_hint: Option<bool>,
}

/// A callable tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// The tool's unique name within a registry.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// A JSON Schema for the tool's arguments. `inputSchema.type` MUST
    /// equal `"object"` (spec.md §3) — enforced by
    /// [`Tool::with_input_schema`], not by this type alone, since the
    /// value arrives as arbitrary JSON off the wire too.
    pub input_schema: Value,
    /// Advisory behavioral hints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<ToolAnnotations>,
}

impl Tool {
    /// Build a tool, rejecting an `input_schema` whose `type` is not
    /// `"object"`.
    pub fn with_input_schema(
        name: impl Into<String>,
        description: Option<String>,
        input_schema: Value,
    ) -> crate::error::Result<Self> {
        let is_object_schema = input_schema
            .get("type")
            .and_then(Value::as_str)
            .map(|t| t == "object")
            .unwrap_or(false);
        if !is_object_schema {
            return Err(crate::error::Error::invalid_params(
                "tool inputSchema.type must be \"object\"",
            ));
        }
        Ok(Self {
            name: name.into(),
            description,
            input_schema,
            annotations: None,
        })
    }
}

/// A single prompt argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptArgument {
    /// Argument name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the argument must be supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

/// A reusable prompt template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    /// The prompt's unique name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Arguments the prompt template accepts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<PromptArgument>>,
}

/// A single message within a resolved prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    /// The author role.
    pub role: Role,
    /// The message content.
    pub content: Content,
}

/// A concrete, addressable resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// The resource's URI.
    pub uri: String,
    /// Human-readable name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// MIME type, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Size in bytes, if known ahead of a read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Client display hints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Value>,
}

/// A parameterized resource template (e.g. `file:///{path}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTemplate {
    /// The URI template, per RFC 6570.
    pub uri_template: String,
    /// Human-readable name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// MIME type, if every expansion shares one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Client display hints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Value>,
}

/// A page of results with an opaque continuation cursor (spec.md §3,
/// §4.6). Concrete list results below name their item array per MCP
/// wire convention (`tools`, `prompts`, ...) rather than a generic
/// `items` field, but all share this shape.
pub trait PaginatedResult {
    /// The item type of this page.
    type Item;

    /// The opaque cursor for the next page, if more results remain.
    fn next_cursor(&self) -> Option<&str>;

    /// The items on this page.
    fn items(&self) -> &[Self::Item];
}

/// Result of `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListToolsResult {
    /// The tools on this page, already filtered by the authorization
    /// pipeline's `shouldIncludeTool` pass.
    pub tools: Vec<Tool>,
    /// Opaque cursor for the next page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl PaginatedResult for ListToolsResult {
    type Item = Tool;

    fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref()
    }

    fn items(&self) -> &[Tool] {
        &self.tools
    }
}

/// Result of `prompts/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPromptsResult {
    /// The prompts on this page.
    pub prompts: Vec<Prompt>,
    /// Opaque cursor for the next page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl PaginatedResult for ListPromptsResult {
    type Item = Prompt;

    fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref()
    }

    fn items(&self) -> &[Prompt] {
        &self.prompts
    }
}

/// Result of `resources/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResourcesResult {
    /// The resources on this page.
    pub resources: Vec<Resource>,
    /// Opaque cursor for the next page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl PaginatedResult for ListResourcesResult {
    type Item = Resource;

    fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref()
    }

    fn items(&self) -> &[Resource] {
        &self.resources
    }
}

/// Result of `resources/templates/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResourceTemplatesResult {
    /// The resource templates on this page.
    pub resource_templates: Vec<ResourceTemplate>,
    /// Opaque cursor for the next page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl PaginatedResult for ListResourceTemplatesResult {
    type Item = ResourceTemplate;

    fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref()
    }

    fn items(&self) -> &[ResourceTemplate] {
        &self.resource_templates
    }
}

/// Result of `tools/call` — the spec's resolved collapse of
/// `CallToolResult`/`CallToolResponse` into one type (spec.md §9).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// The tool's output content.
    pub content: Vec<Content>,
    /// Whether the tool call itself failed (as opposed to the
    /// authorization/dispatch layer rejecting it before the handler
    /// ran).
    #[serde(default)]
    pub is_error: bool,
}

impl ToolCallResult {
    /// A successful result from a single text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::text(text)],
            is_error: false,
        }
    }

    /// A failed result from a single text block describing the error.
    pub fn error_text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::text(text)],
            is_error: true,
        }
    }
}

/// Result of `prompts/get`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPromptResult {
    /// Human-readable description of the resolved prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The resolved message sequence.
    pub messages: Vec<PromptMessage>,
}

/// Result of `resources/read`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResourceResult {
    /// The resource's contents — one entry per URI fragment the server
    /// chose to return (most resources yield exactly one).
    pub contents: Vec<ResourceContents>,
}

/// Severity level for `notifications/message`, ordered ascending so
/// `level >= threshold` comparisons work with derived `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Finest-grained diagnostic detail.
    Trace,
    /// Debug-level detail.
    Debug,
    /// Informational messages.
    Info,
    /// Normal but significant events.
    Notice,
    /// Warning conditions.
    Warning,
    /// Error conditions.
    Error,
    /// Critical conditions.
    Critical,
    /// Action must be taken immediately.
    Alert,
    /// The system is unusable.
    Emergency,
    /// Logging is disabled entirely.
    Off,
}

/// `notifications/message` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogMessage {
    /// The message's severity.
    pub level: LogLevel,
    /// An optional logger name/component tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logger: Option<String>,
    /// The log payload, arbitrary structured data.
    pub data: Value,
}

/// `notifications/cancelled` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelledNotification {
    /// The request being cancelled.
    pub request_id: RequestId,
    /// Human-readable reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A progress token: either a string or integer, carried in a request's
/// `_meta.progressToken` and echoed back in progress notifications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProgressToken {
    /// Numeric token.
    Number(i64),
    /// String token.
    String(String),
}

/// `notifications/progress` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressNotification {
    /// The token correlating this notification to an in-flight request.
    pub progress_token: ProgressToken,
    /// Progress so far, in implementation-defined units.
    pub progress: f64,
    /// The total, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    /// A human-readable status message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `notifications/resources/updated` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceUpdatedNotification {
    /// The resource whose contents changed.
    pub uri: String,
}

/// `*/list_changed` payloads carry no fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListChangedNotification {}

/// `completion/complete` request params.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteParams {
    /// What is being completed: a prompt argument or resource URI
    /// template variable.
    #[serde(rename = "ref")]
    pub reference: CompletionReference,
    /// The argument name and partial value being completed.
    pub argument: CompletionArgument,
}

/// What a completion request is resolving against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CompletionReference {
    /// Completing an argument of a named prompt.
    Prompt {
        /// The prompt's name.
        name: String,
    },
    /// Completing a resource template variable.
    ResourceTemplate {
        /// The template's URI.
        uri: String,
    },
}

/// A single argument being completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionArgument {
    /// Argument name.
    pub name: String,
    /// Partial value typed so far.
    pub value: String,
}

/// Result of `completion/complete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteResult {
    /// Candidate completions.
    pub completion: CompletionValues,
}

/// The completion candidate list and whether more exist beyond it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionValues {
    /// Candidate completion values, implementation-capped.
    pub values: Vec<String>,
    /// Total candidates available, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Whether more candidates exist beyond `values`.
    #[serde(default)]
    pub has_more: bool,
}

/// Per-call metadata threaded alongside request params — currently just
/// the progress token, per spec.md §3. Stored as `HashMap` rather than
/// a fixed struct since `_meta` is explicitly extensible on the wire.
pub type Meta = HashMap<String, Value>;

/// A filesystem (or other URI-addressable) root a client exposes to the
/// server, returned from `roots/list` (spec.md §6.1, server→client).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Root {
    /// The root's URI, e.g. `"file:///home/user/project"`.
    pub uri: String,
    /// A human-readable display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Result of `roots/list`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRootsResult {
    /// The client's current roots.
    pub roots: Vec<Root>,
}

/// A single message in a sampling request's conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingMessage {
    /// The message's author.
    pub role: Role,
    /// The message's content.
    pub content: Content,
}

/// A hint toward a preferred model family, by substring match against
/// the name a host's sampling handler ultimately picks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelHint {
    /// A model name or family hint, e.g. `"claude"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Priority weighting a server attaches to a `sampling/createMessage`
/// request, each in `[0, 1]`; the embedder's sampling handler decides
/// how (or whether) to honor them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPreferences {
    /// Ordered model-family hints, most preferred first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<Vec<ModelHint>>,
    /// How much to weight low cost.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_priority: Option<f64>,
    /// How much to weight low latency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_priority: Option<f64>,
    /// How much to weight output quality.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intelligence_priority: Option<f64>,
}

/// How much of the MCP session's context a sampling request wants
/// folded into the prompt; the embedder's handler interprets this.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IncludeContext {
    /// No MCP context.
    #[default]
    None,
    /// Context from the requesting server only.
    ThisServerOnly,
    /// Context aggregated across every connected server.
    AllServers,
}

/// `sampling/createMessage` request params (server→client).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageParams {
    /// The conversation to sample a completion for.
    pub messages: Vec<SamplingMessage>,
    /// Optional model selection guidance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_preferences: Option<ModelPreferences>,
    /// Optional system prompt override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// How much MCP context to fold in.
    #[serde(default)]
    pub include_context: IncludeContext,
    /// Sampling temperature, if the handler supports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sequences that should stop generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
}

/// Result of `sampling/createMessage` (spec.md §6.1: `{role, content,
/// model, stopReason?}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageResult {
    /// The role the generated message was authored under — always
    /// [`Role::Assistant`] in practice, kept explicit for wire symmetry
    /// with [`SamplingMessage`].
    pub role: Role,
    /// The generated content.
    pub content: Content,
    /// The model that actually produced the completion, which may
    /// differ from anything named in `model_preferences`.
    pub model: String,
    /// Why generation stopped, if the handler reports one (e.g.
    /// `"endTurn"`, `"maxTokens"`, `"stopSequence"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn log_level_ordering_matches_severity() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warning < LogLevel::Error);
        assert!(LogLevel::Emergency < LogLevel::Off);
    }

    #[test]
    fn tool_rejects_non_object_schema() {
        let err = Tool::with_input_schema("x", None, json!({"type": "string"})).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::INVALID_PARAMS);
    }

    #[test]
    fn tool_accepts_object_schema() {
        let tool = Tool::with_input_schema("x", None, json!({"type": "object"})).unwrap();
        assert_eq!(tool.name, "x");
    }

    #[test]
    fn resource_contents_discriminates_text_vs_blob() {
        let text: ResourceContents =
            serde_json::from_value(json!({"uri": "file:///a", "text": "hi"})).unwrap();
        assert!(matches!(text, ResourceContents::Text { .. }));

        let blob: ResourceContents =
            serde_json::from_value(json!({"uri": "file:///b", "blob": "AAAA"})).unwrap();
        assert!(matches!(blob, ResourceContents::Blob { .. }));
    }

    #[test]
    fn content_tag_round_trips() {
        let content = Content::text("hello");
        let value = serde_json::to_value(&content).unwrap();
        assert_eq!(value["type"], "text");
        let back: Content = serde_json::from_value(value).unwrap();
        assert_eq!(content, back);
    }

    #[test]
    fn list_tools_result_paginated_result_impl() {
        let result = ListToolsResult {
            tools: vec![Tool::with_input_schema("a", None, json!({"type":"object"})).unwrap()],
            next_cursor: Some("1".to_string()),
        };
        assert_eq!(result.items().len(), 1);
        assert_eq!(result.next_cursor(), Some("1"));
    }
}
