//! Capability structures exchanged during `initialize` (spec.md §4.2,
//! §4.3). A session may only invoke a method gated by a capability it
//! negotiated — otherwise the dispatcher SHOULD answer
//! `Error::method_not_found`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Capabilities the client advertises to the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCapabilities {
    /// The client can service `sampling/createMessage` requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampling: Option<SamplingCapabilities>,
    /// The client can service elicitation requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elicitation: Option<ElicitationCapabilities>,
    /// The client exposes `roots/list`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roots: Option<RootsCapabilities>,
    /// Non-standard, implementation-defined capabilities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experimental: Option<HashMap<String, serde_json::Value>>,
}

impl ClientCapabilities {
    /// No capabilities advertised.
    pub fn minimal() -> Self {
        Self::default()
    }

    /// Every standard client capability advertised.
    pub fn full() -> Self {
        Self {
            sampling: Some(SamplingCapabilities::default()),
            elicitation: Some(ElicitationCapabilities::default()),
            roots: Some(RootsCapabilities { list_changed: true }),
            experimental: None,
        }
    }

    /// `true` if `roots/list` may be invoked on this client.
    pub fn supports_roots(&self) -> bool {
        self.roots.is_some()
    }

    /// `true` if `sampling/createMessage` may be invoked on this client.
    pub fn supports_sampling(&self) -> bool {
        self.sampling.is_some()
    }

    /// `true` if elicitation requests may be sent to this client.
    pub fn supports_elicitation(&self) -> bool {
        self.elicitation.is_some()
    }
}

/// Capabilities the server advertises to the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCapabilities {
    /// The server exposes `tools/list` and `tools/call`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolCapabilities>,
    /// The server exposes `prompts/list` and `prompts/get`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompts: Option<PromptCapabilities>,
    /// The server exposes `resources/list`, `resources/read`, and
    /// optionally subscriptions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceCapabilities>,
    /// The server can emit `notifications/message` log events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingCapabilities>,
    /// The server exposes `completion/complete`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completions: Option<CompletionCapabilities>,
    /// Present on servers that can themselves issue `sampling/createMessage`
    /// back to a peer acting as both client and server (rare; kept for
    /// symmetry with [`ClientCapabilities`]).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampling: Option<SamplingCapabilities>,
    /// Non-standard, implementation-defined capabilities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experimental: Option<HashMap<String, serde_json::Value>>,
}

impl ServerCapabilities {
    /// No capabilities advertised.
    pub fn minimal() -> Self {
        Self::default()
    }

    /// Tools only, with `listChanged` advertised.
    pub fn tools_only() -> Self {
        Self {
            tools: Some(ToolCapabilities {
                list_changed: Some(true),
            }),
            ..Default::default()
        }
    }

    /// Resources only, with subscriptions and `listChanged` advertised.
    pub fn resources_only() -> Self {
        Self {
            resources: Some(ResourceCapabilities {
                subscribe: Some(true),
                list_changed: Some(true),
            }),
            ..Default::default()
        }
    }

    /// `true` if a `tools/*` request may be dispatched.
    pub fn provides_tools(&self) -> bool {
        self.tools.is_some()
    }

    /// `true` if a `prompts/*` request may be dispatched.
    pub fn provides_prompts(&self) -> bool {
        self.prompts.is_some()
    }

    /// `true` if a `resources/*` request may be dispatched.
    pub fn provides_resources(&self) -> bool {
        self.resources.is_some()
    }

    /// `true` if `resources/subscribe` and `resources/unsubscribe` may
    /// be dispatched.
    pub fn supports_subscriptions(&self) -> bool {
        self.resources
            .as_ref()
            .and_then(|r| r.subscribe)
            .unwrap_or(false)
    }
}

/// Tool-related capabilities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCapabilities {
    /// Whether `notifications/tools/list_changed` is emitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// Prompt-related capabilities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptCapabilities {
    /// Whether `notifications/prompts/list_changed` is emitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// Resource-related capabilities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCapabilities {
    /// Whether `resources/subscribe` is supported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribe: Option<bool>,
    /// Whether `notifications/resources/list_changed` is emitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// Logging capability: presence alone enables `notifications/message`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingCapabilities {}

/// Completion capability: presence alone enables `completion/complete`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionCapabilities {}

/// Sampling capabilities advertised by whichever peer can service
/// `sampling/createMessage`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingCapabilities {
    /// Supported model families/providers, if the peer wants to
    /// advertise them up front.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<String>>,
}

/// Elicitation capability: presence alone enables the client to be
/// asked for structured user input mid-session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElicitationCapabilities {}

/// Roots capability: whether the client emits
/// `notifications/roots/list_changed` when its root set changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootsCapabilities {
    /// Whether `notifications/roots/list_changed` is emitted.
    #[serde(default)]
    pub list_changed: bool,
}
