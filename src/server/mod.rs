//! Server-side request dispatcher: wires the session state machine
//! (C4), primitive registry (C5), subscriptions (C6), pagination (C7),
//! and the tool authorization pipeline (C8) into a single inbound
//! request handler, transport-independent (spec.md §4 in aggregate).

pub mod handler;

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub use handler::{PromptHandler, ResourceHandler, ToolHandler};

use crate::authorization::{ToolAuthorizationContext, ToolAuthorizationService};
use crate::completion::{CompletionDispatcher, CompletionProvider};
use crate::error::{Error, Result};
use crate::logging::LogGate;
use crate::pagination::paginate;
use crate::registry::Registry;
use crate::session::Session;
use crate::subscriptions::SubscriptionManager;
use crate::types::capabilities::ServerCapabilities;
use crate::types::jsonrpc::{JsonRpcRequest, JsonRpcResponse, RequestId};
use crate::types::protocol::{
    CompleteParams, CompleteResult, GetPromptResult, Implementation, InitializeParams,
    InitializeResult, ListPromptsResult, ListResourceTemplatesResult, ListResourcesResult,
    ListToolsResult, LogLevel, Prompt, ReadResourceResult, Resource, ResourceTemplate, Tool,
    ToolCallResult,
};

/// Default number of items returned per `*/list` page when the caller
/// doesn't otherwise bound it. Implementation-defined per spec.md §4.6.
const DEFAULT_PAGE_SIZE: usize = 50;

/// A single registered tool's definition plus the handler that executes
/// it.
struct ToolEntry {
    handler: Arc<dyn ToolHandler>,
}

/// The transport-independent server core: everything needed to answer
/// an inbound JSON-RPC request once a byte stream has been decoded into
/// one.
pub struct Server {
    info: Implementation,
    capabilities: ServerCapabilities,
    tools: Registry<Tool>,
    tool_handlers: DashMap<String, ToolEntry>,
    prompts: Registry<Prompt>,
    prompt_handlers: DashMap<String, Arc<dyn PromptHandler>>,
    resources: Registry<Resource>,
    resource_templates: Registry<ResourceTemplate>,
    resource_handler: Option<Arc<dyn ResourceHandler>>,
    subscriptions: SubscriptionManager,
    authorization: Arc<ToolAuthorizationService>,
    log_gate: LogGate,
    page_size: usize,
    completion: Option<CompletionDispatcher<Arc<dyn CompletionProvider>>>,
}

impl Server {
    /// Build a server with no primitives registered yet.
    pub fn new(info: Implementation, capabilities: ServerCapabilities, authorization: Arc<ToolAuthorizationService>) -> Self {
        Self {
            info,
            capabilities,
            tools: Registry::new(),
            tool_handlers: DashMap::new(),
            prompts: Registry::new(),
            prompt_handlers: DashMap::new(),
            resources: Registry::new(),
            resource_templates: Registry::new(),
            resource_handler: None,
            subscriptions: SubscriptionManager::new(),
            authorization,
            log_gate: LogGate::new(),
            page_size: DEFAULT_PAGE_SIZE,
            completion: None,
        }
    }

    /// Register a tool and the handler that executes it.
    pub async fn register_tool(&self, tool: Tool, handler: Arc<dyn ToolHandler>) {
        let name = tool.name.clone();
        self.tools.insert(tool).await;
        self.tool_handlers.insert(name, ToolEntry { handler });
    }

    /// Register a prompt and its resolver.
    pub async fn register_prompt(&self, prompt: Prompt, handler: Arc<dyn PromptHandler>) {
        let name = prompt.name.clone();
        self.prompts.insert(prompt).await;
        self.prompt_handlers.insert(name, handler);
    }

    /// Register a concrete resource's metadata (reads go through the
    /// single shared [`ResourceHandler`]).
    pub async fn register_resource(&self, resource: Resource) {
        self.resources.insert(resource).await;
    }

    /// Register a resource template's metadata.
    pub async fn register_resource_template(&self, template: ResourceTemplate) {
        self.resource_templates.insert(template).await;
    }

    /// Install the shared resource reader.
    pub fn set_resource_handler(&mut self, handler: Arc<dyn ResourceHandler>) {
        self.resource_handler = Some(handler);
    }

    /// Install the completion candidate provider backing
    /// `completion/complete`. Without one, the method isn't served even
    /// if `ServerCapabilities.completions` advertises support.
    pub fn set_completion_provider(&mut self, provider: Arc<dyn CompletionProvider>) {
        self.completion = Some(CompletionDispatcher::new(provider));
    }

    /// The subscription manager, exposed so a transport can call
    /// [`SubscriptionManager::subscribers_of`] when publishing a
    /// resource change.
    pub fn subscriptions(&self) -> &SubscriptionManager {
        &self.subscriptions
    }

    /// Handle one inbound request, returning the response to send back.
    /// `session` is mutated in place for `initialize` and close-related
    /// transitions.
    pub async fn handle_request(
        &self,
        session: &mut Session,
        request: JsonRpcRequest,
        auth_ctx: &ToolAuthorizationContext,
        cancellation: &CancellationToken,
    ) -> JsonRpcResponse {
        let id = request.id.clone();
        match self
            .dispatch(session, &request, auth_ctx, cancellation)
            .await
        {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => {
                debug!(target: "mcp.dispatch", method = request.method, error = %err, "request failed");
                JsonRpcResponse::from_error(id, &err)
            },
        }
    }

    async fn dispatch(
        &self,
        session: &mut Session,
        request: &JsonRpcRequest,
        auth_ctx: &ToolAuthorizationContext,
        cancellation: &CancellationToken,
    ) -> Result<Value> {
        if request.method != "initialize" && !session.accepts(&request.method) {
            return Err(Error::invalid_request(
                "server not initialized; call initialize first",
            ));
        }

        match request.method.as_str() {
            "initialize" => self.handle_initialize(session, request.params.clone()).await,
            "ping" => Ok(json!({})),
            "tools/list" => self.handle_list_tools(request.params.clone(), auth_ctx, cancellation).await,
            "tools/call" => self.handle_call_tool(request.params.clone(), auth_ctx, cancellation).await,
            "prompts/list" => self.handle_list_prompts(request.params.clone()).await,
            "prompts/get" => self.handle_get_prompt(request.params.clone()).await,
            "resources/list" => self.handle_list_resources(request.params.clone()).await,
            "resources/read" => self.handle_read_resource(request.params.clone()).await,
            "resources/templates/list" => self.handle_list_resource_templates(request.params.clone()).await,
            "resources/subscribe" => self.handle_subscribe(request.params.clone(), &auth_ctx.session_id).await,
            "resources/unsubscribe" => self.handle_unsubscribe(request.params.clone(), &auth_ctx.session_id).await,
            "logging/setLevel" => self.handle_set_log_level(request.params.clone()),
            "completion/complete" => self.handle_complete(request.params.clone()).await,
            other => Err(Error::method_not_found(other)),
        }
    }

    async fn handle_initialize(&self, session: &mut Session, params: Option<Value>) -> Result<Value> {
        let params: InitializeParams = parse_params(params)?;
        session.begin_initialize()?;
        let negotiated = session.complete_initialize(
            &params.protocol_version,
            crate::SUPPORTED_PROTOCOL_VERSIONS,
            params.capabilities,
        )?;
        let result = InitializeResult {
            protocol_version: negotiated,
            capabilities: self.capabilities.clone(),
            server_info: self.info.clone(),
            instructions: None,
        };
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_list_tools(
        &self,
        params: Option<Value>,
        auth_ctx: &ToolAuthorizationContext,
        cancellation: &CancellationToken,
    ) -> Result<Value> {
        if !self.capabilities.provides_tools() {
            return Err(Error::method_not_found("tools/list"));
        }
        let cursor = extract_cursor(params)?;
        let all = self.tools.snapshot().await;
        let names: Vec<String> = all.iter().map(|t| t.name.clone()).collect();
        let visible_names = self
            .authorization
            .filter_tools(auth_ctx, &names, cancellation)
            .await?;
        let visible: Vec<Tool> = all
            .into_iter()
            .filter(|t| visible_names.contains(&t.name))
            .collect();
        let (page, next_cursor) = paginate(&visible, cursor.as_deref(), self.page_size)?;
        let result = ListToolsResult {
            tools: page,
            next_cursor,
        };
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_call_tool(
        &self,
        params: Option<Value>,
        auth_ctx: &ToolAuthorizationContext,
        cancellation: &CancellationToken,
    ) -> Result<Value> {
        if !self.capabilities.provides_tools() {
            return Err(Error::method_not_found("tools/call"));
        }
        #[derive(serde::Deserialize)]
        struct CallToolParams {
            name: String,
            #[serde(default)]
            arguments: Value,
        }
        let params: CallToolParams = parse_params(params)?;

        let entry = self
            .tool_handlers
            .get(&params.name)
            .ok_or_else(|| Error::invalid_params(format!("unknown tool '{}'", params.name)))?;

        let decision = self
            .authorization
            .authorize_tool_execution(auth_ctx, &params.name, cancellation)
            .await?;
        if !decision.is_authorized {
            warn!(target: "mcp.authorization", tool = params.name, "tool call denied");
            return Err(Error::authorization_denied(
                decision.reason.unwrap_or_else(|| "not authorized".to_string()),
                decision.additional_data.as_ref(),
            ));
        }

        let result = entry.handler.call(params.arguments, auth_ctx).await?;
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_list_prompts(&self, params: Option<Value>) -> Result<Value> {
        if !self.capabilities.provides_prompts() {
            return Err(Error::method_not_found("prompts/list"));
        }
        let cursor = extract_cursor(params)?;
        let all = self.prompts.snapshot().await;
        let (page, next_cursor) = paginate(&all, cursor.as_deref(), self.page_size)?;
        let result = ListPromptsResult {
            prompts: page,
            next_cursor,
        };
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_get_prompt(&self, params: Option<Value>) -> Result<Value> {
        if !self.capabilities.provides_prompts() {
            return Err(Error::method_not_found("prompts/get"));
        }
        #[derive(serde::Deserialize)]
        struct GetPromptParams {
            name: String,
            #[serde(default)]
            arguments: Value,
        }
        let params: GetPromptParams = parse_params(params)?;
        let handler = self
            .prompt_handlers
            .get(&params.name)
            .ok_or_else(|| Error::invalid_params(format!("unknown prompt '{}'", params.name)))?;
        let result: GetPromptResult = handler.get(params.arguments).await?;
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_list_resources(&self, params: Option<Value>) -> Result<Value> {
        if !self.capabilities.provides_resources() {
            return Err(Error::method_not_found("resources/list"));
        }
        let cursor = extract_cursor(params)?;
        let all = self.resources.snapshot().await;
        let (page, next_cursor) = paginate(&all, cursor.as_deref(), self.page_size)?;
        let result = ListResourcesResult {
            resources: page,
            next_cursor,
        };
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_list_resource_templates(&self, params: Option<Value>) -> Result<Value> {
        if !self.capabilities.provides_resources() {
            return Err(Error::method_not_found("resources/templates/list"));
        }
        let cursor = extract_cursor(params)?;
        let all = self.resource_templates.snapshot().await;
        let (page, next_cursor) = paginate(&all, cursor.as_deref(), self.page_size)?;
        let result = ListResourceTemplatesResult {
            resource_templates: page,
            next_cursor,
        };
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_read_resource(&self, params: Option<Value>) -> Result<Value> {
        if !self.capabilities.provides_resources() {
            return Err(Error::method_not_found("resources/read"));
        }
        #[derive(serde::Deserialize)]
        struct ReadResourceParams {
            uri: String,
        }
        let params: ReadResourceParams = parse_params(params)?;
        let handler = self
            .resource_handler
            .as_ref()
            .ok_or_else(|| Error::invalid_params(format!("unknown resource '{}'", params.uri)))?;
        let result: ReadResourceResult = handler.read(&params.uri).await?;
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_subscribe(&self, params: Option<Value>, session_id: &str) -> Result<Value> {
        if !self.capabilities.supports_subscriptions() {
            return Err(Error::method_not_found("resources/subscribe"));
        }
        #[derive(serde::Deserialize)]
        struct SubscribeParams {
            uri: String,
        }
        let params: SubscribeParams = parse_params(params)?;
        self.subscriptions.subscribe(&params.uri, session_id);
        Ok(json!({}))
    }

    async fn handle_unsubscribe(&self, params: Option<Value>, session_id: &str) -> Result<Value> {
        if !self.capabilities.supports_subscriptions() {
            return Err(Error::method_not_found("resources/unsubscribe"));
        }
        #[derive(serde::Deserialize)]
        struct UnsubscribeParams {
            uri: String,
        }
        let params: UnsubscribeParams = parse_params(params)?;
        self.subscriptions.unsubscribe(&params.uri, session_id);
        Ok(json!({}))
    }

    fn handle_set_log_level(&self, params: Option<Value>) -> Result<Value> {
        if self.capabilities.logging.is_none() {
            return Err(Error::method_not_found("logging/setLevel"));
        }
        #[derive(serde::Deserialize)]
        struct SetLevelParams {
            level: LogLevel,
        }
        let params: SetLevelParams = parse_params(params)?;
        self.log_gate.set_level(params.level);
        Ok(json!({}))
    }

    async fn handle_complete(&self, params: Option<Value>) -> Result<Value> {
        if self.capabilities.completions.is_none() {
            return Err(Error::method_not_found("completion/complete"));
        }
        let dispatcher = self
            .completion
            .as_ref()
            .ok_or_else(|| Error::method_not_found("completion/complete"))?;
        let params: CompleteParams = parse_params(params)?;

        let prompt_names: Vec<String> = self
            .prompts
            .snapshot()
            .await
            .into_iter()
            .map(|p| p.name)
            .collect();
        let template_uris: Vec<String> = self
            .resource_templates
            .snapshot()
            .await
            .into_iter()
            .map(|t| t.uri_template)
            .collect();

        let completion = dispatcher
            .complete(params.reference, params.argument, &prompt_names, &template_uris)
            .await?;
        Ok(serde_json::to_value(CompleteResult { completion })?)
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Option<Value>) -> Result<T> {
    let value = params.unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| Error::invalid_params(e.to_string()))
}

fn extract_cursor(params: Option<Value>) -> Result<Option<String>> {
    #[derive(serde::Deserialize, Default)]
    struct CursorParams {
        cursor: Option<String>,
    }
    match params {
        None => Ok(None),
        Some(value) => {
            let parsed: CursorParams =
                serde_json::from_value(value).map_err(|e| Error::invalid_params(e.to_string()))?;
            Ok(parsed.cursor)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authorization::AllowAllFilter;
    use serde_json::json;

    fn make_server() -> Server {
        let auth = Arc::new(ToolAuthorizationService::new());
        auth.register(Arc::new(AllowAllFilter));
        Server::new(
            Implementation {
                name: "test-server".to_string(),
                version: "0.1.0".to_string(),
            },
            ServerCapabilities::tools_only(),
            auth,
        )
    }

    struct EchoTool;

    #[async_trait::async_trait]
    impl ToolHandler for EchoTool {
        async fn call(&self, arguments: Value, _ctx: &ToolAuthorizationContext) -> Result<ToolCallResult> {
            Ok(ToolCallResult::text(arguments.to_string()))
        }
    }

    #[tokio::test]
    async fn initialize_then_list_tools_then_call() {
        let server = make_server();
        server
            .register_tool(
                Tool::with_input_schema("echo", None, json!({"type": "object"})).unwrap(),
                Arc::new(EchoTool),
            )
            .await;

        let mut session = Session::new(server.capabilities.clone());
        let init_req = JsonRpcRequest::new(
            RequestId::Number(1),
            "initialize",
            Some(json!({
                "protocolVersion": crate::DEFAULT_PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {"name": "test-client", "version": "0.0.1"}
            })),
        );
        let ctx = ToolAuthorizationContext::new("s1");
        let token = CancellationToken::new();
        let response = server.handle_request(&mut session, init_req, &ctx, &token).await;
        assert!(response.result.is_some());
        assert_eq!(session.state(), crate::session::SessionState::Active);

        let list_req = JsonRpcRequest::new(RequestId::Number(2), "tools/list", None);
        let response = server.handle_request(&mut session, list_req, &ctx, &token).await;
        let Some(value) = response.result else {
            panic!("expected result");
        };
        let result: ListToolsResult = serde_json::from_value(value).unwrap();
        assert_eq!(result.tools.len(), 1);
        assert_eq!(result.tools[0].name, "echo");

        let call_req = JsonRpcRequest::new(
            RequestId::Number(3),
            "tools/call",
            Some(json!({"name": "echo", "arguments": {"x": 1}})),
        );
        let response = server.handle_request(&mut session, call_req, &ctx, &token).await;
        let Some(value) = response.result else {
            panic!("expected result");
        };
        let result: ToolCallResult = serde_json::from_value(value).unwrap();
        assert!(!result.is_error);
    }

    #[tokio::test]
    async fn requests_before_initialize_are_rejected() {
        let server = make_server();
        let mut session = Session::new(server.capabilities.clone());
        let ctx = ToolAuthorizationContext::new("s1");
        let token = CancellationToken::new();
        let req = JsonRpcRequest::new(RequestId::Number(1), "tools/list", None);
        let response = server.handle_request(&mut session, req, &ctx, &token).await;
        match response.error {
            Some(err) => {
                assert_eq!(err.code, crate::error::ErrorCode::INVALID_REQUEST.as_i32());
            },
            None => panic!("expected error"),
        }
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let server = make_server();
        let mut session = Session::new(server.capabilities.clone());
        session.begin_initialize().unwrap();
        session
            .complete_initialize(
                crate::DEFAULT_PROTOCOL_VERSION,
                crate::SUPPORTED_PROTOCOL_VERSIONS,
                crate::types::capabilities::ClientCapabilities::minimal(),
            )
            .unwrap();
        let ctx = ToolAuthorizationContext::new("s1");
        let token = CancellationToken::new();
        let req = JsonRpcRequest::new(RequestId::Number(1), "nonexistent/method", None);
        let response = server.handle_request(&mut session, req, &ctx, &token).await;
        match response.error {
            Some(err) => {
                assert_eq!(err.code, crate::error::ErrorCode::METHOD_NOT_FOUND.as_i32());
            },
            None => panic!("expected error"),
        }
    }

    struct StaticCompletions;

    #[async_trait::async_trait]
    impl CompletionProvider for StaticCompletions {
        async fn complete(
            &self,
            _reference: &crate::types::protocol::CompletionReference,
            argument: &crate::types::protocol::CompletionArgument,
        ) -> Result<crate::types::protocol::CompletionValues> {
            Ok(crate::types::protocol::CompletionValues {
                values: (0..150).map(|n| format!("{}-{n}", argument.value)).collect(),
                total: Some(150),
                has_more: false,
            })
        }
    }

    #[tokio::test]
    async fn completion_complete_is_wired_and_capped_at_one_hundred() {
        let mut server = Server::new(
            Implementation {
                name: "test-server".to_string(),
                version: "0.1.0".to_string(),
            },
            ServerCapabilities {
                completions: Some(crate::types::capabilities::CompletionCapabilities {}),
                prompts: Some(crate::types::capabilities::PromptCapabilities { list_changed: None }),
                ..Default::default()
            },
            Arc::new(ToolAuthorizationService::new()),
        );
        server.set_completion_provider(Arc::new(StaticCompletions));
        server
            .register_prompt(
                Prompt {
                    name: "greeting".to_string(),
                    description: None,
                    arguments: None,
                },
                Arc::new(NoopPrompt),
            )
            .await;

        let mut session = Session::new(server.capabilities.clone());
        session.begin_initialize().unwrap();
        session
            .complete_initialize(
                crate::DEFAULT_PROTOCOL_VERSION,
                crate::SUPPORTED_PROTOCOL_VERSIONS,
                crate::types::capabilities::ClientCapabilities::minimal(),
            )
            .unwrap();
        let ctx = ToolAuthorizationContext::new("s1");
        let token = CancellationToken::new();

        let req = JsonRpcRequest::new(
            RequestId::Number(1),
            "completion/complete",
            Some(json!({
                "ref": {"type": "prompt", "name": "greeting"},
                "argument": {"name": "topic", "value": "ru"},
            })),
        );
        let response = server.handle_request(&mut session, req, &ctx, &token).await;
        let Some(value) = response.result else {
            panic!("expected result, got {:?}", response.error);
        };
        let result: CompleteResult = serde_json::from_value(value).unwrap();
        assert_eq!(result.completion.values.len(), 100);
        assert!(result.completion.has_more);
    }

    struct NoopPrompt;

    #[async_trait::async_trait]
    impl PromptHandler for NoopPrompt {
        async fn get(&self, _arguments: Value) -> Result<GetPromptResult> {
            unreachable!("not exercised by the completion test")
        }
    }
}
