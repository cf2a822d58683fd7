//! Client-side peer half of the runtime: issues outbound requests over
//! the same correlation engine the server uses (C3), and services the
//! inbound requests a server is entitled to send back — `roots/list`
//! and `sampling/createMessage` (spec.md §6.1's server→client rows).
//!
//! This mirrors `server::Server` in shape (a transport-independent
//! core a driver loop feeds decoded messages into) but from the other
//! peer's vantage point: `Client` originates `initialize` rather than
//! answering it, and its inbound dispatch table is the small
//! embedder-supplied surface (roots, sampling) rather than the
//! tool/prompt/resource registry.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::rpc::RpcEngine;
use crate::transport::Transport;
use crate::types::capabilities::{ClientCapabilities, ServerCapabilities};
use crate::types::jsonrpc::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestId};
use crate::types::protocol::{
    CancelledNotification, CompleteParams, CompleteResult, CompletionArgument,
    CompletionReference, CreateMessageParams, CreateMessageResult, GetPromptResult, Implementation,
    InitializeParams, InitializeResult, ListPromptsResult, ListResourceTemplatesResult,
    ListResourcesResult, ListRootsResult, ListToolsResult, LogLevel, LogMessage,
    ProgressNotification, ReadResourceResult, Root, ToolCallResult,
};

/// The client-side view of session lifecycle (spec.md §4.2), kept
/// distinct from [`crate::session::SessionState`] because the fields a
/// client tracks after negotiation (the peer's [`ServerCapabilities`])
/// are the mirror image of what a server tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// `initialize` has not yet been sent.
    Created,
    /// `initialize` was sent; awaiting the server's response.
    Initializing,
    /// Negotiation completed and `notifications/initialized` was sent.
    Active,
    /// A close has been requested.
    Closing,
    /// Terminal.
    Closed,
}

/// Supplies the filesystem (or other URI) roots a server may ask for
/// via `roots/list`.
#[async_trait]
pub trait RootsProvider: Send + Sync {
    /// The client's current root set.
    async fn list_roots(&self) -> Result<Vec<Root>>;
}

/// Services `sampling/createMessage` requests from a server. Supplying
/// an actual LLM behind this trait is the embedder's concern — out of
/// scope for this crate (spec.md §1 Non-goals).
#[async_trait]
pub trait SamplingHandler: Send + Sync {
    /// Produce a completion for `params`.
    async fn create_message(&self, params: CreateMessageParams) -> Result<CreateMessageResult>;
}

/// A notification the server pushed that doesn't correspond to an
/// outbound request of ours — surfaced on [`Client::events`] for the
/// embedder to react to (e.g. re-fetch a tool list, render a log line).
#[derive(Debug, Clone)]
pub enum ServerEvent {
    /// `notifications/tools/list_changed`.
    ToolsListChanged,
    /// `notifications/prompts/list_changed`.
    PromptsListChanged,
    /// `notifications/resources/list_changed`.
    ResourcesListChanged,
    /// `notifications/resources/updated`.
    ResourceUpdated {
        /// The resource whose contents changed.
        uri: String,
    },
    /// `notifications/message`.
    Log(LogMessage),
    /// `notifications/progress`.
    Progress(ProgressNotification),
    /// `notifications/cancelled`, reported for visibility — the
    /// corresponding pending request is already resolved locally by
    /// [`RpcEngine::cancel`] before this event is emitted.
    Cancelled(CancelledNotification),
}

struct Negotiated {
    server_info: Implementation,
    server_capabilities: ServerCapabilities,
    protocol_version: String,
}

/// The transport-independent client core.
pub struct Client<T: Transport> {
    engine: Arc<RpcEngine<T>>,
    state: Mutex<ClientState>,
    negotiated: Mutex<Option<Negotiated>>,
    roots_provider: Mutex<Option<Arc<dyn RootsProvider>>>,
    sampling_handler: Mutex<Option<Arc<dyn SamplingHandler>>>,
    events_tx: mpsc::UnboundedSender<ServerEvent>,
}

impl<T: Transport> Client<T> {
    /// Build a client over `transport`. Returns the client plus the
    /// receiving half of its server-event stream — there is exactly
    /// one consumer per client, so the receiver is handed back rather
    /// than stored behind a second clone-able handle.
    pub fn new(transport: Arc<T>) -> (Self, mpsc::UnboundedReceiver<ServerEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let client = Self {
            engine: Arc::new(RpcEngine::new(transport)),
            state: Mutex::new(ClientState::Created),
            negotiated: Mutex::new(None),
            roots_provider: Mutex::new(None),
            sampling_handler: Mutex::new(None),
            events_tx,
        };
        (client, events_rx)
    }

    /// The current lifecycle state.
    pub fn state(&self) -> ClientState {
        *self.state.lock()
    }

    /// The protocol version negotiated during `initialize`, once active.
    pub fn protocol_version(&self) -> Option<String> {
        self.negotiated.lock().as_ref().map(|n| n.protocol_version.clone())
    }

    /// The server's advertised capabilities, once active.
    pub fn server_capabilities(&self) -> Option<ServerCapabilities> {
        self.negotiated.lock().as_ref().map(|n| n.server_capabilities.clone())
    }

    /// Install the handler for `roots/list`. `None` (the default)
    /// answers every `roots/list` with `Error::method_not_found` — a
    /// client that never registers a provider simply doesn't support
    /// roots, regardless of what it advertised.
    pub fn set_roots_provider(&self, provider: Arc<dyn RootsProvider>) {
        *self.roots_provider.lock() = Some(provider);
    }

    /// Install the handler for `sampling/createMessage`.
    pub fn set_sampling_handler(&self, handler: Arc<dyn SamplingHandler>) {
        *self.sampling_handler.lock() = Some(handler);
    }

    /// Perform the `initialize` handshake: send our capabilities, await
    /// the server's, and send `notifications/initialized` on success.
    ///
    /// Fails if `server`'s chosen `protocolVersion` isn't one this
    /// client understands — spec.md §4.2 treats that as a version
    /// mismatch regardless of which peer detects it first.
    pub async fn initialize(
        &self,
        client_info: Implementation,
        capabilities: ClientCapabilities,
    ) -> Result<InitializeResult> {
        {
            let mut state = self.state.lock();
            if *state != ClientState::Created {
                return Err(Error::invalid_request(
                    "initialize has already been sent on this client",
                ));
            }
            *state = ClientState::Initializing;
        }

        let params = InitializeParams {
            protocol_version: crate::DEFAULT_PROTOCOL_VERSION.to_string(),
            capabilities,
            client_info,
        };
        let value = self
            .engine
            .send_request("initialize", Some(serde_json::to_value(params)?))
            .await;
        let value = match value {
            Ok(v) => v,
            Err(err) => {
                *self.state.lock() = ClientState::Closed;
                return Err(err);
            },
        };
        let result: InitializeResult = serde_json::from_value(value)?;

        if !crate::SUPPORTED_PROTOCOL_VERSIONS.contains(&result.protocol_version.as_str()) {
            *self.state.lock() = ClientState::Closed;
            return Err(Error::invalid_params(format!(
                "server negotiated unsupported protocol version '{}'",
                result.protocol_version
            )));
        }

        *self.negotiated.lock() = Some(Negotiated {
            server_info: result.server_info.clone(),
            server_capabilities: result.capabilities.clone(),
            protocol_version: result.protocol_version.clone(),
        });
        *self.state.lock() = ClientState::Active;
        self.engine
            .send_notification("notifications/initialized", None)
            .await?;
        Ok(result)
    }

    fn require_active(&self) -> Result<()> {
        if *self.state.lock() != ClientState::Active {
            return Err(Error::invalid_request("client is not initialized"));
        }
        Ok(())
    }

    /// `ping` — valid in any active session, requires no capability.
    pub async fn ping(&self) -> Result<()> {
        self.require_active()?;
        self.engine.send_request("ping", None).await?;
        Ok(())
    }

    /// `tools/list`.
    pub async fn list_tools(&self, cursor: Option<String>) -> Result<ListToolsResult> {
        self.require_active()?;
        let params = cursor.map(|c| json!({ "cursor": c }));
        let value = self.engine.send_request("tools/list", params).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// `tools/call`.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallResult> {
        self.require_active()?;
        let params = json!({ "name": name, "arguments": arguments });
        let value = self.engine.send_request("tools/call", Some(params)).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// `prompts/list`.
    pub async fn list_prompts(&self, cursor: Option<String>) -> Result<ListPromptsResult> {
        self.require_active()?;
        let params = cursor.map(|c| json!({ "cursor": c }));
        let value = self.engine.send_request("prompts/list", params).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// `prompts/get`.
    pub async fn get_prompt(&self, name: &str, arguments: Value) -> Result<GetPromptResult> {
        self.require_active()?;
        let params = json!({ "name": name, "arguments": arguments });
        let value = self.engine.send_request("prompts/get", Some(params)).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// `resources/list`.
    pub async fn list_resources(&self, cursor: Option<String>) -> Result<ListResourcesResult> {
        self.require_active()?;
        let params = cursor.map(|c| json!({ "cursor": c }));
        let value = self.engine.send_request("resources/list", params).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// `resources/templates/list`.
    pub async fn list_resource_templates(
        &self,
        cursor: Option<String>,
    ) -> Result<ListResourceTemplatesResult> {
        self.require_active()?;
        let params = cursor.map(|c| json!({ "cursor": c }));
        let value = self
            .engine
            .send_request("resources/templates/list", params)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// `resources/read`.
    pub async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult> {
        self.require_active()?;
        let params = json!({ "uri": uri });
        let value = self.engine.send_request("resources/read", Some(params)).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// `resources/subscribe`.
    pub async fn subscribe_resource(&self, uri: &str) -> Result<()> {
        self.require_active()?;
        let params = json!({ "uri": uri });
        self.engine
            .send_request("resources/subscribe", Some(params))
            .await?;
        Ok(())
    }

    /// `resources/unsubscribe`.
    pub async fn unsubscribe_resource(&self, uri: &str) -> Result<()> {
        self.require_active()?;
        let params = json!({ "uri": uri });
        self.engine
            .send_request("resources/unsubscribe", Some(params))
            .await?;
        Ok(())
    }

    /// `logging/setLevel`.
    pub async fn set_log_level(&self, level: LogLevel) -> Result<()> {
        self.require_active()?;
        let params = json!({ "level": level });
        self.engine.send_request("logging/setLevel", Some(params)).await?;
        Ok(())
    }

    /// `completion/complete`.
    pub async fn complete(
        &self,
        reference: CompletionReference,
        argument: CompletionArgument,
    ) -> Result<CompleteResult> {
        self.require_active()?;
        let params = CompleteParams { reference, argument };
        let value = self
            .engine
            .send_request("completion/complete", Some(serde_json::to_value(params)?))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Send `notifications/cancelled` for `id` and resolve our own
    /// pending waiter locally with [`Error::Cancelled`] (spec.md §8,
    /// scenario 6) — cancellation never waits on the peer.
    pub async fn cancel(&self, id: RequestId) -> Result<()> {
        self.engine.cancel(&id);
        let params = serde_json::to_value(CancelledNotification {
            request_id: id,
            reason: None,
        })?;
        self.engine.send_notification("notifications/cancelled", Some(params)).await
    }

    /// Handle one inbound request from the server: `roots/list`,
    /// `sampling/createMessage`, or `ping`. Anything else is
    /// `Error::method_not_found`, matching spec.md §4.3's capability
    /// gating (a server invoking a method we never advertised support
    /// for gets the same error as an unknown method).
    pub async fn handle_request(
        &self,
        request: JsonRpcRequest,
        cancellation: &CancellationToken,
    ) -> JsonRpcResponse {
        let id = request.id.clone();
        match self.dispatch_request(&request, cancellation).await {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(err) => {
                debug!(target: "mcp.client.dispatch", method = request.method, error = %err, "inbound request failed");
                JsonRpcResponse::from_error(id, &err)
            },
        }
    }

    async fn dispatch_request(
        &self,
        request: &JsonRpcRequest,
        _cancellation: &CancellationToken,
    ) -> Result<Value> {
        match request.method.as_str() {
            "ping" => Ok(json!({})),
            "roots/list" => {
                let provider = self.roots_provider.lock().clone();
                let provider = provider.ok_or_else(|| Error::method_not_found("roots/list"))?;
                let roots = provider.list_roots().await?;
                Ok(serde_json::to_value(ListRootsResult { roots })?)
            },
            "sampling/createMessage" => {
                let handler = self.sampling_handler.lock().clone();
                let handler = handler.ok_or_else(|| Error::method_not_found("sampling/createMessage"))?;
                let params: CreateMessageParams = serde_json::from_value(
                    request.params.clone().unwrap_or(Value::Null),
                )
                .map_err(|e| Error::invalid_params(e.to_string()))?;
                let result = handler.create_message(params).await?;
                Ok(serde_json::to_value(result)?)
            },
            other => Err(Error::method_not_found(other)),
        }
    }

    /// Handle one inbound notification from the server: either resolve
    /// a cancellation locally or translate it into a [`ServerEvent`].
    /// Unknown notifications are ignored (spec.md §4.3).
    pub fn handle_notification(&self, notification: JsonRpcNotification) {
        let params = notification.params.unwrap_or(Value::Null);
        let event = match notification.method.as_str() {
            "notifications/tools/list_changed" => Some(ServerEvent::ToolsListChanged),
            "notifications/prompts/list_changed" => Some(ServerEvent::PromptsListChanged),
            "notifications/resources/list_changed" => Some(ServerEvent::ResourcesListChanged),
            "notifications/resources/updated" => serde_json::from_value(params)
                .ok()
                .map(|v: crate::types::protocol::ResourceUpdatedNotification| {
                    ServerEvent::ResourceUpdated { uri: v.uri }
                }),
            "notifications/message" => serde_json::from_value(params)
                .ok()
                .map(ServerEvent::Log),
            "notifications/progress" => serde_json::from_value(params)
                .ok()
                .map(ServerEvent::Progress),
            "notifications/cancelled" => {
                if let Ok(cancelled) =
                    serde_json::from_value::<CancelledNotification>(params.clone())
                {
                    self.engine.cancel(&cancelled.request_id);
                }
                serde_json::from_value(params).ok().map(ServerEvent::Cancelled)
            },
            other => {
                warn!(target: "mcp.client.dispatch", method = other, "ignoring unknown notification");
                None
            },
        };
        if let Some(event) = event {
            // A closed receiver (embedder dropped it) just means nobody
            // is listening; dropping the event is correct, not an error.
            let _ = self.events_tx.send(event);
        }
    }

    /// The underlying correlation engine, exposed so a driver loop can
    /// feed it decoded inbound messages directly when they're responses
    /// to our own outbound requests.
    pub fn engine(&self) -> &Arc<RpcEngine<T>> {
        &self.engine
    }

    /// The negotiated server identity, once active.
    pub fn server_info(&self) -> Option<Implementation> {
        self.negotiated.lock().as_ref().map(|n| n.server_info.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::jsonrpc::Message;
    use tokio::sync::Mutex as AsyncMutex;

    #[derive(Default)]
    struct RecordingTransport {
        sent: AsyncMutex<Vec<Message>>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, message: &Message) -> Result<()> {
            self.sent.lock().await.push(message.clone());
            Ok(())
        }

        async fn recv(&self) -> Result<Option<Message>> {
            Ok(None)
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    fn server_result(id: RequestId, result: Value) -> Message {
        Message::Response(JsonRpcResponse::success(id, result))
    }

    #[tokio::test]
    async fn initialize_goes_active_and_sends_initialized_notification() {
        let transport = Arc::new(RecordingTransport::default());
        let (client, _events) = Client::new(Arc::clone(&transport));
        let client = Arc::new(client);

        let client2 = Arc::clone(&client);
        let call = tokio::spawn(async move {
            client2
                .initialize(
                    Implementation { name: "test-client".into(), version: "0.1".into() },
                    ClientCapabilities::minimal(),
                )
                .await
        });
        tokio::task::yield_now().await;

        let response = json!({
            "protocolVersion": crate::DEFAULT_PROTOCOL_VERSION,
            "capabilities": {"tools": {"listChanged": true}},
            "serverInfo": {"name": "test-server", "version": "1.0"}
        });
        client
            .engine()
            .dispatch_inbound(server_result(RequestId::Number(1), response));

        let result = call.await.unwrap().unwrap();
        assert_eq!(result.protocol_version, crate::DEFAULT_PROTOCOL_VERSION);
        assert_eq!(client.state(), ClientState::Active);

        let sent = transport.sent.lock().await;
        assert!(sent.iter().any(|m| matches!(
            m,
            Message::Notification(n) if n.method == "notifications/initialized"
        )));
    }

    #[tokio::test]
    async fn unsupported_negotiated_version_closes_client() {
        let transport = Arc::new(RecordingTransport::default());
        let (client, _events) = Client::new(Arc::clone(&transport));
        let client = Arc::new(client);

        let client2 = Arc::clone(&client);
        let call = tokio::spawn(async move {
            client2
                .initialize(
                    Implementation { name: "c".into(), version: "0.1".into() },
                    ClientCapabilities::minimal(),
                )
                .await
        });
        tokio::task::yield_now().await;

        let response = json!({
            "protocolVersion": "1999-01-01",
            "capabilities": {},
            "serverInfo": {"name": "s", "version": "1"}
        });
        client
            .engine()
            .dispatch_inbound(server_result(RequestId::Number(1), response));

        let err = call.await.unwrap().unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::INVALID_PARAMS);
        assert_eq!(client.state(), ClientState::Closed);
    }

    #[tokio::test]
    async fn requests_before_initialize_are_rejected_locally() {
        let transport = Arc::new(RecordingTransport::default());
        let (client, _events) = Client::new(transport);
        let err = client.list_tools(None).await.unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::INVALID_REQUEST);
    }

    struct StaticRoots(Vec<Root>);

    #[async_trait]
    impl RootsProvider for StaticRoots {
        async fn list_roots(&self) -> Result<Vec<Root>> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn services_inbound_roots_list_request() {
        let transport = Arc::new(RecordingTransport::default());
        let (client, _events) = Client::new(transport);
        client.set_roots_provider(Arc::new(StaticRoots(vec![Root {
            uri: "file:///workspace".into(),
            name: Some("workspace".into()),
        }])));

        let req = JsonRpcRequest::new(RequestId::Number(5), "roots/list", None);
        let token = CancellationToken::new();
        let response = client.handle_request(req, &token).await;
        match response.result {
            Some(value) => {
                let result: ListRootsResult = serde_json::from_value(value).unwrap();
                assert_eq!(result.roots.len(), 1);
                assert_eq!(result.roots[0].uri, "file:///workspace");
            },
            None => panic!("expected result"),
        }
    }

    #[tokio::test]
    async fn roots_list_without_provider_is_method_not_found() {
        let transport = Arc::new(RecordingTransport::default());
        let (client, _events) = Client::new(transport);
        let req = JsonRpcRequest::new(RequestId::Number(1), "roots/list", None);
        let token = CancellationToken::new();
        let response = client.handle_request(req, &token).await;
        match response.error {
            Some(err) => {
                assert_eq!(err.code, crate::error::ErrorCode::METHOD_NOT_FOUND.as_i32());
            },
            None => panic!("expected error"),
        }
    }

    #[tokio::test]
    async fn notification_translates_to_server_event() {
        let transport = Arc::new(RecordingTransport::default());
        let (client, mut events) = Client::new(transport);
        client.handle_notification(JsonRpcNotification::new(
            "notifications/resources/updated",
            Some(json!({"uri": "file:///a"})),
        ));
        match events.recv().await.unwrap() {
            ServerEvent::ResourceUpdated { uri } => assert_eq!(uri, "file:///a"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_notification_is_ignored_without_panicking() {
        let transport = Arc::new(RecordingTransport::default());
        let (client, mut events) = Client::new(transport);
        client.handle_notification(JsonRpcNotification::new("notifications/totally_unknown", None));
        // No event should have been pushed; dropping the sender lets
        // recv observe a clean close instead of hanging forever.
        drop(client);
        assert!(events.recv().await.is_none());
    }
}
