//! JSON-RPC correlation engine (C3, spec.md §4.4).
//!
//! Owns the pending-request table and atomic id allocation for
//! outbound requests, and demultiplexes inbound messages: responses
//! resolve a pending waiter, while requests/notifications are handed
//! back to the caller to route to a handler. A transport only ever
//! carries one connection's traffic, so this type is built around a
//! single [`Transport`] instance (spec.md's "transport serializes
//! inbound demux" concurrency note).

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::types::jsonrpc::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, Message, RequestId};

/// A decoded inbound message that the correlation engine could not
/// resolve locally (i.e. not a response to one of our own pending
/// requests) and hands back for the caller to route.
#[derive(Debug)]
pub enum Inbound {
    /// A request the peer is asking us to service.
    Request(JsonRpcRequest),
    /// A notification the peer is telling us about.
    Notification(JsonRpcNotification),
}

struct PendingEntry {
    responder: oneshot::Sender<Result<Value>>,
}

/// Correlates outbound requests with their eventual responses over a
/// single [`Transport`].
pub struct RpcEngine<T: Transport> {
    transport: Arc<T>,
    pending: Mutex<HashMap<RequestId, PendingEntry>>,
    next_id: AtomicI64,
}

impl<T: Transport> RpcEngine<T> {
    /// Build an engine over `transport`.
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn allocate_id(&self) -> RequestId {
        RequestId::Number(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Send a request and await its response.
    ///
    /// If the caller drops the returned future (e.g. via
    /// `tokio::select!` racing a timeout), the pending entry is simply
    /// never resolved and stays in the table until a late response
    /// arrives or [`Self::cancel`] is called explicitly — callers that
    /// need bounded cleanup should call [`Self::cancel`] themselves.
    pub async fn send_request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let id = self.allocate_id();
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id.clone(), PendingEntry { responder: tx });

        let request = JsonRpcRequest::new(id.clone(), method, params);
        debug!(target: "mcp.rpc", method, id = %id, "sending request");
        if let Err(err) = self.transport.send(&Message::Request(request)).await {
            self.pending.lock().remove(&id);
            return Err(err);
        }

        match rx.await {
            Ok(result) => result,
            Err(_) => Err(Error::internal("request cancelled before a response arrived")),
        }
    }

    /// Send a notification; no response is expected or awaited.
    pub async fn send_notification(&self, method: &str, params: Option<Value>) -> Result<()> {
        trace!(target: "mcp.rpc", method, "sending notification");
        let notification = JsonRpcNotification::new(method, params);
        self.transport.send(&Message::Notification(notification)).await
    }

    /// Send a response (success or error) for an inbound request.
    pub async fn send_response(&self, response: JsonRpcResponse) -> Result<()> {
        let message = if response.error.is_some() {
            Message::ErrorResponse(response)
        } else {
            Message::Response(response)
        };
        self.transport.send(&message).await
    }

    /// Resolve the pending request `id` locally with
    /// [`Error::Cancelled`], without sending anything over the wire —
    /// cancellation is a local-only signal (spec.md §8). Returns `true`
    /// if a pending entry existed to resolve.
    pub fn cancel(&self, id: &RequestId) -> bool {
        if let Some(entry) = self.pending.lock().remove(id) {
            let _ = entry.responder.send(Err(Error::Cancelled));
            true
        } else {
            false
        }
    }

    /// Feed one decoded inbound message through the engine. Responses
    /// resolve their matching pending request and return `None`;
    /// everything else is returned as [`Inbound`] for the caller to
    /// route to a handler.
    pub fn dispatch_inbound(&self, message: Message) -> Option<Inbound> {
        match message {
            Message::Response(resp) | Message::ErrorResponse(resp) => {
                if let Some(entry) = self.pending.lock().remove(&resp.id) {
                    let result = match resp.error {
                        Some(err) => Err(Error::InvalidParams {
                            message: err.message,
                            data: None,
                        }),
                        None => Ok(resp.result.unwrap_or(Value::Null)),
                    };
                    let _ = entry.responder.send(result);
                }
                None
            },
            Message::Request(req) => Some(Inbound::Request(req)),
            Message::Notification(notif) => Some(Inbound::Notification(notif)),
        }
    }

    /// The number of requests still awaiting a response.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}
