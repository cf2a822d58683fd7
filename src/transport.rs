//! Transport abstraction (C2, spec.md §1/§6.3).
//!
//! This crate defines the contract a transport must satisfy; it ships
//! no concrete stdio/HTTP/WebSocket implementation — that is explicitly
//! out of scope (spec.md Non-goals). [`StdioTransportConfig`] documents
//! the one piece of transport configuration spec.md does define, for a
//! future transport crate to implement against.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;

use crate::error::Result;
use crate::types::jsonrpc::Message;

/// A bidirectional channel for JSON-RPC messages. Implementations own
/// framing (newline-delimited, HTTP chunking, WebSocket frames, ...);
/// this crate only ever sees decoded [`Message`]s.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a single message.
    async fn send(&self, message: &Message) -> Result<()>;

    /// Receive the next message, or `None` if the peer closed the
    /// connection cleanly.
    async fn recv(&self) -> Result<Option<Message>>;

    /// Close the transport, releasing any underlying resources.
    async fn close(&self) -> Result<()>;
}

/// Launch parameters for a stdio-based transport (spec.md §6.3): the
/// one configuration surface this crate's specification defines, even
/// though no concrete stdio transport ships here.
#[derive(Debug, Clone)]
pub struct StdioTransportConfig {
    /// The executable to launch.
    pub command: String,
    /// Arguments passed to `command`.
    pub args: Vec<String>,
    /// Working directory for the child process, if not the current one.
    pub working_dir: Option<String>,
    /// Environment variables to overlay on top of the inherited
    /// environment.
    pub env: Vec<(String, String)>,
    /// How long to wait for the child to exit after a close request
    /// before escalating to a hard kill.
    pub graceful_shutdown: std::time::Duration,
}

impl StdioTransportConfig {
    /// Build a config with no extra arguments, inherited environment,
    /// inherited working directory, and a five-second graceful shutdown
    /// window.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            working_dir: None,
            env: Vec::new(),
            graceful_shutdown: std::time::Duration::from_secs(5),
        }
    }
}

/// Adapt any [`Transport`] into a `Stream` of inbound messages, by
/// spawning a task that pumps [`Transport::recv`] into an unbounded
/// channel. The stream ends once the transport returns `Ok(None)` or an
/// error; a `recv` error is yielded once and then the stream closes.
pub fn message_stream<T: Transport + 'static>(
    transport: Arc<T>,
) -> impl Stream<Item = Result<Message>> {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    tokio::spawn(async move {
        loop {
            match transport.recv().await {
                Ok(Some(message)) => {
                    if tx.send(Ok(message)).is_err() {
                        break;
                    }
                },
                Ok(None) => break,
                Err(err) => {
                    let _ = tx.send(Err(err));
                    break;
                },
            }
        }
    });
    UnboundedReceiverStream::new(rx)
}
