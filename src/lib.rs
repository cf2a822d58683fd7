//! A Model Context Protocol (MCP) server/client runtime.
//!
//! This crate implements the transport-independent core of MCP: the
//! JSON-RPC 2.0 framing and correlation engine (C1–C3), the session
//! lifecycle and capability negotiation (C4), the primitive registry
//! and subscription/pagination machinery (C5–C7), and a pluggable tool
//! authorization pipeline (C8) that gates both tool listing and
//! execution behind prioritized filters capable of emitting
//! HTTP-style authentication challenges.
//!
//! Concrete transports (stdio, HTTP/SSE), a dependency-injection
//! container, and a specific authentication provider are explicitly
//! out of scope — see `transport::Transport` for the contract a host
//! implements against, and `authorization` for the pipeline a host's
//! filters plug into.
//!
//! ```no_run
//! use std::sync::Arc;
//! use mcp_runtime::authorization::{AllowAllFilter, ToolAuthorizationService};
//! use mcp_runtime::server::Server;
//! use mcp_runtime::types::{Implementation, ServerCapabilities};
//!
//! let auth = Arc::new(ToolAuthorizationService::new());
//! auth.register(Arc::new(AllowAllFilter));
//! let server = Server::new(
//!     Implementation { name: "example".into(), version: "0.1.0".into() },
//!     ServerCapabilities::tools_only(),
//!     auth,
//! );
//! ```

pub mod authorization;
pub mod client;
pub mod completion;
pub mod error;
pub mod logging;
pub mod pagination;
pub mod registry;
pub mod rpc;
pub mod server;
pub mod session;
pub mod subscriptions;
pub mod transport;
pub mod types;

pub use error::{Error, Result};

/// The protocol version this runtime negotiates by default when acting
/// as a client, and the first entry advertised when acting as a server
/// (spec.md §4.2).
pub const DEFAULT_PROTOCOL_VERSION: &str = "2025-06-18";

/// Every protocol version this runtime understands, most recent first.
/// A peer requesting a version outside this set gets a version-mismatch
/// error and an immediate transition to `closed` (spec.md §4.2).
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];
