//! Wire types: the JSON-RPC envelope (C1), capability structs (C4), and
//! the primitive/result DTOs exchanged once a session is active.

pub mod capabilities;
pub mod jsonrpc;
pub mod protocol;

pub use capabilities::{ClientCapabilities, ServerCapabilities};
pub use jsonrpc::{
    decode_message, encode_message, JsonRpcError, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse, Message, RequestId,
};
pub use protocol::*;
