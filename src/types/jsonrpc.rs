//! JSON-RPC 2.0 message envelope and codec (C1).
//!
//! Discrimination follows field presence, not a tag field: `id`+`method`
//! is a request, `method` alone is a notification, `id`+`result` is a
//! response, `id`+`error` is an error response (spec.md §4.1). This is
//! why [`Message`] carries a hand-rolled `Deserialize` instead of a
//! derived `#[serde(untagged)]` enum — an untagged enum would try each
//! variant's *full* shape in order, which can't express "presence of
//! `result` vs `error`" as a discriminator cheaply and gives worse error
//! messages on malformed input.

use crate::error::{Error, Result};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Request/response correlation id: either a string or an integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric id.
    Number(i64),
    /// String id.
    String(String),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

const JSONRPC_VERSION: &str = "2.0";

/// A decoded JSON-RPC request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// Correlation id.
    pub id: RequestId,
    /// Method name, e.g. `"tools/call"`.
    pub method: String,
    /// Method parameters, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Build a new request.
    pub fn new(id: RequestId, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// A decoded JSON-RPC notification (no `id`, no response expected).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// Method name, e.g. `"notifications/progress"`.
    pub method: String,
    /// Method parameters, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    /// Build a new notification.
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
        }
    }
}

/// Structured error payload within an error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// JSON-RPC error code.
    pub code: i32,
    /// Human-readable message.
    pub message: String,
    /// Additional structured detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A decoded JSON-RPC response: either a success result or an error.
///
/// `result` and `error` are mutually exclusive on the wire (spec.md
/// §4.1); they're modeled as two plain `Option` fields rather than a
/// flattened untagged enum so that the wrapper keys always round-trip
/// and an error body can never be mistaken for a success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// Correlation id matching the originating request.
    pub id: RequestId,
    /// Present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Present on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Build a success response.
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Build an error response.
    pub fn error(id: RequestId, code: i32, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data,
            }),
        }
    }

    /// Build an error response from a runtime [`Error`].
    pub fn from_error(id: RequestId, err: &Error) -> Self {
        let data = err
            .data()
            .map(|d| serde_json::to_value(d).unwrap_or(Value::Null));
        Self::error(id, err.code().as_i32(), err.to_string(), data)
    }
}

/// Any decoded JSON-RPC message, discriminated by field presence.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Message {
    /// `id` + `method` present.
    Request(JsonRpcRequest),
    /// `method` present, no `id`.
    Notification(JsonRpcNotification),
    /// `id` + `result` present.
    Response(JsonRpcResponse),
    /// `id` + `error` present.
    ErrorResponse(JsonRpcResponse),
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        decode_value(value).map_err(D::Error::custom)
    }
}

/// Decode a single JSON-RPC message from raw bytes.
///
/// Fails with [`Error::Parse`] on malformed JSON and
/// [`Error::InvalidRequest`] on structurally invalid (but well-formed)
/// JSON, per spec.md §4.1.
pub fn decode_message(bytes: &[u8]) -> Result<Message> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| Error::parse(e.to_string()))?;
    decode_value(value)
}

fn decode_value(value: Value) -> Result<Message> {
    let obj = value
        .as_object()
        .ok_or_else(|| Error::invalid_request("message must be a JSON object"))?;

    let has_id = obj.contains_key("id");
    let has_method = obj.contains_key("method");
    let has_result = obj.contains_key("result");
    let has_error = obj.contains_key("error");

    if has_id && has_method {
        let req: JsonRpcRequest =
            serde_json::from_value(value).map_err(|e| Error::invalid_request(e.to_string()))?;
        Ok(Message::Request(req))
    } else if has_method {
        let notif: JsonRpcNotification =
            serde_json::from_value(value).map_err(|e| Error::invalid_request(e.to_string()))?;
        Ok(Message::Notification(notif))
    } else if has_id && has_result {
        let resp: JsonRpcResponse =
            serde_json::from_value(value).map_err(|e| Error::invalid_request(e.to_string()))?;
        Ok(Message::Response(resp))
    } else if has_id && has_error {
        let resp: JsonRpcResponse =
            serde_json::from_value(value).map_err(|e| Error::invalid_request(e.to_string()))?;
        Ok(Message::ErrorResponse(resp))
    } else {
        Err(Error::invalid_request(
            "message matches none of request/notification/response/error shapes",
        ))
    }
}

/// Encode a message as a JSON byte vector.
pub fn encode_message(message: &Message) -> Result<Vec<u8>> {
    serde_json::to_vec(message).map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_request_by_id_and_method() {
        let bytes = json!({"jsonrpc":"2.0","id":1,"method":"ping"})
            .to_string()
            .into_bytes();
        match decode_message(&bytes).unwrap() {
            Message::Request(r) => {
                assert_eq!(r.method, "ping");
                assert_eq!(r.id, RequestId::Number(1));
            },
            other => panic!("expected Request, got {other:?}"),
        }
    }

    #[test]
    fn decodes_notification_without_id() {
        let bytes = json!({"jsonrpc":"2.0","method":"notifications/initialized"})
            .to_string()
            .into_bytes();
        match decode_message(&bytes).unwrap() {
            Message::Notification(n) => assert_eq!(n.method, "notifications/initialized"),
            other => panic!("expected Notification, got {other:?}"),
        }
    }

    #[test]
    fn decodes_response_and_error_response() {
        let ok = json!({"jsonrpc":"2.0","id":"x","result":{}})
            .to_string()
            .into_bytes();
        assert!(matches!(decode_message(&ok).unwrap(), Message::Response(_)));

        let err = json!({"jsonrpc":"2.0","id":"x","error":{"code":-32601,"message":"nope"}})
            .to_string()
            .into_bytes();
        assert!(matches!(
            decode_message(&err).unwrap(),
            Message::ErrorResponse(_)
        ));
    }

    #[test]
    fn rejects_malformed_json_with_parse_error() {
        let bytes = b"{not json";
        let err = decode_message(bytes).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::PARSE_ERROR);
    }

    #[test]
    fn rejects_structurally_invalid_message() {
        let bytes = json!({"jsonrpc":"2.0","foo":"bar"}).to_string().into_bytes();
        let err = decode_message(&bytes).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::INVALID_REQUEST);
    }

    #[test]
    fn round_trip_request() {
        let req = JsonRpcRequest::new(RequestId::Number(7), "tools/call", Some(json!({"name":"x"})));
        let msg = Message::Request(req);
        let bytes = encode_message(&msg).unwrap();
        let decoded = decode_message(&bytes).unwrap();
        match decoded {
            Message::Request(r) => {
                assert_eq!(r.method, "tools/call");
                assert_eq!(r.id, RequestId::Number(7));
            },
            other => panic!("expected Request, got {other:?}"),
        }
    }

    #[test]
    fn round_trip_success_response() {
        let resp = JsonRpcResponse::success(RequestId::Number(1), json!({"tools": []}));
        let bytes = encode_message(&Message::Response(resp)).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["result"], json!({"tools": []}));
        assert!(value.get("error").is_none());

        match decode_message(&bytes).unwrap() {
            Message::Response(r) => {
                assert_eq!(r.result, Some(json!({"tools": []})));
                assert!(r.error.is_none());
            },
            other => panic!("expected Response, got {other:?}"),
        }
    }

    #[test]
    fn round_trip_error_response() {
        let resp = JsonRpcResponse::error(RequestId::String("x".into()), -32601, "Method not found", None);
        let bytes = encode_message(&Message::ErrorResponse(resp)).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["error"]["code"], json!(-32601));
        assert!(value.get("result").is_none());

        match decode_message(&bytes).unwrap() {
            Message::ErrorResponse(r) => {
                assert!(r.result.is_none());
                assert_eq!(r.error.unwrap().message, "Method not found");
            },
            other => panic!("expected ErrorResponse, got {other:?}"),
        }
    }
}
