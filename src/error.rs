//! Error taxonomy for the runtime (C10).
//!
//! Every error that can cross a JSON-RPC boundary collapses to one of the
//! five well-known codes below; domain-specific detail rides in `message`
//! and `data` rather than in new codes, per the wire contract.

use crate::authorization::AuthorizationChallenge;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A JSON-RPC 2.0 error code.
///
/// Newtype over `i32` so it can be used as a `HashMap`/`match` key without
/// losing the well-known constants' names at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(pub i32);

impl ErrorCode {
    /// Invalid JSON was received by the server.
    pub const PARSE_ERROR: Self = Self(-32700);
    /// The JSON sent is not a valid Request object.
    pub const INVALID_REQUEST: Self = Self(-32600);
    /// The method does not exist or is not available.
    pub const METHOD_NOT_FOUND: Self = Self(-32601);
    /// Invalid method parameter(s).
    pub const INVALID_PARAMS: Self = Self(-32602);
    /// Internal JSON-RPC error.
    pub const INTERNAL_ERROR: Self = Self(-32603);

    /// Raw numeric value.
    pub fn as_i32(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Structured additional error detail, carried in `error.data`.
///
/// When a tool-call is denied by the authorization pipeline, the deny's
/// challenge (if any) is embedded here so a transport can translate it
/// into an HTTP `WWW-Authenticate` header (spec.md §6.2).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorData {
    /// The `WWW-Authenticate` header value, if the error originated from
    /// an authorization denial carrying a challenge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub www_authenticate: Option<String>,
    /// The HTTP status a transport should use, if applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Free-form additional detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

impl ErrorData {
    /// Build error data carrying an authorization challenge.
    pub fn from_challenge(challenge: &AuthorizationChallenge) -> Self {
        Self {
            www_authenticate: Some(challenge.www_authenticate_value.clone()),
            status: Some(challenge.http_status_code),
            detail: None,
        }
    }
}

/// The runtime's error type.
///
/// Each variant maps to exactly one [`ErrorCode`]; `message` is the
/// human-readable detail, `data` carries structured extras (notably an
/// authorization challenge).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed JSON (C1 decode failure).
    #[error("parse error: {message}")]
    Parse {
        /// Detail message.
        message: String,
    },

    /// Well-formed JSON that does not form a valid JSON-RPC message, or a
    /// structurally invalid request (e.g. a second `initialize`).
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// Detail message.
        message: String,
    },

    /// No handler is registered for the method, or the peer invoked a
    /// method requiring a capability it was not advertised.
    #[error("method not found: {method}")]
    MethodNotFound {
        /// The method name that was not found.
        method: String,
    },

    /// Invalid parameters: unknown tool, malformed pagination cursor,
    /// missing required arguments, authorization denial, or version
    /// mismatch all surface through this variant (spec.md §7).
    #[error("invalid params: {message}")]
    InvalidParams {
        /// Detail message.
        message: String,
        /// Optional structured detail (e.g. an authorization challenge).
        data: Option<ErrorData>,
    },

    /// An unexpected failure inside a handler.
    #[error("internal error: {message}")]
    Internal {
        /// Detail message.
        message: String,
    },

    /// A local-only signal: the operation was cancelled. Never sent over
    /// the wire as a JSON-RPC error; this resolves a pending waiter
    /// locally (spec.md §8 invariant on exactly-once resolution).
    #[error("cancelled")]
    Cancelled,
}

impl Error {
    /// Build an [`Error::Parse`].
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Build an [`Error::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Build an [`Error::MethodNotFound`].
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::MethodNotFound {
            method: method.into(),
        }
    }

    /// Build an [`Error::InvalidParams`] with no structured data.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
            data: None,
        }
    }

    /// Build an [`Error::InvalidParams`] carrying an authorization
    /// challenge, used when `tools/call` is denied (spec.md §4.8).
    pub fn authorization_denied(
        message: impl Into<String>,
        challenge: Option<&AuthorizationChallenge>,
    ) -> Self {
        Self::InvalidParams {
            message: message.into(),
            data: challenge.map(ErrorData::from_challenge),
        }
    }

    /// Build an [`Error::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The JSON-RPC error code this error maps to.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Parse { .. } => ErrorCode::PARSE_ERROR,
            Self::InvalidRequest { .. } => ErrorCode::INVALID_REQUEST,
            Self::MethodNotFound { .. } => ErrorCode::METHOD_NOT_FOUND,
            Self::InvalidParams { .. } => ErrorCode::INVALID_PARAMS,
            Self::Internal { .. } => ErrorCode::INTERNAL_ERROR,
            // Cancellation never reaches the wire; callers that need a
            // placeholder code for logging can match on the variant
            // directly instead of relying on this value.
            Self::Cancelled => ErrorCode::INTERNAL_ERROR,
        }
    }

    /// Structured error data, if any.
    pub fn data(&self) -> Option<&ErrorData> {
        match self {
            Self::InvalidParams { data, .. } => data.as_ref(),
            _ => None,
        }
    }

    /// `true` if this is the local-only cancellation signal.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(err.to_string())
    }
}

/// The crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_matches_json_rpc_well_knowns() {
        assert_eq!(ErrorCode::PARSE_ERROR.as_i32(), -32700);
        assert_eq!(ErrorCode::INVALID_REQUEST.as_i32(), -32600);
        assert_eq!(ErrorCode::METHOD_NOT_FOUND.as_i32(), -32601);
        assert_eq!(ErrorCode::INVALID_PARAMS.as_i32(), -32602);
        assert_eq!(ErrorCode::INTERNAL_ERROR.as_i32(), -32603);
    }

    #[test]
    fn invalid_params_carries_challenge_data() {
        let challenge = AuthorizationChallenge::bearer(Some("mcp"), None, None, None);
        let err = Error::authorization_denied("Insufficient scope", Some(&challenge));
        let data = err.data().expect("data present");
        assert_eq!(
            data.www_authenticate.as_deref(),
            Some(challenge.www_authenticate_value.as_str())
        );
        assert_eq!(data.status, Some(401));
    }

    #[test]
    fn cancelled_is_local_only() {
        let err = Error::Cancelled;
        assert!(err.is_cancelled());
    }
}
