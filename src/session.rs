//! Session lifecycle and capability negotiation (C4, spec.md §4.2,
//! §4.3).
//!
//! `created → initializing → active → closing → closed`. A version
//! mismatch during negotiation skips `closing` entirely and drops
//! straight to `closed` — there is nothing to gracefully wind down, the
//! peers never agreed on a protocol to begin with.

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::capabilities::{ClientCapabilities, ServerCapabilities};

/// A session's lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The session exists but `initialize` has not been received.
    Created,
    /// `initialize` is being processed; only `initialize` itself may
    /// run concurrently with this state.
    Initializing,
    /// Capability negotiation completed; normal request traffic flows.
    Active,
    /// A close has been requested; in-flight requests may finish but
    /// no new ones should start.
    Closing,
    /// The session is finished. Terminal.
    Closed,
}

/// A single client↔server session: lifecycle state plus the
/// capabilities and protocol version negotiated during `initialize`.
pub struct Session {
    id: String,
    state: SessionState,
    protocol_version: Option<String>,
    client_capabilities: Option<ClientCapabilities>,
    server_capabilities: ServerCapabilities,
}

impl Session {
    /// Create a fresh session in [`SessionState::Created`].
    pub fn new(server_capabilities: ServerCapabilities) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            state: SessionState::Created,
            protocol_version: None,
            client_capabilities: None,
            server_capabilities,
        }
    }

    /// This session's unique id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The negotiated protocol version, once active.
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// The capabilities the client advertised, once active.
    pub fn client_capabilities(&self) -> Option<&ClientCapabilities> {
        self.client_capabilities.as_ref()
    }

    /// This session's (server-side) advertised capabilities.
    pub fn server_capabilities(&self) -> &ServerCapabilities {
        &self.server_capabilities
    }

    /// Begin processing `initialize`. Fails if called outside
    /// [`SessionState::Created`] — a session only initializes once.
    pub fn begin_initialize(&mut self) -> Result<()> {
        if self.state != SessionState::Created {
            return Err(Error::invalid_request(
                "initialize has already been requested for this session",
            ));
        }
        self.state = SessionState::Initializing;
        Ok(())
    }

    /// Complete negotiation: record the client's capabilities and pick
    /// a protocol version from `requested`.
    ///
    /// If `requested` is not in `supported`, the session transitions
    /// directly to [`SessionState::Closed`] (skipping `closing`) and
    /// this returns a version-mismatch [`Error::InvalidParams`] — there
    /// is no common protocol to converge on, so nothing downstream of
    /// this call is safe to run.
    pub fn complete_initialize(
        &mut self,
        requested: &str,
        supported: &[&str],
        client_capabilities: ClientCapabilities,
    ) -> Result<String> {
        if self.state != SessionState::Initializing {
            return Err(Error::invalid_request(
                "complete_initialize called outside the initializing state",
            ));
        }

        if !supported.contains(&requested) {
            self.state = SessionState::Closed;
            let fallback = supported.first().copied().unwrap_or(requested);
            return Err(Error::invalid_params(format!(
                "unsupported protocol version '{requested}'; this server supports {supported:?}, suggested fallback '{fallback}'"
            )));
        }

        self.protocol_version = Some(requested.to_string());
        self.client_capabilities = Some(client_capabilities);
        self.state = SessionState::Active;
        Ok(requested.to_string())
    }

    /// `true` if `method` may be dispatched right now: `initialize`
    /// itself is always allowed from [`SessionState::Created`], every
    /// other method requires [`SessionState::Active`].
    pub fn accepts(&self, method: &str) -> bool {
        match self.state {
            SessionState::Created => method == "initialize",
            SessionState::Active => true,
            SessionState::Initializing | SessionState::Closing | SessionState::Closed => false,
        }
    }

    /// Begin a graceful close from [`SessionState::Active`].
    pub fn begin_closing(&mut self) -> Result<()> {
        if self.state != SessionState::Active {
            return Err(Error::invalid_request(
                "a session can only begin closing while active",
            ));
        }
        self.state = SessionState::Closing;
        Ok(())
    }

    /// Finish closing. Valid from [`SessionState::Closing`] or
    /// [`SessionState::Created`] (a peer that disconnects before
    /// initializing).
    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }

    /// Whether a method requiring `capability` may run, given what the
    /// client negotiated. A request for an unadvertised capability
    /// SHOULD surface as `Error::method_not_found` at the call site
    /// (spec.md §4.3), not as a hard protocol error here — this just
    /// answers the yes/no question.
    pub fn client_supports(&self, capability: ClientCapabilityKind) -> bool {
        let Some(caps) = &self.client_capabilities else {
            return false;
        };
        match capability {
            ClientCapabilityKind::Roots => caps.supports_roots(),
            ClientCapabilityKind::Sampling => caps.supports_sampling(),
            ClientCapabilityKind::Elicitation => caps.supports_elicitation(),
        }
    }
}

/// The client capabilities a server-initiated request can depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCapabilityKind {
    /// `roots/list`.
    Roots,
    /// `sampling/createMessage`.
    Sampling,
    /// Elicitation requests.
    Elicitation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_negotiates_and_goes_active() {
        let mut session = Session::new(ServerCapabilities::tools_only());
        assert_eq!(session.state(), SessionState::Created);
        session.begin_initialize().unwrap();
        let version = session
            .complete_initialize("2025-06-18", &["2025-06-18"], ClientCapabilities::minimal())
            .unwrap();
        assert_eq!(version, "2025-06-18");
        assert_eq!(session.state(), SessionState::Active);
    }

    #[test]
    fn version_mismatch_closes_session_directly() {
        let mut session = Session::new(ServerCapabilities::minimal());
        session.begin_initialize().unwrap();
        let err = session
            .complete_initialize("1999-01-01", &["2025-06-18"], ClientCapabilities::minimal())
            .unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::INVALID_PARAMS);
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[test]
    fn only_initialize_accepted_before_active() {
        let session = Session::new(ServerCapabilities::minimal());
        assert!(session.accepts("initialize"));
        assert!(!session.accepts("tools/list"));
    }

    #[test]
    fn double_initialize_rejected() {
        let mut session = Session::new(ServerCapabilities::minimal());
        session.begin_initialize().unwrap();
        session
            .complete_initialize("2025-06-18", &["2025-06-18"], ClientCapabilities::minimal())
            .unwrap();
        let err = session.begin_initialize().unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::INVALID_REQUEST);
    }

    #[test]
    fn closing_then_closed_lifecycle() {
        let mut session = Session::new(ServerCapabilities::minimal());
        session.begin_initialize().unwrap();
        session
            .complete_initialize("2025-06-18", &["2025-06-18"], ClientCapabilities::minimal())
            .unwrap();
        session.begin_closing().unwrap();
        assert_eq!(session.state(), SessionState::Closing);
        assert!(!session.accepts("tools/list"));
        session.close();
        assert_eq!(session.state(), SessionState::Closed);
    }
}
