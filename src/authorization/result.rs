//! The outcome of a single authorization decision (spec.md §4.8).

use super::challenge::AuthorizationChallenge;

/// Result of evaluating a filter (or the pipeline as a whole) against a
/// tool listing or execution request.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizationResult {
    /// Whether the call is authorized.
    pub is_authorized: bool,
    /// Human-readable reason, present on denial (and optionally on
    /// allow, for audit trails).
    pub reason: Option<String>,
    /// A challenge to surface to the caller on denial. Restricted to
    /// this one structured type rather than a free-form bag — any other
    /// detail belongs in `reason` (spec.md §9 resolved open question).
    pub additional_data: Option<AuthorizationChallenge>,
}

impl AuthorizationResult {
    /// An unconditional allow, no reason recorded.
    pub fn allow() -> Self {
        Self {
            is_authorized: true,
            reason: None,
            additional_data: None,
        }
    }

    /// An allow with an audit reason attached.
    pub fn allow_with_reason(reason: impl Into<String>) -> Self {
        Self {
            is_authorized: true,
            reason: Some(reason.into()),
            additional_data: None,
        }
    }

    /// A deny with a reason and no challenge.
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            is_authorized: false,
            reason: Some(reason.into()),
            additional_data: None,
        }
    }

    /// A deny carrying a challenge a transport can turn into a 401.
    pub fn deny_with_challenge(reason: impl Into<String>, challenge: AuthorizationChallenge) -> Self {
        Self {
            is_authorized: false,
            reason: Some(reason.into()),
            additional_data: Some(challenge),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_has_no_reason_by_default() {
        let r = AuthorizationResult::allow();
        assert!(r.is_authorized);
        assert!(r.reason.is_none());
    }

    #[test]
    fn deny_with_challenge_carries_both() {
        let challenge = AuthorizationChallenge::insufficient_scope("write:admin", Some("mcp"));
        let r = AuthorizationResult::deny_with_challenge("missing scope", challenge.clone());
        assert!(!r.is_authorized);
        assert_eq!(r.additional_data, Some(challenge));
    }
}
