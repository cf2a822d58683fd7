//! Per-call authorization context (spec.md §4.8).

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Immutable snapshot passed to every filter for a single authorization
/// decision. Built fresh per call by the server dispatcher — filters
/// must not (and cannot, since there is no `&mut self` access) mutate
/// it.
#[derive(Clone, Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolAuthorizationContext {
    /// The session this call belongs to.
    pub session_id: String,
    /// The authenticated user id, if the host performed authentication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Roles granted to the caller by the host.
    pub user_roles: Vec<String>,
    /// Fine-grained permissions/scopes granted to the caller.
    pub user_permissions: Vec<String>,
    /// An opaque principal value (e.g. decoded token claims) supplied by
    /// the host. This crate never inspects it — filters interpret it
    /// according to whatever authentication scheme the host implements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Value>,
    /// Additional host-supplied properties, for filters that need data
    /// outside the fields above.
    #[serde(default)]
    pub properties: HashMap<String, Value>,
}

impl ToolAuthorizationContext {
    /// Build a context with no roles, permissions, principal, or
    /// properties — the minimal shape for an unauthenticated session.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: None,
            user_roles: Vec::new(),
            user_permissions: Vec::new(),
            principal: None,
            properties: HashMap::new(),
        }
    }

    /// `true` if `role` is among [`Self::user_roles`].
    pub fn has_role(&self, role: &str) -> bool {
        self.user_roles.iter().any(|r| r == role)
    }

    /// `true` if `permission` is among [`Self::user_permissions`].
    pub fn has_permission(&self, permission: &str) -> bool {
        self.user_permissions.iter().any(|p| p == permission)
    }
}

// Manual Debug: never print `principal` or `properties` verbatim, since
// hosts commonly stash raw token claims there.
impl fmt::Debug for ToolAuthorizationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolAuthorizationContext")
            .field("session_id", &self.session_id)
            .field("user_id", &self.user_id)
            .field("user_roles", &self.user_roles)
            .field("user_permissions", &self.user_permissions)
            .field("principal", &self.principal.as_ref().map(|_| "<redacted>"))
            .field("properties", &format!("<{} entries>", self.properties.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_principal() {
        let mut ctx = ToolAuthorizationContext::new("sess-1");
        ctx.principal = Some(serde_json::json!({"sub": "super-secret-user-id"}));
        let rendered = format!("{ctx:?}");
        assert!(!rendered.contains("super-secret-user-id"));
        assert!(rendered.contains("redacted"));
    }

    #[test]
    fn role_and_permission_lookup() {
        let mut ctx = ToolAuthorizationContext::new("sess-1");
        ctx.user_roles.push("admin".to_string());
        ctx.user_permissions.push("write:admin".to_string());
        assert!(ctx.has_role("admin"));
        assert!(!ctx.has_role("guest"));
        assert!(ctx.has_permission("write:admin"));
    }
}
