//! `WWW-Authenticate` challenge construction (spec.md §4.8).

use serde::{Deserialize, Serialize};

/// A challenge a denied tool call can carry back to the caller, from
/// which a transport can build an HTTP 401 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationChallenge {
    /// The fully-formed `WWW-Authenticate` header value.
    pub www_authenticate_value: String,
    /// The HTTP status a transport should respond with. Always 401 for
    /// the constructors below, but kept as a field rather than a
    /// constant so `custom` challenges can diverge.
    pub http_status_code: u16,
}

fn join_params(pairs: &[(&str, Option<&str>)]) -> String {
    pairs
        .iter()
        .filter_map(|(key, value)| {
            let value = value?;
            if value.trim().is_empty() {
                return None;
            }
            Some(format!("{key}=\"{value}\""))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl AuthorizationChallenge {
    /// Build a `Bearer` challenge, omitting any empty or whitespace-only
    /// parameter. Parameters are ordered `realm`, `scope`, `error`,
    /// `error_description` regardless of which are present.
    pub fn bearer(
        realm: Option<&str>,
        scope: Option<&str>,
        error: Option<&str>,
        error_description: Option<&str>,
    ) -> Self {
        let params = join_params(&[
            ("realm", realm),
            ("scope", scope),
            ("error", error),
            ("error_description", error_description),
        ]);
        let value = if params.is_empty() {
            "Bearer".to_string()
        } else {
            format!("Bearer {params}")
        };
        Self {
            www_authenticate_value: value,
            http_status_code: 401,
        }
    }

    /// Build a `Basic` challenge.
    pub fn basic(realm: Option<&str>) -> Self {
        let params = join_params(&[("realm", realm)]);
        let value = if params.is_empty() {
            "Basic".to_string()
        } else {
            format!("Basic {params}")
        };
        Self {
            www_authenticate_value: value,
            http_status_code: 401,
        }
    }

    /// Build the `insufficient_scope` variant of [`Self::bearer`]: the
    /// caller authenticated but lacks `scope`.
    pub fn insufficient_scope(scope: &str, realm: Option<&str>) -> Self {
        Self::bearer(
            realm,
            Some(scope),
            Some("insufficient_scope"),
            Some(&format!("Required scope: {scope}")),
        )
    }

    /// Build the `invalid_token` variant of [`Self::bearer`].
    pub fn invalid_token(realm: Option<&str>, error_description: Option<&str>) -> Self {
        let description = error_description
            .unwrap_or("The access token is expired, revoked, malformed, or invalid");
        Self::bearer(realm, None, Some("invalid_token"), Some(description))
    }

    /// Build a challenge for an arbitrary auth scheme with caller-supplied
    /// parameters, ordered as given.
    pub fn custom(scheme: &str, parameters: &[(&str, &str)]) -> Self {
        let pairs: Vec<(&str, Option<&str>)> = parameters
            .iter()
            .map(|(k, v)| (*k, Some(*v)))
            .collect();
        let params = join_params(&pairs);
        let value = if params.is_empty() {
            scheme.to_string()
        } else {
            format!("{scheme} {params}")
        };
        Self {
            www_authenticate_value: value,
            http_status_code: 401,
        }
    }
}
