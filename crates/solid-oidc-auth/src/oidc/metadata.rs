//! The provider's discovery document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::DiscoveryError;

/// OpenID Provider metadata from `.well-known/openid-configuration`.
///
/// Every member is optional here: a provider that omits a required field is
/// still worth reporting on, and operations ask for the endpoints they need
/// through the `require_*` accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// The issuer identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    /// URL of the authorization endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_endpoint: Option<String>,

    /// URL of the token endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_endpoint: Option<String>,

    /// URL of the JSON Web Key Set document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwks_uri: Option<String>,

    /// URL of the dynamic client registration endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_endpoint: Option<String>,

    /// URL for RP-initiated logout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_session_endpoint: Option<String>,

    /// URL of the userinfo endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes_supported: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claims_supported: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_types_supported: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_types_supported: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_types_supported: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge_methods_supported: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token_signing_alg_values_supported: Option<Vec<String>>,

    /// JWS algorithms accepted in DPoP proofs (RFC 9449).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dpop_signing_alg_values_supported: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_endpoint_auth_methods_supported: Option<Vec<String>>,

    /// Members this crate does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `None` when the list is not published, otherwise whether it holds `value`.
fn advertises(list: Option<&Vec<String>>, value: &str) -> Option<bool> {
    list.map(|items| items.iter().any(|i| i == value))
}

impl ProviderMetadata {
    #[must_use]
    pub fn supports_grant_type(&self, grant_type: &str) -> Option<bool> {
        advertises(self.grant_types_supported.as_ref(), grant_type)
    }

    #[must_use]
    pub fn supports_response_type(&self, response_type: &str) -> Option<bool> {
        advertises(self.response_types_supported.as_ref(), response_type)
    }

    #[must_use]
    pub fn supports_scope(&self, scope: &str) -> Option<bool> {
        advertises(self.scopes_supported.as_ref(), scope)
    }

    /// Whether PKCE with `method` is advertised.
    #[must_use]
    pub fn supports_pkce_method(&self, method: &str) -> Option<bool> {
        advertises(self.code_challenge_methods_supported.as_ref(), method)
    }

    /// Whether DPoP proofs signed with `alg` are accepted.
    #[must_use]
    pub fn supports_dpop_algorithm(&self, alg: &str) -> Option<bool> {
        advertises(self.dpop_signing_alg_values_supported.as_ref(), alg)
    }

    /// Whether ID tokens may be signed with `alg`.
    #[must_use]
    pub fn supports_id_token_algorithm(&self, alg: &str) -> Option<bool> {
        advertises(self.id_token_signing_alg_values_supported.as_ref(), alg)
    }

    #[must_use]
    pub fn supports_claim(&self, claim: &str) -> Option<bool> {
        advertises(self.claims_supported.as_ref(), claim)
    }

    /// The authorization endpoint, or `MissingField`.
    pub fn require_authorization_endpoint(&self) -> Result<&str, DiscoveryError> {
        require("authorization_endpoint", self.authorization_endpoint.as_deref())
    }

    /// The token endpoint, or `MissingField`.
    pub fn require_token_endpoint(&self) -> Result<&str, DiscoveryError> {
        require("token_endpoint", self.token_endpoint.as_deref())
    }

    /// The JWKS URI, or `MissingField`.
    pub fn require_jwks_uri(&self) -> Result<&str, DiscoveryError> {
        require("jwks_uri", self.jwks_uri.as_deref())
    }
}

fn require<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, DiscoveryError> {
    value.ok_or_else(|| DiscoveryError::MissingField(field.to_string()))
}
