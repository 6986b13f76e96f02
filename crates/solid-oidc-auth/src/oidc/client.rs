//! Discovery, authorization URLs and the token request against one issuer.

use std::sync::Arc;

use crate::dpop::DpopProver;
use crate::error::AuthError;
use crate::http::{HttpError, HttpFetch, HttpRequest};
use crate::pkce::{PkceChallengeMethod, PkceVerifier};

use super::token::{TokenRequest, TokenResponse, exchange_code};
use super::{ProviderMetadata, SOLID_SCOPE};

/// Errors that can occur during OIDC discovery.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DiscoveryError {
    /// A network error occurred while fetching the discovery document.
    #[error("Network error: {0}")]
    Network(#[from] HttpError),

    /// The HTTP request returned a non-success status code.
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),

    /// The discovery document could not be parsed as JSON.
    #[error("Unable to deserialize .well-known configuration: {0}")]
    ParseError(String),

    /// The issuer URL is empty.
    #[error("Invalid issuer URL: {0}")]
    InvalidIssuer(String),

    /// A required field is missing from the discovery document.
    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl DiscoveryError {
    /// Returns `true` if this is a transport failure.
    #[must_use]
    pub fn is_network_error(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Location of the discovery document for `issuer`.
///
/// Exactly one `/` separates the issuer from `.well-known`, whether or not
/// the issuer already ends with one.
#[must_use]
pub fn discovery_url(issuer: &str) -> String {
    let separator = if issuer.ends_with('/') { "" } else { "/" };
    format!("{issuer}{separator}.well-known/openid-configuration")
}

/// Builds the authorization redirect URL.
///
/// Parameters appear in a fixed order and every key and value is
/// percent-encoded on its own.
pub fn build_authorization_url(
    metadata: &ProviderMetadata,
    client_id: &str,
    redirect_uri: &str,
    method: PkceChallengeMethod,
    challenge: &str,
) -> Result<String, DiscoveryError> {
    let endpoint = metadata.require_authorization_endpoint()?;

    let params = [
        ("response_type", "code"),
        ("scope", SOLID_SCOPE),
        ("code_challenge", challenge),
        ("code_challenge_method", method.as_str()),
        ("client_id", client_id),
        ("redirect_uri", redirect_uri),
    ];
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    Ok(format!("{endpoint}?{query}"))
}

/// OIDC operations against a single issuer.
///
/// Metadata is fetched on every call. Use [`AuthorizationFlow`] to reuse it
/// across the steps of one attempt.
///
/// [`AuthorizationFlow`]: super::AuthorizationFlow
#[derive(Clone)]
pub struct OidcClient {
    issuer: String,
    http: Arc<dyn HttpFetch>,
}

impl OidcClient {
    #[must_use]
    pub fn new(issuer: impl Into<String>, http: Arc<dyn HttpFetch>) -> Self {
        Self {
            issuer: issuer.into(),
            http,
        }
    }

    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Discovery document location for this issuer.
    #[must_use]
    pub fn discovery_url(&self) -> String {
        discovery_url(&self.issuer)
    }

    /// Fetches and parses the provider's discovery document.
    pub async fn metadata(&self) -> Result<ProviderMetadata, DiscoveryError> {
        if self.issuer.trim().is_empty() {
            return Err(DiscoveryError::InvalidIssuer("issuer is empty".to_string()));
        }

        let url = self.discovery_url();
        tracing::debug!("Fetching OIDC discovery document from {}", url);

        let response = self
            .http
            .fetch(HttpRequest::get(&url).header("Accept", "application/json"))
            .await?;

        if !response.is_success() {
            return Err(DiscoveryError::HttpStatus(response.status));
        }

        let metadata: ProviderMetadata = response
            .json()
            .map_err(|e| DiscoveryError::ParseError(e.to_string()))?;

        tracing::debug!(
            "Discovered OIDC provider {}",
            metadata.issuer.as_deref().unwrap_or(&self.issuer)
        );
        Ok(metadata)
    }

    /// Builds the authorization URL from freshly fetched metadata.
    pub async fn authorize(
        &self,
        client_id: &str,
        redirect_uri: &str,
        method: PkceChallengeMethod,
        challenge: impl AsRef<str>,
    ) -> Result<String, AuthError> {
        let metadata = self.metadata().await?;
        Ok(build_authorization_url(
            &metadata,
            client_id,
            redirect_uri,
            method,
            challenge.as_ref(),
        )?)
    }

    /// Exchanges an authorization code for tokens with a DPoP proof bound to
    /// the token endpoint. The verifier is consumed.
    pub async fn token(
        &self,
        client_id: &str,
        redirect_uri: &str,
        code: &str,
        verifier: PkceVerifier,
        prover: &DpopProver,
    ) -> Result<TokenResponse, AuthError> {
        let metadata = self.metadata().await?;
        let request = TokenRequest {
            client_id: client_id.to_string(),
            redirect_uri: redirect_uri.to_string(),
            code: code.to_string(),
            verifier,
        };
        exchange_code(self.http.as_ref(), &metadata, request, prover).await
    }
}

impl std::fmt::Debug for OidcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OidcClient")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}
