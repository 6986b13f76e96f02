//! ID token signature validation against the issuer's published keys.

use std::sync::Arc;

use crate::crypto::{EcdsaVerifier, SignatureVerifier};
use crate::error::AuthError;
use crate::http::HttpFetch;
use crate::oidc::OidcClient;

use super::{
    CompactToken, JoseObject, JwkSet, fetch_jwks, resolve_key_algorithm, resolve_signature_params,
};

/// Validates compact tokens by discovering the issuer's JWKS.
///
/// The issuer is read from the token's own `iss` claim. Callers that need the
/// issuer pinned must compare it themselves.
#[derive(Clone)]
pub struct TokenValidator {
    http: Arc<dyn HttpFetch>,
    verifier: Arc<dyn SignatureVerifier>,
}

impl TokenValidator {
    /// Creates a validator using the built-in ECDSA verifier.
    #[must_use]
    pub fn new(http: Arc<dyn HttpFetch>) -> Self {
        Self {
            http,
            verifier: Arc::new(EcdsaVerifier),
        }
    }

    /// Checks the token's signature.
    ///
    /// Returns `Ok(false)` when no key in the issuer's JWKS matches the header
    /// `alg` and `kid`, when the token is unsigned, or when the signature does
    /// not verify. Errors mean validation could not be carried out.
    pub async fn validate(&self, token: &str) -> Result<bool, AuthError> {
        let object = JoseObject::parse(token)?;
        let issuer = object
            .issuer()
            .ok_or_else(|| AuthError::malformed_token("token has no 'iss' claim"))?;

        let metadata = OidcClient::new(issuer, self.http.clone()).metadata().await?;
        let jwks_uri = metadata.require_jwks_uri()?;
        let jwks = fetch_jwks(self.http.as_ref(), jwks_uri).await?;

        self.verify_with(token, &object, &jwks)
    }

    /// Checks the token's signature against an already fetched key set.
    pub fn verify_with(
        &self,
        token: &str,
        object: &JoseObject,
        jwks: &JwkSet,
    ) -> Result<bool, AuthError> {
        let Some(key) = jwks.find(object.algorithm(), object.key_id()) else {
            tracing::debug!(
                "No JWKS key matches alg={:?} kid={:?}",
                object.algorithm(),
                object.key_id()
            );
            return Ok(false);
        };

        resolve_key_algorithm(key)?;
        let params = resolve_signature_params(object.algorithm().unwrap_or_default())?;

        let compact = CompactToken::split(token)?;
        if compact.signature.is_none() {
            return Ok(false);
        }
        let signature = compact.signature_bytes()?;

        self.verifier.verify(
            key,
            &params,
            compact.signing_input().as_bytes(),
            &signature,
        )
    }
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator").finish_non_exhaustive()
    }
}
