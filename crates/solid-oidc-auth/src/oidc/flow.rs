//! The two-step authorization code flow with cached discovery.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::config::ClientConfig;
use crate::dpop::DpopProver;
use crate::error::AuthError;
use crate::http::HttpFetch;
use crate::pkce::{PkceChallenge, PkceVerifier, create_challenge, create_verifier};
use crate::random::{OsRandom, RandomSource};

use super::token::{TokenRequest, TokenResponse, exchange_code};
use super::{DiscoveryError, OidcClient, ProviderMetadata, build_authorization_url};

/// Output of [`AuthorizationFlow::begin`].
#[derive(Debug)]
pub struct AuthorizationRequest {
    /// Where to send the user agent.
    pub url: String,
    /// Must be kept until the redirect comes back, then passed to
    /// [`AuthorizationFlow::complete`].
    pub verifier: PkceVerifier,
    pub challenge: PkceChallenge,
}

/// One authentication attempt against one issuer.
///
/// Provider metadata is fetched at most once per flow and shared by
/// [`begin`](Self::begin) and [`complete`](Self::complete). Start a new flow
/// for the next attempt.
pub struct AuthorizationFlow {
    config: ClientConfig,
    client: OidcClient,
    http: Arc<dyn HttpFetch>,
    random: Arc<dyn RandomSource>,
    metadata: OnceCell<ProviderMetadata>,
}

impl AuthorizationFlow {
    #[must_use]
    pub fn new(config: ClientConfig, issuer: impl Into<String>, http: Arc<dyn HttpFetch>) -> Self {
        Self {
            config,
            client: OidcClient::new(issuer, http.clone()),
            http,
            random: Arc::new(OsRandom),
            metadata: OnceCell::new(),
        }
    }

    /// Replaces the randomness used for the PKCE verifier.
    #[must_use]
    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn issuer(&self) -> &str {
        self.client.issuer()
    }

    /// Provider metadata, fetched on first use.
    ///
    /// A failed fetch is not cached; the next call tries again.
    pub async fn metadata(&self) -> Result<&ProviderMetadata, DiscoveryError> {
        self.metadata
            .get_or_try_init(|| self.client.metadata())
            .await
    }

    /// Creates a verifier and the authorization URL carrying its challenge.
    pub async fn begin(&self) -> Result<AuthorizationRequest, AuthError> {
        let metadata = self.metadata().await?;

        let verifier = create_verifier(self.random.as_ref());
        let challenge = create_challenge(&verifier);
        let url = build_authorization_url(
            metadata,
            &self.config.client_id,
            &self.config.redirect_uri,
            self.config.pkce_method,
            challenge.as_str(),
        )?;

        Ok(AuthorizationRequest {
            url,
            verifier,
            challenge,
        })
    }

    /// Exchanges `code` using a new DPoP key on the configured curve.
    pub async fn complete(
        &self,
        code: &str,
        verifier: PkceVerifier,
    ) -> Result<TokenResponse, AuthError> {
        let prover = DpopProver::generate(self.config.dpop_curve);
        self.complete_with(code, verifier, &prover).await
    }

    /// Exchanges `code` with a caller-supplied prover.
    pub async fn complete_with(
        &self,
        code: &str,
        verifier: PkceVerifier,
        prover: &DpopProver,
    ) -> Result<TokenResponse, AuthError> {
        let metadata = self.metadata().await?;
        let request = TokenRequest {
            client_id: self.config.client_id.clone(),
            redirect_uri: self.config.redirect_uri.clone(),
            code: code.to_string(),
            verifier,
        };
        exchange_code(self.http.as_ref(), metadata, request, prover).await
    }
}

impl std::fmt::Debug for AuthorizationFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationFlow")
            .field("issuer", &self.client.issuer())
            .field("client_id", &self.config.client_id)
            .field("metadata_cached", &self.metadata.initialized())
            .finish_non_exhaustive()
    }
}
