//! Token endpoint request and response.
//!
//! The request is form-encoded and carries a DPoP proof header. Unknown
//! response members are kept in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dpop::DpopProver;
use crate::error::AuthError;
use crate::http::{HttpError, HttpFetch, HttpMethod, HttpRequest};
use crate::pkce::PkceVerifier;

use super::ProviderMetadata;

/// Errors from the authorization-code exchange.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TokenExchangeError {
    /// The request did not reach the token endpoint.
    #[error("Network error: {0}")]
    Network(#[from] HttpError),

    /// The token endpoint answered with a non-success status.
    #[error("Token endpoint returned status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The response body is not a token response.
    #[error("Failed to parse token response: {0}")]
    ParseError(String),
}

impl TokenExchangeError {
    /// Returns `true` if this is a transport failure.
    #[must_use]
    pub fn is_network_error(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Token endpoint response.
///
/// Only `token_type` and `id_token` are inspected. The rest is carried through
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Inputs to the code exchange.
#[derive(Debug)]
pub struct TokenRequest {
    pub client_id: String,
    pub redirect_uri: String,
    pub code: String,
    pub verifier: PkceVerifier,
}

impl TokenRequest {
    /// The form body, in fixed parameter order.
    ///
    /// Values are written as-is, without percent-encoding, so a value
    /// containing `&` or `=` will not survive the trip.
    #[must_use]
    pub fn form_body(&self) -> String {
        [
            ("client_id", self.client_id.as_str()),
            ("grant_type", "authorization_code"),
            ("code", self.code.as_str()),
            ("code_verifier", self.verifier.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
        ]
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
    }
}

/// POSTs the code exchange to the token endpoint with a fresh DPoP proof.
pub async fn exchange_code(
    http: &dyn HttpFetch,
    metadata: &ProviderMetadata,
    request: TokenRequest,
    prover: &DpopProver,
) -> Result<TokenResponse, AuthError> {
    let token_endpoint = metadata.require_token_endpoint()?;
    let proof = prover
        .generate_token(token_endpoint, HttpMethod::Post.as_str())
        .await?;

    let body = request.form_body();

    tracing::debug!("Exchanging authorization code at {}", token_endpoint);

    let response = http
        .fetch(
            HttpRequest::post(token_endpoint, body)
                .header("Content-Type", "application/x-www-form-urlencoded")
                .header("DPoP", proof),
        )
        .await
        .map_err(TokenExchangeError::from)?;

    if !response.is_success() {
        return Err(TokenExchangeError::HttpStatus {
            status: response.status,
            body: response.text(),
        }
        .into());
    }

    let tokens: TokenResponse = response
        .json()
        .map_err(|e| TokenExchangeError::ParseError(e.to_string()))?;

    tracing::debug!(
        "Token exchange succeeded with token_type {:?}",
        tokens.token_type
    );
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::crypto::EcCurve;
    use crate::http::HttpResponse;
    use crate::http::testing::StubFetch;
    use crate::jose::JoseObject;
    use crate::random::testing::RepeatByte;

    const TOKEN: &str = "https://idp.example/token";

    fn metadata() -> ProviderMetadata {
        ProviderMetadata {
            token_endpoint: Some(TOKEN.to_string()),
            ..ProviderMetadata::default()
        }
    }

    fn request() -> TokenRequest {
        TokenRequest {
            client_id: "https://app.example/id".to_string(),
            redirect_uri: "https://app.example/cb".to_string(),
            code: "abc123".to_string(),
            verifier: PkceVerifier::generate_with(&RepeatByte(0)),
        }
    }

    #[test]
    fn test_form_body_is_not_escaped() {
        assert_eq!(
            request().form_body(),
            "client_id=https://app.example/id&grant_type=authorization_code&code=abc123\
             &code_verifier=AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA\
             &redirect_uri=https://app.example/cb"
        );
    }

    #[tokio::test]
    async fn test_exchange_sends_dpop_and_form() {
        let http = StubFetch::new().respond_json(
            TOKEN,
            &json!({"token_type": "DPoP", "id_token": "a.b.c", "access_token": "at", "expires_in": 300}),
        );
        let prover = DpopProver::generate(EcCurve::P256);

        let tokens = exchange_code(&http, &metadata(), request(), &prover)
            .await
            .unwrap();
        assert_eq!(tokens.token_type.as_deref(), Some("DPoP"));
        assert_eq!(tokens.id_token.as_deref(), Some("a.b.c"));
        assert_eq!(tokens.expires_in, Some(300));

        let sent = http.recorded();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, HttpMethod::Post);
        assert!(sent[0].body.as_deref().unwrap().contains("grant_type=authorization_code"));

        let proof = sent[0]
            .headers
            .iter()
            .find(|(n, _)| n == "DPoP")
            .map(|(_, v)| v.clone())
            .unwrap();
        let proof = JoseObject::parse(&proof).unwrap();
        assert_eq!(proof.claim_str("htu"), Some(TOKEN));
        assert_eq!(proof.claim_str("htm"), Some("POST"));
    }

    #[tokio::test]
    async fn test_exchange_status_error_keeps_body() {
        let http = StubFetch::new().respond(
            TOKEN,
            HttpResponse::new(400, r#"{"error":"invalid_grant"}"#),
        );
        let prover = DpopProver::generate(EcCurve::P256);

        let err = exchange_code(&http, &metadata(), request(), &prover)
            .await
            .unwrap_err();
        match err {
            AuthError::TokenExchange(TokenExchangeError::HttpStatus { status, body }) => {
                assert_eq!(status, 400);
                assert!(body.contains("invalid_grant"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exchange_parse_error() {
        let http = StubFetch::new().respond(TOKEN, HttpResponse::new(200, "not json"));
        let prover = DpopProver::generate(EcCurve::P256);
        let err = exchange_code(&http, &metadata(), request(), &prover)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::TokenExchange(TokenExchangeError::ParseError(_))
        ));
    }

    #[tokio::test]
    async fn test_exchange_missing_token_endpoint() {
        let http = StubFetch::new();
        let prover = DpopProver::generate(EcCurve::P256);
        let err = exchange_code(&http, &ProviderMetadata::default(), request(), &prover)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Discovery(_)));
        assert!(http.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_exchange_network_error_is_retryable() {
        let http = Arc::new(StubFetch::new());
        let prover = DpopProver::generate(EcCurve::P256);
        let err = exchange_code(http.as_ref(), &metadata(), request(), &prover)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
