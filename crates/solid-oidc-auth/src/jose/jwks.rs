//! Provider key set retrieval.

use crate::http::{HttpError, HttpFetch, HttpRequest};

use super::JwkSet;

/// Errors that can occur when fetching a JWKS.
#[derive(Debug, Clone, thiserror::Error)]
pub enum JwksError {
    /// Transport failure.
    #[error("Failed to fetch JWKS: {0}")]
    Network(#[from] HttpError),

    /// Non-2xx status from the JWKS endpoint.
    #[error("JWKS endpoint returned status {0}")]
    HttpStatus(u16),

    /// The body is not a JWK set.
    #[error("Failed to parse JWKS: {0}")]
    ParseError(String),
}

impl JwksError {
    /// Returns `true` if this is a transport failure.
    #[must_use]
    pub fn is_network_error(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// GETs `jwks_uri` and parses the key set.
pub async fn fetch_jwks(http: &dyn HttpFetch, jwks_uri: &str) -> Result<JwkSet, JwksError> {
    tracing::debug!("Fetching JWKS from {}", jwks_uri);

    let response = http
        .fetch(HttpRequest::get(jwks_uri).header("Accept", "application/json"))
        .await?;

    if !response.is_success() {
        return Err(JwksError::HttpStatus(response.status));
    }

    let jwks: JwkSet = response
        .json()
        .map_err(|e| JwksError::ParseError(e.to_string()))?;

    tracing::debug!("Fetched JWKS from {} with {} keys", jwks_uri, jwks.keys.len());
    Ok(jwks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpResponse;
    use crate::http::testing::StubFetch;
    use serde_json::json;

    const URI: &str = "https://idp.example/jwks";

    #[tokio::test]
    async fn test_fetch_jwks() {
        let http = StubFetch::new().respond_json(
            URI,
            &json!({"keys": [{"kty": "EC", "crv": "P-256", "x": "a", "y": "b", "kid": "k1"}]}),
        );

        let jwks = fetch_jwks(&http, URI).await.unwrap();
        assert_eq!(jwks.keys.len(), 1);
        assert_eq!(jwks.keys[0].kid.as_deref(), Some("k1"));

        let requests = http.recorded();
        assert_eq!(requests[0].headers[0], ("Accept".into(), "application/json".into()));
    }

    #[tokio::test]
    async fn test_fetch_jwks_status_error() {
        let http = StubFetch::new().respond(URI, HttpResponse::new(503, ""));
        let err = fetch_jwks(&http, URI).await.unwrap_err();
        assert!(matches!(err, JwksError::HttpStatus(503)));
        assert!(!err.is_network_error());
    }

    #[tokio::test]
    async fn test_fetch_jwks_parse_error() {
        let http = StubFetch::new().respond_json(URI, &json!({"nokeys": []}));
        let err = fetch_jwks(&http, URI).await.unwrap_err();
        assert!(matches!(err, JwksError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_fetch_jwks_network_error() {
        let http = StubFetch::new();
        let err = fetch_jwks(&http, URI).await.unwrap_err();
        assert!(err.is_network_error());
    }
}
