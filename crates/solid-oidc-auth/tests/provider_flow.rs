//! End-to-end flows against a mocked identity provider.

use std::sync::Arc;

use serde_json::{Value, json};
use solid_oidc_auth::conformance::{
    CheckStatus, IdTokenSuite, OIDC_ISSUER_REL, ReportEntry, Reporter, run_discovery_suite,
};
use solid_oidc_auth::crypto::SignatureParams;
use solid_oidc_auth::{
    AuthorizationFlow, ClientConfig, DpopProver, EcCurve, EcKeyPair, FixedClock, HashAlgorithm,
    HttpConfig, HttpFetch, JoseObject, JwkSet, OidcClient, PkceChallengeMethod, ReqwestFetch,
    TokenValidator,
};
use time::OffsetDateTime;
use wiremock::matchers::{body_string_contains, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CLIENT_ID: &str = "https://app.example/id";
const REDIRECT_URI: &str = "https://app.example/callback";

fn http() -> Arc<dyn HttpFetch> {
    Arc::new(ReqwestFetch::new(HttpConfig::default().allow_http()).unwrap())
}

fn config() -> ClientConfig {
    ClientConfig {
        client_id: CLIENT_ID.to_string(),
        redirect_uri: REDIRECT_URI.to_string(),
        ..ClientConfig::default()
    }
}

fn discovery_document(issuer: &str) -> Value {
    json!({
        "issuer": issuer,
        "authorization_endpoint": format!("{issuer}/authorize"),
        "token_endpoint": format!("{issuer}/token"),
        "jwks_uri": format!("{issuer}/jwks"),
        "registration_endpoint": format!("{issuer}/register"),
        "end_session_endpoint": format!("{issuer}/logout"),
        "scopes_supported": ["openid", "webid", "offline_access"],
        "claims_supported": ["sub", "webid"],
        "response_types_supported": ["code"],
        "grant_types_supported": ["authorization_code", "refresh_token"],
        "subject_types_supported": ["public"],
        "code_challenge_methods_supported": ["S256"],
        "id_token_signing_alg_values_supported": ["ES256", "RS256"],
        "dpop_signing_alg_values_supported": ["ES256"]
    })
}

async fn mock_provider() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(discovery_document(&server.uri())))
        .mount(&server)
        .await;
    server
}

async fn mount_jwks(server: &MockServer, key: &EcKeyPair) {
    let jwks = JwkSet {
        keys: vec![key.public_jwk().with_kid("k1").with_alg("ES256")],
    };
    Mock::given(method("GET"))
        .and(path("/jwks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&jwks))
        .mount(server)
        .await;
}

async fn sign_id_token(key: &EcKeyPair, claims: Value) -> String {
    JoseObject::from_values(json!({"alg": "ES256", "kid": "k1"}), claims)
        .unwrap()
        .sign(key, &SignatureParams::ecdsa(HashAlgorithm::Sha256))
        .await
        .unwrap()
}

fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

fn id_token_claims(issuer: &str) -> Value {
    json!({
        "iss": issuer,
        "sub": "alice",
        "aud": [CLIENT_ID, "solid"],
        "azp": CLIENT_ID,
        "webid": format!("{issuer}/alice#me"),
        "iat": now() - 10,
        "exp": now() + 300
    })
}

fn status_of<'a>(entries: &'a [ReportEntry], id: &str) -> &'a CheckStatus {
    &entries.iter().find(|e| e.id == id).unwrap().status
}

#[tokio::test]
async fn test_discovery_fetches_metadata() {
    let server = mock_provider().await;
    let client = OidcClient::new(server.uri(), http());

    let metadata = client.metadata().await.unwrap();
    assert_eq!(metadata.issuer.as_deref(), Some(server.uri().as_str()));
    assert_eq!(
        metadata.token_endpoint.as_deref(),
        Some(format!("{}/token", server.uri()).as_str())
    );
}

#[tokio::test]
async fn test_discovery_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = OidcClient::new(server.uri(), http())
        .metadata()
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "HTTP error: status 404");
}

#[tokio::test]
async fn test_plain_http_rejected_by_default() {
    let server = mock_provider().await;
    let http: Arc<dyn HttpFetch> = Arc::new(ReqwestFetch::with_defaults().unwrap());

    let err = OidcClient::new(server.uri(), http)
        .metadata()
        .await
        .unwrap_err();
    assert!(err.to_string().contains("HTTPS required"));
}

#[tokio::test]
async fn test_authorize_url() {
    let server = mock_provider().await;
    let client = OidcClient::new(server.uri(), http());

    let url = client
        .authorize(CLIENT_ID, REDIRECT_URI, PkceChallengeMethod::S256, "abc")
        .await
        .unwrap();
    assert_eq!(
        url,
        format!(
            "{}/authorize?response_type=code&scope=openid%20webid&code_challenge=abc\
             &code_challenge_method=S256&client_id=https%3A%2F%2Fapp.example%2Fid\
             &redirect_uri=https%3A%2F%2Fapp.example%2Fcallback",
            server.uri()
        )
    );
}

#[tokio::test]
async fn test_flow_exchanges_code_with_dpop_proof() {
    let server = mock_provider().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(header_exists("dpop"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=the-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "DPoP",
            "access_token": "at",
            "id_token": "a.b.c",
            "expires_in": 300
        })))
        .expect(1)
        .mount(&server)
        .await;

    let flow = AuthorizationFlow::new(config(), server.uri(), http());
    let request = flow.begin().await.unwrap();
    assert!(request.url.contains(request.challenge.as_str()));

    let verifier_text = request.verifier.as_str().to_string();
    let tokens = flow.complete("the-code", request.verifier).await.unwrap();
    assert_eq!(tokens.token_type.as_deref(), Some("DPoP"));
    assert_eq!(tokens.expires_in, Some(300));

    let requests = server.received_requests().await.unwrap();
    let discovery_hits = requests
        .iter()
        .filter(|r| r.url.path() == "/.well-known/openid-configuration")
        .count();
    assert_eq!(discovery_hits, 1);

    let token_request = requests.iter().find(|r| r.url.path() == "/token").unwrap();
    let body = String::from_utf8(token_request.body.clone()).unwrap();
    assert!(body.contains(&format!("code_verifier={verifier_text}")));

    let proof = token_request.headers.get("dpop").unwrap().to_str().unwrap();
    let proof = JoseObject::parse(proof).unwrap();
    assert_eq!(proof.token_type(), Some("dpop+jwt"));
    assert_eq!(proof.claim_str("htm"), Some("POST"));
    assert_eq!(
        proof.claim_str("htu"),
        Some(format!("{}/token", server.uri()).as_str())
    );
}

#[tokio::test]
async fn test_token_endpoint_error_is_reported() {
    let server = mock_provider().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .mount(&server)
        .await;

    let flow = AuthorizationFlow::new(config(), server.uri(), http());
    let request = flow.begin().await.unwrap();
    let prover = DpopProver::generate(EcCurve::P256);
    let err = flow
        .complete_with("bad", request.verifier, &prover)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("400"));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_validate_id_token_signature() {
    let server = mock_provider().await;
    let key = EcKeyPair::generate(EcCurve::P256);
    mount_jwks(&server, &key).await;

    let token = sign_id_token(&key, id_token_claims(&server.uri())).await;
    let validator = TokenValidator::new(http());
    assert!(validator.validate(&token).await.unwrap());

    let other = EcKeyPair::generate(EcCurve::P256);
    let forged = sign_id_token(&other, id_token_claims(&server.uri())).await;
    assert!(!validator.validate(&forged).await.unwrap());
}

#[tokio::test]
async fn test_discovery_suite_against_provider() {
    let server = mock_provider().await;
    let metadata = OidcClient::new(server.uri(), http())
        .metadata()
        .await
        .unwrap();

    let entries = run_discovery_suite(&metadata, &Reporter::default()).unwrap();
    assert_eq!(entries.len(), 14);
    assert!(entries.iter().all(|e| e.status == CheckStatus::Pass));
}

#[tokio::test]
async fn test_id_token_suite_against_provider() {
    let server = mock_provider().await;
    let key = EcKeyPair::generate(EcCurve::P256);
    mount_jwks(&server, &key).await;
    Mock::given(method("GET"))
        .and(path("/alice"))
        .respond_with(ResponseTemplate::new(200).insert_header(
            "Link",
            format!("<{}>; rel=\"{OIDC_ISSUER_REL}\"", server.uri()).as_str(),
        ))
        .mount(&server)
        .await;

    let tokens = solid_oidc_auth::TokenResponse {
        token_type: Some("DPoP".to_string()),
        id_token: Some(sign_id_token(&key, id_token_claims(&server.uri())).await),
        ..Default::default()
    };

    let suite = IdTokenSuite::new(http(), CLIENT_ID, server.uri())
        .with_clock(Arc::new(FixedClock(now())));
    let entries = suite.run(&tokens, &Reporter::default()).await.unwrap();

    assert_eq!(entries.len(), 10);
    for id in [
        "TokenType",
        "IdTokenIssuerClaim",
        "IdTokenValidation",
        "IdTokenAudienceClaim",
        "IdTokenAudienceClaimSolid",
        "IdTokenAuthorizedPartyClaim",
        "WebidHeaderDiscovery",
        "IdTokenIatClaim",
        "IdTokenExpClaim",
    ] {
        assert_eq!(status_of(&entries, id), &CheckStatus::Pass, "{id}");
    }
    // The mock provider serves WebIDs over plain http.
    assert_eq!(status_of(&entries, "IdTokenWebidClaim"), &CheckStatus::Fail);
}
