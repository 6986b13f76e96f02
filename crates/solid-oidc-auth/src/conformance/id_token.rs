//! Checks over the token response and the ID token it carries.

use std::sync::Arc;

use serde_json::{Value, json};

use super::link::{OIDC_ISSUER_REL, links_with_rel, parse_link_header};
use super::{CheckOutcome, ConformanceError, ReportEntry, Reporter};
use crate::clock::{Clock, SystemClock};
use crate::http::{HttpFetch, HttpRequest};
use crate::jose::{JoseObject, TokenValidator};
use crate::oidc::TokenResponse;

/// ID token checks, one variant per requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdTokenCheck {
    TokenType,
    IdTokenIssuerClaim,
    IdTokenValidation,
    IdTokenAudienceClaim,
    IdTokenAudienceClaimSolid,
    IdTokenAuthorizedPartyClaim,
    IdTokenWebidClaim,
    WebidHeaderDiscovery,
    IdTokenIatClaim,
    IdTokenExpClaim,
}

/// Every ID token check, in report order.
pub const ID_TOKEN_CHECKS: [IdTokenCheck; 10] = [
    IdTokenCheck::TokenType,
    IdTokenCheck::IdTokenIssuerClaim,
    IdTokenCheck::IdTokenValidation,
    IdTokenCheck::IdTokenAudienceClaim,
    IdTokenCheck::IdTokenAudienceClaimSolid,
    IdTokenCheck::IdTokenAuthorizedPartyClaim,
    IdTokenCheck::IdTokenWebidClaim,
    IdTokenCheck::WebidHeaderDiscovery,
    IdTokenCheck::IdTokenIatClaim,
    IdTokenCheck::IdTokenExpClaim,
];

impl IdTokenCheck {
    /// Requirement id in the specification data.
    #[must_use]
    pub fn id(&self) -> &'static str {
        match self {
            Self::TokenType => "TokenType",
            Self::IdTokenIssuerClaim => "IdTokenIssuerClaim",
            Self::IdTokenValidation => "IdTokenValidation",
            Self::IdTokenAudienceClaim => "IdTokenAudienceClaim",
            Self::IdTokenAudienceClaimSolid => "IdTokenAudienceClaimSolid",
            Self::IdTokenAuthorizedPartyClaim => "IdTokenAuthorizedPartyClaim",
            Self::IdTokenWebidClaim => "IdTokenWebidClaim",
            Self::WebidHeaderDiscovery => "WebidHeaderDiscovery",
            Self::IdTokenIatClaim => "IdTokenIatClaim",
            Self::IdTokenExpClaim => "IdTokenExpClaim",
        }
    }

    /// What the check verifies.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::TokenType => "Verify that the token_type value equals \"DPoP\".",
            Self::IdTokenIssuerClaim => {
                "Verify that the token \"iss\" claim equals the \"issuer\" field in the server metadata."
            }
            Self::IdTokenValidation => "Verify that the token passes JWT validation.",
            Self::IdTokenAudienceClaim => {
                "Verify that the \"aud\" claim includes the client identifier."
            }
            Self::IdTokenAudienceClaimSolid => {
                "Verify that the \"aud\" claim includes the string \"solid\"."
            }
            Self::IdTokenAuthorizedPartyClaim => {
                "Verify that the \"azp\" claim equals the client identifier."
            }
            Self::IdTokenWebidClaim => "Verify that the \"webid\" claim is present in the ID Token.",
            Self::WebidHeaderDiscovery => {
                "Verify that the solid:oidcIssuer relation is present in the response link headers."
            }
            Self::IdTokenIatClaim => "Verify that the \"iat\" value is not in the future.",
            Self::IdTokenExpClaim => "Verify that the \"exp\" value is not in the past.",
        }
    }
}

/// Runs the ID token checks for one token response.
#[derive(Clone)]
pub struct IdTokenSuite {
    http: Arc<dyn HttpFetch>,
    validator: TokenValidator,
    clock: Arc<dyn Clock>,
    client_id: String,
    issuer: String,
}

impl IdTokenSuite {
    /// `issuer` is the `issuer` field of the provider metadata.
    #[must_use]
    pub fn new(
        http: Arc<dyn HttpFetch>,
        client_id: impl Into<String>,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            validator: TokenValidator::new(http.clone()),
            http,
            clock: Arc::new(SystemClock),
            client_id: client_id.into(),
            issuer: issuer.into(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Runs every check in order.
    pub async fn run(
        &self,
        tokens: &TokenResponse,
        reporter: &Reporter<'_>,
    ) -> Result<Vec<ReportEntry>, ConformanceError> {
        let mut entries = Vec::with_capacity(ID_TOKEN_CHECKS.len());
        for check in ID_TOKEN_CHECKS {
            let outcome = self.evaluate(check, tokens).await;
            entries.push(reporter.report(check.id(), check.message(), outcome)?);
        }
        Ok(entries)
    }

    /// Evaluates a single check.
    ///
    /// Claim checks skip when the ID token is missing or malformed. Remote
    /// failures skip with the error text as the inspected value.
    pub async fn evaluate(&self, check: IdTokenCheck, tokens: &TokenResponse) -> CheckOutcome {
        let parsed = tokens
            .id_token
            .as_deref()
            .ok_or_else(|| "no id_token in token response".to_string())
            .and_then(|raw| {
                JoseObject::parse(raw)
                    .map(|id_token| (raw, id_token))
                    .map_err(|e| e.to_string())
            });

        match (check, parsed) {
            (IdTokenCheck::TokenType, _) => {
                let token_type = tokens.token_type.as_deref();
                CheckOutcome::new(token_type == Some("DPoP"), json!(token_type))
            }
            (_, Err(reason)) => CheckOutcome::skip(reason),
            (IdTokenCheck::IdTokenIssuerClaim, Ok((_, id_token))) => {
                let iss = id_token.issuer();
                CheckOutcome::new(iss == Some(self.issuer.as_str()), json!(iss))
            }
            (IdTokenCheck::IdTokenValidation, Ok((raw, _))) => {
                match self.validator.validate(raw).await {
                    Ok(valid) => CheckOutcome::new(valid, json!(valid)),
                    Err(e) => CheckOutcome::skip(e.to_string()),
                }
            }
            (IdTokenCheck::IdTokenAudienceClaim, Ok((_, id_token))) => {
                audience_includes(&id_token, &self.client_id)
            }
            (IdTokenCheck::IdTokenAudienceClaimSolid, Ok((_, id_token))) => {
                audience_includes(&id_token, "solid")
            }
            (IdTokenCheck::IdTokenAuthorizedPartyClaim, Ok((_, id_token))) => {
                let azp = id_token.claim_str("azp");
                CheckOutcome::new(azp == Some(self.client_id.as_str()), json!(azp))
            }
            (IdTokenCheck::IdTokenWebidClaim, Ok((_, id_token))) => {
                let webid = id_token.claim_str("webid");
                CheckOutcome::new(webid.map(|w| w.starts_with("https://")), json!(webid))
            }
            (IdTokenCheck::WebidHeaderDiscovery, Ok((_, id_token))) => {
                self.webid_names_issuer(&id_token).await
            }
            // A missing iat or exp fails rather than skips.
            (IdTokenCheck::IdTokenIatClaim, Ok((_, id_token))) => CheckOutcome::new(
                id_token.issued_before(self.clock.now()) == Some(true),
                claim_or_null(&id_token, "iat"),
            ),
            (IdTokenCheck::IdTokenExpClaim, Ok((_, id_token))) => CheckOutcome::new(
                id_token.expires_after(self.clock.now()) == Some(true),
                claim_or_null(&id_token, "exp"),
            ),
        }
    }

    /// Dereferences the WebID and looks for a `solid:oidcIssuer` link naming
    /// the token's `iss`.
    async fn webid_names_issuer(&self, id_token: &JoseObject) -> CheckOutcome {
        let Some(webid) = id_token.claim_str("webid") else {
            return CheckOutcome::skip(Value::Null);
        };

        let response = match self.http.fetch(HttpRequest::get(webid)).await {
            Ok(r) => r,
            Err(e) => return CheckOutcome::skip(e.to_string()),
        };

        let Some(header) = response.header("Link") else {
            return CheckOutcome::skip("n/a");
        };

        let links = parse_link_header(&header);
        let issuers = links_with_rel(&links, OIDC_ISSUER_REL);
        let found = id_token.issuer().is_some_and(|iss| issuers.contains(&iss));
        CheckOutcome::new(found, header)
    }
}

impl std::fmt::Debug for IdTokenSuite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdTokenSuite")
            .field("client_id", &self.client_id)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

fn audience_includes(id_token: &JoseObject, audience: &str) -> CheckOutcome {
    let aud = id_token.claim("aud");
    let result = aud.map(|_| id_token.has_audience(audience));
    CheckOutcome::new(result, aud.cloned().unwrap_or(Value::Null))
}

fn claim_or_null(id_token: &JoseObject, name: &str) -> Value {
    id_token.claim(name).cloned().unwrap_or(Value::Null)
}
