//! Checks over a provider's discovery document.

use serde_json::{Value, json};

use super::{CheckOutcome, ConformanceError, ReportEntry, Reporter};
use crate::oidc::ProviderMetadata;

/// A single metadata check.
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryCheck {
    /// Requirement id in the specification data.
    pub id: &'static str,
    /// What the check verifies.
    pub message: &'static str,
    evaluate: fn(&ProviderMetadata) -> CheckOutcome,
}

impl DiscoveryCheck {
    #[must_use]
    pub fn evaluate(&self, metadata: &ProviderMetadata) -> CheckOutcome {
        (self.evaluate)(metadata)
    }
}

/// Every metadata check, in report order.
pub const DISCOVERY_CHECKS: &[DiscoveryCheck] = &[
    DiscoveryCheck {
        id: "MetadataIssuer",
        message: "Verify that the \"issuer\" field is present.",
        evaluate: |m| {
            let issuer = m.issuer.as_deref();
            CheckOutcome::new(issuer.map(|i| i.starts_with("http")), json!(issuer))
        },
    },
    DiscoveryCheck {
        id: "MetadataWebidClaim",
        message: "Verify that \"webid\" is included in the \"claims_supported\" field.",
        evaluate: |m| advertised(m.supports_claim("webid"), m.claims_supported.as_ref()),
    },
    DiscoveryCheck {
        id: "MetadataProofKeyCodeExchange",
        message: "Verify that the \"S256\" algorithm is included in the \"code_challenge_methods_supported\" field.",
        evaluate: |m| {
            advertised(
                m.supports_pkce_method("S256"),
                m.code_challenge_methods_supported.as_ref(),
            )
        },
    },
    DiscoveryCheck {
        id: "MetadataAuthorizationCodeGrant",
        message: "Verify that the \"authorization_code\" flow is included in the \"grant_types_supported\" field.",
        evaluate: |m| {
            advertised(
                m.supports_grant_type("authorization_code"),
                m.grant_types_supported.as_ref(),
            )
        },
    },
    DiscoveryCheck {
        id: "MetadataDpopAlgorithm",
        message: "Verify that the \"dpop_signing_alg_values_supported\" field includes either \"ES256\" or \"RS256\".",
        evaluate: |m| {
            let es256 = m.supports_dpop_algorithm("ES256");
            let rs256 = m.supports_dpop_algorithm("RS256");
            advertised(
                es256.zip(rs256).map(|(es, rs)| es || rs),
                m.dpop_signing_alg_values_supported.as_ref(),
            )
        },
    },
    DiscoveryCheck {
        id: "MetadataSigningAlgorithm",
        message: "Verify that the \"RS256\" algorithm is included in the \"id_token_signing_alg_values_supported\" field.",
        evaluate: |m| {
            advertised(
                m.supports_id_token_algorithm("RS256"),
                m.id_token_signing_alg_values_supported.as_ref(),
            )
        },
    },
    DiscoveryCheck {
        id: "MetadataDynamicRegistration",
        message: "Verify whether dynamic client registration is supported.",
        evaluate: |m| is_present(m.registration_endpoint.as_deref()),
    },
    DiscoveryCheck {
        id: "MetadataLogout",
        message: "Verify whether client-initiated logout is supported.",
        evaluate: |m| is_present(m.end_session_endpoint.as_deref()),
    },
    DiscoveryCheck {
        id: "MetadataTokenEndpoint",
        message: "Verify that the token_endpoint field is present.",
        evaluate: |m| is_present(m.token_endpoint.as_deref()),
    },
    DiscoveryCheck {
        id: "MetadataAuthorizationEndpoint",
        message: "Verify that the authorization_endpoint field is present.",
        evaluate: |m| is_present(m.authorization_endpoint.as_deref()),
    },
    DiscoveryCheck {
        id: "MetadataJwksEndpoint",
        message: "Verify that the jwks_uri field is present.",
        evaluate: |m| is_present(m.jwks_uri.as_deref()),
    },
    DiscoveryCheck {
        id: "MetadataSubjectTypesSupported",
        message: "Verify whether the supported Subject Identifier types are listed.",
        evaluate: |m| {
            let types = m.subject_types_supported.as_ref();
            CheckOutcome::new(types.is_some(), json!(types))
        },
    },
    DiscoveryCheck {
        id: "MetadataResponseType",
        message: "Verify that the \"code\" response is included in the \"response_types_supported\" field.",
        evaluate: |m| {
            advertised(
                m.supports_response_type("code"),
                m.response_types_supported.as_ref(),
            )
        },
    },
    DiscoveryCheck {
        id: "MetadataWebidScope",
        message: "Verify that the \"webid\" scope is included in the \"scopes_supported\" field.",
        evaluate: |m| advertised(m.supports_scope("webid"), m.scopes_supported.as_ref()),
    },
];

/// Skips when the provider does not publish the list.
fn advertised(result: Option<bool>, list: Option<&Vec<String>>) -> CheckOutcome {
    CheckOutcome::new(result, json!(list))
}

fn is_present(value: Option<&str>) -> CheckOutcome {
    CheckOutcome::new(value.is_some(), value.map_or(Value::Null, Value::from))
}

/// Runs every metadata check in order.
pub fn run_discovery_suite(
    metadata: &ProviderMetadata,
    reporter: &Reporter<'_>,
) -> Result<Vec<ReportEntry>, ConformanceError> {
    DISCOVERY_CHECKS
        .iter()
        .map(|check| reporter.report(check.id, check.message, check.evaluate(metadata)))
        .collect()
}
