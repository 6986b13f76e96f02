//! OpenID Connect relying-party operations.
//!
//! - [`OidcClient`] - discovery, authorization URL construction and the
//!   DPoP-bound code exchange against one issuer
//! - [`ProviderMetadata`] - the provider's discovery document
//! - [`AuthorizationFlow`] - one authentication attempt, with metadata cached
//!   for its duration
//!
//! # References
//!
//! - [OpenID Connect Discovery 1.0](https://openid.net/specs/openid-connect-discovery-1_0.html)
//! - [Solid-OIDC](https://solidproject.org/TR/oidc)

mod client;
mod flow;
mod metadata;
mod token;

pub use client::{DiscoveryError, OidcClient, build_authorization_url, discovery_url};
pub use flow::{AuthorizationFlow, AuthorizationRequest};
pub use metadata::ProviderMetadata;
pub use token::{TokenExchangeError, TokenRequest, TokenResponse, exchange_code};

/// Scope requested by every Solid-OIDC authorization request.
pub const SOLID_SCOPE: &str = "openid webid";
