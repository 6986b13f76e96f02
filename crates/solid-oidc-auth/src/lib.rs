//! # solid-oidc-auth
//!
//! Client-side building blocks for a Solid-OIDC relying party.
//!
//! This crate provides:
//! - PKCE verifier/challenge generation (RFC 7636, S256)
//! - Minimal JOSE support: compact serialization, parsing and ECDSA
//!   signature validation against a provider's JWKS
//! - DPoP proof minting (RFC 9449) with P-256, P-384 and P-521 keys
//! - An OpenID Connect client for discovery, authorization URL construction
//!   and the authorization-code-for-token exchange
//! - Conformance checks over provider metadata and issued ID tokens
//!
//! ## Overview
//!
//! The crate never reaches for ambient global state. Randomness, time and HTTP
//! are injected as capabilities ([`RandomSource`], [`Clock`], [`HttpFetch`]),
//! and client settings are carried by an explicit [`ClientConfig`].
//!
//! ## Modules
//!
//! - [`codec`] - base64url and JSON segment helpers
//! - [`pkce`] - PKCE verifier and challenge
//! - [`crypto`] - hash functions, EC key pairs, signing and verification
//! - [`jose`] - JOSE objects, JWKs and ID token validation
//! - [`dpop`] - DPoP proof generation
//! - [`oidc`] - provider discovery, authorization and token exchange
//! - [`conformance`] - statically enumerated metadata and ID token checks
//! - [`config`] - client configuration
//! - [`http`] - the HTTP capability and its `reqwest` implementation

pub mod clock;
pub mod codec;
pub mod config;
pub mod conformance;
pub mod crypto;
pub mod dpop;
pub mod error;
pub mod http;
pub mod jose;
pub mod oidc;
pub mod pkce;
pub mod random;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ClientConfig, ConfigError, HttpConfig};
pub use crypto::{EcCurve, EcKeyPair, EcdsaVerifier, HashAlgorithm, SignatureVerifier, Signer};
pub use dpop::DpopProver;
pub use error::{AuthError, ErrorCategory};
pub use http::{HttpError, HttpFetch, HttpMethod, HttpRequest, HttpResponse, ReqwestFetch};
pub use jose::{CompactToken, JoseObject, Jwk, JwkSet, TokenValidator};
pub use oidc::{
    AuthorizationFlow, AuthorizationRequest, DiscoveryError, OidcClient, ProviderMetadata,
    TokenExchangeError, TokenResponse,
};
pub use pkce::{PkceChallenge, PkceChallengeMethod, PkceError, PkceVerifier};
pub use random::{OsRandom, RandomSource};
