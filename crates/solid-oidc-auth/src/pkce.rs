//! PKCE (Proof Key for Code Exchange) for the client side of RFC 7636.
//!
//! Only the S256 method is offered. A verifier is created per authorization
//! attempt, its challenge goes into the authorization URL, and the verifier
//! itself is consumed by the token exchange.
//!
//! # Example
//!
//! ```
//! use solid_oidc_auth::pkce::{create_challenge, create_verifier};
//! use solid_oidc_auth::random::OsRandom;
//!
//! let verifier = create_verifier(&OsRandom);
//! let challenge = create_challenge(&verifier);
//! assert_eq!(challenge.as_str().len(), 43);
//! ```

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::crypto::HashAlgorithm;
use crate::random::RandomSource;

/// Number of random bytes behind a generated verifier.
pub const VERIFIER_ENTROPY_BYTES: usize = 32;

/// A verifier handed back by the caller was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PkceError {
    /// Verifier length is outside 43-128 characters.
    #[error("Invalid verifier length: must be 43-128 characters, got {0}")]
    InvalidVerifierLength(usize),

    /// Verifier contains characters outside `[A-Za-z0-9-._~]`.
    #[error("Invalid verifier characters: must be URL-safe ([A-Za-z0-9-._~])")]
    InvalidVerifierCharacters,
}

/// PKCE challenge method. `plain` is never offered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PkceChallengeMethod {
    #[default]
    S256,
}

impl PkceChallengeMethod {
    /// Value of the `code_challenge_method` parameter.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S256 => "S256",
        }
    }
}

/// PKCE code verifier.
///
/// Generated verifiers are 32 random bytes in base64url (43 characters).
/// Verifiers carried across a browser redirect come back through
/// [`PkceVerifier::new`], which applies RFC 7636 section 4.1.
///
/// Not `Clone`: the token exchange takes it by value.
#[derive(Debug, PartialEq, Eq)]
pub struct PkceVerifier(String);

impl PkceVerifier {
    /// Accepts a verifier produced by an earlier [`create_verifier`].
    pub fn new(verifier: impl Into<String>) -> Result<Self, PkceError> {
        let verifier = verifier.into();
        let len = verifier.len();

        if !(43..=128).contains(&len) {
            return Err(PkceError::InvalidVerifierLength(len));
        }

        let unreserved =
            |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~');
        if !verifier.chars().all(unreserved) {
            return Err(PkceError::InvalidVerifierCharacters);
        }

        Ok(Self(verifier))
    }

    /// Builds a verifier from 32 bytes of `random`.
    #[must_use]
    pub fn generate_with(random: &dyn RandomSource) -> Self {
        let mut bytes = [0u8; VERIFIER_ENTROPY_BYTES];
        random.fill_bytes(&mut bytes);
        Self(codec::encode(bytes))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// PKCE code challenge: `BASE64URL(SHA256(ASCII(code_verifier)))`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceChallenge(String);

impl PkceChallenge {
    /// Derives the S256 challenge. The hash covers the encoded verifier text,
    /// not the random bytes behind it.
    #[must_use]
    pub fn from_verifier(verifier: &PkceVerifier) -> Self {
        let hash = HashAlgorithm::Sha256.digest(verifier.as_str().as_bytes());
        Self(codec::encode(hash))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Creates a fresh verifier from `random`.
#[must_use]
pub fn create_verifier(random: &dyn RandomSource) -> PkceVerifier {
    PkceVerifier::generate_with(random)
}

/// Derives the S256 challenge for `verifier`.
#[must_use]
pub fn create_challenge(verifier: &PkceVerifier) -> PkceChallenge {
    PkceChallenge::from_verifier(verifier)
}
