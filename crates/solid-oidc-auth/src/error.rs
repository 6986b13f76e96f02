//! Relying-party error types.
//!
//! Every fallible operation in this crate returns [`AuthError`]. Concern-specific
//! errors (discovery, JWKS, token exchange, PKCE, configuration, conformance)
//! are folded in via `#[from]` so callers can match on the detail when they
//! need it.
//!
//! Note that a token whose signature does not verify is *not* an error: ID token
//! validation reports it as `Ok(false)`. An `AuthError` always means the
//! operation could not be completed.

use std::fmt;

use crate::config::ConfigError;
use crate::conformance::ConformanceError;
use crate::jose::JwksError;
use crate::oidc::{DiscoveryError, TokenExchangeError};
use crate::pkce::PkceError;

/// Errors that can occur while running a relying-party flow.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The key type, curve or JOSE `alg` is outside the supported set.
    #[error("Unsupported algorithm: {message}")]
    UnsupportedAlgorithm {
        /// Description of the rejected algorithm.
        message: String,
    },

    /// The compact token is structurally invalid.
    #[error("Malformed token: {message}")]
    MalformedToken {
        /// Description of why the token could not be parsed.
        message: String,
    },

    /// A base64url payload could not be decoded.
    #[error("Malformed encoding: {message}")]
    MalformedEncoding {
        /// Description of the encoding problem.
        message: String,
    },

    /// Key material could not be imported.
    #[error("Invalid key: {message}")]
    InvalidKey {
        /// Description of why the key is invalid.
        message: String,
    },

    /// The signing primitive failed.
    #[error("Signing failed: {message}")]
    Signing {
        /// Description of the signing failure.
        message: String,
    },

    /// PKCE input was rejected.
    #[error(transparent)]
    Pkce(#[from] PkceError),

    /// Provider metadata could not be discovered.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// The provider key set could not be fetched.
    #[error(transparent)]
    Jwks(#[from] JwksError),

    /// The authorization code could not be exchanged.
    #[error(transparent)]
    TokenExchange(#[from] TokenExchangeError),

    /// A conformance report could not be produced.
    #[error(transparent)]
    Conformance(#[from] ConformanceError),

    /// The client configuration is invalid.
    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

impl AuthError {
    /// Creates a new `UnsupportedAlgorithm` error.
    #[must_use]
    pub fn unsupported_algorithm(message: impl Into<String>) -> Self {
        Self::UnsupportedAlgorithm {
            message: message.into(),
        }
    }

    /// Creates a new `MalformedToken` error.
    #[must_use]
    pub fn malformed_token(message: impl Into<String>) -> Self {
        Self::MalformedToken {
            message: message.into(),
        }
    }

    /// Creates a new `MalformedEncoding` error.
    #[must_use]
    pub fn malformed_encoding(message: impl Into<String>) -> Self {
        Self::MalformedEncoding {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidKey` error.
    #[must_use]
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }

    /// Creates a new `Signing` error.
    #[must_use]
    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing {
            message: message.into(),
        }
    }

    /// Returns `true` if a caller may reasonably retry the operation.
    ///
    /// Only transport-level failures qualify. The crate itself never retries.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Discovery(e) => e.is_network_error(),
            Self::Jwks(e) => e.is_network_error(),
            Self::TokenExchange(e) => e.is_network_error(),
            _ => false,
        }
    }

    /// Returns the error category. The CLI derives its exit status from it.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedAlgorithm { .. } => ErrorCategory::Crypto,
            Self::MalformedToken { .. } => ErrorCategory::Token,
            Self::MalformedEncoding { .. } => ErrorCategory::Token,
            Self::InvalidKey { .. } => ErrorCategory::Crypto,
            Self::Signing { .. } => ErrorCategory::Crypto,
            Self::Pkce(_) => ErrorCategory::Validation,
            Self::Discovery(_) => ErrorCategory::Provider,
            Self::Jwks(_) => ErrorCategory::Provider,
            Self::TokenExchange(_) => ErrorCategory::Provider,
            Self::Conformance(_) => ErrorCategory::Conformance,
            Self::Configuration(_) => ErrorCategory::Configuration,
        }
    }
}

/// Broad error classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Algorithm, key and signature errors.
    Crypto,
    /// Malformed tokens and encodings.
    Token,
    /// Rejected caller input.
    Validation,
    /// Failures talking to the identity provider.
    Provider,
    /// Conformance reporting errors.
    Conformance,
    /// Configuration errors.
    Configuration,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Crypto => write!(f, "crypto"),
            Self::Token => write!(f, "token"),
            Self::Validation => write!(f, "validation"),
            Self::Provider => write!(f, "provider"),
            Self::Conformance => write!(f, "conformance"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}
