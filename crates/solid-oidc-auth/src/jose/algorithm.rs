//! Mapping between JOSE algorithm names and signature parameters.

use crate::crypto::{EcCurve, HashAlgorithm, KeyAlgorithm, SignatureParams};
use crate::error::AuthError;

use super::Jwk;

/// Determines how a JWK's key material is imported.
///
/// Only `kty: "EC"` on a supported named curve is accepted.
pub fn resolve_key_algorithm(jwk: &Jwk) -> Result<KeyAlgorithm, AuthError> {
    if jwk.kty != "EC" {
        return Err(AuthError::unsupported_algorithm(format!(
            "Unsupported key type: {}",
            jwk.kty
        )));
    }
    let curve = EcCurve::from_name(jwk.crv.as_deref().unwrap_or_default())?;
    Ok(KeyAlgorithm::Ecdsa { curve })
}

/// Maps a JOSE `alg` header to signature parameters.
///
/// Only `ES256` is recognized for verification.
pub fn resolve_signature_params(alg: &str) -> Result<SignatureParams, AuthError> {
    match alg {
        "ES256" => Ok(SignatureParams::ecdsa(HashAlgorithm::Sha256)),
        other => Err(AuthError::unsupported_algorithm(format!(
            "Unsupported JOSE algorithm: {other}"
        ))),
    }
}

/// Builds the JOSE algorithm name by concatenation:
/// first letter of `kty`, then `S`, then the digest size, uppercased.
///
/// `("EC", SHA-256)` gives `ES256`.
#[must_use]
pub fn jose_algorithm_name(kty: &str, hash: HashAlgorithm) -> String {
    let initial: String = kty.chars().take(1).collect();
    format!("{initial}S{}", hash.bits()).to_uppercase()
}

/// Derives the `alg` header and signature parameters for a DPoP signing key.
pub fn dpop_signature_params(jwk: &Jwk) -> Result<(String, SignatureParams), AuthError> {
    let KeyAlgorithm::Ecdsa { curve } = resolve_key_algorithm(jwk)?;
    let hash = curve.hash();
    Ok((jose_algorithm_name(&jwk.kty, hash), SignatureParams::ecdsa(hash)))
}
