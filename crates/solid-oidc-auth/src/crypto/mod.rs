//! Hashing, EC key material, signing and verification.
//!
//! Only the ECDSA family is supported. Signers and verifiers sit behind the
//! [`Signer`] and [`SignatureVerifier`] traits so a proof key can live
//! somewhere other than process memory.

mod ec;
mod hash;

use async_trait::async_trait;

pub use ec::{EcCurve, EcKeyPair, EcPublicKey, EcdsaVerifier};
pub use hash::HashAlgorithm;

use crate::error::AuthError;
use crate::jose::Jwk;

/// Key algorithm resolved from a JWK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    /// ECDSA on the named curve.
    Ecdsa { curve: EcCurve },
}

/// Parameters for an ECDSA signature operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureParams {
    /// Digest applied to the message before signing.
    pub hash: HashAlgorithm,
}

impl SignatureParams {
    /// ECDSA with the given digest.
    #[must_use]
    pub fn ecdsa(hash: HashAlgorithm) -> Self {
        Self { hash }
    }
}

/// Holder of a private signing key.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Public half of the key, as a JWK.
    fn public_jwk(&self) -> Jwk;

    /// Signs `message`, returning the raw `r || s` signature bytes.
    async fn sign(&self, params: &SignatureParams, message: &[u8]) -> Result<Vec<u8>, AuthError>;
}

/// Checks signatures against public JWKs.
pub trait SignatureVerifier: Send + Sync {
    /// Returns `Ok(false)` when the signature does not match. Errors are
    /// reserved for keys that cannot be imported.
    fn verify(
        &self,
        key: &Jwk,
        params: &SignatureParams,
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, AuthError>;
}
