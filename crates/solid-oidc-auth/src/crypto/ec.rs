use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use super::{HashAlgorithm, KeyAlgorithm, SignatureParams, SignatureVerifier, Signer};
use crate::codec;
use crate::error::AuthError;
use crate::jose::{Jwk, resolve_key_algorithm};

/// NIST curves supported for ECDSA.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EcCurve {
    #[default]
    #[serde(rename = "P-256")]
    P256,
    #[serde(rename = "P-384")]
    P384,
    #[serde(rename = "P-521")]
    P521,
}

impl EcCurve {
    /// Parses a JWK `crv` name.
    pub fn from_name(name: &str) -> Result<Self, AuthError> {
        match name {
            "P-256" => Ok(Self::P256),
            "P-384" => Ok(Self::P384),
            "P-521" => Ok(Self::P521),
            other => Err(AuthError::unsupported_algorithm(format!(
                "Invalid ECDSA curve: [{other}]"
            ))),
        }
    }

    /// JWK `crv` name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
        }
    }

    /// Digest paired with this curve for DPoP proofs.
    #[must_use]
    pub fn hash(&self) -> HashAlgorithm {
        match self {
            Self::P256 => HashAlgorithm::Sha256,
            Self::P384 => HashAlgorithm::Sha384,
            Self::P521 => HashAlgorithm::Sha512,
        }
    }

    /// Length in bytes of one affine coordinate.
    #[must_use]
    pub fn coordinate_len(&self) -> usize {
        match self {
            Self::P256 => 32,
            Self::P384 => 48,
            Self::P521 => 66,
        }
    }
}

impl FromStr for EcCurve {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl fmt::Display for EcCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

enum SecretKey {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
    P521(p521::ecdsa::SigningKey),
}

/// An in-memory EC key pair.
///
/// The private key never leaves this value; only [`EcKeyPair::public_jwk`] is
/// exported.
pub struct EcKeyPair {
    secret: SecretKey,
}

impl EcKeyPair {
    /// Generates a fresh key pair from the OS CSPRNG.
    #[must_use]
    pub fn generate(curve: EcCurve) -> Self {
        let secret = match curve {
            EcCurve::P256 => SecretKey::P256(p256::ecdsa::SigningKey::random(&mut OsRng)),
            EcCurve::P384 => SecretKey::P384(p384::ecdsa::SigningKey::random(&mut OsRng)),
            EcCurve::P521 => SecretKey::P521(p521::ecdsa::SigningKey::random(&mut OsRng)),
        };
        Self { secret }
    }

    /// Imports a private scalar in big-endian form.
    pub fn from_secret_bytes(curve: EcCurve, bytes: &[u8]) -> Result<Self, AuthError> {
        let invalid = |e: ecdsa::Error| AuthError::invalid_key(format!("{curve} scalar: {e}"));
        let secret = match curve {
            EcCurve::P256 => {
                SecretKey::P256(p256::ecdsa::SigningKey::from_slice(bytes).map_err(invalid)?)
            }
            EcCurve::P384 => {
                SecretKey::P384(p384::ecdsa::SigningKey::from_slice(bytes).map_err(invalid)?)
            }
            EcCurve::P521 => {
                SecretKey::P521(p521::ecdsa::SigningKey::from_slice(bytes).map_err(invalid)?)
            }
        };
        Ok(Self { secret })
    }

    /// Curve of this key.
    #[must_use]
    pub fn curve(&self) -> EcCurve {
        match self.secret {
            SecretKey::P256(_) => EcCurve::P256,
            SecretKey::P384(_) => EcCurve::P384,
            SecretKey::P521(_) => EcCurve::P521,
        }
    }

    /// Public key as an uncompressed SEC1 point (`0x04 || x || y`).
    fn public_point(&self) -> Vec<u8> {
        match &self.secret {
            SecretKey::P256(k) => k.verifying_key().to_encoded_point(false).as_bytes().to_vec(),
            SecretKey::P384(k) => k.verifying_key().to_encoded_point(false).as_bytes().to_vec(),
            SecretKey::P521(k) => p521::ecdsa::VerifyingKey::from(k).to_encoded_point(false).as_bytes().to_vec(),
        }
    }

    /// Public key as a JWK with `kty`, `crv`, `x` and `y`.
    #[must_use]
    pub fn public_jwk(&self) -> Jwk {
        let curve = self.curve();
        let point = self.public_point();
        let len = curve.coordinate_len();
        let x = &point[1..1 + len];
        let y = &point[1 + len..];
        Jwk::ec(curve.name(), codec::encode(x), codec::encode(y))
    }

    /// Signs the digest of `message` synchronously.
    pub fn sign_message(&self, params: &SignatureParams, message: &[u8]) -> Result<Vec<u8>, AuthError> {
        let digest = params.hash.digest(message);
        let signing = |e: ecdsa::Error| AuthError::signing(e.to_string());
        let bytes = match &self.secret {
            SecretKey::P256(k) => {
                let sig: p256::ecdsa::Signature = k.sign_prehash(&digest).map_err(signing)?;
                sig.to_bytes().to_vec()
            }
            SecretKey::P384(k) => {
                let sig: p384::ecdsa::Signature = k.sign_prehash(&digest).map_err(signing)?;
                sig.to_bytes().to_vec()
            }
            SecretKey::P521(k) => {
                let sig: p521::ecdsa::Signature = k.sign_prehash(&digest).map_err(signing)?;
                sig.to_bytes().to_vec()
            }
        };
        Ok(bytes)
    }
}

impl fmt::Debug for EcKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcKeyPair")
            .field("curve", &self.curve())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl Signer for EcKeyPair {
    fn public_jwk(&self) -> Jwk {
        EcKeyPair::public_jwk(self)
    }

    async fn sign(&self, params: &SignatureParams, message: &[u8]) -> Result<Vec<u8>, AuthError> {
        self.sign_message(params, message)
    }
}

/// A public EC key imported from a JWK.
#[derive(Clone)]
pub enum EcPublicKey {
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
    P521(p521::ecdsa::VerifyingKey),
}

// `p521::ecdsa::VerifyingKey` does not implement `Debug`, so it cannot be derived.
impl fmt::Debug for EcPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::P256(k) => f.debug_tuple("P256").field(k).finish(),
            Self::P384(k) => f.debug_tuple("P384").field(k).finish(),
            Self::P521(k) => f
                .debug_tuple("P521")
                .field(&k.to_encoded_point(false))
                .finish(),
        }
    }
}

impl EcPublicKey {
    /// Imports `x`/`y` from an `EC` JWK on a supported curve.
    pub fn from_jwk(jwk: &Jwk) -> Result<Self, AuthError> {
        let KeyAlgorithm::Ecdsa { curve } = resolve_key_algorithm(jwk)?;
        let point = jwk.uncompressed_point(curve.coordinate_len())?;

        let invalid = |e: ecdsa::Error| AuthError::invalid_key(format!("{curve} point: {e}"));
        let key = match curve {
            EcCurve::P256 => {
                Self::P256(p256::ecdsa::VerifyingKey::from_sec1_bytes(&point).map_err(invalid)?)
            }
            EcCurve::P384 => {
                Self::P384(p384::ecdsa::VerifyingKey::from_sec1_bytes(&point).map_err(invalid)?)
            }
            EcCurve::P521 => {
                Self::P521(p521::ecdsa::VerifyingKey::from_sec1_bytes(&point).map_err(invalid)?)
            }
        };
        Ok(key)
    }

    /// Checks a raw `r || s` signature. Malformed signatures are simply invalid.
    #[must_use]
    pub fn verify(&self, params: &SignatureParams, message: &[u8], signature: &[u8]) -> bool {
        let digest = params.hash.digest(message);
        match self {
            Self::P256(k) => p256::ecdsa::Signature::from_slice(signature)
                .is_ok_and(|sig| k.verify_prehash(&digest, &sig).is_ok()),
            Self::P384(k) => p384::ecdsa::Signature::from_slice(signature)
                .is_ok_and(|sig| k.verify_prehash(&digest, &sig).is_ok()),
            Self::P521(k) => p521::ecdsa::Signature::from_slice(signature)
                .is_ok_and(|sig| k.verify_prehash(&digest, &sig).is_ok()),
        }
    }
}

/// [`SignatureVerifier`] for `EC` JWKs.
#[derive(Debug, Clone, Copy, Default)]
pub struct EcdsaVerifier;

impl SignatureVerifier for EcdsaVerifier {
    fn verify(
        &self,
        key: &Jwk,
        params: &SignatureParams,
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, AuthError> {
        let key = EcPublicKey::from_jwk(key)?;
        Ok(key.verify(params, message, signature))
    }
}
