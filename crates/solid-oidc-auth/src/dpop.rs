//! DPoP proof generation (RFC 9449).
//!
//! A [`DpopProver`] owns one signing key for the lifetime of an authorization
//! attempt and mints a fresh proof for every request it is asked to bind.
//! The key is never mutated after construction, so concurrent calls to
//! [`DpopProver::generate_token`] are safe and each gets its own `jti`.

use std::sync::Arc;

use serde_json::json;

use crate::clock::{Clock, SystemClock};
use crate::codec;
use crate::crypto::{EcCurve, EcKeyPair, Signer};
use crate::error::AuthError;
use crate::jose::{JoseObject, Jwk, dpop_signature_params};
use crate::random::{OsRandom, RandomSource};

/// `typ` header of a DPoP proof.
pub const DPOP_TOKEN_TYPE: &str = "dpop+jwt";

/// Seconds between a proof's `iat` and `exp`.
pub const DPOP_PROOF_LIFETIME_SECS: i64 = 300;

/// Mints DPoP proofs with a fixed key.
#[derive(Clone)]
pub struct DpopProver {
    signer: Arc<dyn Signer>,
    random: Arc<dyn RandomSource>,
    clock: Arc<dyn Clock>,
}

impl DpopProver {
    /// Creates a prover around an existing signer.
    #[must_use]
    pub fn new(signer: Arc<dyn Signer>) -> Self {
        Self {
            signer,
            random: Arc::new(OsRandom),
            clock: Arc::new(SystemClock),
        }
    }

    /// Creates a prover with a freshly generated key on `curve`.
    #[must_use]
    pub fn generate(curve: EcCurve) -> Self {
        Self::new(Arc::new(EcKeyPair::generate(curve)))
    }

    /// Replaces the randomness used for `jti`.
    #[must_use]
    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Replaces the clock used for `iat` and `exp`.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Public key embedded in every proof.
    #[must_use]
    pub fn public_jwk(&self) -> Jwk {
        self.signer.public_jwk()
    }

    /// Mints a proof bound to `htu` and `htm`.
    ///
    /// The `alg` header is derived from the key: the first letter of `kty`,
    /// `S`, then the digest size paired with the curve (`ES256`, `ES384`,
    /// `ES512`). Keys on any other curve are `UnsupportedAlgorithm`.
    pub async fn generate_token(&self, htu: &str, htm: &str) -> Result<String, AuthError> {
        let jwk = self.signer.public_jwk();
        let (alg, params) = dpop_signature_params(&jwk)?;

        let header = json!({
            "alg": alg,
            "typ": DPOP_TOKEN_TYPE,
            "jwk": jwk,
        });

        let now = self.clock.now();
        let jti = codec::encode(self.random.next_u32().to_string());
        let claims = json!({
            "jti": jti,
            "htm": htm,
            "htu": htu,
            "iat": now,
            "exp": now + DPOP_PROOF_LIFETIME_SECS,
        });

        let token = JoseObject::from_values(header, claims)?
            .sign(self.signer.as_ref(), &params)
            .await?;

        tracing::trace!("Minted DPoP proof for {} {}", htm, htu);
        Ok(token)
    }
}

impl std::fmt::Debug for DpopProver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DpopProver")
            .field("jwk", &self.signer.public_jwk())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
    use serde_json::Value;

    use super::*;
    use crate::clock::FixedClock;
    use crate::crypto::{EcdsaVerifier, SignatureParams, SignatureVerifier};
    use crate::jose::{CompactToken, resolve_signature_params};
    use crate::random::testing::RepeatByte;

    const HTU: &str = "https://idp.example/token";

    fn prover(curve: EcCurve) -> DpopProver {
        DpopProver::generate(curve).with_clock(Arc::new(FixedClock(1_700_000_000)))
    }

    #[tokio::test]
    async fn test_header_alg_per_curve() {
        for (curve, expected) in [
            (EcCurve::P256, "ES256"),
            (EcCurve::P384, "ES384"),
            (EcCurve::P521, "ES512"),
        ] {
            let token = prover(curve).generate_token(HTU, "POST").await.unwrap();
            let object = JoseObject::parse(&token).unwrap();
            assert_eq!(object.algorithm(), Some(expected));
            assert_eq!(object.token_type(), Some(DPOP_TOKEN_TYPE));
        }
    }

    #[tokio::test]
    async fn test_header_key_order_and_jwk() {
        let prover = prover(EcCurve::P256);
        let token = prover.generate_token(HTU, "POST").await.unwrap();
        let object = JoseObject::parse(&token).unwrap();

        let keys: Vec<&str> = object.header.keys().map(String::as_str).collect();
        assert_eq!(keys, ["alg", "typ", "jwk"]);

        let jwk: Jwk = serde_json::from_value(object.header["jwk"].clone()).unwrap();
        assert_eq!(jwk, prover.public_jwk());
        assert!(jwk.kid.is_none());
    }

    #[tokio::test]
    async fn test_claims() {
        let token = prover(EcCurve::P256)
            .with_random(Arc::new(RepeatByte(0)))
            .generate_token(HTU, "POST")
            .await
            .unwrap();
        let object = JoseObject::parse(&token).unwrap();

        assert_eq!(object.claim_str("htu"), Some(HTU));
        assert_eq!(object.claim_str("htm"), Some("POST"));
        assert_eq!(object.claim("iat"), Some(&json!(1_700_000_000)));
        assert_eq!(object.claim("exp"), Some(&json!(1_700_000_300)));
        // base64url of the text "0"
        assert_eq!(object.claim_str("jti"), Some("MA"));
    }

    #[tokio::test]
    async fn test_lifetime_is_five_minutes() {
        let token = DpopProver::generate(EcCurve::P384)
            .generate_token(HTU, "GET")
            .await
            .unwrap();
        let object = JoseObject::parse(&token).unwrap();
        let iat = object.claim("iat").and_then(Value::as_i64).unwrap();
        let exp = object.claim("exp").and_then(Value::as_i64).unwrap();
        assert_eq!(exp - iat, DPOP_PROOF_LIFETIME_SECS);
    }

    #[tokio::test]
    async fn test_fresh_jti_per_proof() {
        let prover = DpopProver::generate(EcCurve::P256);
        let a = JoseObject::parse(&prover.generate_token(HTU, "POST").await.unwrap()).unwrap();
        let b = JoseObject::parse(&prover.generate_token(HTU, "POST").await.unwrap()).unwrap();
        // two random u32s colliding is a 1 in 2^32 event
        assert_ne!(a.claim_str("jti"), b.claim_str("jti"));
    }

    #[tokio::test]
    async fn test_signature_verifies_with_embedded_key() {
        let token = prover(EcCurve::P256).generate_token(HTU, "POST").await.unwrap();
        let object = JoseObject::parse(&token).unwrap();
        let jwk: Jwk = serde_json::from_value(object.header["jwk"].clone()).unwrap();

        let compact = CompactToken::split(&token).unwrap();
        let params = resolve_signature_params(object.algorithm().unwrap()).unwrap();
        assert!(
            EcdsaVerifier
                .verify(
                    &jwk,
                    &params,
                    compact.signing_input().as_bytes(),
                    &compact.signature_bytes().unwrap()
                )
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_proof_accepted_by_jsonwebtoken() {
        let prover = DpopProver::generate(EcCurve::P256);
        let token = prover.generate_token(HTU, "POST").await.unwrap();

        let jwk = prover.public_jwk();
        let key =
            DecodingKey::from_ec_components(jwk.x.as_deref().unwrap(), jwk.y.as_deref().unwrap())
                .unwrap();
        let mut validation = Validation::new(Algorithm::ES256);
        validation.validate_aud = false;

        let data = decode::<Value>(&token, &key, &validation).unwrap();
        assert_eq!(data.claims["htu"], HTU);
        assert_eq!(data.header.typ.as_deref(), Some(DPOP_TOKEN_TYPE));
    }

    struct UnsupportedCurveSigner;

    #[async_trait]
    impl Signer for UnsupportedCurveSigner {
        fn public_jwk(&self) -> Jwk {
            Jwk::ec("P-192", "AAAA", "AAAA")
        }

        async fn sign(&self, _: &SignatureParams, _: &[u8]) -> Result<Vec<u8>, AuthError> {
            Err(AuthError::signing("should not be called"))
        }
    }

    #[tokio::test]
    async fn test_unsupported_curve() {
        let prover = DpopProver::new(Arc::new(UnsupportedCurveSigner));
        let err = prover.generate_token(HTU, "POST").await.unwrap_err();
        assert!(matches!(err, AuthError::UnsupportedAlgorithm { .. }));
        assert!(err.to_string().contains("P-192"));
    }
}
