//! JSON Web Key (RFC 7517) types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::codec;
use crate::error::AuthError;

/// A single JSON Web Key.
///
/// Only the members needed for EC keys and key selection are typed; anything
/// else the provider publishes is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type (`EC`, `RSA`, ...).
    pub kty: String,

    /// Curve name for EC keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,

    /// X coordinate (base64url).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,

    /// Y coordinate (base64url).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,

    /// Intended JOSE algorithm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    /// Key ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// Public key use (`sig` or `enc`).
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,

    /// Members this crate does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Jwk {
    /// Creates a public EC key.
    #[must_use]
    pub fn ec(crv: impl Into<String>, x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            kty: "EC".to_string(),
            crv: Some(crv.into()),
            x: Some(x.into()),
            y: Some(y.into()),
            alg: None,
            kid: None,
            key_use: None,
            extra: Map::new(),
        }
    }

    /// Sets the key ID.
    #[must_use]
    pub fn with_kid(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    /// Sets the algorithm.
    #[must_use]
    pub fn with_alg(mut self, alg: impl Into<String>) -> Self {
        self.alg = Some(alg.into());
        self
    }

    /// Returns `true` if both `alg` and `kid` equal the given values.
    ///
    /// An absent member only matches an absent value.
    #[must_use]
    pub fn matches(&self, alg: Option<&str>, kid: Option<&str>) -> bool {
        self.alg.as_deref() == alg && self.kid.as_deref() == kid
    }

    /// Rebuilds the uncompressed SEC1 point `0x04 || x || y`.
    pub fn uncompressed_point(&self, coordinate_len: usize) -> Result<Vec<u8>, AuthError> {
        let x = self.coordinate("x", self.x.as_deref(), coordinate_len)?;
        let y = self.coordinate("y", self.y.as_deref(), coordinate_len)?;

        let mut point = Vec::with_capacity(1 + 2 * coordinate_len);
        point.push(0x04);
        point.extend_from_slice(&x);
        point.extend_from_slice(&y);
        Ok(point)
    }

    fn coordinate(
        &self,
        name: &str,
        value: Option<&str>,
        expected: usize,
    ) -> Result<Vec<u8>, AuthError> {
        let value =
            value.ok_or_else(|| AuthError::invalid_key(format!("EC key is missing '{name}'")))?;
        let bytes = codec::decode(value)
            .map_err(|e| AuthError::invalid_key(format!("EC key '{name}': {e}")))?;
        if bytes.len() != expected {
            return Err(AuthError::invalid_key(format!(
                "EC key '{name}' has {} bytes, expected {expected}",
                bytes.len()
            )));
        }
        Ok(bytes)
    }
}

/// A JSON Web Key Set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// Returns the first key whose `alg` and `kid` match.
    #[must_use]
    pub fn find(&self, alg: Option<&str>, kid: Option<&str>) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.matches(alg, kid))
    }
}
