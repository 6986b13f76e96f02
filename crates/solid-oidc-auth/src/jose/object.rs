//! JOSE objects and the compact serialization.

use serde_json::{Map, Value};

use crate::codec;
use crate::crypto::{SignatureParams, Signer};
use crate::error::AuthError;

/// Insertion-ordered JSON object used for headers and claims.
pub type JsonObject = Map<String, Value>;

/// Allowance for `iat` values slightly ahead of the local clock, in seconds.
pub const IAT_LEEWAY_SECS: i64 = 60;

/// The segments of a compact token, borrowed from the input text.
///
/// Segments past the third are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactToken<'a> {
    pub header: &'a str,
    pub claims: &'a str,
    pub signature: Option<&'a str>,
}

impl<'a> CompactToken<'a> {
    /// Splits `token` on `.`. At least two segments are required.
    pub fn split(token: &'a str) -> Result<Self, AuthError> {
        let mut parts = token.split('.');
        match (parts.next(), parts.next()) {
            (Some(header), Some(claims)) => Ok(Self {
                header,
                claims,
                signature: parts.next(),
            }),
            _ => Err(AuthError::malformed_token(
                "expected at least 2 segments, got 1",
            )),
        }
    }

    /// The exact bytes a signature covers: `header "." claims`.
    #[must_use]
    pub fn signing_input(&self) -> String {
        format!("{}.{}", self.header, self.claims)
    }

    /// Decodes the third segment.
    pub fn signature_bytes(&self) -> Result<Vec<u8>, AuthError> {
        let segment = self
            .signature
            .ok_or_else(|| AuthError::malformed_token("token has no signature segment"))?;
        codec::decode(segment)
    }
}

/// A JOSE header and claim set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoseObject {
    pub header: JsonObject,
    pub claims: JsonObject,
}

impl JoseObject {
    #[must_use]
    pub fn new(header: JsonObject, claims: JsonObject) -> Self {
        Self { header, claims }
    }

    /// Builds an object from two JSON values, both of which must be objects.
    pub fn from_values(header: Value, claims: Value) -> Result<Self, AuthError> {
        Ok(Self {
            header: into_object("header", header)?,
            claims: into_object("claims", claims)?,
        })
    }

    /// Parses a compact token. Only the first two segments are read.
    ///
    /// Any decoding problem in those segments is reported as `MalformedToken`.
    pub fn parse(token: &str) -> Result<Self, AuthError> {
        let compact = CompactToken::split(token)?;
        Ok(Self {
            header: decode_segment("header", compact.header)?,
            claims: decode_segment("claims", compact.claims)?,
        })
    }

    /// Unsigned compact form: `b64u(header) "." b64u(claims)`.
    #[must_use]
    pub fn serialize(&self) -> String {
        format!(
            "{}.{}",
            encode_object(&self.header),
            encode_object(&self.claims)
        )
    }

    /// Signs the serialized form and returns the three-segment token.
    pub async fn sign(
        &self,
        signer: &dyn Signer,
        params: &SignatureParams,
    ) -> Result<String, AuthError> {
        let input = self.serialize();
        let signature = signer.sign(params, input.as_bytes()).await?;
        Ok(format!("{input}.{}", codec::encode(signature)))
    }

    /// Header `alg`.
    #[must_use]
    pub fn algorithm(&self) -> Option<&str> {
        self.header.get("alg").and_then(Value::as_str)
    }

    /// Header `kid`.
    #[must_use]
    pub fn key_id(&self) -> Option<&str> {
        self.header.get("kid").and_then(Value::as_str)
    }

    /// Header `typ`.
    #[must_use]
    pub fn token_type(&self) -> Option<&str> {
        self.header.get("typ").and_then(Value::as_str)
    }

    #[must_use]
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    #[must_use]
    pub fn claim_str(&self, name: &str) -> Option<&str> {
        self.claim(name).and_then(Value::as_str)
    }

    /// A NumericDate claim in seconds. Fractional values are kept.
    #[must_use]
    pub fn numeric_date(&self, name: &str) -> Option<f64> {
        self.claim(name).and_then(Value::as_f64)
    }

    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.claim_str("iss")
    }

    /// The `aud` claim as a list, whether it was sent as a string or an array.
    /// Non-string array members are skipped.
    #[must_use]
    pub fn audience(&self) -> Vec<&str> {
        match self.claim("aud") {
            Some(Value::String(aud)) => vec![aud.as_str()],
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Returns `true` if `aud` contains exactly `audience`.
    #[must_use]
    pub fn has_audience(&self, audience: &str) -> bool {
        self.audience().contains(&audience)
    }

    /// Whether `iat` is before `now` plus [`IAT_LEEWAY_SECS`]. `None` without `iat`.
    #[must_use]
    pub fn issued_before(&self, now: i64) -> Option<bool> {
        let limit = (now + IAT_LEEWAY_SECS) as f64;
        self.numeric_date("iat").map(|iat| iat < limit)
    }

    /// Whether `exp` is after `now`. `None` without `exp`.
    #[must_use]
    pub fn expires_after(&self, now: i64) -> Option<bool> {
        self.numeric_date("exp").map(|exp| exp > now as f64)
    }
}

fn into_object(what: &str, value: Value) -> Result<JsonObject, AuthError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(AuthError::malformed_token(format!(
            "{what} must be a JSON object, got {other}"
        ))),
    }
}

fn decode_segment(what: &str, segment: &str) -> Result<JsonObject, AuthError> {
    let value: Value = codec::decode_json(segment)
        .map_err(|e| AuthError::malformed_token(format!("{what} segment: {e}")))?;
    into_object(what, value)
}

fn encode_object(object: &JsonObject) -> String {
    codec::encode(Value::Object(object.clone()).to_string())
}
