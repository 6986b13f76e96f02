//! Base64url and JSON segment helpers.
//!
//! Output never carries `=` padding. Input may be padded or not; anything
//! outside the URL-safe alphabet, or a length that no byte string can encode
//! to (`len % 4 == 1`), is rejected.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::AuthError;

/// URL-safe engine that writes no padding and accepts either form on input.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encodes bytes as unpadded base64url.
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_LENIENT.encode(bytes)
}

/// Decodes base64url text, with or without trailing padding.
pub fn decode(text: &str) -> Result<Vec<u8>, AuthError> {
    URL_SAFE_LENIENT
        .decode(text)
        .map_err(|e| AuthError::malformed_encoding(format!("invalid base64url: {e}")))
}

/// Serializes a value to JSON and encodes the UTF-8 bytes as base64url.
pub fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<String, AuthError> {
    let json = serde_json::to_vec(value)
        .map_err(|e| AuthError::malformed_encoding(format!("JSON serialization failed: {e}")))?;
    Ok(encode(json))
}

/// Decodes a base64url segment and parses it as JSON.
pub fn decode_json<T: DeserializeOwned>(segment: &str) -> Result<T, AuthError> {
    let bytes = decode(segment)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::malformed_encoding(format!("segment is not valid JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use serde_json::{Value, json};

    #[test]
    fn test_known_vector() {
        assert_eq!(encode(b"1234567890"), "MTIzNDU2Nzg5MA");
        assert_eq!(decode("MTIzNDU2Nzg5MA").unwrap(), b"1234567890");
    }

    #[test]
    fn test_round_trip_all_remainders() {
        for len in 0..=6 {
            let bytes: Vec<u8> = (0..len).map(|i| (i * 37 + 250) as u8).collect();
            let encoded = encode(&bytes);
            assert!(!encoded.contains('='));
            assert_eq!(decode(&encoded).unwrap(), bytes, "length {len}");
        }
    }

    #[test]
    fn test_url_safe_alphabet() {
        let encoded = encode([0xfb, 0xff, 0xbf]);
        assert_eq!(encoded, "-_-_");
        assert_eq!(decode("-_-_").unwrap(), vec![0xfb, 0xff, 0xbf]);
    }

    #[test]
    fn test_padded_input_accepted() {
        assert_eq!(decode("MTIzNDU2Nzg5MA==").unwrap(), b"1234567890");
    }

    #[test]
    fn test_standard_alphabet_rejected() {
        let err = decode("+/+/").unwrap_err();
        assert!(matches!(err, AuthError::MalformedEncoding { .. }));
    }

    #[test]
    fn test_impossible_length_rejected() {
        let err = decode("A").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Token);
        assert!(decode("AAAAA").is_err());
    }

    #[test]
    fn test_json_helpers() {
        let value = json!({"alg": "ES256", "typ": "JWT"});
        let segment = encode_json(&value).unwrap();
        let decoded: Value = decode_json(&segment).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_decode_json_rejects_non_json() {
        let segment = encode(b"not json");
        let err = decode_json::<Value>(&segment).unwrap_err();
        assert!(matches!(err, AuthError::MalformedEncoding { .. }));
    }
}
