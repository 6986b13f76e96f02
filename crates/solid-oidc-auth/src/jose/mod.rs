//! Minimal JOSE: compact JWS objects, JWKs and ID token validation.
//!
//! Only compact serialization and ECDSA signatures are supported. There is no
//! JWE support.

mod algorithm;
mod jwk;
mod jwks;
mod object;
mod validate;

pub use algorithm::{
    dpop_signature_params, jose_algorithm_name, resolve_key_algorithm, resolve_signature_params,
};
pub use jwk::{Jwk, JwkSet};
pub use jwks::{JwksError, fetch_jwks};
pub use object::{CompactToken, IAT_LEEWAY_SECS, JoseObject, JsonObject};
pub use validate::TokenValidator;
