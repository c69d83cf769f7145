//! Credential normalization and fingerprint digesting.
//!
//! A submitted username/password pair is reduced to a deterministic
//! fingerprint before lookup: the username is lowercased and both values are
//! brought into Unicode NFC form, so visually identical credentials with
//! different byte representations produce the same digest. The normalized
//! pair is concatenated without a separator; distinct pairs whose
//! concatenation collides are treated as equivalent. That ambiguity is
//! inherited from the lookup database's fingerprint format and must not be
//! changed here, or existing hashes stop matching.
//!
//! The full fingerprint input and digest are sensitive. Callers log at most
//! a short digest prefix, never the input.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};
use unicode_normalization::UnicodeNormalization;

use crate::error::{CredGateError, Result};

/// Digest algorithm applied to the normalized credential pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha1,
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

/// Normalize a credential pair into the fingerprint input string.
///
/// The username is lowercased (locale-independent) and both values are NFC
/// normalized, then concatenated username-first with no separator. Errors
/// when either value is not a JSON string; the pipeline treats that as "no
/// fingerprint produced", not as a request failure.
pub fn normalize(username: &Value, password: &Value) -> Result<String> {
    let Value::String(username) = username else {
        return Err(CredGateError::Normalization(
            "username is not a string".to_string(),
        ));
    };
    let Value::String(password) = password else {
        return Err(CredGateError::Normalization(
            "password is not a string".to_string(),
        ));
    };

    let username: String = username.to_lowercase().nfc().collect();
    let password: String = password.nfc().collect();
    Ok(format!("{}{}", username, password))
}

/// Compute the lowercase hex digest of a fingerprint input.
///
/// Pure function of its inputs: the UTF-8 bytes of `input` are hashed with
/// the selected algorithm and rendered two hex characters per byte.
pub fn digest_hex(algorithm: HashAlgorithm, input: &str) -> String {
    let bytes = input.as_bytes();
    match algorithm {
        HashAlgorithm::Sha1 => hex::encode(Sha1::digest(bytes)),
        HashAlgorithm::Sha256 => hex::encode(Sha256::digest(bytes)),
        HashAlgorithm::Sha384 => hex::encode(Sha384::digest(bytes)),
        HashAlgorithm::Sha512 => hex::encode(Sha512::digest(bytes)),
    }
}
