//! Deterministic hashing and ids for canonical artifacts.
//!
//! - `sha256_canonical(..)` for JSON values/structs (goes through canonical_json).
//! - `sha256_hex(..)` for raw bytes.
//! - Report ids are `RPT:<hex>` over the canonical report body.
//!
//! Hex digests are always lowercase.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::canonical_json::to_canonical_bytes;
use crate::{IoError, IoResult};

/// Prefix of report ids.
pub const REPORT_ID_PREFIX: &str = "RPT:";

/// SHA-256 over raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 over the canonical JSON bytes of any serializable value.
pub fn sha256_canonical<T: Serialize>(value: &T) -> IoResult<String> {
    let bytes = to_canonical_bytes(value).map_err(|e| IoError::Hash(e.to_string()))?;
    Ok(sha256_hex(&bytes))
}

/// `RPT:<hex>` id for a report body.
pub fn report_id<T: Serialize>(body: &T) -> IoResult<String> {
    Ok(format!("{REPORT_ID_PREFIX}{}", sha256_canonical(body)?))
}

/// True for a lowercase 64-char hex digest.
pub fn is_lower_hex_64(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|c| matches!(c, b'0'..=b'9' | b'a'..=b'f'))
}
