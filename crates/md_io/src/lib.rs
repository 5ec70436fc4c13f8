//! md_io: offline I/O for the match/award engine.
//!
//! - Shared error type (`IoError`) with `From` conversions used across modules.
//! - `canonical_json`: sorted-key compact JSON and atomic file writes.
//! - `hasher`: SHA-256 over raw and canonical bytes, report ids.
//! - `normalize`: legacy score shapes → `ScoreMatrix`.
//! - `loader`: season bundle → typed `SeasonBundle`.
//!
//! No network access; URL-like paths are rejected.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for md_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (open, read limits, rename, URL paths).
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON syntax or shape errors with a JSON Pointer into the document.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Structurally valid JSON that is not a usable season bundle.
    #[error("bundle error: {0}")]
    Bundle(String),

    #[error("hash error: {0}")]
    Hash(String),

    /// Parameter parse or domain errors.
    #[error("params error: {0}")]
    Params(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json keeps no pointer; callers enrich when they know one.
        IoError::Json { pointer: "/".to_string(), msg: e.to_string() }
    }
}

impl From<md_core::variables::VarsError> for IoError {
    fn from(e: md_core::variables::VarsError) -> Self {
        IoError::Params(e.to_string())
    }
}

pub mod canonical_json;
pub mod hasher;
pub mod loader;
pub mod normalize;

/// Returns true if `s` looks like a URL (any `<scheme>://`, plus bare http(s):).
#[inline]
pub fn looks_like_url_strict(s: &str) -> bool {
    let s = s.trim();
    s.contains("://") || s.starts_with("http:") || s.starts_with("https:")
}

pub mod prelude {
    pub use crate::{looks_like_url_strict, IoError, IoResult};

    pub use crate::canonical_json::{to_canonical_json_bytes, write_canonical_file};
    pub use crate::hasher::{report_id, sha256_canonical, sha256_hex};
    pub use crate::loader::{load_bundle, parse_bundle, MatchRecord, SeasonBundle};
    pub use crate::normalize::{detect_shape, normalize_fields, normalize_scores, LegacyShape};
}
