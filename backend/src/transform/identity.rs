//! Derived identifiers.
//!
//! Review and stream ids are lowercase hex SHA-1 digests over the UTF-8
//! concatenation of their defining fields, so reloading the same row
//! always lands on the same key.

use chrono::{NaiveDateTime, Timelike};
use sha1::{Digest, Sha1};

/// SHA-1 of the concatenated parts, hex encoded.
pub fn content_hash(parts: &[&str]) -> String {
    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Render a timestamp as `YYYY-MM-DD HH:MM:SS`, adding `.ffffff` only when
/// the microseconds are non-zero.
///
/// Ids computed by earlier loads use this spelling; changing it changes
/// every stream key.
pub fn canonical_timestamp(dt: &NaiveDateTime) -> String {
    let micros = dt.nanosecond() / 1_000;
    if micros == 0 {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        format!("{}.{:06}", dt.format("%Y-%m-%d %H:%M:%S"), micros)
    }
}
