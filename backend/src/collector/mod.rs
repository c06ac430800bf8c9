//! Source collectors: files to untyped raw records.
//!
//! A [`Collector`] reads one source file eagerly and returns its rows as
//! JSON objects. Nothing entity-specific happens here.
//!
//! - [`CsvCollector`] - delimited text, header row first, every value a string
//! - [`JsonCollector`] - a single object or an array of objects
//!
//! Byte decoding is shared: the encoding is detected (UTF-8, ISO-8859-1,
//! Windows-1252) before parsing.

mod delimited;
mod structured;

pub use delimited::CsvCollector;
pub use structured::JsonCollector;

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{CollectError, CollectResult};

/// One untyped record: field name to value.
pub type RawRecord = Map<String, Value>;

/// Capability shared by every source format.
pub trait Collector {
    /// Read the whole source into memory.
    fn collect(&self) -> CollectResult<Vec<RawRecord>>;

    /// Source location, for logs and error messages.
    fn source(&self) -> &Path;
}

/// Read a source file, keeping the path in the error.
pub(crate) fn read_source(path: &Path) -> CollectResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| CollectError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 wins outright; otherwise chardet decides.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let charset = chardet::detect(bytes).0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the given encoding.
///
/// Unknown encodings fall back to lossy UTF-8. A leading byte-order mark is
/// dropped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };

    match decoded.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => decoded,
    }
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Falls back to `,` when the header holds none of the candidates.
pub fn detect_delimiter(content: &str) -> u8 {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [b',', b';', b'\t', b'|'];
    let mut best_sep = b',';
    let mut best_count = 0;

    for sep in separators {
        let count = first_line.bytes().filter(|&b| b == sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}
