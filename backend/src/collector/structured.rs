//! Structured-document collector.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{read_source, Collector, RawRecord};
use crate::error::{CollectError, CollectResult};

/// Collects the objects of a JSON document.
///
/// A top-level object becomes a one-element sequence; a top-level array is
/// returned as is and must hold only objects.
#[derive(Debug, Clone)]
pub struct JsonCollector {
    path: PathBuf,
}

impl JsonCollector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Split an already-parsed document into records.
    pub fn records_from_value(document: Value) -> CollectResult<Vec<RawRecord>> {
        match document {
            Value::Object(record) => Ok(vec![record]),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Value::Object(record) => Ok(record),
                    _ => Err(CollectError::NotARecord { index }),
                })
                .collect(),
            _ => Err(CollectError::NotARecord { index: 0 }),
        }
    }
}

impl Collector for JsonCollector {
    fn collect(&self) -> CollectResult<Vec<RawRecord>> {
        let bytes = read_source(&self.path)?;
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);
        let document: Value = serde_json::from_slice(bytes)?;
        Self::records_from_value(document)
    }

    fn source(&self) -> &Path {
        &self.path
    }
}
