//! Delimited-text collector.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use super::{decode_content, detect_delimiter, detect_encoding, read_source, Collector, RawRecord};
use crate::error::{CollectError, CollectResult};

/// Collects rows of a delimited file as string-valued records.
///
/// The first row names the fields; later rows are zipped against it by
/// position. Short rows are padded with empty strings, extra cells are
/// ignored.
#[derive(Debug, Clone)]
pub struct CsvCollector {
    path: PathBuf,
    /// `None` means detect from the header line.
    delimiter: Option<u8>,
}

impl CsvCollector {
    /// Comma-delimited collector for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: Some(b','),
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Pick the delimiter from the header line at collect time.
    pub fn detect_delimiter(mut self) -> Self {
        self.delimiter = None;
        self
    }

    /// Parse already-decoded content.
    pub fn parse_str(content: &str, delimiter: u8) -> CollectResult<Vec<RawRecord>> {
        let mut reader = ::csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if headers.is_empty() {
            return Ok(Vec::new());
        }
        if headers.iter().all(|h| h.is_empty()) {
            return Err(CollectError::BlankHeader);
        }

        let mut records = Vec::new();

        for row in reader.records() {
            let row = row?;

            if row.iter().all(|cell| cell.is_empty()) {
                continue;
            }

            let mut record = RawRecord::new();
            for (i, header) in headers.iter().enumerate() {
                let value = row.get(i).unwrap_or("");
                record.insert(header.clone(), Value::String(value.to_string()));
            }
            records.push(record);
        }

        Ok(records)
    }
}

impl Collector for CsvCollector {
    fn collect(&self) -> CollectResult<Vec<RawRecord>> {
        let bytes = read_source(&self.path)?;
        let encoding = detect_encoding(&bytes);
        let content = decode_content(&bytes, &encoding);
        let delimiter = self
            .delimiter
            .unwrap_or_else(|| detect_delimiter(&content));

        debug!(
            path = %self.path.display(),
            encoding = %encoding,
            delimiter = %char::from(delimiter).escape_default(),
            "Parsing delimited source"
        );

        Self::parse_str(&content, delimiter)
    }

    fn source(&self) -> &Path {
        &self.path
    }
}
