//! Raw record validation against per-kind JSON Schemas.
//!
//! Validation runs in two steps:
//!
//! 1. The untyped record is checked against the kind's embedded JSON Schema
//!    (Draft 7). Every violation is reported, not just the first.
//! 2. The record is decoded into its typed raw shape from [`crate::models::raw`],
//!    which coerces numeric strings and timestamps.
//!
//! # Embedded Schemas
//!
//! Schemas are embedded at compile time from the `schemas/` directory,
//! one file per [`EntityKind`].
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use strider::{EntityKind, RawValidator};
//! use strider::models::raw::BookRaw;
//!
//! let validator = RawValidator::for_kind(EntityKind::Book)?;
//! let raw: BookRaw = validator.decode(0, json!({
//!     "name": "An Evil Cradling",
//!     "pages": "448",
//!     "author": "Brian Keenan",
//!     "publisher": "Vintage"
//! }))?;
//! assert_eq!(raw.pages, 448);
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ValidationError, ValidationResult};
use crate::models::EntityKind;

/// Embedded JSON Schema source for a kind.
pub fn schema_source(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Movie => include_str!("../../schemas/movie.json"),
        EntityKind::Stream => include_str!("../../schemas/stream.json"),
        EntityKind::User => include_str!("../../schemas/user.json"),
        EntityKind::Author => include_str!("../../schemas/author.json"),
        EntityKind::Book => include_str!("../../schemas/book.json"),
        EntityKind::Review => include_str!("../../schemas/review.json"),
    }
}

/// Compiled validator for one entity kind.
///
/// Build it once per load and reuse it for every record.
pub struct RawValidator {
    validator: jsonschema::Validator,
}

impl RawValidator {
    /// Compile the embedded schema for `kind`.
    pub fn for_kind(kind: EntityKind) -> ValidationResult<Self> {
        let schema: Value =
            serde_json::from_str(schema_source(kind)).map_err(|e| ValidationError::InvalidSchema {
                kind,
                message: e.to_string(),
            })?;

        let validator =
            jsonschema::draft7::new(&schema).map_err(|e| ValidationError::InvalidSchema {
                kind,
                message: e.to_string(),
            })?;

        Ok(Self { validator })
    }

    /// Check presence and types of every field of record number `index`.
    pub fn check(&self, index: usize, record: &Value) -> ValidationResult<()> {
        let errors: Vec<String> = self
            .validator
            .iter_errors(record)
            .map(|e| e.to_string())
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Schema { index, errors })
        }
    }

    /// Check record number `index`, then decode it into its raw shape.
    pub fn decode<T: DeserializeOwned>(&self, index: usize, record: Value) -> ValidationResult<T> {
        self.check(index, &record)?;
        serde_json::from_value(record).map_err(|e| ValidationError::Decode {
            index,
            message: e.to_string(),
        })
    }
}
