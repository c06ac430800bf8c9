//! Error types for the Strider load pipeline.
//!
//! This module defines one error enum per pipeline layer:
//!
//! - [`CollectError`] - reading and parsing source files
//! - [`ValidationError`] - raw records that do not fit their raw shape
//! - [`DerivationError`] - raw records that cannot produce a domain entity
//! - [`RepositoryError`] - persistence failures and repository misconfiguration
//! - [`ConfigError`] - connection-string and store bootstrap errors
//! - [`LoadError`] - top-level errors returned by the load service
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::EntityKind;

// =============================================================================
// Collector Errors
// =============================================================================

/// Errors while reading a source file into raw records.
#[derive(Debug, Error)]
pub enum CollectError {
    /// Source file is unreadable.
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed delimited content.
    #[error("Invalid CSV content: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed structured content.
    #[error("Invalid JSON content: {0}")]
    Json(#[from] serde_json::Error),

    /// Structured document holds something other than objects.
    #[error("Record {index} is not an object")]
    NotARecord { index: usize },

    /// Delimited content whose header row names no column.
    #[error("Header row has no column names")]
    BlankHeader,
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A raw record failed validation against its raw shape.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Schema validation failed (missing or mistyped fields).
    #[error("Record {index} failed validation: {}", errors.join("; "))]
    Schema { index: usize, errors: Vec<String> },

    /// Field passed the schema but could not be coerced (e.g. a bad timestamp).
    #[error("Record {index} could not be decoded: {message}")]
    Decode { index: usize, message: String },

    /// The embedded schema for a kind is broken.
    #[error("Invalid embedded schema for {kind}: {message}")]
    InvalidSchema { kind: EntityKind, message: String },
}

// =============================================================================
// Derivation Errors
// =============================================================================

/// A validated raw record could not be turned into a domain entity.
#[derive(Debug, Error, PartialEq)]
pub enum DerivationError {
    /// Named author without a birth date.
    #[error("Author '{author}' has no birth date")]
    MissingBirthDate { author: String },

    /// No nationality entry carries a slug.
    #[error("Author '{author}' has no nationality with a slug")]
    NoNationality { author: String },

    /// Every movie item title is null, empty or the `end` sentinel.
    #[error("Review has no qualifying movie title")]
    NoMovieTitle,

    /// Review references no book.
    #[error("Review has no book item")]
    NoBookItem,
}

// =============================================================================
// Repository Errors
// =============================================================================

/// Errors from a repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Entity table declares no primary-key column.
    #[error("Table '{table}' declares no primary key")]
    MissingPrimaryKey { table: &'static str },

    /// Underlying store failure (statement or commit).
    #[error("Store error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while resolving configuration or opening the store.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Connection string names a store this tool cannot open.
    #[error("Unsupported database URL '{0}' (expected sqlite://...)")]
    UnsupportedScheme(String),

    /// Store could not be opened.
    #[error("Cannot open database '{url}': {source}")]
    Open {
        url: String,
        #[source]
        source: rusqlite::Error,
    },
}

// =============================================================================
// Load Errors (top-level)
// =============================================================================

/// Top-level load orchestration errors.
///
/// This is the error type returned by every `load_*` operation in
/// [`crate::transform::pipeline`]. It wraps all lower-level errors.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Source could not be collected.
    #[error("Collect error: {0}")]
    Collect(#[from] CollectError),

    /// A raw record failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A record could not be transformed.
    #[error("Derivation error on record {index}: {source}")]
    Derivation {
        index: usize,
        #[source]
        source: DerivationError,
    },

    /// Persistence failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Store could not be opened or configured.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for collector operations.
pub type CollectResult<T> = Result<T, CollectError>;

/// Result type for raw validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for domain builders.
pub type DerivationResult<T> = Result<T, DerivationError>;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;
