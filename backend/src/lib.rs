//! # Strider - batch loader for a movie and book catalog
//!
//! Strider reads CSV and JSON exports of six entity kinds (movies, streams,
//! users, authors, books and reviews), validates each record against its raw
//! shape, derives the domain entity, and upserts the batch into SQLite.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV / JSON │────▶│  Collector  │────▶│  Validate + │────▶│  SQLite     │
//! │   (source)  │     │ (raw recs)  │     │  Build      │     │  (upsert)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use strider::{load, CsvCollector, EntityKind, Store};
//!
//! let mut store = Store::open_in_memory()?;
//! store.init_schema()?;
//! let report = load(EntityKind::Movie, &CsvCollector::new("movies.csv"), &mut store)?;
//! println!("Loaded {} movies", report.persisted);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Connection-string resolution
//! - [`logging`] - Subscriber setup and log helpers
//! - [`collector`] - CSV and JSON sources
//! - [`models`] - Domain entities and raw shapes
//! - [`validation`] - Embedded JSON Schemas per kind
//! - [`transform`] - Builders, derived ids and the load service
//! - [`repository`] - Upsert and lookup by key
//! - [`store`] - Scoped SQLite connection

// Core modules
pub mod config;
pub mod error;
pub mod logging;
pub mod models;

// Sources
pub mod collector;

// Validation
pub mod validation;

// Transformation
pub mod transform;

// Persistence
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CollectError, ConfigError, DerivationError, LoadError, RepositoryError, ValidationError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Author, Book, EntityKind, Movie, Review, Stream, User};

// =============================================================================
// Re-exports - Sources and validation
// =============================================================================

pub use collector::{Collector, CsvCollector, JsonCollector, RawRecord};
pub use validation::RawValidator;

// =============================================================================
// Re-exports - Load service
// =============================================================================

pub use transform::pipeline::{
    check, load, load_authors, load_books, load_movies, load_reviews, load_streams, load_users,
    LoadReport,
};

// =============================================================================
// Re-exports - Persistence
// =============================================================================

pub use config::DatabaseUrl;
pub use repository::{Entity, Repository, SqlRepository};
pub use store::Store;
