//! Load service: collect, validate, build, persist.
//!
//! One operation per entity kind (`load_movies`, `load_streams`, ...) plus
//! the [`load`] dispatcher used by the CLI.
//!
//! ```text
//! ┌───────────┐     ┌────────────┐     ┌───────────┐     ┌────────────┐
//! │ Collector │────▶│ Validator  │────▶│  Builder  │────▶│ Repository │
//! │ (csv/json)│     │ (raw shape)│     │ (entity)  │     │  (upsert)  │
//! └───────────┘     └────────────┘     └───────────┘     └────────────┘
//! ```
//!
//! The first record that fails validation or derivation aborts the load
//! before anything is persisted; the error carries the record index.
//!
//! # Example
//!
//! ```rust,ignore
//! use strider::{load_movies, CsvCollector, Store};
//!
//! let mut store = Store::open_in_memory()?;
//! store.init_schema()?;
//! let report = load_movies(
//!     &CsvCollector::new("movies.csv"),
//!     &mut store.repository()?,
//! )?;
//! println!("{} movies persisted", report.persisted);
//! ```

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::builder::{build_author, build_book, build_movie, build_review, build_stream, build_user};
use crate::collector::{Collector, RawRecord};
use crate::error::{DerivationResult, LoadError, LoadResult};
use crate::logging::{log_info, log_success, log_warning};
use crate::models::raw::{AuthorRaw, BookRaw, MovieRaw, ReviewRaw, StreamRaw, UserRaw};
use crate::models::{Author, Book, EntityKind, Movie, Review, Stream, User};
use crate::repository::{Entity, Repository};
use crate::store::Store;
use crate::validation::RawValidator;

// =============================================================================
// Loadable entities
// =============================================================================

/// An entity the load service can produce from one raw record.
pub trait Loadable: Entity {
    const KIND: EntityKind;

    /// Validated raw shape.
    type Raw: DeserializeOwned;

    /// `Ok(None)` drops the record without failing the load.
    fn build(raw: Self::Raw) -> DerivationResult<Option<Self>>;
}

impl Loadable for Movie {
    const KIND: EntityKind = EntityKind::Movie;
    type Raw = MovieRaw;

    fn build(raw: MovieRaw) -> DerivationResult<Option<Self>> {
        Ok(Some(build_movie(raw)))
    }
}

impl Loadable for Stream {
    const KIND: EntityKind = EntityKind::Stream;
    type Raw = StreamRaw;

    fn build(raw: StreamRaw) -> DerivationResult<Option<Self>> {
        Ok(Some(build_stream(raw)))
    }
}

impl Loadable for User {
    const KIND: EntityKind = EntityKind::User;
    type Raw = UserRaw;

    fn build(raw: UserRaw) -> DerivationResult<Option<Self>> {
        Ok(Some(build_user(raw)))
    }
}

impl Loadable for Author {
    const KIND: EntityKind = EntityKind::Author;
    type Raw = AuthorRaw;

    fn build(raw: AuthorRaw) -> DerivationResult<Option<Self>> {
        build_author(raw)
    }
}

impl Loadable for Book {
    const KIND: EntityKind = EntityKind::Book;
    type Raw = BookRaw;

    fn build(raw: BookRaw) -> DerivationResult<Option<Self>> {
        Ok(Some(build_book(raw)))
    }
}

impl Loadable for Review {
    const KIND: EntityKind = EntityKind::Review;
    type Raw = ReviewRaw;

    fn build(raw: ReviewRaw) -> DerivationResult<Option<Self>> {
        build_review(raw).map(Some)
    }
}

// =============================================================================
// Reports
// =============================================================================

/// Outcome of one load (or dry run).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub kind: EntityKind,
    pub source: PathBuf,
    /// Raw records read from the source.
    pub collected: usize,
    /// Records dropped by the builder (authors without a name).
    pub skipped: usize,
    /// Entities handed to the repository; zero for a dry run.
    pub persisted: usize,
}

/// Entities built from a batch of raw records.
#[derive(Debug)]
pub struct Derived<E> {
    pub entities: Vec<E>,
    pub skipped: usize,
}

// =============================================================================
// Generic steps
// =============================================================================

/// Validate and build every record, stopping at the first failure.
pub fn derive_batch<E: Loadable>(records: Vec<RawRecord>) -> LoadResult<Derived<E>> {
    let validator = RawValidator::for_kind(E::KIND)?;
    let mut entities = Vec::with_capacity(records.len());
    let mut skipped = 0;

    for (index, record) in records.into_iter().enumerate() {
        let raw: E::Raw = validator.decode(index, Value::Object(record))?;

        match E::build(raw).map_err(|source| LoadError::Derivation { index, source })? {
            Some(entity) => entities.push(entity),
            None => {
                skipped += 1;
                debug!(kind = %E::KIND, index, "Record dropped by builder");
            }
        }
    }

    Ok(Derived { entities, skipped })
}

/// Collect `collector`'s records and run them through [`derive_batch`].
fn collect_and_derive<E: Loadable>(collector: &dyn Collector) -> LoadResult<(usize, Derived<E>)> {
    let records = collector.collect()?;
    let collected = records.len();
    log_info(format!(
        "Collected {} {} record(s) from {}",
        collected,
        E::KIND,
        collector.source().display()
    ));

    let derived = derive_batch::<E>(records)?;
    if derived.skipped > 0 {
        log_warning(format!("Skipped {} {} record(s)", derived.skipped, E::KIND));
    }

    Ok((collected, derived))
}

/// Full load of one kind into `repo`.
pub fn load_entities<E: Loadable>(
    collector: &dyn Collector,
    repo: &mut impl Repository<E>,
) -> LoadResult<LoadReport> {
    let (collected, derived) = collect_and_derive::<E>(collector)?;

    repo.add(&derived.entities)?;
    log_success(format!("Persisted {} {}(s)", derived.entities.len(), E::KIND));

    Ok(LoadReport {
        kind: E::KIND,
        source: collector.source().to_path_buf(),
        collected,
        skipped: derived.skipped,
        persisted: derived.entities.len(),
    })
}

/// Collect, validate and build without touching a store.
pub fn check_entities<E: Loadable>(collector: &dyn Collector) -> LoadResult<LoadReport> {
    let (collected, derived) = collect_and_derive::<E>(collector)?;
    log_success(format!("{} {}(s) are loadable", derived.entities.len(), E::KIND));

    Ok(LoadReport {
        kind: E::KIND,
        source: collector.source().to_path_buf(),
        collected,
        skipped: derived.skipped,
        persisted: 0,
    })
}

// =============================================================================
// Per-kind operations
// =============================================================================

pub fn load_movies(
    collector: &dyn Collector,
    repo: &mut impl Repository<Movie>,
) -> LoadResult<LoadReport> {
    load_entities(collector, repo)
}

pub fn load_streams(
    collector: &dyn Collector,
    repo: &mut impl Repository<Stream>,
) -> LoadResult<LoadReport> {
    load_entities(collector, repo)
}

pub fn load_users(
    collector: &dyn Collector,
    repo: &mut impl Repository<User>,
) -> LoadResult<LoadReport> {
    load_entities(collector, repo)
}

/// Authors without a name are dropped, not persisted.
pub fn load_authors(
    collector: &dyn Collector,
    repo: &mut impl Repository<Author>,
) -> LoadResult<LoadReport> {
    load_entities(collector, repo)
}

pub fn load_books(
    collector: &dyn Collector,
    repo: &mut impl Repository<Book>,
) -> LoadResult<LoadReport> {
    load_entities(collector, repo)
}

pub fn load_reviews(
    collector: &dyn Collector,
    repo: &mut impl Repository<Review>,
) -> LoadResult<LoadReport> {
    load_entities(collector, repo)
}

// =============================================================================
// Dispatch by kind
// =============================================================================

/// Load `kind` from `collector` into `store`.
///
/// The schema must already exist (see [`Store::init_schema`]).
pub fn load(
    kind: EntityKind,
    collector: &dyn Collector,
    store: &mut Store,
) -> LoadResult<LoadReport> {
    match kind {
        EntityKind::Movie => load_movies(collector, &mut store.repository::<Movie>()?),
        EntityKind::Stream => load_streams(collector, &mut store.repository::<Stream>()?),
        EntityKind::User => load_users(collector, &mut store.repository::<User>()?),
        EntityKind::Author => load_authors(collector, &mut store.repository::<Author>()?),
        EntityKind::Book => load_books(collector, &mut store.repository::<Book>()?),
        EntityKind::Review => load_reviews(collector, &mut store.repository::<Review>()?),
    }
}

/// Dry run of [`load`].
pub fn check(kind: EntityKind, collector: &dyn Collector) -> LoadResult<LoadReport> {
    match kind {
        EntityKind::Movie => check_entities::<Movie>(collector),
        EntityKind::Stream => check_entities::<Stream>(collector),
        EntityKind::User => check_entities::<User>(collector),
        EntityKind::Author => check_entities::<Author>(collector),
        EntityKind::Book => check_entities::<Book>(collector),
        EntityKind::Review => check_entities::<Review>(collector),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::JsonCollector;
    use crate::error::{CollectError, DerivationError, RepositoryResult, ValidationError};
    use serde_json::json;
    use std::collections::HashMap;
    use std::path::Path;

    /// Serves a fixed set of records.
    struct StaticCollector(Value);

    impl Collector for StaticCollector {
        fn collect(&self) -> crate::error::CollectResult<Vec<RawRecord>> {
            JsonCollector::records_from_value(self.0.clone())
        }

        fn source(&self) -> &Path {
            Path::new("memory")
        }
    }

    struct FailingCollector;

    impl Collector for FailingCollector {
        fn collect(&self) -> crate::error::CollectResult<Vec<RawRecord>> {
            Err(CollectError::NotARecord { index: 0 })
        }

        fn source(&self) -> &Path {
            Path::new("broken")
        }
    }

    /// Keeps batches in memory, keyed like the SQL repository.
    struct MemoryRepository<E> {
        rows: HashMap<String, E>,
        batches: usize,
    }

    impl<E> Default for MemoryRepository<E> {
        fn default() -> Self {
            Self {
                rows: HashMap::new(),
                batches: 0,
            }
        }
    }

    impl<E: Entity + Clone> Repository<E> for MemoryRepository<E> {
        fn add(&mut self, entities: &[E]) -> RepositoryResult<()> {
            for entity in entities {
                self.rows.insert(entity.key().to_string(), entity.clone());
            }
            self.batches += 1;
            Ok(())
        }

        fn get(&self, key: &str) -> RepositoryResult<Option<E>> {
            Ok(self.rows.get(key).cloned())
        }
    }

    fn authors() -> Value {
        json!([
            {
                "metadata": { "name": "Josh Johnston", "birth_date": "1950-03-01T00:00:00" },
                "nationalities": [
                    { "label": "Guianese French", "slug": "guianese-french" },
                    { "label": "Unknown", "slug": "" }
                ]
            },
            {
                "metadata": { "name": "", "birth_date": "1960-01-01T00:00:00" },
                "nationalities": []
            }
        ])
    }

    fn review(movies: Value) -> Value {
        json!({
            "content": { "text": "text" },
            "rating": { "rate": 5, "label": "great" },
            "books": [{ "id": "1", "metadata": { "title": "book_title", "pages": "300" } }],
            "movies": movies
        })
    }

    #[test]
    fn test_load_authors_drops_unnamed() {
        let mut repo = MemoryRepository::default();
        let report = load_authors(&StaticCollector(authors()), &mut repo).unwrap();

        assert_eq!(report.collected, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.persisted, 1);
        let author = repo.get("Josh Johnston").unwrap().unwrap();
        assert_eq!(author.nationality, "guianese-french");
    }

    #[test]
    fn test_load_reviews_derives_id() {
        let mut repo = MemoryRepository::default();
        let source = StaticCollector(review(json!([
            { "id": 1, "title": "movie_title" },
            { "id": 2, "title": "end" }
        ])));

        load_reviews(&source, &mut repo).unwrap();

        let stored = repo.get("e42593b427313816aedf72d3c58d89969168177b").unwrap().unwrap();
        assert_eq!(stored.movie_title, "movie_title");
        assert_eq!(stored.book_title, "book_title");
    }

    #[test]
    fn test_invalid_record_aborts_before_persisting() {
        let mut repo = MemoryRepository::<Movie>::default();
        let source = StaticCollector(json!([
            { "title": "Heat", "duration_mins": "170", "original_language": "English", "size_mb": "900" },
            { "title": "Ran", "original_language": "Japanese", "size_mb": "700" }
        ]));

        let err = load_movies(&source, &mut repo).unwrap_err();

        assert!(matches!(
            err,
            LoadError::Validation(ValidationError::Schema { index: 1, .. })
        ));
        assert_eq!(repo.batches, 0);
    }

    #[test]
    fn test_derivation_error_carries_index() {
        let mut repo = MemoryRepository::<Review>::default();
        let source = StaticCollector(json!([review(json!([{ "id": 1, "title": "end" }]))]));

        let err = load_reviews(&source, &mut repo).unwrap_err();

        assert!(matches!(
            err,
            LoadError::Derivation { index: 0, source: DerivationError::NoMovieTitle }
        ));
    }

    #[test]
    fn test_collect_error_propagates() {
        let mut repo = MemoryRepository::<User>::default();
        let err = load_users(&FailingCollector, &mut repo).unwrap_err();
        assert!(matches!(err, LoadError::Collect(_)));
    }

    #[test]
    fn test_empty_source_commits_empty_batch() {
        let mut repo = MemoryRepository::<Book>::default();
        let report = load_books(&StaticCollector(json!([])), &mut repo).unwrap();
        assert_eq!(report.persisted, 0);
        assert_eq!(repo.batches, 1);
    }

    #[test]
    fn test_dispatch_into_store_is_idempotent() {
        let mut store = Store::open_in_memory().unwrap();
        store.init_schema().unwrap();
        let source = StaticCollector(json!({
            "movie_title": "title",
            "user_email": "email",
            "size_mb": "256",
            "start_at": "2023-01-01 00:00:00",
            "end_at": "2023-01-01 01:30:00"
        }));

        load(EntityKind::Stream, &source, &mut store).unwrap();
        load(EntityKind::Stream, &source, &mut store).unwrap();

        assert_eq!(store.count(EntityKind::Stream).unwrap(), 1);
        let stream = store
            .repository::<Stream>()
            .unwrap()
            .get("e0821094c090019c23d297e80cf7b52c0b4d1385")
            .unwrap();
        assert!(stream.is_some());
    }

    #[test]
    fn test_offset_timestamps_hash_as_utc() {
        let mut store = Store::open_in_memory().unwrap();
        store.init_schema().unwrap();
        let source = StaticCollector(json!([
            {
                "movie_title": "title",
                "user_email": "email",
                "size_mb": 256,
                "start_at": "2023-01-01T00:00:00+00:00",
                "end_at": "2023-01-01T01:30:00+00:00"
            },
            {
                "movie_title": "title",
                "user_email": "email",
                "size_mb": 512,
                "start_at": "2023-01-01 02:00:00+02:00",
                "end_at": "2023-01-01T03:30:00+02:00"
            }
        ]));

        load(EntityKind::Stream, &source, &mut store).unwrap();

        assert_eq!(store.count(EntityKind::Stream).unwrap(), 1);
        let stream = store
            .repository::<Stream>()
            .unwrap()
            .get("e0821094c090019c23d297e80cf7b52c0b4d1385")
            .unwrap()
            .unwrap();
        assert_eq!(stream.start_at.to_string(), "2023-01-01 00:00:00");
        assert_eq!(stream.size_mb, 512.0);
    }

    #[test]
    fn test_load_without_schema_fails_in_repository() {
        let mut store = Store::open_in_memory().unwrap();
        let source = StaticCollector(json!([]));
        let err = load(EntityKind::User, &source, &mut store).unwrap_err();
        assert!(matches!(err, LoadError::Repository(_)));
    }

    #[test]
    fn test_check_does_not_persist() {
        let report = check(EntityKind::Author, &StaticCollector(authors())).unwrap();
        assert_eq!(report.collected, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.persisted, 0);
    }
}
