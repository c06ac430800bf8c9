//! Repositories: batch upsert and point lookup by primary key.
//!
//! [`Repository`] is the capability the load service needs. [`SqlRepository`]
//! implements it on a SQLite connection for any [`Entity`].
//!
//! # Upsert semantics
//!
//! ```text
//! add([e1, e2, ...])
//!   BEGIN
//!   for each entity, in order:
//!     SELECT by key ── found ──▶ UPDATE every column on that row
//!                  └─ absent ─▶ INSERT
//!   COMMIT
//! ```
//!
//! Updating in place keeps the existing row (and its rowid); a later entity
//! in the same batch with the same key overwrites an earlier one.

mod tables;

use std::marker::PhantomData;

use rusqlite::{Connection, OptionalExtension, Row, ToSql};
use tracing::debug;

use crate::error::{RepositoryError, RepositoryResult};
use crate::models::{Author, Book, EntityKind, Movie, Review, Stream, User};

// =============================================================================
// Table metadata
// =============================================================================

/// One column of an entity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    /// SQLite type name used in `CREATE TABLE`.
    pub sql_type: &'static str,
    pub primary_key: bool,
    pub nullable: bool,
}

impl Column {
    pub const fn key(name: &'static str) -> Self {
        Self {
            name,
            sql_type: "TEXT",
            primary_key: true,
            nullable: false,
        }
    }

    pub const fn required(name: &'static str, sql_type: &'static str) -> Self {
        Self {
            name,
            sql_type,
            primary_key: false,
            nullable: false,
        }
    }

    pub const fn optional(name: &'static str, sql_type: &'static str) -> Self {
        Self {
            name,
            sql_type,
            primary_key: false,
            nullable: true,
        }
    }
}

/// Table name plus columns, in binding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl TableSchema {
    pub fn primary_key(self) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.primary_key)
    }

    pub fn column_names(self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    /// Idempotent `CREATE TABLE` statement.
    pub fn create_sql(self) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let mut def = format!("{} {}", c.name, c.sql_type);
                if c.primary_key {
                    def.push_str(" PRIMARY KEY");
                }
                if !c.nullable {
                    def.push_str(" NOT NULL");
                }
                def
            })
            .collect();

        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.name,
            columns.join(", ")
        )
    }
}

// =============================================================================
// Entity mapping
// =============================================================================

/// A domain entity that maps onto one table row.
pub trait Entity: Sized {
    const TABLE: TableSchema;

    /// Primary-key value.
    fn key(&self) -> &str;

    /// Column values, in [`TableSchema::columns`] order.
    fn params(&self) -> Vec<&dyn ToSql>;

    /// Decode a row selected with every column, in schema order.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// Every table the store manages.
pub fn all_tables() -> [TableSchema; 6] {
    tables::ALL
}

/// Table backing entities of `kind`.
pub fn table_for(kind: EntityKind) -> TableSchema {
    match kind {
        EntityKind::Movie => Movie::TABLE,
        EntityKind::Stream => Stream::TABLE,
        EntityKind::User => User::TABLE,
        EntityKind::Author => Author::TABLE,
        EntityKind::Book => Book::TABLE,
        EntityKind::Review => Review::TABLE,
    }
}

// =============================================================================
// Repository capability
// =============================================================================

/// Persistence capability for one entity type.
pub trait Repository<E> {
    /// Upsert a batch and commit it.
    fn add(&mut self, entities: &[E]) -> RepositoryResult<()>;

    /// Point lookup by primary key; `None` when no row matches.
    fn get(&self, key: &str) -> RepositoryResult<Option<E>>;
}

// =============================================================================
// SQLite repository
// =============================================================================

/// [`Repository`] over a SQLite connection.
pub struct SqlRepository<'c, E> {
    conn: &'c mut Connection,
    table: &'static str,
    exists_sql: String,
    insert_sql: String,
    update_sql: String,
    select_sql: String,
    _entity: PhantomData<E>,
}

impl<'c, E: Entity> SqlRepository<'c, E> {
    /// Bind a repository for `E` to a connection.
    ///
    /// Fails when `E`'s table declares no primary key.
    pub fn new(conn: &'c mut Connection) -> RepositoryResult<Self> {
        let table = E::TABLE;
        let key = table
            .primary_key()
            .ok_or(RepositoryError::MissingPrimaryKey { table: table.name })?;

        let names = table.column_names();
        let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{}", i)).collect();
        let key_position = names
            .iter()
            .position(|name| *name == key.name)
            .map(|i| i + 1)
            .unwrap_or(1);
        let assignments: Vec<String> = names
            .iter()
            .enumerate()
            .filter(|(_, name)| **name != key.name)
            .map(|(i, name)| format!("{} = ?{}", name, i + 1))
            .collect();

        Ok(Self {
            exists_sql: format!("SELECT 1 FROM {} WHERE {} = ?1", table.name, key.name),
            insert_sql: format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table.name,
                names.join(", "),
                placeholders.join(", ")
            ),
            update_sql: format!(
                "UPDATE {} SET {} WHERE {} = ?{}",
                table.name,
                assignments.join(", "),
                key.name,
                key_position
            ),
            select_sql: format!(
                "SELECT {} FROM {} WHERE {} = ?1",
                names.join(", "),
                table.name,
                key.name
            ),
            table: table.name,
            conn,
            _entity: PhantomData,
        })
    }
}

impl<E: Entity> Repository<E> for SqlRepository<'_, E> {
    fn add(&mut self, entities: &[E]) -> RepositoryResult<()> {
        let tx = self.conn.transaction()?;
        let (mut inserted, mut updated) = (0usize, 0usize);

        {
            let mut exists = tx.prepare(&self.exists_sql)?;
            let mut insert = tx.prepare(&self.insert_sql)?;
            let mut update = tx.prepare(&self.update_sql)?;

            for entity in entities {
                let params = entity.params();
                if exists.exists([entity.key()])? {
                    update.execute(params.as_slice())?;
                    updated += 1;
                } else {
                    insert.execute(params.as_slice())?;
                    inserted += 1;
                }
            }
        }

        tx.commit()?;
        debug!(table = self.table, inserted, updated, "Batch committed");
        Ok(())
    }

    fn get(&self, key: &str) -> RepositoryResult<Option<E>> {
        Ok(self
            .conn
            .query_row(&self.select_sql, [key], |row| E::from_row(row))
            .optional()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rusqlite::params;

    struct Person {
        name: String,
        age: i64,
    }

    impl Entity for Person {
        const TABLE: TableSchema = TableSchema {
            name: "person",
            columns: &[Column::key("name"), Column::required("age", "INTEGER")],
        };

        fn key(&self) -> &str {
            &self.name
        }

        fn params(&self) -> Vec<&dyn ToSql> {
            vec![&self.name as &dyn ToSql, &self.age]
        }

        fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
            Ok(Self {
                name: row.get(0)?,
                age: row.get(1)?,
            })
        }
    }

    struct Keyless;

    impl Entity for Keyless {
        const TABLE: TableSchema = TableSchema {
            name: "keyless",
            columns: &[Column::required("value", "TEXT")],
        };

        fn key(&self) -> &str {
            ""
        }

        fn params(&self) -> Vec<&dyn ToSql> {
            Vec::new()
        }

        fn from_row(_row: &Row<'_>) -> rusqlite::Result<Self> {
            Ok(Keyless)
        }
    }

    fn connection_with<E: Entity>() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(&E::TABLE.create_sql()).unwrap();
        conn
    }

    fn rows(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .unwrap()
    }

    fn movie(title: &str, size_mb: i64) -> Movie {
        Movie {
            title: title.into(),
            duration_mins: 172,
            original_language: "English".into(),
            size_mb,
        }
    }

    #[test]
    fn test_create_sql() {
        assert_eq!(
            Person::TABLE.create_sql(),
            "CREATE TABLE IF NOT EXISTS person (name TEXT PRIMARY KEY NOT NULL, age INTEGER NOT NULL)"
        );
    }

    #[test]
    fn test_add_and_get() {
        let mut conn = connection_with::<Person>();
        let mut repo = SqlRepository::<Person>::new(&mut conn).unwrap();

        repo.add(&[Person {
            name: "name".into(),
            age: 18,
        }])
        .unwrap();

        let output = repo.get("name").unwrap().unwrap();
        assert_eq!(output.name, "name");
        assert_eq!(output.age, 18);
    }

    #[test]
    fn test_get_missing_is_none() {
        let mut conn = connection_with::<Person>();
        let repo = SqlRepository::<Person>::new(&mut conn).unwrap();
        assert!(repo.get("nobody").unwrap().is_none());
    }

    #[test]
    fn test_missing_primary_key_fails_at_construction() {
        let mut conn = connection_with::<Keyless>();
        let result = SqlRepository::<Keyless>::new(&mut conn);
        assert!(matches!(
            result,
            Err(RepositoryError::MissingPrimaryKey { table: "keyless" })
        ));
    }

    #[test]
    fn test_upsert_merges_into_existing_row() {
        let mut conn = connection_with::<Movie>();
        {
            let mut repo = SqlRepository::<Movie>::new(&mut conn).unwrap();
            repo.add(&[movie("The Great Escape", 1000)]).unwrap();
        }
        let rowid_before: i64 = conn
            .query_row(
                "SELECT rowid FROM movie WHERE title = ?1",
                params!["The Great Escape"],
                |row| row.get(0),
            )
            .unwrap();

        let mut repo = SqlRepository::<Movie>::new(&mut conn).unwrap();
        repo.add(&[movie("The Great Escape", 2000)]).unwrap();
        assert_eq!(repo.get("The Great Escape").unwrap().unwrap().size_mb, 2000);
        drop(repo);

        assert_eq!(rows(&conn, "movie"), 1);
        let rowid_after: i64 = conn
            .query_row(
                "SELECT rowid FROM movie WHERE title = ?1",
                params!["The Great Escape"],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(rowid_before, rowid_after);
    }

    #[test]
    fn test_duplicate_keys_in_batch_last_write_wins() {
        let mut conn = connection_with::<Movie>();
        let mut repo = SqlRepository::<Movie>::new(&mut conn).unwrap();

        repo.add(&[movie("Amélie", 1), movie("Amélie", 2), movie("Heat", 3)])
            .unwrap();

        assert_eq!(repo.get("Amélie").unwrap().unwrap().size_mb, 2);
        drop(repo);

        assert_eq!(rows(&conn, "movie"), 2);
    }

    #[test]
    fn test_round_trip_with_optional_and_timestamps() {
        let born = NaiveDate::from_ymd_opt(1950, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let author = Author {
            name: "Josh Johnston".into(),
            birth_date: born,
            died_at: None,
            nationality: "guianese-french".into(),
        };
        let stream = Stream::new(
            "title".into(),
            "email".into(),
            256.5,
            born,
            NaiveDate::from_ymd_opt(1950, 3, 1)
                .unwrap()
                .and_hms_micro_opt(1, 30, 0, 250_000)
                .unwrap(),
        );

        let mut conn = connection_with::<Author>();
        conn.execute_batch(&Stream::TABLE.create_sql()).unwrap();

        let mut authors = SqlRepository::<Author>::new(&mut conn).unwrap();
        authors.add(&[author.clone()]).unwrap();
        assert_eq!(authors.get("Josh Johnston").unwrap(), Some(author));
        drop(authors);

        let mut streams = SqlRepository::<Stream>::new(&mut conn).unwrap();
        streams.add(&[stream.clone()]).unwrap();
        assert_eq!(streams.get(stream.id()).unwrap(), Some(stream));
    }

    #[test]
    fn test_table_for_matches_all_tables() {
        let tables: Vec<TableSchema> = EntityKind::ALL.into_iter().map(table_for).collect();
        assert_eq!(tables, all_tables().to_vec());
    }

    #[test]
    fn test_failed_batch_is_rolled_back() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE movie (title TEXT PRIMARY KEY NOT NULL, duration_mins INTEGER NOT NULL, \
             original_language TEXT NOT NULL, size_mb INTEGER NOT NULL CHECK (size_mb < 100))",
        )
        .unwrap();

        let mut repo = SqlRepository::<Movie>::new(&mut conn).unwrap();
        assert!(repo.add(&[movie("Heat", 1), movie("Ran", 500)]).is_err());
        drop(repo);

        assert_eq!(rows(&conn, "movie"), 0);
    }
}
