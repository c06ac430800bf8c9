//! Row mappings for the six domain entities.

use rusqlite::{Row, ToSql};

use super::{Column, Entity, TableSchema};
use crate::models::{Author, Book, Movie, Review, Stream, User};

pub(super) const ALL: [TableSchema; 6] = [
    Movie::TABLE,
    Stream::TABLE,
    User::TABLE,
    Author::TABLE,
    Book::TABLE,
    Review::TABLE,
];

impl Entity for Author {
    const TABLE: TableSchema = TableSchema {
        name: "author",
        columns: &[
            Column::key("name"),
            Column::required("birth_date", "DATETIME"),
            Column::optional("died_at", "DATETIME"),
            Column::required("nationality", "TEXT"),
        ],
    };

    fn key(&self) -> &str {
        &self.name
    }

    fn params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.name as &dyn ToSql,
            &self.birth_date,
            &self.died_at,
            &self.nationality,
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(0)?,
            birth_date: row.get(1)?,
            died_at: row.get(2)?,
            nationality: row.get(3)?,
        })
    }
}

impl Entity for Book {
    const TABLE: TableSchema = TableSchema {
        name: "book",
        columns: &[
            Column::key("title"),
            Column::required("pages", "INTEGER"),
            Column::required("author", "TEXT"),
            Column::required("publisher", "TEXT"),
        ],
    };

    fn key(&self) -> &str {
        &self.title
    }

    fn params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.title as &dyn ToSql,
            &self.pages,
            &self.author,
            &self.publisher,
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            title: row.get(0)?,
            pages: row.get(1)?,
            author: row.get(2)?,
            publisher: row.get(3)?,
        })
    }
}

impl Entity for Review {
    const TABLE: TableSchema = TableSchema {
        name: "review",
        columns: &[
            Column::key("id"),
            Column::required("text", "TEXT"),
            Column::required("rating", "INTEGER"),
            Column::required("movie_title", "TEXT"),
            Column::required("book_title", "TEXT"),
        ],
    };

    fn key(&self) -> &str {
        self.id()
    }

    fn params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.id as &dyn ToSql,
            &self.text,
            &self.rating,
            &self.movie_title,
            &self.book_title,
        ]
    }

    /// The stored id is not read back: it is recomputed from the row.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Review::new(row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
    }
}

impl Entity for User {
    const TABLE: TableSchema = TableSchema {
        name: "user",
        columns: &[
            Column::key("email"),
            Column::required("first_name", "TEXT"),
            Column::required("last_name", "TEXT"),
        ],
    };

    fn key(&self) -> &str {
        &self.email
    }

    fn params(&self) -> Vec<&dyn ToSql> {
        vec![&self.email as &dyn ToSql, &self.first_name, &self.last_name]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            email: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
        })
    }
}

impl Entity for Movie {
    const TABLE: TableSchema = TableSchema {
        name: "movie",
        columns: &[
            Column::key("title"),
            Column::required("duration_mins", "INTEGER"),
            Column::required("original_language", "TEXT"),
            Column::required("size_mb", "INTEGER"),
        ],
    };

    fn key(&self) -> &str {
        &self.title
    }

    fn params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.title as &dyn ToSql,
            &self.duration_mins,
            &self.original_language,
            &self.size_mb,
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            title: row.get(0)?,
            duration_mins: row.get(1)?,
            original_language: row.get(2)?,
            size_mb: row.get(3)?,
        })
    }
}

impl Entity for Stream {
    const TABLE: TableSchema = TableSchema {
        name: "stream",
        columns: &[
            Column::key("id"),
            Column::required("movie_title", "TEXT"),
            Column::required("user_email", "TEXT"),
            Column::required("size_mb", "REAL"),
            Column::required("start_at", "DATETIME"),
            Column::required("end_at", "DATETIME"),
        ],
    };

    fn key(&self) -> &str {
        self.id()
    }

    fn params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.id as &dyn ToSql,
            &self.movie_title,
            &self.user_email,
            &self.size_mb,
            &self.start_at,
            &self.end_at,
        ]
    }

    /// The stored id is not read back: it is recomputed from the row.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Stream::new(
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_has_a_primary_key() {
        for table in ALL {
            assert!(table.primary_key().is_some(), "{}", table.name);
        }
    }

    #[test]
    fn test_derived_keys_are_id_columns() {
        assert_eq!(Review::TABLE.primary_key().map(|c| c.name), Some("id"));
        assert_eq!(Stream::TABLE.primary_key().map(|c| c.name), Some("id"));
    }

    #[test]
    fn test_create_sql_for_every_table() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        for table in ALL {
            conn.execute_batch(&table.create_sql()).unwrap();
        }
    }
}
