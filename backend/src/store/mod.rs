//! Scoped SQLite store.
//!
//! A [`Store`] owns one connection for the duration of a command. The
//! connection is closed when the store is dropped, whichever way the
//! command ends.

use rusqlite::Connection;
use tracing::debug;

use crate::config::DatabaseUrl;
use crate::error::{ConfigError, ConfigResult, RepositoryResult};
use crate::models::EntityKind;
use crate::repository::{all_tables, table_for, Entity, SqlRepository};

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open the store `url` points at.
    pub fn open(url: &DatabaseUrl) -> ConfigResult<Self> {
        let conn = match url {
            DatabaseUrl::Memory => Connection::open_in_memory(),
            DatabaseUrl::File(path) => Connection::open(path),
        }
        .map_err(|source| ConfigError::Open {
            url: url.to_string(),
            source,
        })?;

        debug!(url = %url, "Store opened");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> ConfigResult<Self> {
        Self::open(&DatabaseUrl::Memory)
    }

    /// Create every entity table that does not exist yet.
    pub fn init_schema(&self) -> RepositoryResult<()> {
        let statements: Vec<String> = all_tables()
            .iter()
            .map(|table| format!("{};", table.create_sql()))
            .collect();

        self.conn.execute_batch(&statements.join("\n"))?;
        debug!(tables = statements.len(), "Schema initialized");
        Ok(())
    }

    /// Repository for `E`, borrowing this store's connection.
    pub fn repository<E: Entity>(&mut self) -> RepositoryResult<SqlRepository<'_, E>> {
        SqlRepository::new(&mut self.conn)
    }

    /// Rows currently stored for `kind`.
    pub fn count(&self, kind: EntityKind) -> RepositoryResult<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table_for(kind).name),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
