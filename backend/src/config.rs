//! Connection-string resolution.
//!
//! The store location comes from, in order:
//!
//! 1. an explicit value (the CLI's `--database-url`)
//! 2. the `DATABASE_URL` environment variable (a `.env` file is honoured
//!    when the binary loads it with `dotenvy`)
//! 3. [`DEFAULT_DATABASE_URL`]
//!
//! # Accepted forms
//!
//! ```text
//! sqlite://                 in-memory
//! sqlite:///:memory:        in-memory
//! sqlite:///database.db     ./database.db
//! sqlite:////var/lib/x.db   /var/lib/x.db
//! data/strider.db           bare path
//! ```

use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::error::{ConfigError, ConfigResult};

/// Environment variable holding the connection string.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// File-backed store in the working directory.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:///database.db";

const SCHEME: &str = "sqlite://";
const MEMORY: &str = ":memory:";

/// Where the relational store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUrl {
    Memory,
    File(PathBuf),
}

impl DatabaseUrl {
    /// Parse a connection string.
    pub fn parse(url: &str) -> ConfigResult<Self> {
        let url = url.trim();

        if url.is_empty() {
            return Err(ConfigError::UnsupportedScheme(url.to_string()));
        }

        let Some(rest) = url.strip_prefix(SCHEME) else {
            if url.contains("://") {
                return Err(ConfigError::UnsupportedScheme(url.to_string()));
            }
            return Ok(Self::from_path(url));
        };

        // `sqlite:///rel` leaves "/rel", `sqlite:////abs` leaves "//abs".
        let path = rest.strip_prefix('/').unwrap_or(rest);

        if path.is_empty() {
            Ok(Self::Memory)
        } else {
            Ok(Self::from_path(path))
        }
    }

    /// Resolve from an explicit value, else the environment, else the default.
    pub fn resolve(explicit: Option<&str>) -> ConfigResult<Self> {
        match explicit {
            Some(url) => Self::parse(url),
            None => Self::from_env(),
        }
    }

    pub fn from_env() -> ConfigResult<Self> {
        let url = env::var(DATABASE_URL_ENV).unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        Self::parse(&url)
    }

    fn from_path(path: &str) -> Self {
        if path == MEMORY {
            Self::Memory
        } else {
            Self::File(PathBuf::from(path))
        }
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::File(PathBuf::from("database.db"))
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "{}/{}", SCHEME, MEMORY),
            Self::File(path) => write!(f, "{}/{}", SCHEME, path.display()),
        }
    }
}
