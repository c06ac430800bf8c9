//! Domain models for the Strider load pipeline.
//!
//! This module contains the entities persisted by the repositories:
//!
//! - [`Author`] - keyed by name
//! - [`Book`] - keyed by title
//! - [`Review`] - keyed by a content hash of text, rating and movie title
//! - [`User`] - keyed by email
//! - [`Movie`] - keyed by title
//! - [`Stream`] - keyed by a content hash of movie, user and viewing window
//!
//! Raw (pre-validation) shapes live in [`raw`].

pub mod raw;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::transform::identity::{canonical_timestamp, content_hash};

// =============================================================================
// Entity Kind
// =============================================================================

/// The six kinds of entity the loader knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Movie,
    Stream,
    User,
    Author,
    Book,
    Review,
}

impl EntityKind {
    /// Every kind, in load order.
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Movie,
        EntityKind::Stream,
        EntityKind::User,
        EntityKind::Author,
        EntityKind::Book,
        EntityKind::Review,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Stream => "stream",
            Self::User => "user",
            Self::Author => "author",
            Self::Book => "book",
            Self::Review => "review",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "movie" | "movies" => Ok(Self::Movie),
            "stream" | "streams" => Ok(Self::Stream),
            "user" | "users" => Ok(Self::User),
            "author" | "authors" => Ok(Self::Author),
            "book" | "books" => Ok(Self::Book),
            "review" | "reviews" => Ok(Self::Review),
            other => Err(format!("unknown entity kind '{}'", other)),
        }
    }
}

// =============================================================================
// Author
// =============================================================================

/// A book author.
///
/// Two different authors never publish under the same name, so the name
/// is the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub birth_date: NaiveDateTime,
    pub died_at: Option<NaiveDateTime>,
    /// Nationality slug, e.g. `guianese-french`.
    pub nationality: String,
}

// =============================================================================
// Book
// =============================================================================

/// A published book. Titles are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub pages: i64,
    pub author: String,
    pub publisher: String,
}

// =============================================================================
// Review
// =============================================================================

/// A review of a movie adapted from a book.
///
/// The id is always derived from `text`, `rating` and `movie_title`;
/// use [`Review::new`] to build one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    pub(crate) id: String,
    pub text: String,
    /// Score between 1 and 5.
    pub rating: i64,
    pub movie_title: String,
    pub book_title: String,
}

impl Review {
    pub fn new(text: String, rating: i64, movie_title: String, book_title: String) -> Self {
        let id = Self::derive_id(&text, rating, &movie_title);
        Self {
            id,
            text,
            rating,
            movie_title,
            book_title,
        }
    }

    /// Hash of `text + rating + movie_title`.
    pub fn derive_id(text: &str, rating: i64, movie_title: &str) -> String {
        content_hash(&[text, &rating.to_string(), movie_title])
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

// =============================================================================
// User
// =============================================================================

/// A streaming user. Emails are verified and unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

// =============================================================================
// Movie
// =============================================================================

/// A movie in the streaming catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub title: String,
    pub duration_mins: i64,
    pub original_language: String,
    pub size_mb: i64,
}

// =============================================================================
// Stream
// =============================================================================

/// One viewing of a movie by a user.
///
/// The id is always derived from `movie_title`, `user_email`, `start_at`
/// and `end_at`; use [`Stream::new`] to build one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stream {
    pub(crate) id: String,
    pub movie_title: String,
    pub user_email: String,
    pub size_mb: f64,
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,
}

impl Stream {
    pub fn new(
        movie_title: String,
        user_email: String,
        size_mb: f64,
        start_at: NaiveDateTime,
        end_at: NaiveDateTime,
    ) -> Self {
        let id = Self::derive_id(&movie_title, &user_email, &start_at, &end_at);
        Self {
            id,
            movie_title,
            user_email,
            size_mb,
            start_at,
            end_at,
        }
    }

    /// Hash of `movie_title + user_email + start_at + end_at`.
    pub fn derive_id(
        movie_title: &str,
        user_email: &str,
        start_at: &NaiveDateTime,
        end_at: &NaiveDateTime,
    ) -> String {
        content_hash(&[
            movie_title,
            user_email,
            &canonical_timestamp(start_at),
            &canonical_timestamp(end_at),
        ])
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_entity_kind_from_str() {
        assert_eq!("movie".parse::<EntityKind>(), Ok(EntityKind::Movie));
        assert_eq!("Reviews".parse::<EntityKind>(), Ok(EntityKind::Review));
        assert!("film".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_entity_kind_display_matches_from_str() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.to_string().parse::<EntityKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_stream_id_generation() {
        let stream = Stream::new("title".into(), "email".into(), 256.0, at(0, 0), at(1, 30));
        assert_eq!(stream.id(), "e0821094c090019c23d297e80cf7b52c0b4d1385");
    }

    #[test]
    fn test_stream_id_ignores_size() {
        let a = Stream::new("title".into(), "email".into(), 256.0, at(0, 0), at(1, 30));
        let b = Stream::new("title".into(), "email".into(), 512.0, at(0, 0), at(1, 30));
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn test_review_id_generation() {
        let review = Review::new("text".into(), 5, "movie_title".into(), "book_title".into());
        assert_eq!(review.id(), "e42593b427313816aedf72d3c58d89969168177b");
    }

    #[test]
    fn test_review_id_ignores_book_title() {
        let a = Review::new("text".into(), 5, "movie_title".into(), "one".into());
        let b = Review::new("text".into(), 5, "movie_title".into(), "two".into());
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn test_review_serialization_includes_id() {
        let review = Review::new("text".into(), 5, "movie_title".into(), "book_title".into());
        let json = serde_json::to_value(&review).unwrap();
        assert_eq!(json["id"], "e42593b427313816aedf72d3c58d89969168177b");
        assert_eq!(json["rating"], 5);
    }
}
