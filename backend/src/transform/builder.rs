//! Domain builders: validated raw records to domain entities.
//!
//! Every builder is pure. Selection policies differ per entity:
//!
//! | Entity | Field | Policy |
//! |--------|-------|--------|
//! | Author | nationality | last entry with a non-empty slug |
//! | Review | movie_title | last title that is not null, empty or `end` |
//! | Review | book_title | first book item |

use crate::error::{DerivationError, DerivationResult};
use crate::models::raw::{AuthorRaw, BookRaw, MovieRaw, ReviewRaw, StreamRaw, UserRaw};
use crate::models::{Author, Book, Movie, Review, Stream, User};

/// Movie item title marking the end of a list.
pub const END_SENTINEL: &str = "end";

/// Build an author, or `None` when the record has no name.
pub fn build_author(raw: AuthorRaw) -> DerivationResult<Option<Author>> {
    let name = match raw.metadata.name {
        Some(name) if !name.is_empty() => name,
        _ => return Ok(None),
    };

    let nationality = raw
        .nationalities
        .into_iter()
        .filter_map(|n| n.slug.filter(|slug| !slug.is_empty()))
        .last()
        .ok_or_else(|| DerivationError::NoNationality {
            author: name.clone(),
        })?;

    let birth_date = raw
        .metadata
        .birth_date
        .ok_or_else(|| DerivationError::MissingBirthDate {
            author: name.clone(),
        })?;

    Ok(Some(Author {
        name,
        birth_date,
        died_at: raw.metadata.died_at,
        nationality,
    }))
}

pub fn build_book(raw: BookRaw) -> Book {
    Book {
        title: raw.name,
        pages: raw.pages,
        author: raw.author,
        publisher: raw.publisher,
    }
}

pub fn build_review(raw: ReviewRaw) -> DerivationResult<Review> {
    let movie_title = raw
        .movies
        .into_iter()
        .filter_map(|movie| movie.title)
        .filter(|title| !title.is_empty() && title != END_SENTINEL)
        .last()
        .ok_or(DerivationError::NoMovieTitle)?;

    let book_title = raw
        .books
        .into_iter()
        .next()
        .map(|book| book.metadata.title)
        .ok_or(DerivationError::NoBookItem)?;

    Ok(Review::new(
        raw.content.text,
        raw.rating.rate,
        movie_title,
        book_title,
    ))
}

pub fn build_movie(raw: MovieRaw) -> Movie {
    Movie {
        title: raw.title,
        duration_mins: raw.duration_mins,
        original_language: raw.original_language,
        size_mb: raw.size_mb,
    }
}

pub fn build_stream(raw: StreamRaw) -> Stream {
    Stream::new(
        raw.movie_title,
        raw.user_email,
        raw.size_mb,
        raw.start_at,
        raw.end_at,
    )
}

pub fn build_user(raw: UserRaw) -> User {
    User {
        email: raw.email,
        first_name: raw.first_name,
        last_name: raw.last_name,
    }
}
