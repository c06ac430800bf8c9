//! Raw record shapes, one per entity kind.
//!
//! These mirror the source files before any domain rule is applied.
//! Delimited sources carry only strings, so numeric and timestamp fields
//! accept their string spelling too.

use chrono::NaiveDateTime;
use serde::Deserialize;

// =============================================================================
// Direct-mapping kinds
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieRaw {
    pub title: String,
    #[serde(deserialize_with = "lenient::int")]
    pub duration_mins: i64,
    pub original_language: String,
    #[serde(deserialize_with = "lenient::int")]
    pub size_mb: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StreamRaw {
    pub movie_title: String,
    pub user_email: String,
    #[serde(deserialize_with = "lenient::float")]
    pub size_mb: f64,
    #[serde(deserialize_with = "lenient::timestamp")]
    pub start_at: NaiveDateTime,
    #[serde(deserialize_with = "lenient::timestamp")]
    pub end_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserRaw {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

// =============================================================================
// Author
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AuthorMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_timestamp")]
    pub birth_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient::opt_timestamp")]
    pub died_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Nationality {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub id: Option<String>,
    pub label: String,
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthorRaw {
    pub metadata: AuthorMetadata,
    #[serde(default)]
    pub nationalities: Vec<Nationality>,
}

// =============================================================================
// Book
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookRaw {
    pub name: String,
    #[serde(deserialize_with = "lenient::int")]
    pub pages: i64,
    pub author: String,
    pub publisher: String,
}

// =============================================================================
// Review
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Content {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Rating {
    #[serde(deserialize_with = "lenient::int")]
    pub rate: i64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookItemMetadata {
    pub title: String,
    #[serde(deserialize_with = "lenient::string")]
    pub pages: String,
}

/// Entry of the `books` list of a review.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookItem {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub id: Option<String>,
    pub metadata: BookItemMetadata,
}

/// Entry of the `movies` list of a review.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieItem {
    #[serde(deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReviewRaw {
    pub content: Content,
    pub rating: Rating,
    pub books: Vec<BookItem>,
    pub movies: Vec<MovieItem>,
}

// =============================================================================
// Lenient scalar coercion
// =============================================================================

/// Parse a timestamp the way the source datasets spell them.
///
/// Offsets are normalised to UTC.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = chrono::DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

mod lenient {
    use chrono::NaiveDateTime;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    use super::parse_timestamp;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FloatOrText {
        Float(f64),
        Text(String),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Int(i64),
        Float(f64),
        Text(String),
    }

    /// Whole-valued floats such as `4.0` are accepted.
    pub fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        match Scalar::deserialize(deserializer)? {
            Scalar::Int(v) => Ok(v),
            Scalar::Float(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(v as i64),
            Scalar::Float(v) => Err(D::Error::custom(format!("invalid integer '{}'", v))),
            Scalar::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid integer '{}'", s))),
        }
    }

    pub fn float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match FloatOrText::deserialize(deserializer)? {
            FloatOrText::Float(v) => Ok(v),
            FloatOrText::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid number '{}'", s))),
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Scalar::deserialize(deserializer)? {
            Scalar::Int(v) => v.to_string(),
            Scalar::Float(v) => v.to_string(),
            Scalar::Text(s) => s,
        })
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(Option::<Scalar>::deserialize(deserializer)?.map(|v| match v {
            Scalar::Int(v) => v.to_string(),
            Scalar::Float(v) => v.to_string(),
            Scalar::Text(s) => s,
        }))
    }

    pub fn timestamp<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_timestamp(&s).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", s)))
    }

    /// Empty strings count as absent.
    pub fn opt_timestamp<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => parse_timestamp(&s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 12, 24)
            .unwrap()
            .and_hms_opt(12, 22, 2)
            .unwrap();
        assert_eq!(parse_timestamp("2021-12-24 12:22:02"), Some(expected));
        assert_eq!(parse_timestamp("2021-12-24T12:22:02"), Some(expected));
        assert_eq!(parse_timestamp("2021-12-24T12:22:02Z"), Some(expected));
        assert_eq!(parse_timestamp("2021-12-24T14:22:02+02:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2021-12-24"),
            NaiveDate::from_ymd_opt(2021, 12, 24).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_parse_timestamp_keeps_fraction() {
        let parsed = parse_timestamp("2023-01-01 00:00:00.250000").unwrap();
        assert_eq!(parsed.and_utc().timestamp_subsec_micros(), 250_000);
    }

    #[test]
    fn test_movie_raw_from_strings() {
        let raw: MovieRaw = serde_json::from_value(json!({
            "title": "The Great Escape",
            "duration_mins": "172",
            "original_language": "English",
            "size_mb": "1721"
        }))
        .unwrap();
        assert_eq!(raw.duration_mins, 172);
        assert_eq!(raw.size_mb, 1721);
    }

    #[test]
    fn test_stream_raw_rejects_bad_timestamp() {
        let result: Result<StreamRaw, _> = serde_json::from_value(json!({
            "movie_title": "title",
            "user_email": "email",
            "size_mb": "256",
            "start_at": "not a date",
            "end_at": "2023-01-01 01:30:00"
        }));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("not a date"));
    }

    #[test]
    fn test_author_raw_defaults() {
        let raw: AuthorRaw = serde_json::from_value(json!({
            "metadata": { "name": "Josh Johnston", "birth_date": "1950-03-01", "died_at": "" }
        }))
        .unwrap();
        assert_eq!(raw.metadata.name.as_deref(), Some("Josh Johnston"));
        assert!(raw.metadata.died_at.is_none());
        assert!(raw.nationalities.is_empty());
    }

    #[test]
    fn test_review_raw_accepts_null_movie_title_and_numeric_pages() {
        let raw: ReviewRaw = serde_json::from_value(json!({
            "content": { "text": "text" },
            "rating": { "rate": 4, "label": "FOUR" },
            "books": [{ "id": 12, "metadata": { "title": "book", "pages": 320 } }],
            "movies": [{ "id": 1, "title": null }, { "id": 2, "title": "movie" }]
        }))
        .unwrap();
        assert_eq!(raw.books[0].id.as_deref(), Some("12"));
        assert_eq!(raw.books[0].metadata.pages, "320");
        assert_eq!(raw.movies[0].title, None);
    }

    #[test]
    fn test_whole_float_is_an_integer() {
        let rating: Rating = serde_json::from_value(json!({ "rate": 4.0, "label": "FOUR" })).unwrap();
        assert_eq!(rating.rate, 4);

        let err = serde_json::from_value::<Rating>(json!({ "rate": 4.5, "label": "?" })).unwrap_err();
        assert!(err.to_string().contains("invalid integer '4.5'"), "{}", err);
    }
}
