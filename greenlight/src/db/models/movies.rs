//! Database models for movies.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::MovieId;

/// Database request for creating a new movie
#[derive(Debug, Clone)]
pub struct MovieCreateDBRequest {
    pub title: String,
    pub year: i32,
    pub runtime: i32,
    pub genres: Vec<String>,
}

/// Database request for replacing a movie's mutable fields.
///
/// Carries the full merged record, not a patch; absent fields have already been filled in from
/// the current row by the caller.
#[derive(Debug, Clone)]
pub struct MovieUpdateDBRequest {
    pub title: String,
    pub year: i32,
    pub runtime: i32,
    pub genres: Vec<String>,
}

/// Database response for a movie
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct MovieDBResponse {
    pub id: MovieId,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub year: i32,
    pub runtime: i32,
    pub genres: Vec<String>,
    pub version: i32,
}

/// Column a movie listing can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Id,
    Title,
    Year,
    Runtime,
}

impl SortColumn {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortColumn::Id => "id",
            SortColumn::Title => "title",
            SortColumn::Year => "year",
            SortColumn::Runtime => "runtime",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MovieSort {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl MovieSort {
    /// Parse a sort key such as `year` or `-runtime`. Returns `None` for keys outside the
    /// allow-list.
    pub fn parse(key: &str) -> Option<Self> {
        let (direction, column) = match key.strip_prefix('-') {
            Some(rest) => (SortDirection::Descending, rest),
            None => (SortDirection::Ascending, key),
        };
        let column = match column {
            "id" => SortColumn::Id,
            "title" => SortColumn::Title,
            "year" => SortColumn::Year,
            "runtime" => SortColumn::Runtime,
            _ => return None,
        };
        Some(Self { column, direction })
    }
}

/// Filter for listing movies. `page` and `page_size` are already validated.
#[derive(Debug, Clone)]
pub struct MovieFilter {
    /// Case-insensitive substring match on title; empty matches everything
    pub title: String,
    /// Movies must carry all of these genres; empty matches everything
    pub genres: Vec<String>,
    pub page: i64,
    pub page_size: i64,
    pub sort: MovieSort,
}

impl MovieFilter {
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

impl Default for MovieFilter {
    fn default() -> Self {
        Self {
            title: String::new(),
            genres: Vec::new(),
            page: 1,
            page_size: 20,
            sort: MovieSort::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_parse() {
        assert_eq!(
            MovieSort::parse("-year"),
            Some(MovieSort {
                column: SortColumn::Year,
                direction: SortDirection::Descending
            })
        );
        assert_eq!(MovieSort::parse("title").map(|s| s.column), Some(SortColumn::Title));
        assert_eq!(MovieSort::parse("rating"), None);
        assert_eq!(MovieSort::parse("--id"), None);
        assert_eq!(MovieSort::parse(""), None);
    }

    #[test]
    fn test_offset() {
        let filter = MovieFilter {
            page: 3,
            page_size: 5,
            ..Default::default()
        };
        assert_eq!(filter.limit(), 5);
        assert_eq!(filter.offset(), 10);
    }
}
