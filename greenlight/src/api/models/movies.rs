//! API request/response models for movies.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use utoipa::{IntoParams, ToSchema};

use super::pagination::PaginationMetadata;
use crate::db::models::movies::MovieDBResponse;
use crate::services::movies::MovieInput;
use crate::types::MovieId;

/// Running time in minutes, spelled `"<n> mins"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Runtime(pub i32);

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mins", self.0)
    }
}

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Runtime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RuntimeVisitor;

        impl de::Visitor<'_> for RuntimeVisitor {
            type Value = Runtime;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a string of the form \"<n> mins\"")
            }

            fn visit_str<E: de::Error>(self, s: &str) -> Result<Runtime, E> {
                match s.split(' ').collect::<Vec<_>>().as_slice() {
                    [minutes, "mins"] => minutes
                        .parse::<i32>()
                        .map(Runtime)
                        .map_err(|_| E::custom("invalid runtime format")),
                    _ => Err(E::custom("invalid runtime format")),
                }
            }
        }

        deserializer.deserialize_str(RuntimeVisitor)
    }
}

/// Request body for creating a movie. Every field is required.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct MovieCreate {
    pub title: Option<String>,
    pub year: Option<i32>,
    #[schema(value_type = Option<String>, example = "107 mins")]
    pub runtime: Option<Runtime>,
    pub genres: Option<Vec<String>>,
}

/// Request body for a partial update. Absent fields keep their current value.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct MovieUpdate {
    pub title: Option<String>,
    pub year: Option<i32>,
    #[schema(value_type = Option<String>, example = "107 mins")]
    pub runtime: Option<Runtime>,
    pub genres: Option<Vec<String>>,
}

impl From<MovieCreate> for MovieInput {
    fn from(create: MovieCreate) -> Self {
        Self {
            title: create.title,
            year: create.year,
            runtime: create.runtime.map(|r| r.0),
            genres: create.genres,
        }
    }
}

impl From<MovieUpdate> for MovieInput {
    fn from(update: MovieUpdate) -> Self {
        Self {
            title: update.title,
            year: update.year,
            runtime: update.runtime.map(|r| r.0),
            genres: update.genres,
        }
    }
}

/// Query parameters for listing movies. Numbers arrive as text so that a non-numeric value can
/// be reported as a validation error rather than a bad request.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListMoviesQuery {
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    /// Comma-separated genres; a movie must have all of them
    pub genres: Option<String>,
    /// Page number, 1 to 10 000 000 (default: 1)
    pub page: Option<String>,
    /// Items per page, 1 to 100 (default: 20)
    pub page_size: Option<String>,
    /// One of `id`, `title`, `year`, `runtime`, optionally prefixed with `-` for descending
    pub sort: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MovieResponse {
    pub id: MovieId,
    pub title: String,
    pub year: i32,
    #[schema(value_type = String, example = "107 mins")]
    pub runtime: Runtime,
    pub genres: Vec<String>,
    pub version: i32,
}

impl From<MovieDBResponse> for MovieResponse {
    fn from(db: MovieDBResponse) -> Self {
        Self {
            id: db.id,
            title: db.title,
            year: db.year,
            runtime: Runtime(db.runtime),
            genres: db.genres,
            version: db.version,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MovieEnvelope {
    pub movie: MovieResponse,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MoviesEnvelope {
    pub movies: Vec<MovieResponse>,
    pub metadata: PaginationMetadata,
}
