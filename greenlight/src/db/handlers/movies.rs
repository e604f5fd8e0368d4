//! Database repository for movies.

use sqlx::PgConnection;
use tracing::instrument;

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::movies::{MovieCreateDBRequest, MovieDBResponse, MovieFilter, MovieUpdateDBRequest},
    },
    types::MovieId,
};

const MOVIE_COLUMNS: &str = "id, created_at, title, year, runtime, genres, version";

// Empty title and empty genre list each match every row
const MOVIE_FILTER: &str = "(strpos(lower(title), lower($1)) > 0 OR $1 = '') AND (genres @> $2 OR $2 = '{}')";

pub struct Movies<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Movies<'c> {
    type CreateRequest = MovieCreateDBRequest;
    type Response = MovieDBResponse;
    type Id = MovieId;

    #[instrument(skip(self, request), fields(title = %request.title), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let movie = sqlx::query_as::<_, MovieDBResponse>(&format!(
            "INSERT INTO movies (title, year, runtime, genres) VALUES ($1, $2, $3, $4) RETURNING {MOVIE_COLUMNS}"
        ))
        .bind(&request.title)
        .bind(request.year)
        .bind(request.runtime)
        .bind(&request.genres)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(movie)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let movie = sqlx::query_as::<_, MovieDBResponse>(&format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(movie)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl<'c> Movies<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Compare-and-swap on `(id, version)`.
    #[instrument(skip(self, request), err)]
    pub async fn update_if_version(
        &mut self,
        id: MovieId,
        expected_version: i32,
        request: &MovieUpdateDBRequest,
    ) -> Result<MovieDBResponse> {
        let updated = sqlx::query_as::<_, MovieDBResponse>(&format!(
            r#"
            UPDATE movies
            SET title = $1, year = $2, runtime = $3, genres = $4, version = version + 1
            WHERE id = $5 AND version = $6
            RETURNING {MOVIE_COLUMNS}
            "#
        ))
        .bind(&request.title)
        .bind(request.year)
        .bind(request.runtime)
        .bind(&request.genres)
        .bind(id)
        .bind(expected_version)
        .fetch_optional(&mut *self.db)
        .await?;

        match updated {
            Some(movie) => Ok(movie),
            None => {
                let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM movies WHERE id = $1)")
                    .bind(id)
                    .fetch_one(&mut *self.db)
                    .await?;
                Err(if exists { DbError::VersionConflict } else { DbError::NotFound })
            }
        }
    }

    #[instrument(skip(self, filter), fields(page = filter.page, page_size = filter.page_size), err)]
    pub async fn query(&mut self, filter: &MovieFilter) -> Result<(Vec<MovieDBResponse>, i64)> {
        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT count(*) FROM movies WHERE {MOVIE_FILTER}"))
            .bind(&filter.title)
            .bind(&filter.genres)
            .fetch_one(&mut *self.db)
            .await?;

        // Sort column and direction come from closed enums, never from user text
        let query = format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE {MOVIE_FILTER} ORDER BY {} {}, id ASC LIMIT $3 OFFSET $4",
            filter.sort.column.as_sql(),
            filter.sort.direction.as_sql(),
        );

        let movies = sqlx::query_as::<_, MovieDBResponse>(&query)
            .bind(&filter.title)
            .bind(&filter.genres)
            .bind(filter.limit())
            .bind(filter.offset())
            .fetch_all(&mut *self.db)
            .await?;

        Ok((movies, total))
    }
}
