//! Movie validation, version-checked mutation, and listing.

use chrono::{Datelike, Utc};
use tracing::{info, instrument};

use crate::{
    db::{
        errors::DbError,
        models::movies::{MovieCreateDBRequest, MovieDBResponse, MovieFilter, MovieSort, MovieUpdateDBRequest},
        store::MovieStore,
    },
    errors::{Error, Result},
    services::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE, MAX_PAGE_SIZE, PaginationMetadata},
    types::MovieId,
    validator::{Validator, permitted_value, unique},
};

pub const SORT_SAFELIST: &[&str] = &["id", "title", "year", "runtime", "-id", "-title", "-year", "-runtime"];

/// Movie fields as supplied by a client. For a create every field is required; for an update an
/// absent field keeps its current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieInput {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub runtime: Option<i32>,
    pub genres: Option<Vec<String>>,
}

/// A complete candidate record, checked before anything is written.
#[derive(Debug, Clone)]
struct MovieDraft {
    title: String,
    year: i32,
    runtime: i32,
    genres: Option<Vec<String>>,
}

impl MovieDraft {
    fn from_input(input: &MovieInput) -> Self {
        Self {
            title: input.title.clone().unwrap_or_default(),
            year: input.year.unwrap_or_default(),
            runtime: input.runtime.unwrap_or_default(),
            genres: input.genres.clone(),
        }
    }

    fn merged(current: &MovieDBResponse, input: &MovieInput) -> Self {
        Self {
            title: input.title.clone().unwrap_or_else(|| current.title.clone()),
            year: input.year.unwrap_or(current.year),
            runtime: input.runtime.unwrap_or(current.runtime),
            genres: Some(input.genres.clone().unwrap_or_else(|| current.genres.clone())),
        }
    }

    fn validate(&self) -> Result<()> {
        let mut v = Validator::new();

        v.check(!self.title.is_empty(), "title", "must be provided");
        v.check(self.title.len() <= 500, "title", "must not be more than 500 bytes long");

        v.check(self.year != 0, "year", "must be provided");
        v.check(self.year >= 1888, "year", "must be greater than 1888");
        v.check(self.year <= Utc::now().year(), "year", "must not be in the future");

        v.check(self.runtime != 0, "runtime", "must be provided");
        v.check(self.runtime > 0, "runtime", "must be a positive integer");

        match &self.genres {
            None => v.add_error("genres", "must be provided"),
            Some(genres) => {
                v.check(!genres.is_empty(), "genres", "must contain at least 1 genre");
                v.check(genres.len() <= 5, "genres", "must not contain more than 5 genres");
                v.check(genres.iter().all(|g| !g.is_empty()), "genres", "must not contain empty values");
                v.check(unique(genres), "genres", "must not contain duplicate values");
            }
        }

        v.finish()
    }
}

/// Filters, paging, and ordering for [`MovieManager::list`].
#[derive(Debug, Clone)]
pub struct ListMoviesParams {
    pub title: String,
    pub genres: Vec<String>,
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
}

impl Default for ListMoviesParams {
    fn default() -> Self {
        Self {
            title: String::new(),
            genres: Vec::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort: "id".to_string(),
        }
    }
}

impl ListMoviesParams {
    /// Add a message to `v` for every out-of-range value.
    pub fn validate(&self, v: &mut Validator) {
        v.check(self.page > 0, "page", "must be greater than zero");
        v.check(self.page <= MAX_PAGE, "page", "must be a maximum of 10 million");
        v.check(self.page_size > 0, "page_size", "must be greater than zero");
        v.check(self.page_size <= MAX_PAGE_SIZE, "page_size", "must be a maximum of 100");
        v.check(permitted_value(&self.sort.as_str(), SORT_SAFELIST), "sort", "invalid sort value");
    }
}

/// One page of a movie listing.
#[derive(Debug, Clone)]
pub struct MoviePage {
    pub movies: Vec<MovieDBResponse>,
    pub metadata: PaginationMetadata,
}

pub struct MovieManager<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: MovieStore + ?Sized> MovieManager<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    #[instrument(skip(self, input), err)]
    pub async fn create(&self, input: &MovieInput) -> Result<MovieDBResponse> {
        let draft = MovieDraft::from_input(input);
        draft.validate()?;

        let movie = self
            .store
            .insert_movie(&MovieCreateDBRequest {
                title: draft.title,
                year: draft.year,
                runtime: draft.runtime,
                genres: draft.genres.unwrap_or_default(),
            })
            .await?;

        info!(movie_id = movie.id, "Created movie");
        Ok(movie)
    }

    /// Ids below 1 can never exist and are reported as not found.
    #[instrument(skip(self), err)]
    pub async fn fetch(&self, id: MovieId) -> Result<MovieDBResponse> {
        if id < 1 {
            return Err(Error::not_found("Movie", id));
        }
        self.store.get_movie(id).await?.ok_or_else(|| Error::not_found("Movie", id))
    }

    /// Apply a partial update.
    ///
    /// When `expected_version` is given it must match the stored version. Either way the write
    /// itself is conditional on the version that was read, so a concurrent writer turns this
    /// into [`Error::EditConflict`] rather than a lost update.
    #[instrument(skip(self, input), err)]
    pub async fn update(&self, id: MovieId, input: &MovieInput, expected_version: Option<i32>) -> Result<MovieDBResponse> {
        let current = self.fetch(id).await?;
        self.apply_update(current, input, expected_version).await
    }

    /// Second half of [`MovieManager::update`], for callers that already hold the record from
    /// [`MovieManager::fetch`].
    #[instrument(skip(self, current, input), fields(movie_id = current.id), err)]
    pub async fn apply_update(
        &self,
        current: MovieDBResponse,
        input: &MovieInput,
        expected_version: Option<i32>,
    ) -> Result<MovieDBResponse> {
        let id = current.id;

        if expected_version.is_some_and(|v| v != current.version) {
            return Err(Error::EditConflict);
        }

        let draft = MovieDraft::merged(&current, input);
        draft.validate()?;

        let request = MovieUpdateDBRequest {
            title: draft.title,
            year: draft.year,
            runtime: draft.runtime,
            genres: draft.genres.unwrap_or_default(),
        };

        let movie = self
            .store
            .update_movie_if_version(id, current.version, &request)
            .await
            .map_err(|e| match e {
                DbError::VersionConflict => Error::EditConflict,
                // Deleted between the read and the write
                DbError::NotFound => Error::EditConflict,
                e => Error::Database(e),
            })?;

        info!(movie_id = movie.id, version = movie.version, "Updated movie");
        Ok(movie)
    }

    #[instrument(skip(self), err)]
    pub async fn delete(&self, id: MovieId) -> Result<()> {
        if id < 1 || !self.store.delete_movie(id).await? {
            return Err(Error::not_found("Movie", id));
        }
        info!(movie_id = id, "Deleted movie");
        Ok(())
    }

    #[instrument(skip(self), err)]
    pub async fn list(&self, params: &ListMoviesParams) -> Result<MoviePage> {
        let mut v = Validator::new();
        params.validate(&mut v);
        v.finish()?;

        let sort = MovieSort::parse(&params.sort).ok_or_else(|| Error::invalid_field("sort", "invalid sort value"))?;
        let filter = MovieFilter {
            title: params.title.clone(),
            genres: params.genres.clone(),
            page: params.page,
            page_size: params.page_size,
            sort,
        };

        let (movies, total) = self.store.query_movies(&filter).await?;

        Ok(MoviePage {
            movies,
            metadata: PaginationMetadata::calculate(total, params.page, params.page_size),
        })
    }
}
