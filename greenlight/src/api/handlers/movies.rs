use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderName, StatusCode, header},
};

use crate::{
    AppState,
    api::{
        extract::{ExpectedVersion, RawBody, ResourceId, StrictJson, parse_json_body},
        models::{
            MessageResponse,
            movies::{ListMoviesQuery, MovieCreate, MovieEnvelope, MovieResponse, MovieUpdate, MoviesEnvelope},
            pagination::DEFAULT_PAGE_SIZE,
        },
    },
    auth::current_user::ActivatedUser,
    errors::Result,
    services::{MovieManager, movies::ListMoviesParams},
    validator::Validator,
};

fn read_int(v: &mut Validator, field: &str, value: Option<&str>, default: i64) -> i64 {
    match value {
        None | Some("") => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            v.add_error(field, "must be an integer value");
            default
        }),
    }
}

fn read_csv(value: Option<&str>) -> Vec<String> {
    match value {
        None | Some("") => Vec::new(),
        Some(raw) => raw.split(',').map(str::to_string).collect(),
    }
}

/// List movies, filtered, sorted and paginated
#[utoipa::path(
    get,
    path = "/movies",
    tag = "movies",
    params(ListMoviesQuery),
    responses(
        (status = 200, description = "One page of movies", body = MoviesEnvelope),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Account not activated"),
        (status = 422, description = "Invalid query parameters"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_movies(
    State(state): State<AppState>,
    _user: ActivatedUser,
    Query(query): Query<ListMoviesQuery>,
) -> Result<Json<MoviesEnvelope>> {
    let mut v = Validator::new();
    let params = ListMoviesParams {
        title: query.title.unwrap_or_default(),
        genres: read_csv(query.genres.as_deref()),
        page: read_int(&mut v, "page", query.page.as_deref(), 1),
        page_size: read_int(&mut v, "page_size", query.page_size.as_deref(), DEFAULT_PAGE_SIZE),
        sort: query.sort.filter(|s| !s.is_empty()).unwrap_or_else(|| "id".to_string()),
    };
    params.validate(&mut v);
    v.finish()?;

    let page = MovieManager::new(state.store.as_ref()).list(&params).await?;

    Ok(Json(MoviesEnvelope {
        movies: page.movies.into_iter().map(MovieResponse::from).collect(),
        metadata: page.metadata,
    }))
}

/// Add a movie to the catalog
#[utoipa::path(
    post,
    path = "/movies",
    tag = "movies",
    request_body = MovieCreate,
    responses(
        (status = 201, description = "Movie created", body = MovieEnvelope,
            headers(("Location" = String, description = "URL of the new movie"))),
        (status = 400, description = "Malformed request body"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Account not activated"),
        (status = 422, description = "Validation failed"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_movie(
    State(state): State<AppState>,
    _user: ActivatedUser,
    StrictJson(create): StrictJson<MovieCreate>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<MovieEnvelope>)> {
    let movie = MovieManager::new(state.store.as_ref()).create(&create.into()).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/v1/movies/{}", movie.id))],
        Json(MovieEnvelope { movie: movie.into() }),
    ))
}

/// Show a single movie
#[utoipa::path(
    get,
    path = "/movies/{id}",
    tag = "movies",
    params(("id" = i64, Path, description = "Movie ID")),
    responses(
        (status = 200, description = "Movie details", body = MovieEnvelope),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Account not activated"),
        (status = 404, description = "Movie not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn show_movie(
    State(state): State<AppState>,
    _user: ActivatedUser,
    ResourceId(id): ResourceId,
) -> Result<Json<MovieEnvelope>> {
    let movie = MovieManager::new(state.store.as_ref()).fetch(id).await?;
    Ok(Json(MovieEnvelope { movie: movie.into() }))
}

/// Partially update a movie
///
/// Send `X-Expected-Version` to make the update conditional on the version you last read.
#[utoipa::path(
    patch,
    path = "/movies/{id}",
    tag = "movies",
    request_body = MovieUpdate,
    params(
        ("id" = i64, Path, description = "Movie ID"),
        ("X-Expected-Version" = Option<i32>, Header, description = "Reject the update unless the movie is at this version"),
    ),
    responses(
        (status = 200, description = "Movie updated", body = MovieEnvelope),
        (status = 400, description = "Malformed request body or header"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Account not activated"),
        (status = 404, description = "Movie not found"),
        (status = 409, description = "Edit conflict"),
        (status = 422, description = "Validation failed"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_movie(
    State(state): State<AppState>,
    _user: ActivatedUser,
    ResourceId(id): ResourceId,
    ExpectedVersion(expected_version): ExpectedVersion,
    RawBody(body): RawBody,
) -> Result<Json<MovieEnvelope>> {
    let movies = MovieManager::new(state.store.as_ref());
    // A missing movie is reported before anything is said about the body
    let current = movies.fetch(id).await?;
    let update: MovieUpdate = parse_json_body(&body)?;
    let movie = movies.apply_update(current, &update.into(), expected_version).await?;
    Ok(Json(MovieEnvelope { movie: movie.into() }))
}

/// Delete a movie
#[utoipa::path(
    delete,
    path = "/movies/{id}",
    tag = "movies",
    params(("id" = i64, Path, description = "Movie ID")),
    responses(
        (status = 200, description = "Movie deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Account not activated"),
        (status = 404, description = "Movie not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_movie(
    State(state): State<AppState>,
    _user: ActivatedUser,
    ResourceId(id): ResourceId,
) -> Result<Json<MessageResponse>> {
    MovieManager::new(state.store.as_ref()).delete(id).await?;
    Ok(Json(MessageResponse {
        message: "movie successfully deleted".to_string(),
    }))
}
