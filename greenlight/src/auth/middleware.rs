//! Bearer-token authentication middleware.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, instrument, trace};

use super::current_user::{AuthenticatedUser, CurrentUser};
use crate::{AppState, db::UserStore, errors::Error, services::TokenManager, types::TokenScope};

/// Work out who is calling from the `Authorization` header.
///
/// - no header: anonymous
/// - `Bearer <token>` with a live authentication token: that token's user
/// - anything else: [`Error::InvalidToken`]
#[instrument(skip_all, err)]
pub(crate) async fn resolve_user(state: &AppState, headers: &HeaderMap) -> Result<CurrentUser, Error> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        trace!("No authorization header, treating request as anonymous");
        return Ok(CurrentUser::Anonymous);
    };

    let plaintext = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(Error::InvalidToken)?;

    let store = state.store.as_ref();
    let user_id = TokenManager::new(store).validate(plaintext, TokenScope::Authentication).await?;
    let user = store.get_user(user_id).await?.ok_or(Error::InvalidToken)?;

    debug!(user_id = user.id, "Authenticated request");
    Ok(CurrentUser::User(AuthenticatedUser::from(user)))
}

/// Resolve the caller for every request and make it available to the [`CurrentUser`] and
/// [`ActivatedUser`](super::current_user::ActivatedUser) extractors.
///
/// A present but invalid token fails the request outright, even on routes that allow anonymous
/// access.
pub async fn authenticate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let resolved = resolve_user(&state, request.headers()).await;
    let mut response = match resolved {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    };

    // Responses differ by caller
    response
        .headers_mut()
        .append(header::VARY, HeaderValue::from_static("Authorization"));
    response
}
