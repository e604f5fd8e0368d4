use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    api::{
        extract::StrictJson,
        models::tokens::{AuthenticationTokenEnvelope, LoginRequest},
    },
    errors::Result,
    services::TokenManager,
};

/// Exchange an email and password for an authentication token
///
/// Send the returned token as `Authorization: Bearer <token>` on later requests.
#[utoipa::path(
    post,
    path = "/tokens/authentication",
    tag = "tokens",
    request_body = LoginRequest,
    responses(
        (status = 201, description = "Authentication token issued", body = AuthenticationTokenEnvelope),
        (status = 400, description = "Malformed request body"),
        (status = 401, description = "Invalid credentials"),
        (status = 422, description = "Validation failed"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_authentication_token(
    State(state): State<AppState>,
    StrictJson(request): StrictJson<LoginRequest>,
) -> Result<(StatusCode, Json<AuthenticationTokenEnvelope>)> {
    let auth = &state.config.auth;
    let issued = TokenManager::new(state.store.as_ref())
        .authenticate(&request.email, &request.password, &auth.password, auth.authentication_token_ttl)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthenticationTokenEnvelope {
            authentication_token: issued.into(),
        }),
    ))
}
