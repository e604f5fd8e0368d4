use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    api::{
        extract::StrictJson,
        models::users::{ActivateRequest, RegisterRequest, UserEnvelope},
    },
    errors::Result,
    services::AccountManager,
};

/// Register a new, inactive account
///
/// An activation token is issued for the account. It is only returned in the response when the
/// server is configured to do so; otherwise it must be delivered out of band.
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account registered", body = UserEnvelope),
        (status = 400, description = "Malformed request body"),
        (status = 422, description = "Validation failed, including duplicate email"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register_user(
    State(state): State<AppState>,
    StrictJson(request): StrictJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserEnvelope>)> {
    let registration = AccountManager::new(state.store.as_ref(), &state.config.auth)
        .register(request.into())
        .await?;

    let activation_token = state
        .config
        .auth
        .return_activation_token
        .then(|| registration.activation_token.into());

    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope {
            user: registration.user.into(),
            activation_token,
        }),
    ))
}

/// Activate an account with its activation token
#[utoipa::path(
    put,
    path = "/users/activated",
    tag = "users",
    request_body = ActivateRequest,
    responses(
        (status = 200, description = "Account activated", body = UserEnvelope),
        (status = 400, description = "Malformed request body"),
        (status = 409, description = "Account changed concurrently"),
        (status = 422, description = "Missing, invalid or expired token"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn activate_user(
    State(state): State<AppState>,
    StrictJson(request): StrictJson<ActivateRequest>,
) -> Result<Json<UserEnvelope>> {
    let user = AccountManager::new(state.store.as_ref(), &state.config.auth)
        .activate(&request.token)
        .await?;

    Ok(Json(UserEnvelope {
        user: user.into(),
        activation_token: None,
    }))
}
