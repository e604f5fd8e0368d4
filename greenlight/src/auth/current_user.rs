//! Extractors for the user making the request.
//!
//! The [`authenticate`](super::middleware::authenticate) middleware resolves the bearer token
//! once per request and stores a [`CurrentUser`] in the request extensions. Handlers then ask for
//! as much as they need:
//!
//! ```ignore
//! async fn show_movie(ActivatedUser(user): ActivatedUser, ...) -> Result<...> { ... }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{db::models::users::UserDBResponse, errors::Error, types::UserId};

/// The account behind a valid bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub activated: bool,
}

impl From<UserDBResponse> for AuthenticatedUser {
    fn from(user: UserDBResponse) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            activated: user.activated,
        }
    }
}

/// Who is making the request. Requests without an `Authorization` header are anonymous.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CurrentUser {
    #[default]
    Anonymous,
    User(AuthenticatedUser),
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<CurrentUser>().cloned().unwrap_or_default())
    }
}

/// An authenticated user whose account has been activated.
///
/// Rejects anonymous requests with 401 and inactive accounts with 403.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivatedUser(pub AuthenticatedUser);

impl<S: Send + Sync> FromRequestParts<S> for ActivatedUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await? {
            CurrentUser::Anonymous => Err(Error::AuthenticationRequired),
            CurrentUser::User(user) if !user.activated => Err(Error::InactiveAccount),
            CurrentUser::User(user) => Ok(ActivatedUser(user)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts_with(user: Option<CurrentUser>) -> Parts {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("http://localhost/v1/movies")
            .body(())
            .unwrap()
            .into_parts();
        if let Some(user) = user {
            parts.extensions.insert(user);
        }
        parts
    }

    fn alice(activated: bool) -> CurrentUser {
        CurrentUser::User(AuthenticatedUser {
            id: 1,
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            activated,
        })
    }

    #[tokio::test]
    async fn test_missing_extension_is_anonymous() {
        let mut parts = parts_with(None);
        assert_eq!(CurrentUser::from_request_parts(&mut parts, &()).await.unwrap(), CurrentUser::Anonymous);
    }

    #[tokio::test]
    async fn test_activated_user_requirements() {
        let mut parts = parts_with(Some(CurrentUser::Anonymous));
        assert!(matches!(
            ActivatedUser::from_request_parts(&mut parts, &()).await,
            Err(Error::AuthenticationRequired)
        ));

        let mut parts = parts_with(Some(alice(false)));
        assert!(matches!(
            ActivatedUser::from_request_parts(&mut parts, &()).await,
            Err(Error::InactiveAccount)
        ));

        let mut parts = parts_with(Some(alice(true)));
        let ActivatedUser(user) = ActivatedUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user.id, 1);
    }
}
