use crate::db::errors::DbError;
use crate::validator::FieldErrors;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// One or more input fields failed validation
    #[error("Failed validation: {errors:?}")]
    Validation { errors: FieldErrors },

    /// Malformed request envelope, detected before any business validation runs
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested resource not found (or indistinguishable from not found)
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// The record changed between read and write
    #[error("Edit conflict")]
    EditConflict,

    /// Login failed; deliberately does not say which credential was wrong
    #[error("Invalid authentication credentials")]
    InvalidCredentials,

    /// Token absent, expired, or issued for another scope
    #[error("Invalid or missing token")]
    InvalidToken,

    /// Authentication required but not provided
    #[error("Not authenticated")]
    AuthenticationRequired,

    /// Authenticated, but the account has not been activated
    #[error("Account not activated")]
    InactiveAccount,

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Store operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        Error::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Error::BadRequest { message: message.into() }
    }

    /// Shorthand for a validation failure on a single field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), message.into());
        Error::Validation { errors }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::EditConflict => StatusCode::CONFLICT,
            Error::InvalidCredentials | Error::InvalidToken | Error::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Error::InactiveAccount => StatusCode::FORBIDDEN,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::VersionConflict => StatusCode::CONFLICT,
                DbError::UniqueViolation { .. } => StatusCode::CONFLICT,
                DbError::ForeignKeyViolation { .. } | DbError::CheckViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation { .. } => "the request failed validation".to_string(),
            Error::BadRequest { message } => message.clone(),
            Error::NotFound { .. } | Error::Database(DbError::NotFound) => "the requested resource could not be found".to_string(),
            Error::EditConflict | Error::Database(DbError::VersionConflict) => {
                "unable to update the record due to an edit conflict, please try again".to_string()
            }
            Error::InvalidCredentials => "invalid authentication credentials".to_string(),
            Error::InvalidToken => "invalid or missing authentication token".to_string(),
            Error::AuthenticationRequired => "you must be authenticated to access this resource".to_string(),
            Error::InactiveAccount => "your user account must be activated to access this resource".to_string(),
            Error::Database(DbError::UniqueViolation { .. }) => "resource already exists".to_string(),
            Error::Database(DbError::ForeignKeyViolation { .. }) => "invalid reference to related resource".to_string(),
            Error::Database(DbError::CheckViolation { .. }) => "invalid data provided".to_string(),
            Error::Internal { .. } | Error::Database(DbError::Other(_)) | Error::Other(_) => {
                "the server encountered a problem and could not process your request".to_string()
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) | Error::EditConflict => {
                tracing::warn!("Conflict error: {}", self);
            }
            Error::InvalidCredentials | Error::InvalidToken | Error::AuthenticationRequired | Error::InactiveAccount => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::Validation { .. } | Error::BadRequest { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();

        let mut response = match &self {
            Error::Validation { errors } => (status, Json(json!({ "error": errors }))).into_response(),
            _ => (status, Json(json!({ "error": self.user_message() }))).into_response(),
        };

        if matches!(self, Error::InvalidToken) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

/// Convert from String errors (e.g., from external functions)
impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Internal { operation: msg }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
