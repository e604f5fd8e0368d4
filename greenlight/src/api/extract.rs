//! Request extractors.
//!
//! - [`StrictJson`]: whole-body JSON decoding with client-readable rejections
//! - [`RawBody`]: the body bytes, left for the handler to decode with [`parse_json_body`]
//! - [`ResourceId`]: positive integer path ids, anything else is a 404
//! - [`ExpectedVersion`]: the optional `X-Expected-Version` header

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{StatusCode, request::Parts},
};
use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::{AppState, errors::Error};

pub const EXPECTED_VERSION_HEADER: &str = "x-expected-version";

/// JSON body extractor that accepts exactly one JSON value and nothing else.
///
/// Unlike `axum::Json` it rejects trailing content and turns every decoding failure into a
/// 400 whose message says what was wrong.
#[derive(Debug, Clone)]
pub struct StrictJson<T>(pub T);

impl<T: DeserializeOwned> FromRequest<AppState> for StrictJson<T> {
    type Rejection = Error;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let RawBody(bytes) = RawBody::from_request(req, state).await?;
        parse_json_body(&bytes).map(StrictJson)
    }
}

/// Undecoded request body, subject to the configured body limit.
///
/// For handlers that must look something up before the body is allowed to fail.
#[derive(Debug, Clone)]
pub struct RawBody(pub Bytes);

impl FromRequest<AppState> for RawBody {
    type Rejection = Error;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let limit = state.config.limits.max_body_bytes;
        Bytes::from_request(req, state).await.map(RawBody).map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                Error::bad_request(format!("body must not be larger than {limit} bytes"))
            } else {
                Error::bad_request(rejection.body_text())
            }
        })
    }
}

/// Decode `bytes` as a single JSON value of type `T`.
pub fn parse_json_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, Error> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::bad_request("body must not be empty"));
    }

    let mut de = serde_json::Deserializer::from_slice(bytes);
    let value = T::deserialize(&mut de).map_err(describe_json_error)?;
    de.end()
        .map_err(|_| Error::bad_request("body must only contain a single JSON value"))?;

    Ok(value)
}

fn describe_json_error(err: serde_json::Error) -> Error {
    let message = match err.classify() {
        Category::Syntax => format!("body contains badly-formed JSON (at line {}, column {})", err.line(), err.column()),
        Category::Eof => "body contains badly-formed JSON".to_string(),
        Category::Data => {
            // serde_json appends " at line L column C"; the position is reported separately
            let text = err.to_string();
            let text = text.rsplit_once(" at line ").map_or(text.as_str(), |(head, _)| head);
            if let Some(rest) = text.strip_prefix("unknown field `") {
                let field = rest.split('`').next().unwrap_or_default();
                format!("body contains unknown key \"{field}\"")
            } else if text.starts_with("invalid type") {
                format!("body contains incorrect JSON type (at line {}, column {})", err.line(), err.column())
            } else {
                text.to_string()
            }
        }
        Category::Io => "failed to read body".to_string(),
    };

    Error::bad_request(message)
}

/// Positive integer id taken from the `{id}` path segment.
///
/// Ids that don't parse, or are below 1, are rejected as not found: they can never name a
/// record, and a 404 reveals nothing about which ids exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceId(pub i64);

impl<S: Send + Sync> FromRequestParts<S> for ResourceId {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| Error::not_found("Resource", "<invalid>"))?;

        match raw.parse::<i64>() {
            Ok(id) if id >= 1 => Ok(ResourceId(id)),
            _ => Err(Error::not_found("Resource", raw)),
        }
    }
}

/// Value of the optional `X-Expected-Version` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExpectedVersion(pub Option<i32>);

impl<S: Send + Sync> FromRequestParts<S> for ExpectedVersion {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(EXPECTED_VERSION_HEADER) else {
            return Ok(ExpectedVersion(None));
        };

        value
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<i32>().ok())
            .map(|v| ExpectedVersion(Some(v)))
            .ok_or_else(|| Error::bad_request("X-Expected-Version header must be an integer"))
    }
}
