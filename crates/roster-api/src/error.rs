//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! The wire shape keeps the three outcomes of every mutation distinct:
//! 2xx success, 4xx user-correctable validation failure with a specific
//! message, 5xx transient failure with a generic retryable notice (the
//! underlying cause goes to the log, not the client).

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Missing, malformed, or unresolvable bearer token.
  #[error("unauthorized")]
  Unauthorized,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("unprocessable: {0}")]
  Unprocessable(String),

  #[error("unsupported media type: {0}")]
  UnsupportedMedia(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<roster_core::Error> for ApiError {
  fn from(e: roster_core::Error) -> Self {
    use roster_core::Error as E;
    match e {
      E::DuplicateRoleName(name) => {
        ApiError::Conflict(format!("role name already exists: {name:?}"))
      }
      E::HandleTaken(handle) => {
        ApiError::Conflict(format!("handle already taken: {handle:?}"))
      }
      E::RoleNotFound(_) | E::PrincipalNotFound(_) => ApiError::Conflict(
        "a referenced role or user no longer exists; refresh and retry"
          .to_owned(),
      ),
      E::InvalidRoleName(name) => {
        ApiError::Unprocessable(format!("invalid role name: {name:?}"))
      }
      E::Storage(source) => ApiError::Store(source),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized => {
        (StatusCode::UNAUTHORIZED, "unauthorized".to_owned())
      }
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
      ApiError::UnsupportedMedia(m) => {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, m.clone())
      }
      ApiError::Store(source) => {
        tracing::error!(error = %source, "storage failure");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          "storage failure; try again".to_owned(),
        )
      }
    };

    let mut response =
      (status, Json(json!({ "error": message }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }
    response
  }
}
