//! Web error type and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,
  #[error("forbidden")]
  Forbidden,
  #[error("not found: {0}")]
  NotFound(String),
  #[error("bad request: {0}")]
  BadRequest(String),
  #[error(transparent)]
  Core(#[from] quill_core::Error),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    use quill_core::Error as Core;

    let (status, message) = match &self {
      Error::Unauthorized => {
        let mut res = (
          StatusCode::UNAUTHORIZED,
          Json(json!({ "error": "unauthorized" })),
        )
          .into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"quill\""),
        );
        return res;
      }
      Error::Forbidden => (StatusCode::FORBIDDEN, "forbidden".to_string()),
      Error::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      Error::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      Error::Core(e) if e.is_not_found() => {
        (StatusCode::NOT_FOUND, e.to_string())
      }
      Error::Core(e @ Core::ParentMismatch { .. }) => {
        (StatusCode::BAD_REQUEST, e.to_string())
      }
      Error::Core(e @ (Core::CategoryExists(_) | Core::UserExists(_))) => {
        (StatusCode::CONFLICT, e.to_string())
      }
      Error::Core(e @ Core::Upload(_)) => {
        tracing::error!("upload gateway failure: {e}");
        (StatusCode::BAD_GATEWAY, e.to_string())
      }
      Error::Core(e) => {
        tracing::error!("internal error: {e}");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          "internal error".to_string(),
        )
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
