//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use dnc_core::DomainError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  /// The LLM or the course catalog failed.
  #[error("upstream error: {0}")]
  Upstream(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a store error by the domain failure it carries, if any.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + DomainError + Send + Sync + 'static,
  {
    match e.domain() {
      Some(d) => Self::from_domain(d, d.to_string()),
      None => Self::Store(Box::new(e)),
    }
  }

  /// Classify an error from an external service. The service's own
  /// user-facing message wins over the technical one.
  pub fn upstream<E>(e: E) -> Self
  where
    E: std::error::Error + DomainError,
  {
    tracing::warn!(error = %e, "external service call failed");
    let message = e.public_message().unwrap_or_else(|| e.to_string());
    match e.domain() {
      Some(d) => Self::from_domain(d, message),
      None => Self::Upstream(message),
    }
  }

  fn from_domain(e: &dnc_core::Error, message: String) -> Self {
    if e.is_not_found() {
      Self::NotFound(message)
    } else if e.is_conflict() {
      Self::Conflict(message)
    } else {
      Self::BadRequest(message)
    }
  }
}

impl From<dnc_core::Error> for ApiError {
  fn from(e: dnc_core::Error) -> Self { Self::from_domain(&e, e.to_string()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Upstream(m) => (StatusCode::BAD_GATEWAY, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
