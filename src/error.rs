//! Backend-wide error type and its HTTP rendering.

use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

use crate::protocol::ErrorOut;

#[derive(Debug, Error)]
pub enum AppError {
  /// Missing credential or a client that cannot be built.
  #[error("configuration error: {0}")]
  Configuration(String),

  /// Network, auth, quota or any other failure talking to the hosted model.
  #[error("transport error: {0}")]
  Transport(String),

  /// The model reply could not be decoded into the expected shape.
  #[error("parse error: {0}")]
  Parse(String),

  #[error("{kind} '{id}' not found")]
  NotFound { kind: &'static str, id: String },

  #[error("{kind} '{id}' already exists")]
  AlreadyExists { kind: &'static str, id: String },

  #[error("invalid input: {0}")]
  InvalidInput(String),
}

impl AppError {
  pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
    AppError::NotFound { kind, id: id.into() }
  }

  pub fn already_exists(kind: &'static str, id: impl Into<String>) -> Self {
    AppError::AlreadyExists { kind, id: id.into() }
  }

  /// Short machine-readable tag used in HTTP error bodies.
  pub fn kind(&self) -> &'static str {
    match self {
      AppError::Configuration(_) => "configuration",
      AppError::Transport(_) => "transport",
      AppError::Parse(_) => "parse",
      AppError::NotFound { .. } => "not_found",
      AppError::AlreadyExists { .. } => "already_exists",
      AppError::InvalidInput(_) => "invalid_input",
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
      AppError::Transport(_) | AppError::Parse(_) => StatusCode::BAD_GATEWAY,
      AppError::NotFound { .. } => StatusCode::NOT_FOUND,
      AppError::AlreadyExists { .. } => StatusCode::CONFLICT,
      AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
    }
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> axum::response::Response {
    let body = ErrorOut { error: self.kind(), message: self.to_string() };
    (self.status(), Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn statuses_follow_error_kind() {
    assert_eq!(AppError::not_found("user", "u1").status(), StatusCode::NOT_FOUND);
    assert_eq!(AppError::already_exists("quiz", "Q1").status(), StatusCode::CONFLICT);
    assert_eq!(AppError::Parse("bad".into()).status(), StatusCode::BAD_GATEWAY);
    assert_eq!(AppError::Transport("down".into()).status(), StatusCode::BAD_GATEWAY);
    assert_eq!(AppError::Configuration("no key".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn not_found_message_names_kind_and_id() {
    let e = AppError::not_found("content", "A1");
    assert_eq!(e.to_string(), "content 'A1' not found");
    assert_eq!(e.kind(), "not_found");
  }
}
