//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error is rendered as `{"error": "<message>"}`. Internal failures are
//! logged here and reduced to an opaque message so store details never reach
//! the client.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  Validation(String),

  #[error("Username already exists")]
  DuplicateUsername,

  /// Same message for unknown usernames and wrong passwords.
  #[error("Invalid credentials")]
  InvalidCredentials,

  #[error("Authentication required")]
  AuthRequired,

  #[error("Invalid or expired token")]
  InvalidToken,

  #[error("Parent calculation not found")]
  NotFound,

  #[error("Division by zero")]
  DivisionByZero,

  #[error("internal error: {0}")]
  Internal(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::Validation(_) | Self::DuplicateUsername | Self::DivisionByZero => {
        StatusCode::BAD_REQUEST
      }
      Self::InvalidCredentials | Self::AuthRequired | Self::InvalidToken => {
        StatusCode::UNAUTHORIZED
      }
      Self::NotFound => StatusCode::NOT_FOUND,
      Self::Internal(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<calctree_core::Error> for ApiError {
  fn from(err: calctree_core::Error) -> Self {
    use calctree_core::Error as Core;
    match err {
      Core::Validation(msg) => Self::Validation(msg),
      Core::DivisionByZero => Self::DivisionByZero,
      Core::ParentNotFound(_) => Self::NotFound,
      // A well-signed token for a user that no longer exists.
      Core::UserNotFound(_) => Self::InvalidToken,
      Core::Store(e) => Self::Store(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
      "Internal server error".to_owned()
    } else {
      self.to_string()
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
