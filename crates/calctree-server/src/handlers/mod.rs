//! Route handlers.
//!
//! | Method | Path | Auth |
//! |--------|------|------|
//! | `POST` | `/api/auth/register` | none |
//! | `POST` | `/api/auth/login` | none |
//! | `GET`  | `/api/calculations` | optional |
//! | `POST` | `/api/calculations` | bearer |
//! | `POST` | `/api/calculations/{id}/operation` | bearer |
//! | `GET`  | `/health` | none |

pub mod auth;
pub mod calculations;
pub mod health;

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::{HeaderValue, header},
  response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::ApiError;

/// Unwrap a JSON body, turning every rejection (syntax, types, missing
/// content type) into a 400.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
  body
    .map(|Json(inner)| inner)
    .map_err(|rejection| ApiError::Validation(rejection.body_text()))
}

/// A JSON response for values nested arbitrarily deep, such as the forest.
///
/// [`Json`] serialises recursively on the worker's stack; this goes through
/// [`calctree_core::json::to_vec`] instead.
pub struct TreeJson<T>(pub T);

impl<T: Serialize> IntoResponse for TreeJson<T> {
  fn into_response(self) -> Response {
    match calctree_core::json::to_vec(&self.0) {
      Ok(bytes) => (
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        bytes,
      )
        .into_response(),
      Err(e) => {
        ApiError::Internal(format!("response serialisation failed: {e}"))
          .into_response()
      }
    }
  }
}
