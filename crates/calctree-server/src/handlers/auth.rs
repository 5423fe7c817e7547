//! Handlers for `/api/auth` endpoints.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use calctree_core::store::CalculationStore;
use serde::Deserialize;

use crate::{
  AppState,
  auth::{self, AuthResponse},
  error::ApiError,
  handlers::json_body,
};

/// Body of both auth endpoints. Missing fields are treated as empty and
/// rejected by validation.
#[derive(Debug, Deserialize)]
pub struct CredentialsBody {
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub password: String,
}

/// `POST /api/auth/register`: 201 + `{token, user}`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<CredentialsBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CalculationStore + 'static,
{
  let body = json_body(body)?;
  let response =
    auth::register(state.store.as_ref(), &state.tokens, &body.username, body.password)
      .await?;
  Ok((StatusCode::CREATED, Json(response)))
}

/// `POST /api/auth/login`: 200 + `{token, user}`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<CredentialsBody>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError>
where
  S: CalculationStore + 'static,
{
  let body = json_body(body)?;
  let response =
    auth::login(state.store.as_ref(), &state.tokens, &body.username, body.password)
      .await?;
  Ok(Json(response))
}
