//! Handlers for `/api/calculations` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/calculations` | Whole forest; token optional |
//! | `POST` | `/calculations` | Body: `{"number": 42}`; returns 201 + root |
//! | `POST` | `/calculations/{id}/operation` | Body: `{"operation": "add", "number": 5}` |

use std::str::FromStr as _;

use axum::{
  Json,
  extract::{
    Path, State,
    rejection::{JsonRejection, PathRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use calctree_core::{
  calculation::{CalculationNode, Operation},
  store::CalculationStore,
};
use serde::Deserialize;

use crate::{
  AppState,
  auth::{AuthUser, MaybeAuthUser},
  error::ApiError,
  handlers::{TreeJson, json_body},
};

// ─── Request bodies ───────────────────────────────────────────────────────────

/// An operand as sent by clients: a JSON number or a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
  Number(f64),
  Text(String),
}

impl NumberInput {
  /// The operand as a finite `f64`.
  pub fn parse(self) -> Result<f64, ApiError> {
    let value = match self {
      Self::Number(n) => n,
      Self::Text(s) => s
        .trim()
        .parse::<f64>()
        .map_err(|_| ApiError::Validation("Number must be numeric".into()))?,
    };
    if value.is_finite() {
      Ok(value)
    } else {
      Err(ApiError::Validation("Number must be a finite number".into()))
    }
  }
}

fn required_number(number: Option<NumberInput>) -> Result<f64, ApiError> {
  number
    .ok_or_else(|| ApiError::Validation("Number is required".into()))?
    .parse()
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub number: Option<NumberInput>,
}

#[derive(Debug, Deserialize)]
pub struct OperationBody {
  pub operation: Option<String>,
  pub number:    Option<NumberInput>,
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /api/calculations`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  MaybeAuthUser(viewer): MaybeAuthUser,
) -> Result<TreeJson<Vec<CalculationNode>>, ApiError>
where
  S: CalculationStore + 'static,
{
  let forest = state.calculations().list_forest().await?;
  tracing::debug!(viewer = ?viewer, roots = forest.len(), "forest listed");
  Ok(TreeJson(forest))
}

// ─── Create root ──────────────────────────────────────────────────────────────

/// `POST /api/calculations`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  AuthUser { user_id }: AuthUser,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CalculationStore + 'static,
{
  let number = required_number(json_body(body)?.number)?;
  let node = state.calculations().create_root(user_id, number).await?;
  tracing::info!(id = node.calculation.id, user_id, "root created");
  Ok((StatusCode::CREATED, Json(node)))
}

// ─── Append operation ─────────────────────────────────────────────────────────

/// `POST /api/calculations/{id}/operation`
pub async fn append<S>(
  State(state): State<AppState<S>>,
  AuthUser { user_id }: AuthUser,
  parent_id: Result<Path<i64>, PathRejection>,
  body: Result<Json<OperationBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CalculationStore + 'static,
{
  let Path(parent_id) =
    parent_id.map_err(|_| ApiError::Validation("Invalid calculation id".into()))?;
  let body = json_body(body)?;

  let operation = body
    .operation
    .as_deref()
    .and_then(|op| Operation::from_str(op).ok())
    .ok_or_else(|| {
      ApiError::Validation(
        "Operation must be one of add, subtract, multiply, divide".into(),
      )
    })?;
  let number = required_number(body.number)?;

  let node = state
    .calculations()
    .append_operation(user_id, parent_id, operation, number)
    .await?;
  tracing::info!(
    id = node.calculation.id,
    parent_id,
    %operation,
    user_id,
    "operation appended"
  );
  Ok((StatusCode::CREATED, Json(node)))
}
