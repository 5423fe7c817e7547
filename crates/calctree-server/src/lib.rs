//! HTTP layer for the calculation tree.
//!
//! Exposes an axum [`Router`] implementing the REST API backed by any
//! [`CalculationStore`], plus the auth service that issues bearer tokens.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;

pub use crate::{config::ServerConfig, error::ApiError};

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use calctree_core::{service::CalculationService, store::CalculationStore};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use auth::TokenKeys;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers. Built once in `main`.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub tokens: Arc<TokenKeys>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), tokens: self.tokens.clone() }
  }
}

impl<S: CalculationStore> AppState<S> {
  pub fn new(store: Arc<S>, tokens: TokenKeys) -> Self {
    Self { store, tokens: Arc::new(tokens) }
  }

  pub fn calculations(&self) -> CalculationService<S> {
    CalculationService::new(self.store.clone())
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: CalculationStore + 'static,
{
  Router::new()
    .route("/health", get(handlers::health::handler))
    .route("/api/auth/register", post(handlers::auth::register::<S>))
    .route("/api/auth/login", post(handlers::auth::login::<S>))
    .route(
      "/api/calculations",
      get(handlers::calculations::list::<S>).post(handlers::calculations::create::<S>),
    )
    .route(
      "/api/calculations/{id}/operation",
      post(handlers::calculations::append::<S>),
    )
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
