//! Async HTTP client wrapping the calctree JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use calctree_core::calculation::{CalculationNode, Operation};
use reqwest::{Client, Response};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;

/// `{token, user}` as returned by the auth endpoints.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
  pub token: String,
  pub user:  calctree_core::user::PublicUser,
}

/// Async HTTP client for the calctree REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
  token:    Option<String>,
}

impl ApiClient {
  pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self {
      client,
      base_url: base_url.trim_end_matches('/').to_string(),
      token,
    })
  }

  fn url(&self, path: &str) -> String { format!("{}/api{}", self.base_url, path) }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    match &self.token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  fn require_token(&self) -> Result<()> {
    if self.token.is_none() {
      return Err(anyhow!("not logged in; run `calctree login` first"));
    }
    Ok(())
  }

  // ── Auth ──────────────────────────────────────────────────────────────────

  /// `POST /api/auth/register`
  pub async fn register(&self, username: &str, password: &str) -> Result<AuthResponse> {
    let resp = self
      .client
      .post(self.url("/auth/register"))
      .json(&json!({ "username": username, "password": password }))
      .send()
      .await
      .context("POST /auth/register failed")?;
    decode(resp, "registration").await
  }

  /// `POST /api/auth/login`
  pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse> {
    let resp = self
      .client
      .post(self.url("/auth/login"))
      .json(&json!({ "username": username, "password": password }))
      .send()
      .await
      .context("POST /auth/login failed")?;
    decode(resp, "login").await
  }

  // ── Calculations ──────────────────────────────────────────────────────────

  /// `GET /api/calculations`
  pub async fn forest(&self) -> Result<Vec<CalculationNode>> {
    let resp = self
      .auth(self.client.get(self.url("/calculations")))
      .send()
      .await
      .context("GET /calculations failed")?;
    decode(resp, "listing").await
  }

  /// `POST /api/calculations`
  pub async fn start(&self, number: f64) -> Result<CalculationNode> {
    self.require_token()?;
    let resp = self
      .auth(self.client.post(self.url("/calculations")))
      .json(&json!({ "number": number }))
      .send()
      .await
      .context("POST /calculations failed")?;
    decode(resp, "start").await
  }

  /// `POST /api/calculations/{id}/operation`
  pub async fn apply(
    &self,
    parent_id: i64,
    operation: Operation,
    number: f64,
  ) -> Result<CalculationNode> {
    self.require_token()?;
    let resp = self
      .auth(self.client.post(self.url(&format!("/calculations/{parent_id}/operation"))))
      .json(&json!({ "operation": operation, "number": number }))
      .send()
      .await
      .with_context(|| format!("POST /calculations/{parent_id}/operation failed"))?;
    decode(resp, "operation").await
  }
}

/// Deserialise a success body, or surface the server's `error` message.
async fn decode<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T> {
  let status = resp.status();
  if status.is_success() {
    let bytes = resp
      .bytes()
      .await
      .with_context(|| format!("reading {what} response"))?;
    return parse_body(&bytes, what);
  }
  let message = resp
    .json::<serde_json::Value>()
    .await
    .ok()
    .and_then(|body| body.get("error").and_then(|e| e.as_str()).map(str::to_owned))
    .unwrap_or_else(|| status.to_string());
  Err(anyhow!("{what} failed ({status}): {message}"))
}

/// Success bodies may nest one level per operation in a chain, far past
/// serde_json's default limit.
fn parse_body<T: DeserializeOwned>(bytes: &[u8], what: &str) -> Result<T> {
  calctree_core::json::from_slice(bytes)
    .with_context(|| format!("deserialising {what} response"))
}
