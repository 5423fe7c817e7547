//! Authentication: password hashing, bearer tokens, extractors, and the
//! register/login operations.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use calctree_core::{
  store::CalculationStore,
  user::{NewUser, PublicUser},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 6;

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Hash `password` with argon2id and a fresh random salt; returns a PHC
/// string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}

/// `false` for a wrong password and for an unparseable stored hash alike.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
  PasswordHash::new(password_hash)
    .and_then(|parsed| {
      Argon2::default().verify_password(password.as_bytes(), &parsed)
    })
    .is_ok()
}

/// Argon2 is deliberately slow; keep it off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
  F: FnOnce() -> Result<T, ApiError> + Send + 'static,
  T: Send + 'static,
{
  tokio::task::spawn_blocking(f)
    .await
    .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

/// JWT claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  #[serde(rename = "userId")]
  pub user_id: i64,
  pub iat:     i64,
  pub exp:     i64,
}

/// HS256 signing and verification keys plus the token lifetime.
#[derive(Clone)]
pub struct TokenKeys {
  encoding: EncodingKey,
  decoding: DecodingKey,
  ttl:      Duration,
}

impl TokenKeys {
  pub fn new(secret: &[u8], ttl: Duration) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      ttl,
    }
  }

  /// Issue a token for `user_id` valid from now.
  pub fn issue(&self, user_id: i64) -> Result<String, ApiError> {
    self.issue_at(user_id, Utc::now())
  }

  /// Issue a token as if it were `issued_at`.
  pub fn issue_at(
    &self,
    user_id: i64,
    issued_at: DateTime<Utc>,
  ) -> Result<String, ApiError> {
    let expires_at = issued_at
      .checked_add_signed(self.ttl)
      .ok_or_else(|| ApiError::Internal("token expiry out of range".into()))?;
    let claims = Claims {
      user_id,
      iat: issued_at.timestamp(),
      exp: expires_at.timestamp(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))
  }

  /// Check signature and expiry.
  pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(token, &self.decoding, &validation)
      .map(|data| data.claims)
      .map_err(|e| {
        tracing::debug!(error = %e, "token rejected");
        ApiError::InvalidToken
      })
  }
}

/// The token from an `Authorization: Bearer <token>` header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// Present in a handler means the request carried a valid bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
  pub user_id: i64,
}

impl<S> FromRequestParts<AppState<S>> for AuthUser
where
  S: CalculationStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers).ok_or(ApiError::AuthRequired)?;
    let claims = state.tokens.verify(token)?;
    Ok(AuthUser { user_id: claims.user_id })
  }
}

/// Like [`AuthUser`], but never rejects: a missing or invalid token yields
/// `None`.
#[derive(Debug, Clone, Copy)]
pub struct MaybeAuthUser(pub Option<i64>);

impl<S> FromRequestParts<AppState<S>> for MaybeAuthUser
where
  S: CalculationStore + 'static,
{
  type Rejection = std::convert::Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let user_id = bearer_token(&parts.headers)
      .and_then(|token| state.tokens.verify(token).ok())
      .map(|claims| claims.user_id);
    Ok(MaybeAuthUser(user_id))
  }
}

// ─── Register / login ────────────────────────────────────────────────────────

/// Returned by both register and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
  pub token: String,
  pub user:  PublicUser,
}

/// Create an account and sign the new user in.
///
/// The username is trimmed before validation and storage.
pub async fn register<S: CalculationStore>(
  store: &S,
  tokens: &TokenKeys,
  username: &str,
  password: String,
) -> Result<AuthResponse, ApiError> {
  let username = username.trim();
  let length = username.chars().count();
  if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
    return Err(ApiError::Validation(format!(
      "Username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
    )));
  }
  if password.chars().count() < PASSWORD_MIN {
    return Err(ApiError::Validation(format!(
      "Password must be at least {PASSWORD_MIN} characters"
    )));
  }

  let password_hash = blocking(move || hash_password(&password)).await?;

  let user = store
    .add_user(NewUser { username: username.to_owned(), password_hash })
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::DuplicateUsername)?;

  tracing::info!(user_id = user.id, username = %user.username, "user registered");

  Ok(AuthResponse { token: tokens.issue(user.id)?, user: user.public() })
}

/// Exchange a username and password for a token.
///
/// Unknown usernames and wrong passwords both fail with
/// [`ApiError::InvalidCredentials`].
pub async fn login<S: CalculationStore>(
  store: &S,
  tokens: &TokenKeys,
  username: &str,
  password: String,
) -> Result<AuthResponse, ApiError> {
  let username = username.trim();
  if username.is_empty() {
    return Err(ApiError::Validation("Username is required".into()));
  }
  if password.is_empty() {
    return Err(ApiError::Validation("Password is required".into()));
  }

  let Some(user) = store
    .find_user_by_username(username)
    .await
    .map_err(ApiError::store)?
  else {
    tracing::debug!("login for unknown username");
    return Err(ApiError::InvalidCredentials);
  };

  let stored = user.password_hash.clone();
  let valid = blocking(move || Ok(verify_password(&password, &stored))).await?;
  if !valid {
    tracing::debug!(user_id = user.id, "login with wrong password");
    return Err(ApiError::InvalidCredentials);
  }

  tracing::info!(user_id = user.id, "user logged in");

  Ok(AuthResponse { token: tokens.issue(user.id)?, user: user.public() })
}
