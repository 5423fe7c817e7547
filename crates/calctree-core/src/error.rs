//! Error types for `calctree-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed or out-of-range input.
  #[error("{0}")]
  Validation(String),

  #[error("Division by zero")]
  DivisionByZero,

  #[error("parent calculation not found: {0}")]
  ParentNotFound(i64),

  #[error("user not found: {0}")]
  UserNotFound(i64),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box a backend error into [`Error::Store`].
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
