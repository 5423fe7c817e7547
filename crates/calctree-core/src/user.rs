//! Registered users.
//!
//! Users are created once at registration and never updated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored user, including the password hash. Never serialised to clients;
/// use [`User::public`] for that.
#[derive(Debug, Clone)]
pub struct User {
  pub id:            i64,
  pub username:      String,
  /// PHC string, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

impl User {
  pub fn public(&self) -> PublicUser {
    PublicUser { id: self.id, username: self.username.clone() }
  }
}

/// The projection of a [`User`] that is safe to hand to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
  pub id:       i64,
  pub username: String,
}

/// Input to [`crate::store::CalculationStore::add_user`].
/// `id` and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub password_hash: String,
}
