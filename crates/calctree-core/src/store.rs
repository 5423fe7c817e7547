//! The `CalculationStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `calctree-store-sqlite`). Higher layers depend on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use crate::{
  calculation::{Calculation, NewCalculation},
  user::{NewUser, User},
};

/// Abstraction over the durable store for users and calculations.
///
/// Both tables are append-only through this interface: nothing is updated
/// and nothing is deleted.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CalculationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new user.
  ///
  /// Returns `Ok(None)` if the username is already taken. Uniqueness is
  /// decided by the backend at insert time, so two racing registrations for
  /// the same name cannot both succeed.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Retrieve a user by exact (case-sensitive) username.
  fn find_user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  // ── Calculations ──────────────────────────────────────────────────────

  /// Persist a calculation and return it annotated with its owner's
  /// username. `id` and `created_at` are assigned by the store.
  fn insert_calculation(
    &self,
    input: NewCalculation,
  ) -> impl Future<Output = Result<Calculation, Self::Error>> + Send + '_;

  /// Retrieve a single calculation. Returns `None` if not found.
  fn get_calculation(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Calculation>, Self::Error>> + Send + '_;

  /// Every calculation, ordered by `created_at` then `id`, ascending.
  fn list_calculations(
    &self,
  ) -> impl Future<Output = Result<Vec<Calculation>, Self::Error>> + Send + '_;
}
