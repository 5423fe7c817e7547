//! [`SqliteStore`]: the SQLite implementation of [`CalculationStore`].

use std::path::Path;

use calctree_core::{
  calculation::{Calculation, NewCalculation},
  store::CalculationStore,
  user::{NewUser, User},
};
use rusqlite::OptionalExtension as _;

use crate::{
  Result,
  encode::{RawCalculation, RawUser, SELECT_CALCULATION, encode_dt, now},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A calculation store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("schema initialised");
    Ok(())
  }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

// ─── CalculationStore impl ───────────────────────────────────────────────────

impl CalculationStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<Option<User>> {
    let created_at = now();
    let at_str     = encode_dt(created_at);
    let username   = input.username.clone();
    let hash       = input.password_hash.clone();

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        match conn.execute(
          "INSERT INTO users (username, password_hash, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![username, hash, at_str],
        ) {
          Ok(_) => Ok(Some(conn.last_insert_rowid())),
          Err(e) if is_unique_violation(&e) => Ok(None),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    let Some(id) = id else {
      tracing::debug!(username = %input.username, "username already taken");
      return Ok(None);
    };

    Ok(Some(User {
      id,
      username: input.username,
      password_hash: input.password_hash,
      created_at,
    }))
  }

  async fn get_user(&self, id: i64) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT id, username, password_hash, created_at
             FROM users WHERE id = ?1",
            rusqlite::params![id],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> Result<Option<User>> {
    let username = username.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT id, username, password_hash, created_at
             FROM users WHERE username = ?1",
            rusqlite::params![username],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Calculations ──────────────────────────────────────────────────────────

  async fn insert_calculation(&self, input: NewCalculation) -> Result<Calculation> {
    let parent_id = input.parent_id();
    let operation = input.operation().map(|op| op.as_ref().to_owned());
    let at_str    = encode_dt(now());

    let raw: RawCalculation = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO calculations (user_id, parent_id, operation, number, result, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            input.user_id,
            parent_id,
            operation,
            input.number,
            input.result,
            at_str,
          ],
        )?;
        let id = tx.last_insert_rowid();
        let raw = tx.query_row(
          &format!("{SELECT_CALCULATION} WHERE c.id = ?1"),
          rusqlite::params![id],
          RawCalculation::from_row,
        )?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    let calculation = raw.into_calculation()?;
    tracing::debug!(
      id = calculation.id,
      parent_id = ?calculation.parent_id,
      "calculation stored"
    );
    Ok(calculation)
  }

  async fn get_calculation(&self, id: i64) -> Result<Option<Calculation>> {
    let raw: Option<RawCalculation> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("{SELECT_CALCULATION} WHERE c.id = ?1"),
            rusqlite::params![id],
            RawCalculation::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCalculation::into_calculation).transpose()
  }

  async fn list_calculations(&self) -> Result<Vec<Calculation>> {
    let raws: Vec<RawCalculation> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "{SELECT_CALCULATION} ORDER BY c.created_at ASC, c.id ASC"
        ))?;
        let rows = stmt
          .query_map([], RawCalculation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCalculation::into_calculation).collect()
  }
}
