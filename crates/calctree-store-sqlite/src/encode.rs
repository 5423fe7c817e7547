//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond width
//! so that lexical order equals chronological order. Operations are stored
//! as their lowercase names.

use std::str::FromStr as _;

use calctree_core::{
  calculation::{Calculation, Operation},
  user::User,
};
use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time, truncated to what survives a round trip through
/// [`encode_dt`].
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Operation ───────────────────────────────────────────────────────────────

pub fn decode_operation(s: &str) -> Result<Operation> {
  Operation::from_str(s)
    .map_err(|_| Error::Decode(format!("unknown operation: {s:?}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Columns selected for every calculation read, joined with the owner.
pub const SELECT_CALCULATION: &str = "
  SELECT c.id, c.user_id, c.parent_id, c.operation,
         c.number, c.result, c.created_at, u.username
  FROM calculations c
  JOIN users u ON u.id = c.user_id";

/// Raw values read directly from a `calculations` row joined with `users`.
pub struct RawCalculation {
  pub id:         i64,
  pub user_id:    i64,
  pub parent_id:  Option<i64>,
  pub operation:  Option<String>,
  pub number:     f64,
  pub result:     f64,
  pub created_at: String,
  pub username:   String,
}

impl RawCalculation {
  /// Map a row produced by [`SELECT_CALCULATION`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      user_id:    row.get(1)?,
      parent_id:  row.get(2)?,
      operation:  row.get(3)?,
      number:     row.get(4)?,
      result:     row.get(5)?,
      created_at: row.get(6)?,
      username:   row.get(7)?,
    })
  }

  pub fn into_calculation(self) -> Result<Calculation> {
    let operation = self.operation.as_deref().map(decode_operation).transpose()?;
    if operation.is_some() != self.parent_id.is_some() {
      return Err(Error::Decode(format!(
        "calculation {} has mismatched parent and operation",
        self.id
      )));
    }
    Ok(Calculation {
      id: self.id,
      user_id: self.user_id,
      parent_id: self.parent_id,
      operation,
      number: self.number,
      result: self.result,
      created_at: decode_dt(&self.created_at)?,
      username: self.username,
    })
  }
}

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub id:            i64,
  pub username:      String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      username:      row.get(1)?,
      password_hash: row.get(2)?,
      created_at:    row.get(3)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:            self.id,
      username:      self.username,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn encoded_timestamps_sort_lexically() {
    let a = decode_dt("2024-01-01T00:00:00.999999Z").unwrap();
    let b = decode_dt("2024-01-01T00:00:01Z").unwrap();
    assert!(encode_dt(a) < encode_dt(b));
    assert_eq!(encode_dt(b), "2024-01-01T00:00:01.000000Z");
  }

  #[test]
  fn now_round_trips() {
    let t = now();
    assert_eq!(decode_dt(&encode_dt(t)).unwrap(), t);
  }

  #[test]
  fn unknown_operation_is_a_decode_error() {
    assert!(matches!(decode_operation("modulo"), Err(Error::Decode(_))));
    assert_eq!(decode_operation("divide").unwrap(), Operation::Divide);
  }
}
