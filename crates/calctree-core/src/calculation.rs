//! Calculation types: the nodes of the shared calculation forest.
//!
//! A calculation is either a root (a freestanding starting value) or a
//! derived node holding exactly one parent and one operation. Calculations
//! are written once and never updated; the stored `result` is the value
//! computed at creation time, not something recomputed on read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result};

// ─── Operation ───────────────────────────────────────────────────────────────

/// An arithmetic operation applied to a parent's result.
///
/// The lowercase name doubles as the wire format and the value stored in the
/// `operation` column.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  EnumString,
  Display,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
  Add,
  Subtract,
  Multiply,
  Divide,
}

impl Operation {
  /// Apply this operation to `lhs` with operand `rhs` in IEEE-754 double
  /// precision.
  ///
  /// Dividing by zero (either sign) is rejected rather than producing an
  /// infinite or NaN result.
  pub fn apply(self, lhs: f64, rhs: f64) -> Result<f64> {
    let value = match self {
      Self::Add => lhs + rhs,
      Self::Subtract => lhs - rhs,
      Self::Multiply => lhs * rhs,
      Self::Divide => {
        if rhs == 0.0 {
          return Err(Error::DivisionByZero);
        }
        lhs / rhs
      }
    };
    Ok(value)
  }

  /// The symbol used when rendering an operation for humans.
  pub fn symbol(self) -> char {
    match self {
      Self::Add => '+',
      Self::Subtract => '-',
      Self::Multiply => '×',
      Self::Divide => '÷',
    }
  }
}

/// Reject NaN and ±∞. `what` names the value in the error message.
pub fn ensure_finite(value: f64, what: &str) -> Result<f64> {
  if value.is_finite() {
    Ok(value)
  } else {
    Err(Error::Validation(format!("{what} must be a finite number")))
  }
}

// ─── Calculation ─────────────────────────────────────────────────────────────

/// The read view of a stored calculation, annotated with its owner's
/// username.
///
/// `parent_id` and `operation` are either both set (derived node) or both
/// `None` (root).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calculation {
  pub id:         i64,
  pub user_id:    i64,
  pub parent_id:  Option<i64>,
  pub operation:  Option<Operation>,
  pub number:     f64,
  pub result:     f64,
  /// Server-assigned timestamp; never changes after creation.
  pub created_at: DateTime<Utc>,
  pub username:   String,
}

impl Calculation {
  pub fn is_root(&self) -> bool { self.parent_id.is_none() }
}

// ─── NewCalculation ──────────────────────────────────────────────────────────

/// The parent link of a derived calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Derivation {
  pub parent_id: i64,
  pub operation: Operation,
}

/// Input to [`crate::store::CalculationStore::insert_calculation`].
/// `id` and `created_at` are always set by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCalculation {
  pub user_id:    i64,
  /// `None` for a root.
  pub derivation: Option<Derivation>,
  pub number:     f64,
  pub result:     f64,
}

impl NewCalculation {
  /// A root whose result is its own number.
  pub fn root(user_id: i64, number: f64) -> Self {
    Self { user_id, derivation: None, number, result: number }
  }

  /// A node derived from `parent_id` with a precomputed `result`.
  pub fn derived(
    user_id: i64,
    parent_id: i64,
    operation: Operation,
    number: f64,
    result: f64,
  ) -> Self {
    Self {
      user_id,
      derivation: Some(Derivation { parent_id, operation }),
      number,
      result,
    }
  }

  pub fn parent_id(&self) -> Option<i64> {
    self.derivation.map(|d| d.parent_id)
  }

  pub fn operation(&self) -> Option<Operation> {
    self.derivation.map(|d| d.operation)
  }
}

// ─── CalculationNode ─────────────────────────────────────────────────────────

/// A calculation together with its (recursively nested) children, as
/// returned by the forest listing and the write endpoints.
///
/// Serialises flat: the calculation's fields plus a `children` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationNode {
  #[serde(flatten)]
  pub calculation: Calculation,
  #[serde(default)]
  pub children:    Vec<CalculationNode>,
}

impl CalculationNode {
  /// A node with no children yet.
  pub fn leaf(calculation: Calculation) -> Self {
    Self { calculation, children: Vec::new() }
  }
}

// The derived drop glue recurses once per level; unlink descendants onto a
// heap stack instead so long chains drop in constant stack space.
impl Drop for CalculationNode {
  fn drop(&mut self) {
    let mut pending = std::mem::take(&mut self.children);
    while let Some(mut node) = pending.pop() {
      pending.append(&mut node.children);
    }
  }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn apply_chain_matches_double_precision() {
    let r = Operation::Add.apply(10.0, 5.0).unwrap();
    assert_eq!(r, 15.0);
    let r = Operation::Subtract.apply(r, 2.0).unwrap();
    assert_eq!(r, 13.0);
    let r = Operation::Multiply.apply(r, 2.0).unwrap();
    assert_eq!(r, 26.0);
    let r = Operation::Divide.apply(r, 2.0).unwrap();
    assert_eq!(r, 13.0);
  }

  #[test]
  fn float_rounding_is_preserved() {
    // Not 0.3: results follow plain f64 semantics.
    let r = Operation::Add.apply(0.1, 0.2).unwrap();
    assert_eq!(r, 0.1_f64 + 0.2_f64);
    assert_ne!(r, 0.3);
  }

  #[test]
  fn divide_by_zero_is_rejected() {
    assert!(matches!(
      Operation::Divide.apply(1.0, 0.0),
      Err(Error::DivisionByZero)
    ));
    assert!(matches!(
      Operation::Divide.apply(1.0, -0.0),
      Err(Error::DivisionByZero)
    ));
  }

  #[test]
  fn zero_operand_is_fine_for_other_operations() {
    assert_eq!(Operation::Multiply.apply(7.0, 0.0).unwrap(), 0.0);
    assert_eq!(Operation::Add.apply(7.0, 0.0).unwrap(), 7.0);
  }

  #[test]
  fn operation_parses_lowercase_names() {
    assert_eq!(Operation::from_str("add").unwrap(), Operation::Add);
    assert_eq!(Operation::from_str("divide").unwrap(), Operation::Divide);
    assert!(Operation::from_str("modulo").is_err());
    assert!(Operation::from_str("Add").is_err());
    assert_eq!(Operation::Subtract.as_ref(), "subtract");
    assert_eq!(Operation::Multiply.to_string(), "multiply");
  }

  #[test]
  fn ensure_finite_rejects_nan_and_infinity() {
    assert!(ensure_finite(1.5, "number").is_ok());
    assert!(matches!(
      ensure_finite(f64::NAN, "number"),
      Err(Error::Validation(_))
    ));
    assert!(matches!(
      ensure_finite(f64::INFINITY, "result"),
      Err(Error::Validation(_))
    ));
  }

  #[test]
  fn new_calculation_constructors() {
    let root = NewCalculation::root(1, 42.0);
    assert_eq!(root.result, 42.0);
    assert_eq!(root.parent_id(), None);
    assert_eq!(root.operation(), None);

    let child = NewCalculation::derived(1, 7, Operation::Add, 5.0, 47.0);
    assert_eq!(child.parent_id(), Some(7));
    assert_eq!(child.operation(), Some(Operation::Add));
  }

  #[test]
  fn node_serialises_flat_with_children() {
    let calc = Calculation {
      id:         1,
      user_id:    2,
      parent_id:  None,
      operation:  None,
      number:     42.0,
      result:     42.0,
      created_at: Utc::now(),
      username:   "alice".into(),
    };
    let json = serde_json::to_value(CalculationNode::leaf(calc)).unwrap();
    assert_eq!(json["id"], 1);
    assert_eq!(json["number"], 42.0);
    assert!(json["parent_id"].is_null());
    assert!(json["operation"].is_null());
    assert_eq!(json["username"], "alice");
    assert_eq!(json["children"], serde_json::json!([]));
  }
}
