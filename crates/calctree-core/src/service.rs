//! [`CalculationService`]: creating roots, appending operations, and
//! listing the forest on top of any [`CalculationStore`].

use std::sync::Arc;

use crate::{
  Error, Result,
  calculation::{CalculationNode, NewCalculation, Operation, ensure_finite},
  forest::build_forest,
  store::CalculationStore,
};

/// Business rules for the calculation forest.
///
/// Cloning is cheap; the store is reference-counted.
pub struct CalculationService<S> {
  store: Arc<S>,
}

impl<S> Clone for CalculationService<S> {
  fn clone(&self) -> Self { Self { store: self.store.clone() } }
}

impl<S: CalculationStore> CalculationService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Start a new tree at `number`.
  pub async fn create_root(
    &self,
    user_id: i64,
    number: f64,
  ) -> Result<CalculationNode> {
    let number = ensure_finite(number, "number")?;
    self.ensure_user(user_id).await?;

    let calculation = self
      .store
      .insert_calculation(NewCalculation::root(user_id, number))
      .await
      .map_err(Error::store)?;

    Ok(CalculationNode::leaf(calculation))
  }

  /// Append `operation number` beneath `parent_id`.
  ///
  /// Fails with [`Error::ParentNotFound`] before any arithmetic is attempted,
  /// then with [`Error::DivisionByZero`] for a zero divisor. Nothing is
  /// persisted on failure.
  pub async fn append_operation(
    &self,
    user_id: i64,
    parent_id: i64,
    operation: Operation,
    number: f64,
  ) -> Result<CalculationNode> {
    let number = ensure_finite(number, "number")?;
    self.ensure_user(user_id).await?;

    let parent = self
      .store
      .get_calculation(parent_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::ParentNotFound(parent_id))?;

    let result = operation.apply(parent.result, number)?;
    let result = ensure_finite(result, "result")?;

    let calculation = self
      .store
      .insert_calculation(NewCalculation::derived(
        user_id, parent_id, operation, number, result,
      ))
      .await
      .map_err(Error::store)?;

    Ok(CalculationNode::leaf(calculation))
  }

  /// The whole forest, roots and siblings in creation order.
  pub async fn list_forest(&self) -> Result<Vec<CalculationNode>> {
    let rows = self.store.list_calculations().await.map_err(Error::store)?;
    Ok(build_forest(rows))
  }

  async fn ensure_user(&self, user_id: i64) -> Result<()> {
    self
      .store
      .get_user(user_id)
      .await
      .map_err(Error::store)?
      .map(|_| ())
      .ok_or(Error::UserNotFound(user_id))
  }
}
