//! Forest reconstruction from flat parent-pointer rows.
//!
//! Every node is materialised first; edges are wired by parent id afterwards.
//! Nodes are assembled in post-order with an explicit stack, so arbitrarily
//! deep chains never recurse.

use std::collections::HashMap;

use crate::calculation::{Calculation, CalculationNode};

/// Build the forest from `rows`, which must already be in creation order.
///
/// Roots appear in the order they occur in `rows`, as do the children of
/// each node. A row whose parent is not present in `rows` is dropped along
/// with its descendants.
pub fn build_forest(rows: Vec<Calculation>) -> Vec<CalculationNode> {
  let n = rows.len();
  let index: HashMap<i64, usize> =
    rows.iter().enumerate().map(|(i, row)| (row.id, i)).collect();

  let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
  let mut roots: Vec<usize> = Vec::new();

  for (i, row) in rows.iter().enumerate() {
    match row.parent_id {
      None => roots.push(i),
      Some(parent_id) => match index.get(&parent_id) {
        Some(&p) if p != i => children[p].push(i),
        _ => {}
      },
    }
  }

  // Post-order over everything reachable from a root.
  let mut order: Vec<usize> = Vec::with_capacity(n);
  let mut stack: Vec<(usize, bool)> =
    roots.iter().rev().map(|&r| (r, false)).collect();
  while let Some((i, expanded)) = stack.pop() {
    if expanded {
      order.push(i);
      continue;
    }
    stack.push((i, true));
    stack.extend(children[i].iter().rev().map(|&c| (c, false)));
  }

  let mut slots: Vec<Option<Calculation>> = rows.into_iter().map(Some).collect();
  let mut built: Vec<Option<CalculationNode>> = (0..n).map(|_| None).collect();

  for i in order {
    let Some(calculation) = slots[i].take() else { continue };
    let kids = children[i]
      .iter()
      .filter_map(|&c| built[c].take())
      .collect();
    built[i] = Some(CalculationNode { calculation, children: kids });
  }

  roots.into_iter().filter_map(|r| built[r].take()).collect()
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone, Utc};

  use super::*;
  use crate::calculation::Operation;

  fn row(id: i64, parent_id: Option<i64>) -> Calculation {
    Calculation {
      id,
      user_id: 1,
      parent_id,
      operation: parent_id.map(|_| Operation::Add),
      number: id as f64,
      result: id as f64,
      created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        + Duration::seconds(id),
      username: "alice".into(),
    }
  }

  fn ids(nodes: &[CalculationNode]) -> Vec<i64> {
    nodes.iter().map(|n| n.calculation.id).collect()
  }

  #[test]
  fn empty_input_gives_empty_forest() {
    assert!(build_forest(Vec::new()).is_empty());
  }

  #[test]
  fn chain_nests_three_deep() {
    let forest = build_forest(vec![row(1, None), row(2, Some(1)), row(3, Some(2))]);
    assert_eq!(ids(&forest), vec![1]);
    let a = &forest[0];
    assert_eq!(ids(&a.children), vec![2]);
    let b = &a.children[0];
    assert_eq!(ids(&b.children), vec![3]);
    assert!(b.children[0].children.is_empty());
  }

  #[test]
  fn siblings_keep_creation_order() {
    let forest = build_forest(vec![
      row(1, None),
      row(2, Some(1)),
      row(3, Some(1)),
      row(4, Some(1)),
    ]);
    assert_eq!(ids(&forest[0].children), vec![2, 3, 4]);
  }

  #[test]
  fn unrelated_roots_are_separate_entries() {
    let forest = build_forest(vec![
      row(1, None),
      row(2, None),
      row(3, Some(2)),
      row(4, Some(1)),
    ]);
    assert_eq!(ids(&forest), vec![1, 2]);
    assert_eq!(ids(&forest[0].children), vec![4]);
    assert_eq!(ids(&forest[1].children), vec![3]);
  }

  #[test]
  fn orphans_are_dropped_with_their_subtree() {
    let forest = build_forest(vec![
      row(1, None),
      row(5, Some(99)),
      row(6, Some(5)),
      row(7, Some(1)),
    ]);
    assert_eq!(ids(&forest), vec![1]);
    assert_eq!(ids(&forest[0].children), vec![7]);
  }

  #[test]
  fn self_reference_is_dropped() {
    let forest = build_forest(vec![row(1, None), row(2, Some(2))]);
    assert_eq!(ids(&forest), vec![1]);
    assert!(forest[0].children.is_empty());
  }

  #[test]
  fn rebuild_is_structurally_identical() {
    let rows = vec![row(1, None), row(2, Some(1)), row(3, None), row(4, Some(2))];
    assert_eq!(build_forest(rows.clone()), build_forest(rows));
  }

  #[test]
  fn deep_chain_does_not_recurse() {
    let depth = 5_000;
    let mut rows = vec![row(1, None)];
    rows.extend((2..=depth).map(|id| row(id, Some(id - 1))));
    let mut forest = build_forest(rows);
    assert_eq!(forest.len(), 1);

    let mut count = 0;
    let mut cursor = forest.pop();
    while let Some(mut node) = cursor {
      count += 1;
      cursor = node.children.pop();
    }
    assert_eq!(count, depth);
  }
}
