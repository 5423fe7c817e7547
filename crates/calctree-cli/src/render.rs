//! Plain-text rendering of the calculation forest.

use calctree_core::calculation::{Calculation, CalculationNode};

/// One line per node, children indented beneath their parent.
///
/// Walks with an explicit stack so long operation chains render without
/// recursion.
pub fn render_forest(forest: &[CalculationNode]) -> String {
  let mut out = String::new();
  let mut stack: Vec<(&CalculationNode, usize)> =
    forest.iter().rev().map(|n| (n, 0)).collect();

  while let Some((node, depth)) = stack.pop() {
    out.push_str(&"  ".repeat(depth));
    out.push_str(&describe(&node.calculation));
    out.push('\n');
    stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
  }
  out
}

/// `#id  result  (op number)  by username`
pub fn describe(calc: &Calculation) -> String {
  match calc.operation {
    None => format!("#{}  {}  (start)  by {}", calc.id, calc.result, calc.username),
    Some(op) => format!(
      "#{}  {}  ({} {})  by {}",
      calc.id,
      calc.result,
      op.symbol(),
      calc.number,
      calc.username
    ),
  }
}

#[cfg(test)]
mod tests {
  use calctree_core::calculation::Operation;
  use chrono::Utc;

  use super::*;

  fn node(
    id: i64,
    op: Option<Operation>,
    number: f64,
    result: f64,
    children: Vec<CalculationNode>,
  ) -> CalculationNode {
    CalculationNode {
      calculation: Calculation {
        id,
        user_id: 1,
        parent_id: op.map(|_| id - 1),
        operation: op,
        number,
        result,
        created_at: Utc::now(),
        username: "alice".into(),
      },
      children,
    }
  }

  #[test]
  fn renders_nested_tree() {
    let forest = vec![
      node(
        1,
        None,
        10.0,
        10.0,
        vec![
          node(2, Some(Operation::Add), 5.0, 15.0, vec![node(
            3,
            Some(Operation::Divide),
            2.0,
            7.5,
            vec![],
          )]),
          node(4, Some(Operation::Multiply), 2.0, 20.0, vec![]),
        ],
      ),
      node(5, None, -1.0, -1.0, vec![]),
    ];

    let expected = "\
#1  10  (start)  by alice
  #2  15  (+ 5)  by alice
    #3  7.5  (÷ 2)  by alice
  #4  20  (× 2)  by alice
#5  -1  (start)  by alice
";
    assert_eq!(render_forest(&forest), expected);
  }

  #[test]
  fn empty_forest_renders_nothing() {
    assert_eq!(render_forest(&[]), "");
  }
}
