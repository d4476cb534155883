//! Answer validation: compares a submitted answer against the persisted
//! secret payload under kind-specific tolerance/equality rules.
//!
//! The expected payload is always re-derived from the stored instance, never
//! taken from the request body. Validation outcomes are values, not errors:
//! a wrong answer, a missing answer, and a kind mismatch all come back as
//! `ok = false` with an explanation, but a mismatch is flagged separately so
//! callers can distinguish a tampered request from an incorrect answer.

use std::collections::HashSet;

use crate::domain::{Answer, Expected};
use crate::numeric::dot2;

#[derive(Clone, Debug)]
pub struct Verdict {
  pub ok: bool,
  /// True when the submitted answer's kind does not match the exercise kind.
  /// Never set for an ordinary wrong answer.
  pub mismatch: bool,
  /// Ground truth, echoed back for display after grading or reveal.
  pub expected: Expected,
  pub explanation: String,
}

impl Verdict {
  fn wrong(expected: &Expected, explanation: impl Into<String>) -> Verdict {
    Verdict { ok: false, mismatch: false, expected: expected.clone(), explanation: explanation.into() }
  }
}

/// Grade `answer` against `expected`. A reveal never counts as correct,
/// regardless of any submitted payload.
pub fn validate(expected: &Expected, answer: Option<&Answer>, reveal: bool) -> Verdict {
  if reveal {
    return Verdict::wrong(expected, "answer revealed");
  }

  let answer = match answer {
    Some(a) => a,
    None => return Verdict::wrong(expected, "no answer submitted"),
  };

  if answer.kind() != expected.kind() {
    return Verdict {
      ok: false,
      mismatch: true,
      expected: expected.clone(),
      explanation: format!(
        "type mismatch: exercise is {:?}, answer is {:?}",
        expected.kind(),
        answer.kind()
      ),
    };
  }

  let ok = match (expected, answer) {
    (Expected::Numeric { value, tolerance }, Answer::Numeric { value: got }) => {
      (got - value).abs() <= *tolerance
    }
    (Expected::SingleChoice { option_id }, Answer::SingleChoice { option_id: got }) => {
      got == option_id
    }
    (Expected::MultiChoice { option_ids }, Answer::MultiChoice { option_ids: got }) => {
      // Set equality: order and duplicates are irrelevant.
      let want: HashSet<&str> = option_ids.iter().map(String::as_str).collect();
      let got: HashSet<&str> = got.iter().map(String::as_str).collect();
      want == got
    }
    (Expected::VectorDragTarget { target, tolerance, .. }, Answer::VectorDragTarget { point }) => {
      // Squared-distance comparison; no sqrt needed.
      let dx = point.x - target.x;
      let dy = point.y - target.y;
      dx * dx + dy * dy <= tolerance * tolerance
    }
    (
      Expected::VectorDragDot { target_dot, fixed, tolerance },
      Answer::VectorDragDot { vector },
    ) => (dot2(*vector, *fixed) - target_dot).abs() <= *tolerance,
    (Expected::MatrixInput { target, tolerance }, Answer::MatrixInput { cells }) => {
      matrix_within(target, cells, *tolerance)
    }
    // Kinds already matched above; this arm is unreachable but keeps the
    // match exhaustive without a panic.
    _ => false,
  };

  if ok {
    Verdict { ok: true, mismatch: false, expected: expected.clone(), explanation: "correct".into() }
  } else {
    Verdict::wrong(expected, "incorrect")
  }
}

/// All-or-nothing cell comparison; shape mismatch is simply wrong.
fn matrix_within(target: &[Vec<f64>], cells: &[Vec<f64>], tolerance: f64) -> bool {
  if target.len() != cells.len() {
    return false;
  }
  for (trow, crow) in target.iter().zip(cells.iter()) {
    if trow.len() != crow.len() {
      return false;
    }
    for (t, c) in trow.iter().zip(crow.iter()) {
      if (t - c).abs() > tolerance {
        return false;
      }
    }
  }
  true
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Vec2;

  fn numeric(value: f64, tolerance: f64) -> Expected {
    Expected::Numeric { value, tolerance }
  }

  #[test]
  fn reveal_is_never_correct() {
    let expected = numeric(10.0, 0.1);
    let right = Answer::Numeric { value: 10.0 };
    let verdict = validate(&expected, Some(&right), true);
    assert!(!verdict.ok);
    assert!(!verdict.mismatch);
    // Ground truth still comes back for display.
    assert!(matches!(verdict.expected, Expected::Numeric { value, .. } if value == 10.0));
  }

  #[test]
  fn missing_answer_is_wrong_not_mismatch() {
    let verdict = validate(&numeric(1.0, 0.1), None, false);
    assert!(!verdict.ok && !verdict.mismatch);
  }

  #[test]
  fn kind_mismatch_is_flagged() {
    let answer = Answer::SingleChoice { option_id: "a".into() };
    let verdict = validate(&numeric(1.0, 0.1), Some(&answer), false);
    assert!(!verdict.ok);
    assert!(verdict.mismatch);
  }

  #[test]
  fn numeric_tolerance_is_inclusive() {
    let expected = numeric(10.0, 0.05);
    assert!(validate(&expected, Some(&Answer::Numeric { value: 10.05 }), false).ok);
    assert!(!validate(&expected, Some(&Answer::Numeric { value: 10.06 }), false).ok);
  }

  #[test]
  fn multi_choice_is_set_equality() {
    let expected = Expected::MultiChoice { option_ids: vec!["a".into(), "c".into()] };
    let same_reordered = Answer::MultiChoice { option_ids: vec!["c".into(), "a".into(), "a".into()] };
    assert!(validate(&expected, Some(&same_reordered), false).ok);
    let missing = Answer::MultiChoice { option_ids: vec!["a".into()] };
    assert!(!validate(&expected, Some(&missing), false).ok);
    let extra = Answer::MultiChoice { option_ids: vec!["a".into(), "b".into(), "c".into()] };
    assert!(!validate(&expected, Some(&extra), false).ok);
  }

  #[test]
  fn drag_target_uses_euclidean_distance() {
    let expected = Expected::VectorDragTarget {
      target: Vec2::new(3.0, 1.0),
      tolerance: 0.25,
      locked: false,
    };
    let close = Answer::VectorDragTarget { point: Vec2::new(3.1, 0.95) };
    assert!(validate(&expected, Some(&close), false).ok);
    let far = Answer::VectorDragTarget { point: Vec2::new(3.2, 1.2) };
    assert!(!validate(&expected, Some(&far), false).ok);
  }

  #[test]
  fn drag_dot_compares_the_dot_product() {
    let expected = Expected::VectorDragDot {
      target_dot: 6.0,
      fixed: Vec2::new(2.0, 1.0),
      tolerance: 0.5,
    };
    // (2, 2) . (2, 1) = 6
    assert!(validate(&expected, Some(&Answer::VectorDragDot { vector: Vec2::new(2.0, 2.0) }), false).ok);
    assert!(!validate(&expected, Some(&Answer::VectorDragDot { vector: Vec2::new(4.0, 2.0) }), false).ok);
  }

  #[test]
  fn matrix_input_is_all_or_nothing() {
    let expected = Expected::MatrixInput {
      target: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
      tolerance: 0.05,
    };
    let exact = Answer::MatrixInput { cells: vec![vec![1.0, 2.0], vec![3.0, 4.0]] };
    assert!(validate(&expected, Some(&exact), false).ok);
    let one_cell_off = Answer::MatrixInput { cells: vec![vec![1.0, 2.0], vec![3.0, 4.2]] };
    assert!(!validate(&expected, Some(&one_cell_off), false).ok);
    let wrong_shape = Answer::MatrixInput { cells: vec![vec![1.0, 2.0, 0.0], vec![3.0, 4.0, 0.0]] };
    assert!(!validate(&expected, Some(&wrong_shape), false).ok);
  }
}
