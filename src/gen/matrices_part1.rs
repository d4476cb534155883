//! Shared introductory matrices generator. One generator key serves eight
//! public topic slugs; the sub-topic is a closed enum rather than a free
//! string so dispatch can never fall through to the wrong material.

use crate::domain::{Difficulty, ExerciseBody, ExerciseKind, Expected, GenOut};
use crate::gen::{build_exercise, int_matrix, single_choice_options, GenOpts};
use crate::numeric::{tolerance_for, transpose};
use crate::rng::Rng;
use crate::util::{fmt_matrix, fmt_num};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Part1Variant {
  Shape,
  Entry,
  Addition,
  Scalar,
  Equality,
  Transpose,
  RowCol,
  ZeroIdentity,
}

impl Part1Variant {
  pub const ALL: [Part1Variant; 8] = [
    Part1Variant::Shape,
    Part1Variant::Entry,
    Part1Variant::Addition,
    Part1Variant::Scalar,
    Part1Variant::Equality,
    Part1Variant::Transpose,
    Part1Variant::RowCol,
    Part1Variant::ZeroIdentity,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Part1Variant::Shape => "shape",
      Part1Variant::Entry => "entry",
      Part1Variant::Addition => "addition",
      Part1Variant::Scalar => "scalar",
      Part1Variant::Equality => "equality",
      Part1Variant::Transpose => "transpose",
      Part1Variant::RowCol => "row_col",
      Part1Variant::ZeroIdentity => "zero_identity",
    }
  }

  pub fn parse(s: &str) -> Option<Part1Variant> {
    Part1Variant::ALL.iter().copied().find(|v| v.as_str() == s)
  }
}

const TITLE: &str = "Matrices I";

fn entry_range(difficulty: Difficulty) -> i64 {
  match difficulty {
    Difficulty::Easy => 4,
    Difficulty::Medium => 6,
    Difficulty::Hard => 9,
  }
}

fn dims(rng: &mut Rng, difficulty: Difficulty) -> (usize, usize) {
  let cap = match difficulty {
    Difficulty::Easy => 2,
    Difficulty::Medium => 3,
    Difficulty::Hard => 3,
  };
  (rng.int(2, cap) as usize, rng.int(2, 3) as usize)
}

pub fn generate(rng: &mut Rng, difficulty: Difficulty, id: String, opts: &GenOpts) -> GenOut {
  let variant = opts
    .variant
    .unwrap_or_else(|| *rng.pick(&Part1Variant::ALL));
  match variant {
    Part1Variant::Shape => shape(rng, difficulty, id),
    Part1Variant::Entry => entry(rng, difficulty, id),
    Part1Variant::Addition => addition(rng, difficulty, id),
    Part1Variant::Scalar => scalar(rng, difficulty, id),
    Part1Variant::Equality => equality(rng, difficulty, id),
    Part1Variant::Transpose => transpose_intro(rng, difficulty, id),
    Part1Variant::RowCol => row_col(rng, difficulty, id),
    Part1Variant::ZeroIdentity => zero_identity(rng, difficulty, id),
  }
}

fn shape(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let (r, c) = dims(rng, difficulty);
  let a = int_matrix(rng, r, c, entry_range(difficulty));

  let correct = format!("{r} × {c}");
  let distractors = vec![
    format!("{c} × {r}"),
    format!("{r} × {r}"),
    format!("{} × 1", r * c),
  ];
  let (options, correct_id) = single_choice_options(rng, correct, distractors);

  let prompt = format!("What is the shape (rows × columns) of A = {}?", fmt_matrix(&a));
  GenOut {
    exercise: build_exercise(id, difficulty, TITLE, prompt, ExerciseBody::SingleChoice { options }),
    expected: Expected::SingleChoice { option_id: correct_id },
    archetype: "part1_shape",
  }
}

fn entry(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let (r, c) = dims(rng, difficulty);
  let a = int_matrix(rng, r, c, entry_range(difficulty));
  let i = rng.int(0, r as i64 - 1) as usize;
  let j = rng.int(0, c as i64 - 1) as usize;

  let prompt = format!("Let A = {}. What is the entry a_{}{} (row {}, column {})?", fmt_matrix(&a), i + 1, j + 1, i + 1, j + 1);
  GenOut {
    exercise: build_exercise(id, difficulty, TITLE, prompt, ExerciseBody::Numeric {}),
    expected: Expected::Numeric {
      value: a[i][j],
      tolerance: tolerance_for(difficulty, ExerciseKind::Numeric),
    },
    archetype: "part1_entry",
  }
}

fn addition(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let (r, c) = dims(rng, difficulty);
  let range = entry_range(difficulty);
  let a = int_matrix(rng, r, c, range);
  let b = int_matrix(rng, r, c, range);
  let target: Vec<Vec<f64>> = (0..r)
    .map(|i| (0..c).map(|j| a[i][j] + b[i][j]).collect())
    .collect();

  let prompt = format!("Compute A + B for A = {} and B = {}.", fmt_matrix(&a), fmt_matrix(&b));
  GenOut {
    exercise: build_exercise(id, difficulty, TITLE, prompt, ExerciseBody::MatrixInput { rows: r, cols: c }),
    expected: Expected::MatrixInput {
      target,
      tolerance: tolerance_for(difficulty, ExerciseKind::MatrixInput),
    },
    archetype: "part1_addition",
  }
}

fn scalar(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let (r, c) = dims(rng, difficulty);
  let a = int_matrix(rng, r, c, entry_range(difficulty));
  let k = crate::gen::retry_draw(
    rng,
    |rng| {
      let k = rng.int(-3, 3);
      if k != 0 && k != 1 { Some(k) } else { None }
    },
    || 2,
  );
  let target: Vec<Vec<f64>> = a.iter().map(|row| row.iter().map(|v| k as f64 * v).collect()).collect();

  let prompt = format!("Compute {}A for A = {}.", fmt_num(k as f64), fmt_matrix(&a));
  GenOut {
    exercise: build_exercise(id, difficulty, TITLE, prompt, ExerciseBody::MatrixInput { rows: r, cols: c }),
    expected: Expected::MatrixInput {
      target,
      tolerance: tolerance_for(difficulty, ExerciseKind::MatrixInput),
    },
    archetype: "part1_scalar",
  }
}

fn equality(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let (r, c) = dims(rng, difficulty);
  let a = int_matrix(rng, r, c, entry_range(difficulty));
  let mut b = a.clone();
  let equal = rng.float() < 0.5;
  if !equal {
    let i = rng.int(0, r as i64 - 1) as usize;
    let j = rng.int(0, c as i64 - 1) as usize;
    b[i][j] += rng.int(1, 3) as f64;
  }

  let correct = if equal { "yes" } else { "no" };
  let other = if equal { "no" } else { "yes" };
  let (options, correct_id) = single_choice_options(rng, correct.to_string(), vec![other.to_string()]);

  let prompt = format!("Are the matrices A = {} and B = {} equal?", fmt_matrix(&a), fmt_matrix(&b));
  GenOut {
    exercise: build_exercise(id, difficulty, TITLE, prompt, ExerciseBody::SingleChoice { options }),
    expected: Expected::SingleChoice { option_id: correct_id },
    archetype: "part1_equality",
  }
}

fn transpose_intro(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let (r, c) = dims(rng, difficulty);
  let a = int_matrix(rng, r, c, entry_range(difficulty));
  let target = transpose(&a);

  let prompt = format!("Enter the transpose of A = {}.", fmt_matrix(&a));
  GenOut {
    exercise: build_exercise(id, difficulty, TITLE, prompt, ExerciseBody::MatrixInput { rows: c, cols: r }),
    expected: Expected::MatrixInput {
      target,
      tolerance: tolerance_for(difficulty, ExerciseKind::MatrixInput),
    },
    archetype: "part1_transpose",
  }
}

fn row_col(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let n = 3;
  let a = int_matrix(rng, n, n, entry_range(difficulty));
  let i = rng.int(0, n as i64 - 1) as usize;

  let fmt_seq = |vals: Vec<f64>| {
    let parts: Vec<String> = vals.iter().map(|v| fmt_num(*v)).collect();
    format!("({})", parts.join(", "))
  };
  let row: Vec<f64> = a[i].clone();
  let col: Vec<f64> = (0..n).map(|k| a[k][i]).collect();
  let other_row: Vec<f64> = a[(i + 1) % n].clone();
  let reversed: Vec<f64> = row.iter().rev().copied().collect();

  let correct = fmt_seq(row);
  let distractors = vec![fmt_seq(col), fmt_seq(other_row), fmt_seq(reversed)];
  let (options, correct_id) = single_choice_options(rng, correct, distractors);

  let prompt = format!("Which of these is row {} of A = {}?", i + 1, fmt_matrix(&a));
  GenOut {
    exercise: build_exercise(id, difficulty, TITLE, prompt, ExerciseBody::SingleChoice { options }),
    expected: Expected::SingleChoice { option_id: correct_id },
    archetype: "part1_row_col",
  }
}

fn zero_identity(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let n = rng.int(2, 3) as usize;
  let form = *rng.pick(&["identity", "zero", "diagonal", "general"]);
  let a: Vec<Vec<f64>> = match form {
    "identity" => (0..n).map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect()).collect(),
    "zero" => vec![vec![0.0; n]; n],
    "diagonal" => (0..n)
      .map(|i| (0..n).map(|j| if i == j { rng.int(2, 5) as f64 } else { 0.0 }).collect())
      .collect(),
    _ => {
      // Ensure an off-diagonal entry is set so "general" never collapses
      // into one of the named forms.
      let mut m = int_matrix(rng, n, n, entry_range(difficulty));
      m[0][1] = rng.int(1, 4) as f64;
      m
    }
  };

  let correct = match form {
    "identity" => "the identity matrix",
    "zero" => "the zero matrix",
    "diagonal" => "a diagonal matrix (not the identity)",
    _ => "none of these",
  };
  let distractors: Vec<String> = [
    "the identity matrix",
    "the zero matrix",
    "a diagonal matrix (not the identity)",
    "none of these",
  ]
  .iter()
  .filter(|l| **l != correct)
  .map(|l| l.to_string())
  .collect();
  let (options, correct_id) = single_choice_options(rng, correct.to_string(), distractors);

  let prompt = format!("Classify the matrix A = {}.", fmt_matrix(&a));
  GenOut {
    exercise: build_exercise(id, difficulty, TITLE, prompt, ExerciseBody::SingleChoice { options }),
    expected: Expected::SingleChoice { option_id: correct_id },
    archetype: "part1_zero_identity",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn variant_round_trips_through_parse() {
    for v in Part1Variant::ALL {
      assert_eq!(Part1Variant::parse(v.as_str()), Some(v));
    }
    assert_eq!(Part1Variant::parse("nope"), None);
  }

  #[test]
  fn requested_variant_controls_the_archetype() {
    let mut rng = Rng::from_seed(91);
    let opts = GenOpts { variant: Some(Part1Variant::Addition), avoid_archetype: None };
    for _ in 0..20 {
      let out = generate(&mut rng, Difficulty::Easy, "p1-test".into(), &opts);
      assert_eq!(out.archetype, "part1_addition");
    }
  }

  #[test]
  fn addition_target_matches_cellwise_sum() {
    let mut rng = Rng::from_seed(97);
    let out = addition(&mut rng, Difficulty::Medium, "p1-test".into());
    match (&out.exercise.body, &out.expected) {
      (ExerciseBody::MatrixInput { rows, cols }, Expected::MatrixInput { target, .. }) => {
        assert_eq!(target.len(), *rows);
        assert!(target.iter().all(|r| r.len() == *cols));
      }
      other => panic!("wrong shapes: {other:?}"),
    }
  }
}
