//! Matrix topics: products/transposes/entry arithmetic, 2x2 inverses and
//! determinants, and property classification.

use crate::domain::{Difficulty, ExerciseBody, ExerciseKind, Expected, GenOut};
use crate::gen::{
  build_exercise, int_matrix, max_dim, multi_choice_options, pick_archetype, retry_draw,
  single_choice_options, GenOpts,
};
use crate::numeric::{det2, inverse2, matmul, tolerance_for, transpose, ZERO_EPSILON};
use crate::rng::Rng;
use crate::util::{fmt_matrix, fmt_num};

/// Entry range for drawn matrices; smaller than the vector ranges so full
/// products stay mentally computable.
fn entry_range(difficulty: Difficulty) -> i64 {
  match difficulty {
    Difficulty::Easy => 3,
    Difficulty::Medium => 5,
    Difficulty::Hard => 7,
  }
}

// ---- matrix_ops ----

pub fn generate_ops(rng: &mut Rng, difficulty: Difficulty, id: String, opts: &GenOpts) -> GenOut {
  let weights: &[(&'static str, f64)] = match difficulty {
    Difficulty::Easy => &[("sum_entry", 2.5), ("scalar_entry", 2.0), ("transpose_full", 2.0), ("matmul_full_matrix", 1.5)],
    Difficulty::Medium => &[("sum_entry", 1.5), ("scalar_entry", 1.5), ("transpose_full", 2.0), ("matmul_full_matrix", 3.0)],
    Difficulty::Hard => &[("sum_entry", 1.0), ("scalar_entry", 1.0), ("transpose_full", 2.0), ("matmul_full_matrix", 4.0)],
  };
  match pick_archetype(rng, weights, opts.avoid_archetype.as_deref()) {
    "sum_entry" => sum_entry(rng, difficulty, id),
    "scalar_entry" => scalar_entry(rng, difficulty, id),
    "transpose_full" => transpose_full(rng, difficulty, id),
    _ => matmul_full(rng, difficulty, id),
  }
}

fn matmul_full(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let cap = max_dim(difficulty) as i64;
  let m = rng.int(2, cap) as usize;
  let n = rng.int(2, cap) as usize;
  let k = rng.int(2, cap) as usize;
  let range = entry_range(difficulty);
  let a = int_matrix(rng, m, n, range);
  let b = int_matrix(rng, n, k, range);
  let target = matmul(&a, &b);

  let prompt = format!("Compute the product AB for A = {} and B = {}.", fmt_matrix(&a), fmt_matrix(&b));
  GenOut {
    exercise: build_exercise(id, difficulty, "Matrix Operations", prompt, ExerciseBody::MatrixInput { rows: m, cols: k }),
    expected: Expected::MatrixInput {
      target,
      tolerance: tolerance_for(difficulty, ExerciseKind::MatrixInput),
    },
    archetype: "matmul_full_matrix",
  }
}

fn transpose_full(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let cap = max_dim(difficulty) as i64;
  let r = rng.int(2, cap) as usize;
  let c = rng.int(2, cap) as usize;
  let a = int_matrix(rng, r, c, entry_range(difficulty));
  let target = transpose(&a);

  let prompt = format!("Enter the transpose of A = {}.", fmt_matrix(&a));
  GenOut {
    exercise: build_exercise(id, difficulty, "Matrix Operations", prompt, ExerciseBody::MatrixInput { rows: c, cols: r }),
    expected: Expected::MatrixInput {
      target,
      tolerance: tolerance_for(difficulty, ExerciseKind::MatrixInput),
    },
    archetype: "transpose_full",
  }
}

fn sum_entry(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let n = rng.int(2, 3) as usize;
  let range = entry_range(difficulty);
  let a = int_matrix(rng, n, n, range);
  let b = int_matrix(rng, n, n, range);
  let i = rng.int(0, n as i64 - 1) as usize;
  let j = rng.int(0, n as i64 - 1) as usize;
  let value = a[i][j] + b[i][j];

  let prompt = format!(
    "Let A = {} and B = {}. What is entry ({}, {}) of A + B?",
    fmt_matrix(&a),
    fmt_matrix(&b),
    i + 1,
    j + 1
  );
  GenOut {
    exercise: build_exercise(id, difficulty, "Matrix Operations", prompt, ExerciseBody::Numeric {}),
    expected: Expected::Numeric { value, tolerance: tolerance_for(difficulty, ExerciseKind::Numeric) },
    archetype: "sum_entry",
  }
}

fn scalar_entry(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let n = rng.int(2, 3) as usize;
  let a = int_matrix(rng, n, n, entry_range(difficulty));
  let k = retry_draw(
    rng,
    |rng| {
      let k = rng.int(-4, 4);
      if k != 0 && k != 1 { Some(k) } else { None }
    },
    || 3,
  );
  let i = rng.int(0, n as i64 - 1) as usize;
  let j = rng.int(0, n as i64 - 1) as usize;
  let value = k as f64 * a[i][j];

  let prompt = format!(
    "Let A = {}. What is entry ({}, {}) of {}A?",
    fmt_matrix(&a),
    i + 1,
    j + 1,
    fmt_num(k as f64)
  );
  GenOut {
    exercise: build_exercise(id, difficulty, "Matrix Operations", prompt, ExerciseBody::Numeric {}),
    expected: Expected::Numeric { value, tolerance: tolerance_for(difficulty, ExerciseKind::Numeric) },
    archetype: "scalar_entry",
  }
}

// ---- matrix_inverse ----

pub fn generate_inverse(rng: &mut Rng, difficulty: Difficulty, id: String, opts: &GenOpts) -> GenOut {
  let weights: &[(&'static str, f64)] = match difficulty {
    Difficulty::Easy => &[("invertible_yesno", 3.0), ("det_numeric", 2.5), ("inverse_entry", 1.0), ("inverse_full", 0.5)],
    Difficulty::Medium => &[("invertible_yesno", 2.0), ("det_numeric", 2.0), ("inverse_entry", 2.5), ("inverse_full", 2.0)],
    Difficulty::Hard => &[("invertible_yesno", 1.5), ("det_numeric", 1.5), ("inverse_entry", 2.5), ("inverse_full", 3.0)],
  };
  match pick_archetype(rng, weights, opts.avoid_archetype.as_deref()) {
    "invertible_yesno" => invertible_yesno(rng, difficulty, id),
    "det_numeric" => det_numeric(rng, difficulty, id),
    "inverse_entry" => inverse_entry(rng, difficulty, id),
    _ => inverse_full(rng, difficulty, id),
  }
}

fn invertible_yesno(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let range = entry_range(difficulty);
  // Half the time construct a singular matrix (row2 = k * row1).
  let a = if rng.float() < 0.5 {
    let row = retry_draw(
      rng,
      |rng| {
        let r = [rng.int(-range, range) as f64, rng.int(-range, range) as f64];
        if r[0] != 0.0 || r[1] != 0.0 { Some(r) } else { None }
      },
      || [1.0, 2.0],
    );
    let k = rng.int(2, 3) as f64;
    [row, [k * row[0], k * row[1]]]
  } else {
    retry_draw(
      rng,
      |rng| {
        let a = [
          [rng.int(-range, range) as f64, rng.int(-range, range) as f64],
          [rng.int(-range, range) as f64, rng.int(-range, range) as f64],
        ];
        if det2(a).abs() >= ZERO_EPSILON { Some(a) } else { None }
      },
      || [[1.0, 2.0], [3.0, 4.0]],
    )
  };

  let correct = if det2(a).abs() < ZERO_EPSILON { "no" } else { "yes" };
  let other = if correct == "yes" { "no" } else { "yes" };
  let (options, correct_id) = single_choice_options(rng, correct.to_string(), vec![other.to_string()]);

  let m = vec![a[0].to_vec(), a[1].to_vec()];
  let prompt = format!("Is the matrix A = {} invertible?", fmt_matrix(&m));
  GenOut {
    exercise: build_exercise(id, difficulty, "Matrix Inverses", prompt, ExerciseBody::SingleChoice { options }),
    expected: Expected::SingleChoice { option_id: correct_id },
    archetype: "invertible_yesno",
  }
}

fn det_numeric(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let range = entry_range(difficulty);
  let a = int_matrix(rng, 2, 2, range);
  let value = det2([[a[0][0], a[0][1]], [a[1][0], a[1][1]]]);

  let prompt = format!("Compute the determinant of A = {}.", fmt_matrix(&a));
  GenOut {
    exercise: build_exercise(id, difficulty, "Matrix Inverses", prompt, ExerciseBody::Numeric {}),
    expected: Expected::Numeric { value, tolerance: tolerance_for(difficulty, ExerciseKind::Numeric) },
    archetype: "det_numeric",
  }
}

/// Integer 2x2 with |det| in {1, 2}: inverse entries are integers or halves,
/// so answers stay clean.
fn small_det_matrix(rng: &mut Rng, range: i64) -> [[f64; 2]; 2] {
  retry_draw(
    rng,
    |rng| {
      let a = [
        [rng.int(-range, range) as f64, rng.int(-range, range) as f64],
        [rng.int(-range, range) as f64, rng.int(-range, range) as f64],
      ];
      let d = det2(a).abs();
      if d == 1.0 || d == 2.0 { Some(a) } else { None }
    },
    || [[1.0, 1.0], [1.0, 2.0]],
  )
}

fn inverse_entry(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let a = small_det_matrix(rng, entry_range(difficulty));
  let inv = inverse2(a).expect("|det| is 1 or 2");
  let i = rng.int(0, 1) as usize;
  let j = rng.int(0, 1) as usize;

  let m = vec![a[0].to_vec(), a[1].to_vec()];
  let prompt = format!(
    "Let A = {}. What is entry ({}, {}) of the inverse of A?",
    fmt_matrix(&m),
    i + 1,
    j + 1
  );
  GenOut {
    exercise: build_exercise(id, difficulty, "Matrix Inverses", prompt, ExerciseBody::Numeric {}),
    expected: Expected::Numeric {
      value: inv[i][j],
      tolerance: tolerance_for(difficulty, ExerciseKind::Numeric),
    },
    archetype: "inverse_entry",
  }
}

fn inverse_full(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let a = small_det_matrix(rng, entry_range(difficulty));
  let inv = inverse2(a).expect("|det| is 1 or 2");
  let target = vec![inv[0].to_vec(), inv[1].to_vec()];

  let m = vec![a[0].to_vec(), a[1].to_vec()];
  let prompt = format!("Enter the inverse of A = {}.", fmt_matrix(&m));
  GenOut {
    exercise: build_exercise(id, difficulty, "Matrix Inverses", prompt, ExerciseBody::MatrixInput { rows: 2, cols: 2 }),
    expected: Expected::MatrixInput {
      target,
      tolerance: tolerance_for(difficulty, ExerciseKind::MatrixInput),
    },
    archetype: "inverse_full",
  }
}

// ---- matrix_properties ----

pub fn generate_properties(rng: &mut Rng, difficulty: Difficulty, id: String, opts: &GenOpts) -> GenOut {
  let weights: &[(&'static str, f64)] = match difficulty {
    Difficulty::Easy => &[("properties_multi", 2.5), ("symmetric_check", 2.5)],
    Difficulty::Medium => &[("properties_multi", 3.0), ("symmetric_check", 2.0)],
    Difficulty::Hard => &[("properties_multi", 3.5), ("symmetric_check", 1.5)],
  };
  match pick_archetype(rng, weights, opts.avoid_archetype.as_deref()) {
    "symmetric_check" => symmetric_check(rng, difficulty, id),
    _ => properties_multi(rng, difficulty, id),
  }
}

fn properties_multi(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let n = rng.int(2, 3) as usize;
  let range = entry_range(difficulty);
  // Square by construction so "A is square" anchors at least one true option.
  let form = rng.weighted(&[("identity", 1.0), ("zero", 1.0), ("diagonal", 1.5), ("symmetric", 1.5), ("general", 2.0)]);
  let a: Vec<Vec<f64>> = match form {
    "identity" => (0..n).map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect()).collect(),
    "zero" => vec![vec![0.0; n]; n],
    "diagonal" => (0..n)
      .map(|i| {
        (0..n)
          .map(|j| if i == j { rng.int(2, range.max(2)) as f64 } else { 0.0 })
          .collect()
      })
      .collect(),
    "symmetric" => {
      let m = int_matrix(rng, n, n, range);
      let t = transpose(&m);
      (0..n).map(|i| (0..n).map(|j| m[i][j] + t[i][j]).collect()).collect()
    }
    _ => int_matrix(rng, n, n, range),
  };

  let is_zero = a.iter().all(|r| r.iter().all(|v| *v == 0.0));
  let is_identity = a
    .iter()
    .enumerate()
    .all(|(i, r)| r.iter().enumerate().all(|(j, v)| *v == if i == j { 1.0 } else { 0.0 }));
  let is_diagonal = a
    .iter()
    .enumerate()
    .all(|(i, r)| r.iter().enumerate().all(|(j, v)| i == j || *v == 0.0));
  let t = transpose(&a);
  let is_symmetric = a == t;

  let labels = vec![
    ("A is square".to_string(), true),
    ("A is symmetric".to_string(), is_symmetric),
    ("A is diagonal".to_string(), is_diagonal),
    ("A is the identity matrix".to_string(), is_identity),
    ("Every entry of A is zero".to_string(), is_zero),
  ];
  let (options, correct_ids) = multi_choice_options(rng, labels);

  let prompt = format!("Select every statement that is true for A = {}.", fmt_matrix(&a));
  GenOut {
    exercise: build_exercise(id, difficulty, "Matrix Properties", prompt, ExerciseBody::MultiChoice { options }),
    expected: Expected::MultiChoice { option_ids: correct_ids },
    archetype: "properties_multi",
  }
}

fn symmetric_check(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let n = rng.int(2, 3) as usize;
  let range = entry_range(difficulty);
  let a: Vec<Vec<f64>> = if rng.float() < 0.5 {
    // M + M^T is symmetric for any M.
    let m = int_matrix(rng, n, n, range);
    let t = transpose(&m);
    (0..n).map(|i| (0..n).map(|j| m[i][j] + t[i][j]).collect()).collect()
  } else {
    retry_draw(
      rng,
      |rng| {
        let m = int_matrix(rng, n, n, range);
        if m != transpose(&m) { Some(m) } else { None }
      },
      || vec![vec![1.0, 2.0], vec![3.0, 4.0]],
    )
  };

  let correct = if a == transpose(&a) { "yes" } else { "no" };
  let other = if correct == "yes" { "no" } else { "yes" };
  let (options, correct_id) = single_choice_options(rng, correct.to_string(), vec![other.to_string()]);

  let prompt = format!("Is the matrix A = {} symmetric?", fmt_matrix(&a));
  GenOut {
    exercise: build_exercise(id, difficulty, "Matrix Properties", prompt, ExerciseBody::SingleChoice { options }),
    expected: Expected::SingleChoice { option_id: correct_id },
    archetype: "symmetric_check",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn matmul_archetype_obeys_the_shape_law() {
    let mut rng = Rng::from_seed(71);
    for _ in 0..60 {
      let out = matmul_full(&mut rng, Difficulty::Hard, "ops-test".into());
      let (rows, cols, target) = match (&out.exercise.body, &out.expected) {
        (ExerciseBody::MatrixInput { rows, cols }, Expected::MatrixInput { target, .. }) => {
          (*rows, *cols, target)
        }
        other => panic!("wrong shapes: {other:?}"),
      };
      assert_eq!(target.len(), rows);
      assert!(target.iter().all(|r| r.len() == cols));
      assert!(rows <= 5 && cols <= 5);
    }
  }

  #[test]
  fn dimension_caps_follow_difficulty() {
    let mut rng = Rng::from_seed(73);
    for _ in 0..60 {
      let out = matmul_full(&mut rng, Difficulty::Easy, "ops-test".into());
      if let ExerciseBody::MatrixInput { rows, cols } = out.exercise.body {
        assert!(rows <= 3 && cols <= 3);
      }
    }
  }

  #[test]
  fn small_det_inverse_has_clean_entries() {
    let mut rng = Rng::from_seed(79);
    for _ in 0..60 {
      let a = small_det_matrix(&mut rng, 5);
      let inv = inverse2(a).expect("invertible");
      for row in inv {
        for v in row {
          let doubled = v * 2.0;
          assert_eq!(doubled, doubled.round(), "entry {v} is not a half-integer");
        }
      }
    }
  }

  #[test]
  fn properties_always_include_a_true_statement() {
    let mut rng = Rng::from_seed(83);
    for _ in 0..60 {
      let out = properties_multi(&mut rng, Difficulty::Medium, "prop-test".into());
      match &out.expected {
        Expected::MultiChoice { option_ids } => assert!(!option_ids.is_empty()),
        other => panic!("wrong expected: {other:?}"),
      }
    }
  }
}
