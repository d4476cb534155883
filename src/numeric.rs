//! Pure numeric/geometry helpers shared by the generators and the validator.
//!
//! Everything here is side-effect free. Tolerances and display rounding are
//! centralized so every topic applies the same difficulty policy.

use crate::domain::{Difficulty, ExerciseKind, Vec2};

/// Threshold for exact-zero classification (sign/orthogonality archetypes).
/// Deliberately much tighter than any grading tolerance so near-zero chains
/// never get mislabeled.
pub const ZERO_EPSILON: f64 = 1e-9;

pub fn dot2(a: Vec2, b: Vec2) -> f64 {
  a.x * b.x + a.y * b.y
}

pub fn dot3(a: [f64; 3], b: [f64; 3]) -> f64 {
  a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn magnitude2(v: Vec2) -> f64 {
  dot2(v, v).sqrt()
}

pub fn magnitude3(v: [f64; 3]) -> f64 {
  dot3(v, v).sqrt()
}

/// Round to `decimals` decimal places.
pub fn round_to(v: f64, decimals: u32) -> f64 {
  let f = 10f64.powi(decimals as i32);
  (v * f).round() / f
}

pub fn det2(m: [[f64; 2]; 2]) -> f64 {
  m[0][0] * m[1][1] - m[0][1] * m[1][0]
}

/// Inverse of a 2x2 matrix, `None` when singular (|det| below ZERO_EPSILON).
pub fn inverse2(m: [[f64; 2]; 2]) -> Option<[[f64; 2]; 2]> {
  let d = det2(m);
  if d.abs() < ZERO_EPSILON {
    return None;
  }
  Some([[m[1][1] / d, -m[0][1] / d], [-m[1][0] / d, m[0][0] / d]])
}

/// Row-major matrix product. Caller guarantees inner dimensions agree.
pub fn matmul(a: &[Vec<f64>], b: &[Vec<f64>]) -> Vec<Vec<f64>> {
  let m = a.len();
  let n = b.len();
  let k = if n > 0 { b[0].len() } else { 0 };
  let mut out = vec![vec![0.0; k]; m];
  for (i, row) in a.iter().enumerate() {
    for j in 0..k {
      let mut acc = 0.0;
      for (t, v) in row.iter().enumerate().take(n) {
        acc += v * b[t][j];
      }
      out[i][j] = acc;
    }
  }
  out
}

pub fn transpose(a: &[Vec<f64>]) -> Vec<Vec<f64>> {
  if a.is_empty() {
    return Vec::new();
  }
  let rows = a.len();
  let cols = a[0].len();
  let mut out = vec![vec![0.0; rows]; cols];
  for (i, row) in a.iter().enumerate() {
    for (j, v) in row.iter().enumerate().take(cols) {
      out[j][i] = *v;
    }
  }
  out
}

/// Decimal places kept when displaying/recording a numeric ground truth.
/// Easier difficulties round more aggressively.
pub fn decimals_for(difficulty: Difficulty) -> u32 {
  match difficulty {
    Difficulty::Easy => 1,
    Difficulty::Medium => 2,
    Difficulty::Hard => 3,
  }
}

/// Grading tolerance per (difficulty, kind). Total over every pair the
/// generators use, and non-increasing as difficulty rises.
pub fn tolerance_for(difficulty: Difficulty, kind: ExerciseKind) -> f64 {
  match kind {
    // Choice kinds grade by id equality; tolerance is unused but defined.
    ExerciseKind::SingleChoice | ExerciseKind::MultiChoice => 0.0,
    ExerciseKind::Numeric => match difficulty {
      Difficulty::Easy => 0.1,
      Difficulty::Medium => 0.05,
      Difficulty::Hard => 0.01,
    },
    ExerciseKind::VectorDragTarget => match difficulty {
      Difficulty::Easy => 0.5,
      Difficulty::Medium => 0.35,
      Difficulty::Hard => 0.25,
    },
    ExerciseKind::VectorDragDot => match difficulty {
      Difficulty::Easy => 1.0,
      Difficulty::Medium => 0.5,
      Difficulty::Hard => 0.25,
    },
    ExerciseKind::MatrixInput => match difficulty {
      Difficulty::Easy => 0.1,
      Difficulty::Medium => 0.05,
      Difficulty::Hard => 0.01,
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const KINDS: [ExerciseKind; 6] = [
    ExerciseKind::Numeric,
    ExerciseKind::SingleChoice,
    ExerciseKind::MultiChoice,
    ExerciseKind::VectorDragTarget,
    ExerciseKind::VectorDragDot,
    ExerciseKind::MatrixInput,
  ];

  #[test]
  fn tolerance_is_monotone_in_difficulty() {
    for kind in KINDS {
      let easy = tolerance_for(Difficulty::Easy, kind);
      let medium = tolerance_for(Difficulty::Medium, kind);
      let hard = tolerance_for(Difficulty::Hard, kind);
      assert!(hard <= medium && medium <= easy, "non-monotone for {kind:?}");
    }
  }

  #[test]
  fn dot_and_magnitude() {
    let a = Vec2::new(2.0, 3.0);
    let b = Vec2::new(-1.0, 4.0);
    assert_eq!(dot2(a, b), 10.0);
    assert_eq!(magnitude2(Vec2::new(3.0, 4.0)), 5.0);
    assert_eq!(dot3([1.0, 2.0, 3.0], [4.0, -5.0, 6.0]), 12.0);
  }

  #[test]
  fn det_and_inverse_2x2() {
    let m = [[1.0, 2.0], [3.0, 4.0]];
    assert_eq!(det2(m), -2.0);
    let inv = inverse2(m).expect("invertible");
    let prod = matmul(
      &[m[0].to_vec(), m[1].to_vec()],
      &[inv[0].to_vec(), inv[1].to_vec()],
    );
    assert!((prod[0][0] - 1.0).abs() < 1e-12);
    assert!(prod[0][1].abs() < 1e-12);
    assert!(prod[1][0].abs() < 1e-12);
    assert!((prod[1][1] - 1.0).abs() < 1e-12);
    assert!(inverse2([[2.0, 4.0], [1.0, 2.0]]).is_none());
  }

  #[test]
  fn matmul_shapes_and_cells() {
    let a = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
    let b = vec![vec![7.0, 8.0], vec![9.0, 10.0], vec![11.0, 12.0]];
    let c = matmul(&a, &b);
    assert_eq!(c.len(), 2);
    assert_eq!(c[0].len(), 2);
    assert_eq!(c[0][0], 58.0);
    assert_eq!(c[1][1], 154.0);
  }

  #[test]
  fn transpose_swaps_dimensions() {
    let a = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
    let t = transpose(&a);
    assert_eq!(t.len(), 3);
    assert_eq!(t[0].len(), 2);
    assert_eq!(t[2][0], 3.0);
    assert_eq!(t[0][1], 4.0);
  }

  #[test]
  fn rounding() {
    assert_eq!(round_to(1.2345, 2), 1.23);
    assert_eq!(round_to(-0.046, 1), -0.0);
    assert_eq!(round_to(2.5, 0), 3.0);
  }
}
