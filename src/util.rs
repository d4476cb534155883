//! Small utility helpers used across modules.

use crate::domain::Vec2;

/// Format a number for prompt text: integers without a decimal point,
/// everything else with trailing zeros trimmed.
pub fn fmt_num(v: f64) -> String {
  if v == v.trunc() && v.abs() < 1e12 {
    format!("{}", v as i64)
  } else {
    let s = format!("{v:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
  }
}

pub fn fmt_vec2(v: Vec2) -> String {
  format!("({}, {})", fmt_num(v.x), fmt_num(v.y))
}

pub fn fmt_vec3(v: [f64; 3]) -> String {
  format!("({}, {}, {})", fmt_num(v[0]), fmt_num(v[1]), fmt_num(v[2]))
}

/// Row-major matrix as bracketed rows, e.g. `[[1, 2], [3, 4]]`.
pub fn fmt_matrix(m: &[Vec<f64>]) -> String {
  let rows: Vec<String> = m
    .iter()
    .map(|r| {
      let cells: Vec<String> = r.iter().map(|v| fmt_num(*v)).collect();
      format!("[{}]", cells.join(", "))
    })
    .collect();
  format!("[{}]", rows.join(", "))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn numbers_render_compactly() {
    assert_eq!(fmt_num(3.0), "3");
    assert_eq!(fmt_num(-2.0), "-2");
    assert_eq!(fmt_num(0.5), "0.5");
    assert_eq!(fmt_num(1.25), "1.25");
  }

  #[test]
  fn matrix_rendering() {
    let m = vec![vec![1.0, 2.0], vec![3.0, -4.0]];
    assert_eq!(fmt_matrix(&m), "[[1, 2], [3, -4]]");
    assert_eq!(fmt_vec2(Vec2::new(2.0, -3.5)), "(2, -3.5)");
  }
}
