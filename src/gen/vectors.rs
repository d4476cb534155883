//! Vector fundamentals, split across two public topics:
//! part 1 covers magnitude, components, and drag-based addition/scaling;
//! part 2 covers unit vectors, linear combinations, 3D magnitude, and the
//! dot-target drag archetype.

use crate::domain::{Difficulty, ExerciseBody, ExerciseKind, Expected, GenOut, Vec2};
use crate::gen::{
  build_exercise, component_range, grid_extent, int_vec2, nonzero_vec2, pick_archetype, retry_draw,
  single_choice_options, GenOpts,
};
use crate::numeric::{decimals_for, dot2, magnitude2, magnitude3, round_to, tolerance_for};
use crate::rng::Rng;
use crate::util::{fmt_num, fmt_vec2, fmt_vec3};

const TITLE_PART1: &str = "Vectors I";
const TITLE_PART2: &str = "Vectors II";

pub fn generate_part1(rng: &mut Rng, difficulty: Difficulty, id: String, opts: &GenOpts) -> GenOut {
  let weights: &[(&'static str, f64)] = match difficulty {
    Difficulty::Easy => &[("magnitude", 2.5), ("component_read", 2.0), ("vector_add", 2.0), ("scalar_multiple", 1.5)],
    Difficulty::Medium => &[("magnitude", 2.0), ("component_read", 1.0), ("vector_add", 2.5), ("scalar_multiple", 2.5)],
    Difficulty::Hard => &[("magnitude", 2.0), ("component_read", 0.5), ("vector_add", 2.5), ("scalar_multiple", 3.0)],
  };
  match pick_archetype(rng, weights, opts.avoid_archetype.as_deref()) {
    "magnitude" => magnitude(rng, difficulty, id),
    "component_read" => component_read(rng, difficulty, id),
    "vector_add" => vector_add(rng, difficulty, id),
    _ => scalar_multiple(rng, difficulty, id),
  }
}

pub fn generate_part2(rng: &mut Rng, difficulty: Difficulty, id: String, opts: &GenOpts) -> GenOut {
  let weights: &[(&'static str, f64)] = match difficulty {
    Difficulty::Easy => &[("unit_vector", 2.5), ("dot_drag", 2.0), ("lin_combination", 2.0), ("magnitude3", 0.5)],
    Difficulty::Medium => &[("unit_vector", 2.0), ("dot_drag", 2.5), ("lin_combination", 2.5), ("magnitude3", 1.5)],
    Difficulty::Hard => &[("unit_vector", 1.5), ("dot_drag", 3.0), ("lin_combination", 2.5), ("magnitude3", 2.5)],
  };
  match pick_archetype(rng, weights, opts.avoid_archetype.as_deref()) {
    "unit_vector" => unit_vector(rng, difficulty, id),
    "dot_drag" => dot_drag(rng, difficulty, id),
    "magnitude3" => magnitude_3d(rng, difficulty, id),
    _ => lin_combination(rng, difficulty, id),
  }
}

// ---- part 1 ----

fn magnitude(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let v = nonzero_vec2(rng, component_range(difficulty));
  let value = round_to(magnitude2(v), decimals_for(difficulty));
  let prompt = format!("Find the magnitude |v| of v = {}.", fmt_vec2(v));
  GenOut {
    exercise: build_exercise(id, difficulty, TITLE_PART1, prompt, ExerciseBody::Numeric {}),
    expected: Expected::Numeric { value, tolerance: tolerance_for(difficulty, ExerciseKind::Numeric) },
    archetype: "magnitude",
  }
}

fn component_read(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let v = int_vec2(rng, component_range(difficulty));
  let (axis, value) = if rng.float() < 0.5 { ("x", v.x) } else { ("y", v.y) };
  let prompt = format!("What is the {axis}-component of v = {}?", fmt_vec2(v));
  GenOut {
    exercise: build_exercise(id, difficulty, TITLE_PART1, prompt, ExerciseBody::Numeric {}),
    expected: Expected::Numeric { value, tolerance: tolerance_for(difficulty, ExerciseKind::Numeric) },
    archetype: "component_read",
  }
}

fn vector_add(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let extent = grid_extent(difficulty);
  // Halved range keeps a + b inside the grid without a retry loop.
  let half = (extent / 2).max(1);
  let a = nonzero_vec2(rng, half);
  let b = nonzero_vec2(rng, half);
  let target = Vec2::new(a.x + b.x, a.y + b.y);

  let prompt = format!("Drag the resultant of a + b for a = {} and b = {}.", fmt_vec2(a), fmt_vec2(b));
  GenOut {
    exercise: build_exercise(
      id,
      difficulty,
      TITLE_PART1,
      prompt,
      ExerciseBody::VectorDragTarget { start: a, locked: Some(b), grid_extent: extent },
    ),
    expected: Expected::VectorDragTarget {
      target,
      tolerance: tolerance_for(difficulty, ExerciseKind::VectorDragTarget),
      locked: true,
    },
    archetype: "vector_add",
  }
}

fn scalar_multiple(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let extent = grid_extent(difficulty);
  let (k, v) = retry_draw(
    rng,
    |rng| {
      let k = rng.int(-3, 3);
      let v = nonzero_vec2(rng, 2);
      if k == 0 || k == 1 {
        return None;
      }
      let target = Vec2::new(k as f64 * v.x, k as f64 * v.y);
      if target.x.abs() > extent as f64 || target.y.abs() > extent as f64 {
        return None;
      }
      Some((k, v))
    },
    || (2, Vec2::new(1.0, 2.0)),
  );
  let target = Vec2::new(k as f64 * v.x, k as f64 * v.y);

  let prompt = format!("Drag the vector {}v for v = {}.", fmt_num(k as f64), fmt_vec2(v));
  GenOut {
    exercise: build_exercise(
      id,
      difficulty,
      TITLE_PART1,
      prompt,
      ExerciseBody::VectorDragTarget { start: v, locked: None, grid_extent: extent },
    ),
    expected: Expected::VectorDragTarget {
      target,
      tolerance: tolerance_for(difficulty, ExerciseKind::VectorDragTarget),
      locked: false,
    },
    archetype: "scalar_multiple",
  }
}

// ---- part 2 ----

fn unit_vector(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let v = nonzero_vec2(rng, component_range(difficulty));
  let m = magnitude2(v);
  let u = Vec2::new(round_to(v.x / m, 3), round_to(v.y / m, 3));

  let distractors = vec![
    fmt_vec2(v),
    fmt_vec2(Vec2::new(-u.x, -u.y)),
    fmt_vec2(Vec2::new(u.y, u.x)),
  ];
  let (options, correct_id) = single_choice_options(rng, fmt_vec2(u), distractors);

  let prompt = format!("Which of these is the unit vector in the direction of v = {}?", fmt_vec2(v));
  GenOut {
    exercise: build_exercise(id, difficulty, TITLE_PART2, prompt, ExerciseBody::SingleChoice { options }),
    expected: Expected::SingleChoice { option_id: correct_id },
    archetype: "unit_vector",
  }
}

fn dot_drag(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let extent = grid_extent(difficulty);
  let b = nonzero_vec2(rng, (extent / 2).max(2));
  // Pick a lattice point inside the grid as the hidden solution so the
  // target dot value is always reachable by dragging.
  let hidden = int_vec2(rng, extent);
  let target_dot = dot2(hidden, b);
  let start = int_vec2(rng, extent / 2);

  let prompt = format!(
    "Drag the vector a so that a · b = {} with b = {} held fixed.",
    fmt_num(target_dot),
    fmt_vec2(b)
  );
  GenOut {
    exercise: build_exercise(
      id,
      difficulty,
      TITLE_PART2,
      prompt,
      ExerciseBody::VectorDragDot { fixed: b, start, grid_extent: extent },
    ),
    expected: Expected::VectorDragDot {
      target_dot,
      fixed: b,
      tolerance: tolerance_for(difficulty, ExerciseKind::VectorDragDot),
    },
    archetype: "dot_drag",
  }
}

fn magnitude_3d(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let range = component_range(difficulty);
  let v = retry_draw(
    rng,
    |rng| {
      let v = [rng.int(-range, range) as f64, rng.int(-range, range) as f64, rng.int(-range, range) as f64];
      if v[0] != 0.0 || v[1] != 0.0 || v[2] != 0.0 { Some(v) } else { None }
    },
    || [1.0, 2.0, 2.0],
  );
  let value = round_to(magnitude3(v), decimals_for(difficulty));
  let prompt = format!("Find the magnitude |v| of v = {}.", fmt_vec3(v));
  GenOut {
    exercise: build_exercise(id, difficulty, TITLE_PART2, prompt, ExerciseBody::Numeric {}),
    expected: Expected::Numeric { value, tolerance: tolerance_for(difficulty, ExerciseKind::Numeric) },
    archetype: "magnitude3",
  }
}

fn lin_combination(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let range = component_range(difficulty);
  let a = int_vec2(rng, range);
  let b = int_vec2(rng, range);
  let s = rng.int(-3, 3).max(1);
  let t = rng.int(-3, -1);
  let c = Vec2::new(s as f64 * a.x + t as f64 * b.x, s as f64 * a.y + t as f64 * b.y);
  let (axis, value) = if rng.float() < 0.5 { ("x", c.x) } else { ("y", c.y) };

  let prompt = format!(
    "Let c = {}a + {}b with a = {} and b = {}. What is the {axis}-component of c?",
    fmt_num(s as f64),
    fmt_num(t as f64),
    fmt_vec2(a),
    fmt_vec2(b)
  );
  GenOut {
    exercise: build_exercise(id, difficulty, TITLE_PART2, prompt, ExerciseBody::Numeric {}),
    expected: Expected::Numeric { value, tolerance: tolerance_for(difficulty, ExerciseKind::Numeric) },
    archetype: "lin_combination",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn addition_target_stays_inside_grid() {
    let mut rng = Rng::from_seed(31);
    for _ in 0..100 {
      let out = vector_add(&mut rng, Difficulty::Easy, "vec-test".into());
      match (&out.expected, &out.exercise.body) {
        (
          Expected::VectorDragTarget { target, .. },
          ExerciseBody::VectorDragTarget { grid_extent, .. },
        ) => {
          let e = *grid_extent as f64;
          assert!(target.x.abs() <= e && target.y.abs() <= e);
        }
        other => panic!("wrong shapes: {other:?}"),
      }
    }
  }

  #[test]
  fn dot_drag_target_is_reachable_on_the_lattice() {
    let mut rng = Rng::from_seed(37);
    for _ in 0..100 {
      let out = dot_drag(&mut rng, Difficulty::Medium, "vec-test".into());
      match out.expected {
        Expected::VectorDragDot { target_dot, fixed, .. } => {
          assert!(fixed.x != 0.0 || fixed.y != 0.0);
          assert_eq!(target_dot, target_dot.trunc(), "lattice dot values are integers");
        }
        other => panic!("wrong expected: {other:?}"),
      }
    }
  }

  #[test]
  fn scalar_multiple_skips_degenerate_factors() {
    let mut rng = Rng::from_seed(41);
    for _ in 0..100 {
      let out = scalar_multiple(&mut rng, Difficulty::Hard, "vec-test".into());
      match (&out.expected, &out.exercise.body) {
        (
          Expected::VectorDragTarget { target, .. },
          ExerciseBody::VectorDragTarget { start, .. },
        ) => {
          // k is never 0 or 1, so the target differs from the start.
          assert!(target.x != start.x || target.y != start.y);
        }
        other => panic!("wrong shapes: {other:?}"),
      }
    }
  }
}
