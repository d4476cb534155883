//! Projection topic: scalar component, projection length, and a drag
//! archetype where the student places the projection vector itself.

use crate::domain::{Difficulty, ExerciseBody, ExerciseKind, Expected, GenOut, Vec2};
use crate::gen::{
  build_exercise, component_range, grid_extent, int_vec2, nonzero_vec2, pick_archetype, retry_draw,
  GenOpts,
};
use crate::numeric::{decimals_for, dot2, magnitude2, round_to, tolerance_for};
use crate::rng::Rng;
use crate::util::fmt_vec2;

const TITLE: &str = "Projections";

pub fn generate(rng: &mut Rng, difficulty: Difficulty, id: String, opts: &GenOpts) -> GenOut {
  let weights: &[(&'static str, f64)] = match difficulty {
    Difficulty::Easy => &[("proj_scalar", 2.5), ("proj_length", 1.5), ("proj_vector_drag", 2.0)],
    Difficulty::Medium => &[("proj_scalar", 2.0), ("proj_length", 2.0), ("proj_vector_drag", 2.5)],
    Difficulty::Hard => &[("proj_scalar", 2.0), ("proj_length", 2.5), ("proj_vector_drag", 3.0)],
  };
  match pick_archetype(rng, weights, opts.avoid_archetype.as_deref()) {
    "proj_scalar" => proj_scalar(rng, difficulty, id),
    "proj_length" => proj_length(rng, difficulty, id),
    _ => proj_vector_drag(rng, difficulty, id),
  }
}

fn proj_scalar(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let range = component_range(difficulty);
  let a = int_vec2(rng, range);
  let b = nonzero_vec2(rng, range);
  let value = round_to(dot2(a, b) / magnitude2(b), decimals_for(difficulty));

  let prompt = format!(
    "Compute the scalar component of a = {} along b = {} (that is, comp_b a = a · b / |b|).",
    fmt_vec2(a),
    fmt_vec2(b)
  );
  GenOut {
    exercise: build_exercise(id, difficulty, TITLE, prompt, ExerciseBody::Numeric {}),
    expected: Expected::Numeric { value, tolerance: tolerance_for(difficulty, ExerciseKind::Numeric) },
    archetype: "proj_scalar",
  }
}

fn proj_length(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let range = component_range(difficulty);
  let a = int_vec2(rng, range);
  let b = nonzero_vec2(rng, range);
  let value = round_to(dot2(a, b).abs() / magnitude2(b), decimals_for(difficulty));

  let prompt = format!(
    "What is the length of the projection of a = {} onto b = {}?",
    fmt_vec2(a),
    fmt_vec2(b)
  );
  GenOut {
    exercise: build_exercise(id, difficulty, TITLE, prompt, ExerciseBody::Numeric {}),
    expected: Expected::Numeric { value, tolerance: tolerance_for(difficulty, ExerciseKind::Numeric) },
    archetype: "proj_length",
  }
}

fn proj_vector_drag(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let extent = grid_extent(difficulty);
  // Keep both vectors and the projection inside the visible grid. The
  // projection of a onto b is no longer than a, so bounding a suffices.
  let bound = extent.min(component_range(difficulty));
  let (a, b, target) = retry_draw(
    rng,
    |rng| {
      let a = nonzero_vec2(rng, bound);
      let b = nonzero_vec2(rng, bound);
      // Degenerate when a is (near) perpendicular to b: the projection
      // collapses to the origin and the drag has nothing to teach.
      if dot2(a, b).abs() < 1.0 {
        return None;
      }
      let scale = dot2(a, b) / dot2(b, b);
      let target = Vec2::new(round_to(scale * b.x, 2), round_to(scale * b.y, 2));
      // The target must stay on the visible grid.
      if target.x.abs() > extent as f64 || target.y.abs() > extent as f64 {
        return None;
      }
      Some((a, b, target))
    },
    || (Vec2::new(3.0, 1.0), Vec2::new(2.0, 0.0), Vec2::new(3.0, 0.0)),
  );

  let prompt = format!(
    "Drag the tip of the projection of a = {} onto b = {}. The vector b is locked.",
    fmt_vec2(a),
    fmt_vec2(b)
  );
  GenOut {
    exercise: build_exercise(
      id,
      difficulty,
      TITLE,
      prompt,
      ExerciseBody::VectorDragTarget { start: a, locked: Some(b), grid_extent: extent },
    ),
    expected: Expected::VectorDragTarget {
      target,
      tolerance: tolerance_for(difficulty, ExerciseKind::VectorDragTarget),
      locked: true,
    },
    archetype: "proj_vector_drag",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn drag_target_stays_on_the_grid() {
    let mut rng = Rng::from_seed(2024);
    for _ in 0..100 {
      let out = proj_vector_drag(&mut rng, Difficulty::Easy, "proj-test".into());
      let (target, extent) = match (&out.expected, &out.exercise.body) {
        (
          Expected::VectorDragTarget { target, locked, .. },
          ExerciseBody::VectorDragTarget { grid_extent, .. },
        ) => {
          assert!(*locked);
          (*target, *grid_extent as f64)
        }
        other => panic!("wrong shapes: {other:?}"),
      };
      assert!(target.x.abs() <= extent && target.y.abs() <= extent);
    }
  }

  #[test]
  fn scalar_component_matches_formula() {
    let a = Vec2::new(2.0, 3.0);
    let b = Vec2::new(4.0, 0.0);
    assert_eq!(round_to(dot2(a, b) / magnitude2(b), 2), 2.0);
  }
}
