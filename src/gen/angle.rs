//! Angle topic: numeric angle between vectors, acute/right/obtuse
//! classification, and perpendicularity checks.

use crate::domain::{Difficulty, ExerciseBody, ExerciseKind, Expected, GenOut, Vec2};
use crate::gen::{build_exercise, component_range, nonzero_vec2, pick_archetype, single_choice_options, GenOpts};
use crate::numeric::{decimals_for, dot2, magnitude2, round_to, tolerance_for, ZERO_EPSILON};
use crate::rng::Rng;
use crate::util::fmt_vec2;

const TITLE: &str = "Angles Between Vectors";

pub fn generate(rng: &mut Rng, difficulty: Difficulty, id: String, opts: &GenOpts) -> GenOut {
  let weights: &[(&'static str, f64)] = match difficulty {
    Difficulty::Easy => &[("angle_classify", 3.0), ("perpendicular_check", 2.0), ("angle_numeric", 1.0)],
    Difficulty::Medium => &[("angle_classify", 2.0), ("perpendicular_check", 1.5), ("angle_numeric", 2.5)],
    Difficulty::Hard => &[("angle_classify", 1.5), ("perpendicular_check", 1.0), ("angle_numeric", 3.5)],
  };
  match pick_archetype(rng, weights, opts.avoid_archetype.as_deref()) {
    "angle_numeric" => angle_numeric(rng, difficulty, id),
    "perpendicular_check" => perpendicular_check(rng, difficulty, id),
    _ => angle_classify(rng, difficulty, id),
  }
}

fn angle_numeric(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let range = component_range(difficulty);
  let a = nonzero_vec2(rng, range);
  let b = nonzero_vec2(rng, range);

  let cos = dot2(a, b) / (magnitude2(a) * magnitude2(b));
  let degrees = cos.clamp(-1.0, 1.0).acos().to_degrees();
  let value = round_to(degrees, decimals_for(difficulty));

  let prompt = format!(
    "Find the angle between a = {} and b = {}, in degrees.",
    fmt_vec2(a),
    fmt_vec2(b)
  );
  GenOut {
    exercise: build_exercise(id, difficulty, TITLE, prompt, ExerciseBody::Numeric {}),
    expected: Expected::Numeric { value, tolerance: tolerance_for(difficulty, ExerciseKind::Numeric) },
    archetype: "angle_numeric",
  }
}

fn angle_classify(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let range = component_range(difficulty);
  let a = nonzero_vec2(rng, range);
  let b = if rng.float() < 0.3 {
    // Force a right angle with an exact perpendicular.
    Vec2::new(-a.y, a.x)
  } else {
    nonzero_vec2(rng, range)
  };

  // cos(theta) has the sign of the dot product, so classify on that with the
  // exact-zero threshold.
  let d = dot2(a, b);
  let correct = if d.abs() < ZERO_EPSILON {
    "right"
  } else if d > 0.0 {
    "acute"
  } else {
    "obtuse"
  };
  let distractors: Vec<String> = ["acute", "right", "obtuse"]
    .iter()
    .filter(|l| **l != correct)
    .map(|l| l.to_string())
    .collect();
  let (options, correct_id) = single_choice_options(rng, correct.to_string(), distractors);

  let prompt = format!(
    "Is the angle between a = {} and b = {} acute, right, or obtuse?",
    fmt_vec2(a),
    fmt_vec2(b)
  );
  GenOut {
    exercise: build_exercise(id, difficulty, TITLE, prompt, ExerciseBody::SingleChoice { options }),
    expected: Expected::SingleChoice { option_id: correct_id },
    archetype: "angle_classify",
  }
}

fn perpendicular_check(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let range = component_range(difficulty);
  let a = nonzero_vec2(rng, range);
  let b = if rng.float() < 0.5 {
    let k = rng.int(1, 2) as f64;
    Vec2::new(-a.y * k, a.x * k)
  } else {
    nonzero_vec2(rng, range)
  };

  let correct = if dot2(a, b).abs() < ZERO_EPSILON { "yes" } else { "no" };
  let other = if correct == "yes" { "no" } else { "yes" };
  let (options, correct_id) = single_choice_options(rng, correct.to_string(), vec![other.to_string()]);

  let prompt = format!("Are a = {} and b = {} perpendicular?", fmt_vec2(a), fmt_vec2(b));
  GenOut {
    exercise: build_exercise(id, difficulty, TITLE, prompt, ExerciseBody::SingleChoice { options }),
    expected: Expected::SingleChoice { option_id: correct_id },
    archetype: "perpendicular_check",
  }
}
