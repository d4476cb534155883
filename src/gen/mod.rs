//! Generator registry and dispatcher.
//!
//! Flow:
//! 1) Caller asks for (topic, difficulty), either concrete or "all".
//! 2) The dispatcher seeds an RNG, normalizes "all" via RNG picks, and looks
//!    up the generator behind the requested public slug.
//! 3) The generator returns `GenOut`; the dispatcher then unconditionally
//!    patches the canonical slug onto `exercise.topic` so persistence never
//!    sees an internal key.
//!
//! The registry is built once at startup and never mutated. Unknown topics
//! fail fast with the full slug list; we never substitute a different
//! generator silently.

use thiserror::Error;

use crate::domain::{ChoiceOption, Difficulty, GenOut, Vec2};
use crate::rng::{Rng, Seed};

pub mod angle;
pub mod dot;
pub mod linsys;
pub mod matrices_part1;
pub mod matrixops;
pub mod projection;
pub mod vectors;

use matrices_part1::Part1Variant;

/// Bounded retry budget for non-degeneracy guards. After this many failed
/// draws the generator falls back to a known-good configuration.
pub const RETRY_BUDGET: usize = 200;

/// Per-call options threaded through to a generator.
#[derive(Clone, Debug, Default)]
pub struct GenOpts {
  /// Sub-topic of the shared matrices-part-1 generator.
  pub variant: Option<Part1Variant>,
  /// Archetype tag served last time; generators steer away from an
  /// immediate repeat on a best-effort basis.
  pub avoid_archetype: Option<String>,
}

pub type GenFn = fn(&mut Rng, Difficulty, String, &GenOpts) -> GenOut;

/// One public topic slug served by a generator key.
pub struct SlugDef {
  pub slug: &'static str,
  pub title: &'static str,
  pub variant: Option<Part1Variant>,
}

/// One registered generator key with the public slugs it serves.
pub struct GeneratorDef {
  pub key: &'static str,
  pub run: GenFn,
  pub slugs: &'static [SlugDef],
}

#[derive(Debug, Error)]
pub enum DispatchError {
  #[error("unknown topic '{requested}'; known topics: {}", .known.join(", "))]
  UnknownTopic { requested: String, known: Vec<String> },
  #[error("unknown difficulty '{0}'; expected easy, medium, hard, or all")]
  UnknownDifficulty(String),
  #[error("unknown variant '{requested}' for matrices_part1; known variants: {}", .known.join(", "))]
  UnknownVariant { requested: String, known: Vec<String> },
}

/// Public topic descriptor served by `/api/v1/topics`.
#[derive(Clone, Debug, serde::Serialize)]
pub struct TopicInfo {
  pub slug: &'static str,
  pub title: &'static str,
}

macro_rules! slug {
  ($slug:expr, $title:expr) => {
    SlugDef { slug: $slug, title: $title, variant: None }
  };
  ($slug:expr, $title:expr, $variant:expr) => {
    SlugDef { slug: $slug, title: $title, variant: Some($variant) }
  };
}

static PART1_SLUGS: &[SlugDef] = &[
  slug!("matrices-shape", "Matrix Shape", Part1Variant::Shape),
  slug!("matrices-entry", "Matrix Entries", Part1Variant::Entry),
  slug!("matrices-addition", "Matrix Addition", Part1Variant::Addition),
  slug!("matrices-scalar", "Scalar Multiplication", Part1Variant::Scalar),
  slug!("matrices-equality", "Matrix Equality", Part1Variant::Equality),
  slug!("matrices-transpose", "Transpose Basics", Part1Variant::Transpose),
  slug!("matrices-row-col", "Rows and Columns", Part1Variant::RowCol),
  slug!("matrices-identity", "Zero and Identity", Part1Variant::ZeroIdentity),
];

pub struct GenRegistry {
  defs: Vec<GeneratorDef>,
}

impl GenRegistry {
  pub fn new() -> GenRegistry {
    let defs = vec![
      GeneratorDef {
        key: "dot",
        run: dot::generate,
        slugs: &[slug!("dot-product", "Dot Product")],
      },
      GeneratorDef {
        key: "angle",
        run: angle::generate,
        slugs: &[slug!("angle-between", "Angles Between Vectors")],
      },
      GeneratorDef {
        key: "projection",
        run: projection::generate,
        slugs: &[slug!("projection", "Projections")],
      },
      GeneratorDef {
        key: "vectors_part1",
        run: vectors::generate_part1,
        slugs: &[slug!("vectors-part-1", "Vectors I")],
      },
      GeneratorDef {
        key: "vectors_part2",
        run: vectors::generate_part2,
        slugs: &[slug!("vectors-part-2", "Vectors II")],
      },
      GeneratorDef {
        key: "linear_systems",
        run: linsys::generate_systems,
        slugs: &[slug!("linear-systems", "Linear Systems")],
      },
      GeneratorDef {
        key: "augmented_matrices",
        run: linsys::generate_augmented,
        slugs: &[slug!("augmented-matrices", "Augmented Matrices")],
      },
      GeneratorDef {
        key: "rref",
        run: linsys::generate_rref,
        slugs: &[slug!("rref", "Row Reduction")],
      },
      GeneratorDef {
        key: "solution_classification",
        run: linsys::generate_classification,
        slugs: &[slug!("solution-classification", "Classifying Solutions")],
      },
      GeneratorDef {
        key: "parametric_form",
        run: linsys::generate_parametric,
        slugs: &[slug!("parametric-form", "Parametric Form")],
      },
      GeneratorDef {
        key: "matrix_ops",
        run: matrixops::generate_ops,
        slugs: &[slug!("matrix-ops", "Matrix Operations")],
      },
      GeneratorDef {
        key: "matrix_inverse",
        run: matrixops::generate_inverse,
        slugs: &[slug!("matrix-inverse", "Matrix Inverses")],
      },
      GeneratorDef {
        key: "matrix_properties",
        run: matrixops::generate_properties,
        slugs: &[slug!("matrix-properties", "Matrix Properties")],
      },
      GeneratorDef { key: "matrices_part1", run: matrices_part1::generate, slugs: PART1_SLUGS },
    ];
    GenRegistry { defs }
  }

  pub fn topics(&self) -> Vec<TopicInfo> {
    self
      .defs
      .iter()
      .flat_map(|d| d.slugs.iter().map(|s| TopicInfo { slug: s.slug, title: s.title }))
      .collect()
  }

  /// True for any public slug, internal key, or "all".
  pub fn is_known_topic(&self, topic: &str) -> bool {
    topic == "all"
      || self
        .defs
        .iter()
        .any(|d| d.key == topic || d.slugs.iter().any(|s| s.slug == topic))
  }

  pub fn known_slugs(&self) -> Vec<String> {
    let mut out: Vec<String> = self
      .defs
      .iter()
      .flat_map(|d| d.slugs.iter().map(|s| s.slug.to_string()))
      .collect();
    out.push("all".to_string());
    out
  }

  /// Resolve a request to a concrete generator, run it, and patch the
  /// canonical slug onto the result.
  pub fn resolve(
    &self,
    topic: &str,
    difficulty: &str,
    seed: Option<&Seed>,
    variant: Option<&str>,
    avoid_archetype: Option<String>,
    difficulty_weights: [f64; 3],
  ) -> Result<GenOut, DispatchError> {
    let mut rng = Rng::new(seed);

    let difficulty = match difficulty {
      "" | "all" => {
        let weighted: Vec<(Difficulty, f64)> = Difficulty::ALL
          .iter()
          .copied()
          .zip(difficulty_weights.iter().copied())
          .collect();
        rng.weighted(&weighted)
      }
      other => Difficulty::parse(other)
        .ok_or_else(|| DispatchError::UnknownDifficulty(other.to_string()))?,
    };

    let (def, slug_def) = self.lookup(topic, variant, &mut rng)?;

    let id = format!("{}-{}-{}", def.key, difficulty.as_str(), rng.suffix(6));
    let opts = GenOpts { variant: slug_def.variant, avoid_archetype };
    let mut out = (def.run)(&mut rng, difficulty, id, &opts);

    // Persistence must only ever see the public slug, so this rewrite is
    // unconditional even when the generator already set it.
    out.exercise.topic = slug_def.slug.to_string();
    Ok(out)
  }

  fn lookup(
    &self,
    topic: &str,
    variant: Option<&str>,
    rng: &mut Rng,
  ) -> Result<(&GeneratorDef, &SlugDef), DispatchError> {
    if topic.is_empty() || topic == "all" {
      // Equal weight across generator keys, not across public slugs.
      let idx = rng.int(0, self.defs.len() as i64 - 1) as usize;
      let def = &self.defs[idx];
      let slug_idx = rng.int(0, def.slugs.len() as i64 - 1) as usize;
      return Ok((def, &def.slugs[slug_idx]));
    }

    for def in &self.defs {
      if let Some(s) = def.slugs.iter().find(|s| s.slug == topic) {
        return Ok((def, s));
      }
      // Internal keys are accepted too; multi-slug keys take an optional
      // variant to select the public slug.
      if def.key == topic {
        if def.slugs.len() == 1 {
          return Ok((def, &def.slugs[0]));
        }
        return match variant {
          Some(v) => {
            let wanted = Part1Variant::parse(v).ok_or_else(|| DispatchError::UnknownVariant {
              requested: v.to_string(),
              known: Part1Variant::ALL.iter().map(|p| p.as_str().to_string()).collect(),
            })?;
            let s = def
              .slugs
              .iter()
              .find(|s| s.variant == Some(wanted))
              .expect("every variant has a slug entry");
            Ok((def, s))
          }
          None => {
            let idx = rng.int(0, def.slugs.len() as i64 - 1) as usize;
            Ok((def, &def.slugs[idx]))
          }
        };
      }
    }

    Err(DispatchError::UnknownTopic {
      requested: topic.to_string(),
      known: self.known_slugs(),
    })
  }
}

impl Default for GenRegistry {
  fn default() -> Self {
    GenRegistry::new()
  }
}

// ---- shared draw helpers used by the topic modules ----

/// Weighted archetype choice with best-effort avoidance of the previously
/// served tag (one redraw, then accept whatever comes).
pub fn pick_archetype(
  rng: &mut Rng,
  weights: &[(&'static str, f64)],
  avoid: Option<&str>,
) -> &'static str {
  let first = rng.weighted(weights);
  if let Some(avoid) = avoid {
    if first == avoid && weights.iter().filter(|(_, w)| *w > 0.0).count() > 1 {
      return rng.weighted(weights);
    }
  }
  first
}

/// Bounded retry with deterministic fallback; guarantees termination even
/// under adversarial seeds.
pub fn retry_draw<T>(
  rng: &mut Rng,
  mut draw: impl FnMut(&mut Rng) -> Option<T>,
  fallback: impl FnOnce() -> T,
) -> T {
  for _ in 0..RETRY_BUDGET {
    if let Some(v) = draw(rng) {
      return v;
    }
  }
  fallback()
}

/// Integer component range per difficulty.
pub fn component_range(difficulty: Difficulty) -> i64 {
  match difficulty {
    Difficulty::Easy => 5,
    Difficulty::Medium => 8,
    Difficulty::Hard => 12,
  }
}

/// Draggable grid half-extent per difficulty: the search space stays
/// visually reasonable while tolerances shrink.
pub fn grid_extent(difficulty: Difficulty) -> i64 {
  match difficulty {
    Difficulty::Easy => 6,
    Difficulty::Medium => 8,
    Difficulty::Hard => 10,
  }
}

/// Largest matrix dimension used by full-matrix input archetypes.
pub fn max_dim(difficulty: Difficulty) -> usize {
  match difficulty {
    Difficulty::Easy => 3,
    Difficulty::Medium => 4,
    Difficulty::Hard => 5,
  }
}

pub fn int_vec2(rng: &mut Rng, range: i64) -> Vec2 {
  Vec2::new(rng.int(-range, range) as f64, rng.int(-range, range) as f64)
}

/// Non-zero integer vector, retried within budget then falling back to (1, 2).
pub fn nonzero_vec2(rng: &mut Rng, range: i64) -> Vec2 {
  retry_draw(
    rng,
    |rng| {
      let v = int_vec2(rng, range);
      if v.x != 0.0 || v.y != 0.0 { Some(v) } else { None }
    },
    || Vec2::new(1.0, 2.0),
  )
}

/// Integer matrix with difficulty-scaled entries.
pub fn int_matrix(rng: &mut Rng, rows: usize, cols: usize, range: i64) -> Vec<Vec<f64>> {
  (0..rows)
    .map(|_| (0..cols).map(|_| rng.int(-range, range) as f64).collect())
    .collect()
}

/// Build shuffled single-choice options from a correct label and distractor
/// labels. Distractors that collide with the correct label (or each other)
/// are dropped. Returns (options, correct option id).
pub fn single_choice_options(
  rng: &mut Rng,
  correct: String,
  distractors: Vec<String>,
) -> (Vec<ChoiceOption>, String) {
  let mut labels: Vec<(String, bool)> = vec![(correct, true)];
  for d in distractors {
    if labels.iter().all(|(l, _)| *l != d) {
      labels.push((d, false));
    }
  }
  let labels = rng.shuffle(&labels);
  let mut options = Vec::with_capacity(labels.len());
  let mut correct_id = String::new();
  for (i, (label, is_correct)) in labels.into_iter().enumerate() {
    let id = option_id(i);
    if is_correct {
      correct_id = id.clone();
    }
    options.push(ChoiceOption { id, label });
  }
  (options, correct_id)
}

/// Build shuffled multi-choice options from (label, correct?) pairs.
/// Returns (options, correct option-id set).
pub fn multi_choice_options(
  rng: &mut Rng,
  labels: Vec<(String, bool)>,
) -> (Vec<ChoiceOption>, Vec<String>) {
  let labels = rng.shuffle(&labels);
  let mut options = Vec::with_capacity(labels.len());
  let mut correct_ids = Vec::new();
  for (i, (label, is_correct)) in labels.into_iter().enumerate() {
    let id = option_id(i);
    if is_correct {
      correct_ids.push(id.clone());
    }
    options.push(ChoiceOption { id, label });
  }
  (options, correct_ids)
}

/// Assemble the public exercise. The topic is left empty here; the
/// dispatcher patches the canonical slug after generation.
pub fn build_exercise(
  id: String,
  difficulty: Difficulty,
  title: &str,
  prompt: String,
  body: crate::domain::ExerciseBody,
) -> crate::domain::Exercise {
  crate::domain::Exercise { id, topic: String::new(), difficulty, title: title.to_string(), prompt, body }
}

fn option_id(i: usize) -> String {
  // a, b, c, ... ; generators never produce more than a handful of options.
  ((b'a' + (i as u8 % 26)) as char).to_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::ExerciseKind;

  fn resolve_seeded(topic: &str, difficulty: &str, seed: &str) -> GenOut {
    GenRegistry::new()
      .resolve(topic, difficulty, Some(&Seed::Text(seed.into())), None, None, [1.0, 1.0, 1.0])
      .expect("resolve")
  }

  #[test]
  fn same_seed_reproduces_exercise_and_expected() {
    for topic in ["all", "dot-product", "linear-systems", "matrices-addition"] {
      let a = resolve_seeded(topic, "all", "seed-x");
      let b = resolve_seeded(topic, "all", "seed-x");
      assert_eq!(
        serde_json::to_string(&a.exercise).unwrap(),
        serde_json::to_string(&b.exercise).unwrap()
      );
      assert_eq!(
        serde_json::to_string(&a.expected).unwrap(),
        serde_json::to_string(&b.expected).unwrap()
      );
      assert_eq!(a.archetype, b.archetype);
    }
  }

  #[test]
  fn unknown_topic_fails_with_known_list() {
    let err = GenRegistry::new()
      .resolve("not-a-topic", "easy", None, None, None, [1.0, 1.0, 1.0])
      .unwrap_err();
    match err {
      DispatchError::UnknownTopic { requested, known } => {
        assert_eq!(requested, "not-a-topic");
        assert!(known.contains(&"dot-product".to_string()));
        assert!(known.contains(&"all".to_string()));
      }
      other => panic!("wrong error: {other}"),
    }
  }

  #[test]
  fn unknown_difficulty_is_rejected() {
    let err = GenRegistry::new()
      .resolve("dot-product", "brutal", None, None, None, [1.0, 1.0, 1.0])
      .unwrap_err();
    assert!(matches!(err, DispatchError::UnknownDifficulty(_)));
  }

  #[test]
  fn topic_is_always_a_public_slug() {
    let registry = GenRegistry::new();
    let slugs: Vec<&str> = registry.topics().iter().map(|t| t.slug).collect();
    for i in 0..40 {
      let out = registry
        .resolve("all", "all", Some(&Seed::Number(i)), None, None, [1.0, 1.0, 1.0])
        .expect("resolve");
      assert!(slugs.contains(&out.exercise.topic.as_str()), "leaked key: {}", out.exercise.topic);
    }
  }

  #[test]
  fn internal_key_with_variant_selects_the_slug() {
    let out = GenRegistry::new()
      .resolve("matrices_part1", "easy", Some(&Seed::Number(3)), Some("addition"), None, [1.0, 1.0, 1.0])
      .expect("resolve");
    assert_eq!(out.exercise.topic, "matrices-addition");
  }

  #[test]
  fn exercise_id_carries_key_and_difficulty() {
    let out = resolve_seeded("dot-product", "medium", "id-seed");
    assert!(out.exercise.id.starts_with("dot-medium-"), "id: {}", out.exercise.id);
  }

  #[test]
  fn expected_fields_never_leak_into_exercise() {
    let registry = GenRegistry::new();
    for i in 0..120 {
      let out = registry
        .resolve("all", "all", Some(&Seed::Number(1000 + i)), None, None, [1.0, 1.0, 1.0])
        .expect("resolve");
      let public = serde_json::to_string(&out.exercise).unwrap();
      for secret in ["optionId", "optionIds", "targetDot", "\"target\"", "tolerance", "\"value\""] {
        assert!(
          !public.contains(secret),
          "secret field {secret} leaked in {public}"
        );
      }
    }
  }

  #[test]
  fn round_trip_all_generators_validate_correct() {
    use crate::domain::{Answer, Expected};
    use crate::validate::validate;

    let registry = GenRegistry::new();
    for topic in registry.topics().iter().map(|t| t.slug) {
      for i in 0..30u64 {
        let out = registry
          .resolve(topic, "all", Some(&Seed::Number(i * 7 + 1)), None, None, [1.0, 1.0, 1.0])
          .expect("resolve");
        let answer = match &out.expected {
          Expected::Numeric { value, .. } => Answer::Numeric { value: *value },
          Expected::SingleChoice { option_id } => {
            Answer::SingleChoice { option_id: option_id.clone() }
          }
          Expected::MultiChoice { option_ids } => {
            Answer::MultiChoice { option_ids: option_ids.clone() }
          }
          Expected::VectorDragTarget { target, .. } => Answer::VectorDragTarget { point: *target },
          Expected::VectorDragDot { target_dot, fixed, .. } => {
            // Any vector achieving the target dot is acceptable; reuse one
            // component of the fixed vector to construct it.
            let v = solve_for_dot(*fixed, *target_dot);
            Answer::VectorDragDot { vector: v }
          }
          Expected::MatrixInput { target, .. } => Answer::MatrixInput { cells: target.clone() },
        };
        let verdict = validate(&out.expected, Some(&answer), false);
        assert!(
          verdict.ok,
          "round trip failed for {topic} seed {i} archetype {}: {}",
          out.archetype, verdict.explanation
        );
      }
    }
  }

  fn solve_for_dot(fixed: Vec2, target: f64) -> Vec2 {
    if fixed.x.abs() > 1e-9 {
      Vec2::new(target / fixed.x, 0.0)
    } else {
      Vec2::new(0.0, target / fixed.y)
    }
  }

  #[test]
  fn generated_kind_matches_expected_kind() {
    let registry = GenRegistry::new();
    for i in 0..80u64 {
      let out = registry
        .resolve("all", "all", Some(&Seed::Number(i)), None, None, [1.0, 1.0, 1.0])
        .expect("resolve");
      assert_eq!(out.exercise.body.kind(), out.expected.kind());
      let _: ExerciseKind = out.expected.kind();
    }
  }
}
