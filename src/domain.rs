//! Domain models: difficulty, exercise/expected/answer unions, and the
//! persisted practice records (instance, attempt, session).
//!
//! `Exercise` is the public, client-visible payload and must never carry the
//! ground truth. `Expected` is the server-only mirror keyed by the same kind
//! tag and holds exactly the comparison data the validator needs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Difficulty of a generated exercise. Tolerances tighten and parameter
/// ranges widen as difficulty increases.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

  pub fn as_str(self) -> &'static str {
    match self {
      Difficulty::Easy => "easy",
      Difficulty::Medium => "medium",
      Difficulty::Hard => "hard",
    }
  }

  pub fn parse(s: &str) -> Option<Difficulty> {
    match s {
      "easy" => Some(Difficulty::Easy),
      "medium" => Some(Difficulty::Medium),
      "hard" => Some(Difficulty::Hard),
      _ => None,
    }
  }
}

/// The closed set of question kinds the app can render and grade.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
  Numeric,
  SingleChoice,
  MultiChoice,
  VectorDragTarget,
  VectorDragDot,
  MatrixInput,
}

/// 2D point/vector used by the drag kinds and the geometry helpers.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
  pub x: f64,
  pub y: f64,
}

impl Vec2 {
  pub fn new(x: f64, y: f64) -> Vec2 {
    Vec2 { x, y }
  }
}

/// One selectable option of a choice question.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChoiceOption {
  pub id: String,
  pub label: String,
}

/// Kind-specific public fields. Only what the client needs to render and
/// answer the question; never the correct answer.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExerciseBody {
  Numeric {},
  SingleChoice {
    options: Vec<ChoiceOption>,
  },
  MultiChoice {
    options: Vec<ChoiceOption>,
  },
  VectorDragTarget {
    start: Vec2,
    /// Companion vector rendered but not draggable (e.g. the axis of a
    /// projection). `None` when the question involves a single vector.
    locked: Option<Vec2>,
    #[serde(rename = "gridExtent")]
    grid_extent: i64,
  },
  VectorDragDot {
    fixed: Vec2,
    start: Vec2,
    #[serde(rename = "gridExtent")]
    grid_extent: i64,
  },
  MatrixInput {
    rows: usize,
    cols: usize,
  },
}

impl ExerciseBody {
  pub fn kind(&self) -> ExerciseKind {
    match self {
      ExerciseBody::Numeric {} => ExerciseKind::Numeric,
      ExerciseBody::SingleChoice { .. } => ExerciseKind::SingleChoice,
      ExerciseBody::MultiChoice { .. } => ExerciseKind::MultiChoice,
      ExerciseBody::VectorDragTarget { .. } => ExerciseKind::VectorDragTarget,
      ExerciseBody::VectorDragDot { .. } => ExerciseKind::VectorDragDot,
      ExerciseBody::MatrixInput { .. } => ExerciseKind::MatrixInput,
    }
  }
}

/// Public, client-visible exercise.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Exercise {
  pub id: String,
  /// Canonical public topic slug (patched by the dispatcher; never an
  /// internal generator key).
  pub topic: String,
  pub difficulty: Difficulty,
  pub title: String,
  pub prompt: String,
  #[serde(flatten)]
  pub body: ExerciseBody,
}

/// Server-only ground truth plus comparison policy, mirroring the kind tag.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expected {
  Numeric {
    value: f64,
    tolerance: f64,
  },
  SingleChoice {
    #[serde(rename = "optionId")]
    option_id: String,
  },
  MultiChoice {
    #[serde(rename = "optionIds")]
    option_ids: Vec<String>,
  },
  VectorDragTarget {
    target: Vec2,
    tolerance: f64,
    locked: bool,
  },
  VectorDragDot {
    #[serde(rename = "targetDot")]
    target_dot: f64,
    fixed: Vec2,
    tolerance: f64,
  },
  MatrixInput {
    target: Vec<Vec<f64>>,
    tolerance: f64,
  },
}

impl Expected {
  pub fn kind(&self) -> ExerciseKind {
    match self {
      Expected::Numeric { .. } => ExerciseKind::Numeric,
      Expected::SingleChoice { .. } => ExerciseKind::SingleChoice,
      Expected::MultiChoice { .. } => ExerciseKind::MultiChoice,
      Expected::VectorDragTarget { .. } => ExerciseKind::VectorDragTarget,
      Expected::VectorDragDot { .. } => ExerciseKind::VectorDragDot,
      Expected::MatrixInput { .. } => ExerciseKind::MatrixInput,
    }
  }
}

/// Submitted answer payload, one variant per kind.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Answer {
  Numeric {
    value: f64,
  },
  SingleChoice {
    #[serde(rename = "optionId")]
    option_id: String,
  },
  MultiChoice {
    #[serde(rename = "optionIds")]
    option_ids: Vec<String>,
  },
  VectorDragTarget {
    point: Vec2,
  },
  VectorDragDot {
    vector: Vec2,
  },
  MatrixInput {
    cells: Vec<Vec<f64>>,
  },
}

impl Answer {
  pub fn kind(&self) -> ExerciseKind {
    match self {
      Answer::Numeric { .. } => ExerciseKind::Numeric,
      Answer::SingleChoice { .. } => ExerciseKind::SingleChoice,
      Answer::MultiChoice { .. } => ExerciseKind::MultiChoice,
      Answer::VectorDragTarget { .. } => ExerciseKind::VectorDragTarget,
      Answer::VectorDragDot { .. } => ExerciseKind::VectorDragDot,
      Answer::MatrixInput { .. } => ExerciseKind::MatrixInput,
    }
  }
}

/// Generator output unit: public exercise, secret expected, and the internal
/// sub-template tag that produced it (analytics / anti-repetition only).
#[derive(Clone, Debug)]
pub struct GenOut {
  pub exercise: Exercise,
  pub expected: Expected,
  pub archetype: &'static str,
}

/// One persisted generated exercise, optionally bound to a session.
/// `answered_at` moves None -> Some exactly once; that transition gates
/// session counting.
#[derive(Clone, Debug)]
pub struct Instance {
  pub id: String,
  pub session_id: Option<String>,
  pub exercise: Exercise,
  pub expected: Expected,
  pub archetype: &'static str,
  pub created_at: DateTime<Utc>,
  pub answered_at: Option<DateTime<Utc>>,
}

/// Append-only record of one submission (or reveal) against an instance.
#[derive(Clone, Debug, Serialize)]
pub struct Attempt {
  pub id: String,
  #[serde(rename = "instanceId")]
  pub instance_id: String,
  #[serde(rename = "sessionId")]
  pub session_id: Option<String>,
  #[serde(skip)]
  pub answer: Option<Answer>,
  pub ok: bool,
  #[serde(rename = "revealUsed")]
  pub reveal_used: bool,
  #[serde(rename = "createdAt")]
  pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
  Active,
  Completed,
}

/// One entry of the missed-question summary computed at session completion.
#[derive(Clone, Debug, Serialize)]
pub struct MissedQuestion {
  #[serde(rename = "instanceId")]
  pub instance_id: String,
  pub topic: String,
  pub title: String,
}

/// An ordered practice run. `total` never exceeds `target_count`; reaching it
/// flips the session irreversibly to Completed.
#[derive(Clone, Debug)]
pub struct Session {
  pub id: String,
  pub topic: String,
  pub difficulty: String,
  pub target_count: u32,
  pub total: u32,
  pub correct: u32,
  pub status: SessionStatus,
  pub created_at: DateTime<Utc>,
  pub completed_at: Option<DateTime<Utc>>,
  pub missed: Vec<MissedQuestion>,
}
