//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Generating an exercise instance (dispatch, persist, attach to session)
//!   - Checking a submitted answer and rolling it into the session
//!   - Session start/lookup

use tracing::{info, instrument, warn};

use crate::domain::Answer;
use crate::gen::DispatchError;
use crate::protocol::{AnswerOut, ExerciseOut, SessionOut};
use crate::rng::Seed;
use crate::state::AppState;
use crate::validate::validate;

/// How many recent attempts the session detail view carries.
const RECENT_ATTEMPTS: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  #[error(transparent)]
  Dispatch(#[from] DispatchError),
  #[error("unknown instanceId: {0}")]
  UnknownInstance(String),
  #[error("unknown sessionId: {0}")]
  UnknownSession(String),
}

/// Generate a fresh exercise instance and persist it unanswered.
///
/// An empty difficulty falls back to the configured default. When the
/// request is unseeded, the previously served archetype for the topic is
/// avoided; seeded requests skip that so reproduction stays exact.
#[instrument(level = "info", skip(state, seed), fields(%topic, %difficulty, seeded = seed.is_some()))]
pub async fn generate_exercise(
  state: &AppState,
  topic: &str,
  difficulty: &str,
  seed: Option<Seed>,
  variant: Option<&str>,
  session_id: Option<String>,
) -> Result<ExerciseOut, ApiError> {
  let difficulty = if difficulty.is_empty() {
    state.cfg.default_difficulty.as_str()
  } else {
    difficulty
  };

  let avoid = if seed.is_none() {
    state.last_archetype_for(topic).await
  } else {
    None
  };

  if let Some(sid) = &session_id {
    if state.get_session(sid).await.is_none() {
      return Err(ApiError::UnknownSession(sid.clone()));
    }
  }

  let out = state.registry.resolve(
    topic,
    difficulty,
    seed.as_ref(),
    variant,
    avoid,
    state.cfg.difficulty_weights.as_array(),
  )?;

  info!(
    target: "exercise",
    id = %out.exercise.id,
    topic = %out.exercise.topic,
    archetype = out.archetype,
    "Generated exercise"
  );

  let instance = state
    .insert_instance(out.exercise, out.expected, out.archetype, session_id)
    .await;

  Ok(ExerciseOut { instance_id: instance.id, exercise: instance.exercise })
}

/// Validate a submitted answer (or reveal request) against its instance.
///
/// A kind mismatch is a malformed submission: it is reported back as
/// rejected and leaves the instance and session untouched.
#[instrument(level = "info", skip(state, answer), fields(%instance_id, reveal))]
pub async fn submit_answer(
  state: &AppState,
  instance_id: &str,
  answer: Option<Answer>,
  reveal: bool,
) -> Result<AnswerOut, ApiError> {
  let instance = state
    .get_instance(instance_id)
    .await
    .ok_or_else(|| ApiError::UnknownInstance(instance_id.to_string()))?;

  let verdict = validate(&instance.expected, answer.as_ref(), reveal);

  if verdict.mismatch {
    warn!(
      target: "exercise",
      %instance_id,
      explanation = %verdict.explanation,
      "Rejected answer of the wrong kind"
    );
    return Ok(AnswerOut {
      ok: false,
      rejected: true,
      expected: None,
      explanation: verdict.explanation,
      session: None,
    });
  }

  let outcome = state
    .record_validation(instance_id, answer, verdict.ok, reveal)
    .await
    .ok_or_else(|| ApiError::UnknownInstance(instance_id.to_string()))?;

  info!(
    target: "session",
    %instance_id,
    ok = verdict.ok,
    first = outcome.first_validation,
    "Recorded validation"
  );

  Ok(AnswerOut {
    ok: verdict.ok,
    rejected: false,
    expected: Some(verdict.expected),
    explanation: verdict.explanation,
    session: outcome.session.map(SessionOut::from),
  })
}

/// Start a practice session. Zero or omitted target counts fall back to the
/// configured default length.
#[instrument(level = "info", skip(state))]
pub async fn start_session(
  state: &AppState,
  topic: String,
  difficulty: Option<String>,
  target_count: Option<u32>,
) -> Result<SessionOut, ApiError> {
  if !state.registry.is_known_topic(&topic) {
    return Err(ApiError::Dispatch(DispatchError::UnknownTopic {
      requested: topic,
      known: state.registry.known_slugs(),
    }));
  }
  let difficulty = difficulty.unwrap_or_else(|| state.cfg.default_difficulty.clone());
  let target = match target_count {
    Some(n) if n > 0 => n,
    _ => state.cfg.default_target_count,
  };
  let session = state.create_session(topic, difficulty, target).await;
  Ok(SessionOut::from(session))
}

/// Session detail: the rollup plus the most recent attempts.
#[instrument(level = "debug", skip(state), fields(%session_id))]
pub async fn session_detail(
  state: &AppState,
  session_id: &str,
) -> Result<(SessionOut, Vec<crate::domain::Attempt>), ApiError> {
  let session = state
    .get_session(session_id)
    .await
    .ok_or_else(|| ApiError::UnknownSession(session_id.to_string()))?;
  let attempts = state.session_attempts(session_id, RECENT_ATTEMPTS).await;
  Ok((SessionOut::from(session), attempts))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::PracticeConfig;
  use crate::domain::ExerciseKind;

  fn state() -> AppState {
    AppState::with_config(PracticeConfig::default())
  }

  #[tokio::test]
  async fn generate_then_submit_correct_answer() {
    let state = state();
    let out = generate_exercise(&state, "dot-product", "easy", Some(Seed::Number(7)), None, None)
      .await
      .expect("generate");

    let instance = state.get_instance(&out.instance_id).await.unwrap();
    let answer = match &instance.expected {
      crate::domain::Expected::Numeric { value, .. } => Answer::Numeric { value: *value },
      crate::domain::Expected::SingleChoice { option_id } => {
        Answer::SingleChoice { option_id: option_id.clone() }
      }
      crate::domain::Expected::MultiChoice { option_ids } => {
        Answer::MultiChoice { option_ids: option_ids.clone() }
      }
      crate::domain::Expected::VectorDragTarget { target, .. } => {
        Answer::VectorDragTarget { point: *target }
      }
      crate::domain::Expected::VectorDragDot { .. } => unreachable!("dot-product has no drag-dot"),
      crate::domain::Expected::MatrixInput { target, .. } => {
        Answer::MatrixInput { cells: target.clone() }
      }
    };

    let verdict = submit_answer(&state, &out.instance_id, Some(answer), false)
      .await
      .expect("submit");
    assert!(verdict.ok);
    assert!(!verdict.rejected);
  }

  #[tokio::test]
  async fn empty_difficulty_uses_config_default() {
    let state = state();
    let out = generate_exercise(&state, "dot-product", "", Some(Seed::Number(3)), None, None)
      .await
      .expect("generate");
    // Default difficulty is "all": the exercise lands on one of the three.
    let instance = state.get_instance(&out.instance_id).await.unwrap();
    assert!(crate::domain::Difficulty::ALL.contains(&instance.exercise.difficulty));
  }

  #[tokio::test]
  async fn unknown_instance_is_an_error() {
    let state = state();
    let err = submit_answer(&state, "nope", None, false).await.unwrap_err();
    assert!(matches!(err, ApiError::UnknownInstance(_)));
  }

  #[tokio::test]
  async fn mismatched_kind_is_rejected_without_consuming() {
    let state = state();
    let session = start_session(&state, "all".into(), None, Some(5)).await.unwrap();
    let out = generate_exercise(
      &state,
      "dot-product",
      "easy",
      Some(Seed::Number(11)),
      None,
      Some(session.id.clone()),
    )
    .await
    .unwrap();

    let instance = state.get_instance(&out.instance_id).await.unwrap();
    let wrong_kind = match instance.expected.kind() {
      ExerciseKind::Numeric => Answer::SingleChoice { option_id: "a".into() },
      _ => Answer::Numeric { value: 0.0 },
    };

    let verdict = submit_answer(&state, &out.instance_id, Some(wrong_kind), false)
      .await
      .unwrap();
    assert!(verdict.rejected);
    assert!(!verdict.ok);

    // The rejection consumed nothing.
    let (session, _) = session_detail(&state, &session.id).await.unwrap();
    assert_eq!(session.total, 0);
    let stored = state.get_instance(&out.instance_id).await.unwrap();
    assert!(stored.answered_at.is_none());
  }

  #[tokio::test]
  async fn session_start_validates_topic() {
    let state = state();
    let err = start_session(&state, "no-such-topic".into(), None, None)
      .await
      .unwrap_err();
    assert!(matches!(err, ApiError::Dispatch(DispatchError::UnknownTopic { .. })));
  }

  #[tokio::test]
  async fn unseeded_requests_avoid_archetype_repeats() {
    let state = state();
    let first = generate_exercise(&state, "dot-product", "medium", None, None, None)
      .await
      .unwrap();
    let first_arch = state
      .get_instance(&first.instance_id)
      .await
      .unwrap()
      .archetype;
    let second = generate_exercise(&state, "dot-product", "medium", None, None, None)
      .await
      .unwrap();
    let second_arch = state
      .get_instance(&second.instance_id)
      .await
      .unwrap()
      .archetype;
    // One redraw is attempted, so a repeat is unlikely but not impossible.
    // Run a few rounds and require at least one change of archetype.
    if first_arch == second_arch {
      let mut changed = false;
      for _ in 0..10 {
        let next = generate_exercise(&state, "dot-product", "medium", None, None, None)
          .await
          .unwrap();
        let arch = state.get_instance(&next.instance_id).await.unwrap().archetype;
        if arch != second_arch {
          changed = true;
          break;
        }
      }
      assert!(changed, "archetype never varied across unseeded requests");
    }
  }
}
