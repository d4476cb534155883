//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//!
//! The exercise DTO carries only the public half of an instance; the
//! expected payload stays server side until a validation response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Answer, Attempt, Exercise, Expected, Session, SessionStatus};
use crate::rng::Seed;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
  Ping,
  NewExercise {
    topic: String,
    #[serde(default)]
    difficulty: String,
    seed: Option<Seed>,
    variant: Option<String>,
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
  },
  SubmitAnswer {
    #[serde(rename = "instanceId")]
    instance_id: String,
    answer: Option<Answer>,
    #[serde(default)]
    reveal: bool,
  },
  StartSession {
    topic: String,
    difficulty: Option<String>,
    #[serde(rename = "targetCount")]
    target_count: Option<u32>,
  },
  SessionStatus {
    #[serde(rename = "sessionId")]
    session_id: String,
  },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
  Pong,
  Exercise {
    #[serde(rename = "instanceId")]
    instance_id: String,
    exercise: Exercise,
  },
  AnswerResult {
    ok: bool,
    rejected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected: Option<Expected>,
    explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    session: Option<SessionOut>,
  },
  Session {
    session: SessionOut,
  },
  Error {
    message: String,
  },
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct ExerciseQuery {
  pub topic: String,
  #[serde(default)]
  pub difficulty: String,
  pub seed: Option<Seed>,
  pub variant: Option<String>,
  #[serde(rename = "sessionId")]
  pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExerciseOut {
  #[serde(rename = "instanceId")]
  pub instance_id: String,
  pub exercise: Exercise,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
  #[serde(rename = "instanceId")]
  pub instance_id: String,
  pub answer: Option<Answer>,
  #[serde(default)]
  pub reveal: bool,
}

#[derive(Debug, Serialize)]
pub struct AnswerOut {
  pub ok: bool,
  /// True when the submission was malformed (answer kind does not match the
  /// exercise kind) and nothing was recorded.
  pub rejected: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub expected: Option<Expected>,
  pub explanation: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub session: Option<SessionOut>,
}

#[derive(Debug, Deserialize)]
pub struct SessionIn {
  pub topic: String,
  pub difficulty: Option<String>,
  #[serde(rename = "targetCount")]
  pub target_count: Option<u32>,
}

/// Session rollup shared by HTTP and WS responses.
#[derive(Clone, Debug, Serialize)]
pub struct SessionOut {
  pub id: String,
  pub topic: String,
  pub difficulty: String,
  #[serde(rename = "targetCount")]
  pub target_count: u32,
  pub total: u32,
  pub correct: u32,
  pub status: SessionStatus,
  #[serde(rename = "createdAt")]
  pub created_at: DateTime<Utc>,
  #[serde(rename = "completedAt", skip_serializing_if = "Option::is_none")]
  pub completed_at: Option<DateTime<Utc>>,
  pub missed: Vec<crate::domain::MissedQuestion>,
}

impl From<Session> for SessionOut {
  fn from(s: Session) -> Self {
    SessionOut {
      id: s.id,
      topic: s.topic,
      difficulty: s.difficulty,
      target_count: s.target_count,
      total: s.total,
      correct: s.correct,
      status: s.status,
      created_at: s.created_at,
      completed_at: s.completed_at,
      missed: s.missed,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct SessionDetailOut {
  #[serde(flatten)]
  pub session: SessionOut,
  #[serde(rename = "recentAttempts")]
  pub recent_attempts: Vec<Attempt>,
}

#[derive(Debug, Serialize)]
pub struct TopicsOut {
  pub topics: Vec<crate::gen::TopicInfo>,
}

#[derive(Serialize)]
pub struct HealthOut {
  pub ok: bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ws_submit_answer_parses_with_defaults() {
    let raw = r#"{"type":"submit_answer","instanceId":"i-1","answer":{"kind":"numeric","value":3.5}}"#;
    let msg: ClientWsMessage = serde_json::from_str(raw).expect("parse");
    match msg {
      ClientWsMessage::SubmitAnswer { instance_id, answer, reveal } => {
        assert_eq!(instance_id, "i-1");
        assert!(matches!(answer, Some(Answer::Numeric { .. })));
        assert!(!reveal);
      }
      other => panic!("wrong variant: {other:?}"),
    }
  }

  #[test]
  fn ws_new_exercise_accepts_string_and_number_seeds() {
    let raw = r#"{"type":"new_exercise","topic":"dot-product","seed":42}"#;
    let msg: ClientWsMessage = serde_json::from_str(raw).expect("parse");
    assert!(matches!(
      msg,
      ClientWsMessage::NewExercise { seed: Some(Seed::Number(42)), .. }
    ));

    let raw = r#"{"type":"new_exercise","topic":"dot-product","difficulty":"hard","seed":"practice-1"}"#;
    let msg: ClientWsMessage = serde_json::from_str(raw).expect("parse");
    assert!(matches!(
      msg,
      ClientWsMessage::NewExercise { seed: Some(Seed::Text(_)), .. }
    ));
  }

  #[test]
  fn answer_out_omits_expected_when_absent() {
    let out = AnswerOut {
      ok: false,
      rejected: true,
      expected: None,
      explanation: "answer kind does not match".into(),
      session: None,
    };
    let json = serde_json::to_string(&out).expect("serialize");
    assert!(!json.contains("expected"));
    assert!(!json.contains("session"));
  }
}
