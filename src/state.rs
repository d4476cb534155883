//! Application state: in-memory stores and the session/instance lifecycle.
//!
//! This module owns:
//!   - the generator registry (immutable after startup)
//!   - the instance store (public exercise plus secret expected payload)
//!   - the append-only attempt log
//!   - the session store and its rollup rules
//!
//! Lifecycle invariants enforced here:
//!   - `Instance.answered_at` transitions None -> Some exactly once.
//!   - Session `total` never exceeds `target_count`; reaching it flips the
//!     session to Completed and freezes the missed summary.
//!   - The check-count-mark sequence runs under a single write-lock scope,
//!     so two concurrent validations of the same instance never double-count
//!     (double-click submits happen).

use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::{load_practice_config_from_env, PracticeConfig};
use crate::domain::{
  Answer, Attempt, Exercise, Expected, Instance, MissedQuestion, Session, SessionStatus,
};
use crate::gen::GenRegistry;

pub struct AppState {
  pub registry: GenRegistry,
  pub cfg: PracticeConfig,
  instances: Arc<RwLock<HashMap<String, Instance>>>,
  attempts: Arc<RwLock<Vec<Attempt>>>,
  sessions: Arc<RwLock<HashMap<String, Session>>>,
  // Last archetype served per topic slug, to dodge back-to-back repeats.
  last_archetype: Arc<RwLock<HashMap<String, String>>>,
}

/// What recording a validation did to the surrounding session, if any.
#[derive(Clone, Debug)]
pub struct RecordOutcome {
  pub attempt: Attempt,
  pub first_validation: bool,
  pub session: Option<Session>,
}

impl AppState {
  /// Build state from env: load config, construct the registry.
  #[instrument(level = "info", skip_all)]
  pub fn new() -> Self {
    let cfg = load_practice_config_from_env().unwrap_or_default();
    Self::with_config(cfg)
  }

  pub fn with_config(cfg: PracticeConfig) -> Self {
    let registry = GenRegistry::new();
    info!(
      target: "linalab_backend",
      topics = registry.topics().len(),
      default_difficulty = %cfg.default_difficulty,
      default_target_count = cfg.default_target_count,
      "Startup generator inventory"
    );
    Self {
      registry,
      cfg,
      instances: Arc::new(RwLock::new(HashMap::new())),
      attempts: Arc::new(RwLock::new(Vec::new())),
      sessions: Arc::new(RwLock::new(HashMap::new())),
      last_archetype: Arc::new(RwLock::new(HashMap::new())),
    }
  }

  /// Persist a freshly generated exercise as an unanswered instance.
  #[instrument(level = "debug", skip(self, exercise, expected), fields(topic = %exercise.topic))]
  pub async fn insert_instance(
    &self,
    exercise: Exercise,
    expected: Expected,
    archetype: &'static str,
    session_id: Option<String>,
  ) -> Instance {
    let instance = Instance {
      id: Uuid::new_v4().to_string(),
      session_id,
      exercise,
      expected,
      archetype,
      created_at: Utc::now(),
      answered_at: None,
    };
    self
      .last_archetype
      .write()
      .await
      .insert(instance.exercise.topic.clone(), archetype.to_string());
    self
      .instances
      .write()
      .await
      .insert(instance.id.clone(), instance.clone());
    instance
  }

  #[instrument(level = "debug", skip(self), fields(%id))]
  pub async fn get_instance(&self, id: &str) -> Option<Instance> {
    self.instances.read().await.get(id).cloned()
  }

  pub async fn last_archetype_for(&self, topic: &str) -> Option<String> {
    self.last_archetype.read().await.get(topic).cloned()
  }

  #[instrument(level = "info", skip(self))]
  pub async fn create_session(
    &self,
    topic: String,
    difficulty: String,
    target_count: u32,
  ) -> Session {
    let session = Session {
      id: Uuid::new_v4().to_string(),
      topic,
      difficulty,
      target_count: target_count.max(1),
      total: 0,
      correct: 0,
      status: SessionStatus::Active,
      created_at: Utc::now(),
      completed_at: None,
      missed: Vec::new(),
    };
    self
      .sessions
      .write()
      .await
      .insert(session.id.clone(), session.clone());
    info!(target: "session", id = %session.id, target = session.target_count, "Session started");
    session
  }

  pub async fn get_session(&self, id: &str) -> Option<Session> {
    self.sessions.read().await.get(id).cloned()
  }

  /// Record a validated submission (or reveal) and roll up session totals.
  ///
  /// Counting is gated on the answered_at transition: only the first
  /// validation of an instance moves the session, later attempts are logged
  /// but change nothing. Write locks are taken in a fixed order (instances,
  /// sessions, attempts) and held for the whole update.
  #[instrument(level = "info", skip(self, answer), fields(%instance_id, ok, reveal))]
  pub async fn record_validation(
    &self,
    instance_id: &str,
    answer: Option<Answer>,
    ok: bool,
    reveal: bool,
  ) -> Option<RecordOutcome> {
    let mut instances = self.instances.write().await;
    let mut sessions = self.sessions.write().await;
    let mut attempts = self.attempts.write().await;

    let instance = instances.get_mut(instance_id)?;

    let attempt = Attempt {
      id: Uuid::new_v4().to_string(),
      instance_id: instance_id.to_string(),
      session_id: instance.session_id.clone(),
      answer,
      ok,
      reveal_used: reveal,
      created_at: Utc::now(),
    };
    attempts.push(attempt.clone());

    let first_validation = instance.answered_at.is_none();
    if first_validation {
      instance.answered_at = Some(attempt.created_at);
    }

    let mut session_snapshot = None;
    if let Some(session_id) = instance.session_id.clone() {
      if let Some(session) = sessions.get_mut(&session_id) {
        if first_validation
          && session.status == SessionStatus::Active
          && session.total < session.target_count
        {
          session.total += 1;
          if ok && !reveal {
            session.correct += 1;
          }
          if session.total == session.target_count {
            session.status = SessionStatus::Completed;
            session.completed_at = Some(Utc::now());
            session.missed = missed_summary(&session_id, &attempts, &instances);
            info!(
              target: "session",
              id = %session.id,
              correct = session.correct,
              total = session.total,
              missed = session.missed.len(),
              "Session completed"
            );
          }
        }
        session_snapshot = Some(session.clone());
      }
    }

    Some(RecordOutcome { attempt, first_validation, session: session_snapshot })
  }

  /// Recent attempts of a session, newest first.
  pub async fn session_attempts(&self, session_id: &str, limit: usize) -> Vec<Attempt> {
    let attempts = self.attempts.read().await;
    attempts
      .iter()
      .rev()
      .filter(|a| a.session_id.as_deref() == Some(session_id))
      .take(limit)
      .cloned()
      .collect()
  }
}

/// Missed questions of a session: failed, non-revealed attempts, one entry
/// per instance (first attempt wins), in creation order.
fn missed_summary(
  session_id: &str,
  attempts: &[Attempt],
  instances: &HashMap<String, Instance>,
) -> Vec<MissedQuestion> {
  let mut seen = std::collections::HashSet::new();
  let mut out = Vec::new();
  for attempt in attempts {
    if attempt.session_id.as_deref() != Some(session_id) {
      continue;
    }
    if !seen.insert(attempt.instance_id.clone()) {
      continue;
    }
    if attempt.ok || attempt.reveal_used {
      continue;
    }
    if let Some(instance) = instances.get(&attempt.instance_id) {
      out.push(MissedQuestion {
        instance_id: attempt.instance_id.clone(),
        topic: instance.exercise.topic.clone(),
        title: instance.exercise.title.clone(),
      });
    }
  }
  out
}
