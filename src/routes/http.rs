//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; errors map to JSON bodies with a 4xx status.

use std::sync::Arc;

use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument, warn};

use crate::logic::{self, ApiError};
use crate::protocol::*;
use crate::state::AppState;

impl IntoResponse for ApiError {
  fn into_response(self) -> axum::response::Response {
    let status = match &self {
      ApiError::Dispatch(_) => StatusCode::BAD_REQUEST,
      ApiError::UnknownInstance(_) | ApiError::UnknownSession(_) => StatusCode::NOT_FOUND,
    };
    warn!(target: "linalab_backend", error = %self, "Request rejected");
    (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_topics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(TopicsOut { topics: state.registry.topics() })
}

#[instrument(level = "info", skip(state, q), fields(topic = %q.topic, difficulty = %q.difficulty))]
pub async fn http_get_exercise(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ExerciseQuery>,
) -> Result<Json<ExerciseOut>, ApiError> {
  let out = logic::generate_exercise(
    &state,
    &q.topic,
    &q.difficulty,
    q.seed,
    q.variant.as_deref(),
    q.session_id,
  )
  .await?;
  info!(target: "exercise", instance = %out.instance_id, "HTTP exercise served");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(instance = %body.instance_id, reveal = body.reveal))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<AnswerOut>, ApiError> {
  let out = logic::submit_answer(&state, &body.instance_id, body.answer, body.reveal).await?;
  info!(target: "exercise", instance = %body.instance_id, ok = out.ok, rejected = out.rejected, "HTTP answer evaluated");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(topic = %body.topic))]
pub async fn http_post_session(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SessionIn>,
) -> Result<Json<SessionOut>, ApiError> {
  let out = logic::start_session(&state, body.topic, body.difficulty, body.target_count).await?;
  Ok(Json(out))
}

#[instrument(level = "info", skip(state), fields(session = %id))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<SessionDetailOut>, ApiError> {
  let (session, recent_attempts) = logic::session_detail(&state, &id).await?;
  Ok(Json(SessionDetailOut { session, recent_attempts }))
}
