//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::logic;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(
  ws: WebSocketUpgrade,
  State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
  info!(target: "linalab_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "linalab_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "linalab_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) })
            .to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "linalab_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => {
        let _ = socket.send(Message::Pong(payload)).await;
      }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "linalab_backend", "WebSocket disconnected");
}

#[instrument(level = "info", skip(state, msg))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::NewExercise { topic, difficulty, seed, variant, session_id } => {
      match logic::generate_exercise(state, &topic, &difficulty, seed, variant.as_deref(), session_id)
        .await
      {
        Ok(out) => {
          tracing::info!(target: "exercise", instance = %out.instance_id, "WS new_exercise served");
          ServerWsMessage::Exercise { instance_id: out.instance_id, exercise: out.exercise }
        }
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::SubmitAnswer { instance_id, answer, reveal } => {
      match logic::submit_answer(state, &instance_id, answer, reveal).await {
        Ok(out) => {
          tracing::info!(target: "exercise", instance = %instance_id, ok = out.ok, "WS submit_answer evaluated");
          ServerWsMessage::AnswerResult {
            ok: out.ok,
            rejected: out.rejected,
            expected: out.expected,
            explanation: out.explanation,
            session: out.session,
          }
        }
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::StartSession { topic, difficulty, target_count } => {
      match logic::start_session(state, topic, difficulty, target_count).await {
        Ok(session) => ServerWsMessage::Session { session },
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::SessionStatus { session_id } => {
      match logic::session_detail(state, &session_id).await {
        Ok((session, _)) => ServerWsMessage::Session { session },
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }
  }
}
