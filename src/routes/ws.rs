//! Whiteboard WebSocket: one player per connection.
//!
//! Client messages drive the player; reveal events arrive from the scheduler
//! on a channel and are forwarded as they fire, unless the view has moved on
//! since they were queued. Closing the socket (or sending `close`) drops the
//! player and aborts every pending reveal.

use std::sync::Arc;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::domain::Solution;
use crate::error::Result;
use crate::player::{Player, RevealEvent, RevealScheduler};
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::schema::validate_solution;
use crate::seeds::demo_solution;
use crate::state::AppState;

#[instrument(level = "info", skip(state, ws))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "tutor_backend", "Whiteboard WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Per-connection player state.
struct Session {
  player: Option<Player>,
  scheduler: RevealScheduler,
}

impl Session {
  /// Apply one client message; returns the replies and whether to hang up.
  fn handle(&mut self, msg: ClientWsMessage) -> (Vec<ServerWsMessage>, bool) {
    match msg {
      ClientWsMessage::Ping => (vec![ServerWsMessage::Pong], false),
      ClientWsMessage::OpenDemo => (self.open(Ok(demo_solution())), false),
      ClientWsMessage::Open { solution } => (self.open(validate_solution(solution)), false),
      ClientWsMessage::Next => (self.step(Player::next), false),
      ClientWsMessage::Previous => (self.step(Player::previous), false),
      ClientWsMessage::Close => {
        self.scheduler.cancel();
        self.player = None;
        (vec![ServerWsMessage::Closed], true)
      }
    }
  }

  fn open(&mut self, solution: Result<Solution>) -> Vec<ServerWsMessage> {
    let player = match solution.and_then(Player::new) {
      Ok(p) => p,
      Err(e) => return vec![ServerWsMessage::Error { message: e.user_message() }],
    };
    let generation = self.scheduler.schedule(&player);
    info!(target: "player", title = %player.view().title, steps = player.step_count(), generation, "Player opened");
    let view = player.view();
    self.player = Some(player);
    vec![ServerWsMessage::Step(view)]
  }

  /// Move the player; a no-op move (at either end) still re-sends the view
  /// but does not restart the reveals of the current step.
  fn step(&mut self, mv: fn(&mut Player) -> bool) -> Vec<ServerWsMessage> {
    let Some(player) = self.player.as_mut() else {
      return vec![ServerWsMessage::Error { message: "No solution is open".into() }];
    };
    if mv(player) {
      let generation = self.scheduler.schedule(player);
      debug!(target: "player", index = player.index(), generation, "Step changed");
    }
    vec![ServerWsMessage::Step(player.view())]
  }

  /// A reveal is forwarded only while its generation is live and the player
  /// still shows its step; events queued before a step change are stale.
  fn accepts(&self, ev: &RevealEvent) -> bool {
    self.scheduler.is_current(ev) && self.player.as_ref().is_some_and(|p| p.index() == ev.step)
  }
}

#[instrument(level = "info", skip(socket, state), fields(session = tracing::field::Empty))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  let session_id = Uuid::new_v4().to_string();
  tracing::Span::current().record("session", session_id.as_str());
  info!(target: "tutor_backend", "Whiteboard connected");
  let (tx, mut reveals) = mpsc::unbounded_channel();
  let mut session = Session { player: None, scheduler: RevealScheduler::new(state.reveal_stagger(), tx) };

  let ready = ServerWsMessage::Ready { session_id };
  if send(&mut socket, &ready).await.is_err() {
    return;
  }

  loop {
    tokio::select! {
      incoming = socket.recv() => {
        let Some(Ok(msg)) = incoming else { break };
        match msg {
          Message::Text(txt) => {
            let (replies, hang_up) = match serde_json::from_str::<ClientWsMessage>(&txt) {
              Ok(m) => {
                debug!(target: "player", "WS received: {:?}", &m);
                session.handle(m)
              }
              Err(e) => (vec![ServerWsMessage::Error { message: format!("Invalid JSON: {e}") }], false),
            };
            let mut failed = false;
            for reply in &replies {
              if send(&mut socket, reply).await.is_err() {
                failed = true;
                break;
              }
            }
            if failed || hang_up {
              break;
            }
          }
          Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
          Message::Close(_) => break,
          _ => {}
        }
      }
      Some(ev) = reveals.recv() => {
        if !session.accepts(&ev) {
          debug!(target: "player", step = ev.step, index = ev.index, generation = ev.generation, "Stale reveal dropped");
          continue;
        }
        if send(&mut socket, &ev.into()).await.is_err() {
          break;
        }
      }
    }
  }
  info!(target: "tutor_backend", "Whiteboard disconnected");
}

async fn send(socket: &mut WebSocket, msg: &ServerWsMessage) -> std::result::Result<(), axum::Error> {
  let out = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  });
  socket.send(Message::Text(out)).await.map_err(|e| {
    error!(target: "tutor_backend", error = %e, "WS send error");
    e
  })
}
