//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::Navigation;
use crate::domain::{Problem, Quiz};
use crate::markup::Segment;
use crate::player::{RevealEvent, StepView};
use crate::theme::{Theme, Tokens};

/// Messages the whiteboard client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
  Ping,
  /// Play a solution the client already holds (e.g. the reply of `/api/solve`).
  /// Kept raw so it goes through the same shape validation as provider replies.
  Open { solution: serde_json::Value },
  OpenDemo,
  Next,
  Previous,
  Close,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
  Pong,
  #[serde(rename_all = "camelCase")]
  Ready { session_id: String },
  Step(StepView),
  #[serde(rename_all = "camelCase")]
  Reveal { step: usize, index: usize, drawing_id: String, svg: String },
  Closed,
  Error { message: String },
}

impl From<RevealEvent> for ServerWsMessage {
  fn from(ev: RevealEvent) -> Self {
    ServerWsMessage::Reveal { step: ev.step, index: ev.index, drawing_id: ev.drawing_id, svg: ev.svg }
  }
}

// ---- HTTP DTOs ----

#[derive(Debug, Serialize)]
pub struct HealthOut {
  pub ok: bool,
  pub provider: &'static str,
}

/// `image` stays optional so an absent field reports "Image is required"
/// instead of a deserialization error.
#[derive(Debug, Deserialize)]
pub struct SolveIn {
  #[serde(default)]
  pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
  /// Path of the page asking, used to pick the asset URL prefix.
  #[serde(default)]
  pub page: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemOut<'a> {
  pub problem: &'a Problem,
  pub segments: Vec<Segment>,
  pub step_segments: Vec<Vec<Segment>>,
  pub figures: Vec<String>,
  pub navigation: Navigation<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechniqueProblemsOut<'a> {
  pub technique_id: &'a str,
  pub problems: Vec<&'a Problem>,
}

#[derive(Debug, Serialize)]
pub struct QuizOut<'a> {
  pub quiz: &'a Quiz,
  pub problems: Vec<&'a Problem>,
}

#[derive(Debug, Serialize)]
pub struct ThemesOut<'a> {
  pub themes: Vec<&'a str>,
  pub tokens: &'a Tokens,
}

#[derive(Debug, Serialize)]
pub struct ThemeOut<'a> {
  pub name: &'a str,
  pub theme: Arc<Theme>,
}

pub type ThemeTable = BTreeMap<String, Arc<Theme>>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn client_messages_use_snake_case_tags() {
    assert!(matches!(serde_json::from_str::<ClientWsMessage>(r#"{"type":"open_demo"}"#), Ok(ClientWsMessage::OpenDemo)));
    assert!(matches!(serde_json::from_str::<ClientWsMessage>(r#"{"type":"next"}"#), Ok(ClientWsMessage::Next)));
    let open = r#"{"type":"open","solution":{"title":"t","steps":[],"finalAnswer":"a"}}"#;
    assert!(matches!(serde_json::from_str::<ClientWsMessage>(open), Ok(ClientWsMessage::Open { .. })));
  }

  #[test]
  fn step_message_is_flattened_camel_case() {
    let msg = ServerWsMessage::Step(StepView {
      title: "t".into(),
      index: 1,
      count: 2,
      explanation: "e".into(),
      final_answer: Some("x".into()),
      can_previous: true,
      can_next: false,
    });
    let v = serde_json::to_value(&msg).unwrap();
    assert_eq!(v["type"], "step");
    assert_eq!(v["finalAnswer"], "x");
    assert_eq!(v["canNext"], false);
  }

  #[test]
  fn reveal_message_names() {
    let v = serde_json::to_value(ServerWsMessage::Reveal {
      step: 0,
      index: 1,
      drawing_id: "a".into(),
      svg: "<g/>".into(),
    })
    .unwrap();
    assert_eq!(v["type"], "reveal");
    assert_eq!(v["drawingId"], "a");
  }
}
