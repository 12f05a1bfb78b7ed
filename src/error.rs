//! Error type shared by the catalog, the solver and the HTTP layer.
//!
//! Every variant maps to one HTTP status in `IntoResponse`; handlers just `?`.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde::Serialize;
use tracing::error;

pub type Result<T> = std::result::Result<T, TutorError>;

#[derive(Debug, thiserror::Error)]
pub enum TutorError {
  /// The solve request carried no image (absent or empty string).
  #[error("Image is required")]
  MissingImage,

  /// Request body present but unusable (bad JSON, bad base64, ...).
  /// Only a missing image is the caller's 400; this one is a 500 like any
  /// other failed solve.
  #[error("{0}")]
  InvalidPayload(String),

  /// Catalog miss: unknown problem, technique, quiz or theme id.
  #[error("{kind} not found: {id}")]
  NotFound { kind: &'static str, id: String },

  /// Upstream AI provider failed (transport error or non-2xx status).
  #[error("{provider} HTTP {status}: {message}")]
  Upstream { provider: &'static str, status: u16, message: String },

  #[error("{provider} request failed: {message}")]
  Transport { provider: &'static str, message: String },

  /// Provider reply did not contain a JSON object at all.
  #[error("AI 返回了非 JSON 格式的内容，请重试。")]
  NonJsonReply,

  /// Provider reply contained something brace-shaped that is not valid JSON.
  #[error("AI 返回的数据格式有误，请重试。")]
  MalformedJson(#[source] serde_json::Error),

  /// JSON parsed but does not match the whiteboard solution shape.
  #[error("AI response failed validation: {0}")]
  Validation(String),

  /// Static catalog or asset tables are inconsistent (startup only).
  #[error("catalog verification failed: {0}")]
  Catalog(String),

  #[error("theme build failed: {0}")]
  Theme(String),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

impl TutorError {
  pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
    Self::NotFound { kind, id: id.into() }
  }

  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::MissingImage => StatusCode::BAD_REQUEST,
      Self::NotFound { .. } => StatusCode::NOT_FOUND,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  /// Message shown to end users. Known upstream failures get friendlier text.
  pub fn user_message(&self) -> String {
    match self {
      Self::Upstream { .. } | Self::Transport { .. } => friendly_message(&self.to_string()),
      _ => self.to_string(),
    }
  }
}

/// Remap a few well-known provider error texts to something a student can act on.
/// Anything unrecognised is returned unchanged.
pub fn friendly_message(raw: &str) -> String {
  if raw.contains("Generative Language API has not been used") {
    "AI 服务尚未启用。请访问 Google Cloud 控制台启用 \"Generative Language API\"。".into()
  } else if raw.contains("API key not valid") || raw.contains("Incorrect API key") {
    "API Key 无效，请检查配置。".into()
  } else if raw.contains("404") {
    "AI 模型加载失败 (404)。请确保 API Key 正确且模型可用。".into()
  } else if raw.trim().is_empty() {
    "无法解决该题目，请检查网络或重试。".into()
  } else {
    raw.to_string()
  }
}

#[derive(Serialize)]
pub struct ErrorBody {
  pub error: String,
}

impl IntoResponse for TutorError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      error!(target: "tutor_backend", error = %self, "Request failed");
    }
    (status, Json(ErrorBody { error: self.user_message() })).into_response()
  }
}
