//! Minimal Google Gemini client (REST `generateContent`).
//!
//! The fixed prompt goes in `systemInstruction`; the only user part is the
//! image as `inlineData`. The reply is free text that should contain one JSON object.
//!
//! NOTE: The API key travels as a query parameter; it is never logged.

use std::time::{Duration, Instant};

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{Result, TutorError};
use crate::util::{trunc_for_log, ImagePayload};

const PROVIDER: &str = "gemini";

#[derive(Clone)]
pub struct Gemini {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl std::fmt::Debug for Gemini {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Gemini").field("base_url", &self.base_url).field("model", &self.model).finish()
  }
}

impl Gemini {
  /// Construct the client if we find GEMINI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
    let base_url = std::env::var("GEMINI_BASE_URL")
      .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into());
    let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-flash-latest".into());
    Self::new(api_key, base_url, model)
  }

  pub fn new(api_key: String, base_url: String, model: String) -> Option<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(60))
      .build()
      .ok()?;
    Some(Self { client, api_key, base_url: base_url.trim_end_matches('/').into(), model })
  }

  #[instrument(level = "info", skip(self, system, image), fields(model = %self.model, mime = %image.mime_type, image_len = image.data.len()))]
  pub async fn solve_image(&self, system: &str, image: &ImagePayload<'_>) -> Result<String> {
    let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
    let req = GenerateRequest {
      system_instruction: Content { parts: vec![Part::Text { text: system.into() }] },
      contents: vec![Content {
        parts: vec![Part::InlineData {
          inline_data: InlineData { mime_type: image.mime_type.into(), data: image.data.into() },
        }],
      }],
    };

    let start = Instant::now();
    let res = self.client.post(&url)
      .query(&[("key", self.api_key.as_str())])
      .header(USER_AGENT, "mathtutor-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .json(&req).send().await
      .map_err(|e| TutorError::Transport { provider: PROVIDER, message: e.without_url().to_string() })?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let message = extract_gemini_error(&body).unwrap_or_else(|| trunc_for_log(&body, 300));
      return Err(TutorError::Upstream { provider: PROVIDER, status: status.as_u16(), message });
    }

    let body: GenerateResponse = res.json().await
      .map_err(|e| TutorError::Transport { provider: PROVIDER, message: e.without_url().to_string() })?;
    if let Some(usage) = &body.usage_metadata {
      info!(prompt_tokens = ?usage.prompt_token_count, completion_tokens = ?usage.candidates_token_count, total_tokens = ?usage.total_token_count, "Gemini usage");
    }
    let text = body.text();
    info!(elapsed = ?start.elapsed(), reply_len = text.len(), "Gemini reply received");
    Ok(text)
  }
}

// --- generateContent DTOs ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
  system_instruction: Content,
  contents: Vec<Content>,
}
#[derive(Serialize, Deserialize, Default)]
struct Content {
  #[serde(default)]
  parts: Vec<Part>,
}
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum Part {
  Text { text: String },
  #[serde(rename_all = "camelCase")]
  InlineData { inline_data: InlineData },
}
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData { mime_type: String, data: String }

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
  #[serde(default)] candidates: Vec<Candidate>,
  #[serde(default)] usage_metadata: Option<UsageMetadata>,
}
#[derive(Deserialize)]
struct Candidate {
  #[serde(default)] content: Content,
}
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
  #[serde(default)] prompt_token_count: Option<u32>,
  #[serde(default)] candidates_token_count: Option<u32>,
  #[serde(default)] total_token_count: Option<u32>,
}

impl GenerateResponse {
  /// Concatenated text parts of the first candidate.
  fn text(&self) -> String {
    self.candidates.first()
      .map(|c| c.content.parts.iter().filter_map(|p| match p {
        Part::Text { text } => Some(text.as_str()),
        Part::InlineData { .. } => None,
      }).collect::<String>())
      .unwrap_or_default()
  }
}

fn extract_gemini_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}
