//! Solve requests: provider selection and the single upstream call.
//!
//! The provider is picked once at startup by which key is configured:
//! Gemini first, then OpenAI, else the built-in demo solution (no network).
//! Exactly one attempt per request; the reply is accepted or rejected wholesale.

use tracing::{info, instrument, warn};

use crate::config::Prompts;
use crate::domain::Solution;
use crate::error::{Result, TutorError};
use crate::gemini::Gemini;
use crate::openai::OpenAI;
use crate::schema::parse_solution_text;
use crate::seeds::demo_solution;
use crate::util::{check_base64, split_data_uri};

#[derive(Clone, Debug)]
pub enum Provider {
  Gemini(Gemini),
  OpenAi(OpenAI),
  Demo,
}

impl Provider {
  pub fn from_env() -> Self {
    if let Some(g) = Gemini::from_env() {
      Provider::Gemini(g)
    } else if let Some(o) = OpenAI::from_env() {
      Provider::OpenAi(o)
    } else {
      Provider::Demo
    }
  }

  pub fn name(&self) -> &'static str {
    match self {
      Provider::Gemini(_) => "gemini",
      Provider::OpenAi(_) => "openai",
      Provider::Demo => "demo",
    }
  }
}

#[derive(Clone, Debug)]
pub struct Solver {
  provider: Provider,
  prompts: Prompts,
}

impl Solver {
  pub fn new(provider: Provider, prompts: Prompts) -> Self {
    match &provider {
      Provider::Gemini(g) => info!(target: "tutor_backend", base_url = %g.base_url, model = %g.model, "Gemini enabled."),
      Provider::OpenAi(o) => info!(target: "tutor_backend", base_url = %o.base_url, model = %o.model, "OpenAI enabled."),
      Provider::Demo => warn!(target: "tutor_backend", "No GEMINI_API_KEY / OPENAI_API_KEY. Solve requests return the demo solution."),
    }
    Self { provider, prompts }
  }

  pub fn provider(&self) -> &Provider {
    &self.provider
  }

  /// Solve one image (data URI or raw base64).
  #[instrument(level = "info", skip(self, image), fields(provider = self.provider.name(), image_len = image.map_or(0, str::len)))]
  pub async fn solve(&self, image: Option<&str>) -> Result<Solution> {
    let image = image.map(str::trim).filter(|s| !s.is_empty()).ok_or(TutorError::MissingImage)?;

    let text = match &self.provider {
      Provider::Demo => {
        info!(target: "solve", "No API key configured, returning demo response");
        return Ok(demo_solution());
      }
      Provider::Gemini(g) => {
        let payload = split_data_uri(image);
        check_base64(payload.data)?;
        g.solve_image(&self.prompts.solve_system, &payload).await?
      }
      Provider::OpenAi(o) => {
        let payload = split_data_uri(image);
        check_base64(payload.data)?;
        // OpenAI wants a full data URI even when the client sent raw base64
        let uri = format!("data:{};base64,{}", payload.mime_type, payload.data);
        o.solve_image(&self.prompts.solve_system, &self.prompts.solve_user, &uri).await?
      }
    };

    let solution = parse_solution_text(&text)?;
    info!(
      target: "solve",
      title = %solution.title,
      steps = solution.steps.len(),
      drawings = solution.steps.iter().map(|s| s.drawings.len()).sum::<usize>(),
      "Solution validated"
    );
    Ok(solution)
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use axum::{Json, Router};
  use serde_json::{json, Value};
  use tokio::net::TcpListener;

  /// Local stand-in for an upstream provider that answers every POST with `reply`.
  pub(crate) async fn fake_upstream(status: u16, reply: Value) -> String {
    let app = Router::new().fallback(move || {
      let reply = reply.clone();
      async move {
        (axum::http::StatusCode::from_u16(status).unwrap(), Json(reply))
      }
    });
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
  }

  pub(crate) fn openai_reply(content: &str) -> Value {
    json!({ "choices": [ { "message": { "role": "assistant", "content": content } } ] })
  }

  pub(crate) fn openai_solver(base_url: String) -> Solver {
    let client = OpenAI::new("test-key".into(), base_url, "gpt-4o".into()).unwrap();
    Solver::new(Provider::OpenAi(client), Prompts::default())
  }

  const IMAGE: &str = "data:image/png;base64,iVBORw0KGgo=";

  #[tokio::test]
  async fn demo_provider_returns_demo_without_network() {
    let solver = Solver::new(Provider::Demo, Prompts::default());
    let s = solver.solve(Some(IMAGE)).await.unwrap();
    assert_eq!(s, demo_solution());
  }

  #[tokio::test]
  async fn missing_image_is_rejected_before_any_provider() {
    let solver = Solver::new(Provider::Demo, Prompts::default());
    assert!(matches!(solver.solve(Some("")).await, Err(TutorError::MissingImage)));
    assert!(matches!(solver.solve(None).await, Err(TutorError::MissingImage)));
  }

  #[tokio::test]
  async fn openai_reply_is_parsed_and_validated() {
    let content = json!({
      "title": "求和",
      "steps": [{ "explanation": "相加", "drawings": [{ "id": "a", "type": "math", "x": 1, "y": 2, "content": "1+1=2" }] }],
      "finalAnswer": "2"
    })
    .to_string();
    let base = fake_upstream(200, openai_reply(&content)).await;
    let s = openai_solver(base).solve(Some(IMAGE)).await.unwrap();
    assert_eq!(s.final_answer, "2");
  }

  #[tokio::test]
  async fn non_json_reply_is_an_error() {
    let base = fake_upstream(200, openai_reply("Sorry, I can't help with that.")).await;
    let err = openai_solver(base).solve(Some(IMAGE)).await.unwrap_err();
    assert!(matches!(err, TutorError::NonJsonReply));
  }

  #[tokio::test]
  async fn upstream_error_status_is_reported() {
    let base = fake_upstream(401, json!({ "error": { "message": "Incorrect API key provided" } })).await;
    let err = openai_solver(base).solve(Some(IMAGE)).await.unwrap_err();
    match &err {
      TutorError::Upstream { status, message, .. } => {
        assert_eq!(*status, 401);
        assert!(message.contains("Incorrect API key"));
      }
      other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.user_message(), "API Key 无效，请检查配置。");
  }

  #[tokio::test]
  async fn gemini_reply_with_prose_is_accepted() {
    let text = "这是解答：\n```json\n{\"title\":\"t\",\"steps\":[],\"finalAnswer\":\"a\"}\n```";
    let base = fake_upstream(200, json!({ "candidates": [ { "content": { "parts": [ { "text": text } ] } } ] })).await;
    let client = Gemini::new("k".into(), base, "gemini-flash-latest".into()).unwrap();
    let solver = Solver::new(Provider::Gemini(client), Prompts::default());
    let s = solver.solve(Some(IMAGE)).await.unwrap();
    assert_eq!(s.title, "t");
    assert!(s.steps.is_empty());
  }

  #[tokio::test]
  async fn invalid_base64_never_reaches_upstream() {
    // port 9 (discard) is never contacted: base64 check fails first
    let solver = openai_solver("http://127.0.0.1:9".into());
    let err = solver.solve(Some("data:image/png;base64,@@@")).await.unwrap_err();
    assert!(matches!(err, TutorError::InvalidPayload(_)));
    assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
  }
}
