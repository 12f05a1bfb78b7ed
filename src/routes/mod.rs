//! Router assembly: HTTP endpoints, whiteboard WebSocket, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
  extract::DefaultBodyLimit,
  routing::{get, post},
  Router,
};
use tower_http::{
  cors::{Any, CorsLayer},
  services::{ServeDir, ServeFile},
  trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - whiteboard WebSocket at `/ws/whiteboard`
/// - `POST /api/solve` (body limit from `[limits]`, photos are large) plus catalog/theme API under `/api/v1/...`
/// - static front end (and `/svg` diagrams) from `static_dir`, also mounted
///   under the secondary hosting prefix when one is configured
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>, static_dir: &str) -> Router {
  let static_service = || {
    ServeDir::new(static_dir)
      .append_index_html_on_directories(true)
      .not_found_service(ServeFile::new(format!("{static_dir}/index.html")))
  };

  let mut router = Router::new()
    .route("/ws/whiteboard", get(ws::ws_upgrade))
    .route(
      "/api/solve",
      post(http::http_post_solve).layer(DefaultBodyLimit::max(state.limits.solve_body_bytes)),
    )
    .route("/api/v1/health", get(http::http_health))
    .route("/api/v1/demo", get(http::http_get_demo))
    .route("/api/v1/chapters", get(http::http_get_chapters))
    .route("/api/v1/problems/:id", get(http::http_get_problem))
    .route("/api/v1/techniques/:id/problems", get(http::http_get_technique_problems))
    .route("/api/v1/quizzes", get(http::http_get_quizzes))
    .route("/api/v1/quizzes/:id", get(http::http_get_quiz))
    .route("/api/v1/static-paths", get(http::http_get_static_paths))
    .route("/api/v1/themes", get(http::http_get_themes))
    .route("/api/v1/themes/:name", get(http::http_get_theme));

  if let Some(prefix) = state.assets.url_prefix() {
    router = router.nest_service(prefix, static_service());
  }

  router
    .with_state(state)
    .layer(
      CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any),
    )
    .layer(
      TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
    .fallback_service(static_service())
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use serde_json::{json, Value};
  use tower::ServiceExt;

  use crate::config::TutorConfig;
  use crate::openai::OpenAI;
  use crate::solver::tests::{fake_upstream, openai_reply};
  use crate::solver::Provider;
  use crate::state::{demo_state, AppState};

  async fn call(req: Request<Body>) -> (StatusCode, Value) {
    call_with(demo_state(), req).await
  }

  async fn call_with(state: Arc<AppState>, req: Request<Body>) -> (StatusCode, Value) {
    let app = build_router(state, "./static");
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
  }

  fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
  }

  fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
      .header("content-type", "application/json")
      .body(Body::from(body.to_string()))
      .unwrap()
  }

  #[tokio::test]
  async fn empty_image_is_a_400() {
    let (status, body) = call(post_json("/api/solve", json!({ "image": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Image is required" }));
  }

  #[tokio::test]
  async fn missing_image_field_is_a_400() {
    let (status, body) = call(post_json("/api/solve", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Image is required");
  }

  #[tokio::test]
  async fn unparseable_body_is_a_500() {
    let req = Request::post("/api/solve")
      .header("content-type", "application/json")
      .body(Body::from("{not json"))
      .unwrap();
    let (status, body) = call(req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
  }

  #[tokio::test]
  async fn photo_sized_body_passes_the_limit() {
    let image = format!("data:image/jpeg;base64,{}", "A".repeat(3 * 1024 * 1024));
    let (status, body) = call(post_json("/api/solve", json!({ "image": image }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["finalAnswer"], "x = -2 或 x = -3");
  }

  #[tokio::test]
  async fn body_over_the_configured_limit_is_refused() {
    let mut cfg = TutorConfig::default();
    cfg.limits.solve_body_bytes = 1024;
    let state = Arc::new(AppState::build(cfg, Provider::Demo).unwrap());
    let image = format!("data:image/jpeg;base64,{}", "A".repeat(4096));
    let (status, _) = call_with(state, post_json("/api/solve", json!({ "image": image }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  }

  async fn openai_state(status: u16, reply: Value) -> Arc<AppState> {
    let base = fake_upstream(status, reply).await;
    let client = OpenAI::new("test-key".into(), base, "gpt-4o".into()).unwrap();
    Arc::new(AppState::build(TutorConfig::default(), Provider::OpenAi(client)).unwrap())
  }

  #[tokio::test]
  async fn reply_without_json_is_a_500_with_error_text() {
    let state = openai_state(200, openai_reply("Sorry, I cannot read this photo.")).await;
    let (status, body) = call_with(state, post_json("/api/solve", json!({ "image": "data:image/png;base64,AAAA" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
  }

  #[tokio::test]
  async fn rejected_api_key_is_a_500_with_friendly_text() {
    let reply = json!({ "error": { "message": "Incorrect API key provided: sk-xxx." } });
    let state = openai_state(401, reply).await;
    let (status, body) = call_with(state, post_json("/api/solve", json!({ "image": "data:image/png;base64,AAAA" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "API Key 无效，请检查配置。" }));
  }

  #[tokio::test]
  async fn solve_without_keys_returns_demo() {
    let (status, body) = call(post_json("/api/solve", json!({ "image": "data:image/png;base64,AAAA" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["finalAnswer"], "x = -2 或 x = -3");
    assert_eq!(body["steps"].as_array().map(Vec::len), Some(4));
  }

  #[tokio::test]
  async fn health_reports_provider() {
    let (status, body) = call(get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "provider": "demo" }));
  }

  #[tokio::test]
  async fn known_problem_has_segments_and_navigation() {
    let (status, body) = call(get("/api/v1/problems/t1-example")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["problem"]["id"], "t1-example");
    assert!(body["segments"].as_array().is_some_and(|s| !s.is_empty()));
    assert_eq!(body["navigation"]["techniqueId"], "t1");
    assert_eq!(body["navigation"]["training"].as_array().map(Vec::len), Some(3));
  }

  #[tokio::test]
  async fn figures_follow_the_page_prefix() {
    let (_, plain) = call(get("/api/v1/problems/t19-example")).await;
    assert_eq!(plain["figures"][0].as_str().map(|s| s.starts_with("/svg/")), Some(true));
    let (_, prefixed) = call(get("/api/v1/problems/t19-example?page=/myazhou/problem/t19-example")).await;
    assert_eq!(prefixed["figures"][0].as_str().map(|s| s.starts_with("/myazhou/svg/")), Some(true));
  }

  #[tokio::test]
  async fn unknown_problem_is_a_404() {
    let (status, body) = call(get("/api/v1/problems/t99-example")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("t99-example")));
  }

  #[tokio::test]
  async fn technique_listing_uses_prefix_match() {
    let (status, body) = call(get("/api/v1/techniques/t1/problems")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["problems"].as_array().unwrap().iter().filter_map(|p| p["id"].as_str()).collect();
    assert!(ids.contains(&"t1-example"));
    assert!(ids.contains(&"t10-example"));
  }

  #[tokio::test]
  async fn quiz_lists_sequential_problems() {
    let (status, body) = call(get("/api/v1/quizzes/z1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["problems"].as_array().map(Vec::len), Some(3));
    let (status, _) = call(get("/api/v1/quizzes/z9")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn static_paths_cover_problems_and_quizzes() {
    let (_, body) = call(get("/api/v1/static-paths")).await;
    let paths = body.as_array().unwrap();
    assert!(paths.contains(&json!({ "kind": "problem", "id": "t1-example" })));
    assert!(paths.contains(&json!({ "kind": "quiz", "id": "final" })));
  }

  #[tokio::test]
  async fn themes_are_listed_and_fetchable() {
    let (_, list) = call(get("/api/v1/themes")).await;
    assert!(list["themes"].as_array().unwrap().contains(&json!("dark_accent")));
    assert_eq!(list["tokens"]["radius"]["4"], 9.0);
    let (status, one) = call(get("/api/v1/themes/light")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one["theme"]["background"], "#f8f8f8");
    let (status, _) = call(get("/api/v1/themes/sepia")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
