//! HTTP endpoint handlers. These are thin wrappers that forward to the catalog,
//! the solver and the theme table; errors flow out through `TutorError`.

use std::sync::Arc;

use axum::{
  extract::{rejection::JsonRejection, Path, Query, State},
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument};

use crate::error::{Result, TutorError};
use crate::markup::segments;
use crate::protocol::*;
use crate::seeds::demo_solution;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, provider: state.solver.provider().name() })
}

#[instrument(level = "info", skip_all)]
pub async fn http_post_solve(
  State(state): State<Arc<AppState>>,
  body: std::result::Result<Json<SolveIn>, JsonRejection>,
) -> Result<Response> {
  let Json(body) = body.map_err(|e| TutorError::InvalidPayload(e.body_text()))?;
  let solution = state.solver.solve(body.image.as_deref()).await?;
  info!(target: "solve", title = %solution.title, steps = solution.steps.len(), "HTTP solve served");
  Ok(Json(solution).into_response())
}

#[instrument(level = "info")]
pub async fn http_get_demo() -> impl IntoResponse {
  Json(demo_solution())
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_chapters(State(state): State<Arc<AppState>>) -> Response {
  Json(state.catalog.chapters()).into_response()
}

#[instrument(level = "info", skip(state, q))]
pub async fn http_get_problem(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Query(q): Query<PageQuery>,
) -> Result<Response> {
  let problem = state.catalog.get_problem(&id)?;
  let page = q.page.unwrap_or_else(|| format!("/problem/{id}"));
  let out = ProblemOut {
    problem,
    segments: segments(&problem.content),
    step_segments: problem.steps.iter().map(|s| segments(&s.content)).collect(),
    figures: state.assets.figure_urls(&id, &page),
    navigation: state.catalog.navigation(&id)?,
  };
  info!(target: "catalog", %id, figures = out.figures.len(), training = out.navigation.training.len(), "HTTP problem served");
  Ok(Json(out).into_response())
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_technique_problems(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Response> {
  state.catalog.technique(&id)?;
  let problems = state.catalog.problems_by_technique(&id);
  info!(target: "catalog", technique = %id, count = problems.len(), "HTTP technique listing served");
  Ok(Json(TechniqueProblemsOut { technique_id: &id, problems }).into_response())
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_quizzes(State(state): State<Arc<AppState>>) -> Response {
  Json(state.catalog.quizzes()).into_response()
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_quiz(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<Response> {
  let quiz = state.catalog.quiz(&id)?;
  let problems = state.catalog.quiz_problems(&id);
  info!(target: "catalog", quiz = %id, count = problems.len(), "HTTP quiz served");
  Ok(Json(QuizOut { quiz, problems }).into_response())
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_static_paths(State(state): State<Arc<AppState>>) -> Response {
  Json(state.catalog.static_paths()).into_response()
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_themes(State(state): State<Arc<AppState>>) -> Response {
  let themes = state.themes.keys().map(String::as_str).collect();
  Json(ThemesOut { themes, tokens: &state.tokens }).into_response()
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_theme(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> Result<Response> {
  let theme = state.themes.get(&name).cloned().ok_or_else(|| TutorError::not_found("theme", name.as_str()))?;
  Ok(Json(ThemeOut { name: &name, theme }).into_response())
}
