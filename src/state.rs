//! Application state: catalog, solver, themes and asset settings.
//!
//! Everything here is built once at startup and read-only afterwards, so
//! handlers share it through a plain `Arc<AppState>`. The built tables are
//! lock-free; only the theme identity cache used during the build holds a
//! `Mutex`.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use tracing::{info, instrument};

use crate::assets::AssetResolver;
use crate::catalog::Catalog;
use crate::config::{load_config_from_env, LimitSettings, PlayerSettings, TutorConfig};
use crate::error::Result;
use crate::protocol::ThemeTable;
use crate::solver::{Provider, Solver};
use crate::theme::{app_theme_builder, ThemeCache, Tokens};

pub struct AppState {
  pub catalog: Catalog,
  pub solver: Solver,
  pub assets: AssetResolver,
  pub themes: ThemeTable,
  pub tokens: Tokens,
  pub player: PlayerSettings,
  pub limits: LimitSettings,
}

impl AppState {
  /// Build state from env: optional TOML config, provider keys, seeded catalog.
  /// Fails if the catalog does not verify or the themes do not build.
  #[instrument(level = "info", skip_all)]
  pub fn from_env() -> Result<Self> {
    let cfg = load_config_from_env().unwrap_or_default();
    Self::build(cfg, Provider::from_env())
  }

  pub fn build(cfg: TutorConfig, provider: Provider) -> Result<Self> {
    let catalog = Catalog::with_bank(cfg.problems);
    catalog.verify()?;

    let themes: BTreeMap<_, _> = app_theme_builder(Arc::new(ThemeCache::default())).build()?;
    let assets = AssetResolver::new(&cfg.assets);
    info!(
      target: "tutor_backend",
      problems = catalog.len(),
      themes = themes.len(),
      url_prefix = ?assets.url_prefix(),
      stagger_ms = cfg.player.reveal_stagger_ms,
      solve_body_bytes = cfg.limits.solve_body_bytes,
      "Application state ready"
    );

    Ok(Self {
      catalog,
      solver: Solver::new(provider, cfg.prompts),
      assets,
      themes,
      tokens: Tokens::standard(),
      player: cfg.player,
      limits: cfg.limits,
    })
  }

  pub fn reveal_stagger(&self) -> Duration {
    Duration::from_millis(self.player.reveal_stagger_ms)
  }
}

#[cfg(test)]
pub(crate) fn demo_state() -> Arc<AppState> {
  Arc::new(AppState::build(TutorConfig::default(), Provider::Demo).unwrap())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Grade, Problem, Semester};

  #[test]
  fn default_state_builds() {
    let state = demo_state();
    assert_eq!(state.solver.provider().name(), "demo");
    assert!(state.themes.contains_key("light"));
    assert_eq!(state.reveal_stagger(), Duration::from_millis(250));
  }

  #[test]
  fn bank_problem_that_breaks_nothing_is_added() {
    let extra = Problem {
      id: "t3-example".into(),
      grade: Grade::Seven,
      semester: Semester::Up,
      category: "有理数".into(),
      title: "数轴上的点".into(),
      difficulty: 2,
      tags: vec![],
      content: "数轴上 $A$ 表示 $-3$".into(),
      steps: vec![],
      method_name: None,
      images: None,
      page_number: None,
    };
    let cfg = TutorConfig { problems: vec![extra], ..TutorConfig::default() };
    let state = AppState::build(cfg, Provider::Demo).unwrap();
    assert!(state.catalog.contains("t3-example"));
  }

  #[test]
  fn bank_problem_with_bad_difficulty_fails_startup() {
    let mut bad = crate::seeds::seed_problems().remove(0);
    bad.id = "t5-example".into();
    bad.difficulty = 9;
    let cfg = TutorConfig { problems: vec![bad], ..TutorConfig::default() };
    assert!(AppState::build(cfg, Provider::Demo).is_err());
  }
}
