//! Diagram assets: logical SVG names, the problem → figure table and URL resolution.
//!
//! The site is hosted under two roots (`/` and a configurable prefix such as
//! `/myazhou`), so a URL only gets the prefix when the page asking for it
//! lives under that prefix.

use serde::Deserialize;
use tracing::warn;

/// Logical diagram name → file name under the SVG base directory.
const SVG_FILES: &[(&str, &str)] = &[
  // number lines
  ("number-line-basic", "number-line-basic.svg"),
  ("number-line-circle", "number-line-circle.svg"),
  ("number-line-ab", "number-line-ab.svg"),
  ("number-line-ab-2", "number-line-ab-2.svg"),
  ("number-line-ab-3", "number-line-ab-3.svg"),
  ("number-line-abcd", "number-line-abcd.svg"),
  ("triangle-flip", "triangle-flip.svg"),
  ("moving-points", "moving-points.svg"),
  ("circle-numbers", "circle-numbers.svg"),
  ("folding-line", "folding-line.svg"),
  ("jumping-point", "jumping-point.svg"),
  ("two-circles", "two-circles.svg"),
  // shapes
  ("area-square", "area-square.svg"),
  ("chess-pattern", "chess-pattern.svg"),
  ("house-plan", "house-plan.svg"),
  ("cube", "cube.svg"),
  ("matchstick-1", "matchstick-1.svg"),
  ("matchstick-2", "matchstick-2.svg"),
  ("matchstick-3", "matchstick-3.svg"),
  ("matchstick-4", "matchstick-4.svg"),
  ("polygon-3", "polygon-3.svg"),
  ("polygon-4", "polygon-4.svg"),
  ("polygon-5", "polygon-5.svg"),
  ("polygon-6", "polygon-6.svg"),
  // angles and segments
  ("angle-rays-5", "angle-rays-5.svg"),
  ("angle-rays-4", "angle-rays-4.svg"),
  ("angle-rays-3", "angle-rays-3.svg"),
  ("angle-bisector", "angle-bisector.svg"),
  ("rotating-angle", "rotating-angle.svg"),
  ("segment-abc", "segment-abc.svg"),
  ("segment-midpoints", "segment-midpoints.svg"),
  ("triangle-lines", "triangle-lines.svg"),
  ("angle-aob-150", "angle-aob-150.svg"),
  ("angle-aob-120", "angle-aob-120.svg"),
  ("rays-abcde", "rays-abcde.svg"),
  // final review
  ("final-number-line-1", "final-number-line-1.svg"),
  ("final-cube", "final-cube.svg"),
  ("final-triangles", "final-triangles.svg"),
  ("final-angle-12", "final-angle-12.svg"),
  ("final-number-line-15", "final-number-line-15.svg"),
  ("final-segment-16", "final-segment-16.svg"),
  ("final-angle-16-2", "final-angle-16-2.svg"),
  ("final-angle-16-3", "final-angle-16-3.svg"),
];

/// Problem id → diagrams shown with it, in display order.
const PROBLEM_FIGURES: &[(&str, &[&str])] = &[
  ("t1-example", &["number-line-circle"]),
  ("t1-train-1", &["number-line-circle"]),
  ("t1-train-2", &["number-line-ab"]),
  ("t1-train-3", &["number-line-basic"]),
  ("t2-example", &["triangle-flip"]),
  ("t2-train-1", &["circle-numbers"]),
  ("t4-example", &["number-line-ab"]),
  ("t4-train-1", &["number-line-ab"]),
  ("t12-example", &["folding-line"]),
  ("t12-train-1", &["folding-line"]),
  ("t19-example", &["area-square", "cube"]),
  ("t32-example", &["segment-midpoints"]),
  ("z1-quiz-1", &["number-line-basic"]),
  ("z1-quiz-2", &["number-line-ab"]),
  ("z6-quiz-1", &["angle-aob-120"]),
  ("final-quiz-1", &["final-number-line-1"]),
  ("final-quiz-2", &["final-cube"]),
  ("final-quiz-12", &["final-angle-12"]),
  ("final-quiz-15", &["final-number-line-15"]),
  ("final-quiz-16", &["final-segment-16", "final-angle-16-2", "final-angle-16-3"]),
];

pub fn svg_file_name(name: &str) -> Option<&'static str> {
  SVG_FILES.iter().find(|(n, _)| *n == name).map(|(_, f)| *f)
}

/// Diagrams attached to a problem; empty when it has none.
pub fn figures_for(problem_id: &str) -> &'static [&'static str] {
  PROBLEM_FIGURES
    .iter()
    .find(|(id, _)| *id == problem_id)
    .map(|(_, names)| *names)
    .unwrap_or(&[])
}

/// Every (problem id, diagram name) pair in the figure table.
pub fn all_figure_refs() -> impl Iterator<Item = (&'static str, &'static str)> {
  PROBLEM_FIGURES.iter().flat_map(|(id, names)| names.iter().map(move |n| (*id, *n)))
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
  /// URL directory the SVG files are served from.
  pub base_dir: String,
  /// Secondary hosting root (e.g. "/myazhou"); empty disables it.
  pub url_prefix: String,
}

impl Default for AssetSettings {
  fn default() -> Self {
    Self { base_dir: "/svg".into(), url_prefix: "/myazhou".into() }
  }
}

#[derive(Clone, Debug)]
pub struct AssetResolver {
  base_dir: String,
  url_prefix: Option<String>,
}

impl AssetResolver {
  pub fn new(settings: &AssetSettings) -> Self {
    let base_dir = format!("/{}", settings.base_dir.trim_matches('/'));
    let prefix = settings.url_prefix.trim_end_matches('/');
    let url_prefix = if prefix.is_empty() {
      None
    } else if prefix.starts_with('/') {
      Some(prefix.to_string())
    } else {
      Some(format!("/{prefix}"))
    };
    Self { base_dir, url_prefix }
  }

  pub fn url_prefix(&self) -> Option<&str> {
    self.url_prefix.as_deref()
  }

  /// URL of a diagram as seen from `page_path`. Unknown names resolve to `None`.
  pub fn resolve(&self, name: &str, page_path: &str) -> Option<String> {
    let Some(file) = svg_file_name(name) else {
      warn!(target: "catalog", %name, "SVG not found");
      return None;
    };
    let prefix = match &self.url_prefix {
      Some(p) if page_path == p || page_path.starts_with(&format!("{p}/")) => p.as_str(),
      _ => "",
    };
    Some(format!("{prefix}{}/{file}", self.base_dir))
  }

  /// Resolved URLs of every figure attached to a problem.
  pub fn figure_urls(&self, problem_id: &str, page_path: &str) -> Vec<String> {
    figures_for(problem_id)
      .iter()
      .filter_map(|name| self.resolve(name, page_path))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn resolver() -> AssetResolver {
    AssetResolver::new(&AssetSettings::default())
  }

  #[test]
  fn resolves_under_plain_root() {
    assert_eq!(
      resolver().resolve("number-line-ab", "/problem/t1-example").as_deref(),
      Some("/svg/number-line-ab.svg")
    );
  }

  #[test]
  fn applies_prefix_only_under_prefixed_pages() {
    let r = resolver();
    assert_eq!(
      r.resolve("cube", "/myazhou/problem/t19-example").as_deref(),
      Some("/myazhou/svg/cube.svg")
    );
    // a look-alike path must not pick up the prefix
    assert_eq!(r.resolve("cube", "/myazhouX/problem").as_deref(), Some("/svg/cube.svg"));
  }

  #[test]
  fn unknown_names_resolve_to_none() {
    assert_eq!(resolver().resolve("no-such-figure", "/"), None);
  }

  #[test]
  fn figure_table_only_references_known_files() {
    for (id, name) in all_figure_refs() {
      assert!(svg_file_name(name).is_some(), "{id} references {name}");
    }
  }

  #[test]
  fn final_review_figures_resolve() {
    let urls = resolver().figure_urls("final-quiz-16", "/myazhou/problem/final-quiz-16");
    assert_eq!(
      urls,
      vec![
        "/myazhou/svg/final-segment-16.svg",
        "/myazhou/svg/final-angle-16-2.svg",
        "/myazhou/svg/final-angle-16-3.svg",
      ]
    );
    assert_eq!(svg_file_name("final-angle-12"), Some("final-angle-12.svg"));
    assert_eq!(svg_file_name("final-number-line-15"), Some("final-number-line-15.svg"));
  }

  #[test]
  fn problems_without_figures_get_an_empty_list() {
    assert!(figures_for("t10-example").is_empty());
    assert_eq!(resolver().figure_urls("t19-example", "/").len(), 2);
  }

  #[test]
  fn settings_normalise_slashes() {
    let r = AssetResolver::new(&AssetSettings { base_dir: "svg/".into(), url_prefix: "site/".into() });
    assert_eq!(r.url_prefix(), Some("/site"));
    assert_eq!(r.resolve("cube", "/site/x").as_deref(), Some("/site/svg/cube.svg"));
  }
}
