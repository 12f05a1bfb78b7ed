//! Problem catalog: immutable, built once at startup, shared read-only.
//!
//! Lookups:
//!   - by id (`get_problem`)
//!   - by technique prefix (`problems_by_technique`, literal prefix match)
//!   - by quiz (`quiz_problems`, sequential `{quiz}-quiz-N` ids until the first gap)
//!
//! `verify` enforces the pre-rendering contract: every statically enumerated
//! page id must resolve, otherwise the server refuses to start.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{error, info, instrument};

use crate::assets;
use crate::domain::{Chapter, Problem, Quiz, Technique};
use crate::error::{Result, TutorError};
use crate::seeds::{grade7_chapters, seed_problems, QUIZZES};

#[derive(Debug)]
pub struct Catalog {
  problems: Vec<Problem>,
  index: HashMap<String, usize>,
  chapters: Vec<Chapter>,
}

/// Neighbours of a problem inside its technique.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation<'a> {
  pub technique_id: Option<String>,
  pub next: Option<&'a Problem>,
  pub training: Vec<&'a Problem>,
}

/// Page kinds that get pre-rendered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum StaticPath {
  Problem(String),
  Quiz(String),
}

impl Catalog {
  /// Built-in seeds only.
  #[cfg(test)]
  pub fn seeded() -> Self {
    Self::from_parts(seed_problems(), grade7_chapters())
  }

  /// Seeds plus an extra bank (config). Bank entries never overwrite a seed id.
  #[instrument(level = "info", skip_all, fields(bank_len = bank.len()))]
  pub fn with_bank(bank: Vec<Problem>) -> Self {
    let mut problems = seed_problems();
    for p in bank {
      if problems.iter().any(|existing| existing.id == p.id) {
        error!(target: "catalog", id = %p.id, "Skipping bank problem: duplicate id.");
        continue;
      }
      problems.push(p);
    }
    Self::from_parts(problems, grade7_chapters())
  }

  pub fn from_parts(problems: Vec<Problem>, chapters: Vec<Chapter>) -> Self {
    let index = problems
      .iter()
      .enumerate()
      .map(|(i, p)| (p.id.clone(), i))
      .collect();
    let catalog = Self { problems, index, chapters };
    info!(
      target: "catalog",
      problems = catalog.problems.len(),
      chapters = catalog.chapters.len(),
      "Catalog loaded"
    );
    catalog
  }

  pub fn len(&self) -> usize {
    self.problems.len()
  }

  #[cfg(test)]
  pub fn problems(&self) -> &[Problem] {
    &self.problems
  }

  pub fn chapters(&self) -> &[Chapter] {
    &self.chapters
  }

  pub fn get_problem(&self, id: &str) -> Result<&Problem> {
    self
      .index
      .get(id)
      .map(|&i| &self.problems[i])
      .ok_or_else(|| TutorError::not_found("problem", id))
  }

  #[cfg(test)]
  pub fn contains(&self, id: &str) -> bool {
    self.index.contains_key(id)
  }

  /// All problems whose id starts with `prefix`, in catalog order.
  pub fn problems_by_technique(&self, prefix: &str) -> Vec<&Problem> {
    self.problems.iter().filter(|p| p.id.starts_with(prefix)).collect()
  }

  pub fn technique(&self, id: &str) -> Result<&Technique> {
    self
      .chapters
      .iter()
      .flat_map(|c| c.techniques.iter())
      .find(|t| t.id == id)
      .ok_or_else(|| TutorError::not_found("technique", id))
  }

  pub fn quizzes(&self) -> &'static [Quiz] {
    &QUIZZES
  }

  pub fn quiz(&self, id: &str) -> Result<&'static Quiz> {
    QUIZZES
      .iter()
      .find(|q| q.id == id)
      .ok_or_else(|| TutorError::not_found("quiz", id))
  }

  /// `{quiz}-quiz-1`, `{quiz}-quiz-2`, ... stopping at the first missing id.
  pub fn quiz_problems(&self, quiz_id: &str) -> Vec<&Problem> {
    (1..)
      .map(|n| format!("{quiz_id}-quiz-{n}"))
      .map_while(|id| self.get_problem(&id).ok())
      .collect()
  }

  /// Next problem within the same technique plus that technique's training set.
  pub fn navigation(&self, problem_id: &str) -> Result<Navigation<'_>> {
    let problem = self.get_problem(problem_id)?;
    let Some(tid) = technique_of(&problem.id) else {
      return Ok(Navigation { technique_id: None, next: None, training: Vec::new() });
    };
    let siblings: Vec<&Problem> = self
      .problems
      .iter()
      .filter(|p| technique_of(&p.id) == Some(tid))
      .collect();
    let next = siblings
      .iter()
      .position(|p| p.id == problem.id)
      .and_then(|i| siblings.get(i + 1).copied());
    let training = siblings.into_iter().filter(|p| p.id.contains("-train-")).collect();
    Ok(Navigation { technique_id: Some(tid.to_string()), next, training })
  }

  /// Every page id that gets pre-rendered: problem pages then quiz pages.
  pub fn static_paths(&self) -> Vec<StaticPath> {
    self
      .problems
      .iter()
      .map(|p| StaticPath::Problem(p.id.clone()))
      .chain(QUIZZES.iter().map(|q| StaticPath::Quiz(q.id.to_string())))
      .collect()
  }

  /// Fails when a pre-rendered page would be missing or broken.
  #[instrument(level = "info", skip(self))]
  pub fn verify(&self) -> Result<()> {
    let mut problems = Vec::new();

    for path in self.static_paths() {
      match &path {
        StaticPath::Problem(id) => {
          if let Err(e) = self.get_problem(id) {
            problems.push(e.to_string());
          }
        }
        StaticPath::Quiz(id) => {
          if self.quiz_problems(id).is_empty() {
            problems.push(format!("quiz {id} has no problems ({id}-quiz-1 missing)"));
          }
        }
      }
    }

    for p in &self.problems {
      if !(1..=5).contains(&p.difficulty) {
        problems.push(format!("problem {} has difficulty {} outside 1..=5", p.id, p.difficulty));
      }
    }

    for (id, name) in assets::all_figure_refs() {
      if assets::svg_file_name(name).is_none() {
        problems.push(format!("problem {id} references unknown figure {name}"));
      }
    }

    if problems.is_empty() {
      info!(target: "catalog", pages = self.static_paths().len(), "Static paths verified");
      Ok(())
    } else {
      Err(TutorError::Catalog(problems.join("; ")))
    }
  }
}

/// Leading technique id of a problem id: `t12-train-1` → `t12`.
pub fn technique_of(problem_id: &str) -> Option<&str> {
  let rest = problem_id.strip_prefix('t')?;
  let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
  if digits == 0 {
    None
  } else {
    Some(&problem_id[..1 + digits])
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Grade, Semester};

  fn extra(id: &str, difficulty: u8) -> Problem {
    Problem {
      id: id.into(),
      grade: Grade::Seven,
      semester: Semester::Up,
      category: "测试".into(),
      title: id.into(),
      difficulty,
      tags: vec![],
      content: "1 + 1".into(),
      steps: vec![],
      method_name: None,
      images: None,
      page_number: None,
    }
  }

  #[test]
  fn loads_problem_by_id() {
    let catalog = Catalog::seeded();
    let p = catalog.get_problem("t1-example").unwrap();
    assert_eq!(p.id, "t1-example");
  }

  #[test]
  fn unknown_id_is_not_found() {
    let err = Catalog::seeded().get_problem("t99-example").unwrap_err();
    assert!(matches!(err, TutorError::NotFound { kind: "problem", .. }));
  }

  #[test]
  fn technique_prefix_returns_all_and_only_matches_in_order() {
    let catalog = Catalog::seeded();
    let found = catalog.problems_by_technique("t1");
    assert!(!found.is_empty());
    assert!(found.iter().all(|p| p.id.starts_with("t1")));

    let expected: Vec<&str> = catalog
      .problems()
      .iter()
      .filter(|p| p.id.starts_with("t1"))
      .map(|p| p.id.as_str())
      .collect();
    let got: Vec<&str> = found.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(got, expected);
    // literal prefix: t10/t12 entries are included too
    assert!(got.contains(&"t10-example"));
  }

  #[test]
  fn quiz_enumeration_stops_at_first_gap() {
    let catalog = Catalog::with_bank(vec![extra("z2-quiz-3", 2)]);
    // z2-quiz-2 is missing, so z2-quiz-3 is never reached
    let ids: Vec<_> = catalog.quiz_problems("z2").iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids, vec!["z2-quiz-1"]);
    assert_eq!(catalog.quiz_problems("z1").len(), 3);
    assert!(catalog.quiz_problems("nope").is_empty());
  }

  #[test]
  fn navigation_stays_within_the_technique() {
    let catalog = Catalog::seeded();
    let nav = catalog.navigation("t1-example").unwrap();
    assert_eq!(nav.technique_id.as_deref(), Some("t1"));
    assert_eq!(nav.next.map(|p| p.id.as_str()), Some("t1-train-1"));
    assert_eq!(nav.training.len(), 3);
    assert!(nav.training.iter().all(|p| technique_of(&p.id) == Some("t1")));

    let last = catalog.navigation("t1-train-3").unwrap();
    assert!(last.next.is_none());

    let quiz = catalog.navigation("z1-quiz-1").unwrap();
    assert!(quiz.technique_id.is_none());
  }

  #[test]
  fn technique_id_extraction() {
    assert_eq!(technique_of("t12-train-1"), Some("t12"));
    assert_eq!(technique_of("t1-example"), Some("t1"));
    assert_eq!(technique_of("z1-quiz-1"), None);
    assert_eq!(technique_of("tx-1"), None);
  }

  #[test]
  fn seeded_catalog_verifies() {
    Catalog::seeded().verify().unwrap();
  }

  #[test]
  fn empty_quiz_fails_verification() {
    let catalog = Catalog::from_parts(vec![extra("t1-example", 3)], grade7_chapters());
    let err = catalog.verify().unwrap_err();
    assert!(err.to_string().contains("quiz z1 has no problems"));
  }

  #[test]
  fn bad_difficulty_fails_verification() {
    let catalog = Catalog::with_bank(vec![extra("t7-example", 9)]);
    assert!(catalog.verify().unwrap_err().to_string().contains("t7-example"));
  }

  #[test]
  fn bank_never_overwrites_seeds() {
    let before = Catalog::seeded().get_problem("t1-example").unwrap().title.clone();
    let catalog = Catalog::with_bank(vec![extra("t1-example", 1), extra("t7-example", 2)]);
    assert_eq!(catalog.get_problem("t1-example").unwrap().title, before);
    assert!(catalog.contains("t7-example"));
  }

  #[test]
  fn static_paths_cover_problems_and_quizzes() {
    let catalog = Catalog::seeded();
    let paths = catalog.static_paths();
    assert_eq!(paths.len(), catalog.len() + QUIZZES.len());
    assert!(paths.contains(&StaticPath::Quiz("final".into())));
    assert!(catalog.quiz("final").is_ok());
    assert!(catalog.quiz("z9").is_err());
    assert_eq!(catalog.technique("t12").unwrap().method_name, "折叠模型");
  }
}
