//! Domain models: catalog problems/chapters and the whiteboard solution shape.

use serde::{Deserialize, Serialize};

/// School grade a problem belongs to. Serialized as "7" / "8" / "9".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
  #[serde(rename = "7")] Seven,
  #[serde(rename = "8")] Eight,
  #[serde(rename = "9")] Nine,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Semester {
  Up,
  Down,
}

/// One worked-solution step of a catalog problem.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MathStep {
  pub title: String,
  pub content: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub formula: Option<String>,
}

/// Static practice problem. `content` and step text carry `$...$` math markup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
  pub id: String,
  pub grade: Grade,
  pub semester: Semester,
  pub category: String,
  pub title: String,
  pub difficulty: u8,   // 1..=5, checked by Catalog::verify
  #[serde(default)] pub tags: Vec<String>,
  pub content: String,
  #[serde(default)] pub steps: Vec<MathStep>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub method_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub images: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub page_number: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Technique {
  pub id: String,
  pub title: String,
  pub method_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
  pub id: String,
  pub title: String,
  pub techniques: Vec<Technique>,
}

/// A quiz collection; its problems are `{id}-quiz-1`, `{id}-quiz-2`, ...
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Quiz {
  pub id: &'static str,
  pub name: &'static str,
}

// ---------------------------------------------------------------------------
// Whiteboard
// ---------------------------------------------------------------------------

/// Closed set of drawing primitives the whiteboard understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawingKind {
  Text,
  Math,
  Line,
  Arrow,
  Rect,
  Circle,
  Arc,
  Highlight,
}

#[cfg(test)]
impl DrawingKind {
  pub const ALL: [DrawingKind; 8] = [
    DrawingKind::Text,
    DrawingKind::Math,
    DrawingKind::Line,
    DrawingKind::Arrow,
    DrawingKind::Rect,
    DrawingKind::Circle,
    DrawingKind::Arc,
    DrawingKind::Highlight,
  ];
}

/// One drawing instruction. Only `id`, `type`, `x`, `y` are required;
/// the variant-specific fields stay optional and renderers fall back to defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drawing {
  pub id: String,
  #[serde(rename = "type")]
  pub kind: DrawingKind,
  pub x: f64,
  pub y: f64,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub x2: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub y2: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub width: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub height: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub radius: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub content: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub color: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub stroke_width: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub fill: Option<String>,
  /// Fade-in duration in milliseconds.
  #[serde(default, skip_serializing_if = "Option::is_none")] pub duration: Option<u32>,
}

impl Drawing {
  /// Drawing with only the common required fields set.
  pub fn bare(id: impl Into<String>, kind: DrawingKind, x: f64, y: f64) -> Self {
    Self {
      id: id.into(),
      kind,
      x,
      y,
      x2: None,
      y2: None,
      width: None,
      height: None,
      radius: None,
      content: None,
      color: None,
      stroke_width: None,
      fill: None,
      duration: None,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WhiteboardStep {
  pub explanation: String,
  pub drawings: Vec<Drawing>,
}

/// Whiteboard solution, produced by the demo table or by a validated AI reply.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
  pub title: String,
  pub steps: Vec<WhiteboardStep>,
  pub final_answer: String,
}
