//! Turning free-form model output into a validated `Solution`.
//!
//! Two stages, both all-or-nothing:
//!   1. `extract_json_object` finds the first balanced top-level `{...}` in the text
//!      (string literals and escapes are respected, so braces inside strings don't count).
//!   2. `validate_solution` checks the shape. Only common drawing fields are
//!      required; per-variant completeness is left to the renderer.

use serde_json::Value;

use crate::domain::Solution;
use crate::error::{Result, TutorError};

/// Slice of `text` holding the first complete top-level JSON object, if any.
pub fn extract_json_object(text: &str) -> Option<&str> {
  let bytes = text.as_bytes();
  let mut search_from = 0;

  while let Some(rel) = text[search_from..].find('{') {
    let start = search_from + rel;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
      if in_string {
        match b {
          _ if escaped => escaped = false,
          b'\\' => escaped = true,
          b'"' => in_string = false,
          _ => {}
        }
        continue;
      }
      match b {
        b'"' => in_string = true,
        b'{' => depth += 1,
        b'}' => {
          depth -= 1;
          if depth == 0 {
            return Some(&text[start..=start + offset]);
          }
        }
        _ => {}
      }
    }
    // unbalanced from this brace; try the next opening brace
    search_from = start + 1;
  }
  None
}

/// Extract, parse and validate in one go.
pub fn parse_solution_text(text: &str) -> Result<Solution> {
  let raw = extract_json_object(text).ok_or(TutorError::NonJsonReply)?;
  let value: Value = serde_json::from_str(raw).map_err(TutorError::MalformedJson)?;
  validate_solution(value)
}

pub fn validate_solution(value: Value) -> Result<Solution> {
  check_shape(&value)?;
  serde_json::from_value(value).map_err(|e| TutorError::validation(e.to_string()))
}

/// Walks the value and reports the first mismatch with its JSON path.
fn check_shape(value: &Value) -> Result<()> {
  let root = value.as_object().ok_or_else(|| TutorError::validation("expected an object at $"))?;
  require_str(root.get("title"), "$.title")?;
  require_str(root.get("finalAnswer"), "$.finalAnswer")?;
  let steps = root
    .get("steps")
    .and_then(Value::as_array)
    .ok_or_else(|| TutorError::validation("expected an array at $.steps"))?;

  for (si, step) in steps.iter().enumerate() {
    let path = format!("$.steps[{si}]");
    let step = step.as_object().ok_or_else(|| TutorError::validation(format!("expected an object at {path}")))?;
    require_str(step.get("explanation"), &format!("{path}.explanation"))?;
    let drawings = step
      .get("drawings")
      .and_then(Value::as_array)
      .ok_or_else(|| TutorError::validation(format!("expected an array at {path}.drawings")))?;

    for (di, d) in drawings.iter().enumerate() {
      let dpath = format!("{path}.drawings[{di}]");
      let d = d.as_object().ok_or_else(|| TutorError::validation(format!("expected an object at {dpath}")))?;
      require_str(d.get("id"), &format!("{dpath}.id"))?;
      require_str(d.get("type"), &format!("{dpath}.type"))?;
      for key in ["x", "y"] {
        if !d.get(key).is_some_and(Value::is_number) {
          return Err(TutorError::validation(format!("expected a number at {dpath}.{key}")));
        }
      }
    }
  }
  Ok(())
}

fn require_str(v: Option<&Value>, path: &str) -> Result<()> {
  match v {
    Some(Value::String(_)) => Ok(()),
    _ => Err(TutorError::validation(format!("expected a string at {path}"))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::DrawingKind;
  use serde_json::json;

  fn sample() -> Value {
    json!({
      "title": "一元一次方程",
      "steps": [
        { "explanation": "移项", "drawings": [
          { "id": "1", "type": "math", "x": 50, "y": 50, "content": "2x = 6" },
          { "id": "2", "type": "arrow", "x": 10, "y": 10 }
        ]}
      ],
      "finalAnswer": "x = 3"
    })
  }

  #[test]
  fn extracts_object_wrapped_in_prose() {
    let text = "当然！以下是解答：\n```json\n{\"a\": {\"b\": 1}}\n```\n希望有帮助 {";
    assert_eq!(extract_json_object(text), Some("{\"a\": {\"b\": 1}}"));
  }

  #[test]
  fn braces_inside_strings_do_not_count() {
    let text = r#"{"content": "\\frac{1}{2} }", "n": 1} trailing"#;
    assert_eq!(extract_json_object(text), Some(r#"{"content": "\\frac{1}{2} }", "n": 1}"#));
  }

  #[test]
  fn no_object_means_none() {
    assert_eq!(extract_json_object("I cannot read this image."), None);
    assert_eq!(extract_json_object("{ never closed"), None);
  }

  #[test]
  fn valid_solution_passes() {
    let s = validate_solution(sample()).unwrap();
    assert_eq!(s.final_answer, "x = 3");
    assert_eq!(s.steps[0].drawings[1].kind, DrawingKind::Arrow);
    assert!(s.steps[0].drawings[1].x2.is_none());
  }

  #[test]
  fn missing_common_field_is_rejected_with_path() {
    let mut v = sample();
    v["steps"][0]["drawings"][1].as_object_mut().unwrap().remove("y");
    let err = validate_solution(v).unwrap_err();
    assert!(err.to_string().contains("$.steps[0].drawings[1].y"), "{err}");
  }

  #[test]
  fn unknown_drawing_type_is_rejected() {
    let mut v = sample();
    v["steps"][0]["drawings"][0]["type"] = json!("spiral");
    assert!(matches!(validate_solution(v), Err(TutorError::Validation(_))));
  }

  #[test]
  fn non_json_text_fails_wholesale() {
    assert!(matches!(parse_solution_text("抱歉，我无法识别。"), Err(TutorError::NonJsonReply)));
    assert!(matches!(parse_solution_text("{title: 1}"), Err(TutorError::MalformedJson(_))));
  }

  #[test]
  fn parses_fenced_reply() {
    let text = format!("```json\n{}\n```", sample());
    assert_eq!(parse_solution_text(&text).unwrap().title, "一元一次方程");
  }
}
