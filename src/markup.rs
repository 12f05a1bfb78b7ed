//! Splits problem text into plain text and `$...$` / `$$...$$` math segments.
//!
//! Block math is tried first, then inline math (backslash escapes allowed
//! inside). A `$` that opens nothing is kept as literal text.

use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Segment {
  Text(String),
  Inline(String),
  Block(String),
}

pub fn segments(content: &str) -> Vec<Segment> {
  let mut out: Vec<Segment> = Vec::new();
  let mut rest = content;

  while !rest.is_empty() {
    if let Some(body) = rest.strip_prefix("$$") {
      if let Some(end) = body.find("$$") {
        out.push(Segment::Block(body[..end].to_string()));
        rest = &body[end + 2..];
        continue;
      }
    }

    if let Some(body) = rest.strip_prefix('$') {
      if let Some(end) = inline_end(body) {
        out.push(Segment::Inline(body[..end].to_string()));
        rest = &body[end + 1..];
        continue;
      }
    }

    match rest.find('$') {
      None => {
        push_text(&mut out, rest);
        break;
      }
      Some(0) => {
        push_text(&mut out, "$");
        rest = &rest[1..];
      }
      Some(i) => {
        push_text(&mut out, &rest[..i]);
        rest = &rest[i..];
      }
    }
  }
  out
}

/// Byte offset of the closing `$` of a non-empty inline formula.
fn inline_end(body: &str) -> Option<usize> {
  let mut chars = body.char_indices();
  while let Some((i, ch)) = chars.next() {
    match ch {
      '\\' => {
        // escaped char is part of the formula, even a `$`
        chars.next()?;
      }
      '$' if i == 0 => return None,
      '$' => return Some(i),
      _ => {}
    }
  }
  None
}

fn push_text(out: &mut Vec<Segment>, s: &str) {
  if let Some(Segment::Text(prev)) = out.last_mut() {
    prev.push_str(s);
  } else {
    out.push(Segment::Text(s.to_string()));
  }
}
