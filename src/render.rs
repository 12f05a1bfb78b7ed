//! SVG rendering of whiteboard drawings.
//!
//! Every variant renders from `id`, `type`, `x`, `y` alone; the optional fields
//! only refine size, colour and stroke. Math content is emitted as LaTeX source
//! in a `<text class="math">` node for the client to typeset.

use crate::domain::{Drawing, DrawingKind};

const DEFAULT_TEXT_COLOR: &str = "#374151";
const DEFAULT_MATH_COLOR: &str = "#1a1a1a";
const DEFAULT_ACCENT: &str = "#4f46e5";
const DEFAULT_LINE_COLOR: &str = "#9ca3af";
const DEFAULT_SHAPE_COLOR: &str = "#10b981";
const DEFAULT_HIGHLIGHT: &str = "#f59e0b";
const DEFAULT_FADE_MS: u32 = 500;

pub fn render_drawing(d: &Drawing) -> String {
  let color = esc(d.color.as_deref().unwrap_or(default_color(d.kind)));
  let stroke = d.stroke_width.unwrap_or(2.0);
  let fade = d.duration.unwrap_or(DEFAULT_FADE_MS);
  let (x, y) = (d.x, d.y);

  let body = match d.kind {
    DrawingKind::Text => format!(
      r#"<text x="{x}" y="{y}" fill="{color}" font-size="16">{}</text>"#,
      esc(d.content.as_deref().unwrap_or_default())
    ),
    DrawingKind::Math => format!(
      r#"<text class="math" x="{x}" y="{y}" fill="{color}" font-size="18">{}</text>"#,
      esc(d.content.as_deref().unwrap_or_default())
    ),
    DrawingKind::Line => {
      let (x2, y2) = end_point(d, 80.0, 0.0);
      format!(r#"<line x1="{x}" y1="{y}" x2="{x2}" y2="{y2}" stroke="{color}" stroke-width="{stroke}"/>"#)
    }
    DrawingKind::Arrow => {
      let (x2, y2) = end_point(d, 0.0, 25.0);
      let marker = format!("arrowhead-{}", esc_id(&d.id));
      format!(
        concat!(
          r#"<defs><marker id="{m}" markerWidth="10" markerHeight="7" refX="9" refY="3.5" orient="auto">"#,
          r#"<polygon points="0 0, 10 3.5, 0 7" fill="{c}"/></marker></defs>"#,
          r#"<line x1="{x}" y1="{y}" x2="{x2}" y2="{y2}" stroke="{c}" stroke-width="{s}" marker-end="url(#{m})"/>"#
        ),
        m = marker, c = color, x = x, y = y, x2 = x2, y2 = y2, s = stroke
      )
    }
    DrawingKind::Rect => {
      let (w, h) = (d.width.unwrap_or(120.0), d.height.unwrap_or(40.0));
      let fill = esc(d.fill.as_deref().unwrap_or("none"));
      format!(
        r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" rx="8" stroke="{color}" stroke-width="{stroke}" fill="{fill}"/>"#
      )
    }
    DrawingKind::Highlight => {
      let (w, h) = (d.width.unwrap_or(100.0), d.height.unwrap_or(30.0));
      let fill = esc(d.fill.as_deref().unwrap_or("rgba(251, 191, 36, 0.1)"));
      format!(
        r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" rx="6" stroke="{color}" stroke-width="{stroke}" stroke-dasharray="6 4" fill="{fill}"/>"#
      )
    }
    DrawingKind::Circle => {
      let r = d.radius.unwrap_or(15.0);
      let fill = esc(d.fill.as_deref().unwrap_or("none"));
      format!(r#"<circle cx="{x}" cy="{y}" r="{r}" stroke="{color}" stroke-width="{stroke}" fill="{fill}"/>"#)
    }
    DrawingKind::Arc => {
      let (x2, y2) = end_point(d, 50.0, 0.0);
      // control point above the chord midpoint
      let (cx, cy) = ((x + x2) / 2.0, y.min(y2) - d.radius.unwrap_or(25.0));
      format!(
        r#"<path d="M{x} {y} Q{cx} {cy} {x2} {y2}" stroke="{color}" stroke-width="{stroke}" fill="none"/>"#
      )
    }
  };

  format!(
    r#"<g id="d-{}" class="drawing {}" style="transition: opacity {fade}ms">{body}</g>"#,
    esc_id(&d.id),
    kind_class(d.kind)
  )
}

fn end_point(d: &Drawing, dx: f64, dy: f64) -> (f64, f64) {
  (d.x2.unwrap_or(d.x + dx), d.y2.unwrap_or(d.y + dy))
}

fn default_color(kind: DrawingKind) -> &'static str {
  match kind {
    DrawingKind::Text => DEFAULT_TEXT_COLOR,
    DrawingKind::Math => DEFAULT_MATH_COLOR,
    DrawingKind::Arrow | DrawingKind::Arc => DEFAULT_ACCENT,
    DrawingKind::Line => DEFAULT_LINE_COLOR,
    DrawingKind::Rect | DrawingKind::Circle => DEFAULT_SHAPE_COLOR,
    DrawingKind::Highlight => DEFAULT_HIGHLIGHT,
  }
}

fn kind_class(kind: DrawingKind) -> &'static str {
  match kind {
    DrawingKind::Text => "text",
    DrawingKind::Math => "math",
    DrawingKind::Line => "line",
    DrawingKind::Arrow => "arrow",
    DrawingKind::Rect => "rect",
    DrawingKind::Circle => "circle",
    DrawingKind::Arc => "arc",
    DrawingKind::Highlight => "highlight",
  }
}

/// XML text/attribute escaping.
fn esc(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for ch in s.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(ch),
    }
  }
  out
}

/// Ids come from the model; keep only characters safe in an XML id.
fn esc_id(id: &str) -> String {
  id.chars().map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' }).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_variant_renders_with_common_fields_only() {
    for kind in DrawingKind::ALL {
      let svg = render_drawing(&Drawing::bare("x1", kind, 10.0, 20.0));
      assert!(svg.starts_with(r#"<g id="d-x1""#), "{kind:?}: {svg}");
      assert!(svg.ends_with("</g>"));
      assert!(svg.contains(kind_class(kind)));
    }
  }

  #[test]
  fn optional_fields_are_used_when_present() {
    let d = Drawing {
      x2: Some(90.0),
      y2: Some(40.0),
      color: Some("#ef4444".into()),
      stroke_width: Some(3.0),
      ..Drawing::bare("l", DrawingKind::Line, 10.0, 20.0)
    };
    let svg = render_drawing(&d);
    assert!(svg.contains(r#"x2="90""#));
    assert!(svg.contains(r##"stroke="#ef4444""##));
    assert!(svg.contains(r#"stroke-width="3""#));
  }

  #[test]
  fn content_is_escaped() {
    let d = Drawing {
      content: Some("a < b & \"c\"".into()),
      ..Drawing::bare("m", DrawingKind::Math, 0.0, 0.0)
    };
    let svg = render_drawing(&d);
    assert!(svg.contains("a &lt; b &amp; &quot;c&quot;"));
  }

  #[test]
  fn hostile_ids_are_sanitised() {
    let svg = render_drawing(&Drawing::bare("\"><script>", DrawingKind::Arrow, 0.0, 0.0));
    assert!(!svg.contains("<script>"));
  }
}
