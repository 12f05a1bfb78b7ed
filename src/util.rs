//! Small utility helpers used across modules.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{Result, TutorError};

/// Image payload split out of a data URI.
#[derive(Debug, PartialEq, Eq)]
pub struct ImagePayload<'a> {
  pub mime_type: &'a str,
  pub data: &'a str,
}

/// Split `data:<mime>;base64,<data>`. A payload with a comma but no recognised
/// header keeps the part after the comma; anything else is raw base64 JPEG.
pub fn split_data_uri(image: &str) -> ImagePayload<'_> {
  if let Some(rest) = image.strip_prefix("data:") {
    if let Some((header, data)) = rest.split_once(',') {
      if let Some(mime) = header.strip_suffix(";base64") {
        if mime.starts_with("image/") {
          return ImagePayload { mime_type: mime, data };
        }
      }
    }
  }
  match image.split_once(',') {
    Some((_, data)) => ImagePayload { mime_type: "image/jpeg", data },
    None => ImagePayload { mime_type: "image/jpeg", data: image },
  }
}

/// Reject payloads that are not decodable base64 before they leave the process.
pub fn check_base64(data: &str) -> Result<usize> {
  let compact: String = data.chars().filter(|c| !c.is_whitespace()).collect();
  STANDARD
    .decode(compact.as_bytes())
    .map(|bytes| bytes.len())
    .map_err(|e| TutorError::InvalidPayload(format!("Image is not valid base64: {e}")))
}

/// Log-safe truncation for large strings.
/// Cuts on a char boundary so multi-byte text never panics.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn splits_full_data_uri() {
    let p = split_data_uri("data:image/png;base64,iVBORw0KGgo=");
    assert_eq!(p, ImagePayload { mime_type: "image/png", data: "iVBORw0KGgo=" });
  }

  #[test]
  fn falls_back_to_jpeg() {
    assert_eq!(split_data_uri("abc,ZGF0YQ==").data, "ZGF0YQ==");
    let raw = split_data_uri("ZGF0YQ==");
    assert_eq!(raw.mime_type, "image/jpeg");
    assert_eq!(raw.data, "ZGF0YQ==");
  }

  #[test]
  fn base64_check() {
    assert_eq!(check_base64("ZGF0\nYQ==").unwrap(), 4);
    assert!(matches!(check_base64("not base64!"), Err(TutorError::InvalidPayload(_))));
  }

  #[test]
  fn truncation_respects_char_boundaries() {
    let s = "数学老师数学老师";
    let t = trunc_for_log(s, 4);
    assert!(t.starts_with("数"));
    assert!(t.contains("24 bytes total"));
    assert_eq!(trunc_for_log("short", 10), "short");
  }
}
