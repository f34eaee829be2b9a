//! Small utility helpers used across modules.

use crate::error::{TrainerError, TrainerResult};

/// True if a key is safe to use as a document id (and file name).
pub fn is_safe_key(key: &str) -> bool {
  !key.is_empty()
    && key.len() <= 128
    && !key.starts_with('.')
    && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Trimmed, non-empty request field.
pub fn required<'a>(field: &str, value: &'a str) -> TrainerResult<&'a str> {
  let v = value.trim();
  if v.is_empty() {
    return Err(TrainerError::Validation(format!("missing required field '{field}'")));
  }
  Ok(v)
}

/// User ids come from the session provider and are trusted, but must still be usable as keys.
pub fn user_key(user_id: &str) -> TrainerResult<&str> {
  let id = required("userId", user_id)?;
  if !is_safe_key(id) {
    return Err(TrainerError::Validation(format!("invalid userId '{id}'")));
  }
  Ok(id)
}

/// Log-safe truncation for large strings.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut end = max;
  while !s.is_char_boundary(end) {
    end -= 1;
  }
  format!("{}… ({} bytes total)", &s[..end], s.len())
}
