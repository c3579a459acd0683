//! Response decoding: strip markdown code fences, then decode the remainder.
//!
//! Two strategies:
//!   - `decode_literal`: JSON first, then the allow-list literal parser; failures propagate.
//!   - `decode_json_or_empty`: strict JSON array; failures are logged and yield an empty list.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use crate::error::AppError;
use crate::literal::parse_literal;
use crate::util::trunc_for_log;

/// Fence markers removed from replies, longest first so tagged fences go before the bare one.
const FENCES: [&str; 4] = ["```python", "```py", "```json", "```"];

const RAW_LOG_LIMIT: usize = 600;

pub fn strip_code_fences(raw: &str) -> String {
  let mut out = raw.to_string();
  for fence in FENCES {
    out = out.replace(fence, "");
  }
  out.trim().to_string()
}

/// Decode a reply that should hold a literal structure into `T`.
pub fn decode_literal<T: DeserializeOwned>(raw: &str) -> Result<T, AppError> {
  let body = strip_code_fences(raw);
  let value = match serde_json::from_str::<Value>(&body) {
    Ok(v) => v,
    Err(json_err) => {
      debug!(target: "llm", error = %json_err, "Reply is not JSON; trying literal parser");
      parse_literal(&body).map_err(|e| {
        error!(target: "llm", error = %e, raw = %trunc_for_log(raw, RAW_LOG_LIMIT), "Malformed literal in model reply");
        AppError::Parse(format!("malformed literal: {e}"))
      })?
    }
  };
  serde_json::from_value::<T>(value).map_err(|e| {
    error!(target: "llm", error = %e, raw = %trunc_for_log(raw, RAW_LOG_LIMIT), "Model reply has the wrong shape");
    AppError::Parse(format!("unexpected reply shape: {e}"))
  })
}

/// Decode a JSON array reply; on any failure log the raw text and return an empty list.
pub fn decode_json_or_empty<T: DeserializeOwned>(raw: &str) -> Vec<T> {
  let body = strip_code_fences(raw);
  let value = match serde_json::from_str::<Value>(&body) {
    Ok(v) => v,
    Err(e) => {
      error!(target: "llm", error = %e, raw = %trunc_for_log(raw, RAW_LOG_LIMIT), "Malformed JSON reply; returning empty result");
      return Vec::new();
    }
  };
  match serde_json::from_value::<Vec<T>>(value) {
    Ok(items) => items,
    Err(e) => {
      error!(target: "llm", error = %e, raw = %trunc_for_log(raw, RAW_LOG_LIMIT), "JSON reply has an unexpected shape; returning empty result");
      Vec::new()
    }
  }
}

/// Plain-text replies are used as-is.
pub fn decode_plain(raw: &str) -> String {
  raw.trim().to_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{LearningPathItem, RankedVideo, SkillAssessment};

  #[test]
  fn fenced_literal_decodes_like_unwrapped() {
    let bare = "[{'content_id': 'A1', 'explanation': 'e', 'relevance_to_goals': 'r'}]";
    let fenced = format!("```python\n{bare}\n```");
    let a: Vec<LearningPathItem> = decode_literal(bare).unwrap();
    let b: Vec<LearningPathItem> = decode_literal(&fenced).unwrap();
    assert_eq!(a, b);
    assert_eq!(a[0].content_id, "A1");
  }

  #[test]
  fn json_fence_is_stripped_too() {
    let raw = "```json\n{\"x\": {\"score\": 0.8, \"feedback\": \"good\"}}\n```";
    let a: SkillAssessment = decode_literal(raw).unwrap();
    assert_eq!(a["x"].score, 0.8);
  }

  #[test]
  fn malformed_literal_propagates_parse_error() {
    let err = decode_literal::<Vec<LearningPathItem>>("```python\n[{'content_id': \n```").unwrap_err();
    assert!(matches!(err, AppError::Parse(_)));
  }

  #[test]
  fn wrong_shape_is_a_parse_error() {
    let err = decode_literal::<Vec<LearningPathItem>>("[{'id': 'A1'}]").unwrap_err();
    assert!(matches!(err, AppError::Parse(ref m) if m.contains("shape")));
  }

  #[test]
  fn code_in_reply_is_never_evaluated() {
    let err = decode_literal::<Value>("__import__('os').system('rm -rf /')").unwrap_err();
    assert!(matches!(err, AppError::Parse(_)));
  }

  #[test]
  fn malformed_json_path_returns_empty() {
    let out: Vec<RankedVideo> = decode_json_or_empty("{not valid json");
    assert!(out.is_empty());
  }

  #[test]
  fn well_formed_json_of_the_wrong_shape_returns_empty() {
    let wrapped: Vec<RankedVideo> = decode_json_or_empty(r#"{"videos": [{"name": "Intro"}]}"#);
    assert!(wrapped.is_empty());
    let pairs: Vec<RankedVideo> = decode_json_or_empty(r#"[["Intro", 1], ["ML", 2]]"#);
    assert!(pairs.is_empty());
  }

  #[test]
  fn deeply_nested_reply_is_a_parse_error() {
    let raw = format!("{}1{}", "[".repeat(2_000), "]".repeat(2_000));
    let err = decode_literal::<Value>(&raw).unwrap_err();
    assert!(matches!(err, AppError::Parse(ref m) if m.contains("nesting too deep")));
    let out: Vec<RankedVideo> = decode_json_or_empty(&raw);
    assert!(out.is_empty());
  }

  #[test]
  fn json_path_decodes_fenced_array() {
    let raw = "```json\n[{\"name\": \"Machine Learning Basics\", \"tag\": \"AI\", \"rank\": 1}]\n```";
    let out: Vec<RankedVideo> = decode_json_or_empty(raw);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].tag, "AI");
    assert_eq!(out[0].rank, Some(1));
  }
}
