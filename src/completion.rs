//! Minimal client for an OpenAI-compatible chat.completions endpoint.
//!
//! One request per call: a fixed system instruction plus one rendered prompt, no streaming,
//! no conversation context and no retries. Calls are instrumented and log model names,
//! latencies and token usage (not contents).
//!
//! NOTE: We never log the API key.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::LlmSettings;
use crate::error::AppError;

/// Which model variant an operation runs on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelTier {
  /// Learning-system operations.
  Fast,
  /// Quiz and video operations.
  Strong,
}

#[derive(Clone)]
pub struct CompletionClient {
  client: reqwest::Client,
  api_key: String,
  pub base_url: String,
  pub fast_model: String,
  pub strong_model: String,
}

impl std::fmt::Debug for CompletionClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CompletionClient")
      .field("base_url", &self.base_url)
      .field("fast_model", &self.fast_model)
      .field("strong_model", &self.strong_model)
      .field("api_key", &"[REDACTED]")
      .finish()
  }
}

impl CompletionClient {
  pub fn new(settings: &LlmSettings) -> Result<Self, AppError> {
    let client = reqwest::Client::builder()
      .timeout(settings.timeout)
      .build()
      .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {e}")))?;

    Ok(Self {
      client,
      api_key: settings.api_key.clone(),
      base_url: settings.base_url.clone(),
      fast_model: settings.fast_model.clone(),
      strong_model: settings.strong_model.clone(),
    })
  }

  /// Construct from environment; fails with `Configuration` when the credential is absent.
  pub fn from_env() -> Result<Self, AppError> {
    Self::new(&LlmSettings::from_env()?)
  }

  pub fn model(&self, tier: ModelTier) -> &str {
    match tier {
      ModelTier::Fast => &self.fast_model,
      ModelTier::Strong => &self.strong_model,
    }
  }

  /// Send one prompt with its role instruction and return the completion text (trimmed).
  #[instrument(level = "info", skip(self, system, prompt), fields(model = %self.model(tier), prompt_len = prompt.len()))]
  pub async fn complete(&self, tier: ModelTier, system: &str, prompt: &str) -> Result<String, AppError> {
    let url = format!("{}/chat/completions", self.base_url);
    let mut messages = Vec::with_capacity(2);
    if !system.is_empty() {
      messages.push(ChatMessageReq { role: "system".into(), content: system.into() });
    }
    messages.push(ChatMessageReq { role: "user".into(), content: prompt.into() });
    let req = ChatCompletionRequest { model: self.model(tier).to_string(), messages };

    let start = std::time::Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, "learnhub-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await
      .map_err(|e| {
        error!(target: "llm", error = %e, "Completion request failed");
        AppError::Transport(e.to_string())
      })?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_api_error(&body).unwrap_or(body);
      error!(target: "llm", %status, "Completion endpoint returned an error");
      return Err(AppError::Transport(format!("HTTP {}: {}", status, msg)));
    }

    let body: ChatCompletionResponse = res.json().await
      .map_err(|e| AppError::Transport(format!("unreadable completion body: {e}")))?;
    if let Some(usage) = &body.usage {
      info!(target: "llm", prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "Completion usage");
    }
    let text = body.choices.into_iter().next()
      .and_then(|c| c.message.content)
      .unwrap_or_default().trim().to_string();

    info!(target: "llm", elapsed = ?start.elapsed(), reply_len = text.len(), "Completion received");
    Ok(text)
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from a provider error body.
/// Gemini's compatibility layer sometimes wraps the object in a one-element array.
fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  if let Ok(w) = serde_json::from_str::<EWrap>(body) {
    return Some(w.error.message);
  }
  serde_json::from_str::<Vec<EWrap>>(body).ok()
    .and_then(|v| v.into_iter().next())
    .map(|w| w.error.message)
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use std::time::Duration;

  pub(crate) fn settings_for(base_url: &str) -> LlmSettings {
    LlmSettings {
      api_key: "test-key".into(),
      base_url: base_url.to_string(),
      fast_model: "fast-model".into(),
      strong_model: "strong-model".into(),
      timeout: Duration::from_secs(5),
    }
  }

  /// Body of a successful chat.completions reply carrying `text`.
  pub(crate) fn completion_body(text: &str) -> String {
    serde_json::json!({
      "choices": [{ "message": { "role": "assistant", "content": text } }],
      "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
    })
    .to_string()
  }

  #[tokio::test]
  async fn complete_sends_system_and_prompt_and_returns_text() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
      .mock("POST", "/chat/completions")
      .match_header("authorization", "Bearer test-key")
      .match_body(mockito::Matcher::PartialJson(serde_json::json!({
        "model": "strong-model",
        "messages": [
          { "role": "system", "content": "be a tutor" },
          { "role": "user", "content": "make a quiz" }
        ]
      })))
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(completion_body("  hello  "))
      .create_async()
      .await;

    let client = CompletionClient::new(&settings_for(&server.url())).unwrap();
    let text = client.complete(ModelTier::Strong, "be a tutor", "make a quiz").await.unwrap();
    assert_eq!(text, "hello");
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn http_error_surfaces_as_transport_with_provider_message() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
      .mock("POST", "/chat/completions")
      .with_status(429)
      .with_body(r#"{"error": {"message": "quota exceeded"}}"#)
      .expect(1)
      .create_async()
      .await;

    let client = CompletionClient::new(&settings_for(&server.url())).unwrap();
    let err = client.complete(ModelTier::Fast, "sys", "p").await.unwrap_err();
    match err {
      AppError::Transport(msg) => {
        assert!(msg.contains("429"), "{msg}");
        assert!(msg.contains("quota exceeded"), "{msg}");
      }
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[tokio::test]
  async fn unreachable_endpoint_is_a_transport_error() {
    let client = CompletionClient::new(&settings_for("http://127.0.0.1:9")).unwrap();
    let err = client.complete(ModelTier::Fast, "sys", "p").await.unwrap_err();
    assert!(matches!(err, AppError::Transport(_)));
  }

  #[test]
  fn array_wrapped_error_bodies_are_understood() {
    let msg = extract_api_error(r#"[{"error": {"code": 400, "message": "API key not valid"}}]"#);
    assert_eq!(msg.as_deref(), Some("API key not valid"));
    assert_eq!(extract_api_error("not json"), None);
  }

  #[test]
  fn debug_output_redacts_key() {
    let client = CompletionClient::new(&settings_for("http://localhost")).unwrap();
    let dbg = format!("{client:?}");
    assert!(dbg.contains("[REDACTED]"));
    assert!(!dbg.contains("test-key"));
  }
}
