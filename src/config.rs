//! Configuration: LLM endpoint settings from the environment, plus an optional TOML file
//! with prompt overrides and seed catalogs.
//!
//! See `AgentConfig` and `Prompts` for the expected TOML schema.

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_FAST_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_STRONG_MODEL: &str = "gemini-1.5-pro";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Where and how to reach the hosted completion endpoint.
#[derive(Clone)]
pub struct LlmSettings {
  pub api_key: String,
  pub base_url: String,
  pub fast_model: String,
  pub strong_model: String,
  pub timeout: Duration,
}

impl std::fmt::Debug for LlmSettings {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("LlmSettings")
      .field("api_key", &"[REDACTED]")
      .field("base_url", &self.base_url)
      .field("fast_model", &self.fast_model)
      .field("strong_model", &self.strong_model)
      .field("timeout", &self.timeout)
      .finish()
  }
}

impl LlmSettings {
  pub fn from_env() -> Result<Self, AppError> {
    Self::from_lookup(|k| std::env::var(k).ok())
  }

  /// Build settings from any key lookup. The credential is mandatory.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
    let api_key = lookup("LLM_API_KEY")
      .or_else(|| lookup("GOOGLE_API_KEY"))
      .filter(|k| !k.trim().is_empty())
      .ok_or_else(|| {
        AppError::Configuration("LLM_API_KEY (or GOOGLE_API_KEY) not found in environment variables".into())
      })?;
    let base_url = lookup("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
    let fast_model = lookup("LLM_FAST_MODEL").unwrap_or_else(|| DEFAULT_FAST_MODEL.into());
    let strong_model = lookup("LLM_STRONG_MODEL").unwrap_or_else(|| DEFAULT_STRONG_MODEL.into());
    let timeout_secs = lookup("LLM_TIMEOUT_SECS")
      .and_then(|s| s.parse::<u64>().ok())
      .unwrap_or(DEFAULT_TIMEOUT_SECS);

    Ok(Self {
      api_key,
      base_url: base_url.trim_end_matches('/').to_string(),
      fast_model,
      strong_model,
      timeout: Duration::from_secs(timeout_secs),
    })
  }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AgentConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub content: Vec<ContentCfg>,
  #[serde(default)]
  pub users: Vec<UserCfg>,
  #[serde(default)]
  pub videos: Vec<VideoCfg>,
  /// Seed the nine built-in sample videos at startup.
  #[serde(default = "default_true")]
  pub seed_sample_videos: bool,
}

impl Default for AgentConfig {
  fn default() -> Self {
    Self {
      prompts: Prompts::default(),
      content: Vec::new(),
      users: Vec::new(),
      videos: Vec::new(),
      seed_sample_videos: true,
    }
  }
}

fn default_true() -> bool {
  true
}

#[derive(Clone, Debug, Deserialize)]
pub struct ContentCfg {
  pub id: String,
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub skills: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UserCfg {
  pub id: String,
  #[serde(default)]
  pub goals: String,
  #[serde(default)]
  pub background: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct VideoCfg {
  pub name: String,
  pub tag: String,
}

/// Per-operation role instructions (`*_system`) and user templates (`*_template`).
/// Templates use `{placeholder}` slots filled by the prompt builder.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub learning_path_system: String,
  pub learning_path_template: String,
  pub recommend_content_system: String,
  pub recommend_content_template: String,
  pub assess_skills_system: String,
  pub assess_skills_template: String,
  pub quiz_generation_system: String,
  pub quiz_generation_template: String,
  pub quiz_feedback_system: String,
  pub quiz_feedback_template: String,
  pub next_quiz_system: String,
  pub next_quiz_template: String,
  pub video_path_system: String,
  pub video_path_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      learning_path_system: "You are an AI assistant that generates personalized learning paths.".into(),
      learning_path_template: "User Goals: {goals}\nUser Background: {background}\n\n\
Based on the user's goals and background, generate a personalized learning path with {num_items} items. \
For each item, provide the content ID, a brief explanation of why it's recommended, and how it relates to the user's goals.\n\n\
Available Content:\n{catalog}\n\n\
Format the response as a JSON array of objects, each containing \"content_id\", \"explanation\", and \"relevance_to_goals\" (all strings).".into(),

      recommend_content_system: "You are an AI assistant that provides personalized content recommendations.".into(),
      recommend_content_template: "User Goals: {goals}\nUser Background: {background}\nUser Skills: {skills}\n\n\
Based on the user's profile, recommend {num_recommendations} pieces of content. \
For each recommendation, provide the content ID, a brief explanation of why it's recommended, and how it aligns with the user's current skills and goals.\n\n\
Available Content:\n{catalog}\n\n\
Format the response as a JSON array of objects, each containing \"content_id\", \"explanation\", and \"skill_alignment\" (all strings).".into(),

      assess_skills_system: "You are an AI assistant that assesses user skills based on their responses.".into(),
      assess_skills_template: "Content Title: {title}\nContent Description: {description}\nRelated Skills: {skills}\n\n\
User Response: {user_response}\n\n\
Based on the user's response, assess their understanding of the content and the related skills. \
Provide a skill assessment for each related skill, including a score from 0 to 1, and brief feedback on areas of strength and areas for improvement.\n\n\
Format the response as a JSON object with a key for each skill, where each value is an object containing \"score\" (number) and \"feedback\" (string).".into(),

      quiz_generation_system: "You are a teacher creating mathematical and logical quiz questions. Your task:\n\
1. Summarize the key concepts that the quiz should test.\n\
2. Identify the problem type (e.g., arithmetic, logic, geometry).\n\
3. Formulate a clear, concise quiz question.\n\
4. Provide an answer key with an explanation for each step.\n\n\
Ensure simplicity, clarity, and correctness in both the question and the explanation. Each task should be done in the given order and separately.".into(),
      quiz_generation_template: "Create a quiz on the topic of {topic} with {num_questions} questions.\n\
The difficulty level should be {difficulty}.\n\
For each question, provide:\n\
1. The question text\n\
2. Four multiple-choice options (A, B, C, D)\n\
3. The correct answer (A, B, C, or D)\n\
4. A brief explanation of the correct answer\n\n\
Format the response as a JSON array of objects, each containing \"question\", \"options\" (four strings), \"correct_answer\" (one letter), and \"explanation\".".into(),

      quiz_feedback_system: "You are an AI assistant that provides personalized educational feedback.".into(),
      quiz_feedback_template: "Quiz Topic: {topic}\nQuiz Difficulty: {difficulty}\nUser's Score: {score} out of {total_questions}\n\n\
Based on the user's performance, provide personalized feedback and suggestions for improvement.\n\
Include:\n\
1. An overall assessment of their performance\n\
2. Specific areas where they excelled\n\
3. Areas that need improvement\n\
4. Recommended next steps or topics to study".into(),

      next_quiz_system: "You are an AI assistant that provides personalized quiz recommendations.".into(),
      next_quiz_template: "User's Quiz History:\n{history}\n\nAvailable Quizzes:\n{quizzes}\n\n\
Based on the user's quiz history and available quizzes, recommend the next quiz they should take.\n\
Provide the quiz ID and a brief explanation for your recommendation.".into(),

      video_path_system: "You are an AI assistant that curates video learning paths.".into(),
      video_path_template: "Based on the user's preference '{preference}', generate a personalized learning path using the following available content:\n{videos}\n\n\
Consider the following factors when recommending videos:\n\
1. Relevance to the user's preference\n\
2. Number of likes and views\n\
3. How recently the video was last viewed\n\n\
Format the response as a JSON array of objects ranked from first to last, each containing \"name\", \"tag\", and \"rank\" (integer starting at 1).".into(),
    }
  }
}

/// Attempt to load `AgentConfig` from AGENT_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_agent_config_from_env() -> Option<AgentConfig> {
  let path = std::env::var("AGENT_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AgentConfig>(&s) {
      Ok(cfg) => {
        info!(target: "learnhub_backend", %path, "Loaded agent config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "learnhub_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "learnhub_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |k| map.get(k).cloned()
  }

  #[test]
  fn missing_credential_fails_fast() {
    let err = LlmSettings::from_lookup(lookup(&[])).unwrap_err();
    assert!(matches!(err, AppError::Configuration(_)));
    let err = LlmSettings::from_lookup(lookup(&[("LLM_API_KEY", "  ")])).unwrap_err();
    assert!(matches!(err, AppError::Configuration(_)));
  }

  #[test]
  fn google_key_is_accepted_and_defaults_apply() {
    let s = LlmSettings::from_lookup(lookup(&[("GOOGLE_API_KEY", "k")])).unwrap();
    assert_eq!(s.api_key, "k");
    assert_eq!(s.base_url, DEFAULT_BASE_URL);
    assert_eq!(s.fast_model, DEFAULT_FAST_MODEL);
    assert_eq!(s.strong_model, DEFAULT_STRONG_MODEL);
    assert_eq!(s.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    assert!(!format!("{s:?}").contains("\"k\""));
  }

  #[test]
  fn toml_overrides_prompts_and_seeds_catalogs() {
    let cfg: AgentConfig = toml::from_str(
      r#"
      seed_sample_videos = false

      [prompts]
      quiz_feedback_system = "Be brief."

      [[content]]
      id = "PROG101"
      title = "Introduction to Programming"
      skills = ["programming", "problem-solving"]

      [[videos]]
      name = "Intro"
      tag = "Programming"
      "#,
    )
    .unwrap();
    assert!(!cfg.seed_sample_videos);
    assert_eq!(cfg.prompts.quiz_feedback_system, "Be brief.");
    assert_eq!(cfg.prompts.next_quiz_system, Prompts::default().next_quiz_system);
    assert_eq!(cfg.content[0].skills.len(), 2);
    assert_eq!(cfg.videos[0].tag, "Programming");
    assert!(cfg.users.is_empty());
  }

  #[test]
  fn empty_toml_keeps_sample_videos() {
    let cfg: AgentConfig = toml::from_str("").unwrap();
    assert!(cfg.seed_sample_videos);
  }
}
