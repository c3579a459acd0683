//! Domain models: catalog entities held in memory and the typed shapes model replies decode into.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A learning resource in the content catalog.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ContentItem {
  pub id: String,
  pub title: String,
  pub description: String,
  #[serde(default)]
  pub skills: Vec<String>,
}

/// Learner profile. `skills` maps skill name to a running score in [0,1].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
  pub id: String,
  pub goals: String,
  pub background: String,
  #[serde(default)]
  pub skills: HashMap<String, f64>,
}

/// Four options, either as a plain list or keyed by letter ("A".."D").
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum QuestionOptions {
  List(Vec<String>),
  Lettered(BTreeMap<String, String>),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Question {
  pub question: String,
  pub options: QuestionOptions,
  pub correct_answer: String,
  #[serde(default)]
  pub explanation: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Quiz {
  pub id: String,
  pub topic: String,
  pub difficulty: String,
  pub questions: Vec<Question>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct QuestionFeedback {
  pub question_number: usize,
  pub is_correct: bool,
  pub correct_answer: String,
  pub explanation: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct QuizAttemptResult {
  pub user_id: String,
  pub quiz_id: String,
  pub score: usize,
  pub total_questions: usize,
  pub feedback: Vec<QuestionFeedback>,
}

/// What survives of an attempt in the user's history.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct QuizHistoryEntry {
  pub quiz_id: String,
  pub score: usize,
  pub total_questions: usize,
}

impl From<&QuizAttemptResult> for QuizHistoryEntry {
  fn from(r: &QuizAttemptResult) -> Self {
    Self { quiz_id: r.quiz_id.clone(), score: r.score, total_questions: r.total_questions }
  }
}

/// A video in the recommendation catalog. `id` is stable; `name` is display-only.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Video {
  pub id: String,
  pub name: String,
  pub tag: String,
  pub likes: u64,
  pub views: u64,
  pub last_viewed: Option<DateTime<Utc>>,
}

impl Video {
  pub fn new(id: String, name: impl Into<String>, tag: impl Into<String>) -> Self {
    Self { id, name: name.into(), tag: tag.into(), likes: 0, views: 0, last_viewed: None }
  }

  pub fn add_like(&mut self) {
    self.likes = self.likes.saturating_add(1);
  }

  pub fn record_view(&mut self, at: DateTime<Utc>) {
    self.views = self.views.saturating_add(1);
    self.last_viewed = Some(at);
  }
}

/// How a caller points at a video: by stable id, or by display name (first match wins).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VideoSelector {
  Id(String),
  Name(String),
}

impl std::fmt::Display for VideoSelector {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      VideoSelector::Id(id) => write!(f, "id={id}"),
      VideoSelector::Name(name) => write!(f, "name={name}"),
    }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VideoStats {
  pub id: String,
  pub name: String,
  pub likes: u64,
  pub views: u64,
}

// --- Model reply shapes ---

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LearningPathItem {
  pub content_id: String,
  pub explanation: String,
  pub relevance_to_goals: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ContentRecommendation {
  pub content_id: String,
  pub explanation: String,
  pub skill_alignment: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SkillScore {
  pub score: f64,
  #[serde(default)]
  pub feedback: String,
}

/// Skill name -> reported score and feedback.
pub type SkillAssessment = BTreeMap<String, SkillScore>;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RankedVideo {
  #[serde(alias = "video_name", alias = "title")]
  pub name: String,
  #[serde(default)]
  pub tag: String,
  #[serde(default)]
  pub rank: Option<u32>,
}
