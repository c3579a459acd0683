//! Public HTTP request/response structs (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{RankedVideo, SkillAssessment, Video, VideoSelector};
use crate::error::AppError;

#[derive(Serialize)]
pub struct HealthOut {
  pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
  pub error: &'static str,
  pub message: String,
}

#[derive(Serialize)]
pub struct TextOut {
  pub text: String,
}

//
// Learning system
//

#[derive(Debug, Deserialize)]
pub struct AddContentIn {
  pub id: String,
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddUserIn {
  pub id: String,
  #[serde(default)]
  pub goals: String,
  #[serde(default)]
  pub background: String,
}

#[derive(Debug, Deserialize)]
pub struct LearningPathQuery {
  #[serde(rename = "numItems")]
  pub num_items: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
  #[serde(rename = "numRecommendations")]
  pub num_recommendations: Option<usize>,
}

#[derive(Deserialize)]
pub struct AssessIn {
  #[serde(rename = "contentId")]
  pub content_id: String,
  pub response: String,
}

#[derive(Serialize)]
pub struct AssessOut {
  pub assessment: SkillAssessment,
  pub skills: HashMap<String, f64>,
}

//
// Quiz platform
//

#[derive(Debug, Deserialize)]
pub struct CreateQuizIn {
  #[serde(default, rename = "quizId")]
  pub quiz_id: Option<String>,
  pub topic: String,
  pub difficulty: String,
  #[serde(rename = "numQuestions")]
  pub num_questions: usize,
}

#[derive(Deserialize)]
pub struct AttemptIn {
  #[serde(rename = "userId")]
  pub user_id: String,
  pub answers: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
  #[serde(rename = "userId")]
  pub user_id: String,
}

//
// Videos
//

#[derive(Debug, Deserialize)]
pub struct AddVideoIn {
  pub name: String,
  pub tag: String,
}

#[derive(Debug, Deserialize)]
pub struct VideoQuery {
  pub name: Option<String>,
}

/// Points at a video by `videoId` (preferred) or by `name`.
#[derive(Debug, Deserialize)]
pub struct VideoSelectorIn {
  #[serde(default, rename = "videoId")]
  pub video_id: Option<String>,
  #[serde(default)]
  pub name: Option<String>,
}

impl VideoSelectorIn {
  pub fn into_selector(self) -> Result<VideoSelector, AppError> {
    match (self.video_id, self.name) {
      (Some(id), _) => Ok(VideoSelector::Id(id)),
      (None, Some(name)) => Ok(VideoSelector::Name(name)),
      (None, None) => Err(AppError::InvalidInput("either videoId or name is required".into())),
    }
  }
}

#[derive(Serialize)]
pub struct VideoActionOut {
  pub found: bool,
  pub video: Option<Video>,
}

impl From<Option<Video>> for VideoActionOut {
  fn from(video: Option<Video>) -> Self {
    Self { found: video.is_some(), video }
  }
}

#[derive(Debug, Deserialize)]
pub struct PopularTagsQuery {
  pub n: Option<usize>,
}

#[derive(Serialize)]
pub struct PopularTagsOut {
  pub tags: Vec<String>,
}

#[derive(Deserialize)]
pub struct VideoPathIn {
  pub preference: String,
}

#[derive(Serialize)]
pub struct VideoPathOut {
  pub path: Vec<RankedVideo>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn selector_prefers_id_and_requires_one_key() {
    let s: VideoSelectorIn = serde_json::from_str(r#"{"videoId": "v1", "name": "Intro"}"#).unwrap();
    assert_eq!(s.into_selector().unwrap(), VideoSelector::Id("v1".into()));
    let s: VideoSelectorIn = serde_json::from_str(r#"{"name": "Intro"}"#).unwrap();
    assert_eq!(s.into_selector().unwrap(), VideoSelector::Name("Intro".into()));
    let s: VideoSelectorIn = serde_json::from_str("{}").unwrap();
    assert!(matches!(s.into_selector(), Err(AppError::InvalidInput(_))));
  }
}
