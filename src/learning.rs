//! Learning system: personalized learning paths, content recommendations and skill assessment.
//!
//! Every operation follows the same chain: snapshot state, render the prompt, call the fast
//! model, decode the reply as a literal structure. Decode failures abort the operation.

use std::collections::HashMap;

use tracing::{info, instrument};

use crate::completion::ModelTier;
use crate::decode::decode_literal;
use crate::domain::{ContentRecommendation, LearningPathItem, SkillAssessment};
use crate::error::AppError;
use crate::prompts;
use crate::state::AppState;

pub const DEFAULT_PATH_ITEMS: usize = 5;
pub const DEFAULT_RECOMMENDATIONS: usize = 3;

/// Running skill score: average with the previous score, or the observation itself.
/// Scores are not clamped; they stay in [0,1] only if the model's do.
pub fn blend_skill_score(existing: Option<f64>, observed: f64) -> f64 {
  match existing {
    Some(current) => (current + observed) / 2.0,
    None => observed,
  }
}

pub fn apply_assessment(skills: &mut HashMap<String, f64>, assessment: &SkillAssessment) {
  for (skill, data) in assessment {
    let next = blend_skill_score(skills.get(skill).copied(), data.score);
    skills.insert(skill.clone(), next);
  }
}

#[instrument(level = "info", skip(state), fields(%user_id))]
pub async fn generate_learning_path(
  state: &AppState,
  user_id: &str,
  num_items: usize,
) -> Result<Vec<LearningPathItem>, AppError> {
  let profile = state.get_user(user_id).await?;
  let catalog = state.list_content().await;
  let prompt = prompts::learning_path(&state.prompts, &profile, &catalog, num_items);

  let raw = state.llm.complete(ModelTier::Fast, &state.prompts.learning_path_system, &prompt).await?;
  let path: Vec<LearningPathItem> = decode_literal(&raw)?;
  info!(target: "learning", %user_id, items = path.len(), "Learning path generated");
  Ok(path)
}

#[instrument(level = "info", skip(state), fields(%user_id))]
pub async fn recommend_content(
  state: &AppState,
  user_id: &str,
  num_recommendations: usize,
) -> Result<Vec<ContentRecommendation>, AppError> {
  let profile = state.get_user(user_id).await?;
  let catalog = state.list_content().await;
  let prompt = prompts::content_recommendation(&state.prompts, &profile, &catalog, num_recommendations);

  let raw = state.llm.complete(ModelTier::Fast, &state.prompts.recommend_content_system, &prompt).await?;
  let recs: Vec<ContentRecommendation> = decode_literal(&raw)?;
  info!(target: "learning", %user_id, recommendations = recs.len(), "Content recommended");
  Ok(recs)
}

/// Assess a free-text response against a content item and fold the scores into the profile.
#[instrument(level = "info", skip(state, user_response), fields(%user_id, %content_id, response_len = user_response.len()))]
pub async fn assess_skills(
  state: &AppState,
  user_id: &str,
  content_id: &str,
  user_response: &str,
) -> Result<SkillAssessment, AppError> {
  let content = state.get_content(content_id).await?;
  // Unknown users fail before spending a model call.
  state.get_user(user_id).await?;
  let prompt = prompts::skill_assessment(&state.prompts, &content, user_response);

  let raw = state.llm.complete(ModelTier::Fast, &state.prompts.assess_skills_system, &prompt).await?;
  let assessment: SkillAssessment = decode_literal(&raw)?;

  let profile = state.update_user_skills(user_id, |skills| apply_assessment(skills, &assessment)).await?;
  info!(target: "learning", %user_id, %content_id, assessed = assessment.len(), tracked = profile.skills.len(), "Skills assessed");
  Ok(assessment)
}
