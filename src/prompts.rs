//! Prompt rendering: turns store snapshots into the single text request sent to the model.
//!
//! Each renderer fills the operation's user template from `Prompts`. Nothing here validates
//! anything; looking entities up is the caller's job.

use crate::config::Prompts;
use crate::domain::{ContentItem, Quiz, QuizHistoryEntry, UserProfile, Video};
use crate::util::fill_template;

/// One line per catalog item: `ID: <id>, Title: <title>, Skills: a, b`.
pub fn content_catalog<'a>(items: impl IntoIterator<Item = &'a ContentItem>) -> String {
  items
    .into_iter()
    .map(|c| format!("ID: {}, Title: {}, Skills: {}", c.id, c.title, c.skills.join(", ")))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Skill scores sorted by name, e.g. `programming: 0.80, statistics: 0.35`.
pub fn skill_scores(profile: &UserProfile) -> String {
  if profile.skills.is_empty() {
    return "none assessed yet".into();
  }
  let mut pairs: Vec<_> = profile.skills.iter().collect();
  pairs.sort_by(|a, b| a.0.cmp(b.0));
  pairs
    .into_iter()
    .map(|(k, v)| format!("{k}: {v:.2}"))
    .collect::<Vec<_>>()
    .join(", ")
}

pub fn learning_path(prompts: &Prompts, profile: &UserProfile, catalog: &[ContentItem], num_items: usize) -> String {
  fill_template(
    &prompts.learning_path_template,
    &[
      ("goals", profile.goals.as_str()),
      ("background", profile.background.as_str()),
      ("num_items", num_items.to_string().as_str()),
      ("catalog", content_catalog(catalog).as_str()),
    ],
  )
}

pub fn content_recommendation(
  prompts: &Prompts,
  profile: &UserProfile,
  catalog: &[ContentItem],
  num_recommendations: usize,
) -> String {
  fill_template(
    &prompts.recommend_content_template,
    &[
      ("goals", profile.goals.as_str()),
      ("background", profile.background.as_str()),
      ("skills", skill_scores(profile).as_str()),
      ("num_recommendations", num_recommendations.to_string().as_str()),
      ("catalog", content_catalog(catalog).as_str()),
    ],
  )
}

pub fn skill_assessment(prompts: &Prompts, content: &ContentItem, user_response: &str) -> String {
  fill_template(
    &prompts.assess_skills_template,
    &[
      ("title", content.title.as_str()),
      ("description", content.description.as_str()),
      ("skills", content.skills.join(", ").as_str()),
      ("user_response", user_response),
    ],
  )
}

pub fn quiz_generation(prompts: &Prompts, topic: &str, difficulty: &str, num_questions: usize) -> String {
  fill_template(
    &prompts.quiz_generation_template,
    &[("topic", topic), ("difficulty", difficulty), ("num_questions", num_questions.to_string().as_str())],
  )
}

pub fn quiz_feedback(prompts: &Prompts, quiz: &Quiz, result: &QuizHistoryEntry) -> String {
  fill_template(
    &prompts.quiz_feedback_template,
    &[
      ("topic", quiz.topic.as_str()),
      ("difficulty", quiz.difficulty.as_str()),
      ("score", result.score.to_string().as_str()),
      ("total_questions", result.total_questions.to_string().as_str()),
    ],
  )
}

/// `quizzes` are (id, topic) pairs.
pub fn next_quiz(prompts: &Prompts, history: &[QuizHistoryEntry], quizzes: &[(String, String)]) -> String {
  let history_text = history
    .iter()
    .map(|h| format!("- Quiz ID: {}, Score: {} out of {}", h.quiz_id, h.score, h.total_questions))
    .collect::<Vec<_>>()
    .join("\n");
  let quizzes_text = quizzes
    .iter()
    .map(|(id, topic)| format!("- Quiz ID: {id}, Topic: {topic}"))
    .collect::<Vec<_>>()
    .join("\n");
  fill_template(&prompts.next_quiz_template, &[("history", history_text.as_str()), ("quizzes", quizzes_text.as_str())])
}

pub fn video_roster(videos: &[Video]) -> String {
  videos
    .iter()
    .map(|v| {
      let last = v
        .last_viewed
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "never".into());
      format!(
        "- Name: {}, Tag: {}, Likes: {}, Views: {}, Last viewed: {}",
        v.name, v.tag, v.likes, v.views, last
      )
    })
    .collect::<Vec<_>>()
    .join("\n")
}

pub fn video_path(prompts: &Prompts, preference: &str, videos: &[Video]) -> String {
  fill_template(
    &prompts.video_path_template,
    &[("preference", preference), ("videos", video_roster(videos).as_str())],
  )
}
