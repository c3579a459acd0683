//! Quiz platform: generation, scoring, history, personalized feedback and next-quiz advice.

use tracing::{info, instrument};
use uuid::Uuid;

use crate::completion::ModelTier;
use crate::decode::{decode_literal, decode_plain};
use crate::domain::{Question, QuestionFeedback, Quiz, QuizAttemptResult, QuizHistoryEntry};
use crate::error::AppError;
use crate::prompts;
use crate::state::AppState;

pub const NO_QUIZ_RESULT: &str = "No quiz result found for this user and quiz combination.";
pub const NO_QUIZ_HISTORY: &str = "No quiz history found. Please take a quiz first.";

/// Score submitted answers against the questions, pairing positions up to the shorter list.
/// Extra answers or unanswered questions are ignored.
pub fn score_answers(questions: &[Question], submitted: &[String]) -> (usize, Vec<QuestionFeedback>) {
  let mut score = 0;
  let mut feedback = Vec::with_capacity(questions.len().min(submitted.len()));
  for (i, (q, answer)) in questions.iter().zip(submitted).enumerate() {
    let is_correct = answer.to_uppercase() == q.correct_answer;
    if is_correct {
      score += 1;
    }
    feedback.push(QuestionFeedback {
      question_number: i + 1,
      is_correct,
      correct_answer: q.correct_answer.clone(),
      explanation: q.explanation.clone(),
    });
  }
  (score, feedback)
}

/// Generate a quiz with the strong model and store it. Without an id, one is generated.
#[instrument(level = "info", skip(state))]
pub async fn create_quiz(
  state: &AppState,
  quiz_id: Option<String>,
  topic: &str,
  difficulty: &str,
  num_questions: usize,
) -> Result<Quiz, AppError> {
  let id = quiz_id.unwrap_or_else(|| Uuid::new_v4().to_string());
  if state.contains_quiz(&id).await {
    return Err(AppError::already_exists("quiz", id));
  }
  let prompt = prompts::quiz_generation(&state.prompts, topic, difficulty, num_questions);

  let raw = state.llm.complete(ModelTier::Strong, &state.prompts.quiz_generation_system, &prompt).await?;
  let questions: Vec<Question> = decode_literal(&raw)?;

  let quiz = Quiz { id, topic: topic.to_string(), difficulty: difficulty.to_string(), questions };
  state.insert_quiz(quiz.clone()).await?;
  info!(target: "quiz", id = %quiz.id, %topic, %difficulty, questions = quiz.questions.len(), "Quiz created");
  Ok(quiz)
}

#[instrument(level = "info", skip(state, answers), fields(%user_id, %quiz_id, answer_count = answers.len()))]
pub async fn take_quiz(
  state: &AppState,
  user_id: &str,
  quiz_id: &str,
  answers: &[String],
) -> Result<QuizAttemptResult, AppError> {
  let quiz = state.get_quiz(quiz_id).await?;
  let (score, feedback) = score_answers(&quiz.questions, answers);
  let result = QuizAttemptResult {
    user_id: user_id.to_string(),
    quiz_id: quiz_id.to_string(),
    score,
    total_questions: quiz.questions.len(),
    feedback,
  };
  state.append_quiz_history(user_id, QuizHistoryEntry::from(&result)).await;
  info!(target: "quiz", %user_id, %quiz_id, score, total = result.total_questions, "Quiz attempt scored");
  Ok(result)
}

/// Free-text feedback on the user's first recorded attempt at `quiz_id`.
#[instrument(level = "info", skip(state), fields(%user_id, %quiz_id))]
pub async fn personalized_feedback(state: &AppState, user_id: &str, quiz_id: &str) -> Result<String, AppError> {
  let history = state.quiz_history_for(user_id).await;
  let Some(result) = history.iter().find(|h| h.quiz_id == quiz_id) else {
    return Ok(NO_QUIZ_RESULT.to_string());
  };
  let quiz = state.get_quiz(quiz_id).await?;
  let prompt = prompts::quiz_feedback(&state.prompts, &quiz, result);

  let raw = state.llm.complete(ModelTier::Strong, &state.prompts.quiz_feedback_system, &prompt).await?;
  Ok(decode_plain(&raw))
}

#[instrument(level = "info", skip(state), fields(%user_id))]
pub async fn recommend_next_quiz(state: &AppState, user_id: &str) -> Result<String, AppError> {
  let history = state.quiz_history_for(user_id).await;
  if history.is_empty() {
    return Ok(NO_QUIZ_HISTORY.to_string());
  }
  let quizzes = state.quiz_topics().await;
  let prompt = prompts::next_quiz(&state.prompts, &history, &quizzes);

  let raw = state.llm.complete(ModelTier::Strong, &state.prompts.next_quiz_system, &prompt).await?;
  Ok(decode_plain(&raw))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::completion::tests::completion_body;
  use crate::domain::QuestionOptions;
  use crate::state::tests::{offline_state, state_for};

  fn question(correct: &str) -> Question {
    Question {
      question: format!("Pick {correct}"),
      options: QuestionOptions::List(vec!["a".into(), "b".into(), "c".into(), "d".into()]),
      correct_answer: correct.into(),
      explanation: format!("{correct} is right"),
    }
  }

  fn answers(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
  }

  async fn seed_quiz(state: &AppState) {
    state
      .insert_quiz(Quiz {
        id: "Q1".into(),
        topic: "Python Basics".into(),
        difficulty: "Beginner".into(),
        questions: vec![question("A"), question("B"), question("C")],
      })
      .await
      .unwrap();
  }

  #[test]
  fn scoring_is_case_insensitive_and_positional() {
    let qs = vec![question("A"), question("B"), question("C")];
    let (score, feedback) = score_answers(&qs, &answers(&["a", "b", "d"]));
    assert_eq!(score, 2);
    assert_eq!(feedback.len(), 3);
    assert!(feedback[0].is_correct && feedback[1].is_correct && !feedback[2].is_correct);
    assert_eq!(feedback[2].question_number, 3);
    assert_eq!(feedback[2].correct_answer, "C");
    assert_eq!(feedback[2].explanation, "C is right");
  }

  #[test]
  fn scoring_truncates_to_the_shorter_list() {
    let qs = vec![question("A"), question("B"), question("C")];
    let (score, feedback) = score_answers(&qs, &answers(&["A"]));
    assert_eq!((score, feedback.len()), (1, 1));
    let (score, feedback) = score_answers(&qs[..1], &answers(&["A", "B", "C"]));
    assert_eq!((score, feedback.len()), (1, 1));
    let (score, feedback) = score_answers(&qs, &[]);
    assert_eq!((score, feedback.len()), (0, 0));
  }

  #[tokio::test]
  async fn take_quiz_records_history_without_feedback_detail() {
    let state = offline_state();
    seed_quiz(&state).await;
    let result = take_quiz(&state, "user123", "Q1", &answers(&["a", "b", "d"])).await.unwrap();
    assert_eq!((result.score, result.total_questions), (2, 3));

    take_quiz(&state, "user123", "Q1", &answers(&["A"])).await.unwrap();
    let history = state.quiz_history_for("user123").await;
    assert_eq!(
      history,
      vec![
        QuizHistoryEntry { quiz_id: "Q1".into(), score: 2, total_questions: 3 },
        QuizHistoryEntry { quiz_id: "Q1".into(), score: 1, total_questions: 3 },
      ]
    );
  }

  #[tokio::test]
  async fn take_quiz_on_unknown_quiz_fails() {
    let state = offline_state();
    let err = take_quiz(&state, "u", "nope", &[]).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound { kind: "quiz", .. }));
    assert!(state.quiz_history_for("u").await.is_empty());
  }

  #[tokio::test]
  async fn feedback_and_recommendation_short_circuit_without_history() {
    let state = offline_state();
    seed_quiz(&state).await;
    assert_eq!(personalized_feedback(&state, "u", "Q1").await.unwrap(), NO_QUIZ_RESULT);
    assert_eq!(recommend_next_quiz(&state, "u").await.unwrap(), NO_QUIZ_HISTORY);
  }

  #[tokio::test]
  async fn create_quiz_stores_decoded_questions_once() {
    let mut server = mockito::Server::new_async().await;
    let state = state_for(&server.url());
    let reply = "```python\n[\n  {'question': 'What is 2+2?', 'options': ['A) 3', 'B) 4', 'C) 5', 'D) 6'], \
                 'correct_answer': 'B', 'explanation': '2+2 is 4.'},\n]\n```";
    let m = server
      .mock("POST", "/chat/completions")
      .match_body(mockito::Matcher::PartialJson(serde_json::json!({ "model": "strong-model" })))
      .with_status(200)
      .with_body(completion_body(reply))
      .expect(1)
      .create_async()
      .await;

    let quiz = create_quiz(&state, Some("PY101".into()), "Python Basics", "Beginner", 1).await.unwrap();
    assert_eq!(quiz.questions.len(), 1);
    assert_eq!(quiz.questions[0].correct_answer, "B");
    assert_eq!(state.get_quiz("PY101").await.unwrap(), quiz);

    let err = create_quiz(&state, Some("PY101".into()), "Python Basics", "Beginner", 1).await.unwrap_err();
    assert!(matches!(err, AppError::AlreadyExists { .. }));
    m.assert_async().await;
  }

  #[tokio::test]
  async fn feedback_uses_first_recorded_attempt() {
    let mut server = mockito::Server::new_async().await;
    let state = state_for(&server.url());
    seed_quiz(&state).await;
    take_quiz(&state, "u", "Q1", &answers(&["A", "B", "C"])).await.unwrap();
    take_quiz(&state, "u", "Q1", &answers(&["D"])).await.unwrap();

    let _m = server
      .mock("POST", "/chat/completions")
      .match_body(mockito::Matcher::Regex("Score: 3 out of 3".into()))
      .with_status(200)
      .with_body(completion_body("  Great work overall.  "))
      .create_async()
      .await;
    let text = personalized_feedback(&state, "u", "Q1").await.unwrap();
    assert_eq!(text, "Great work overall.");
  }

  #[tokio::test]
  async fn next_quiz_recommendation_returns_model_text() {
    let mut server = mockito::Server::new_async().await;
    let state = state_for(&server.url());
    seed_quiz(&state).await;
    take_quiz(&state, "u", "Q1", &answers(&["A"])).await.unwrap();

    let _m = server
      .mock("POST", "/chat/completions")
      .match_body(mockito::Matcher::Regex("Quiz ID: Q1, Topic: Python Basics".into()))
      .with_status(200)
      .with_body(completion_body("Take Q1 again."))
      .create_async()
      .await;
    assert_eq!(recommend_next_quiz(&state, "u").await.unwrap(), "Take Q1 again.");
  }
}
