//! HTTP endpoint handlers. These are thin wrappers that forward to the service modules.
//! Each handler is instrumented; failures surface as `AppError` responses.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use tracing::{info, instrument};

use crate::domain::{
    ContentItem, ContentRecommendation, LearningPathItem, Quiz, QuizAttemptResult, UserProfile, Video,
    VideoSelector, VideoStats,
};
use crate::error::AppError;
use crate::protocol::*;
use crate::state::AppState;
use crate::{learning, quiz, videos};

type ApiResult<T> = Result<Json<T>, AppError>;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
    Json(HealthOut { ok: true })
}

//
// Learning system
//

#[instrument(level = "info", skip(state))]
pub async fn http_list_content(State(state): State<Arc<AppState>>) -> Json<Vec<ContentItem>> {
    Json(state.list_content().await)
}

#[instrument(level = "info", skip(state, body), fields(id = %body.id))]
pub async fn http_add_content(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AddContentIn>,
) -> ApiResult<ContentItem> {
    let item = ContentItem { id: body.id, title: body.title, description: body.description, skills: body.skills };
    let item = state.add_content(item).await?;
    info!(target: "learning", id = %item.id, skills = item.skills.len(), "Content added");
    Ok(Json(item))
}

#[instrument(level = "info", skip(state, body), fields(id = %body.id))]
pub async fn http_add_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AddUserIn>,
) -> ApiResult<UserProfile> {
    let user = state.add_user(&body.id, &body.goals, &body.background).await?;
    info!(target: "learning", id = %user.id, "User added");
    Ok(Json(user))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<UserProfile> {
    Ok(Json(state.get_user(&user_id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_learning_path(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(q): Query<LearningPathQuery>,
) -> ApiResult<Vec<LearningPathItem>> {
    let n = q.num_items.unwrap_or(learning::DEFAULT_PATH_ITEMS);
    Ok(Json(learning::generate_learning_path(&state, &user_id, n).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_recommend_content(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(q): Query<RecommendQuery>,
) -> ApiResult<Vec<ContentRecommendation>> {
    let n = q.num_recommendations.unwrap_or(learning::DEFAULT_RECOMMENDATIONS);
    Ok(Json(learning::recommend_content(&state, &user_id, n).await?))
}

#[instrument(level = "info", skip(state, body), fields(%user_id, content_id = %body.content_id))]
pub async fn http_assess_skills(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(body): Json<AssessIn>,
) -> ApiResult<AssessOut> {
    let assessment = learning::assess_skills(&state, &user_id, &body.content_id, &body.response).await?;
    let skills = state.get_user(&user_id).await?.skills;
    Ok(Json(AssessOut { assessment, skills }))
}

//
// Quiz platform
//

#[instrument(level = "info", skip(state))]
pub async fn http_create_quiz(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateQuizIn>,
) -> ApiResult<Quiz> {
    if body.num_questions == 0 {
        return Err(AppError::InvalidInput("numQuestions must be at least 1".into()));
    }
    let quiz = quiz::create_quiz(&state, body.quiz_id, &body.topic, &body.difficulty, body.num_questions).await?;
    Ok(Json(quiz))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_quiz(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<String>,
) -> ApiResult<Quiz> {
    Ok(Json(state.get_quiz(&quiz_id).await?))
}

#[instrument(level = "info", skip(state, body), fields(%quiz_id, user_id = %body.user_id))]
pub async fn http_take_quiz(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<String>,
    Json(body): Json<AttemptIn>,
) -> ApiResult<QuizAttemptResult> {
    Ok(Json(quiz::take_quiz(&state, &body.user_id, &quiz_id, &body.answers).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_quiz_feedback(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<String>,
    Query(q): Query<UserQuery>,
) -> ApiResult<TextOut> {
    let text = quiz::personalized_feedback(&state, &q.user_id, &quiz_id).await?;
    Ok(Json(TextOut { text }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_next_quiz(
    State(state): State<Arc<AppState>>,
    Query(q): Query<UserQuery>,
) -> ApiResult<TextOut> {
    let text = quiz::recommend_next_quiz(&state, &q.user_id).await?;
    Ok(Json(TextOut { text }))
}

//
// Videos
//

/// Lists the catalog, or the first video with `?name=` (404 when absent).
#[instrument(level = "info", skip(state))]
pub async fn http_list_videos(
    State(state): State<Arc<AppState>>,
    Query(q): Query<VideoQuery>,
) -> ApiResult<Vec<Video>> {
    match q.name {
        Some(name) => {
            let video = state
                .find_video(&VideoSelector::Name(name.clone()))
                .await
                .ok_or_else(|| AppError::not_found("video", name))?;
            Ok(Json(vec![video]))
        }
        None => Ok(Json(state.list_videos().await)),
    }
}

#[instrument(level = "info", skip(state))]
pub async fn http_add_video(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AddVideoIn>,
) -> ApiResult<Video> {
    let video = state.add_video(&body.name, &body.tag).await;
    info!(target: "videos", id = %video.id, name = %video.name, tag = %video.tag, "Video added");
    Ok(Json(video))
}

#[instrument(level = "info", skip(state))]
pub async fn http_like_video(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VideoSelectorIn>,
) -> ApiResult<VideoActionOut> {
    let selector = body.into_selector()?;
    Ok(Json(videos::like_video(&state, &selector).await.into()))
}

#[instrument(level = "info", skip(state))]
pub async fn http_view_video(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VideoSelectorIn>,
) -> ApiResult<VideoActionOut> {
    let selector = body.into_selector()?;
    Ok(Json(videos::view_video(&state, &selector).await.into()))
}

#[instrument(level = "info", skip(state))]
pub async fn http_video_stats(State(state): State<Arc<AppState>>) -> Json<Vec<VideoStats>> {
    Json(videos::video_stats(&state).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_popular_tags(
    State(state): State<Arc<AppState>>,
    Query(q): Query<PopularTagsQuery>,
) -> Json<PopularTagsOut> {
    let tags = videos::popular_tags(&state, q.n.unwrap_or(videos::DEFAULT_POPULAR_TAGS)).await;
    Json(PopularTagsOut { tags })
}

#[instrument(level = "info", skip(state, body), fields(preference_len = body.preference.len()))]
pub async fn http_video_path(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VideoPathIn>,
) -> ApiResult<VideoPathOut> {
    let path = videos::generate_video_path(&state, &body.preference).await?;
    Ok(Json(VideoPathOut { path }))
}
