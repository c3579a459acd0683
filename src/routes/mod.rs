//! Router assembly: HTTP endpoints, static files, CORS, and HTTP tracing.

use std::path::Path;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - JSON API under `/api/v1/...` (learning, quizzes, videos)
/// - Static frontend from `static_dir` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>, static_dir: &Path) -> Router {
    let static_service = ServeDir::new(static_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/api/v1/health", get(http::http_health))
        // Learning system
        .route("/api/v1/content", get(http::http_list_content).post(http::http_add_content))
        .route("/api/v1/users", post(http::http_add_user))
        .route("/api/v1/users/:user_id", get(http::http_get_user))
        .route("/api/v1/users/:user_id/learning-path", post(http::http_learning_path))
        .route("/api/v1/users/:user_id/recommendations", post(http::http_recommend_content))
        .route("/api/v1/users/:user_id/assessments", post(http::http_assess_skills))
        // Quiz platform
        .route("/api/v1/quizzes", post(http::http_create_quiz))
        .route("/api/v1/quizzes/:quiz_id", get(http::http_get_quiz))
        .route("/api/v1/quizzes/:quiz_id/attempts", post(http::http_take_quiz))
        .route("/api/v1/quizzes/:quiz_id/feedback", get(http::http_quiz_feedback))
        .route("/api/v1/quiz-recommendation", get(http::http_next_quiz))
        // Videos
        .route("/api/v1/videos", get(http::http_list_videos).post(http::http_add_video))
        .route("/api/v1/videos/like", post(http::http_like_video))
        .route("/api/v1/videos/view", post(http::http_view_video))
        .route("/api/v1/videos/stats", get(http::http_video_stats))
        .route("/api/v1/videos/popular-tags", get(http::http_popular_tags))
        .route("/api/v1/videos/learning-path", post(http::http_video_path))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}
