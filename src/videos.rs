//! Video recommendation service: likes, views, stats, popular tags and a model-ranked path.
//!
//! The ranked path is the one decode path that recovers: a malformed reply yields an
//! empty list (logged) instead of an error.

use std::collections::HashMap;

use tracing::{info, instrument};

use crate::completion::ModelTier;
use crate::decode::decode_json_or_empty;
use crate::domain::{RankedVideo, Video, VideoSelector, VideoStats};
use crate::error::AppError;
use crate::prompts;
use crate::state::AppState;

pub const DEFAULT_POPULAR_TAGS: usize = 3;

pub async fn video_stats(state: &AppState) -> Vec<VideoStats> {
  state
    .list_videos()
    .await
    .into_iter()
    .map(|v| VideoStats { id: v.id, name: v.name, likes: v.likes, views: v.views })
    .collect()
}

/// Tags ordered by total views, highest first; ties keep first-appearance order.
pub fn rank_tags_by_views(videos: &[Video], n: usize) -> Vec<String> {
  let mut order: Vec<&str> = Vec::new();
  let mut totals: HashMap<&str, u64> = HashMap::new();
  for v in videos {
    let total = totals.entry(v.tag.as_str()).or_insert_with(|| {
      order.push(v.tag.as_str());
      0
    });
    *total += v.views;
  }
  // Stable sort keeps first-appearance order among equal totals.
  order.sort_by(|a, b| totals[b].cmp(&totals[a]));
  order.into_iter().take(n).map(str::to_string).collect()
}

pub async fn popular_tags(state: &AppState, n: usize) -> Vec<String> {
  rank_tags_by_views(&state.list_videos().await, n)
}

#[instrument(level = "info", skip(state))]
pub async fn like_video(state: &AppState, selector: &VideoSelector) -> Option<Video> {
  let v = state.like_video(selector).await?;
  info!(target: "videos", id = %v.id, likes = v.likes, "Video liked");
  Some(v)
}

#[instrument(level = "info", skip(state))]
pub async fn view_video(state: &AppState, selector: &VideoSelector) -> Option<Video> {
  let v = state.view_video(selector).await?;
  info!(target: "videos", id = %v.id, views = v.views, "Video viewed");
  Some(v)
}

/// Ask the strong model to rank the catalog for `preference`.
/// Transport failures propagate; undecodable replies give an empty path.
#[instrument(level = "info", skip(state, preference), fields(preference_len = preference.len()))]
pub async fn generate_video_path(state: &AppState, preference: &str) -> Result<Vec<RankedVideo>, AppError> {
  let videos = state.list_videos().await;
  let prompt = prompts::video_path(&state.prompts, preference, &videos);

  let raw = state.llm.complete(ModelTier::Strong, &state.prompts.video_path_system, &prompt).await?;
  let path: Vec<RankedVideo> = decode_json_or_empty(&raw);
  info!(target: "videos", ranked = path.len(), catalog = videos.len(), "Video learning path generated");
  Ok(path)
}
