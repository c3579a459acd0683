//! Application state: in-memory catalogs, prompts and the completion client.
//!
//! This module owns:
//!   - the content catalog (by id, ordered) and learner profiles
//!   - generated quizzes and per-user quiz history
//!   - the video catalog (catalog order matters for name lookups)
//!   - the prompts struct (from TOML or defaults)
//!   - the completion client
//!
//! Every catalog sits behind its own lock. Callers clone snapshots out before talking to
//! the model, so no lock is ever held across a network call.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::completion::CompletionClient;
use crate::config::{load_agent_config_from_env, AgentConfig, Prompts};
use crate::domain::{
    ContentItem, Quiz, QuizHistoryEntry, UserProfile, Video, VideoSelector,
};
use crate::error::AppError;
use crate::seeds::sample_videos;

#[derive(Clone)]
pub struct AppState {
    pub content: Arc<RwLock<BTreeMap<String, ContentItem>>>,
    pub users: Arc<RwLock<HashMap<String, UserProfile>>>,
    pub quizzes: Arc<RwLock<HashMap<String, Quiz>>>,
    pub quiz_history: Arc<RwLock<HashMap<String, Vec<QuizHistoryEntry>>>>,
    pub videos: Arc<RwLock<Vec<Video>>>,
    pub llm: CompletionClient,
    pub prompts: Prompts,
}

impl AppState {
    /// Build state from env: load config, build the completion client, seed catalogs.
    /// Fails fast when the LLM credential is missing.
    #[instrument(level = "info", skip_all)]
    pub fn from_env() -> Result<Self, AppError> {
        let cfg = load_agent_config_from_env().unwrap_or_default();
        let llm = CompletionClient::from_env()?;
        info!(target: "learnhub_backend", base_url = %llm.base_url, fast_model = %llm.fast_model, strong_model = %llm.strong_model, "Completion client ready.");
        Ok(Self::new(llm, cfg))
    }

    /// Seed catalogs from config. Duplicate ids in the config are skipped.
    pub fn new(llm: CompletionClient, cfg: AgentConfig) -> Self {
        let mut content = BTreeMap::new();
        for c in cfg.content {
            if content.contains_key(&c.id) {
                error!(target: "learning", id = %c.id, "Skipping duplicate content id in config.");
                continue;
            }
            content.insert(
                c.id.clone(),
                ContentItem { id: c.id, title: c.title, description: c.description, skills: c.skills },
            );
        }

        let mut users = HashMap::new();
        for u in cfg.users {
            if users.contains_key(&u.id) {
                error!(target: "learning", id = %u.id, "Skipping duplicate user id in config.");
                continue;
            }
            users.insert(
                u.id.clone(),
                UserProfile { id: u.id, goals: u.goals, background: u.background, skills: HashMap::new() },
            );
        }

        let mut videos = if cfg.seed_sample_videos { sample_videos() } else { Vec::new() };
        videos.extend(
            cfg.videos
                .into_iter()
                .map(|v| Video::new(Uuid::new_v4().to_string(), v.name, v.tag)),
        );

        info!(target: "learnhub_backend", content = content.len(), users = users.len(), videos = videos.len(), "Startup catalog inventory");

        Self {
            content: Arc::new(RwLock::new(content)),
            users: Arc::new(RwLock::new(users)),
            quizzes: Arc::new(RwLock::new(HashMap::new())),
            quiz_history: Arc::new(RwLock::new(HashMap::new())),
            videos: Arc::new(RwLock::new(videos)),
            llm,
            prompts: cfg.prompts,
        }
    }

    // --- Content catalog ---

    #[instrument(level = "debug", skip(self, item), fields(id = %item.id))]
    pub async fn add_content(&self, item: ContentItem) -> Result<ContentItem, AppError> {
        let mut content = self.content.write().await;
        if content.contains_key(&item.id) {
            return Err(AppError::already_exists("content", &item.id));
        }
        content.insert(item.id.clone(), item.clone());
        Ok(item)
    }

    pub async fn get_content(&self, id: &str) -> Result<ContentItem, AppError> {
        self.content
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::not_found("content", id))
    }

    pub async fn list_content(&self) -> Vec<ContentItem> {
        self.content.read().await.values().cloned().collect()
    }

    // --- Learner profiles ---

    #[instrument(level = "debug", skip(self, goals, background))]
    pub async fn add_user(&self, id: &str, goals: &str, background: &str) -> Result<UserProfile, AppError> {
        let mut users = self.users.write().await;
        if users.contains_key(id) {
            return Err(AppError::already_exists("user", id));
        }
        let profile = UserProfile {
            id: id.to_string(),
            goals: goals.to_string(),
            background: background.to_string(),
            skills: HashMap::new(),
        };
        users.insert(id.to_string(), profile.clone());
        Ok(profile)
    }

    pub async fn get_user(&self, id: &str) -> Result<UserProfile, AppError> {
        self.users
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::not_found("user", id))
    }

    /// Mutate a profile's skill map under the write lock; returns the updated profile.
    pub async fn update_user_skills(
        &self,
        id: &str,
        update: impl FnOnce(&mut HashMap<String, f64>),
    ) -> Result<UserProfile, AppError> {
        let mut users = self.users.write().await;
        let profile = users.get_mut(id).ok_or_else(|| AppError::not_found("user", id))?;
        update(&mut profile.skills);
        Ok(profile.clone())
    }

    // --- Quizzes and history ---

    #[instrument(level = "debug", skip(self, quiz), fields(id = %quiz.id, questions = quiz.questions.len()))]
    pub async fn insert_quiz(&self, quiz: Quiz) -> Result<(), AppError> {
        let mut quizzes = self.quizzes.write().await;
        if quizzes.contains_key(&quiz.id) {
            return Err(AppError::already_exists("quiz", &quiz.id));
        }
        quizzes.insert(quiz.id.clone(), quiz);
        Ok(())
    }

    pub async fn contains_quiz(&self, id: &str) -> bool {
        self.quizzes.read().await.contains_key(id)
    }

    pub async fn get_quiz(&self, id: &str) -> Result<Quiz, AppError> {
        self.quizzes
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::not_found("quiz", id))
    }

    /// (id, topic) of every quiz, sorted by id.
    pub async fn quiz_topics(&self) -> Vec<(String, String)> {
        let mut out: Vec<_> = self
            .quizzes
            .read()
            .await
            .values()
            .map(|q| (q.id.clone(), q.topic.clone()))
            .collect();
        out.sort();
        out
    }

    /// Append-only; creates the user's history on first attempt.
    pub async fn append_quiz_history(&self, user_id: &str, entry: QuizHistoryEntry) {
        self.quiz_history
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .push(entry);
    }

    pub async fn quiz_history_for(&self, user_id: &str) -> Vec<QuizHistoryEntry> {
        self.quiz_history.read().await.get(user_id).cloned().unwrap_or_default()
    }

    // --- Videos ---

    pub async fn add_video(&self, name: &str, tag: &str) -> Video {
        let video = Video::new(Uuid::new_v4().to_string(), name, tag);
        self.videos.write().await.push(video.clone());
        video
    }

    pub async fn list_videos(&self) -> Vec<Video> {
        self.videos.read().await.clone()
    }

    pub async fn find_video(&self, selector: &VideoSelector) -> Option<Video> {
        let videos = self.videos.read().await;
        let found = position_of(&videos, selector).map(|i| videos[i].clone());
        if found.is_none() {
            warn!(target: "videos", %selector, "Video not found");
        }
        found
    }

    /// Apply `f` to the selected video. Unknown selectors are logged and yield `None`.
    pub async fn update_video(&self, selector: &VideoSelector, f: impl FnOnce(&mut Video)) -> Option<Video> {
        let mut videos = self.videos.write().await;
        match position_of(&videos, selector) {
            Some(i) => {
                f(&mut videos[i]);
                Some(videos[i].clone())
            }
            None => {
                warn!(target: "videos", %selector, "Video not found");
                None
            }
        }
    }

    pub async fn like_video(&self, selector: &VideoSelector) -> Option<Video> {
        self.update_video(selector, Video::add_like).await
    }

    pub async fn view_video(&self, selector: &VideoSelector) -> Option<Video> {
        let now = Utc::now();
        self.update_video(selector, |v| v.record_view(now)).await
    }
}

fn position_of(videos: &[Video], selector: &VideoSelector) -> Option<usize> {
    match selector {
        VideoSelector::Id(id) => videos.iter().position(|v| &v.id == id),
        VideoSelector::Name(name) => videos.iter().position(|v| &v.name == name),
    }
}
