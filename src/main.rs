//! LearnHub · AI Learning Backend
//!
//! - Axum HTTP API: learning paths, content recommendations, skill assessment,
//!   generated quizzes and a video catalog with a model-ranked learning path
//! - OpenAI-compatible chat completion client (Gemini by default)
//! - Static frontend fallback (STATIC_DIR/index.html)
//!
//! Important env variables:
//!   PORT              : u16 (default 3000)
//!   LLM_API_KEY       : required (falls back to GOOGLE_API_KEY)
//!   LLM_BASE_URL      : default Gemini OpenAI-compatible endpoint
//!   LLM_FAST_MODEL    : default "gemini-1.5-flash" (learning operations)
//!   LLM_STRONG_MODEL  : default "gemini-1.5-pro" (quizzes and videos)
//!   LLM_TIMEOUT_SECS  : request timeout, default 60
//!   AGENT_CONFIG_PATH : path to TOML config (prompts + seed catalogs)
//!   STATIC_DIR        : frontend directory, default "./static"
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod error;
mod config;
mod literal;
mod decode;
mod completion;
mod prompts;
mod seeds;
mod state;
mod protocol;
mod learning;
mod quiz;
mod videos;
mod routes;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared state: in-memory catalogs, completion client, prompts. Missing credentials abort here.
  let state = match AppState::from_env() {
    Ok(s) => Arc::new(s),
    Err(e) => {
      error!(target: "learnhub_backend", error = %e, "Startup failed");
      return Err(e.into());
    }
  };

  let static_dir = std::env::var("STATIC_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("./static"));
  let app = build_router(state, &static_dir);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "learnhub_backend", %addr, static_dir = %static_dir.display(), "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
