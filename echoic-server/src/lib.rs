//! echoic-server library interface
//!
//! Exposes the application state and router for the binary and for
//! integration tests.

pub mod api;
pub mod db;
pub mod error;
pub mod services;
pub mod utils;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::services::PronunciationPipeline;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub pipeline: Arc<PronunciationPipeline>,
    /// Uploaded song audio
    pub uploads_dir: PathBuf,
    /// Evaluation recordings
    pub recordings_dir: PathBuf,
    /// Request body limit in bytes
    pub max_upload_bytes: usize,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        pipeline: PronunciationPipeline,
        uploads_dir: PathBuf,
        recordings_dir: PathBuf,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            db,
            pipeline: Arc::new(pipeline),
            uploads_dir,
            recordings_dir,
            max_upload_bytes,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
///
/// Health, register and login are public; everything else requires a
/// bearer session token.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let protected = Router::new()
        .route("/api/logout", post(api::logout))
        .route("/api/songs", get(api::list_songs).post(api::create_song))
        .route("/api/songs/:id", get(api::get_song).delete(api::delete_song))
        .route("/api/evaluate", post(api::evaluate))
        .route("/api/attempts/:song_id", get(api::list_attempts))
        .nest_service("/uploads", ServeDir::new(&state.uploads_dir))
        .nest_service("/recordings", ServeDir::new(&state.recordings_dir))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    let public = Router::new()
        .route("/api/register", post(api::register))
        .route("/api/login", post(api::login))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
