//! anidex-server library interface
//!
//! Exposes the service components and router for the binaries and for
//! integration testing.

pub mod api;
pub mod classifier;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod pagination;
pub mod pipeline;
pub mod services;
pub mod storage;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderMap;
use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::path::PathBuf;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::pipeline::{RequestOrigin, UploadPipeline};
use crate::storage::MEDIA_URL_PREFIX;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Upload orchestration (classifier, species lookup, media store)
    pub pipeline: UploadPipeline,
    /// Database connection pool
    pub db: SqlitePool,
    /// Directory served under `/media/`
    pub media_root: PathBuf,
    /// Origin used when a request carries no usable `Host` header
    pub fallback_origin: RequestOrigin,
    /// Configured public origin; overrides the `Host` header when set
    pub public_origin: Option<RequestOrigin>,
    /// Maximum accepted request body size
    pub max_upload_bytes: usize,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        pipeline: UploadPipeline,
        db: SqlitePool,
        media_root: PathBuf,
        fallback_origin: RequestOrigin,
    ) -> Self {
        Self {
            pipeline,
            db,
            media_root,
            fallback_origin,
            public_origin: None,
            max_upload_bytes: anidex_common::config::DEFAULT_MAX_UPLOAD_BYTES,
            startup_time: Utc::now(),
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    pub fn with_public_origin(mut self, origin: RequestOrigin) -> Self {
        self.public_origin = Some(origin);
        self
    }

    /// Origin for absolute URLs returned to this request
    pub fn origin_for(&self, headers: &HeaderMap) -> RequestOrigin {
        api::request_origin(headers, self.public_origin.as_ref(), &self.fallback_origin)
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let media = ServeDir::new(&state.media_root);
    let body_limit = state.max_upload_bytes;

    Router::new()
        .merge(api::upload_routes())
        .merge(api::animal_routes())
        .merge(api::health_routes())
        .nest_service(MEDIA_URL_PREFIX, media)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
