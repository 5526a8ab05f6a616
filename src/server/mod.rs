//! HTTP surface: shared state, bearer-token extraction, and the router.
//!
//! Routes:
//!
//! - `POST /auth/register`, `POST /auth/login` — open
//! - `POST /content/upload` — multipart ingestion
//! - `GET  /content/list`, `GET /content/search` — owner-scoped reads
//! - `GET  /content/{id}`, `DELETE /content/{id}` — single-item access
//!
//! Everything under `/content` requires `Authorization: Bearer <token>`.

pub mod auth_routes;
pub mod content_routes;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::extract::{DefaultBodyLimit, FromRequestParts};
use axum::http::header;
use axum::http::request::Parts;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{PasswordHasher, SaltedSha256, SessionTokens, TokenService};
use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::ingest::{
    DiskBlobStore, HttpPageFetcher, IngestionPipeline, PdfTextExtractor, MAX_UPLOAD_BYTES,
};
use crate::store::{ContentStore, UserDirectory};

/// Everything the handlers share
pub struct AppState {
    pub users: UserDirectory,
    pub content: ContentStore,
    pub pipeline: IngestionPipeline,
    pub passwords: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenService>,
}

/// Handler-side handle to the shared state
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Wire up the default collaborators from the server configuration
    pub fn with_defaults(config: &ServerConfig) -> Result<SharedState> {
        let fetcher = HttpPageFetcher::new(Duration::from_secs(config.fetch_timeout_secs))?;
        let pipeline = IngestionPipeline::new(
            Arc::new(DiskBlobStore::new(config.upload_dir.clone())),
            Arc::new(PdfTextExtractor),
            Arc::new(fetcher),
        );

        Ok(Arc::new(Self {
            users: UserDirectory::new(),
            content: ContentStore::new(),
            pipeline,
            passwords: Arc::new(SaltedSha256),
            tokens: Arc::new(SessionTokens::new()),
        }))
    }
}

/// The authenticated caller's user id, resolved from the bearer token.
///
/// Rejects with `Unauthorized` when the header is missing or malformed,
/// the token is unknown, or the user record no longer resolves.
pub struct AuthUser(pub u64);

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = header.strip_prefix("Bearer ").ok_or(ApiError::Unauthorized)?;

        let user_id = state
            .tokens
            .verify(token)
            .await
            .ok_or(ApiError::Unauthorized)?;

        if state.users.find_by_id(user_id).await.is_none() {
            return Err(ApiError::Unauthorized);
        }

        Ok(AuthUser(user_id))
    }
}

/// Build the application router
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/auth/register", post(auth_routes::register))
        .route("/auth/login", post(auth_routes::login))
        .route("/content/upload", post(content_routes::upload))
        .route("/content/list", get(content_routes::list))
        .route("/content/search", get(content_routes::search))
        .route(
            "/content/{id}",
            get(content_routes::get_one).delete(content_routes::delete_one),
        )
        // The pipeline enforces the exact 10 MiB file policy; the body
        // limit only needs headroom for multipart framing.
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
