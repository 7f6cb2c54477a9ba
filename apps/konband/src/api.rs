//! # HTTP State-Sync API
//!
//! Full-snapshot push/pull between collaborating instances.
//!
//! A guest pulls `GET /state` to mirror the host, and pushes
//! `PUT /state` to replace it. Replication is last-snapshot-wins: an
//! inbound snapshot overwrites the local state unconditionally, with no
//! merge of concurrent edits. Every replacement is followed by a fresh
//! analysis, available at `GET /analysis`.

use crate::cli::{Backend, CliError, save_session};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use konband_core::{Report, Session, Snapshot};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared server context: the session plus its persistence target.
pub struct ApiContext {
    session: RwLock<Session>,
    path: PathBuf,
    backend: Backend,
}

impl ApiContext {
    /// Wrap a loaded session for serving.
    #[must_use]
    pub fn new(session: Session, path: PathBuf, backend: Backend) -> Arc<Self> {
        Arc::new(Self {
            session: RwLock::new(session),
            path,
            backend,
        })
    }
}

/// Error response wrapper: persistence failures become 500s.
struct ApiError(CliError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}

impl<E: Into<CliError>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Build the router.
pub fn router(ctx: Arc<ApiContext>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/state", get(get_state).put(put_state))
        .route("/analysis", get(get_analysis))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

/// Serve the API on `addr` until the process is stopped.
pub async fn serve(addr: &str, ctx: Arc<ApiContext>) -> Result<(), CliError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "state-sync server listening");
    axum::serve(listener, router(ctx)).await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

/// Pull the full state as a snapshot.
async fn get_state(State(ctx): State<Arc<ApiContext>>) -> Json<Snapshot> {
    let session = ctx.session.read().await;
    Json(session.snapshot())
}

/// Push a full snapshot, replacing the local state unconditionally.
///
/// A payload that fails to parse is rejected by the extractor before
/// this handler runs, so the local state is untouched on bad input.
async fn put_state(
    State(ctx): State<Arc<ApiContext>>,
    Json(snapshot): Json<Snapshot>,
) -> Result<Json<Report>, ApiError> {
    let mut session = ctx.session.write().await;
    session.replace_state(snapshot);
    save_session(&session, &ctx.path, ctx.backend)?;
    info!(
        members = session.state().members.len(),
        bands = session.state().new_bands.len(),
        "state replaced from snapshot"
    );
    Ok(Json(session.analyze()))
}

/// Re-derive the analysis report from the current state.
async fn get_analysis(State(ctx): State<Arc<ApiContext>>) -> Json<Report> {
    let session = ctx.session.read().await;
    Json(session.analyze())
}
