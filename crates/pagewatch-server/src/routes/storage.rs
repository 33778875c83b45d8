//! Token-scoped download endpoints.
//!
//! Two ways to present the same token, one code path behind them.

use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

/// Query for the query-parameter entry point.
#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    /// The download token.
    pub t: Option<String>,
}

/// Creates the versioned download router (`/download?t=`).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/download", get(download_by_query_token))
        .with_state(state)
}

/// Creates the unversioned download router (`/d/{token}`).
pub fn public_router(state: AppState) -> Router {
    Router::new()
        .route("/d/{token}", get(download_by_path_token))
        .with_state(state)
}

/// GET /api/v1/download?t=<token>
async fn download_by_query_token(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, AppError> {
    state
        .gateway
        .serve(query.t.as_deref().unwrap_or_default())
        .await
}

/// GET /d/{token}
async fn download_by_path_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, AppError> {
    state.gateway.serve(&token).await
}
