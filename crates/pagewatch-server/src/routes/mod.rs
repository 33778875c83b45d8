//! API routes for the Pagewatch server.

pub mod downloads;
pub mod history;
pub mod storage;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Creates the main router with all routes mounted.
///
/// Download links handed out in listings point at `/d/{token}`, outside the
/// versioned API prefix.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(storage::public_router(state.clone()))
        .nest("/api/v1", api_v1_routes(state))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
}

/// Creates the v1 API routes.
fn api_v1_routes(state: AppState) -> Router {
    Router::new()
        .merge(downloads::router(state.clone()))
        .merge(history::router(state.clone()))
        .merge(storage::router(state))
}
