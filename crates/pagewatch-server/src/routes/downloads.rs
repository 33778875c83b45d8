//! Download listing endpoint.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::catalog::{DownloadListingEntry, ListingFilter};
use crate::error::AppError;
use crate::state::AppState;

/// Raw listing query. Everything is optional and parsed leniently.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    pub limit: Option<String>,
    pub q: Option<String>,
    pub ext: Option<String>,
    pub monitor_id: Option<String>,
}

impl From<&ListingQuery> for ListingFilter {
    fn from(query: &ListingQuery) -> Self {
        ListingFilter::from_params(
            query.limit.as_deref(),
            query.q.as_deref(),
            query.ext.as_deref(),
            query.monitor_id.as_deref(),
        )
    }
}

/// Response for a download listing.
#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub items: Vec<DownloadListingEntry>,
}

/// Creates the listing router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/listing", get(list_downloads))
        .with_state(state)
}

/// GET /api/v1/listing?limit&q&ext&monitorId
///
/// Lists attachments from recent change history, each with a short-lived
/// download URL.
async fn list_downloads(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<ListingResponse>, AppError> {
    let filter = ListingFilter::from(&query);
    let items = state.catalog.list(&filter).await?;

    tracing::debug!(
        limit = filter.limit,
        monitor_id = ?filter.monitor_id,
        items = items.len(),
        "Built download listing"
    );

    Ok(Json(ListingResponse { items }))
}
