//! Per-monitor change history with downloadable attachments.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::catalog::HistoryEntryView;
use crate::error::AppError;
use crate::state::AppState;

/// Creates the history router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/history/{monitor_id}", get(monitor_history))
        .with_state(state)
}

/// GET /api/v1/history/{monitor_id}
///
/// Returns the monitor's recent history. Attachment storage paths are
/// replaced by `downloadUrl`.
async fn monitor_history(
    State(state): State<AppState>,
    Path(monitor_id): Path<String>,
) -> Result<Json<Vec<HistoryEntryView>>, AppError> {
    let monitor_id = parse_monitor_id(&monitor_id)?;
    let history = state.catalog.for_monitor_history(monitor_id).await?;
    Ok(Json(history))
}

fn parse_monitor_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("Invalid monitor id: '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_monitor_id() {
        assert_eq!(parse_monitor_id("42").unwrap(), 42);
        assert!(matches!(parse_monitor_id("abc"), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_monitor_id(""), Err(AppError::BadRequest(_))));
    }
}
