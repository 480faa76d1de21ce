use axum::{extract::State, routing::get, Json, Router};

use safar_shared::envelope::ApiResponse;
use safar_shared::models::reports::DashboardSummary;
use safar_store::cache::keys;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/reports/summary", get(dashboard_summary))
}

/// Cached rollup across every subsystem; mutations in the counted domains
/// drop the `reports:` prefix.
async fn dashboard_summary(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardSummary>>, AppError> {
    let key = keys::detail("reports", "summary");

    if let Ok(Some(cached)) = state.cache.get(&key).await {
        if let Ok(resp) = serde_json::from_str::<ApiResponse<DashboardSummary>>(&cached) {
            return Ok(Json(resp));
        }
    }

    let summary = state.reports_repo.dashboard().await?;
    let resp = ApiResponse::ok(summary);

    if let Ok(body) = serde_json::to_string(&resp) {
        let _ = state
            .cache
            .set_ex(&key, &body, state.cache_ttl.report_ttl_seconds)
            .await;
    }

    Ok(Json(resp))
}
