use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use tracing::info;

use safar_core::repository::HealthFilter;
use safar_core::validation::{self, RecordId};
use safar_shared::envelope::{ApiResponse, ListResponse, PageParams, Pagination};
use safar_shared::models::farm::{
    CreateHealthRecordRequest, HealthRecord, UpdateHealthRecordRequest,
};
use safar_store::cache::keys;

use crate::error::AppError;
use crate::middleware::auth::{require_admin, Claims};
use crate::state::AppState;

const DOMAIN: &str = "health";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/health-records",
            get(list_records).post(create_record),
        )
        .route(
            "/api/health-records/{id}",
            get(get_record).put(update_record).delete(delete_record),
        )
}

#[derive(Debug, Deserialize)]
struct HealthListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    cattle_id: Option<String>,
}

async fn invalidate(state: &AppState) {
    let _ = state.cache.del_prefix(&keys::domain_prefix(DOMAIN)).await;
}

async fn list_records(
    State(state): State<AppState>,
    Query(q): Query<HealthListQuery>,
) -> Result<Json<ListResponse<HealthRecord>>, AppError> {
    let page = PageParams::from_query(q.page, q.limit);
    if let Some(cattle_id) = &q.cattle_id {
        RecordId::parse(cattle_id)?;
    }
    let fingerprint = q.cattle_id.clone().unwrap_or_default();
    let key = keys::list(DOMAIN, page.page, page.limit, &fingerprint);

    if let Ok(Some(cached)) = state.cache.get(&key).await {
        if let Ok(resp) = serde_json::from_str::<ListResponse<HealthRecord>>(&cached) {
            return Ok(Json(resp));
        }
    }

    let filter = HealthFilter {
        cattle_id: q.cattle_id,
    };
    let (items, total) = state.health_repo.list(&filter, page).await?;
    let resp = ListResponse::new(items, Pagination::new(page, total));

    if let Ok(body) = serde_json::to_string(&resp) {
        let _ = state
            .cache
            .set_ex(&key, &body, state.cache_ttl.list_ttl_seconds)
            .await;
    }

    Ok(Json(resp))
}

async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<HealthRecord>>, AppError> {
    let id = RecordId::parse(&id)?;
    let key = keys::detail(DOMAIN, id.as_str());

    if let Ok(Some(cached)) = state.cache.get(&key).await {
        if let Ok(resp) = serde_json::from_str::<ApiResponse<HealthRecord>>(&cached) {
            return Ok(Json(resp));
        }
    }

    let record = state
        .health_repo
        .find(id.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound("Health record not found".to_string()))?;
    let resp = ApiResponse::ok(record);

    if let Ok(body) = serde_json::to_string(&resp) {
        let _ = state
            .cache
            .set_ex(&key, &body, state.cache_ttl.detail_ttl_seconds)
            .await;
    }

    Ok(Json(resp))
}

async fn create_record(
    State(state): State<AppState>,
    Json(req): Json<CreateHealthRecordRequest>,
) -> Result<Json<ApiResponse<HealthRecord>>, AppError> {
    let cattle_id = RecordId::parse(&req.cattle_id)?;
    validation::require_non_empty("diagnosis", &req.diagnosis)?;
    validation::require_non_negative("cost", req.cost)?;

    if state.cattle_repo.find(cattle_id.as_str()).await?.is_none() {
        return Err(AppError::Validation("Unknown cattle".to_string()));
    }

    let record = state.health_repo.create(req).await?;
    invalidate(&state).await;
    info!("Health record created for cattle {}", record.cattle_id);

    Ok(Json(ApiResponse::ok_with_message(
        record,
        "Health record created",
    )))
}

async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateHealthRecordRequest>,
) -> Result<Json<ApiResponse<HealthRecord>>, AppError> {
    let id = RecordId::parse(&id)?;
    if let Some(diagnosis) = &req.diagnosis {
        validation::require_non_empty("diagnosis", diagnosis)?;
    }
    if let Some(cost) = req.cost {
        validation::require_non_negative("cost", cost)?;
    }

    let record = state
        .health_repo
        .update(id.as_str(), req)
        .await?
        .ok_or_else(|| AppError::NotFound("Health record not found".to_string()))?;
    invalidate(&state).await;

    Ok(Json(ApiResponse::ok_with_message(
        record,
        "Health record updated",
    )))
}

async fn delete_record(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    require_admin(&claims)?;
    let id = RecordId::parse(&id)?;

    if !state.health_repo.delete(id.as_str()).await? {
        return Err(AppError::NotFound("Health record not found".to_string()));
    }
    invalidate(&state).await;
    info!("Health record deleted: {}", id);

    Ok(Json(ApiResponse::message("Health record deleted")))
}
