use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use tracing::info;

use safar_core::farm;
use safar_core::repository::MilkFilter;
use safar_core::validation::{self, RecordId};
use safar_shared::envelope::{ApiResponse, ListResponse, PageParams, Pagination};
use safar_shared::models::farm::{
    CreateMilkRecordRequest, MilkRecord, MilkSummaryReport, UpdateMilkRecordRequest,
};
use safar_store::cache::keys;

use crate::error::AppError;
use crate::middleware::auth::{require_admin, Claims};
use crate::state::AppState;

const DOMAIN: &str = "milk";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/milk", get(list_records).post(create_record))
        .route("/api/milk/summary", get(summary))
        .route(
            "/api/milk/{id}",
            get(get_record).put(update_record).delete(delete_record),
        )
}

#[derive(Debug, Deserialize)]
struct MilkListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    cattle_id: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MilkSummaryQuery {
    cattle_id: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

fn build_filter(
    cattle_id: Option<String>,
    from: Option<String>,
    to: Option<String>,
) -> Result<MilkFilter, AppError> {
    if let Some(cattle_id) = &cattle_id {
        RecordId::parse(cattle_id)?;
    }
    let from = from
        .map(|value| validation::validate_date_str(&value))
        .transpose()?;
    let to = to
        .map(|value| validation::validate_date_str(&value))
        .transpose()?;
    Ok(MilkFilter {
        cattle_id,
        from,
        to,
    })
}

async fn invalidate(state: &AppState) {
    let _ = state.cache.del_prefix(&keys::domain_prefix(DOMAIN)).await;
}

async fn list_records(
    State(state): State<AppState>,
    Query(q): Query<MilkListQuery>,
) -> Result<Json<ListResponse<MilkRecord>>, AppError> {
    let page = PageParams::from_query(q.page, q.limit);
    let filter = build_filter(q.cattle_id, q.from, q.to)?;
    let fingerprint = format!(
        "{}:{}:{}",
        filter.cattle_id.as_deref().unwrap_or_default(),
        filter.from.map(|d| d.to_string()).unwrap_or_default(),
        filter.to.map(|d| d.to_string()).unwrap_or_default()
    );
    let key = keys::list(DOMAIN, page.page, page.limit, &fingerprint);

    if let Ok(Some(cached)) = state.cache.get(&key).await {
        if let Ok(resp) = serde_json::from_str::<ListResponse<MilkRecord>>(&cached) {
            return Ok(Json(resp));
        }
    }

    let (items, total) = state.milk_repo.list(&filter, page).await?;
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
) -> Result<Json<ApiResponse<MilkRecord>>, AppError> {
    let id = RecordId::parse(&id)?;
    let key = keys::detail(DOMAIN, id.as_str());

    if let Ok(Some(cached)) = state.cache.get(&key).await {
        if let Ok(resp) = serde_json::from_str::<ApiResponse<MilkRecord>>(&cached) {
            return Ok(Json(resp));
        }
    }

    let record = state
        .milk_repo
        .find(id.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound("Milk record not found".to_string()))?;
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
    Json(req): Json<CreateMilkRecordRequest>,
) -> Result<Json<ApiResponse<MilkRecord>>, AppError> {
    let cattle_id = RecordId::parse(&req.cattle_id)?;
    validation::require_positive("quantity_litres", req.quantity_litres)?;

    if state.cattle_repo.find(cattle_id.as_str()).await?.is_none() {
        return Err(AppError::Validation("Unknown cattle".to_string()));
    }

    // Double entry for the same cattle, date and session comes back as a
    // conflict from the repository.
    let record = state.milk_repo.create(req).await?;
    invalidate(&state).await;
    info!(
        "Milk record created: cattle {} {} {}",
        record.cattle_id, record.record_date, record.session
    );

    Ok(Json(ApiResponse::ok_with_message(
        record,
        "Milk record created",
    )))
}

async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateMilkRecordRequest>,
) -> Result<Json<ApiResponse<MilkRecord>>, AppError> {
    let id = RecordId::parse(&id)?;
    if let Some(litres) = req.quantity_litres {
        validation::require_positive("quantity_litres", litres)?;
    }

    let record = state
        .milk_repo
        .update(id.as_str(), req)
        .await?
        .ok_or_else(|| AppError::NotFound("Milk record not found".to_string()))?;
    invalidate(&state).await;

    Ok(Json(ApiResponse::ok_with_message(
        record,
        "Milk record updated",
    )))
}

async fn delete_record(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    require_admin(&claims)?;
    let id = RecordId::parse(&id)?;

    if !state.milk_repo.delete(id.as_str()).await? {
        return Err(AppError::NotFound("Milk record not found".to_string()));
    }
    invalidate(&state).await;
    info!("Milk record deleted: {}", id);

    Ok(Json(ApiResponse::message("Milk record deleted")))
}

/// Production rollup over an optional cattle/date window.
async fn summary(
    State(state): State<AppState>,
    Query(q): Query<MilkSummaryQuery>,
) -> Result<Json<ApiResponse<MilkSummaryReport>>, AppError> {
    let filter = build_filter(q.cattle_id, q.from, q.to)?;
    let key = format!(
        "{}:summary:{}:{}:{}",
        DOMAIN,
        filter.cattle_id.as_deref().unwrap_or_default(),
        filter.from.map(|d| d.to_string()).unwrap_or_default(),
        filter.to.map(|d| d.to_string()).unwrap_or_default()
    );

    if let Ok(Some(cached)) = state.cache.get(&key).await {
        if let Ok(resp) = serde_json::from_str::<ApiResponse<MilkSummaryReport>>(&cached) {
            return Ok(Json(resp));
        }
    }

    let records = state.milk_repo.list_range(&filter).await?;
    let report = farm::summarize_milk(&records);
    let resp = ApiResponse::ok(report);

    if let Ok(body) = serde_json::to_string(&resp) {
        let _ = state
            .cache
            .set_ex(&key, &body, state.cache_ttl.report_ttl_seconds)
            .await;
    }

    Ok(Json(resp))
}
