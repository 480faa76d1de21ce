use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use tracing::info;

use safar_core::repository::CattleFilter;
use safar_core::validation::{self, RecordId};
use safar_shared::envelope::{ApiResponse, ListResponse, PageParams, Pagination};
use safar_shared::models::farm::{Cattle, CattleStatus, CreateCattleRequest, UpdateCattleRequest};
use safar_store::cache::keys;

use crate::error::AppError;
use crate::middleware::auth::{require_admin, Claims};
use crate::state::AppState;

const DOMAIN: &str = "cattle";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/cattle", get(list_cattle).post(create_cattle))
        .route(
            "/api/cattle/{id}",
            get(get_cattle).put(update_cattle).delete(delete_cattle),
        )
}

#[derive(Debug, Deserialize)]
struct CattleListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    status: Option<CattleStatus>,
    search: Option<String>,
}

fn validate_weight(weight: Option<f64>) -> Result<(), AppError> {
    if let Some(weight) = weight {
        validation::require_positive("weight_kg", weight)?;
    }
    Ok(())
}

async fn invalidate(state: &AppState) {
    let _ = state.cache.del_prefix(&keys::domain_prefix(DOMAIN)).await;
    let _ = state.cache.del_prefix(&keys::domain_prefix("reports")).await;
}

async fn list_cattle(
    State(state): State<AppState>,
    Query(q): Query<CattleListQuery>,
) -> Result<Json<ListResponse<Cattle>>, AppError> {
    let page = PageParams::from_query(q.page, q.limit);
    let fingerprint = format!(
        "{}:{}",
        q.status.map(|s| s.to_string()).unwrap_or_default(),
        q.search.as_deref().unwrap_or_default()
    );
    let key = keys::list(DOMAIN, page.page, page.limit, &fingerprint);

    if let Ok(Some(cached)) = state.cache.get(&key).await {
        if let Ok(resp) = serde_json::from_str::<ListResponse<Cattle>>(&cached) {
            return Ok(Json(resp));
        }
    }

    let filter = CattleFilter {
        status: q.status,
        search: q.search,
    };
    let (items, total) = state.cattle_repo.list(&filter, page).await?;
    let resp = ListResponse::new(items, Pagination::new(page, total));

    if let Ok(body) = serde_json::to_string(&resp) {
        let _ = state
            .cache
            .set_ex(&key, &body, state.cache_ttl.list_ttl_seconds)
            .await;
    }

    Ok(Json(resp))
}

async fn get_cattle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Cattle>>, AppError> {
    let id = RecordId::parse(&id)?;
    let key = keys::detail(DOMAIN, id.as_str());

    if let Ok(Some(cached)) = state.cache.get(&key).await {
        if let Ok(resp) = serde_json::from_str::<ApiResponse<Cattle>>(&cached) {
            return Ok(Json(resp));
        }
    }

    let record = state
        .cattle_repo
        .find(id.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound("Cattle not found".to_string()))?;
    let resp = ApiResponse::ok(record);

    if let Ok(body) = serde_json::to_string(&resp) {
        let _ = state
            .cache
            .set_ex(&key, &body, state.cache_ttl.detail_ttl_seconds)
            .await;
    }

    Ok(Json(resp))
}

async fn create_cattle(
    State(state): State<AppState>,
    Json(req): Json<CreateCattleRequest>,
) -> Result<Json<ApiResponse<Cattle>>, AppError> {
    validation::require_non_empty("tag_no", &req.tag_no)?;
    validate_weight(req.weight_kg)?;
    if let Some(price) = req.purchase_price {
        validation::require_non_negative("purchase_price", price)?;
    }

    let record = state.cattle_repo.create(req).await?;
    invalidate(&state).await;
    info!("Cattle registered: {} (tag {})", record.id, record.tag_no);

    Ok(Json(ApiResponse::ok_with_message(
        record,
        "Cattle registered",
    )))
}

async fn update_cattle(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCattleRequest>,
) -> Result<Json<ApiResponse<Cattle>>, AppError> {
    let id = RecordId::parse(&id)?;
    if let Some(tag_no) = &req.tag_no {
        validation::require_non_empty("tag_no", tag_no)?;
    }
    validate_weight(req.weight_kg)?;
    if let Some(price) = req.purchase_price {
        validation::require_non_negative("purchase_price", price)?;
    }

    let record = state
        .cattle_repo
        .update(id.as_str(), req)
        .await?
        .ok_or_else(|| AppError::NotFound("Cattle not found".to_string()))?;
    invalidate(&state).await;

    Ok(Json(ApiResponse::ok_with_message(record, "Cattle updated")))
}

async fn delete_cattle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    require_admin(&claims)?;
    let id = RecordId::parse(&id)?;

    if !state.cattle_repo.delete(id.as_str()).await? {
        return Err(AppError::NotFound("Cattle not found".to_string()));
    }
    invalidate(&state).await;
    info!("Cattle deleted: {}", id);

    Ok(Json(ApiResponse::message("Cattle deleted")))
}
