use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use tracing::info;

use safar_core::farm;
use safar_core::validation::{self, RecordId};
use safar_shared::envelope::{ApiResponse, ListResponse, PageParams, Pagination};
use safar_shared::models::farm::{
    CreateFeedRequest, CreateFeedTransactionRequest, Feed, FeedTransaction, UpdateFeedRequest,
};
use safar_store::cache::keys;

use crate::error::AppError;
use crate::middleware::auth::{require_admin, Claims};
use crate::state::AppState;

const DOMAIN: &str = "feeds";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/feeds", get(list_feeds).post(create_feed))
        .route(
            "/api/feeds/{id}",
            get(get_feed).put(update_feed).delete(delete_feed),
        )
        .route(
            "/api/feeds/{id}/transactions",
            get(list_transactions).post(record_transaction),
        )
}

#[derive(Debug, Deserialize)]
struct FeedListQuery {
    page: Option<u32>,
    limit: Option<u32>,
}

async fn invalidate(state: &AppState) {
    let _ = state.cache.del_prefix(&keys::domain_prefix(DOMAIN)).await;
}

async fn list_feeds(
    State(state): State<AppState>,
    Query(q): Query<FeedListQuery>,
) -> Result<Json<ListResponse<Feed>>, AppError> {
    let page = PageParams::from_query(q.page, q.limit);
    let key = keys::list(DOMAIN, page.page, page.limit, "");

    if let Ok(Some(cached)) = state.cache.get(&key).await {
        if let Ok(resp) = serde_json::from_str::<ListResponse<Feed>>(&cached) {
            return Ok(Json(resp));
        }
    }

    let (items, total) = state.feed_repo.list(page).await?;
    let resp = ListResponse::new(items, Pagination::new(page, total));

    if let Ok(body) = serde_json::to_string(&resp) {
        let _ = state
            .cache
            .set_ex(&key, &body, state.cache_ttl.list_ttl_seconds)
            .await;
    }

    Ok(Json(resp))
}

async fn get_feed(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Feed>>, AppError> {
    let id = RecordId::parse(&id)?;
    let key = keys::detail(DOMAIN, id.as_str());

    if let Ok(Some(cached)) = state.cache.get(&key).await {
        if let Ok(resp) = serde_json::from_str::<ApiResponse<Feed>>(&cached) {
            return Ok(Json(resp));
        }
    }

    let record = state
        .feed_repo
        .find(id.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound("Feed item not found".to_string()))?;
    let resp = ApiResponse::ok(record);

    if let Ok(body) = serde_json::to_string(&resp) {
        let _ = state
            .cache
            .set_ex(&key, &body, state.cache_ttl.detail_ttl_seconds)
            .await;
    }

    Ok(Json(resp))
}

async fn create_feed(
    State(state): State<AppState>,
    Json(req): Json<CreateFeedRequest>,
) -> Result<Json<ApiResponse<Feed>>, AppError> {
    validation::require_non_empty("name", &req.name)?;
    validation::require_non_negative("unit_cost", req.unit_cost)?;
    if req.quantity_on_hand < 0.0 || !req.quantity_on_hand.is_finite() {
        return Err(AppError::Validation(
            "quantity_on_hand must not be negative".to_string(),
        ));
    }

    let record = state.feed_repo.create(req).await?;
    invalidate(&state).await;
    info!("Feed item created: {}", record.name);

    Ok(Json(ApiResponse::ok_with_message(
        record,
        "Feed item created",
    )))
}

async fn update_feed(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateFeedRequest>,
) -> Result<Json<ApiResponse<Feed>>, AppError> {
    let id = RecordId::parse(&id)?;
    if let Some(name) = &req.name {
        validation::require_non_empty("name", name)?;
    }
    if let Some(cost) = req.unit_cost {
        validation::require_non_negative("unit_cost", cost)?;
    }

    let record = state
        .feed_repo
        .update(id.as_str(), req)
        .await?
        .ok_or_else(|| AppError::NotFound("Feed item not found".to_string()))?;
    invalidate(&state).await;

    Ok(Json(ApiResponse::ok_with_message(
        record,
        "Feed item updated",
    )))
}

async fn delete_feed(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    require_admin(&claims)?;
    let id = RecordId::parse(&id)?;

    if !state.feed_repo.delete(id.as_str()).await? {
        return Err(AppError::NotFound("Feed item not found".to_string()));
    }
    invalidate(&state).await;
    info!("Feed item deleted: {}", id);

    Ok(Json(ApiResponse::message("Feed item deleted")))
}

/// Stock moves only through transactions: a purchase raises the level, a
/// usage lowers it and is refused when it would overdraw the stock.
async fn record_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CreateFeedTransactionRequest>,
) -> Result<Json<ApiResponse<FeedTransaction>>, AppError> {
    let id = RecordId::parse(&id)?;

    let feed = state
        .feed_repo
        .find(id.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound("Feed item not found".to_string()))?;

    let new_level = farm::apply_transaction(feed.quantity_on_hand, req.kind, req.quantity)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let record = state
        .feed_repo
        .record_transaction(id.as_str(), req, new_level)
        .await?;
    invalidate(&state).await;

    Ok(Json(ApiResponse::ok_with_message(
        record,
        "Feed transaction recorded",
    )))
}

async fn list_transactions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<FeedTransaction>>>, AppError> {
    let id = RecordId::parse(&id)?;

    if state.feed_repo.find(id.as_str()).await?.is_none() {
        return Err(AppError::NotFound("Feed item not found".to_string()));
    }

    let transactions = state.feed_repo.list_transactions(id.as_str()).await?;
    Ok(Json(ApiResponse::ok(transactions)))
}
