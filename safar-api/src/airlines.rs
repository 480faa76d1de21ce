use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use tracing::info;

use safar_core::repository::AirlineFilter;
use safar_core::validation::{self, RecordId};
use safar_shared::envelope::{ApiResponse, ListResponse, PageParams, Pagination};
use safar_shared::models::ticketing::{Airline, CreateAirlineRequest, UpdateAirlineRequest};
use safar_store::cache::keys;

use crate::error::AppError;
use crate::middleware::auth::{require_admin, Claims};
use crate::state::AppState;

const DOMAIN: &str = "airlines";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/air-ticketing/airlines",
            get(list_airlines).post(create_airline),
        )
        .route(
            "/api/air-ticketing/airlines/{id}",
            get(get_airline).put(update_airline).delete(delete_airline),
        )
}

#[derive(Debug, Deserialize)]
struct AirlineListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    is_active: Option<bool>,
    search: Option<String>,
}

async fn invalidate(state: &AppState) {
    let _ = state.cache.del_prefix(&keys::domain_prefix(DOMAIN)).await;
}

async fn list_airlines(
    State(state): State<AppState>,
    Query(q): Query<AirlineListQuery>,
) -> Result<Json<ListResponse<Airline>>, AppError> {
    let page = PageParams::from_query(q.page, q.limit);
    let fingerprint = format!(
        "{}:{}",
        q.is_active.map(|a| a.to_string()).unwrap_or_default(),
        q.search.as_deref().unwrap_or_default()
    );
    let key = keys::list(DOMAIN, page.page, page.limit, &fingerprint);

    if let Ok(Some(cached)) = state.cache.get(&key).await {
        if let Ok(resp) = serde_json::from_str::<ListResponse<Airline>>(&cached) {
            return Ok(Json(resp));
        }
    }

    let filter = AirlineFilter {
        is_active: q.is_active,
        search: q.search,
    };
    let (items, total) = state.airline_repo.list(&filter, page).await?;
    let resp = ListResponse::new(items, Pagination::new(page, total));

    if let Ok(body) = serde_json::to_string(&resp) {
        let _ = state
            .cache
            .set_ex(&key, &body, state.cache_ttl.list_ttl_seconds)
            .await;
    }

    Ok(Json(resp))
}

async fn get_airline(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Airline>>, AppError> {
    let id = RecordId::parse(&id)?;
    let key = keys::detail(DOMAIN, id.as_str());

    if let Ok(Some(cached)) = state.cache.get(&key).await {
        if let Ok(resp) = serde_json::from_str::<ApiResponse<Airline>>(&cached) {
            return Ok(Json(resp));
        }
    }

    let record = state
        .airline_repo
        .find(id.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound("Airline not found".to_string()))?;
    let resp = ApiResponse::ok(record);

    if let Ok(body) = serde_json::to_string(&resp) {
        let _ = state
            .cache
            .set_ex(&key, &body, state.cache_ttl.detail_ttl_seconds)
            .await;
    }

    Ok(Json(resp))
}

async fn create_airline(
    State(state): State<AppState>,
    Json(req): Json<CreateAirlineRequest>,
) -> Result<Json<ApiResponse<Airline>>, AppError> {
    validation::require_non_empty("name", &req.name)?;
    validation::validate_airline_code(&req.code)?;
    if let Some(phone) = &req.contact_phone {
        validation::validate_phone(phone)?;
    }

    let record = state.airline_repo.create(req).await?;
    invalidate(&state).await;
    info!("Airline created: {} ({})", record.name, record.code);

    Ok(Json(ApiResponse::ok_with_message(record, "Airline created")))
}

async fn update_airline(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateAirlineRequest>,
) -> Result<Json<ApiResponse<Airline>>, AppError> {
    let id = RecordId::parse(&id)?;
    if let Some(name) = &req.name {
        validation::require_non_empty("name", name)?;
    }
    if let Some(code) = &req.code {
        validation::validate_airline_code(code)?;
    }
    if let Some(phone) = &req.contact_phone {
        validation::validate_phone(phone)?;
    }

    let record = state
        .airline_repo
        .update(id.as_str(), req)
        .await?
        .ok_or_else(|| AppError::NotFound("Airline not found".to_string()))?;
    invalidate(&state).await;

    Ok(Json(ApiResponse::ok_with_message(record, "Airline updated")))
}

async fn delete_airline(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    require_admin(&claims)?;
    let id = RecordId::parse(&id)?;

    if !state.airline_repo.delete(id.as_str()).await? {
        return Err(AppError::NotFound("Airline not found".to_string()));
    }
    invalidate(&state).await;
    info!("Airline deleted: {}", id);

    Ok(Json(ApiResponse::message("Airline deleted")))
}
