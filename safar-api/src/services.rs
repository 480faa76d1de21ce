use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use tracing::info;

use safar_core::repository::ServiceFilter;
use safar_core::validation::{self, RecordId};
use safar_shared::envelope::{ApiResponse, ListResponse, PageParams, Pagination};
use safar_shared::models::office::{
    CreateServiceRequest, OtherService, ServiceStatus, ServiceType, UpdateServiceRequest,
};
use safar_store::cache::keys;

use crate::error::AppError;
use crate::middleware::auth::{require_admin, Claims};
use crate::state::AppState;

const DOMAIN: &str = "services";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/other-services",
            get(list_services).post(create_service),
        )
        .route(
            "/api/other-services/{id}",
            get(get_service).put(update_service).delete(delete_service),
        )
}

#[derive(Debug, Deserialize)]
struct ServiceListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    status: Option<ServiceStatus>,
    service_type: Option<ServiceType>,
}

async fn invalidate(state: &AppState) {
    let _ = state.cache.del_prefix(&keys::domain_prefix(DOMAIN)).await;
    let _ = state.cache.del_prefix(&keys::domain_prefix("reports")).await;
}

async fn list_services(
    State(state): State<AppState>,
    Query(q): Query<ServiceListQuery>,
) -> Result<Json<ListResponse<OtherService>>, AppError> {
    let page = PageParams::from_query(q.page, q.limit);
    let fingerprint = format!(
        "{}:{}",
        q.status.map(|s| s.to_string()).unwrap_or_default(),
        q.service_type.map(|t| t.to_string()).unwrap_or_default()
    );
    let key = keys::list(DOMAIN, page.page, page.limit, &fingerprint);

    if let Ok(Some(cached)) = state.cache.get(&key).await {
        if let Ok(resp) = serde_json::from_str::<ListResponse<OtherService>>(&cached) {
            return Ok(Json(resp));
        }
    }

    let filter = ServiceFilter {
        status: q.status,
        service_type: q.service_type,
    };
    let (items, total) = state.service_repo.list(&filter, page).await?;
    let resp = ListResponse::new(items, Pagination::new(page, total));

    if let Ok(body) = serde_json::to_string(&resp) {
        let _ = state
            .cache
            .set_ex(&key, &body, state.cache_ttl.list_ttl_seconds)
            .await;
    }

    Ok(Json(resp))
}

async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<OtherService>>, AppError> {
    let id = RecordId::parse(&id)?;
    let key = keys::detail(DOMAIN, id.as_str());

    if let Ok(Some(cached)) = state.cache.get(&key).await {
        if let Ok(resp) = serde_json::from_str::<ApiResponse<OtherService>>(&cached) {
            return Ok(Json(resp));
        }
    }

    let record = state
        .service_repo
        .find(id.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound("Service ticket not found".to_string()))?;
    let resp = ApiResponse::ok(record);

    if let Ok(body) = serde_json::to_string(&resp) {
        let _ = state
            .cache
            .set_ex(&key, &body, state.cache_ttl.detail_ttl_seconds)
            .await;
    }

    Ok(Json(resp))
}

async fn create_service(
    State(state): State<AppState>,
    Json(req): Json<CreateServiceRequest>,
) -> Result<Json<ApiResponse<OtherService>>, AppError> {
    validation::require_non_empty("customer_name", &req.customer_name)?;
    validation::validate_phone(&req.customer_phone)?;
    validation::require_non_negative("charge", req.charge)?;
    validation::require_non_negative("cost", req.cost)?;

    let record = state.service_repo.create(req).await?;
    invalidate(&state).await;
    info!(
        "Service ticket opened: {} for {}",
        record.service_type, record.customer_name
    );

    Ok(Json(ApiResponse::ok_with_message(
        record,
        "Service ticket created",
    )))
}

async fn update_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateServiceRequest>,
) -> Result<Json<ApiResponse<OtherService>>, AppError> {
    let id = RecordId::parse(&id)?;
    if let Some(name) = &req.customer_name {
        validation::require_non_empty("customer_name", name)?;
    }
    if let Some(phone) = &req.customer_phone {
        validation::validate_phone(phone)?;
    }
    if let Some(charge) = req.charge {
        validation::require_non_negative("charge", charge)?;
    }
    if let Some(cost) = req.cost {
        validation::require_non_negative("cost", cost)?;
    }

    let record = state
        .service_repo
        .update(id.as_str(), req)
        .await?
        .ok_or_else(|| AppError::NotFound("Service ticket not found".to_string()))?;
    invalidate(&state).await;

    Ok(Json(ApiResponse::ok_with_message(
        record,
        "Service ticket updated",
    )))
}

async fn delete_service(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    require_admin(&claims)?;
    let id = RecordId::parse(&id)?;

    if !state.service_repo.delete(id.as_str()).await? {
        return Err(AppError::NotFound("Service ticket not found".to_string()));
    }
    invalidate(&state).await;
    info!("Service ticket deleted: {}", id);

    Ok(Json(ApiResponse::message("Service ticket deleted")))
}
