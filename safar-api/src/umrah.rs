use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use tracing::info;

use safar_core::repository::UmrahFilter;
use safar_core::validation::{self, RecordId};
use safar_shared::envelope::{ApiResponse, ListResponse, PageParams, Pagination};
use safar_shared::models::hajj::{CreateUmrahRequest, PilgrimStatus, Umrah, UpdateUmrahRequest};
use safar_store::cache::keys;

use crate::error::AppError;
use crate::middleware::auth::{require_admin, Claims};
use crate::state::AppState;

const DOMAIN: &str = "umrah";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/haj-umrah/umrah", get(list_umrah).post(create_umrah))
        .route(
            "/haj-umrah/umrah/{id}",
            get(get_umrah).put(update_umrah).delete(delete_umrah),
        )
}

#[derive(Debug, Deserialize)]
struct UmrahListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    status: Option<PilgrimStatus>,
    search: Option<String>,
}

fn validate_create(req: &CreateUmrahRequest) -> Result<(), AppError> {
    validation::require_non_empty("name", &req.name)?;
    validation::validate_phone(&req.phone)?;
    if let Some(email) = &req.email {
        validation::validate_email(email)?;
    }
    validation::require_non_empty("passport_no", &req.passport_no)?;
    validation::require_non_negative("package_amount", req.package_amount)?;
    validation::require_non_negative("paid_amount", req.paid_amount)?;
    if let (Some(departure), Some(ret)) = (req.departure_date, req.return_date) {
        if ret < departure {
            return Err(AppError::Validation(
                "return_date must not be before departure_date".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_update(req: &UpdateUmrahRequest) -> Result<(), AppError> {
    if let Some(name) = &req.name {
        validation::require_non_empty("name", name)?;
    }
    if let Some(phone) = &req.phone {
        validation::validate_phone(phone)?;
    }
    if let Some(email) = &req.email {
        validation::validate_email(email)?;
    }
    if let Some(amount) = req.package_amount {
        validation::require_non_negative("package_amount", amount)?;
    }
    if let Some(paid) = req.paid_amount {
        validation::require_non_negative("paid_amount", paid)?;
    }
    Ok(())
}

async fn invalidate(state: &AppState) {
    let _ = state.cache.del_prefix(&keys::domain_prefix(DOMAIN)).await;
    let _ = state.cache.del_prefix(&keys::domain_prefix("reports")).await;
}

async fn list_umrah(
    State(state): State<AppState>,
    Query(q): Query<UmrahListQuery>,
) -> Result<Json<ListResponse<Umrah>>, AppError> {
    let page = PageParams::from_query(q.page, q.limit);
    let fingerprint = format!(
        "{}:{}",
        q.status.map(|s| s.to_string()).unwrap_or_default(),
        q.search.as_deref().unwrap_or_default()
    );
    let key = keys::list(DOMAIN, page.page, page.limit, &fingerprint);

    if let Ok(Some(cached)) = state.cache.get(&key).await {
        if let Ok(resp) = serde_json::from_str::<ListResponse<Umrah>>(&cached) {
            return Ok(Json(resp));
        }
    }

    let filter = UmrahFilter {
        status: q.status,
        search: q.search,
    };
    let (items, total) = state.umrah_repo.list(&filter, page).await?;
    let resp = ListResponse::new(items, Pagination::new(page, total));

    if let Ok(body) = serde_json::to_string(&resp) {
        let _ = state
            .cache
            .set_ex(&key, &body, state.cache_ttl.list_ttl_seconds)
            .await;
    }

    Ok(Json(resp))
}

async fn get_umrah(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Umrah>>, AppError> {
    let id = RecordId::parse(&id)?;
    let key = keys::detail(DOMAIN, id.as_str());

    if let Ok(Some(cached)) = state.cache.get(&key).await {
        if let Ok(resp) = serde_json::from_str::<ApiResponse<Umrah>>(&cached) {
            return Ok(Json(resp));
        }
    }

    let record = state
        .umrah_repo
        .find(id.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound("Umrah record not found".to_string()))?;
    let resp = ApiResponse::ok(record);

    if let Ok(body) = serde_json::to_string(&resp) {
        let _ = state
            .cache
            .set_ex(&key, &body, state.cache_ttl.detail_ttl_seconds)
            .await;
    }

    Ok(Json(resp))
}

async fn create_umrah(
    State(state): State<AppState>,
    Json(req): Json<CreateUmrahRequest>,
) -> Result<Json<ApiResponse<Umrah>>, AppError> {
    validate_create(&req)?;

    let record = state.umrah_repo.create(req).await?;
    invalidate(&state).await;
    info!("Umrah record created: {}", record.id);

    Ok(Json(ApiResponse::ok_with_message(
        record,
        "Umrah record created",
    )))
}

async fn update_umrah(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUmrahRequest>,
) -> Result<Json<ApiResponse<Umrah>>, AppError> {
    let id = RecordId::parse(&id)?;
    validate_update(&req)?;

    let record = state
        .umrah_repo
        .update(id.as_str(), req)
        .await?
        .ok_or_else(|| AppError::NotFound("Umrah record not found".to_string()))?;
    invalidate(&state).await;

    Ok(Json(ApiResponse::ok_with_message(
        record,
        "Umrah record updated",
    )))
}

async fn delete_umrah(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    require_admin(&claims)?;
    let id = RecordId::parse(&id)?;

    if !state.umrah_repo.delete(id.as_str()).await? {
        return Err(AppError::NotFound("Umrah record not found".to_string()));
    }
    invalidate(&state).await;
    info!("Umrah record deleted: {}", id);

    Ok(Json(ApiResponse::message("Umrah record deleted")))
}
