use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use tracing::info;

use safar_core::repository::HajiFilter;
use safar_core::validation::{self, RecordId};
use safar_shared::envelope::{ApiResponse, ListResponse, PageParams, Pagination};
use safar_shared::models::hajj::{
    BulkDeleteRequest, BulkDeleteResult, CreateHajiRequest, Haji, PilgrimStatus, UpdateHajiRequest,
};
use safar_store::cache::keys;

use crate::error::AppError;
use crate::middleware::auth::{require_admin, Claims};
use crate::state::AppState;

const DOMAIN: &str = "haji";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/haj-umrah/haji", get(list_haji).post(create_haji))
        .route(
            "/haj-umrah/haji/{id}",
            get(get_haji).put(update_haji).delete(delete_haji),
        )
        .route("/haj-umrah/haji/bulk-delete", post(bulk_delete_haji))
}

#[derive(Debug, Deserialize)]
struct HajiListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    status: Option<PilgrimStatus>,
    season_year: Option<i32>,
    search: Option<String>,
}

fn validate_create(req: &CreateHajiRequest) -> Result<(), AppError> {
    validation::require_non_empty("name", &req.name)?;
    validation::validate_phone(&req.phone)?;
    if let Some(email) = &req.email {
        validation::validate_email(email)?;
    }
    validation::require_non_empty("passport_no", &req.passport_no)?;
    validation::require_non_negative("package_amount", req.package_amount)?;
    validation::require_non_negative("paid_amount", req.paid_amount)?;
    Ok(())
}

fn validate_update(req: &UpdateHajiRequest) -> Result<(), AppError> {
    if let Some(name) = &req.name {
        validation::require_non_empty("name", name)?;
    }
    if let Some(phone) = &req.phone {
        validation::validate_phone(phone)?;
    }
    if let Some(email) = &req.email {
        validation::validate_email(email)?;
    }
    if let Some(passport_no) = &req.passport_no {
        validation::require_non_empty("passport_no", passport_no)?;
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

async fn list_haji(
    State(state): State<AppState>,
    Query(q): Query<HajiListQuery>,
) -> Result<Json<ListResponse<Haji>>, AppError> {
    let page = PageParams::from_query(q.page, q.limit);
    let fingerprint = format!(
        "{}:{}:{}",
        q.status.map(|s| s.to_string()).unwrap_or_default(),
        q.season_year.map(|y| y.to_string()).unwrap_or_default(),
        q.search.as_deref().unwrap_or_default()
    );
    let key = keys::list(DOMAIN, page.page, page.limit, &fingerprint);

    if let Ok(Some(cached)) = state.cache.get(&key).await {
        if let Ok(resp) = serde_json::from_str::<ListResponse<Haji>>(&cached) {
            return Ok(Json(resp));
        }
    }

    let filter = HajiFilter {
        status: q.status,
        season_year: q.season_year,
        search: q.search,
    };
    let (items, total) = state.haji_repo.list(&filter, page).await?;
    let resp = ListResponse::new(items, Pagination::new(page, total));

    if let Ok(body) = serde_json::to_string(&resp) {
        let _ = state
            .cache
            .set_ex(&key, &body, state.cache_ttl.list_ttl_seconds)
            .await;
    }

    Ok(Json(resp))
}

async fn get_haji(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Haji>>, AppError> {
    let id = RecordId::parse(&id)?;
    let key = keys::detail(DOMAIN, id.as_str());

    if let Ok(Some(cached)) = state.cache.get(&key).await {
        if let Ok(resp) = serde_json::from_str::<ApiResponse<Haji>>(&cached) {
            return Ok(Json(resp));
        }
    }

    let record = state
        .haji_repo
        .find(id.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound("Haji record not found".to_string()))?;
    let resp = ApiResponse::ok(record);

    if let Ok(body) = serde_json::to_string(&resp) {
        let _ = state
            .cache
            .set_ex(&key, &body, state.cache_ttl.detail_ttl_seconds)
            .await;
    }

    Ok(Json(resp))
}

async fn create_haji(
    State(state): State<AppState>,
    Json(req): Json<CreateHajiRequest>,
) -> Result<Json<ApiResponse<Haji>>, AppError> {
    validate_create(&req)?;

    let record = state.haji_repo.create(req).await?;
    invalidate(&state).await;
    info!("Haji record created: {}", record.id);

    Ok(Json(ApiResponse::ok_with_message(
        record,
        "Haji record created",
    )))
}

async fn update_haji(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateHajiRequest>,
) -> Result<Json<ApiResponse<Haji>>, AppError> {
    let id = RecordId::parse(&id)?;
    validate_update(&req)?;

    let record = state
        .haji_repo
        .update(id.as_str(), req)
        .await?
        .ok_or_else(|| AppError::NotFound("Haji record not found".to_string()))?;
    invalidate(&state).await;

    Ok(Json(ApiResponse::ok_with_message(
        record,
        "Haji record updated",
    )))
}

async fn delete_haji(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    require_admin(&claims)?;
    let id = RecordId::parse(&id)?;

    if !state.haji_repo.delete(id.as_str()).await? {
        return Err(AppError::NotFound("Haji record not found".to_string()));
    }
    invalidate(&state).await;
    info!("Haji record deleted: {}", id);

    Ok(Json(ApiResponse::message("Haji record deleted")))
}

/// Deletes each id independently and reports how many went through, so one
/// bad id does not sink the rest of the batch.
async fn bulk_delete_haji(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<BulkDeleteRequest>,
) -> Result<Json<ApiResponse<BulkDeleteResult>>, AppError> {
    require_admin(&claims)?;
    if req.ids.is_empty() {
        return Err(AppError::Validation("ids must not be empty".to_string()));
    }

    let deletions = req.ids.iter().map(|raw| {
        let repo = state.haji_repo.clone();
        let raw = raw.clone();
        async move {
            match RecordId::parse(&raw) {
                Ok(id) => repo.delete(id.as_str()).await.unwrap_or(false),
                Err(_) => false,
            }
        }
    });
    let outcomes = futures_util::future::join_all(deletions).await;

    let deleted = outcomes.iter().filter(|ok| **ok).count();
    let failed = outcomes.len() - deleted;
    invalidate(&state).await;
    info!("Bulk delete: {} removed, {} failed", deleted, failed);

    Ok(Json(ApiResponse::ok_with_message(
        BulkDeleteResult { deleted, failed },
        format!("Deleted {} of {} records", deleted, outcomes.len()),
    )))
}
