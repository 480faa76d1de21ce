use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use tracing::info;

use safar_core::repository::EmployeeFilter;
use safar_core::validation::{self, RecordId};
use safar_shared::envelope::{ApiResponse, ListResponse, PageParams, Pagination};
use safar_shared::models::office::{CreateEmployeeRequest, Employee, UpdateEmployeeRequest};
use safar_store::cache::keys;

use crate::error::AppError;
use crate::middleware::auth::{require_admin, Claims};
use crate::state::AppState;

const DOMAIN: &str = "employees";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/employees", get(list_employees).post(create_employee))
        .route(
            "/api/employees/{id}",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
}

#[derive(Debug, Deserialize)]
struct EmployeeListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    is_active: Option<bool>,
    search: Option<String>,
}

async fn invalidate(state: &AppState) {
    let _ = state.cache.del_prefix(&keys::domain_prefix(DOMAIN)).await;
    let _ = state.cache.del_prefix(&keys::domain_prefix("reports")).await;
}

async fn list_employees(
    State(state): State<AppState>,
    Query(q): Query<EmployeeListQuery>,
) -> Result<Json<ListResponse<Employee>>, AppError> {
    let page = PageParams::from_query(q.page, q.limit);
    let fingerprint = format!(
        "{}:{}",
        q.is_active.map(|a| a.to_string()).unwrap_or_default(),
        q.search.as_deref().unwrap_or_default()
    );
    let key = keys::list(DOMAIN, page.page, page.limit, &fingerprint);

    if let Ok(Some(cached)) = state.cache.get(&key).await {
        if let Ok(resp) = serde_json::from_str::<ListResponse<Employee>>(&cached) {
            return Ok(Json(resp));
        }
    }

    let filter = EmployeeFilter {
        is_active: q.is_active,
        search: q.search,
    };
    let (items, total) = state.employee_repo.list(&filter, page).await?;
    let resp = ListResponse::new(items, Pagination::new(page, total));

    if let Ok(body) = serde_json::to_string(&resp) {
        let _ = state
            .cache
            .set_ex(&key, &body, state.cache_ttl.list_ttl_seconds)
            .await;
    }

    Ok(Json(resp))
}

async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Employee>>, AppError> {
    let id = RecordId::parse(&id)?;
    let key = keys::detail(DOMAIN, id.as_str());

    if let Ok(Some(cached)) = state.cache.get(&key).await {
        if let Ok(resp) = serde_json::from_str::<ApiResponse<Employee>>(&cached) {
            return Ok(Json(resp));
        }
    }

    let record = state
        .employee_repo
        .find(id.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;
    let resp = ApiResponse::ok(record);

    if let Ok(body) = serde_json::to_string(&resp) {
        let _ = state
            .cache
            .set_ex(&key, &body, state.cache_ttl.detail_ttl_seconds)
            .await;
    }

    Ok(Json(resp))
}

async fn create_employee(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateEmployeeRequest>,
) -> Result<Json<ApiResponse<Employee>>, AppError> {
    require_admin(&claims)?;
    validation::require_non_empty("name", &req.name)?;
    validation::require_non_empty("designation", &req.designation)?;
    validation::validate_phone(&req.phone)?;
    if let Some(email) = &req.email {
        validation::validate_email(email)?;
    }
    validation::require_non_negative("monthly_salary", req.monthly_salary)?;

    let record = state.employee_repo.create(req).await?;
    invalidate(&state).await;
    info!("Employee added: {}", record.name);

    Ok(Json(ApiResponse::ok_with_message(record, "Employee added")))
}

async fn update_employee(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<UpdateEmployeeRequest>,
) -> Result<Json<ApiResponse<Employee>>, AppError> {
    require_admin(&claims)?;
    let id = RecordId::parse(&id)?;
    if let Some(name) = &req.name {
        validation::require_non_empty("name", name)?;
    }
    if let Some(phone) = &req.phone {
        validation::validate_phone(phone)?;
    }
    if let Some(email) = &req.email {
        validation::validate_email(email)?;
    }
    if let Some(salary) = req.monthly_salary {
        validation::require_non_negative("monthly_salary", salary)?;
    }

    let record = state
        .employee_repo
        .update(id.as_str(), req)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;
    invalidate(&state).await;

    Ok(Json(ApiResponse::ok_with_message(record, "Employee updated")))
}

async fn delete_employee(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    require_admin(&claims)?;
    let id = RecordId::parse(&id)?;

    if !state.employee_repo.delete(id.as_str()).await? {
        return Err(AppError::NotFound("Employee not found".to_string()));
    }
    invalidate(&state).await;
    info!("Employee deleted: {}", id);

    Ok(Json(ApiResponse::message("Employee deleted")))
}
