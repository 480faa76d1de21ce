use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use tracing::info;

use safar_core::repository::ExpenseFilter;
use safar_core::validation::{self, RecordId};
use safar_shared::envelope::{ApiResponse, ListResponse, PageParams, Pagination};
use safar_shared::models::office::{
    CreateExpenseRequest, Expense, ExpenseCategory, UpdateExpenseRequest,
};
use safar_store::cache::keys;

use crate::error::AppError;
use crate::middleware::auth::{require_admin, Claims};
use crate::state::AppState;

const DOMAIN: &str = "expenses";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/expenses", get(list_expenses).post(create_expense))
        .route(
            "/api/expenses/{id}",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
}

#[derive(Debug, Deserialize)]
struct ExpenseListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    category: Option<ExpenseCategory>,
    /// Calendar month as "YYYY-MM".
    month: Option<String>,
}

fn parse_month(value: &str) -> Result<(i32, u32), AppError> {
    let parsed = value
        .split_once('-')
        .and_then(|(y, m)| Some((y.parse::<i32>().ok()?, m.parse::<u32>().ok()?)))
        .filter(|(_, m)| (1..=12).contains(m));
    parsed.ok_or_else(|| {
        AppError::Validation(format!("Invalid month (expected YYYY-MM): {}", value))
    })
}

async fn invalidate(state: &AppState) {
    let _ = state.cache.del_prefix(&keys::domain_prefix(DOMAIN)).await;
}

async fn list_expenses(
    State(state): State<AppState>,
    Query(q): Query<ExpenseListQuery>,
) -> Result<Json<ListResponse<Expense>>, AppError> {
    let page = PageParams::from_query(q.page, q.limit);
    let month = q.month.as_deref().map(parse_month).transpose()?;
    let fingerprint = format!(
        "{}:{}",
        q.category.map(|c| c.to_string()).unwrap_or_default(),
        q.month.as_deref().unwrap_or_default()
    );
    let key = keys::list(DOMAIN, page.page, page.limit, &fingerprint);

    if let Ok(Some(cached)) = state.cache.get(&key).await {
        if let Ok(resp) = serde_json::from_str::<ListResponse<Expense>>(&cached) {
            return Ok(Json(resp));
        }
    }

    let filter = ExpenseFilter {
        category: q.category,
        month,
    };
    let (items, total) = state.expense_repo.list(&filter, page).await?;
    let resp = ListResponse::new(items, Pagination::new(page, total));

    if let Ok(body) = serde_json::to_string(&resp) {
        let _ = state
            .cache
            .set_ex(&key, &body, state.cache_ttl.list_ttl_seconds)
            .await;
    }

    Ok(Json(resp))
}

async fn get_expense(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Expense>>, AppError> {
    let id = RecordId::parse(&id)?;
    let key = keys::detail(DOMAIN, id.as_str());

    if let Ok(Some(cached)) = state.cache.get(&key).await {
        if let Ok(resp) = serde_json::from_str::<ApiResponse<Expense>>(&cached) {
            return Ok(Json(resp));
        }
    }

    let record = state
        .expense_repo
        .find(id.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound("Expense not found".to_string()))?;
    let resp = ApiResponse::ok(record);

    if let Ok(body) = serde_json::to_string(&resp) {
        let _ = state
            .cache
            .set_ex(&key, &body, state.cache_ttl.detail_ttl_seconds)
            .await;
    }

    Ok(Json(resp))
}

async fn create_expense(
    State(state): State<AppState>,
    Json(req): Json<CreateExpenseRequest>,
) -> Result<Json<ApiResponse<Expense>>, AppError> {
    validation::require_non_empty("description", &req.description)?;
    validation::require_non_negative("amount", req.amount)?;

    let record = state.expense_repo.create(req).await?;
    invalidate(&state).await;
    info!("Expense recorded: {} {}", record.category, record.amount);

    Ok(Json(ApiResponse::ok_with_message(record, "Expense recorded")))
}

async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateExpenseRequest>,
) -> Result<Json<ApiResponse<Expense>>, AppError> {
    let id = RecordId::parse(&id)?;
    if let Some(description) = &req.description {
        validation::require_non_empty("description", description)?;
    }
    if let Some(amount) = req.amount {
        validation::require_non_negative("amount", amount)?;
    }

    let record = state
        .expense_repo
        .update(id.as_str(), req)
        .await?
        .ok_or_else(|| AppError::NotFound("Expense not found".to_string()))?;
    invalidate(&state).await;

    Ok(Json(ApiResponse::ok_with_message(record, "Expense updated")))
}

async fn delete_expense(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    require_admin(&claims)?;
    let id = RecordId::parse(&id)?;

    if !state.expense_repo.delete(id.as_str()).await? {
        return Err(AppError::NotFound("Expense not found".to_string()));
    }
    invalidate(&state).await;
    info!("Expense deleted: {}", id);

    Ok(Json(ApiResponse::message("Expense deleted")))
}
