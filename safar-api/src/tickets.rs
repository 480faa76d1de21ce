use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use tracing::info;

use safar_core::repository::TicketFilter;
use safar_core::validation::{self, RecordId};
use safar_shared::envelope::{ApiResponse, ListResponse, PageParams, Pagination};
use safar_shared::models::ticketing::{
    AirTicket, CreateTicketRequest, TicketStatus, UpdateTicketRequest,
};
use safar_store::cache::keys;

use crate::error::AppError;
use crate::middleware::auth::{require_admin, Claims};
use crate::state::AppState;

const DOMAIN: &str = "tickets";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/air-ticketing/tickets",
            get(list_tickets).post(create_ticket),
        )
        .route(
            "/api/air-ticketing/tickets/{id}",
            get(get_ticket).put(update_ticket).delete(delete_ticket),
        )
}

#[derive(Debug, Deserialize)]
struct TicketListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    airline_id: Option<String>,
    status: Option<TicketStatus>,
}

fn validate_create(req: &CreateTicketRequest) -> Result<(), AppError> {
    validation::require_non_empty("passenger_name", &req.passenger_name)?;
    validation::validate_pnr(&req.pnr)?;
    validation::validate_airport_code(&req.origin)?;
    validation::validate_airport_code(&req.destination)?;
    validation::require_non_negative("purchase_price", req.purchase_price)?;
    validation::require_non_negative("sale_price", req.sale_price)?;
    Ok(())
}

async fn invalidate(state: &AppState) {
    let _ = state.cache.del_prefix(&keys::domain_prefix(DOMAIN)).await;
    let _ = state.cache.del_prefix(&keys::domain_prefix("reports")).await;
}

async fn list_tickets(
    State(state): State<AppState>,
    Query(q): Query<TicketListQuery>,
) -> Result<Json<ListResponse<AirTicket>>, AppError> {
    let page = PageParams::from_query(q.page, q.limit);
    if let Some(airline_id) = &q.airline_id {
        RecordId::parse(airline_id)?;
    }
    let fingerprint = format!(
        "{}:{}",
        q.airline_id.as_deref().unwrap_or_default(),
        q.status.map(|s| s.to_string()).unwrap_or_default()
    );
    let key = keys::list(DOMAIN, page.page, page.limit, &fingerprint);

    if let Ok(Some(cached)) = state.cache.get(&key).await {
        if let Ok(resp) = serde_json::from_str::<ListResponse<AirTicket>>(&cached) {
            return Ok(Json(resp));
        }
    }

    let filter = TicketFilter {
        airline_id: q.airline_id,
        status: q.status,
    };
    let (items, total) = state.ticket_repo.list(&filter, page).await?;
    let resp = ListResponse::new(items, Pagination::new(page, total));

    if let Ok(body) = serde_json::to_string(&resp) {
        let _ = state
            .cache
            .set_ex(&key, &body, state.cache_ttl.list_ttl_seconds)
            .await;
    }

    Ok(Json(resp))
}

async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AirTicket>>, AppError> {
    let id = RecordId::parse(&id)?;
    let key = keys::detail(DOMAIN, id.as_str());

    if let Ok(Some(cached)) = state.cache.get(&key).await {
        if let Ok(resp) = serde_json::from_str::<ApiResponse<AirTicket>>(&cached) {
            return Ok(Json(resp));
        }
    }

    let record = state
        .ticket_repo
        .find(id.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))?;
    let resp = ApiResponse::ok(record);

    if let Ok(body) = serde_json::to_string(&resp) {
        let _ = state
            .cache
            .set_ex(&key, &body, state.cache_ttl.detail_ttl_seconds)
            .await;
    }

    Ok(Json(resp))
}

async fn create_ticket(
    State(state): State<AppState>,
    Json(req): Json<CreateTicketRequest>,
) -> Result<Json<ApiResponse<AirTicket>>, AppError> {
    let airline_id = RecordId::parse(&req.airline_id)?;
    validate_create(&req)?;

    // A ticket must point at a known airline.
    if state.airline_repo.find(airline_id.as_str()).await?.is_none() {
        return Err(AppError::Validation("Unknown airline".to_string()));
    }

    let record = state.ticket_repo.create(req).await?;
    invalidate(&state).await;
    info!("Ticket created: {} (PNR {})", record.id, record.pnr);

    Ok(Json(ApiResponse::ok_with_message(record, "Ticket created")))
}

async fn update_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTicketRequest>,
) -> Result<Json<ApiResponse<AirTicket>>, AppError> {
    let id = RecordId::parse(&id)?;
    if let Some(name) = &req.passenger_name {
        validation::require_non_empty("passenger_name", name)?;
    }
    if let Some(pnr) = &req.pnr {
        validation::validate_pnr(pnr)?;
    }
    if let Some(origin) = &req.origin {
        validation::validate_airport_code(origin)?;
    }
    if let Some(destination) = &req.destination {
        validation::validate_airport_code(destination)?;
    }
    if let Some(price) = req.purchase_price {
        validation::require_non_negative("purchase_price", price)?;
    }
    if let Some(price) = req.sale_price {
        validation::require_non_negative("sale_price", price)?;
    }

    let record = state
        .ticket_repo
        .update(id.as_str(), req)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))?;
    invalidate(&state).await;

    Ok(Json(ApiResponse::ok_with_message(record, "Ticket updated")))
}

async fn delete_ticket(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    require_admin(&claims)?;
    let id = RecordId::parse(&id)?;

    if !state.ticket_repo.delete(id.as_str()).await? {
        return Err(AppError::NotFound("Ticket not found".to_string()));
    }
    invalidate(&state).await;
    info!("Ticket deleted: {}", id);

    Ok(Json(ApiResponse::message("Ticket deleted")))
}
