use axum::{http::Method, routing::get, Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use safar_shared::envelope::ApiResponse;

pub mod airlines;
pub mod auth;
pub mod cattle;
pub mod employees;
pub mod error;
pub mod expenses;
pub mod feeds;
pub mod haji;
pub mod health;
pub mod middleware;
pub mod milk;
pub mod reports;
pub mod services;
pub mod state;
pub mod tickets;
pub mod umrah;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    // Everything except /health and the login endpoint sits behind the
    // token check.
    let protected = Router::new()
        .merge(auth::routes())
        .merge(haji::routes())
        .merge(umrah::routes())
        .merge(airlines::routes())
        .merge(tickets::routes())
        .merge(cattle::routes())
        .merge(feeds::routes())
        .merge(health::routes())
        .merge(milk::routes())
        .merge(employees::routes())
        .merge(expenses::routes())
        .merge(services::routes())
        .merge(reports::routes())
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(auth::public_routes())
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::rate_limit,
        ))
        .with_state(state)
}

async fn health_check() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::ok(serde_json::json!({
        "status": "ok",
        "service": "safar-api",
    })))
}
