use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use safar_shared::envelope::ApiResponse;
use safar_store::cache::keys;

use crate::state::AppState;

/// Per-IP fixed window over the cache. Counting failures never block a
/// request; a broken cache degrades to no limiting.
pub async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "local".to_string());
    let key = keys::rate_limit(&ip);

    match state
        .cache
        .incr_with_ttl(&key, state.rate_limit.window_seconds)
        .await
    {
        Ok(count) if count > state.rate_limit.limit => {
            tracing::warn!("Rate limit exceeded for {}", ip);
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ApiResponse::<()>::fail("Rate limit exceeded")),
            )
                .into_response()
        }
        _ => next.run(req).await,
    }
}
