use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::info;

use safar_core::validation;
use safar_shared::envelope::ApiResponse;
use safar_shared::models::auth::{LoginRequest, LoginResponse};

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/api/auth/login", post(login))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/auth/me", get(me))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    validation::require_non_empty("email", &req.email)?;
    validation::require_non_empty("password", &req.password)?;

    let user = state
        .user_repo
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| AppError::Authentication("Invalid credentials".to_string()))?;

    let password_ok = bcrypt::verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::Anyhow(e.into()))?;
    if !password_ok {
        return Err(AppError::Authentication("Invalid credentials".to_string()));
    }

    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        role: user.role,
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))?;

    info!("User {} logged in", user.email);

    Ok(Json(ApiResponse::ok(LoginResponse {
        token,
        user: user.into(),
    })))
}

/// Echo the verified claims back to the caller. Decodes from the header
/// directly rather than trusting extensions, so the handler also works when
/// mounted without the auth layer.
async fn me(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<ApiResponse<Claims>>, AppError> {
    let token_data = decode::<Claims>(
        bearer.token(),
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Authentication("Invalid or expired token".to_string()))?;

    Ok(Json(ApiResponse::ok(token_data.claims)))
}
