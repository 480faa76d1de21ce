use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use safar_shared::models::auth::UserRole;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User record id.
    pub sub: String,
    pub email: String,
    pub role: UserRole,
    pub exp: usize,
}

/// Every route behind this middleware sees `Claims` in request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Authentication("Missing authorization token".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Authentication("Malformed authorization header".to_string()))?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Authentication("Invalid or expired token".to_string()))?;

    req.extensions_mut().insert(token_data.claims);

    Ok(next.run(req).await)
}

/// Destructive and staffing operations are admin-only.
pub fn require_admin(claims: &Claims) -> Result<(), AppError> {
    if claims.role == UserRole::Admin {
        Ok(())
    } else {
        Err(AppError::Authorization(
            "Administrator role required".to_string(),
        ))
    }
}
