use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use railbook_core::{Caller, OwnerId};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Caller identity, usually the e-mail address.
    pub sub: String,
    #[serde(default)]
    pub is_admin: bool,
    pub exp: usize,
}

pub fn decode_claims(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::AuthenticationError(format!("invalid token: {}", e)))?;

    if token_data.claims.sub.trim().is_empty() {
        return Err(AppError::AuthenticationError("token has no subject".to_string()));
    }
    Ok(token_data.claims)
}

// ============================================================================
// Authentication Middleware
// ============================================================================

/// Validates the bearer token and stores the resulting [`Caller`] in the
/// request extensions. A bare token without the `Bearer ` prefix is accepted.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            AppError::AuthenticationError("authorization token is not provided".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").unwrap_or(auth_header).trim();
    let claims = decode_claims(token, &state.auth.secret)?;

    req.extensions_mut().insert(Caller {
        identity: OwnerId::from(claims.sub),
        is_admin: claims.is_admin,
    });

    Ok(next.run(req).await)
}

pub fn require_admin(caller: &Caller) -> Result<(), AppError> {
    if caller.is_admin {
        Ok(())
    } else {
        Err(AppError::AuthorizationError("user is not an admin".to_string()))
    }
}
