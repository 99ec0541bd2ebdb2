use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};

use crate::middleware::auth::Claims;

/// Mint an HS256 token the API accepts, valid for `ttl_seconds`.
pub fn issue_token(
    secret: &str,
    subject: &str,
    is_admin: bool,
    ttl_seconds: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
    let expires_at = Utc::now()
        .checked_add_signed(Duration::seconds(ttl.min(i64::MAX / 1000)))
        .unwrap_or_else(Utc::now);

    let claims = Claims {
        sub: subject.to_owned(),
        is_admin,
        exp: usize::try_from(expires_at.timestamp()).unwrap_or(usize::MAX),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}
