use anyhow::anyhow;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::Role;
use crate::startup::AppState;

pub const TOKEN_COOKIE: &str = "token";

/// Claims carried by the session cookie. The role arrives as a free string
/// and is normalized to the [`Role`] enum exactly once, here at the
/// boundary; nothing downstream ever re-parses it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub id: String,
    pub role: String,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Issued at (Unix timestamp).
    pub iat: i64,
}

/// The authenticated actor, resolved from the token and a live user lookup.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    /// Role gate used at the top of handlers.
    pub fn require(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(anyhow!(
                "Access denied: insufficient role"
            )))
        }
    }
}

/// Requires a valid `token` cookie resolving to a live user. The resolved
/// [`AuthUser`] is stored in request extensions for the extractor.
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = jar
        .get(TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| AppError::Unauthorized(anyhow!("Authentication required")))?;

    let claims = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(state.config.auth.jwt_secret.as_bytes()),
        &Validation::default(),
    )?
    .claims;

    let role = claims
        .role
        .parse::<Role>()
        .map_err(|_| AppError::Unauthorized(anyhow!("Invalid token")))?;

    let user = state
        .store
        .find_user(&claims.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized(anyhow!("User not found")))?;

    req.extensions_mut().insert(AuthUser {
        id: user.id,
        email: user.email,
        role,
    });
    Ok(next.run(req).await)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| {
                AppError::InternalError(anyhow!("AuthUser missing from request extensions"))
            })
    }
}

/// Mints a session token. Production never calls this (identity arrives
/// from outside); tests and dev seeding do.
pub fn issue_token(
    secret: &str,
    user_id: &str,
    role: Role,
    ttl_hours: i64,
) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        id: user_id.to_string(),
        role: role.to_string(),
        exp: (now + Duration::hours(ttl_hours)).timestamp(),
        iat: now.timestamp(),
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}
