//! # Authentication and Authorization
//!
//! HS256 bearer tokens for registered users, plus the extractors guarding
//! protected routes: [`AuthUser`] for any signed-in user and [`AdminUser`]
//! for routes restricted to the Admin role.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AppConfig;
use crate::error::{ApiError, forbidden, unauthorized};
use crate::models::role::ADMIN_ROLE;
use crate::server::AppState;

/// Token failures
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,
    #[error("Authorization header must use Bearer scheme")]
    InvalidScheme,
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// JWT claims carried by every access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    /// Role name, e.g. "Admin"
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Fails when `issued_at + lifetime` is not a representable instant.
    pub fn new(
        user_id: i32,
        email: &str,
        role: &str,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<Self, AuthError> {
        let expires_at = issued_at
            .checked_add_signed(lifetime)
            .ok_or_else(|| AuthError::InvalidToken("token lifetime out of range".to_string()))?;

        Ok(Self {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        })
    }

    /// Numeric user id from `sub`.
    pub fn user_id(&self) -> Result<i32, AuthError> {
        self.sub
            .parse()
            .map_err(|_| AuthError::InvalidToken("subject is not a user id".to_string()))
    }
}

/// Signs `claims` with the configured secret.
pub fn encode_token(config: &AppConfig, claims: &Claims) -> Result<String, AuthError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(AuthError::Signing)
}

/// Issues a token valid for the configured lifetime, starting now.
pub fn issue_token(
    config: &AppConfig,
    user_id: i32,
    email: &str,
    role: &str,
) -> Result<String, AuthError> {
    let lifetime = Duration::try_hours(config.jwt_expiration_hours)
        .ok_or_else(|| AuthError::InvalidToken("token lifetime out of range".to_string()))?;
    let claims = Claims::new(user_id, email, role, Utc::now(), lifetime)?;
    tracing::debug!(user_id, role, "issuing access token");
    encode_token(config, &claims)
}

/// Verifies signature and expiry, returning the claims.
pub fn verify_token(config: &AppConfig, token: &str) -> Result<Claims, AuthError> {
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|err| match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::InvalidToken(err.to_string()),
    })
}

/// Extracts the raw token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidScheme)?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidScheme)
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.config)
    }
}

/// Signed-in user resolved from the bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i32,
    pub email: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    Arc<AppConfig>: FromRef<S>,
    S: Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<AppConfig>::from_ref(state);

        let claims = bearer_token(&parts.headers)
            .and_then(|token| verify_token(&config, token))
            .and_then(|claims| Ok((claims.user_id()?, claims)));

        match claims {
            Ok((id, claims)) => Ok(AuthUser {
                id,
                email: claims.email,
                role: claims.role,
            }),
            Err(err) => {
                tracing::debug!(error = %err, "rejecting unauthenticated request");
                Err(unauthorized(Some(&err.to_string())))
            }
        }
    }
}

/// Signed-in user holding the Admin role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    Arc<AppConfig>: FromRef<S>,
    S: Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            tracing::info!(user_id = user.id, role = %user.role, "admin route denied");
            return Err(forbidden(Some("Admin role required")));
        }
        Ok(AdminUser(user))
    }
}
