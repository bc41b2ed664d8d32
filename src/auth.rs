use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use uuid::Uuid;

use crate::{config::AppConfig, error::ApiError, models::Role};

/// Claims
///
/// Payload of the JSON Web Tokens issued by POST /users/login.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user's id.
    pub sub: Uuid,
    /// The role the user held when the token was issued.
    pub role: Role,
    /// Issued At (iat).
    pub iat: usize,
    /// Expiration Time (exp). Always validated on decode.
    pub exp: usize,
}

/// CallerIdentity
///
/// The resolved, immutable identity of an authenticated request, handed to handlers
/// as an extractor argument.
///
/// - `CallerIdentity` rejects with 401 when no valid bearer token is present.
/// - `Option<CallerIdentity>` never rejects; it is `None` for anonymous callers and for
///   tokens that fail verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    pub id: Uuid,
    pub role: Role,
}

impl CallerIdentity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// generate_auth_token
///
/// Signs an HS256 token for `id`/`role`, valid for `config.jwt_ttl_secs`.
pub fn generate_auth_token(
    id: Uuid,
    role: Role,
    config: &AppConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp().max(0) as usize;
    let claims = Claims {
        sub: id,
        role,
        iat: now,
        exp: now + config.jwt_ttl_secs as usize,
    };

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    encode(&Header::default(), &claims, &key)
}

/// verify_auth_token
///
/// Decodes and validates a token (signature and expiry) and returns the identity it carries.
pub fn verify_auth_token(
    token: &str,
    config: &AppConfig,
) -> Result<CallerIdentity, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let data = decode::<Claims>(token, &key, &validation)?;
    Ok(CallerIdentity {
        id: data.claims.sub,
        role: data.claims.role,
    })
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // The authentication middleware may already have resolved the identity.
        if let Some(identity) = parts.extensions.get::<CallerIdentity>() {
            return Ok(*identity);
        }

        let token = bearer_token(parts)
            .ok_or(ApiError::Authentication("Valid authentication token required"))?;

        let config = AppConfig::from_ref(state);
        verify_auth_token(token, &config).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("rejected expired token"),
                other => tracing::debug!(reason = ?other, "rejected invalid token"),
            }
            ApiError::Authentication("Valid authentication token required")
        })
    }
}

impl<S> OptionalFromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(
            <CallerIdentity as FromRequestParts<S>>::from_request_parts(parts, state)
                .await
                .ok(),
        )
    }
}
