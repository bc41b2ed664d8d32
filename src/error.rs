use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// ErrorBody
///
/// The JSON shape of every error response: `{ "error": "..." }`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// ApiError
///
/// Error taxonomy for the users resource. Every variant maps to one status code and
/// a fixed, client-safe message.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or incomplete request body (400).
    #[error("{0}")]
    Validation(&'static str),

    /// Missing or invalid credentials or token (401).
    #[error("{0}")]
    Authentication(&'static str),

    /// Valid identity, insufficient privilege (403).
    #[error("Unauthorized.")]
    Forbidden,

    /// The resource does not exist. Rendered exactly like the router fallback (404).
    #[error("Requested resource does not exist")]
    NotFound,

    /// A persistence or downstream failure (500). `source` is logged, never returned.
    #[error("{message}")]
    Dependency {
        message: &'static str,
        #[source]
        source: BoxError,
    },
}

impl ApiError {
    /// Builds a `map_err` adapter that wraps any collaborator error with a fixed message.
    pub fn dependency<E>(message: &'static str) -> impl FnOnce(E) -> ApiError
    where
        E: Into<BoxError>,
    {
        move |source| ApiError::Dependency {
            message,
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Dependency { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Dependency { message, source } = &self {
            tracing::error!(error = %source, "{}", message);
        }

        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// not_found
///
/// Router fallback. Shares its response with `ApiError::NotFound` so that handlers can
/// "fall through" to the same outcome as an unknown route.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
