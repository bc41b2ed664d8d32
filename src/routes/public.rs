use crate::{AppState, handlers};
use axum::{Router, routing::post};

/// Public Router Module
///
/// Endpoints mounted under `/users` that do not require a token up front.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // POST /users
        // Account creation. Student accounts are open; instructor/admin accounts are
        // checked against the optional caller identity inside the handler.
        // GET /users
        // Full listing, gated by `AppConfig::user_list_access`.
        .route("/", post(handlers::create_user).get(handlers::list_users))
        // POST /users/login
        // Credential exchange for a signed token.
        .route("/login", post(handlers::login))
}
