use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Every route here sits behind the authentication `route_layer` applied in
/// `create_router`, so handlers always receive a resolved `CallerIdentity`.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /users/{id}
        // One user plus courses taught (instructor) or attended (student).
        // Admin or self only.
        .route("/{id}", get(handlers::get_user))
}
