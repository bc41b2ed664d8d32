//! Access-control decisions for the users resource.
//!
//! Each function answers "may this caller proceed?" for one operation. They are pure:
//! handlers resolve the caller identity and the target first, then ask here before
//! touching persistence.

use crate::{auth::CallerIdentity, config::UserListAccess, error::ApiError, models::Role};
use uuid::Uuid;

/// authorize_create_user
///
/// Student accounts (or a missing role) may be created by anyone. Instructor and admin
/// accounts require an administrator caller.
pub fn authorize_create_user(
    requested: Role,
    caller: Option<&CallerIdentity>,
) -> Result<(), ApiError> {
    if !requested.is_privileged() || caller.is_some_and(CallerIdentity::is_admin) {
        return Ok(());
    }

    tracing::warn!(
        requested_role = %requested,
        caller_id = ?caller.map(|c| c.id),
        "denied creation of privileged account"
    );
    Err(ApiError::Forbidden)
}

/// authorize_user_lookup
///
/// A user's full record is visible to administrators and to the user themselves.
/// `target` is the parsed path id; `None` (unparseable) only ever matches an admin.
pub fn authorize_user_lookup(caller: &CallerIdentity, target: Option<Uuid>) -> Result<(), ApiError> {
    if caller.is_admin() || target == Some(caller.id) {
        return Ok(());
    }

    tracing::warn!(caller_id = %caller.id, target_id = ?target, "denied lookup of another user");
    Err(ApiError::Forbidden)
}

/// authorize_user_listing
///
/// With `AdminOnly`, anonymous callers get 401 and non-admins 403.
pub fn authorize_user_listing(
    access: UserListAccess,
    caller: Option<&CallerIdentity>,
) -> Result<(), ApiError> {
    match (access, caller) {
        (UserListAccess::Public, _) => Ok(()),
        (UserListAccess::AdminOnly, Some(caller)) if caller.is_admin() => Ok(()),
        (UserListAccess::AdminOnly, Some(caller)) => {
            tracing::warn!(caller_id = %caller.id, "denied user listing");
            Err(ApiError::Forbidden)
        }
        (UserListAccess::AdminOnly, None) => Err(ApiError::Authentication(
            "Valid authentication token required",
        )),
    }
}
