use crate::{
    AppState, access,
    auth::{self, CallerIdentity},
    error::{ApiError, ErrorBody},
    models::{
        CreateUserRequest, CreatedUser, LoginRequest, LoginResponse, Role, User, UserDetails,
    },
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use uuid::Uuid;
use validator::Validate;

// --- Client-facing messages ---

const INVALID_USER_BODY: &str = "Request body does not contain a valid user.";
const INSERT_USER_FAILED: &str = "Error inserting user into DB.  Please try again later.";
const MISSING_CREDENTIALS: &str = "Request body needs user email and password.";
const INVALID_CREDENTIALS: &str = "Invalid authentication credentials";
const LOGIN_FAILED: &str = "Error logging in.  Try again later.";
const LIST_USERS_FAILED: &str = "Unable to fetch users.  Please try again later.";
const FETCH_USER_FAILED: &str = "Unable to fetch user.  Please try again later.";

// --- Handlers ---

/// create_user
///
/// [Public Route] Creates a new account.
///
/// Order of checks:
/// 1. The body must deserialize and pass field validation (400), before any authorization.
/// 2. `instructor`/`admin` accounts require an admin caller (403); student accounts do not.
/// 3. Persistence failures become a generic 500.
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Created", body = CreatedUser),
        (status = 400, description = "Invalid user", body = ErrorBody),
        (status = 403, description = "Unauthorized", body = ErrorBody),
        (status = 500, description = "Database error", body = ErrorBody)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    caller: Option<CallerIdentity>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedUser>), ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::debug!(%rejection, "rejected user body");
        ApiError::Validation(INVALID_USER_BODY)
    })?;
    payload.validate().map_err(|errors| {
        tracing::debug!(%errors, "user body failed validation");
        ApiError::Validation(INVALID_USER_BODY)
    })?;

    let role = payload.requested_role();
    access::authorize_create_user(role, caller.as_ref())?;

    let id = state
        .repo
        .insert_new_user(payload)
        .await
        .map_err(ApiError::dependency(INSERT_USER_FAILED))?;

    tracing::info!(user_id = %id, %role, "user created");
    Ok((StatusCode::CREATED, Json(CreatedUser { id })))
}

/// login
///
/// [Public Route] Exchanges an email/password pair for a signed token carrying the
/// user's id and role.
#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Missing email or password", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 500, description = "Login error", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Ok(Json(LoginRequest {
        email: Some(email),
        password: Some(password),
    })) = payload
    else {
        return Err(ApiError::Validation(MISSING_CREDENTIALS));
    };
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::Validation(MISSING_CREDENTIALS));
    }

    let user_id = state
        .repo
        .validate_user(&email, &password)
        .await
        .map_err(ApiError::dependency(LOGIN_FAILED))?
        .ok_or(ApiError::Authentication(INVALID_CREDENTIALS))?;

    // The account can vanish between the credential check and this lookup.
    let user = state
        .repo
        .get_user_by_id(user_id)
        .await
        .map_err(ApiError::dependency(LOGIN_FAILED))?
        .ok_or(ApiError::Authentication(INVALID_CREDENTIALS))?;

    let token = auth::generate_auth_token(user.id, user.role, &state.config)
        .map_err(ApiError::dependency(LOGIN_FAILED))?;

    tracing::info!(user_id = %user.id, role = %user.role, "login succeeded");
    Ok(Json(LoginResponse { token }))
}

/// list_users
///
/// [Public/Admin Route] Lists every account. Whether a caller identity is required is
/// decided by `AppConfig::user_list_access`. An empty store falls through to 404.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users", body = [User]),
        (status = 401, description = "Authentication required", body = ErrorBody),
        (status = 403, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "No users", body = ErrorBody)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    caller: Option<CallerIdentity>,
) -> Result<Json<Vec<User>>, ApiError> {
    access::authorize_user_listing(state.config.user_list_access, caller.as_ref())?;

    let users = state
        .repo
        .get_all_users()
        .await
        .map_err(ApiError::dependency(LIST_USERS_FAILED))?;

    if users.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(users))
}

/// get_user
///
/// [Authenticated Route] Fetches one user with the courses they teach (instructors)
/// or attend (students). Admins may fetch anyone; everyone else only themselves.
///
/// *Note*: Any textual UUID form is accepted (hyphenated, simple, braced, any case). A
/// non-admin asking for an id that does not parse gets 403; an admin gets 404.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User with courses", body = UserDetails),
        (status = 401, description = "Authentication required", body = ErrorBody),
        (status = 403, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_user(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserDetails>, ApiError> {
    let target = Uuid::parse_str(&id).ok();
    access::authorize_user_lookup(&caller, target)?;

    let user_id = target.ok_or(ApiError::NotFound)?;

    let user = state
        .repo
        .get_user_by_id(user_id)
        .await
        .map_err(ApiError::dependency(FETCH_USER_FAILED))?
        .ok_or(ApiError::NotFound)?;

    let courses = match user.role {
        Role::Instructor => state.repo.get_courses_by_instructor_id(user.id).await,
        Role::Student => state.repo.get_courses_for_enrollment(&user.enrollment).await,
        Role::Admin => Ok(vec![]),
    }
    .map_err(ApiError::dependency(FETCH_USER_FAILED))?;

    Ok(Json(UserDetails::new(user, courses)))
}
