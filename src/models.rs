use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Roles ---

/// Role
///
/// The RBAC field carried by every account and embedded in issued tokens.
/// Serialized in lowercase (`"student"`, `"instructor"`, `"admin"`), both on the wire
/// and in the `users.role` column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    #[default]
    Student,
    Instructor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Instructor => "instructor",
            Role::Admin => "admin",
        }
    }

    /// Roles that may only be granted by an administrator.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Instructor | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored or submitted role string is not one of the known roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "instructor" => Ok(Role::Instructor),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The public view of an account from the `users` table. The password hash never
/// leaves the repository, so this struct is safe to serialize in any response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Ordered course ids the user is registered in (students only).
    pub enrollment: Vec<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// UserRow
///
/// Raw database row for `users`. The role is stored as text and parsed on the way out.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub enrollment: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = UnknownRole;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role.parse()?,
            enrollment: row.enrollment,
            created_at: row.created_at,
        })
    }
}

/// UserCredentials
///
/// Internal structure used only by the login flow: the account id and its Argon2 PHC hash.
#[derive(Clone, FromRow)]
pub struct UserCredentials {
    pub id: Uuid,
    pub password_hash: String,
}

/// NewUser
///
/// An account ready for insertion. The password has already been hashed.
#[derive(Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Course
///
/// A course record from the `courses` table, attached to user details as
/// "courses taught" (instructors) or "courses attending" (students).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Course {
    pub id: Uuid,
    pub subject: String,
    pub number: String,
    pub title: String,
    pub term: String,
    pub instructor_id: Uuid,
}

// --- Request Payloads (Input Schemas) ---

/// CreateUserRequest
///
/// Input payload for account creation (POST /users). A missing `role` means `student`.
/// Requests for `instructor` or `admin` accounts must come from an administrator.
#[derive(Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateUserRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

impl CreateUserRequest {
    /// The role the new account will receive.
    pub fn requested_role(&self) -> Role {
        self.role.unwrap_or_default()
    }
}

/// LoginRequest
///
/// Input payload for POST /users/login. Both fields are optional at the type level so that
/// a missing field is reported with a 400 by the handler rather than by the JSON extractor.
#[derive(Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

// --- Response Schemas (Output) ---

/// CreatedUser
///
/// Response for a successful account creation (201).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreatedUser {
    pub id: Uuid,
}

/// LoginResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
}

/// UserDetails
///
/// Output schema for GET /users/{id}: the user record plus the courses they teach
/// or attend. `courses` follows the order of `enrollment` for students.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserDetails {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub enrollment: Vec<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub courses: Vec<Course>,
}

impl UserDetails {
    pub fn new(user: User, courses: Vec<Course>) -> Self {
        UserDetails {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            enrollment: user.enrollment,
            created_at: user.created_at,
            courses,
        }
    }
}
