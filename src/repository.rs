use crate::{
    models::{Course, CreateUserRequest, NewUser, UnknownRole, User, UserCredentials, UserRow},
    password::{hash_password, verify_password, verify_unknown_account},
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use uuid::Uuid;

/// RepositoryError
///
/// Failures of the persistence layer. Handlers never show these to clients; they are
/// logged and converted into a generic 500 at the handler boundary.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("password hashing error: {0}")]
    PasswordHash(String),

    #[error("corrupt user row: {0}")]
    CorruptRow(#[from] UnknownRole),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Repository Trait
///
/// Abstract contract for all persistence operations used by the users resource.
/// Handlers only see `Arc<dyn Repository>`, which lets tests substitute an in-memory mock.
///
/// The provided methods (`insert_new_user`, `validate_user`, `get_courses_for_enrollment`,
/// `get_course_by_id`) are built on top of the required ones and are shared by every implementation.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    /// Inserts an account whose password is already hashed and returns its generated id.
    async fn insert_user(&self, user: NewUser) -> RepositoryResult<Uuid>;
    async fn get_user_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>>;
    /// Looks up the login credentials for an email address.
    async fn get_user_by_email(&self, email: &str) -> RepositoryResult<Option<UserCredentials>>;
    async fn get_all_users(&self) -> RepositoryResult<Vec<User>>;

    // --- Courses ---
    async fn get_courses_by_instructor_id(&self, instructor_id: Uuid) -> RepositoryResult<Vec<Course>>;
    /// Batched lookup. The result order is unspecified.
    async fn get_courses_by_ids(&self, ids: &[Uuid]) -> RepositoryResult<Vec<Course>>;

    /// get_course_by_id
    ///
    /// Single-course collaborator. Defaults to a one-element batch; backends may override
    /// it with a direct query.
    async fn get_course_by_id(&self, id: Uuid) -> RepositoryResult<Option<Course>> {
        Ok(self.get_courses_by_ids(&[id]).await?.into_iter().next())
    }

    /// insert_new_user
    ///
    /// Hashes the submitted password and stores the account. A missing role becomes `student`.
    async fn insert_new_user(&self, req: CreateUserRequest) -> RepositoryResult<Uuid> {
        let role = req.requested_role();
        let password_hash = hash_password(&req.password)?;
        self.insert_user(NewUser {
            name: req.name,
            email: req.email,
            password_hash,
            role,
        })
        .await
    }

    /// validate_user
    ///
    /// Returns the account id when `password` matches the stored hash for `email`,
    /// `None` for an unknown email or a wrong password. Both cases cost one Argon2 verification.
    async fn validate_user(&self, email: &str, password: &str) -> RepositoryResult<Option<Uuid>> {
        let Some(credentials) = self.get_user_by_email(email).await? else {
            verify_unknown_account(password);
            return Ok(None);
        };
        if verify_password(password, &credentials.password_hash)? {
            Ok(Some(credentials.id))
        } else {
            Ok(None)
        }
    }

    /// get_courses_for_enrollment
    ///
    /// Fetches all enrolled courses in one batched call and returns them in enrollment order.
    async fn get_courses_for_enrollment(&self, enrollment: &[Uuid]) -> RepositoryResult<Vec<Course>> {
        if enrollment.is_empty() {
            return Ok(vec![]);
        }
        let courses = self.get_courses_by_ids(enrollment).await?;
        Ok(order_by_enrollment(enrollment, courses))
    }
}

/// order_by_enrollment
///
/// Re-orders a batch of courses to match `enrollment`. Ids with no matching course are
/// skipped; a course listed twice in the enrollment appears twice.
pub fn order_by_enrollment(enrollment: &[Uuid], courses: Vec<Course>) -> Vec<Course> {
    let by_id: HashMap<Uuid, Course> = courses.into_iter().map(|c| (c.id, c)).collect();

    enrollment
        .iter()
        .filter_map(|id| {
            let course = by_id.get(id).cloned();
            if course.is_none() {
                tracing::warn!(course_id = %id, "enrolled course not found, skipping");
            }
            course
        })
        .collect()
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

const USER_COLUMNS: &str = "id, name, email, role, enrollment, created_at";
const COURSE_COLUMNS: &str = "id, subject, number, title, term, instructor_id";

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn insert_user(&self, user: NewUser) -> RepositoryResult<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO users (id, name, email, password_hash, role) VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn get_user_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::try_from).transpose()?)
    }

    async fn get_user_by_email(&self, email: &str) -> RepositoryResult<Option<UserCredentials>> {
        let credentials = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credentials)
    }

    /// get_all_users
    ///
    /// Administrative listing ordered by creation time. Password hashes are not selected.
    async fn get_all_users(&self) -> RepositoryResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| User::try_from(row).map_err(RepositoryError::from))
            .collect()
    }

    async fn get_courses_by_instructor_id(&self, instructor_id: Uuid) -> RepositoryResult<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE instructor_id = $1 ORDER BY subject, number"
        ))
        .bind(instructor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(courses)
    }

    async fn get_course_by_id(&self, id: Uuid) -> RepositoryResult<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(course)
    }

    /// get_courses_by_ids
    ///
    /// Single round trip using `= ANY($1)`; callers restore any ordering they need.
    async fn get_courses_by_ids(&self, ids: &[Uuid]) -> RepositoryResult<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = ANY($1)"
        ))
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(courses)
    }
}
