#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use course_portal::{
    AppState,
    auth::generate_auth_token,
    config::AppConfig,
    create_router,
    models::{Course, NewUser, Role, User, UserCredentials},
    password::hash_password,
    repository::{Repository, RepositoryError, RepositoryResult},
};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use tower::ServiceExt;
use uuid::Uuid;

// --- MOCK REPOSITORY IMPLEMENTATION ---

/// In-memory stand-in for the Postgres repository.
///
/// `fail_all` makes every call return a database error; `fail_courses` only fails the
/// course queries, after the user has been found. Inserts and email lookups are
/// recorded so tests can assert that persistence was (or was not) reached.
#[derive(Default)]
pub struct MockRepo {
    pub users: Vec<User>,
    pub credentials: Vec<(String, UserCredentials)>,
    pub courses: Vec<Course>,
    pub fail_all: bool,
    pub fail_courses: bool,
    pub inserted: Mutex<Vec<NewUser>>,
    pub email_lookups: AtomicUsize,
    pub course_lookups: AtomicUsize,
}

impl MockRepo {
    pub fn failing() -> Self {
        MockRepo {
            fail_all: true,
            ..Default::default()
        }
    }

    pub fn failing_courses(mut self) -> Self {
        self.fail_courses = true;
        self
    }

    /// Adds a user that can log in with `password`.
    pub fn with_login(mut self, user: User, password: &str) -> Self {
        let credentials = UserCredentials {
            id: user.id,
            password_hash: hash_password(password).unwrap(),
        };
        self.credentials.push((user.email.clone(), credentials));
        self.users.push(user);
        self
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.users.push(user);
        self
    }

    pub fn with_course(mut self, course: Course) -> Self {
        self.courses.push(course);
        self
    }

    pub fn inserted_count(&self) -> usize {
        self.inserted.lock().unwrap().len()
    }

    fn check(&self) -> RepositoryResult<()> {
        if self.fail_all {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }

    fn check_courses(&self) -> RepositoryResult<()> {
        self.check()?;
        if self.fail_courses {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Repository for MockRepo {
    async fn insert_user(&self, user: NewUser) -> RepositoryResult<Uuid> {
        self.check()?;
        self.inserted.lock().unwrap().push(user);
        Ok(Uuid::new_v4())
    }

    async fn get_user_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        self.check()?;
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> RepositoryResult<Option<UserCredentials>> {
        self.email_lookups.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self
            .credentials
            .iter()
            .find(|(e, _)| e == email)
            .map(|(_, c)| c.clone()))
    }

    async fn get_all_users(&self) -> RepositoryResult<Vec<User>> {
        self.check()?;
        Ok(self.users.clone())
    }

    async fn get_courses_by_instructor_id(&self, instructor_id: Uuid) -> RepositoryResult<Vec<Course>> {
        self.course_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_courses()?;
        Ok(self
            .courses
            .iter()
            .filter(|c| c.instructor_id == instructor_id)
            .cloned()
            .collect())
    }

    // Returned in reverse storage order so callers must restore enrollment order themselves.
    async fn get_courses_by_ids(&self, ids: &[Uuid]) -> RepositoryResult<Vec<Course>> {
        self.course_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_courses()?;
        Ok(self
            .courses
            .iter()
            .rev()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }
}

// --- Fixtures ---

pub fn user(role: Role) -> User {
    let id = Uuid::new_v4();
    User {
        id,
        name: format!("{role} {}", &id.simple().to_string()[..4]),
        email: format!("{}@example.edu", id.simple()),
        role,
        ..User::default()
    }
}

pub fn course(title: &str, instructor_id: Uuid) -> Course {
    Course {
        id: Uuid::new_v4(),
        subject: "CS".to_string(),
        number: "493".to_string(),
        title: title.to_string(),
        term: "sp25".to_string(),
        instructor_id,
    }
}

pub fn bearer(id: Uuid, role: Role, config: &AppConfig) -> String {
    format!("Bearer {}", generate_auth_token(id, role, config).unwrap())
}

// --- Router Harness ---

pub fn app_with(repo: Arc<MockRepo>, config: AppConfig) -> Router {
    create_router(AppState { repo, config })
}

pub fn app(repo: Arc<MockRepo>) -> Router {
    app_with(repo, AppConfig::default())
}

pub fn json_request(method: &str, uri: &str, auth: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).unwrap()
}

/// Runs one request through the router and returns the status and parsed JSON body
/// (`Value::Null` for an empty or non-JSON body).
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}
