use chrono::Utc;
use course_portal::models::{
    Course, CreateUserRequest, LoginRequest, Role, User, UserDetails, UserRow,
};
use uuid::Uuid;
use validator::Validate;

#[test]
fn test_role_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Role::Instructor).unwrap(), r#""instructor""#);
    assert_eq!(serde_json::from_str::<Role>(r#""admin""#).unwrap(), Role::Admin);
    assert!(serde_json::from_str::<Role>(r#""Admin""#).is_err());
    assert_eq!("student".parse::<Role>().unwrap(), Role::Student);
    assert!("professor".parse::<Role>().is_err());
}

#[test]
fn test_only_instructor_and_admin_are_privileged() {
    assert!(!Role::Student.is_privileged());
    assert!(Role::Instructor.is_privileged());
    assert!(Role::Admin.is_privileged());
}

#[test]
fn test_create_user_request_role_is_optional() {
    let req: CreateUserRequest = serde_json::from_str(
        r#"{"name":"Grace","email":"grace@example.edu","password":"cobol"}"#,
    )
    .unwrap();
    assert_eq!(req.role, None);
    assert_eq!(req.requested_role(), Role::Student);
    assert!(req.validate().is_ok());
}

#[test]
fn test_create_user_request_validation() {
    let mut req = CreateUserRequest {
        name: "Grace".to_string(),
        email: "invalid".to_string(),
        password: "cobol".to_string(),
        role: Some(Role::Instructor),
    };
    assert!(req.validate().is_err());

    req.email = "grace@example.edu".to_string();
    assert!(req.validate().is_ok());

    req.name = String::new();
    assert!(req.validate().is_err());
}

#[test]
fn test_login_request_tolerates_missing_fields() {
    let req: LoginRequest = serde_json::from_str(r#"{"email":"grace@example.edu"}"#).unwrap();
    assert_eq!(req.email.as_deref(), Some("grace@example.edu"));
    assert!(req.password.is_none());
}

#[test]
fn test_user_row_with_unknown_role_is_rejected() {
    let row = UserRow {
        id: Uuid::new_v4(),
        name: "Mallory".to_string(),
        email: "m@example.edu".to_string(),
        role: "root".to_string(),
        enrollment: vec![],
        created_at: Utc::now(),
    };
    assert!(User::try_from(row).is_err());
}

#[test]
fn test_user_details_json_shape() {
    let user = User {
        id: Uuid::new_v4(),
        name: "Alan".to_string(),
        email: "alan@example.edu".to_string(),
        role: Role::Student,
        enrollment: vec![Uuid::new_v4()],
        created_at: Utc::now(),
    };
    let course = Course {
        id: user.enrollment[0],
        title: "Computability".to_string(),
        ..Course::default()
    };

    let json = serde_json::to_value(UserDetails::new(user.clone(), vec![course])).unwrap();

    assert_eq!(json["id"], user.id.to_string());
    assert_eq!(json["role"], "student");
    assert_eq!(json["courses"][0]["title"], "Computability");
    assert!(json.get("password").is_none());
    assert!(json.get("password_hash").is_none());
}
