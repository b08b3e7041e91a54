/// Authentication Routes
///
/// Handles student registration, student and admin login, logout, and the
/// authenticated profile echo.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::AuthenticatedUser;
use crate::error::{AppError, AuthError, ValidationError};
use crate::routes::students::CreateStudentRequest;
use crate::services::AuthService;
use crate::validators::is_present;

/// Student login request
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudentLoginRequest {
    pub nim: String,
    pub password: String,
}

/// Admin login request
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub message: &'static str,
    pub user: AuthenticatedUser,
}

/// Passwords are compared as sent, surrounding whitespace included.
fn required_password(password: &str) -> Result<&str, ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()));
    }
    Ok(password)
}

/// POST /auth/register
///
/// Register a new student and log them in.
///
/// # Errors
/// - 400: Validation errors (nim/name/password/dob)
/// - 409: NIM already registered
pub async fn register(
    body: web::Json<CreateStudentRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let new_student = body.into_inner().validate()?;
    let token = auth.register_student(new_student).await?;

    Ok(HttpResponse::Created().json(token))
}

/// POST /auth/student/login
///
/// # Security Notes
/// - Same 401 body for "unknown NIM" and "wrong password"
pub async fn student_login(
    body: web::Json<StudentLoginRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let nim = is_present("nim", &body.nim)?;
    let password = required_password(&body.password)?;

    let student = auth
        .validate_student_credentials(&nim, password)
        .await?
        .ok_or_else(|| AuthError::InvalidCredentials("Invalid NIM or password".to_string()))?;

    let token = auth.login_student(&student).await?;
    tracing::info!(student_id = %student.id, "Student logged in successfully");

    Ok(HttpResponse::Ok().json(token))
}

/// POST /auth/admin/login
pub async fn admin_login(
    body: web::Json<AdminLoginRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let username = is_present("username", &body.username)?;
    let password = required_password(&body.password)?;

    let admin = auth
        .validate_admin_credentials(&username, password)
        .await?
        .ok_or_else(|| {
            AuthError::InvalidCredentials("Invalid username or password".to_string())
        })?;

    let token = auth.login_admin(&admin)?;
    tracing::info!(admin_id = %admin.id, "Admin logged in successfully");

    Ok(HttpResponse::Ok().json(token))
}

/// POST /auth/logout
///
/// **Requires valid JWT access token.** Never fails once the token is
/// accepted; history bookkeeping errors are only logged.
pub async fn logout(
    user: web::ReqData<AuthenticatedUser>,
    auth: web::Data<AuthService>,
) -> HttpResponse {
    let confirmation = auth.logout(&user).await;
    HttpResponse::Ok().json(confirmation)
}

/// GET /auth/profile
pub async fn profile(user: web::ReqData<AuthenticatedUser>) -> HttpResponse {
    HttpResponse::Ok().json(ProfileResponse {
        message: "This is a protected profile route.",
        user: user.into_inner(),
    })
}
