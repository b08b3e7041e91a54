/// Authentication flow: credential checks, token issuance and the history
/// bookkeeping around login, registration and logout.

use serde::Serialize;

use crate::auth::{
    generate_access_token, AuthToken, AuthenticatedUser, Claims, PasswordHasher, Role, TokenSubject,
};
use crate::configuration::JwtSettings;
use crate::domain::{AdminProfile, NewStudent, StudentProfile};
use crate::error::{AppError, ErrorContext};
use crate::services::admins::AdminService;
use crate::services::history::HistoryLedger;
use crate::services::students::StudentService;

#[derive(Clone)]
pub struct AuthService {
    students: StudentService,
    admins: AdminService,
    history: HistoryLedger,
    hasher: PasswordHasher,
    jwt: JwtSettings,
}

#[derive(Debug, Serialize)]
pub struct LogoutConfirmation {
    pub message: String,
}

impl AuthService {
    pub fn new(
        students: StudentService,
        admins: AdminService,
        history: HistoryLedger,
        hasher: PasswordHasher,
        jwt: JwtSettings,
    ) -> Self {
        Self {
            students,
            admins,
            history,
            hasher,
            jwt,
        }
    }

    pub fn jwt_settings(&self) -> &JwtSettings {
        &self.jwt
    }

    /// `None` for an unknown NIM and for a wrong password alike. An unknown
    /// NIM still pays for one bcrypt comparison.
    pub async fn validate_student_credentials(
        &self,
        nim: &str,
        password: &str,
    ) -> Result<Option<StudentProfile>, AppError> {
        tracing::debug!(nim = %nim, "Validating student credentials");

        let Some(student) = self.students.find_by_nim(nim).await? else {
            self.hasher.verify_dummy(password).await;
            tracing::warn!(nim = %nim, "Student not found during validation");
            return Ok(None);
        };

        if self.hasher.verify(password, &student.password_hash).await? {
            Ok(Some(student.into_profile()))
        } else {
            tracing::warn!(nim = %nim, "Password mismatch for student");
            Ok(None)
        }
    }

    pub async fn validate_admin_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<AdminProfile>, AppError> {
        tracing::debug!(username = %username, "Validating admin credentials");

        let Some(admin) = self.admins.find_by_username(username).await? else {
            self.hasher.verify_dummy(password).await;
            tracing::warn!(username = %username, "Admin not found during validation");
            return Ok(None);
        };

        if self.hasher.verify(password, &admin.password_hash).await? {
            Ok(Some(admin.into_profile()))
        } else {
            tracing::warn!(username = %username, "Password mismatch for admin");
            Ok(None)
        }
    }

    pub fn issue_token(&self, subject: &TokenSubject) -> Result<AuthToken, AppError> {
        let token = generate_access_token(subject, &self.jwt)?;
        tracing::info!(subject = %subject.id(), role = %subject.role(), "Issued access token");
        Ok(token)
    }

    pub async fn login_student(&self, student: &StudentProfile) -> Result<AuthToken, AppError> {
        let token = self.issue_token(&TokenSubject::from(student))?;
        self.record_login_quietly(student, "student_login").await;
        Ok(token)
    }

    pub fn login_admin(&self, admin: &AdminProfile) -> Result<AuthToken, AppError> {
        self.issue_token(&TokenSubject::from(admin))
    }

    /// # Errors
    /// `Conflict` when the NIM is already registered
    pub async fn register_student(&self, new: NewStudent) -> Result<AuthToken, AppError> {
        tracing::info!(nim = %new.nim, "Registering new student");

        let student = self.students.create(new).await.map_err(|e| {
            if e.is_conflict() {
                tracing::warn!(error = %e, "Registration rejected");
            }
            e
        })?;

        let token = self.issue_token(&TokenSubject::from(&student))?;
        self.record_login_quietly(&student, "student_registration").await;
        Ok(token)
    }

    /// Maps verified claims to a live account. `None` when the account the
    /// token was minted for no longer exists.
    pub async fn resolve_user(&self, claims: &Claims) -> Result<Option<AuthenticatedUser>, AppError> {
        let user_id = claims.user_id()?;

        let user = match claims.role {
            Role::Student => self
                .students
                .find_one(user_id)
                .await?
                .map(|student| AuthenticatedUser {
                    user_id,
                    role: Role::Student,
                    nim: Some(student.nim),
                    name: Some(student.name),
                    username: None,
                }),
            Role::Admin => self
                .admins
                .find_one_by_id(user_id)
                .await?
                .map(|admin| AuthenticatedUser {
                    user_id,
                    role: Role::Admin,
                    nim: None,
                    name: None,
                    username: Some(admin.username),
                }),
        };

        Ok(user)
    }

    /// Always succeeds; the client drops the token regardless.
    pub async fn logout(&self, user: &AuthenticatedUser) -> LogoutConfirmation {
        tracing::info!(user_id = %user.user_id, role = %user.role, "User logging out");

        if user.role == Role::Student {
            match self.history.record_logout(user.user_id).await {
                Ok(Some(_)) => {
                    tracing::info!(student_id = %user.user_id, "Logout history recorded")
                }
                Ok(None) => {}
                Err(e) => ErrorContext::new("student_logout")
                    .with_user_id(user.user_id.to_string())
                    .log_swallowed(&e),
            }
        }

        LogoutConfirmation {
            message: "Successfully logged out".to_string(),
        }
    }

    async fn record_login_quietly(&self, student: &StudentProfile, operation: &str) {
        match self.history.record_login(student.id).await {
            Ok(_) => tracing::info!(student_id = %student.id, "Login history recorded"),
            Err(e) => ErrorContext::new(operation)
                .with_user_id(student.id.to_string())
                .log_swallowed(&e),
        }
    }
}
