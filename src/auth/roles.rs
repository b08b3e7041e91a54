/// Roles and the per-request role gate.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{AppError, AuthError};

/// Coarse permission tag carried in every token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Caller identity after token verification and account lookup.
/// Stored in request extensions by the JWT middleware.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Decides whether `caller` may reach a route requiring `required`.
///
/// An empty `required` set admits any authenticated caller. A missing caller
/// is always `Unauthorized`, never `Forbidden`.
pub fn authorize(required: &[Role], caller: Option<&AuthenticatedUser>) -> Result<(), AppError> {
    let caller = caller.ok_or(AppError::Auth(AuthError::MissingToken))?;

    if required.is_empty() || required.contains(&caller.role) {
        return Ok(());
    }

    Err(AppError::forbidden(
        "You do not have the right permission (role) to access this resource.",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::new_v4(),
            role,
            nim: None,
            name: None,
            username: None,
        }
    }

    #[test]
    fn empty_requirement_admits_any_role() {
        assert!(authorize(&[], Some(&user(Role::Student))).is_ok());
        assert!(authorize(&[], Some(&user(Role::Admin))).is_ok());
    }

    #[test]
    fn matching_role_is_admitted() {
        assert!(authorize(&[Role::Admin], Some(&user(Role::Admin))).is_ok());
        assert!(authorize(&[Role::Student, Role::Admin], Some(&user(Role::Student))).is_ok());
    }

    #[test]
    fn wrong_role_is_forbidden() {
        let err = authorize(&[Role::Admin], Some(&user(Role::Student))).unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::Forbidden(_))));

        let err = authorize(&[Role::Student], Some(&user(Role::Admin))).unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::Forbidden(_))));
    }

    #[test]
    fn missing_caller_is_unauthorized_even_for_open_routes() {
        let err = authorize(&[], None).unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::MissingToken)));

        let err = authorize(&[Role::Admin], None).unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::MissingToken)));
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"student\"").unwrap(),
            Role::Student
        );
    }
}
