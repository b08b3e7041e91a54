/// JWT Claims structure
///
/// Payload of an access token: who the caller is, which role they hold,
/// and the standard `exp`/`iat`/`iss` claims (RFC 7519).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::roles::Role;
use crate::error::{AppError, AuthError};

/// JWT Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (student or admin id as UUID string)
    pub sub: String,
    pub role: Role,
    /// Student number, student tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nim: Option<String>,
    /// Student display name, student tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Admin username, admin tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

/// What a token is minted for; built from a student or admin record.
#[derive(Debug, Clone)]
pub enum TokenSubject {
    Student { id: Uuid, nim: String, name: String },
    Admin { id: Uuid, username: String },
}

impl TokenSubject {
    pub fn id(&self) -> Uuid {
        match self {
            TokenSubject::Student { id, .. } | TokenSubject::Admin { id, .. } => *id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            TokenSubject::Student { .. } => Role::Student,
            TokenSubject::Admin { .. } => Role::Admin,
        }
    }
}

impl Claims {
    /// Create new claims for a subject
    ///
    /// # Arguments
    /// * `subject` - Student or admin the token is for
    /// * `expiry_seconds` - Token lifetime in seconds from now
    /// * `issuer` - Issuer identifier
    pub fn new(subject: &TokenSubject, expiry_seconds: i64, issuer: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        let (nim, name, username) = match subject {
            TokenSubject::Student { nim, name, .. } => (Some(nim.clone()), Some(name.clone()), None),
            TokenSubject::Admin { username, .. } => (None, None, Some(username.clone())),
        };
        Self {
            sub: subject.id().to_string(),
            role: subject.role(),
            nim,
            name,
            username,
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer,
        }
    }

    /// Extract the subject id from claims
    ///
    /// # Errors
    /// A `sub` that is not a UUID makes the whole token invalid
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::Auth(AuthError::TokenInvalid))
    }
}
