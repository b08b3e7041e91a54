use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::TokenSubject;

#[derive(Debug, Clone, PartialEq)]
pub struct AdminRecord {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminProfile {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating an admin; `password` is plaintext.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub username: String,
    pub password: String,
}

impl AdminRecord {
    pub fn from_new(username: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn into_profile(self) -> AdminProfile {
        AdminProfile {
            id: self.id,
            username: self.username,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<&AdminProfile> for TokenSubject {
    fn from(profile: &AdminProfile) -> Self {
        TokenSubject::Admin {
            id: profile.id,
            username: profile.username.clone(),
        }
    }
}
