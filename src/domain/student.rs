use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::TokenSubject;

/// A student as stored, including the password hash.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    pub id: Uuid,
    pub nim: String,
    pub name: String,
    pub password_hash: String,
    pub dob: NaiveDate,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub hobby: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything about a student that may leave the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentProfile {
    pub id: Uuid,
    pub nim: String,
    pub name: String,
    pub dob: NaiveDate,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub hobby: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentRecord {
    pub fn from_new(new: NewStudent, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            nim: new.nim,
            name: new.name,
            password_hash,
            dob: new.dob,
            phone: new.phone,
            address: new.address,
            hobby: new.hobby,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn into_profile(self) -> StudentProfile {
        StudentProfile {
            id: self.id,
            nim: self.nim,
            name: self.name,
            dob: self.dob,
            phone: self.phone,
            address: self.address,
            hobby: self.hobby,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<&StudentProfile> for TokenSubject {
    fn from(profile: &StudentProfile) -> Self {
        TokenSubject::Student {
            id: profile.id,
            nim: profile.nim.clone(),
            name: profile.name.clone(),
        }
    }
}

/// Validated input for creating a student. `password` is still plaintext.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub nim: String,
    pub name: String,
    pub password: String,
    pub dob: NaiveDate,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub hobby: Option<String>,
}

/// Validated partial update.
///
/// `None` leaves a field alone. For the optional contact fields,
/// `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default)]
pub struct StudentChanges {
    pub nim: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub dob: Option<NaiveDate>,
    pub phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub hobby: Option<Option<String>>,
}

impl StudentChanges {
    /// Writes the changes into `record`. The plaintext password is never
    /// copied; callers pass the already computed hash instead.
    pub fn apply(self, record: &mut StudentRecord, password_hash: Option<String>) {
        if let Some(nim) = self.nim {
            record.nim = nim;
        }
        if let Some(name) = self.name {
            record.name = name;
        }
        if let Some(hash) = password_hash {
            record.password_hash = hash;
        }
        if let Some(dob) = self.dob {
            record.dob = dob;
        }
        if let Some(phone) = self.phone {
            record.phone = phone;
        }
        if let Some(address) = self.address {
            record.address = address;
        }
        if let Some(hobby) = self.hobby {
            record.hobby = hobby;
        }
        record.updated_at = Utc::now();
    }
}
