use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Last login/logout of one student. At most one entry per student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub student_id: Uuid,
    pub last_login: Option<DateTime<Utc>>,
    pub last_logout: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentSummary {
    pub id: Uuid,
    pub name: String,
    pub nim: String,
}

/// History entry with the owning student's summary attached, as listed to admins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryView {
    pub id: Uuid,
    pub student: Option<StudentSummary>,
    pub last_login: Option<DateTime<Utc>>,
    pub last_logout: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn first_login(student_id: Uuid, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id,
            last_login: Some(at),
            last_logout: None,
            created_at: at,
            updated_at: at,
        }
    }

    pub fn into_view(self, student: Option<StudentSummary>) -> HistoryView {
        HistoryView {
            id: self.id,
            student,
            last_login: self.last_login,
            last_logout: self.last_logout,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
