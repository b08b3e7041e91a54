/// Credential store and history ledger persistence.
///
/// Services only see these traits. `PgStore` is the production backend;
/// `MemoryStore` keeps the same uniqueness rules in process and backs the
/// HTTP integration tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{AdminRecord, HistoryEntry, HistoryView, StudentRecord};
use crate::error::AppError;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Fails with `Conflict` if the NIM is taken.
    async fn insert_student(&self, student: StudentRecord) -> Result<StudentRecord, AppError>;

    async fn find_student(&self, id: Uuid) -> Result<Option<StudentRecord>, AppError>;

    async fn find_student_by_nim(&self, nim: &str) -> Result<Option<StudentRecord>, AppError>;

    /// All students ordered by name, ascending.
    async fn list_students(&self) -> Result<Vec<StudentRecord>, AppError>;

    /// Replaces the stored row with `student`. `Ok(None)` when the id is gone;
    /// `Conflict` when the new NIM is taken by someone else.
    async fn update_student(&self, student: StudentRecord) -> Result<Option<StudentRecord>, AppError>;

    /// `false` when there was nothing to delete. History entries of the
    /// student go with it.
    async fn delete_student(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait AdminStore: Send + Sync {
    /// Fails with `Conflict` if the username is taken.
    async fn insert_admin(&self, admin: AdminRecord) -> Result<AdminRecord, AppError>;

    async fn find_admin(&self, id: Uuid) -> Result<Option<AdminRecord>, AppError>;

    async fn find_admin_by_username(&self, username: &str) -> Result<Option<AdminRecord>, AppError>;
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Creates the student's entry or moves its `last_login` to `at`.
    async fn upsert_login(
        &self,
        student_id: Uuid,
        at: chrono::DateTime<chrono::Utc>,
    ) -> Result<HistoryEntry, AppError>;

    /// Never creates an entry; `Ok(None)` when the student has none.
    async fn update_logout(
        &self,
        student_id: Uuid,
        at: chrono::DateTime<chrono::Utc>,
    ) -> Result<Option<HistoryEntry>, AppError>;

    /// Entries with their student attached, most recent login first.
    async fn list_history(&self) -> Result<Vec<HistoryView>, AppError>;

    async fn delete_history(&self, id: Uuid) -> Result<bool, AppError>;

    /// Returns how many entries were removed.
    async fn clear_history(&self) -> Result<u64, AppError>;
}
