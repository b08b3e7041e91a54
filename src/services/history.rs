/// Login/logout history ledger.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{HistoryEntry, HistoryView};
use crate::error::AppError;
use crate::store::HistoryStore;

#[derive(Clone)]
pub struct HistoryLedger {
    store: Arc<dyn HistoryStore>,
}

#[derive(Debug, Serialize)]
pub struct HistoryDeleted {
    pub message: String,
    pub history_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct HistoryCleared {
    pub message: String,
    pub deleted_count: u64,
}

impl HistoryLedger {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self { store }
    }

    /// Creates the student's entry on first login, otherwise bumps `last_login`.
    #[tracing::instrument(name = "history.record_login", skip(self))]
    pub async fn record_login(&self, student_id: Uuid) -> Result<HistoryEntry, AppError> {
        self.store.upsert_login(student_id, Utc::now()).await
    }

    /// Update-only. `Ok(None)` means the student never logged in, which
    /// callers treat as nothing to record.
    #[tracing::instrument(name = "history.record_logout", skip(self))]
    pub async fn record_logout(&self, student_id: Uuid) -> Result<Option<HistoryEntry>, AppError> {
        let entry = self.store.update_logout(student_id, Utc::now()).await?;
        if entry.is_none() {
            tracing::warn!(student_id = %student_id, "No history entry to record logout against");
        }
        Ok(entry)
    }

    pub async fn find_all(&self) -> Result<Vec<HistoryView>, AppError> {
        self.store.list_history().await
    }

    pub async fn delete_one(&self, id: Uuid) -> Result<HistoryDeleted, AppError> {
        if !self.store.delete_history(id).await? {
            return Err(AppError::NotFound(format!(
                "History record with ID \"{}\" not found",
                id
            )));
        }

        tracing::info!(history_id = %id, "History record deleted");
        Ok(HistoryDeleted {
            message: format!("History record with ID \"{}\" successfully deleted", id),
            history_id: id,
        })
    }

    pub async fn clear_all(&self) -> Result<HistoryCleared, AppError> {
        let deleted_count = self.store.clear_history().await?;

        tracing::info!(deleted_count, "All history records deleted");
        Ok(HistoryCleared {
            message: "All history records have been successfully cleared.".to_string(),
            deleted_count,
        })
    }
}
