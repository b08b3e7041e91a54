/// In-process store with the same contract as `PgStore`: unique NIM,
/// unique admin username, one history entry per student, cascade delete.
/// Used by the integration tests and for running without a database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{AdminRecord, HistoryEntry, HistoryView, StudentRecord, StudentSummary};
use crate::error::AppError;
use crate::store::{AdminStore, HistoryStore, StudentStore};

#[derive(Default)]
struct Tables {
    students: HashMap<Uuid, StudentRecord>,
    admins: HashMap<Uuid, AdminRecord>,
    history: HashMap<Uuid, HistoryEntry>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal("memory store lock poisoned".to_string()))
    }

    /// Number of history entries, for assertions in tests.
    pub fn history_len(&self) -> usize {
        self.lock().map(|t| t.history.len()).unwrap_or(0)
    }
}

fn nim_taken(tables: &Tables, nim: &str, except: Option<Uuid>) -> bool {
    tables
        .students
        .values()
        .any(|s| s.nim == nim && Some(s.id) != except)
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn insert_student(&self, student: StudentRecord) -> Result<StudentRecord, AppError> {
        let mut tables = self.lock()?;
        if nim_taken(&tables, &student.nim, None) {
            return Err(AppError::Conflict("NIM already registered".to_string()));
        }
        tables.students.insert(student.id, student.clone());
        Ok(student)
    }

    async fn find_student(&self, id: Uuid) -> Result<Option<StudentRecord>, AppError> {
        Ok(self.lock()?.students.get(&id).cloned())
    }

    async fn find_student_by_nim(&self, nim: &str) -> Result<Option<StudentRecord>, AppError> {
        Ok(self
            .lock()?
            .students
            .values()
            .find(|s| s.nim == nim)
            .cloned())
    }

    async fn list_students(&self) -> Result<Vec<StudentRecord>, AppError> {
        let mut students: Vec<StudentRecord> = self.lock()?.students.values().cloned().collect();
        students.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.nim.cmp(&b.nim)));
        Ok(students)
    }

    async fn update_student(&self, student: StudentRecord) -> Result<Option<StudentRecord>, AppError> {
        let mut tables = self.lock()?;
        if !tables.students.contains_key(&student.id) {
            return Ok(None);
        }
        if nim_taken(&tables, &student.nim, Some(student.id)) {
            return Err(AppError::Conflict("NIM already registered".to_string()));
        }
        tables.students.insert(student.id, student.clone());
        Ok(Some(student))
    }

    async fn delete_student(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.lock()?;
        let removed = tables.students.remove(&id).is_some();
        if removed {
            tables.history.retain(|_, entry| entry.student_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl AdminStore for MemoryStore {
    async fn insert_admin(&self, admin: AdminRecord) -> Result<AdminRecord, AppError> {
        let mut tables = self.lock()?;
        if tables.admins.values().any(|a| a.username == admin.username) {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        tables.admins.insert(admin.id, admin.clone());
        Ok(admin)
    }

    async fn find_admin(&self, id: Uuid) -> Result<Option<AdminRecord>, AppError> {
        Ok(self.lock()?.admins.get(&id).cloned())
    }

    async fn find_admin_by_username(&self, username: &str) -> Result<Option<AdminRecord>, AppError> {
        Ok(self
            .lock()?
            .admins
            .values()
            .find(|a| a.username == username)
            .cloned())
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn upsert_login(&self, student_id: Uuid, at: DateTime<Utc>) -> Result<HistoryEntry, AppError> {
        let mut tables = self.lock()?;
        if !tables.students.contains_key(&student_id) {
            return Err(AppError::NotFound(format!(
                "Student with ID \"{}\" not found",
                student_id
            )));
        }

        if let Some(entry) = tables.history.values_mut().find(|e| e.student_id == student_id) {
            entry.last_login = Some(at);
            entry.updated_at = at;
            return Ok(entry.clone());
        }

        let entry = HistoryEntry::first_login(student_id, at);
        tables.history.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn update_logout(
        &self,
        student_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<HistoryEntry>, AppError> {
        let mut tables = self.lock()?;
        Ok(tables
            .history
            .values_mut()
            .find(|e| e.student_id == student_id)
            .map(|entry| {
                entry.last_logout = Some(at);
                entry.updated_at = at;
                entry.clone()
            }))
    }

    async fn list_history(&self) -> Result<Vec<HistoryView>, AppError> {
        let tables = self.lock()?;
        let mut entries: Vec<HistoryEntry> = tables.history.values().cloned().collect();
        // newest login first, entries without a login last
        entries.sort_by(|a, b| b.last_login.cmp(&a.last_login));

        Ok(entries
            .into_iter()
            .map(|entry| {
                let student = tables.students.get(&entry.student_id).map(|s| StudentSummary {
                    id: s.id,
                    name: s.name.clone(),
                    nim: s.nim.clone(),
                });
                entry.into_view(student)
            })
            .collect())
    }

    async fn delete_history(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.lock()?.history.remove(&id).is_some())
    }

    async fn clear_history(&self) -> Result<u64, AppError> {
        let mut tables = self.lock()?;
        let count = tables.history.len() as u64;
        tables.history.clear();
        Ok(count)
    }
}
