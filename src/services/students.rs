/// Student records: create, read, update, delete.
///
/// Every outward result is a `StudentProfile`; only `find_by_nim` hands out
/// the full record, for credential checks.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::auth::PasswordHasher;
use crate::domain::{NewStudent, StudentChanges, StudentProfile, StudentRecord};
use crate::error::AppError;
use crate::store::StudentStore;

#[derive(Clone)]
pub struct StudentService {
    store: Arc<dyn StudentStore>,
    hasher: PasswordHasher,
}

#[derive(Debug, Serialize)]
pub struct StudentDeleted {
    pub message: String,
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Student with ID \"{}\" not found", id))
}

impl StudentService {
    pub fn new(store: Arc<dyn StudentStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    /// # Errors
    /// `Conflict` when the NIM is already registered
    pub async fn create(&self, new: NewStudent) -> Result<StudentProfile, AppError> {
        if self.store.find_student_by_nim(&new.nim).await?.is_some() {
            return Err(AppError::Conflict("NIM already registered".to_string()));
        }

        let password_hash = self.hasher.hash(&new.password).await?;
        // the store's unique constraint still guards against a concurrent insert
        let created = self
            .store
            .insert_student(StudentRecord::from_new(new, password_hash))
            .await?;

        tracing::info!(student_id = %created.id, "Student created");
        Ok(created.into_profile())
    }

    pub async fn find_all(&self) -> Result<Vec<StudentProfile>, AppError> {
        Ok(self
            .store
            .list_students()
            .await?
            .into_iter()
            .map(StudentRecord::into_profile)
            .collect())
    }

    pub async fn find_one(&self, id: Uuid) -> Result<Option<StudentProfile>, AppError> {
        Ok(self.store.find_student(id).await?.map(StudentRecord::into_profile))
    }

    /// Full record including the password hash. Not for responses.
    pub async fn find_by_nim(&self, nim: &str) -> Result<Option<StudentRecord>, AppError> {
        self.store.find_student_by_nim(nim).await
    }

    /// # Errors
    /// - `NotFound` when `id` does not exist
    /// - `Conflict` when the NIM is changed to one another student holds
    pub async fn update(&self, id: Uuid, changes: StudentChanges) -> Result<StudentProfile, AppError> {
        let mut student = self.store.find_student(id).await?.ok_or_else(|| not_found(id))?;

        if let Some(nim) = changes.nim.as_deref() {
            if nim != student.nim {
                if let Some(existing) = self.store.find_student_by_nim(nim).await? {
                    if existing.id != id {
                        return Err(AppError::Conflict(format!(
                            "NIM \"{}\" already exists for another student.",
                            nim
                        )));
                    }
                }
            }
        }

        let password_hash = match changes.password.as_deref() {
            Some(password) => Some(self.hasher.hash(password).await?),
            None => None,
        };
        changes.apply(&mut student, password_hash);

        let updated = self
            .store
            .update_student(student)
            .await?
            .ok_or_else(|| not_found(id))?;

        tracing::info!(student_id = %id, "Student updated");
        Ok(updated.into_profile())
    }

    /// # Errors
    /// `NotFound` when `id` does not exist
    pub async fn remove(&self, id: Uuid) -> Result<StudentDeleted, AppError> {
        if !self.store.delete_student(id).await? {
            return Err(not_found(id));
        }

        tracing::info!(student_id = %id, "Student deleted");
        Ok(StudentDeleted {
            message: format!("Student with ID \"{}\" successfully deleted", id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{verify_password, MIN_BCRYPT_COST};
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn service() -> (StudentService, MemoryStore) {
        let store = MemoryStore::new();
        let hasher = PasswordHasher::new(MIN_BCRYPT_COST).unwrap();
        (StudentService::new(Arc::new(store.clone()), hasher), store)
    }

    fn new_student(nim: &str) -> NewStudent {
        NewStudent {
            nim: nim.to_string(),
            name: "A".to_string(),
            password: "password1".to_string(),
            dob: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            phone: None,
            address: None,
            hobby: None,
        }
    }

    #[tokio::test]
    async fn create_hashes_the_password() {
        let (service, _) = service();
        let created = service.create(new_student("12345678")).await.unwrap();

        let record = service.find_by_nim("12345678").await.unwrap().unwrap();
        assert_eq!(record.id, created.id);
        assert_ne!(record.password_hash, "password1");
        assert!(verify_password("password1", &record.password_hash).unwrap());
    }

    #[tokio::test]
    async fn create_rejects_duplicate_nim() {
        let (service, _) = service();
        service.create(new_student("12345678")).await.unwrap();

        let err = service.create(new_student("12345678")).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn update_to_taken_nim_conflicts_and_keeps_original() {
        let (service, _) = service();
        let a = service.create(new_student("11111111")).await.unwrap();
        service.create(new_student("22222222")).await.unwrap();

        let err = service
            .update(
                a.id,
                StudentChanges {
                    nim: Some("22222222".to_string()),
                    name: Some("Changed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let unchanged = service.find_one(a.id).await.unwrap().unwrap();
        assert_eq!(unchanged.nim, "11111111");
        assert_eq!(unchanged.name, "A");
    }

    #[tokio::test]
    async fn update_keeps_password_unless_supplied() {
        let (service, _) = service();
        let a = service.create(new_student("11111111")).await.unwrap();
        let before = service.find_by_nim("11111111").await.unwrap().unwrap();

        service
            .update(
                a.id,
                StudentChanges {
                    hobby: Some(Some("chess".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let after = service.find_by_nim("11111111").await.unwrap().unwrap();
        assert_eq!(before.password_hash, after.password_hash);
        assert_eq!(after.hobby.as_deref(), Some("chess"));

        service
            .update(
                a.id,
                StudentChanges {
                    password: Some("password2".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let rehashed = service.find_by_nim("11111111").await.unwrap().unwrap();
        assert!(verify_password("password2", &rehashed.password_hash).unwrap());
    }

    #[tokio::test]
    async fn update_with_same_nim_is_not_a_conflict() {
        let (service, _) = service();
        let a = service.create(new_student("11111111")).await.unwrap();

        let updated = service
            .update(
                a.id,
                StudentChanges {
                    nim: Some("11111111".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.nim, "11111111");
    }

    #[tokio::test]
    async fn update_missing_student_is_not_found() {
        let (service, _) = service();
        let err = service
            .update(Uuid::new_v4(), StudentChanges::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_twice_is_not_found() {
        let (service, _) = service();
        let a = service.create(new_student("11111111")).await.unwrap();

        service.remove(a.id).await.unwrap();
        assert!(service.remove(a.id).await.unwrap_err().is_not_found());
        assert!(service.find_one(a.id).await.unwrap().is_none());
    }
}
