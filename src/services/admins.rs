/// Admin accounts and the startup seed.

use std::sync::Arc;

use uuid::Uuid;

use crate::auth::PasswordHasher;
use crate::domain::{AdminProfile, AdminRecord, NewAdmin};
use crate::error::AppError;
use crate::store::AdminStore;

#[derive(Clone)]
pub struct AdminService {
    store: Arc<dyn AdminStore>,
    hasher: PasswordHasher,
}

/// What `seed_initial_admin` did
#[derive(Debug, PartialEq)]
pub enum SeedOutcome {
    Created(AdminProfile),
    AlreadyExists,
}

impl AdminService {
    pub fn new(store: Arc<dyn AdminStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    /// # Errors
    /// `Conflict` when the username is taken
    pub async fn create(&self, new: NewAdmin) -> Result<AdminProfile, AppError> {
        if self.store.find_admin_by_username(&new.username).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Username \"{}\" already exists",
                new.username
            )));
        }

        let password_hash = self.hasher.hash(&new.password).await?;
        let created = self
            .store
            .insert_admin(AdminRecord::from_new(new.username, password_hash))
            .await?;

        tracing::info!(admin_id = %created.id, "Admin created");
        Ok(created.into_profile())
    }

    /// Full record including the password hash. Not for responses.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<AdminRecord>, AppError> {
        self.store.find_admin_by_username(username).await
    }

    pub async fn find_one_by_id(&self, id: Uuid) -> Result<Option<AdminProfile>, AppError> {
        Ok(self.store.find_admin(id).await?.map(AdminRecord::into_profile))
    }

    /// Creates the configured admin unless that username already exists.
    pub async fn seed_initial_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<SeedOutcome, AppError> {
        if self.find_by_username(username).await?.is_some() {
            tracing::info!(username = %username, "Admin already exists, seeding skipped");
            return Ok(SeedOutcome::AlreadyExists);
        }

        let created = self
            .create(NewAdmin {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await;

        match created {
            Ok(profile) => {
                tracing::info!(username = %username, "Default admin created");
                Ok(SeedOutcome::Created(profile))
            }
            // another instance seeded it first
            Err(e) if e.is_conflict() => Ok(SeedOutcome::AlreadyExists),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MIN_BCRYPT_COST;
    use crate::store::MemoryStore;

    fn service() -> AdminService {
        let hasher = PasswordHasher::new(MIN_BCRYPT_COST).unwrap();
        AdminService::new(Arc::new(MemoryStore::new()), hasher)
    }

    fn new_admin(username: &str) -> NewAdmin {
        NewAdmin {
            username: username.to_string(),
            password: "adminpass1".to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let service = service();
        service.create(new_admin("root")).await.unwrap();

        assert!(service.create(new_admin("root")).await.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn find_one_by_id_hides_the_hash() {
        let service = service();
        let created = service.create(new_admin("root")).await.unwrap();

        let found = service.find_one_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found, created);
        assert!(service.find_one_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let service = service();

        let first = service.seed_initial_admin("root", "adminpass1").await.unwrap();
        assert!(matches!(first, SeedOutcome::Created(_)));

        let second = service.seed_initial_admin("root", "adminpass1").await.unwrap();
        assert_eq!(second, SeedOutcome::AlreadyExists);
    }

    #[tokio::test]
    async fn seeding_with_a_weak_password_fails() {
        let service = service();
        assert!(service.seed_initial_admin("root", "short").await.is_err());
        assert!(service.find_by_username("root").await.unwrap().is_none());
    }
}
