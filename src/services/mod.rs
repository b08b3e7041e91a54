/// Business logic. Each service is built once with its collaborators passed
/// in, then shared with the HTTP layer through `web::Data`.

use std::sync::Arc;

pub mod admins;
pub mod auth;
pub mod history;
pub mod students;

pub use admins::{AdminService, SeedOutcome};
pub use auth::AuthService;
pub use history::HistoryLedger;
pub use students::StudentService;

use crate::auth::PasswordHasher;
use crate::configuration::JwtSettings;
use crate::store::{AdminStore, HistoryStore, StudentStore};

/// Every service the HTTP layer needs, composed over one backing store.
#[derive(Clone)]
pub struct AppServices {
    pub auth: AuthService,
    pub students: StudentService,
    pub admins: AdminService,
    pub history: HistoryLedger,
}

impl AppServices {
    pub fn new<S>(store: S, hasher: PasswordHasher, jwt: JwtSettings) -> Self
    where
        S: StudentStore + AdminStore + HistoryStore + 'static,
    {
        let store = Arc::new(store);
        let students = StudentService::new(store.clone(), hasher.clone());
        let admins = AdminService::new(store.clone(), hasher.clone());
        let history = HistoryLedger::new(store);
        let auth = AuthService::new(
            students.clone(),
            admins.clone(),
            history.clone(),
            hasher,
            jwt,
        );

        Self {
            auth,
            students,
            admins,
            history,
        }
    }
}
