/// Creates the configured admin account and exits.
///
/// Reads the same configuration as the server (`configuration.yaml` and
/// `APP_*` variables). Credentials come from `admin_seed.username` and
/// `admin_seed.password`, e.g. `APP_ADMIN_SEED__PASSWORD`.

use sqlx::postgres::PgPoolOptions;
use std::process::ExitCode;
use std::sync::Arc;
use student_records::auth::PasswordHasher;
use student_records::configuration::get_configuration;
use student_records::services::{AdminService, SeedOutcome};
use student_records::store::PgStore;
use student_records::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> ExitCode {
    init_telemetry("info");

    let configuration = match get_configuration() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let Some((username, password)) = configuration.admin_seed.credentials() else {
        tracing::error!("admin_seed.username and admin_seed.password must both be set");
        return ExitCode::FAILURE;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(1)
        .connect(&configuration.database.connection_string())
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to connect to database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
        tracing::error!("Failed to run migrations: {}", e);
        return ExitCode::FAILURE;
    }

    let hasher = match PasswordHasher::new(configuration.password.bcrypt_cost) {
        Ok(hasher) => hasher,
        Err(e) => {
            tracing::error!("Invalid password settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let admins = AdminService::new(Arc::new(PgStore::new(pool)), hasher);

    match admins.seed_initial_admin(username, password).await {
        Ok(SeedOutcome::Created(admin)) => {
            tracing::info!(admin_id = %admin.id, username = %admin.username, "Admin created");
            ExitCode::SUCCESS
        }
        Ok(SeedOutcome::AlreadyExists) => {
            tracing::info!(username = %username, "Admin already exists");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Failed to seed admin: {}", e);
            ExitCode::FAILURE
        }
    }
}
