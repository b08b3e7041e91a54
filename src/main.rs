use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use student_records::auth::PasswordHasher;
use student_records::configuration::get_configuration;
use student_records::services::{AppServices, SeedOutcome};
use student_records::startup::run;
use student_records::store::PgStore;
use student_records::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // 구조화된 로깅 초기화
    init_telemetry("info");

    tracing::info!("Starting application");

    // 설정 로드
    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    // 데이터베이스 연결 풀 생성
    let connection_string = configuration.database.connection_string();
    tracing::info!("Attempting to connect to database");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&connection_string)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Database connection error",
            )
        })?;

    tracing::info!("Database connection pool created successfully");

    // 마이그레이션 실행
    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        tracing::error!("Failed to run migrations: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, "Migration error")
    })?;

    let hasher = PasswordHasher::new(configuration.password.bcrypt_cost).map_err(|e| {
        tracing::error!("Invalid password settings: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Configuration error")
    })?;

    let services = AppServices::new(PgStore::new(pool), hasher, configuration.jwt.clone());

    // 기본 관리자 계정 생성 (실패해도 서버는 계속 실행)
    if configuration.admin_seed.enabled {
        match configuration.admin_seed.credentials() {
            Some((username, password)) => {
                match services.admins.seed_initial_admin(username, password).await {
                    Ok(SeedOutcome::Created(admin)) => {
                        tracing::info!(admin_id = %admin.id, "Seeded initial admin")
                    }
                    Ok(SeedOutcome::AlreadyExists) => {}
                    Err(e) => tracing::error!("Failed to seed initial admin: {}", e),
                }
            }
            None => tracing::warn!("Admin seeding enabled but credentials are not configured"),
        }
    }

    // 서버 주소 설정
    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    tracing::info!("Binding server to address: {}", address);

    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    // 서버 실행
    let server = run(listener, services, configuration.application.cors_origins)?;
    tracing::info!("Server started successfully");

    server.await
}
