use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 구조화된 로깅을 초기화합니다.
/// JSON 형식의 로그를 출력하며, RUST_LOG 환경 변수로 로그 레벨을 제어합니다.
/// RUST_LOG가 없으면 `default_filter`를 사용합니다.
///
/// `log` 크레이트의 레코드(LoggerMiddleware, actix Logger)도 같은 구독자로 전달됩니다.
/// 두 번째 호출은 아무것도 하지 않고 `false`를 반환합니다.
pub fn init_telemetry(default_filter: &str) -> bool {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .json();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(formatting_layer)
        .try_init()
        .is_ok()
}
