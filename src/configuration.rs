use config::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    #[serde(default)]
    pub password: PasswordSettings,
    #[serde(default)]
    pub admin_seed: AdminSeedSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS, e.g. `http://localhost:5173`
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
    /// Full connection string; wins over the individual fields when set
    #[serde(default)]
    pub url: Option<String>,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// JWT signing settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub expiry_seconds: i64, // e.g. 3600 for one hour
    pub issuer: String,
}

#[derive(serde::Deserialize, Clone)]
pub struct PasswordSettings {
    pub bcrypt_cost: u32,
}

impl Default for PasswordSettings {
    fn default() -> Self {
        Self { bcrypt_cost: 10 }
    }
}

/// Admin account created on startup when `enabled` is true
#[derive(serde::Deserialize, Clone, Default)]
pub struct AdminSeedSettings {
    #[serde(default)]
    pub enabled: bool,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl AdminSeedSettings {
    /// Both credentials, or `None` if either one is missing or blank.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(u), Some(p)) if !u.trim().is_empty() && !p.is_empty() => Some((u, p)),
            _ => None,
        }
    }
}

/// Reads `configuration.yaml` (optional) and then `APP_*` environment
/// variables, e.g. `APP_JWT__SECRET` or
/// `APP_APPLICATION__CORS_ORIGINS=http://a.test,http://b.test`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("application.cors_origins")
                .try_parsing(true),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}
