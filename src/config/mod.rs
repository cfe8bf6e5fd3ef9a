use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory served under `/static`.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_static_dir() -> String {
    "static".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Signing secret for session and flash cookies. Empty means "generate one at startup".
    #[serde(default)]
    pub session_secret: Option<String>,
    pub session_duration_hours: i64,
    #[serde(default)]
    pub secure_cookies: bool,
}

/// Credentials for the admin account seeded into an empty `admins` table.
#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
    pub full_name: String,
}

pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
            full_name: "Administrator".to_string(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("database.url", "sqlite://gymdesk.db")?
            .set_default("database.max_connections", 5)?
            .set_default("auth.session_duration_hours", 12)?
            .set_default("auth.secure_cookies", false)?
            .set_default("admin.username", "admin")?
            .set_default("admin.password", DEFAULT_ADMIN_PASSWORD)?
            .set_default("admin.full_name", "Administrator")?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with GYMDESK__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("GYMDESK").separator("__"))

            .build()?;

        config.try_deserialize()
    }

    /// The configured session secret, if one was actually provided.
    pub fn session_secret(&self) -> Option<&str> {
        self.auth
            .session_secret
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                static_dir: default_static_dir(),
            },
            database: DatabaseConfig {
                url: "sqlite://gymdesk.db".to_string(),
                max_connections: 5,
            },
            auth: AuthConfig {
                session_secret: None,
                session_duration_hours: 12,
                secure_cookies: false,
            },
            admin: AdminConfig::default(),
        }
    }
}
