use rocket::figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_PATH: &str = "/api";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub session: SessionConfig,
    pub password: PasswordConfig,
    pub cors: CorsConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: u64,
    pub busy_timeout: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub address: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    pub ttl_hours: i64,
    pub cleanup_interval_seconds: u64,
    /// Marks the session cookie `Secure`; enable when served over HTTPS.
    pub secure_cookie: bool,
}

/// Argon2id cost parameters. Changing them only affects newly hashed
/// passwords; stored PHC strings carry their own parameters.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub base_path: String,
    pub enable_swagger: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://tasks.db".to_string(),
            max_connections: 8,
            min_connections: 1,
            acquire_timeout: 5,
            busy_timeout: 5,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            address: "127.0.0.1".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_hours: 24,
            cleanup_interval_seconds: 300,
            secure_cookie: false,
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allow_credentials: true,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_API_BASE_PATH.to_string(),
            enable_swagger: true,
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.ttl_hours)
    }
}

impl Config {
    /// Load configuration from multiple sources in priority order:
    /// 1. TaskTracker.toml (base configuration file)
    /// 2. Environment variables (prefixed with TASKS_)
    /// 3. DATABASE_URL environment variable
    pub fn load() -> Result<Self, figment::Error> {
        let defaults = toml::to_string(&Config::default()).map_err(|e| figment::Error::from(e.to_string()))?;

        let figment = Figment::new()
            .merge(Toml::string(&defaults))
            .merge(Toml::file("TaskTracker.toml"))
            // Nested keys are separated by a double underscore, e.g. TASKS_SESSION__TTL_HOURS
            .merge(Env::prefixed("TASKS_").split("__"))
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.url".into()));

        figment.extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_figment() {
        figment::Jail::expect_with(|_jail| {
            let config = Config::load()?;
            assert_eq!(config.api.base_path, DEFAULT_API_BASE_PATH);
            assert_eq!(config.session.ttl_hours, 24);
            assert_eq!(config.session.ttl(), chrono::Duration::hours(24));
            Ok(())
        });
    }

    #[test]
    fn env_overrides_nested_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("TASKS_SESSION__TTL_HOURS", "2");
            jail.set_env("TASKS_LOGGING__LEVEL", "debug");
            jail.set_env("DATABASE_URL", "sqlite::memory:");

            let config = Config::load()?;
            assert_eq!(config.session.ttl_hours, 2);
            assert_eq!(config.logging.level, "debug");
            assert_eq!(config.database.url, "sqlite::memory:");
            Ok(())
        });
    }

    #[test]
    fn toml_file_is_layered_over_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "TaskTracker.toml",
                r#"
                [server]
                port = 8080
                address = "0.0.0.0"
                "#,
            )?;

            let config = Config::load()?;
            assert_eq!(config.server.port, 8080);
            assert_eq!(config.server.address, "0.0.0.0");
            assert_eq!(config.database.max_connections, DatabaseConfig::default().max_connections);
            Ok(())
        });
    }
}
