use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    pub expiration_minutes: i64,
    /// Re-check the account's active flag on login and on every
    /// authenticated request. Off by default: tokens of deactivated
    /// accounts stay valid until they expire.
    #[serde(default)]
    pub reject_inactive_subjects: bool,
}

fn default_backend() -> StorageBackend {
    StorageBackend::Postgres
}

fn default_max_connections() -> u32 {
    5
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

impl DatabaseConfig {
    /// Connection URL with the password masked, for logging.
    pub fn redacted_url(&self) -> String {
        let Some(scheme_end) = self.url.find("://") else {
            return self.url.clone();
        };
        let authority_start = scheme_end + 3;
        let rest = &self.url[authority_start..];

        match (rest.find('@'), rest.find(':')) {
            (Some(at), Some(colon)) if colon < at => format!(
                "{}{}:***{}",
                &self.url[..authority_start],
                &rest[..colon],
                &rest[at..]
            ),
            _ => self.url.clone(),
        }
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__EXPIRATION_MINUTES=60 overrides jwt.expiration_minutes
            .add_source(Environment::default().separator("__"))
            .build()?;

        configuration.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn from_toml(toml: &str) -> Result<Config, ConfigError> {
        ConfigBuilder::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn test_default_file_parses() {
        let config = from_toml(include_str!("../../config/default.toml"))
            .expect("default config should deserialize");

        assert_eq!(config.database.backend, StorageBackend::Postgres);
        assert_eq!(config.jwt.algorithm, "HS256");
        assert_eq!(config.jwt.expiration_minutes, 30);
        assert!(!config.jwt.reject_inactive_subjects);
    }

    #[test]
    fn test_optional_fields_take_defaults() {
        let config = from_toml(
            r#"
            [database]
            url = "postgresql://localhost/nfse"

            [server]
            http_port = 9000

            [jwt]
            secret = "s"
            expiration_minutes = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.database.backend, StorageBackend::Postgres);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.jwt.algorithm, "HS256");
        assert!(!config.jwt.reject_inactive_subjects);
    }

    #[test]
    fn test_memory_backend() {
        let config = from_toml(
            r#"
            [database]
            backend = "memory"
            url = ""

            [server]
            http_port = 9000

            [jwt]
            secret = "s"
            expiration_minutes = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.database.backend, StorageBackend::Memory);
    }

    #[test]
    fn test_redacted_url() {
        let database = DatabaseConfig {
            backend: StorageBackend::Postgres,
            url: "postgresql://nfse:hunter2@db:5432/nfse".to_string(),
            max_connections: 5,
        };
        assert_eq!(database.redacted_url(), "postgresql://nfse:***@db:5432/nfse");

        let no_password = DatabaseConfig {
            url: "postgresql://db:5432/nfse".to_string(),
            ..database
        };
        assert_eq!(no_password.redacted_url(), "postgresql://db:5432/nfse");
    }
}
