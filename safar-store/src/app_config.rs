use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub uploads: UploadConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Origins allowed by CORS, e.g. `http://localhost`; any explicit port is accepted.
    #[serde(default = "default_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_origins() -> Vec<String> {
    vec!["http://localhost".to_string(), "http://127.0.0.1".to_string()]
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
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
}

fn default_backend() -> StorageBackend { StorageBackend::Postgres }
fn default_max_connections() -> u32 { 5 }
fn default_acquire_timeout() -> u64 { 3 }

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Shared secret for the dashboard password gate.
    pub dashboard_password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    pub dir: PathBuf,
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

fn default_max_bytes() -> usize { 10 * 1024 * 1024 }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Optional per-environment overrides
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `SAFAR__AUTH__DASHBOARD_PASSWORD=secret`
            .add_source(config::Environment::with_prefix("SAFAR").separator("__"))
            .build()?;

        let cfg: Config = s.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.auth.dashboard_password.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "auth.dashboard_password must be set (SAFAR__AUTH__DASHBOARD_PASSWORD)".into(),
            ));
        }
        if self.database.backend == StorageBackend::Postgres && self.database.url.trim().is_empty() {
            return Err(config::ConfigError::Message("database.url must be set".into()));
        }
        Ok(())
    }
}
