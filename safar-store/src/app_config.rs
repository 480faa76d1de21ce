use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub cache: CacheConfig,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

/// Stale-time windows for the read-side cache, per payload shape.
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// "memory" or "redis".
    pub driver: String,
    #[serde(default = "default_list_ttl")]
    pub list_ttl_seconds: u64,
    #[serde(default = "default_detail_ttl")]
    pub detail_ttl_seconds: u64,
    #[serde(default = "default_report_ttl")]
    pub report_ttl_seconds: u64,
}

fn default_list_ttl() -> u64 {
    30
}

fn default_detail_ttl() -> u64 {
    300
}

fn default_report_ttl() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
    pub admin_name: String,
    pub admin_email: String,
    pub admin_password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit")]
    pub limit: i64,
    #[serde(default = "default_rate_window")]
    pub window_seconds: i64,
}

fn default_rate_limit() -> i64 {
    100
}

fn default_rate_window() -> i64 {
    60
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Environment overlay, e.g. config/production.toml
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Machine-local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // SAFAR__SERVER__PORT=9000 style overrides
            .add_source(config::Environment::with_prefix("SAFAR").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
