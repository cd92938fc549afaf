use config::{Config as ConfigLoader, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub mongo: MongoConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Hex-encoded 32-byte Ed25519 seed. When absent a random key is
    /// generated at startup, so issued tokens do not survive a restart.
    pub signing_key: Option<String>,
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: u64,
}

fn default_token_ttl_days() -> u64 {
    30
}

pub fn load_config() -> Config {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());

    let s = ConfigLoader::builder()
        // Load the config file when present
        .add_source(File::with_name(&config_path).required(false))
        // Environment overrides, e.g. USER_API_MONGO__HOST replaces [mongo] host
        .add_source(Environment::with_prefix("USER_API").separator("__"))
        .build()
        .unwrap_or_else(|e| panic!("Failed to build configuration: {}", e));

    s.try_deserialize()
        .unwrap_or_else(|e| panic!("Failed to deserialize configuration: {}", e))
}
