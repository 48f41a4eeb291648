use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Settings of the remote catalog API.
#[derive(Clone, Debug, Deserialize)]
pub struct CatalogApiConfig {
    /// Base URL without a trailing `/products`, e.g. `https://dummyjson.com`.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Forwarded as `?limit=` on the list request; the API default applies when unset.
    pub limit: Option<u32>,
}

/// Configuration options of the gallery server.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub database_url: String,
    pub templates_dir: String,
    pub assets_dir: String,
    /// Cookie signing key for flash messages, at least 64 bytes.
    pub secret: Option<String>,
    pub catalog_api: CatalogApiConfig,
}

impl ServerConfig {
    /// Loads configuration from `config/` and `APP__*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Layers `{dir}/default.yaml`, `{dir}/{APP_ENV}.yaml` and the environment
    /// on top of built-in defaults.
    pub fn load_from(dir: &str) -> Result<Self, ConfigError> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());

        Config::builder()
            .set_default("address", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("database_url", "app.db")?
            .set_default("templates_dir", "templates")?
            .set_default("assets_dir", "assets")?
            .set_default("catalog_api.base_url", "https://dummyjson.com")?
            .set_default("catalog_api.timeout_secs", 30)?
            .add_source(File::with_name(&format!("{dir}/default")).required(false))
            .add_source(File::with_name(&format!("{dir}/{app_env}")).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()
    }
}
