use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Effective configuration after layering file and environment values.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub auto_create_schema: bool,
    pub imagga_api_url: String,
    pub imagga_api_key: String,
    pub imagga_api_secret: String,
    pub classifier_timeout_secs: u64,
    /// Provider labels scoring below this confidence (0-100) are not stored.
    pub min_confidence: f32,
    pub log_dir: String,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    listen_addr: Option<String>,
    database_url: Option<String>,
    db_max_connections: Option<u32>,
    auto_create_schema: Option<bool>,
    imagga_api_url: Option<String>,
    imagga_api_key: Option<String>,
    imagga_api_secret: Option<String>,
    classifier_timeout_secs: Option<u64>,
    min_confidence: Option<f32>,
    log_dir: Option<String>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_auto_create_schema() -> bool {
    true
}

fn default_imagga_api_url() -> String {
    "https://api.imagga.com/v2".to_string()
}

fn default_classifier_timeout_secs() -> u64 {
    30
}

fn default_min_confidence() -> f32 {
    30.0
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl ServerConfig {
    /// Loads the configuration from an optional TOML file, then lets environment variables
    /// (and a `.env` file) override individual values.
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config = match config_path {
            Some(path_str) if Path::new(path_str).exists() => read_file(Path::new(path_str))?,
            _ => PartialServerConfig::default(),
        };

        // 2. Load from environment variables
        let env_config: PartialServerConfig = envy::from_env::<PartialServerConfig>()
            .map_err(|e| format!("Failed to load config from environment: {e}"))?;

        // 3. Merge: environment overrides file
        Self::merge(env_config, file_config)
    }

    fn merge(env_config: PartialServerConfig, file_config: PartialServerConfig) -> Result<Self, String> {
        Ok(ServerConfig {
            listen_addr: env_config.listen_addr.or(file_config.listen_addr)
                .unwrap_or_else(default_listen_addr),
            database_url: env_config.database_url.or(file_config.database_url)
                .ok_or("DATABASE_URL is required")?,
            db_max_connections: env_config.db_max_connections.or(file_config.db_max_connections)
                .unwrap_or_else(default_db_max_connections),
            auto_create_schema: env_config.auto_create_schema.or(file_config.auto_create_schema)
                .unwrap_or_else(default_auto_create_schema),
            imagga_api_url: env_config.imagga_api_url.or(file_config.imagga_api_url)
                .unwrap_or_else(default_imagga_api_url),
            imagga_api_key: env_config.imagga_api_key.or(file_config.imagga_api_key)
                .ok_or("IMAGGA_API_KEY is required")?,
            imagga_api_secret: env_config.imagga_api_secret.or(file_config.imagga_api_secret)
                .ok_or("IMAGGA_API_SECRET is required")?,
            classifier_timeout_secs: env_config.classifier_timeout_secs.or(file_config.classifier_timeout_secs)
                .unwrap_or_else(default_classifier_timeout_secs),
            min_confidence: env_config.min_confidence.or(file_config.min_confidence)
                .unwrap_or_else(default_min_confidence),
            log_dir: env_config.log_dir.or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
        })
    }

    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_secs(self.classifier_timeout_secs)
    }
}

fn read_file(path: &Path) -> Result<PartialServerConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
    toml::from_str(&contents)
        .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))
}
