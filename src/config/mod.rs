use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Longest dataset cache lifetime accepted, one year
pub const MAX_CACHE_TTL_MINUTES: u64 = 525_600;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub sources: SourcesConfig,
    pub cache: CacheConfig,
    pub query: QueryConfig,
    pub export: ExportConfig,
    #[cfg(feature = "api")]
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

/// Remote dataset endpoints on the open government data platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    pub api_base_url: String,
    pub api_key: String,
    pub rainfall_resource: String,
    pub crop_price_resource: String,
    pub msp_resource: String,
    /// Upper bound on records per request (`limit` query parameter)
    pub record_limit: usize,
    /// A rainfall page shorter than this ends pagination
    pub page_size: usize,
    /// No timeout when unset
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_minutes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    pub max_question_length: usize,
    pub msp_match_cutoff: f64,
    pub msp_max_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub default_format: String,
    pub output_directory: PathBuf,
}

#[cfg(feature = "api")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_enabled: bool,
    pub console_enabled: bool,
    pub max_files: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sources: SourcesConfig::default(),
            cache: CacheConfig::default(),
            query: QueryConfig::default(),
            export: ExportConfig::default(),
            #[cfg(feature = "api")]
            api: ApiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.data.gov.in/resource".to_string(),
            api_key: "579b464db66ec23bdd0000015941db76bcec4b074da1a1ec1cd8d90e".to_string(),
            rainfall_resource: "6c05cd1b-ed59-40c2-bc31-e314f39c6971".to_string(),
            crop_price_resource: "9ef84268-d588-465a-a308-a864a43d0070".to_string(),
            msp_resource: "14389871-c2f4-4348-b4ca-b55391d4ea0b".to_string(),
            record_limit: 10000,
            page_size: 1000,
            request_timeout_seconds: None,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_minutes: 60,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_question_length: 500,
            msp_match_cutoff: 0.6,
            msp_max_rows: 10,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_format: "csv".to_string(),
            output_directory: get_data_directory().join("exports"),
        }
    }
}

#[cfg(feature = "api")]
impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file_enabled: false,
            console_enabled: true,
            max_files: 5,
        }
    }
}

impl AppConfig {
    /// Load configuration from default locations
    pub async fn load() -> Result<Self> {
        let config_path = get_config_path();

        if config_path.exists() {
            return Self::load_from_file(&config_path).await;
        }

        info!("No configuration file found, using defaults");
        let mut config = Self::default();
        config.save().await?;

        ConfigOverrides::apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from specific file, then apply environment overrides
    pub async fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let mut config: AppConfig = toml::from_str(&content)?;

        ConfigOverrides::apply(&mut config);
        config.validate()?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Save configuration to default location
    pub async fn save(&self) -> Result<()> {
        let config_path = get_config_path();

        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = toml::to_string_pretty(self)?;
        tokio::fs::write(&config_path, content).await?;

        info!("Configuration saved to: {}", config_path.display());
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if url::Url::parse(&self.sources.api_base_url).is_err() {
            return Err(anyhow::anyhow!(
                "Sources api_base_url is not a valid URL: {}",
                self.sources.api_base_url
            ));
        }

        if self.sources.api_key.trim().is_empty() {
            return Err(anyhow::anyhow!("Sources api_key must not be empty"));
        }

        if self.sources.record_limit == 0 {
            return Err(anyhow::anyhow!("Sources record_limit must be > 0"));
        }

        if self.sources.page_size == 0 {
            return Err(anyhow::anyhow!("Sources page_size must be > 0"));
        }

        if self.sources.request_timeout_seconds == Some(0) {
            return Err(anyhow::anyhow!("Sources request_timeout_seconds must be > 0 when set"));
        }

        if self.cache.enabled && self.cache.ttl_minutes == 0 {
            return Err(anyhow::anyhow!("Cache ttl_minutes must be > 0"));
        }

        if self.cache.ttl_minutes > MAX_CACHE_TTL_MINUTES {
            return Err(anyhow::anyhow!(
                "Cache ttl_minutes must be at most {} (one year)",
                MAX_CACHE_TTL_MINUTES
            ));
        }

        if self.query.max_question_length == 0 {
            return Err(anyhow::anyhow!("Query max_question_length must be > 0"));
        }

        if !(0.0..=1.0).contains(&self.query.msp_match_cutoff) {
            return Err(anyhow::anyhow!("Query msp_match_cutoff must be between 0.0 and 1.0"));
        }

        if self.query.msp_max_rows == 0 {
            return Err(anyhow::anyhow!("Query msp_max_rows must be > 0"));
        }

        if !matches!(self.export.default_format.to_lowercase().as_str(), "csv" | "json") {
            return Err(anyhow::anyhow!(
                "Export default_format must be csv or json, got {}",
                self.export.default_format
            ));
        }

        #[cfg(feature = "api")]
        {
            if self.api.port == 0 {
                return Err(anyhow::anyhow!("API port must be > 0"));
            }
        }

        Ok(())
    }
}

/// Get the default data directory
pub fn get_data_directory() -> PathBuf {
    directories::ProjectDirs::from("in", "samarth", "samarth")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default().join("data"))
}

/// Get the configuration file path
fn get_config_path() -> PathBuf {
    directories::ProjectDirs::from("in", "samarth", "samarth")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default().join("config.toml"))
}

/// Environment-based configuration overrides
pub struct ConfigOverrides;

impl ConfigOverrides {
    /// Apply environment variable overrides to configuration
    pub fn apply(config: &mut AppConfig) {
        if let Ok(api_key) = std::env::var("SAMARTH_API_KEY") {
            config.sources.api_key = api_key;
        }

        if let Ok(base_url) = std::env::var("SAMARTH_API_BASE_URL") {
            config.sources.api_base_url = base_url;
        }

        if let Ok(timeout_str) = std::env::var("SAMARTH_REQUEST_TIMEOUT") {
            if let Ok(timeout) = timeout_str.parse::<u64>() {
                config.sources.request_timeout_seconds = Some(timeout);
            }
        }

        if let Ok(ttl_str) = std::env::var("SAMARTH_CACHE_TTL_MINUTES") {
            if let Ok(ttl) = ttl_str.parse::<u64>() {
                config.cache.ttl_minutes = ttl;
            }
        }

        if let Ok(enabled) = std::env::var("SAMARTH_CACHE_ENABLED") {
            config.cache.enabled = enabled.to_lowercase() == "true";
        }

        #[cfg(feature = "api")]
        {
            if let Ok(api_host) = std::env::var("SAMARTH_API_HOST") {
                config.api.host = api_host;
            }

            if let Ok(api_port_str) = std::env::var("SAMARTH_API_PORT") {
                if let Ok(api_port) = api_port_str.parse::<u16>() {
                    config.api.port = api_port;
                }
            }
        }

        if let Ok(log_level) = std::env::var("SAMARTH_LOG_LEVEL") {
            config.logging.level = log_level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sources.page_size, 1000);
        assert_eq!(config.query.msp_match_cutoff, 0.6);
        assert!(config.sources.request_timeout_seconds.is_none());
    }

    #[test]
    fn test_invalid_cutoff_rejected() {
        let mut config = AppConfig::default();
        config.query.msp_match_cutoff = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let mut config = AppConfig::default();
        config.sources.api_base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip_preserves_sources() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.sources.msp_resource, config.sources.msp_resource);
        assert_eq!(parsed.cache.ttl_minutes, 60);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = AppConfig::default();
        config.query.max_question_length = 42;
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(loaded.query.max_question_length, 42);
    }

    #[tokio::test]
    async fn test_load_from_file_applies_env_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, toml::to_string_pretty(&AppConfig::default()).unwrap()).unwrap();

        std::env::set_var("SAMARTH_REQUEST_TIMEOUT", "17");
        let loaded = AppConfig::load_from_file(&path).await;
        std::env::remove_var("SAMARTH_REQUEST_TIMEOUT");

        assert_eq!(loaded.unwrap().sources.request_timeout_seconds, Some(17));
    }

    #[test]
    fn test_cache_ttl_upper_bound() {
        let mut config = AppConfig::default();
        config.cache.ttl_minutes = MAX_CACHE_TTL_MINUTES;
        assert!(config.validate().is_ok());

        config.cache.ttl_minutes = 1_000_000_000;
        assert!(config.validate().is_err());
    }
}
