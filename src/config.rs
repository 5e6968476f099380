use std::{env, net::IpAddr, path::PathBuf, str::FromStr};

use dotenvy::dotenv;
use log::{debug, info, warn};
use serde::Deserialize;

pub use crate::errors::ConfigError;
use crate::utils::id_generator::{DEFAULT_CODE_LENGTH, DEFAULT_MAX_ATTEMPTS};
use crate::validations::{SHORTCODE_MAX_LEN, SHORTCODE_MIN_LEN};

// Server-specific configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub workers: usize,
}

// Application-specific configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub name: String,
    pub version: String,
    pub environment: Environment,
    pub log_level: String,
    /// Origin used to build short URLs; derived from the request when unset
    pub public_base_url: Option<String>,
}

// Environment enum for different deployment environments
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Testing,
    Production,
}

// Implement FromStr trait for Environment enum to enable parsing from string
impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!(
                "Invalid environment: {}. Must be one of: development, testing, production",
                s
            )),
        }
    }
}

/// A storage tier, in the order it is consulted
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageTier {
    /// JSON files in the data directory, survive restarts
    File,
    /// Process memory, lost on restart
    Memory,
}

impl FromStr for StorageTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" | "durable" | "local" => Ok(StorageTier::File),
            "memory" | "session" => Ok(StorageTier::Memory),
            _ => Err(format!(
                "Invalid storage tier: {}. Must be one of: file, memory",
                s
            )),
        }
    }
}

/// Comma-separated, ordered list of storage tiers
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StorageTiers(pub Vec<StorageTier>);

impl FromStr for StorageTiers {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tiers = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(StorageTier::from_str)
            .collect::<Result<Vec<_>, _>>()?;

        if tiers.is_empty() {
            return Err("At least one storage tier is required".to_string());
        }

        Ok(StorageTiers(tiers))
    }
}

// Storage configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub tiers: StorageTiers,
}

// Link creation rules
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LinkConfig {
    pub default_validity_minutes: u32,
    pub code_length: usize,
    pub max_generation_attempts: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            default_validity_minutes: 30,
            code_length: DEFAULT_CODE_LENGTH,
            max_generation_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

// Redirect behaviour
#[derive(Debug, Deserialize, Clone)]
pub struct RedirectConfig {
    /// Pause between a successful resolution and the redirect
    pub delay_ms: u64,
}

// Remote log sink
#[derive(Debug, Deserialize, Clone)]
pub struct LogSinkConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub token: Option<String>,
    pub stack: String,
    pub timeout_seconds: u64,
}

// Result type for configuration functions
type ConfigResult<T> = Result<T, ConfigError>;

// Config struct that matches our environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub storage: StorageConfig,
    pub links: LinkConfig,
    pub redirect: RedirectConfig,
    pub log_sink: LogSinkConfig,
}

impl Config {
    // Load configuration from environment variables
    pub fn load() -> ConfigResult<Self> {
        // Load .env file if it exists
        match dotenv() {
            Ok(_) => debug!(".env file loaded successfully"),
            Err(e) => warn!("Could not load .env file: {}", e),
        }

        // Create the server config
        let server = ServerConfig {
            host: get_env_or_default("SERVER_HOST", "127.0.0.1")?,
            port: get_env_or_default("SERVER_PORT", "8000")?,
            workers: get_env_or_default("SERVER_WORKERS", "4")?,
        };

        // Get version from Cargo.toml or environment
        let version = option_env!("CARGO_PKG_VERSION")
            .unwrap_or("0.1.0")
            .to_string();

        // Create the app config
        let app = AppConfig {
            name: get_env_or_default("APP_NAME", "quicklink")?,
            version: env::var("APP_VERSION").unwrap_or(version),
            environment: get_env_or_default("APP_ENVIRONMENT", "development")?,
            log_level: get_env_or_default("RUST_LOG", "info")?,
            public_base_url: get_env_optional("PUBLIC_BASE_URL")?,
        };

        let storage = StorageConfig {
            data_dir: get_env_or_default("STORAGE_DATA_DIR", "./data")?,
            tiers: get_env_or_default("STORAGE_TIERS", "file,memory")?,
        };

        let links = LinkConfig {
            default_validity_minutes: get_env_or_default("LINK_DEFAULT_VALIDITY_MINUTES", "30")?,
            code_length: get_env_or_default("LINK_CODE_LENGTH", "6")?,
            max_generation_attempts: get_env_or_default("LINK_MAX_GENERATION_ATTEMPTS", "10")?,
        };

        let redirect = RedirectConfig {
            delay_ms: get_env_or_default("REDIRECT_DELAY_MS", "0")?,
        };

        let log_sink = LogSinkConfig {
            enabled: get_env_or_default("LOG_SINK_ENABLED", "false")?,
            endpoint: get_env_or_default("LOG_SINK_ENDPOINT", "")?,
            token: get_env_optional("LOG_SINK_TOKEN")?,
            stack: get_env_or_default("LOG_SINK_STACK", "backend")?,
            timeout_seconds: get_env_or_default("LOG_SINK_TIMEOUT_SECONDS", "5")?,
        };

        let config = Config {
            server,
            app,
            storage,
            links,
            redirect,
            log_sink,
        };
        config.check()?;

        info!("Configuration loaded successfully");
        debug!("Loaded config: {:?}", config);

        Ok(config)
    }

    /// Cross-field checks that single-value parsing cannot catch
    pub fn check(&self) -> ConfigResult<()> {
        if self.links.default_validity_minutes == 0 {
            return Err(ConfigError::Invalid(
                "LINK_DEFAULT_VALIDITY_MINUTES must be positive".to_string(),
            ));
        }

        // Generated codes must also pass the custom shortcode format
        if !(SHORTCODE_MIN_LEN..=SHORTCODE_MAX_LEN).contains(&self.links.code_length) {
            return Err(ConfigError::Invalid(format!(
                "LINK_CODE_LENGTH must be between {} and {}",
                SHORTCODE_MIN_LEN, SHORTCODE_MAX_LEN
            )));
        }

        if self.links.max_generation_attempts == 0 {
            return Err(ConfigError::Invalid(
                "LINK_MAX_GENERATION_ATTEMPTS must be positive".to_string(),
            ));
        }

        if self.log_sink.enabled && self.log_sink.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "LOG_SINK_ENDPOINT is required when LOG_SINK_ENABLED is true".to_string(),
            ));
        }

        Ok(())
    }
}

/// Helper function to get an env variable with a default value
fn get_env_or_default<T: FromStr>(key: &str, default: &str) -> ConfigResult<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| ConfigError::ParseError(format!("Could not parse {}: {}", key, e))),
        Err(env::VarError::NotPresent) => {
            debug!("{} not set, using default: {}", key, default);
            default.parse::<T>().map_err(|e| {
                ConfigError::ParseError(format!("Could not parse default for {}: {}", key, e))
            })
        }
        Err(e) => Err(ConfigError::EnvVarError(e)),
    }
}

/// Helper function for variables without a default; empty counts as unset
fn get_env_optional(key: &str) -> ConfigResult<Option<String>> {
    match env::var(key) {
        Ok(val) if val.trim().is_empty() => Ok(None),
        Ok(val) => Ok(Some(val)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::EnvVarError(e)),
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 8000,
            workers: 1,
        },
        app: AppConfig {
            name: "quicklink".to_string(),
            version: "test".to_string(),
            environment: Environment::Testing,
            log_level: "debug".to_string(),
            public_base_url: Some("http://sho.rt".to_string()),
        },
        storage: StorageConfig {
            data_dir: PathBuf::from("./data"),
            tiers: StorageTiers(vec![StorageTier::Memory]),
        },
        links: LinkConfig::default(),
        redirect: RedirectConfig { delay_ms: 0 },
        log_sink: LogSinkConfig {
            enabled: false,
            endpoint: String::new(),
            token: None,
            stack: "backend".to_string(),
            timeout_seconds: 5,
        },
    }
}
