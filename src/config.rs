//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before the judge runs.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use crate::constants::{
    DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_MAX_CONCURRENT_SANDBOX_CALLS,
    DEFAULT_MAX_DIAGNOSTIC_LENGTH, DEFAULT_PROBLEMS_PATH, DEFAULT_SANDBOX_MAX_RETRIES,
    DEFAULT_SANDBOX_RETRY_BASE_MS, DEFAULT_SANDBOX_TIMEOUT_SECS, DEFAULT_SANDBOX_URL,
    sandbox_language_ids,
};
use crate::models::Language;

/// Global application configuration (lazily initialized)
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub sandbox: SandboxConfig,
    pub judge: JudgeConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Remote execution sandbox configuration
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Base URL, without the `/submissions` path
    pub base_url: String,
    /// RapidAPI key for the hosted sandbox
    pub api_key: Option<String>,
    /// RapidAPI host header for the hosted sandbox
    pub api_host: Option<String>,
    /// Token for a self-hosted sandbox
    pub auth_token: Option<String>,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub language_ids: HashMap<Language, u32>,
}

/// Judging configuration
#[derive(Debug, Clone)]
pub struct JudgeConfig {
    /// Cap on concurrent outbound sandbox requests across all submissions
    pub max_concurrent_sandbox_calls: usize,
    /// Maximum characters of diagnostic text kept per test case
    pub max_diagnostic_length: usize,
}

/// Problem and submission storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// PostgreSQL URL; problems are read from `problems_path` when absent
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub problems_path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub rust_log: String,
    pub json: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            sandbox: SandboxConfig::from_env()?,
            judge: JudgeConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            logging: LoggingConfig::from_env(),
        })
    }
}

impl SandboxConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs: u64 = parse_var("SANDBOX_TIMEOUT_SECS", DEFAULT_SANDBOX_TIMEOUT_SECS)?;
        let retry_base_ms: u64 = parse_var("SANDBOX_RETRY_BASE_MS", DEFAULT_SANDBOX_RETRY_BASE_MS)?;

        let mut language_ids = default_language_ids();
        if let Ok(overrides) = env::var("SANDBOX_LANGUAGE_IDS") {
            language_ids.extend(parse_language_ids(&overrides)?);
        }

        Ok(Self {
            base_url: env::var("SANDBOX_URL")
                .unwrap_or_else(|_| DEFAULT_SANDBOX_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key: env::var("SANDBOX_API_KEY").ok().filter(|v| !v.is_empty()),
            api_host: env::var("SANDBOX_API_HOST").ok().filter(|v| !v.is_empty()),
            auth_token: env::var("SANDBOX_AUTH_TOKEN").ok().filter(|v| !v.is_empty()),
            timeout: Duration::from_secs(timeout_secs),
            max_retries: parse_var("SANDBOX_MAX_RETRIES", DEFAULT_SANDBOX_MAX_RETRIES)?,
            retry_base_delay: Duration::from_millis(retry_base_ms),
            language_ids,
        })
    }

    /// Sandbox language id for a target language
    pub fn language_id(&self, language: Language) -> Option<u32> {
        self.language_ids.get(&language).copied()
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SANDBOX_URL.to_string(),
            api_key: None,
            api_host: None,
            auth_token: None,
            timeout: Duration::from_secs(DEFAULT_SANDBOX_TIMEOUT_SECS),
            max_retries: DEFAULT_SANDBOX_MAX_RETRIES,
            retry_base_delay: Duration::from_millis(DEFAULT_SANDBOX_RETRY_BASE_MS),
            language_ids: default_language_ids(),
        }
    }
}

impl JudgeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let max_concurrent_sandbox_calls: usize =
            parse_var("MAX_CONCURRENT_SANDBOX_CALLS", DEFAULT_MAX_CONCURRENT_SANDBOX_CALLS)?;
        if max_concurrent_sandbox_calls == 0 {
            return Err(ConfigError::InvalidValue("MAX_CONCURRENT_SANDBOX_CALLS".to_string()));
        }

        Ok(Self {
            max_concurrent_sandbox_calls,
            max_diagnostic_length: parse_var("MAX_DIAGNOSTIC_LENGTH", DEFAULT_MAX_DIAGNOSTIC_LENGTH)?,
        })
    }
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            max_concurrent_sandbox_calls: DEFAULT_MAX_CONCURRENT_SANDBOX_CALLS,
            max_diagnostic_length: DEFAULT_MAX_DIAGNOSTIC_LENGTH,
        }
    }
}

impl StorageConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", DEFAULT_DATABASE_MAX_CONNECTIONS)?,
            problems_path: PathBuf::from(
                env::var("PROBLEMS_PATH").unwrap_or_else(|_| DEFAULT_PROBLEMS_PATH.to_string()),
            ),
        })
    }
}

impl LoggingConfig {
    fn from_env() -> Self {
        Self {
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            json: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

fn default_language_ids() -> HashMap<Language, u32> {
    HashMap::from([
        (Language::Cpp, sandbox_language_ids::CPP),
        (Language::Python, sandbox_language_ids::PYTHON),
        (Language::JavaScript, sandbox_language_ids::JAVASCRIPT),
        (Language::Java, sandbox_language_ids::JAVA),
    ])
}

/// Parse `cpp=54,python=71` style language id overrides
pub fn parse_language_ids(raw: &str) -> Result<HashMap<Language, u32>, ConfigError> {
    let invalid = || ConfigError::InvalidValue("SANDBOX_LANGUAGE_IDS".to_string());

    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, id) = pair.split_once('=').ok_or_else(invalid)?;
            let language: Language = name.trim().parse().map_err(|_| invalid())?;
            let id: u32 = id.trim().parse().map_err(|_| invalid())?;
            Ok((language, id))
        })
        .collect()
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
