use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::RetryConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    pub cache: CacheSettings,
    pub retry: RetryConfig,
    pub batch: BatchSettings,
    pub logging: LoggingSettings,
    /// Profile used when the caller does not name one.
    pub default_profile: String,
    /// Per-check time budget for checks that do not declare their own.
    pub check_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl_seconds: u64,
    pub max_capacity: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSettings {
    /// Assets screened concurrently inside one bulk batch.
    pub batch_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            cache: CacheSettings::default(),
            retry: RetryConfig::default(),
            batch: BatchSettings::default(),
            logging: LoggingSettings::default(),
            default_profile: "moderate".to_string(),
            check_timeout_seconds: 10,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings {
            enabled: true,
            ttl_seconds: 300,
            max_capacity: 10_000,
        }
    }
}

impl Default for BatchSettings {
    fn default() -> Self {
        BatchSettings { batch_size: 10 }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: "info".to_string(),
        }
    }
}

impl EngineSettings {
    /// Builds settings from `SCREENER_*` environment variables, falling
    /// back to defaults for anything unset.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let _settings = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        Ok(EngineSettings {
            cache: CacheSettings {
                enabled: env::var("SCREENER_CACHE_ENABLED")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()
                    .unwrap_or(true),
                ttl_seconds: env::var("SCREENER_CACHE_TTL_SECONDS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()
                    .unwrap_or(300),
                max_capacity: env::var("SCREENER_CACHE_MAX_CAPACITY")
                    .unwrap_or_else(|_| "10000".to_string())
                    .parse()
                    .unwrap_or(10_000),
            },
            retry: RetryConfig {
                max_retries: env::var("SCREENER_RETRY_MAX_RETRIES")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse()
                    .unwrap_or(2),
                base_delay_ms: env::var("SCREENER_RETRY_BASE_DELAY_MS")
                    .unwrap_or_else(|_| "200".to_string())
                    .parse()
                    .unwrap_or(200),
                max_delay_ms: env::var("SCREENER_RETRY_MAX_DELAY_MS")
                    .unwrap_or_else(|_| "2000".to_string())
                    .parse()
                    .unwrap_or(2_000),
                jitter_factor: env::var("SCREENER_RETRY_JITTER_FACTOR")
                    .unwrap_or_else(|_| "0.1".to_string())
                    .parse()
                    .unwrap_or(0.1),
            },
            batch: BatchSettings {
                batch_size: env::var("SCREENER_BATCH_SIZE")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
            },
            logging: LoggingSettings {
                level: env::var("SCREENER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
            default_profile: env::var("SCREENER_DEFAULT_PROFILE")
                .unwrap_or_else(|_| "moderate".to_string()),
            check_timeout_seconds: env::var("SCREENER_CHECK_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_seconds)
    }

    pub fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.check_timeout_seconds)
    }
}
