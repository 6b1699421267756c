//! API configuration

use core_kernel::Currency;
use domain_claims::{EngineConfig, DEFAULT_MAX_PASSES};
use serde::Deserialize;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log level
    pub log_level: String,
    /// Inference pass cap per claim
    pub max_passes: u32,
    /// Currency of every amount in submitted claims
    pub currency: Currency,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            max_passes: DEFAULT_MAX_PASSES,
            currency: Currency::INR,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_`-prefixed environment variables
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("log_level", defaults.log_level)?
            .set_default("max_passes", i64::from(defaults.max_passes))?
            .set_default("currency", defaults.currency.code())?
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Settings handed to the inference engine
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_passes: self.max_passes,
            currency: self.currency,
        }
    }
}
