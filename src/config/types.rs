//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/blizzard/) and local (.blizzard/) configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ai::ProviderConfig;
use crate::constants::{chat as chat_constants, network, retry as retry_constants};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// School district identity and document paths
    pub district: DistrictConfig,

    /// Weather provider settings
    pub weather: WeatherConfig,

    /// LLM provider settings
    pub llm: ProviderConfig,

    /// Conversation settings
    pub chat: ChatConfig,

    /// Retry and pacing settings
    pub retry: RetryConfig,

    /// Prediction output settings
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            district: DistrictConfig::default(),
            weather: WeatherConfig::default(),
            llm: ProviderConfig::default(),
            chat: ChatConfig::default(),
            retry: RetryConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `BlizzardError::Config` on validation failure.
    pub fn validate(&self) -> crate::types::Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(crate::types::BlizzardError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(crate::types::BlizzardError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.chat.max_iterations == 0 {
            return Err(crate::types::BlizzardError::Config(
                "Chat max_iterations must be greater than 0".to_string(),
            ));
        }

        if self.weather.zip_code.trim().is_empty() {
            return Err(crate::types::BlizzardError::Config(
                "Weather zip_code must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// District Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DistrictConfig {
    /// District display name
    pub name: String,
    /// City the district serves
    pub city: String,
    /// County (used for alert relevance matching)
    pub county: String,
    /// Two-letter state code
    pub state: String,
    /// Path to the closure criteria document
    pub criteria_path: PathBuf,
    /// Path to the district settings YAML
    pub settings_path: PathBuf,
}

impl Default for DistrictConfig {
    fn default() -> Self {
        Self {
            name: "Example Public Schools".to_string(),
            city: "Grand Rapids".to_string(),
            county: "Kent".to_string(),
            state: "MI".to_string(),
            criteria_path: PathBuf::from("config/district/closure_criteria.txt"),
            settings_path: PathBuf::from("config/district/settings.yaml"),
        }
    }
}

// =============================================================================
// Weather Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Weather API key - never serialized to output for security
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL
    pub api_base: String,
    /// ZIP code used as the forecast query location
    pub zip_code: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("zip_code", &self.zip_code)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://api.weatherapi.com/v1".to_string(),
            zip_code: "49503".to_string(),
            timeout_secs: network::WEATHER_TIMEOUT_SECS,
        }
    }
}

// =============================================================================
// Chat Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Hard ceiling on conversation turns
    pub max_iterations: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_iterations: chat_constants::MAX_ITERATIONS,
        }
    }
}

// =============================================================================
// Retry Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum attempts per LLM request
    pub max_attempts: u32,
    /// Base delay for exponential backoff in milliseconds
    pub base_delay_ms: u64,
    /// Maximum delay between retries in seconds
    pub max_delay_secs: u64,
    /// Minimum spacing between consecutive requests in milliseconds
    pub min_request_interval_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: retry_constants::MAX_ATTEMPTS,
            base_delay_ms: retry_constants::BASE_DELAY_MS,
            max_delay_secs: retry_constants::MAX_DELAY_SECS,
            min_request_interval_ms: retry_constants::MIN_REQUEST_INTERVAL_MS,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> crate::ai::RetryPolicy {
        crate::ai::RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: std::time::Duration::from_millis(self.base_delay_ms),
            max_delay: std::time::Duration::from_secs(self.max_delay_secs),
            backoff_factor: retry_constants::BACKOFF_FACTOR,
            min_request_interval: std::time::Duration::from_millis(self.min_request_interval_ms),
        }
    }
}

// =============================================================================
// Output Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory prediction artifacts are written to
    pub data_dir: PathBuf,
    /// Deployment environment: "development" or "production"
    pub environment: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("static"),
            environment: "development".to_string(),
        }
    }
}

impl OutputConfig {
    /// History file path. Production writes the published history file;
    /// everything else writes a local scratch copy.
    pub fn history_path(&self) -> PathBuf {
        let file = if self.environment == "production" {
            "history.json"
        } else {
            "history_local.json"
        };
        self.data_dir.join(file)
    }

    /// Latest-prediction file path
    pub fn data_path(&self) -> PathBuf {
        self.data_dir.join("data.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_temperature_out_of_range_rejected() {
        let mut config = Config::default();
        config.llm.temperature = 3.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let mut config = Config::default();
        config.chat.max_iterations = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_zip_rejected() {
        let mut config = Config::default();
        config.weather.zip_code = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_history_path_by_environment() {
        let mut output = OutputConfig::default();
        assert!(output.history_path().ends_with("history_local.json"));
        output.environment = "production".to_string();
        assert!(output.history_path().ends_with("history.json"));
    }

    #[test]
    fn test_weather_config_debug_redacts_key() {
        let config = WeatherConfig {
            api_key: Some("wapi-secret".to_string()),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("wapi-secret"));
    }
}
