//! Engine configuration: provider endpoints, credentials and retry budget.

use std::time::Duration;

use serde::Deserialize;

use crate::google::GoogleConfig;
use crate::nominatim::NominatimConfig;

pub const ENV_GEOCODING_API_KEY: &str = "ROUTER_GEOCODING_API_KEY";
pub const ENV_MATRIX_API_KEY: &str = "ROUTER_MATRIX_API_KEY";
pub const ENV_NOMINATIM_URL: &str = "ROUTER_NOMINATIM_URL";
pub const ENV_GOOGLE_URL: &str = "ROUTER_GOOGLE_URL";

/// Attempts given to the primary geocoder.
pub const DEFAULT_GEOCODE_RETRIES: u32 = 2;
/// Pause between geocoding attempts.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub nominatim: NominatimConfig,
    pub google: GoogleConfig,
    /// Attempts given to the primary geocoder before falling back.
    pub geocode_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            nominatim: NominatimConfig::default(),
            google: GoogleConfig::default(),
            geocode_retries: DEFAULT_GEOCODE_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by the `ROUTER_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns. Blank values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        config.google.geocoding_api_key = read(ENV_GEOCODING_API_KEY);
        config.google.matrix_api_key = read(ENV_MATRIX_API_KEY);
        if let Some(url) = read(ENV_NOMINATIM_URL) {
            config.nominatim.base_url = url;
        }
        if let Some(url) = read(ENV_GOOGLE_URL) {
            config.google.base_url = url;
        }
        config
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
