//! CLI settings.
//!
//! Layered configuration: built-in defaults, then an optional
//! `stateless.toml` in the working directory, then `STATELESS_*`
//! environment variables (so the API key can live in `STATELESS_API_KEY`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::health::TierThresholds;
use crate::routes;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Control-plane API base URL.
    pub api_url: String,
    /// Opaque API key sent as `X-API-KEY`.
    pub api_key: Option<String>,
    /// HTTP request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Staleness window for the CURRENT tier, in blocks.
    pub current_window: u64,
    /// Staleness window for the LAGGING tier, in blocks.
    pub lagging_window: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let tiers = TierThresholds::default();
        Self {
            api_url: routes::API_BASE.to_string(),
            api_key: None,
            request_timeout_ms: 10_000,
            current_window: tiers.current_window,
            lagging_window: tiers.lagging_window,
        }
    }
}

impl Settings {
    /// Load settings from file and environment on top of defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Settings::default();
        Config::builder()
            .set_default("api_url", defaults.api_url)?
            .set_default("request_timeout_ms", defaults.request_timeout_ms as i64)?
            .set_default("current_window", defaults.current_window as i64)?
            .set_default("lagging_window", defaults.lagging_window as i64)?
            .add_source(File::with_name("stateless").required(false))
            .add_source(Environment::with_prefix("STATELESS").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.request_timeout_ms)
    }

    pub fn tier_thresholds(&self) -> TierThresholds {
        TierThresholds {
            current_window: self.current_window,
            lagging_window: self.lagging_window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.api_url, routes::API_BASE);
        assert!(settings.api_key.is_none());
        assert_eq!(settings.request_timeout().as_secs(), 10);

        let tiers = settings.tier_thresholds();
        assert_eq!(tiers.current_window, 25);
        assert_eq!(tiers.lagging_window, 100);
    }

    #[test]
    fn test_file_overrides_defaults() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stateless.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "api_key = \"sk-test\"").unwrap();
        writeln!(file, "current_window = 50").unwrap();

        let settings: Settings = Config::builder()
            .set_default("api_url", routes::API_BASE)
            .unwrap()
            .set_default("request_timeout_ms", 10_000i64)
            .unwrap()
            .set_default("current_window", 25i64)
            .unwrap()
            .set_default("lagging_window", 100i64)
            .unwrap()
            .add_source(File::from(path))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.api_key.as_deref(), Some("sk-test"));
        assert_eq!(settings.tier_thresholds().current_window, 50);
        assert_eq!(settings.tier_thresholds().lagging_window, 100);
    }
}
