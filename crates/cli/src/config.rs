//! Application configuration loaded from environment variables.

use std::time::Duration;

use domain::Liters;
use station::DischargeConfig;

const DEFAULT_BASE_URL: &str = "http://localhost/PETRODIESEL2/public";
const DEFAULT_COMMIT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_VOLUME_TOLERANCE: f64 = 1.0;

/// CLI configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `STATION_BASE_URL` — root of the station backend
///   (default: `"http://localhost/PETRODIESEL2/public"`)
/// - `DISCHARGE_COMMIT_TIMEOUT_SECS` — commit timeout (default: `30`)
/// - `DISCHARGE_VOLUME_TOLERANCE` — liters of slack between distributed and
///   ordered volume (default: `1`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub commit_timeout_secs: u64,
    pub volume_tolerance: f64,
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            base_url: lookup("STATION_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            commit_timeout_secs: lookup("DISCHARGE_COMMIT_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_COMMIT_TIMEOUT_SECS),
            volume_tolerance: lookup("DISCHARGE_VOLUME_TOLERANCE")
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|t| t.is_finite() && *t >= 0.0)
                .unwrap_or(DEFAULT_VOLUME_TOLERANCE),
            log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        }
    }

    /// Coordinator settings derived from this configuration.
    pub fn discharge_config(&self) -> DischargeConfig {
        DischargeConfig::default()
            .with_commit_timeout(Duration::from_secs(self.commit_timeout_secs))
            .with_volume_tolerance(Liters::new(self.volume_tolerance))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            commit_timeout_secs: DEFAULT_COMMIT_TIMEOUT_SECS,
            volume_tolerance: DEFAULT_VOLUME_TOLERANCE,
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://localhost/PETRODIESEL2/public");
        assert_eq!(config.commit_timeout_secs, 30);
        assert_eq!(config.volume_tolerance, 1.0);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_empty_environment_matches_default() {
        let config = from_pairs(&[]);
        let default = Config::default();
        assert_eq!(config.base_url, default.base_url);
        assert_eq!(config.commit_timeout_secs, default.commit_timeout_secs);
        assert_eq!(config.volume_tolerance, default.volume_tolerance);
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let config = from_pairs(&[
            ("STATION_BASE_URL", "http://pos.local/public"),
            ("DISCHARGE_COMMIT_TIMEOUT_SECS", "soon"),
            ("DISCHARGE_VOLUME_TOLERANCE", "0.5"),
        ]);
        assert_eq!(config.base_url, "http://pos.local/public");
        assert_eq!(config.commit_timeout_secs, 30);
        assert_eq!(config.volume_tolerance, 0.5);

        let negative = from_pairs(&[("DISCHARGE_VOLUME_TOLERANCE", "-3")]);
        assert_eq!(negative.volume_tolerance, 1.0);
    }

    #[test]
    fn test_discharge_config() {
        let config = from_pairs(&[("DISCHARGE_COMMIT_TIMEOUT_SECS", "5")]);
        let discharge = config.discharge_config();
        assert_eq!(discharge.commit_timeout, Duration::from_secs(5));
        assert_eq!(discharge.volume_tolerance, Liters::new(1.0));
    }
}
