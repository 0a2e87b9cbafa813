//! Runtime settings read from `MDPROBATE_*` environment variables.

use std::time::Duration;

use mdprobate_api::{Client, ClientOptions, DEFAULT_BASE_URL};

pub const BASE_URL_VAR: &str = "MDPROBATE_BASE_URL";
pub const TIMEOUT_VAR: &str = "MDPROBATE_TIMEOUT_SECS";
pub const DETAIL_DELAY_VAR: &str = "MDPROBATE_DETAIL_DELAY_MS";
pub const RETRY_MAX_VAR: &str = "MDPROBATE_RETRY_MAX";
pub const RETRY_BASE_VAR: &str = "MDPROBATE_RETRY_BASE_MS";
pub const ACCEPT_INVALID_CERTS_VAR: &str = "MDPROBATE_ACCEPT_INVALID_CERTS";

/// Pause between consecutive detail page fetches unless overridden.
pub const DEFAULT_DETAIL_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub base_url: String,
    pub detail_delay: Duration,
    pub client: ClientOptions,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            detail_delay: DEFAULT_DETAIL_DELAY,
            client: ClientOptions::default(),
        }
    }
}

impl ScrapeConfig {
    /// Reads the process environment. Unset or unparsable values fall back
    /// to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parse_u64 = |key: &str, default: u64| -> u64 {
            lookup(key)
                .and_then(|val| val.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };

        let base_url = lookup(BASE_URL_VAR)
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty())
            .unwrap_or(defaults.base_url);
        let timeout = Duration::from_secs(parse_u64(
            TIMEOUT_VAR,
            defaults.client.timeout.as_secs(),
        ));
        let detail_delay = Duration::from_millis(parse_u64(
            DETAIL_DELAY_VAR,
            defaults.detail_delay.as_millis() as u64,
        ));
        let max_retries = lookup(RETRY_MAX_VAR)
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(defaults.client.max_retries);
        let retry_base_delay = Duration::from_millis(parse_u64(
            RETRY_BASE_VAR,
            defaults.client.retry_base_delay.as_millis() as u64,
        ));
        let accept_invalid_certs = lookup(ACCEPT_INVALID_CERTS_VAR)
            .map(|val| parse_flag(&val))
            .unwrap_or(defaults.client.accept_invalid_certs);

        Self {
            base_url,
            detail_delay,
            client: ClientOptions {
                timeout,
                max_retries,
                retry_base_delay,
                accept_invalid_certs,
                ..defaults.client
            },
        }
    }

    pub fn with_detail_delay(mut self, delay: Duration) -> Self {
        self.detail_delay = delay;
        self
    }

    pub fn build_client(&self) -> Result<Client, mdprobate_api::Error> {
        Client::with_options(&self.base_url, self.client.clone())
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> ScrapeConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ScrapeConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.base_url, "https://registers.maryland.gov");
        assert_eq!(config.detail_delay, Duration::from_millis(500));
        assert_eq!(config.client.timeout, Duration::from_secs(30));
        assert_eq!(config.client.max_retries, 2);
        assert_eq!(config.client.retry_base_delay, Duration::from_millis(1000));
        assert!(!config.client.accept_invalid_certs);
    }

    #[test]
    fn overrides_are_read() {
        let config = config_from(&[
            (BASE_URL_VAR, "http://127.0.0.1:9999"),
            (TIMEOUT_VAR, "5"),
            (DETAIL_DELAY_VAR, "0"),
            (RETRY_MAX_VAR, "4"),
            (RETRY_BASE_VAR, "250"),
            (ACCEPT_INVALID_CERTS_VAR, "TRUE"),
        ]);
        assert_eq!(config.base_url, "http://127.0.0.1:9999");
        assert_eq!(config.client.timeout, Duration::from_secs(5));
        assert_eq!(config.detail_delay, Duration::ZERO);
        assert_eq!(config.client.max_retries, 4);
        assert_eq!(config.client.retry_base_delay, Duration::from_millis(250));
        assert!(config.client.accept_invalid_certs);
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let config = config_from(&[
            (BASE_URL_VAR, "   "),
            (TIMEOUT_VAR, "soon"),
            (RETRY_MAX_VAR, "-1"),
            (ACCEPT_INVALID_CERTS_VAR, "maybe"),
        ]);
        assert_eq!(config.base_url, "https://registers.maryland.gov");
        assert_eq!(config.client.timeout, Duration::from_secs(30));
        assert_eq!(config.client.max_retries, 2);
        assert!(!config.client.accept_invalid_certs);
    }

    #[test]
    fn detail_delay_override() {
        let config = ScrapeConfig::default().with_detail_delay(Duration::from_millis(10));
        assert_eq!(config.detail_delay, Duration::from_millis(10));
    }
}
