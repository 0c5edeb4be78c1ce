//! Application configuration from environment variables.
//!
//! Load configuration using `Config::from_env()` after calling `dotenvy::dotenv()`.

use std::path::PathBuf;
use std::time::Duration;

use crate::core::contact_form::DEFAULT_RESET_DELAY;
use crate::core::lead::{ClientContext, DEFAULT_LEAD_SOURCE};
use crate::core::queue::DEFAULT_STORAGE_KEY;
use crate::core::submitter::{DEFAULT_ENDPOINT_URL, SubmitterConfig};

/// Directory the pending queue is stored in when `LEADS_QUEUE_DIR` is unset
pub const DEFAULT_QUEUE_DIR: &str = ".leadcapture";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Webhook receiving lead payloads
    /// Example: https://n8n.example.com/webhook/leads
    pub endpoint_url: String,

    /// Directory holding the pending queue file
    pub queue_dir: PathBuf,

    /// Key (file name) the pending queue is stored under
    pub storage_key: String,

    /// Value of `metadata.source` in every payload
    pub source: String,

    /// Delay before the form resets after a successful submission
    pub reset_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            queue_dir: PathBuf::from(DEFAULT_QUEUE_DIR),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            source: DEFAULT_LEAD_SOURCE.to_string(),
            reset_delay: DEFAULT_RESET_DELAY,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` before this to load from `.env` file.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup, falling back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let reset_delay = match var("LEADS_RESET_DELAY_MS").map(|v| v.parse::<u64>()) {
            Some(Ok(ms)) => Duration::from_millis(ms),
            Some(Err(e)) => {
                tracing::warn!("Ignoring invalid LEADS_RESET_DELAY_MS: {}", e);
                defaults.reset_delay
            }
            None => defaults.reset_delay,
        };

        Self {
            endpoint_url: var("LEADS_WEBHOOK_URL").unwrap_or(defaults.endpoint_url),
            queue_dir: var("LEADS_QUEUE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.queue_dir),
            storage_key: var("LEADS_STORAGE_KEY").unwrap_or(defaults.storage_key),
            source: var("LEADS_SOURCE").unwrap_or(defaults.source),
            reset_delay,
        }
    }

    /// Check if a non-default webhook is configured
    pub fn has_custom_endpoint(&self) -> bool {
        self.endpoint_url != DEFAULT_ENDPOINT_URL
    }

    pub fn submitter(&self) -> SubmitterConfig {
        SubmitterConfig::new(self.endpoint_url.clone()).with_source(self.source.clone())
    }

    /// Describe the machine a lead is submitted from
    pub fn client_context(&self) -> ClientContext {
        client_context_from(|name| std::env::var(name).ok())
    }
}

fn client_context_from(lookup: impl Fn(&str) -> Option<String>) -> ClientContext {
    // LANG looks like "es_ES.UTF-8"; payloads carry a BCP 47 tag
    let language = lookup("LANG")
        .and_then(|lang| lang.split('.').next().map(|tag| tag.replace('_', "-")))
        .filter(|tag| !tag.is_empty() && tag != "C" && tag != "POSIX")
        .unwrap_or_else(|| "en-US".to_string());

    ClientContext {
        user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        language,
        timezone: lookup("TZ").unwrap_or_else(|| "UTC".to_string()),
        referrer: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = Config::from_lookup(lookup(&[]));

        assert_eq!(config, Config::default());
        assert_eq!(config.endpoint_url, DEFAULT_ENDPOINT_URL);
        assert_eq!(config.storage_key, "g2gi_pending_leads");
        assert_eq!(config.reset_delay, Duration::from_millis(3000));
        assert!(!config.has_custom_endpoint());
    }

    #[test]
    fn test_config_with_all_fields() {
        let config = Config::from_lookup(lookup(&[
            ("LEADS_WEBHOOK_URL", "http://localhost:5678/webhook/test"),
            ("LEADS_QUEUE_DIR", "/var/lib/leads"),
            ("LEADS_STORAGE_KEY", "staging_leads"),
            ("LEADS_SOURCE", "landing_staging"),
            ("LEADS_RESET_DELAY_MS", "1500"),
        ]));

        assert_eq!(config.endpoint_url, "http://localhost:5678/webhook/test");
        assert_eq!(config.queue_dir, PathBuf::from("/var/lib/leads"));
        assert_eq!(config.storage_key, "staging_leads");
        assert_eq!(config.source, "landing_staging");
        assert_eq!(config.reset_delay, Duration::from_millis(1500));
        assert!(config.has_custom_endpoint());
    }

    #[test]
    fn test_empty_and_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("LEADS_WEBHOOK_URL", "  "),
            ("LEADS_RESET_DELAY_MS", "soon"),
        ]));

        assert_eq!(config.endpoint_url, DEFAULT_ENDPOINT_URL);
        assert_eq!(config.reset_delay, DEFAULT_RESET_DELAY);
    }

    #[test]
    fn test_submitter_config() {
        let config = Config::from_lookup(lookup(&[
            ("LEADS_WEBHOOK_URL", "https://hooks.test/a"),
            ("LEADS_SOURCE", "ads"),
        ]));

        let submitter = config.submitter();
        assert_eq!(submitter.endpoint_url, "https://hooks.test/a");
        assert_eq!(submitter.source, "ads");
    }

    #[test]
    fn test_client_context() {
        let context = client_context_from(lookup(&[
            ("LANG", "es_ES.UTF-8"),
            ("TZ", "Europe/Madrid"),
        ]));
        assert_eq!(context.language, "es-ES");
        assert_eq!(context.timezone, "Europe/Madrid");
        assert!(context.user_agent.starts_with("leadcapture/"));
        assert!(context.referrer.is_none());

        let context = client_context_from(lookup(&[("LANG", "C")]));
        assert_eq!(context.language, "en-US");
        assert_eq!(context.timezone, "UTC");
    }
}
