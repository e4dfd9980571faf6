//! Connection configuration for the tracking service.
//!
//! Credentials are explicit values handed to the client by the caller; there
//! is no global or ambient credential state.

use std::env;

use tracing::warn;
use url::Url;

/// Default hosted instance used when no base URL is configured.
const DEFAULT_API_URL: &str = "https://mailpulse-io.lyten.agency";

/// Connection parameters for a Mailpulse instance.
#[derive(Debug, Clone)]
pub struct MailpulseConfig {
    /// Base URL of the instance, stored without a trailing slash.
    pub api_url: String,

    /// API key transmitted in the `x-api-key` header on every request.
    pub api_key: String,
}

impl MailpulseConfig {
    /// Create a configuration, normalizing the base URL.
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let mut api_url: String = api_url.into();
        while api_url.ends_with('/') {
            api_url.pop();
        }

        if Url::parse(&api_url).is_err() {
            warn!(api_url = %api_url, "config_api_url_not_absolute");
        }

        Self {
            api_url,
            api_key: api_key.into(),
        }
    }

    /// Load configuration from `MAILPULSE_API_URL` and `MAILPULSE_API_KEY`.
    pub fn from_env() -> Self {
        let api_url =
            env::var("MAILPULSE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let api_key = env::var("MAILPULSE_API_KEY").unwrap_or_else(|_| {
            warn!("config_api_key_missing");
            String::new()
        });

        Self::new(api_url, api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slashes() {
        let config = MailpulseConfig::new("https://track.example.com///", "key");
        assert_eq!(config.api_url, "https://track.example.com");
        assert_eq!(config.api_key, "key");
    }

    #[test]
    fn test_new_keeps_url_without_slash() {
        let config = MailpulseConfig::new("https://track.example.com", "key");
        assert_eq!(config.api_url, "https://track.example.com");
    }

    #[test]
    fn test_from_env_reads_vars() {
        env::set_var("MAILPULSE_API_URL", "https://env.example.com/");
        env::set_var("MAILPULSE_API_KEY", "secret");

        let config = MailpulseConfig::from_env();
        assert_eq!(config.api_url, "https://env.example.com");
        assert_eq!(config.api_key, "secret");

        env::remove_var("MAILPULSE_API_URL");
        env::remove_var("MAILPULSE_API_KEY");
    }
}
