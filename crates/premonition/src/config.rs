//! Run configuration for a reconstruction.

use crate::{PremonitionError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Default number of wordlist entries probed per request.
pub const DEFAULT_BUCKET_SIZE: usize = 64;

/// Default number of in-flight requests. One keeps the run strictly sequential.
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Default timeout for a single request (30 seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default connection timeout (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Settings shared by the transport and the discovery engine.
///
/// A `Config` is immutable for the duration of a run. It can be built in code
/// or deserialized from a config file (camelCase keys):
///
/// ```
/// # use premonition::Config;
/// let config: Config = serde_json::from_str(
///     r#"{ "url": "https://api.example.com/graphql", "bucketSize": 32 }"#,
/// ).unwrap();
/// assert_eq!(config.bucket_size, 32);
/// assert!(config.verify_tls);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// The GraphQL endpoint to probe
    pub url: String,

    /// HTTP headers sent with every probe (e.g., for authentication)
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Whether TLS certificates are verified
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,

    /// Number of candidate names sent per probe document
    #[serde(default = "default_bucket_size")]
    pub bucket_size: usize,

    /// Maximum number of probes in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Number of retry attempts for retryable transport failures
    #[serde(default)]
    pub retries: u32,
}

const fn default_verify_tls() -> bool {
    true
}

const fn default_bucket_size() -> usize {
    DEFAULT_BUCKET_SIZE
}

const fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

const fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

impl Config {
    /// Creates a configuration for `url` with default settings.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            verify_tls: default_verify_tls(),
            bucket_size: DEFAULT_BUCKET_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            retries: 0,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.headers.insert(name.into(), value.into());
        }
        self
    }

    #[must_use]
    pub const fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    #[must_use]
    pub const fn with_bucket_size(mut self, bucket_size: usize) -> Self {
        self.bucket_size = bucket_size;
        self
    }

    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    #[must_use]
    pub const fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    #[must_use]
    pub const fn with_connect_timeout_secs(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Checks the invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns [`PremonitionError::InvalidConfig`] if the URL is empty or if
    /// `bucket_size` or `concurrency` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(PremonitionError::InvalidConfig(
                "url must not be empty".to_string(),
            ));
        }
        if self.bucket_size == 0 {
            return Err(PremonitionError::InvalidConfig(
                "bucketSize must be greater than zero".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(PremonitionError::InvalidConfig(
                "concurrency must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_json() {
        let config: Config = serde_json::from_str(r#"{ "url": "http://localhost/graphql" }"#)
            .expect("minimal config should parse");
        assert_eq!(config, Config::new("http://localhost/graphql"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_camel_case_keys() {
        let config: Config = serde_json::from_str(
            r#"{
                "url": "http://localhost/graphql",
                "headers": { "Authorization": "Bearer t" },
                "verifyTls": false,
                "bucketSize": 8,
                "concurrency": 4,
                "timeoutSecs": 5,
                "retries": 2
            }"#,
        )
        .expect("config should parse");
        assert!(!config.verify_tls);
        assert_eq!(config.bucket_size, 8);
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.retries, 2);
        assert_eq!(
            config.headers.get("Authorization").map(String::as_str),
            Some("Bearer t")
        );
    }

    #[test]
    fn test_zero_bucket_size_is_rejected() {
        let err = Config::new("http://localhost/graphql")
            .with_bucket_size(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, PremonitionError::InvalidConfig(_)));
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let err = Config::new("http://localhost/graphql")
            .with_concurrency(0)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("concurrency"));
    }

    #[test]
    fn test_empty_url_is_rejected() {
        assert!(Config::new("  ").validate().is_err());
    }
}
