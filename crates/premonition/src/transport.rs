//! Sending probe documents to the oracle.
//!
//! The engine only depends on the [`Transport`] trait. [`HttpTransport`] is
//! the production implementation: it POSTs `{"query": document}` with the
//! configured headers and retries transient failures with exponential
//! backoff.

use crate::{Config, GraphQLResponse, PremonitionError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Executes one document against the oracle.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `document` and returns the parsed response envelope.
    ///
    /// # Errors
    ///
    /// Returns a transport-level [`PremonitionError`] (`Network`, `Http` or
    /// `Parse`) when no response envelope could be obtained.
    async fn post(&self, document: &str) -> Result<GraphQLResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn post(&self, document: &str) -> Result<GraphQLResponse> {
        (**self).post(document).await
    }
}

/// HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    headers: HashMap<String, String>,
    retries: u32,
}

impl HttpTransport {
    /// Builds a transport from the run configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PremonitionError::Network`] if the HTTP client cannot be
    /// constructed.
    pub fn new(config: &Config) -> Result<Self> {
        tracing::debug!(
            verify_tls = config.verify_tls,
            timeout_secs = config.timeout_secs,
            "Creating HTTP client"
        );
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| PremonitionError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            headers: config.headers.clone(),
            retries: config.retries,
        })
    }

    /// Sends a single request without retry logic.
    async fn post_once(&self, document: &str) -> Result<GraphQLResponse> {
        let body = serde_json::json!({ "query": document });

        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json");
        for (name, value) in &self.headers {
            request = request.header(name, value);
        }

        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| PremonitionError::Network(e.to_string()))?;

        let status = response.status();
        tracing::trace!(status = status.as_u16(), "Received response");

        let text = response
            .text()
            .await
            .map_err(|e| PremonitionError::Network(e.to_string()))?;

        Self::classify_body(status, &text)
    }

    /// Turns a response body into an envelope or a transport error.
    ///
    /// Validation failures are commonly reported with a 4xx status and a
    /// regular GraphQL envelope, so the body is parsed before the status is
    /// considered.
    fn classify_body(status: reqwest::StatusCode, text: &str) -> Result<GraphQLResponse> {
        match serde_json::from_str::<GraphQLResponse>(text) {
            Ok(parsed) if parsed.errors.is_some() || parsed.data.is_some() => Ok(parsed),
            Ok(_) | Err(_) if !status.is_success() => {
                tracing::error!(status = status.as_u16(), body = %text, "HTTP error response");
                Err(PremonitionError::Http(status.as_u16(), text.to_string()))
            }
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse oracle response");
                Err(PremonitionError::Parse(e.to_string()))
            }
        }
    }

    /// Network errors and 5xx server errors are retryable.
    fn is_retryable(error: &PremonitionError) -> bool {
        match error {
            PremonitionError::Network(_) => true,
            PremonitionError::Http(status, _) => *status >= 500,
            _ => false,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[tracing::instrument(skip(self, document), fields(url = %self.url, size = document.len()))]
    async fn post(&self, document: &str) -> Result<GraphQLResponse> {
        let mut last_error = None;
        let attempts = self.retries + 1;

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(6));
                tracing::info!(
                    attempt,
                    delay_secs = delay.as_secs(),
                    "Retrying after delay"
                );
                tokio::time::sleep(delay).await;
            }

            match self.post_once(document).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Request failed");
                    let retryable = Self::is_retryable(&e);
                    last_error = Some(e);
                    if !retryable {
                        break;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| PremonitionError::Network("No attempts made".to_string())))
    }
}
