//! HTTP client with retry
//!
//! Provides the rate-lookup client that handles:
//! - One GET per replication day with the `apikey` header
//! - Constant backoff with jitter on transient failures
//! - Error classification for retry decisions
//! - Parsing the response into a `RatePayload`

use super::retry::{Attempt, RetryPolicy};
use crate::error::{Error, Result};
use crate::payload::RatePayload;
use crate::types::format_day;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

/// Default endpoint of the rate-lookup API
pub const DEFAULT_BASE_URL: &str = "http://api.apilayer.com/exchangerates_data/";

/// Source of daily rate payloads
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetch the rates for one day
    async fn fetch(&self, day: NaiveDate) -> Result<RatePayload>;
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL; the day is appended as the last path segment
    pub base_url: String,
    /// Credential sent in the `apikey` header
    pub access_key: String,
    /// Request timeout
    pub timeout: Duration,
    /// Retry policy for transient failures
    pub retry: RetryPolicy,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_key: String::new(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            user_agent: format!("tap-exchangerates/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the access key
    pub fn access_key(mut self, key: impl Into<String>) -> Self {
        self.config.access_key = key.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the retry policy
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// HTTP client for the rate-lookup API
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    base: Url,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        // Url::join replaces the last segment unless the base ends with '/'
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)?;

        Ok(Self {
            client,
            config,
            base,
        })
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// URL of the rates for `day`
    pub fn day_url(&self, day: NaiveDate) -> Result<Url> {
        Ok(self.base.join(&format_day(day))?)
    }

    /// Issue one request and classify the outcome
    async fn attempt(&self, url: &Url) -> Attempt<RatePayload> {
        let response = match self
            .client
            .get(url.clone())
            .header("apikey", &self.config.access_key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(url = %url, error = %e, "Request failed without a response");
                return Attempt::from_error(Error::Http(e));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                error!(url = %url, status = status.as_u16(), error = %e, "Failed to read response body");
                return Attempt::from_error(Error::Http(e));
            }
        };

        if !status.is_success() {
            error!(url = %url, status = status.as_u16(), body = %body, "Request failed");
            return Attempt::from_error(Error::http_status(status.as_u16(), body, url.as_str()));
        }

        match RatePayload::from_body(&body) {
            Ok(payload) => Attempt::Success(payload),
            Err(e) => Attempt::Fatal(e),
        }
    }

    /// Fetch one day, retrying transient failures per the retry policy
    pub async fn fetch_day(&self, day: NaiveDate) -> Result<RatePayload> {
        let url = self.day_url(day)?;
        let policy = self.config.retry;
        let mut attempt = 1;

        loop {
            match self.attempt(&url).await {
                Attempt::Success(payload) => {
                    debug!("Request succeeded: GET {url}");
                    return Ok(payload);
                }
                Attempt::Fatal(e) => return Err(e),
                Attempt::Retryable(e) => {
                    if !policy.should_retry(attempt) {
                        warn!(
                            "Giving up on {url} after {attempt}/{} attempts",
                            policy.max_attempts
                        );
                        return Err(e);
                    }
                    let delay = policy.delay();
                    warn!(
                        "Request failed ({e}), attempt {attempt}/{}, retrying in {delay:?}",
                        policy.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl RateSource for HttpClient {
    async fn fetch(&self, day: NaiveDate) -> Result<RatePayload> {
        self.fetch_day(day).await
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.config.base_url)
            .field("timeout", &self.config.timeout)
            .field("retry", &self.config.retry)
            .finish_non_exhaustive()
    }
}
