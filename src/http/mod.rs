//! HTTP client module
//!
//! Fetches one day of rates per request, with retry on transient failures.
//!
//! # Features
//!
//! - **Automatic Retries**: Bounded attempt count
//! - **Constant Backoff**: Fixed interval plus random jitter
//! - **Classification**: 429 and 5xx retry, other statuses give up at once

mod client;
mod retry;

pub use client::{
    HttpClient, HttpClientConfig, HttpClientConfigBuilder, RateSource, DEFAULT_BASE_URL,
};
pub use retry::{Attempt, RetryPolicy};

#[cfg(test)]
mod tests;
