//! HTTP transport used to fetch raw resource bytes
//!
//! This module handles all network access for the crawler, including:
//! - Building the HTTP client with a proper user agent string
//! - GET requests for pages and assets
//! - Racing every in-flight request against the cancellation token
//! - Error classification

use crate::config::{CrawlerConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Maximum number of redirects followed for one resource
const MAX_REDIRECTS: usize = 10;

/// Failure of a single transport request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Server answered with a non-success status code
    #[error("HTTP status {status}")]
    Status { status: u16 },

    /// Request timed out
    #[error("Request timeout")]
    Timeout,

    /// Connection could not be established
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Any other network or body-read failure
    #[error("Network error: {0}")]
    Network(String),

    /// The request was aborted by the cancellation token
    #[error("Request cancelled")]
    Cancelled,
}

/// Fetch-bytes-by-URL capability
///
/// Implementations must stop waiting and return [`TransportError::Cancelled`]
/// as soon as `cancel` fires.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &str, cancel: &CancellationToken)
        -> Result<Vec<u8>, TransportError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `crawler` - Timeouts for requests and connections
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use site_mirror::config::Config;
/// use site_mirror::crawler::build_http_client;
///
/// let config = Config::default();
/// let client = build_http_client(&config.user_agent, &config.crawler).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `reqwest`-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a transport from the user agent and crawler settings
    pub fn from_config(
        user_agent: &UserAgentConfig,
        crawler: &CrawlerConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(user_agent, crawler)?))
    }

    async fn get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let response = self.client.get(url).send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        // Buffer the whole body before anything touches the disk
        let body = response.bytes().await.map_err(classify)?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, TransportError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TransportError::Cancelled),
            result = self.get(url) => result,
        }
    }
}

/// Maps a `reqwest` error onto the transport error taxonomy
fn classify(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else if let Some(status) = error.status() {
        TransportError::Status {
            status: status.as_u16(),
        }
    } else {
        TransportError::Network(error.to_string())
    }
}
