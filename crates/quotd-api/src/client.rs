use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::retry::{is_retryable_status, with_retry, RetryConfig};

const ZENQUOTES_API_BASE: &str = "https://zenquotes.io/api";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Error, Debug)]
pub enum QuoteApiError {
    #[error("API request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("API returned an empty response")]
    EmptyResponse,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    ParseError(#[from] serde_json::Error),
}

impl QuoteApiError {
    /// Whether another attempt could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            QuoteApiError::RateLimitExceeded | QuoteApiError::NetworkError(_) => true,
            QuoteApiError::RequestFailed { status, .. } => {
                reqwest::StatusCode::from_u16(*status)
                    .map(is_retryable_status)
                    .unwrap_or(false)
            }
            QuoteApiError::EmptyResponse | QuoteApiError::ParseError(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, QuoteApiError>;

/// A quote as served by the ZenQuotes API.
///
/// The API uses single-letter keys (`q` for the text, `a` for the author) and
/// sends extra fields such as pre-rendered HTML, which we ignore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub q: String,
    pub a: String,
}

pub struct QuoteClient {
    client: reqwest::Client,
    base_url: String,
    retry_config: RetryConfig,
}

impl QuoteClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(ZENQUOTES_API_BASE)
    }

    /// Point the client at another ZenQuotes-compatible server
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Self::with_options(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_options(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("quotd/0.1.0"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry_config: RetryConfig::default(),
        })
    }

    /// Replace the retry configuration
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch a batch of random quotes (`GET /quotes`)
    pub async fn random_quotes(&self) -> Result<Vec<QuoteResponse>> {
        self.get_quotes("quotes").await
    }

    /// Fetch the quote of the day (`GET /today`)
    ///
    /// The endpoint answers with a one-element list.
    pub async fn today_quote(&self) -> Result<Vec<QuoteResponse>> {
        self.get_quotes("today").await
    }

    async fn get_quotes(&self, endpoint: &str) -> Result<Vec<QuoteResponse>> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let url = url.as_str();
        let client = &self.client;

        with_retry(&self.retry_config, QuoteApiError::is_transient, || async move {
            debug!("GET {}", url);
            let response = client.get(url).send().await?;
            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(QuoteApiError::RateLimitExceeded);
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(QuoteApiError::RequestFailed {
                    status: status.as_u16(),
                    body,
                });
            }

            let body = response.text().await?;
            if body.trim().is_empty() {
                return Err(QuoteApiError::EmptyResponse);
            }

            let quotes: Option<Vec<QuoteResponse>> = serde_json::from_str(&body)?;
            match quotes {
                Some(quotes) if !quotes.is_empty() => {
                    debug!("{} returned {} quotes", endpoint, quotes.len());
                    Ok(quotes)
                }
                _ => Err(QuoteApiError::EmptyResponse),
            }
        })
        .await
    }
}
