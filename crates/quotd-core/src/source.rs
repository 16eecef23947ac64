use async_trait::async_trait;
use quotd_api::{QuoteClient, RetryConfig};
use std::time::Duration;

use crate::{config::ApiConfig, models::Quote, Result};

/// Where quotes come from
///
/// The repository only talks to this trait, so tests can hand it a mock
/// instead of a live HTTP server.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// A batch of random quotes, in server order
    async fn random_quotes(&self) -> Result<Vec<Quote>>;
    /// The quote of the day, as a (normally one-element) list
    async fn today_quote(&self) -> Result<Vec<Quote>>;
}

/// `QuoteSource` backed by the ZenQuotes HTTP API
pub struct ZenQuotesSource {
    client: QuoteClient,
}

impl ZenQuotesSource {
    pub fn new(client: QuoteClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let client = QuoteClient::with_options(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )?
        .with_retry_config(
            RetryConfig::default()
                .with_max_retries(config.max_retries)
                .with_initial_delay_ms(config.initial_delay_ms),
        );

        Ok(Self::new(client))
    }
}

#[async_trait]
impl QuoteSource for ZenQuotesSource {
    async fn random_quotes(&self) -> Result<Vec<Quote>> {
        let quotes = self.client.random_quotes().await?;
        Ok(quotes.into_iter().map(Quote::from).collect())
    }

    async fn today_quote(&self) -> Result<Vec<Quote>> {
        let quotes = self.client.today_quote().await?;
        Ok(quotes.into_iter().map(Quote::from).collect())
    }
}
