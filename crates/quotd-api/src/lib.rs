// HTTP client for the remote quote source
pub mod client;
pub mod retry;

pub use client::{QuoteApiError, QuoteClient, QuoteResponse};
pub use retry::RetryConfig;
