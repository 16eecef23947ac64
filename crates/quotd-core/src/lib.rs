// Core of quotd: the quote cursor/cache repository and the state controller
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod preferences;
pub mod repository;
pub mod source;

pub use config::Config;
pub use controller::{QuoteController, QuoteEvent, QuoteState};
pub use error::Error;
pub use models::Quote;
pub use preferences::{FilePreferences, MemoryPreferences, PositionStore};
pub use repository::{Cursor, QuoteRepository};
pub use source::{QuoteSource, ZenQuotesSource};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
