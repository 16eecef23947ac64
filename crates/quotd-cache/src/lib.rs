// SQLite-backed local storage
// Holds the current batch of cached quotes and the user's favourites

pub mod cache;
pub mod database;
pub mod error;
pub mod favourites;
pub mod models;
pub mod schema;

pub use database::QuoteDatabase;
pub use error::{CacheError, Result};
pub use models::{CachedQuote, FavouriteQuote};
