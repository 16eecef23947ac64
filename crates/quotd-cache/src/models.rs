use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One quote of the currently cached batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedQuote {
    pub id: i64,
    pub text: String,
    pub author: String,
    /// Zero-based index within the batch, dense
    pub position: i64,
    pub fetched_at: DateTime<Utc>,
}

/// A quote the user marked as favourite
///
/// Identity is (text, author); `id` only orders entries by insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavouriteQuote {
    pub id: i64,
    pub text: String,
    pub author: String,
}
