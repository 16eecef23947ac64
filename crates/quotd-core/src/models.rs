use quotd_api::QuoteResponse;
use quotd_cache::{CachedQuote, FavouriteQuote};
use serde::{Deserialize, Serialize};

/// A quote as the rest of the app sees it
///
/// Equality is the (text, author) pair; storage ids never leak out of here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

impl Quote {
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: author.into(),
        }
    }
}

impl std::fmt::Display for Quote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\" - {}", self.text, self.author)
    }
}

impl From<QuoteResponse> for Quote {
    fn from(response: QuoteResponse) -> Self {
        Self {
            text: response.q,
            author: response.a,
        }
    }
}

impl From<CachedQuote> for Quote {
    fn from(cached: CachedQuote) -> Self {
        Self {
            text: cached.text,
            author: cached.author,
        }
    }
}

impl From<FavouriteQuote> for Quote {
    fn from(favourite: FavouriteQuote) -> Self {
        Self {
            text: favourite.text,
            author: favourite.author,
        }
    }
}
