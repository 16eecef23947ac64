// Quote repository - cached batch, position cursor, favourites
use chrono::{DateTime, Duration, Utc};
use futures::Stream;
use quotd_cache::QuoteDatabase;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    models::Quote,
    preferences::{FilePreferences, PositionStore},
    source::{QuoteSource, ZenQuotesSource},
    Error, Result,
};

/// Where the user is within the cached batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Index of the quote currently shown. `None` until the first navigation
    /// after a cold start; `Some(-1)` means "before the first quote".
    pub position: Option<i64>,
    /// Bumped on every successful refresh
    pub batch_id: u64,
    /// True until the cursor moves within a freshly loaded batch
    pub is_new_batch: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            position: None,
            batch_id: 0,
            is_new_batch: true,
        }
    }
}

impl Cursor {
    pub fn can_navigate_to_previous(&self) -> bool {
        matches!(self.position, Some(p) if p > 0) && !self.is_new_batch
    }

    fn start_new_batch(&mut self) {
        self.position = Some(-1);
        self.batch_id += 1;
        self.is_new_batch = true;
    }
}

struct RepositoryState {
    db: QuoteDatabase,
    cursor: Cursor,
}

/// Bidirectional access to a locally cached batch of quotes
///
/// The batch is refreshed from the remote source when it is empty, older than
/// the expiration, or exhausted. All state lives behind one async mutex, so
/// concurrent callers are served one at a time and never see a half-moved
/// cursor.
pub struct QuoteRepository {
    source: Arc<dyn QuoteSource>,
    positions: Arc<dyn PositionStore>,
    state: Mutex<RepositoryState>,
    favourites: watch::Sender<Vec<Quote>>,
    expiration: Duration,
}

impl QuoteRepository {
    pub const DEFAULT_EXPIRATION_HOURS: i64 = 24;

    pub fn new(
        source: Arc<dyn QuoteSource>,
        db: QuoteDatabase,
        positions: Arc<dyn PositionStore>,
    ) -> Result<Self> {
        let initial: Vec<Quote> = db.favourites()?.into_iter().map(Quote::from).collect();
        let (favourites, _) = watch::channel(initial);

        Ok(Self {
            source,
            positions,
            state: Mutex::new(RepositoryState {
                db,
                cursor: Cursor::default(),
            }),
            favourites,
            expiration: Duration::hours(Self::DEFAULT_EXPIRATION_HOURS),
        })
    }

    /// Wire up the live stack: ZenQuotes source, on-disk database and preferences
    pub fn open(config: &Config) -> Result<Self> {
        let source = ZenQuotesSource::from_config(&config.api)?;
        let db = QuoteDatabase::open(&config.database_path()?)?;
        let positions = FilePreferences::new(config.preferences_path()?);

        Ok(Self::new(Arc::new(source), db, Arc::new(positions))?
            .with_expiration(config.cache.expiration()?))
    }

    /// Maximum age of a cached batch before it is refetched
    pub fn with_expiration(mut self, expiration: Duration) -> Self {
        self.expiration = expiration;
        self
    }

    /// Next quote of the batch, refreshing the cache when needed.
    ///
    /// Refreshes when the cache is empty, stale, or the cursor sits on the
    /// last quote. On cold start the persisted position is restored if it
    /// still points inside the batch.
    pub async fn get_next_quote(&self) -> Result<Quote> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let count = state.db.cached_quote_count()? as i64;
        let oldest = state.db.oldest_cache_timestamp()?;

        // A new batch is committed right away; every other cursor change stays
        // tentative until the quote has been read and the position saved.
        let mut cursor = state.cursor;
        if count == 0 || self.is_expired(oldest, Utc::now()) {
            info!("Cache is expired or empty, refreshing");
            self.refresh_batch(state).await?;
            state.cursor.start_new_batch();
            cursor = state.cursor;
        } else {
            let position = match cursor.position {
                Some(position) => position,
                None => {
                    let restored = self.restore_position(count)?;
                    debug!("Restored cursor position {}", restored);
                    cursor.position = Some(restored);
                    restored
                }
            };

            if position >= count - 1 {
                info!("Cache exhausted at position {}, refreshing", position);
                self.refresh_batch(state).await?;
                state.cursor.start_new_batch();
                cursor = state.cursor;
            } else {
                cursor.is_new_batch = false;
            }
        }

        let next = cursor.position.unwrap_or(-1) + 1;
        cursor.position = Some(next);

        let quote = state
            .db
            .quote_at_position(next)?
            .ok_or(Error::NotFound(next))?;

        self.positions.save_position(next)?;
        state.cursor = cursor;

        debug!("Showing quote {} of batch {}", next, cursor.batch_id);
        Ok(quote.into())
    }

    /// Step back one quote within the current batch. Never hits the network.
    pub async fn get_previous_quote(&self) -> Result<Quote> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let current = match state.cursor.position {
            Some(position) if state.cursor.can_navigate_to_previous() => position,
            _ => return Err(Error::NoPreviousQuote),
        };
        let previous = current - 1;

        let quote = match state.db.quote_at_position(previous) {
            Ok(Some(quote)) => quote,
            Ok(None) => {
                warn!("Cache has no quote at position {}", previous);
                return Err(Error::ReadFailed(previous));
            }
            Err(e) => {
                warn!("Failed to read cached quote at {}: {}", previous, e);
                return Err(Error::ReadFailed(previous));
            }
        };

        self.positions.save_position(previous)?;
        state.cursor.position = Some(previous);

        Ok(quote.into())
    }

    pub async fn can_navigate_to_previous_quote(&self) -> bool {
        self.state.lock().await.cursor.can_navigate_to_previous()
    }

    /// Replace the cached batch no matter its age and rewind the cursor.
    ///
    /// Returns whether the new batch could be stored.
    pub async fn force_refresh_cache(&self) -> bool {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        match self.refresh_batch(state).await {
            Ok(_) => {
                state.cursor.start_new_batch();
                if let Err(e) = self.positions.save_position(-1) {
                    warn!("Failed to persist cursor reset: {}", e);
                }
                true
            }
            Err(e) => {
                warn!("Forced refresh failed: {}", e);
                false
            }
        }
    }

    /// Quote of the day, straight from the remote source
    pub async fn get_today_quote(&self) -> Result<Quote> {
        self.source
            .today_quote()
            .await?
            .into_iter()
            .next()
            .ok_or(Error::EmptyResponse)
    }

    /// The cached batch in position order
    pub async fn cached_quotes(&self) -> Result<Vec<Quote>> {
        let state = self.state.lock().await;
        Ok(state
            .db
            .cached_quotes()?
            .into_iter()
            .map(Quote::from)
            .collect())
    }

    pub async fn cursor(&self) -> Cursor {
        self.state.lock().await.cursor
    }

    /// Position last written to the position store, as a new process would restore it
    pub fn saved_position(&self) -> Result<Option<i64>> {
        self.positions.load_position()
    }

    pub async fn batch_id(&self) -> u64 {
        self.state.lock().await.cursor.batch_id
    }

    pub async fn add_favourite(&self, text: &str, author: &str) -> Result<()> {
        let state = self.state.lock().await;
        if state.db.insert_favourite(text, author)? {
            debug!("Added favourite by {}", author);
            self.publish_favourites(&state.db)?;
        }
        Ok(())
    }

    pub async fn remove_favourite(&self, text: &str, author: &str) -> Result<()> {
        let state = self.state.lock().await;
        if state.db.delete_favourite(text, author)? > 0 {
            debug!("Removed favourite by {}", author);
            self.publish_favourites(&state.db)?;
        }
        Ok(())
    }

    pub async fn is_favourite(&self, text: &str, author: &str) -> Result<bool> {
        let state = self.state.lock().await;
        Ok(state.db.is_favourite(text, author)?)
    }

    /// Live view of the favourites, newest first.
    ///
    /// Every subscriber gets the current list straight away, then a new list
    /// after each change. The stream ends when the repository is dropped.
    pub fn favourites_stream(&self) -> impl Stream<Item = Vec<Quote>> + Send + 'static {
        let receiver = self.favourites.subscribe();

        futures::stream::unfold((receiver, true), |(mut receiver, first)| async move {
            if !first && receiver.changed().await.is_err() {
                return None;
            }
            let snapshot = receiver.borrow_and_update().clone();
            Some((snapshot, (receiver, false)))
        })
    }

    /// The underlying watch channel, for callers that want the latest value only
    pub fn subscribe_favourites(&self) -> watch::Receiver<Vec<Quote>> {
        self.favourites.subscribe()
    }

    fn publish_favourites(&self, db: &QuoteDatabase) -> Result<()> {
        let favourites = db.favourites()?.into_iter().map(Quote::from).collect();
        self.favourites.send_replace(favourites);
        Ok(())
    }

    fn is_expired(&self, oldest: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match oldest {
            Some(fetched_at) => now - fetched_at > self.expiration,
            None => true,
        }
    }

    /// Persisted position if it lies inside the batch, otherwise the batch start.
    ///
    /// A position on the last quote is kept, so the next step refreshes.
    fn restore_position(&self, count: i64) -> Result<i64> {
        match self.positions.load_position()? {
            Some(position) if (-1..count).contains(&position) => Ok(position),
            Some(position) => {
                debug!(
                    "Ignoring persisted position {} for a batch of {}",
                    position, count
                );
                Ok(-1)
            }
            None => Ok(-1),
        }
    }

    /// Fetch a new batch and swap it into the cache.
    ///
    /// Nothing is touched until the remote call returns, so dropping this
    /// future mid-request leaves cache and cursor as they were. A failed fetch
    /// leaves the cache empty.
    async fn refresh_batch(&self, state: &mut RepositoryState) -> Result<usize> {
        let quotes = match self.source.random_quotes().await {
            Ok(quotes) if !quotes.is_empty() => quotes,
            Ok(_) => {
                warn!("Quote source returned an empty batch");
                Self::clear_after_failure(&state.db);
                return Err(Error::RefreshFailed(Error::EmptyResponse.to_string()));
            }
            Err(e) => {
                warn!("Error refreshing quote cache: {}", e);
                Self::clear_after_failure(&state.db);
                return Err(Error::RefreshFailed(e.to_string()));
            }
        };

        let inserted = state
            .db
            .replace_cached_quotes(
                quotes.iter().map(|q| (q.text.as_str(), q.author.as_str())),
                Utc::now(),
            )
            .map_err(|e| Error::RefreshFailed(e.to_string()))?;

        info!("Cached new batch of {} quotes", inserted);
        Ok(inserted)
    }

    fn clear_after_failure(db: &QuoteDatabase) {
        if let Err(e) = db.clear_cache() {
            warn!("Failed to clear quote cache: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::MemoryPreferences;
    use crate::source::MockQuoteSource;
    use futures::StreamExt;
    use std::collections::VecDeque;
    use crate::config::ApiConfig;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn batch(prefix: &str, n: usize) -> Vec<Quote> {
        (0..n)
            .map(|i| Quote::new(format!("{prefix} quote {i}"), format!("{prefix} author {i}")))
            .collect()
    }

    /// Source that serves the given batches in order, one per call
    fn source_with_batches(batches: Vec<Vec<Quote>>) -> MockQuoteSource {
        let expected = batches.len();
        let mut queue: VecDeque<Vec<Quote>> = batches.into();
        let mut source = MockQuoteSource::new();
        source
            .expect_random_quotes()
            .times(expected)
            .returning(move || Ok(queue.pop_front().unwrap_or_default()));
        source
    }

    fn cached_db(quotes: &[Quote], fetched_at: DateTime<Utc>) -> QuoteDatabase {
        let mut db = QuoteDatabase::open_in_memory().unwrap();
        db.replace_cached_quotes(
            quotes.iter().map(|q| (q.text.as_str(), q.author.as_str())),
            fetched_at,
        )
        .unwrap();
        db
    }

    fn repository_with(
        source: MockQuoteSource,
        db: QuoteDatabase,
        positions: Arc<MemoryPreferences>,
    ) -> QuoteRepository {
        QuoteRepository::new(Arc::new(source), db, positions).unwrap()
    }

    fn repository(source: MockQuoteSource) -> QuoteRepository {
        repository_with(
            source,
            QuoteDatabase::open_in_memory().unwrap(),
            Arc::new(MemoryPreferences::new()),
        )
    }

    #[tokio::test]
    async fn test_empty_cache_triggers_refresh() {
        let source = source_with_batches(vec![vec![Quote::new("A", "X")]]);
        let repo = repository(source);

        let quote = repo.get_next_quote().await.unwrap();

        assert_eq!(quote, Quote::new("A", "X"));
        assert_eq!(repo.cached_quotes().await.unwrap(), vec![Quote::new("A", "X")]);
        assert_eq!(repo.cursor().await.position, Some(0));
    }

    #[tokio::test]
    async fn test_failed_refresh_leaves_cache_empty() {
        let mut source = MockQuoteSource::new();
        source
            .expect_random_quotes()
            .times(1)
            .returning(|| Err(Error::NetworkError("API request failed with status 500".into())));
        let repo = repository(source);

        let err = repo.get_next_quote().await.unwrap_err();

        assert!(matches!(err, Error::RefreshFailed(_)));
        assert!(repo.cached_quotes().await.unwrap().is_empty());
        assert_eq!(repo.batch_id().await, 0);
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_refresh_failure() {
        let source = source_with_batches(vec![vec![]]);
        let repo = repository(source);

        let err = repo.get_next_quote().await.unwrap_err();
        assert!(matches!(err, Error::RefreshFailed(_)));
    }

    #[tokio::test]
    async fn test_walks_batch_in_order_then_refreshes() {
        let first = batch("first", 3);
        let second = batch("second", 3);
        let source = source_with_batches(vec![first.clone(), second.clone()]);
        let repo = repository(source);

        for expected in &first {
            assert_eq!(&repo.get_next_quote().await.unwrap(), expected);
        }
        assert_eq!(repo.batch_id().await, 1);

        // N+1th call moves on to a fresh batch
        assert_eq!(repo.get_next_quote().await.unwrap(), second[0]);
        assert_eq!(repo.batch_id().await, 2);
        assert!(!repo.can_navigate_to_previous_quote().await);
    }

    #[tokio::test]
    async fn test_fresh_cache_is_not_refetched() {
        let quotes = batch("cached", 3);
        let db = cached_db(&quotes, Utc::now());
        let repo = repository_with(
            source_with_batches(vec![]),
            db,
            Arc::new(MemoryPreferences::new()),
        );

        assert_eq!(repo.get_next_quote().await.unwrap(), quotes[0]);
        assert_eq!(repo.get_next_quote().await.unwrap(), quotes[1]);
        assert_eq!(repo.get_next_quote().await.unwrap(), quotes[2]);
    }

    #[tokio::test]
    async fn test_stale_cache_is_refreshed() {
        let stale = batch("stale", 3);
        let fresh = batch("fresh", 2);
        let db = cached_db(&stale, Utc::now() - Duration::hours(25));
        let repo = repository_with(
            source_with_batches(vec![fresh.clone()]),
            db,
            Arc::new(MemoryPreferences::new()),
        );

        assert_eq!(repo.get_next_quote().await.unwrap(), fresh[0]);
        assert_eq!(repo.cached_quotes().await.unwrap(), fresh);
    }

    #[tokio::test]
    async fn test_custom_expiration() {
        let stale = batch("stale", 3);
        let fresh = batch("fresh", 1);
        let db = cached_db(&stale, Utc::now() - Duration::minutes(90));
        let repo = repository_with(
            source_with_batches(vec![fresh.clone()]),
            db,
            Arc::new(MemoryPreferences::new()),
        )
        .with_expiration(Duration::hours(1));

        assert_eq!(repo.get_next_quote().await.unwrap(), fresh[0]);
    }

    #[tokio::test]
    async fn test_three_quote_navigation_scenario() {
        let quotes = batch("nav", 3);
        let db = cached_db(&quotes, Utc::now());
        let repo = repository_with(
            source_with_batches(vec![]),
            db,
            Arc::new(MemoryPreferences::new()),
        );

        assert_eq!(repo.get_next_quote().await.unwrap(), quotes[0]);
        assert!(!repo.can_navigate_to_previous_quote().await);

        assert_eq!(repo.get_next_quote().await.unwrap(), quotes[1]);
        assert!(repo.can_navigate_to_previous_quote().await);

        assert_eq!(repo.get_previous_quote().await.unwrap(), quotes[0]);
        assert!(!repo.can_navigate_to_previous_quote().await);
    }

    #[tokio::test]
    async fn test_previous_right_after_refresh_fails_without_moving() {
        let quotes = batch("b", 3);
        let source = source_with_batches(vec![quotes.clone(), batch("c", 3)]);
        let repo = repository(source);

        repo.get_next_quote().await.unwrap();
        repo.get_next_quote().await.unwrap();
        assert!(repo.force_refresh_cache().await);

        let before = repo.cursor().await;
        let err = repo.get_previous_quote().await.unwrap_err();

        assert!(matches!(err, Error::NoPreviousQuote));
        assert_eq!(repo.cursor().await, before);
    }

    #[tokio::test]
    async fn test_force_refresh_restarts_at_first_quote() {
        let fresh = batch("fresh", 4);
        let source = source_with_batches(vec![batch("old", 4), fresh.clone()]);
        let positions = Arc::new(MemoryPreferences::new());
        let repo = repository_with(source, QuoteDatabase::open_in_memory().unwrap(), positions.clone());

        repo.get_next_quote().await.unwrap();
        repo.get_next_quote().await.unwrap();
        repo.get_next_quote().await.unwrap();

        assert!(repo.force_refresh_cache().await);
        assert_eq!(positions.load_position().unwrap(), Some(-1));
        assert_eq!(repo.batch_id().await, 2);

        assert_eq!(repo.get_next_quote().await.unwrap(), fresh[0]);
    }

    #[tokio::test]
    async fn test_failed_force_refresh_reports_false() {
        let mut source = MockQuoteSource::new();
        source
            .expect_random_quotes()
            .returning(|| Err(Error::NetworkError("offline".into())));
        let quotes = batch("kept", 2);
        let repo = repository_with(
            source,
            cached_db(&quotes, Utc::now()),
            Arc::new(MemoryPreferences::new()),
        );

        assert!(!repo.force_refresh_cache().await);
        assert_eq!(repo.batch_id().await, 0);
        assert!(repo.cached_quotes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_navigation_persists_position() {
        let quotes = batch("p", 3);
        let positions = Arc::new(MemoryPreferences::new());
        let repo = repository_with(
            source_with_batches(vec![]),
            cached_db(&quotes, Utc::now()),
            positions.clone(),
        );

        repo.get_next_quote().await.unwrap();
        repo.get_next_quote().await.unwrap();
        assert_eq!(positions.load_position().unwrap(), Some(1));

        repo.get_previous_quote().await.unwrap();
        assert_eq!(positions.load_position().unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_cold_start_resumes_after_persisted_position() {
        let quotes = batch("resume", 4);
        let repo = repository_with(
            source_with_batches(vec![]),
            cached_db(&quotes, Utc::now()),
            Arc::new(MemoryPreferences::with_position(1)),
        );

        assert_eq!(repo.get_next_quote().await.unwrap(), quotes[2]);
        assert!(repo.can_navigate_to_previous_quote().await);
    }

    #[tokio::test]
    async fn test_out_of_range_persisted_position_is_ignored() {
        let quotes = batch("resume", 3);
        for saved in [3, 9, -2] {
            let repo = repository_with(
                source_with_batches(vec![]),
                cached_db(&quotes, Utc::now()),
                Arc::new(MemoryPreferences::with_position(saved)),
            );

            assert_eq!(repo.get_next_quote().await.unwrap(), quotes[0], "saved {saved}");
        }
    }

    #[tokio::test]
    async fn test_persisted_position_on_last_quote_refreshes() {
        let read = batch("read", 3);
        let fresh = batch("fresh", 2);
        let positions = Arc::new(MemoryPreferences::with_position(2));
        let repo = repository_with(
            source_with_batches(vec![fresh.clone()]),
            cached_db(&read, Utc::now()),
            positions.clone(),
        );

        assert_eq!(repo.get_next_quote().await.unwrap(), fresh[0]);
        assert_eq!(repo.batch_id().await, 1);
        assert_eq!(positions.load_position().unwrap(), Some(0));
        assert!(!repo.can_navigate_to_previous_quote().await);
    }

    #[tokio::test]
    async fn test_saved_position_reflects_store() {
        let quotes = batch("saved", 3);
        let repo = repository_with(
            source_with_batches(vec![]),
            cached_db(&quotes, Utc::now()),
            Arc::new(MemoryPreferences::with_position(1)),
        );

        assert_eq!(repo.cursor().await.position, None);
        assert_eq!(repo.saved_position().unwrap(), Some(1));

        repo.get_next_quote().await.unwrap();
        assert_eq!(repo.saved_position().unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_persisted_position_before_first_quote_is_kept() {
        let quotes = batch("resume", 3);
        let repo = repository_with(
            source_with_batches(vec![]),
            cached_db(&quotes, Utc::now()),
            Arc::new(MemoryPreferences::with_position(-1)),
        );

        assert_eq!(repo.get_next_quote().await.unwrap(), quotes[0]);
    }

    #[tokio::test]
    async fn test_http_error_from_zenquotes_clears_stale_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quotes"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let config = ApiConfig {
            base_url: server.uri(),
            ..ApiConfig::default()
        };
        let source = ZenQuotesSource::from_config(&config).unwrap();
        let repo = QuoteRepository::new(
            Arc::new(source),
            cached_db(&batch("stale", 3), Utc::now() - Duration::hours(48)),
            Arc::new(MemoryPreferences::new()),
        )
        .unwrap();

        let err = repo.get_next_quote().await.unwrap_err();

        match err {
            Error::RefreshFailed(message) => assert!(message.contains("500"), "{message}"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(repo.cached_quotes().await.unwrap().is_empty());
        assert_eq!(repo.cursor().await, Cursor::default());
    }

    #[tokio::test]
    async fn test_previous_rolls_back_when_cache_is_inconsistent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("quotes.db");
        let quotes = batch("r", 3);
        {
            let mut db = QuoteDatabase::open(&path).unwrap();
            db.replace_cached_quotes(
                quotes.iter().map(|q| (q.text.as_str(), q.author.as_str())),
                Utc::now(),
            )
            .unwrap();
        }

        let positions = Arc::new(MemoryPreferences::new());
        let repo = repository_with(
            source_with_batches(vec![]),
            QuoteDatabase::open(&path).unwrap(),
            positions.clone(),
        );
        for _ in 0..3 {
            repo.get_next_quote().await.unwrap();
        }
        let before = repo.cursor().await;

        // Another writer shrinks the batch behind the repository's back
        let mut other = QuoteDatabase::open(&path).unwrap();
        other
            .replace_cached_quotes(vec![("lonely", "quote")], Utc::now())
            .unwrap();

        let err = repo.get_previous_quote().await.unwrap_err();

        assert!(matches!(err, Error::ReadFailed(1)));
        assert_eq!(repo.cursor().await, before);
        assert_eq!(positions.load_position().unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_serialized() {
        let quotes = batch("c", 5);
        let repo = Arc::new(repository_with(
            source_with_batches(vec![]),
            cached_db(&quotes, Utc::now()),
            Arc::new(MemoryPreferences::new()),
        ));

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.get_next_quote().await.unwrap() })
            })
            .collect();

        let mut seen = Vec::new();
        for handle in handles {
            seen.push(handle.await.unwrap());
        }
        seen.sort_by(|a, b| a.text.cmp(&b.text));

        assert_eq!(seen, quotes[..3].to_vec());
        assert_eq!(repo.cursor().await.position, Some(2));
    }

    #[tokio::test]
    async fn test_today_quote_takes_first_element() {
        let mut source = MockQuoteSource::new();
        source
            .expect_today_quote()
            .returning(|| Ok(vec![Quote::new("Today", "Sun"), Quote::new("Extra", "Moon")]));
        let repo = repository(source);

        assert_eq!(repo.get_today_quote().await.unwrap(), Quote::new("Today", "Sun"));
    }

    #[tokio::test]
    async fn test_today_quote_empty_list() {
        let mut source = MockQuoteSource::new();
        source.expect_today_quote().returning(|| Ok(vec![]));
        let repo = repository(source);

        assert!(matches!(
            repo.get_today_quote().await.unwrap_err(),
            Error::EmptyResponse
        ));
    }

    #[tokio::test]
    async fn test_favourites_are_idempotent() {
        let repo = repository(MockQuoteSource::new());

        repo.add_favourite("Be kind.", "Anon").await.unwrap();
        repo.add_favourite("Be kind.", "Anon").await.unwrap();
        assert!(repo.is_favourite("Be kind.", "Anon").await.unwrap());
        assert_eq!(repo.subscribe_favourites().borrow().len(), 1);

        repo.remove_favourite("Not there.", "Nobody").await.unwrap();
        repo.remove_favourite("Be kind.", "Anon").await.unwrap();
        repo.remove_favourite("Be kind.", "Anon").await.unwrap();
        assert!(!repo.is_favourite("Be kind.", "Anon").await.unwrap());
    }

    #[tokio::test]
    async fn test_favourites_stream_replays_snapshot_then_changes() {
        let repo = repository(MockQuoteSource::new());
        repo.add_favourite("one", "a").await.unwrap();

        let mut stream = Box::pin(repo.favourites_stream());
        assert_eq!(stream.next().await, Some(vec![Quote::new("one", "a")]));

        repo.add_favourite("two", "b").await.unwrap();
        assert_eq!(
            stream.next().await,
            Some(vec![Quote::new("two", "b"), Quote::new("one", "a")])
        );

        // A late subscriber starts from the current list
        let mut late = Box::pin(repo.favourites_stream());
        assert_eq!(late.next().await.map(|list| list.len()), Some(2));

        repo.remove_favourite("one", "a").await.unwrap();
        assert_eq!(stream.next().await, Some(vec![Quote::new("two", "b")]));
        assert_eq!(late.next().await, Some(vec![Quote::new("two", "b")]));
    }

    #[tokio::test]
    async fn test_favourites_stream_ends_with_repository() {
        let repo = repository(MockQuoteSource::new());
        let mut stream = Box::pin(repo.favourites_stream());
        assert_eq!(stream.next().await, Some(vec![]));

        drop(repo);
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn test_open_uses_configured_paths() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.cache.database_path = Some(temp.path().join("data").join("quotes.db"));
        config.cache.expiration_hours = 2;

        let repo = QuoteRepository::open(&config).unwrap();
        repo.add_favourite("Persisted.", "Disk").await.unwrap();

        assert!(temp.path().join("data").join("quotes.db").exists());
        assert_eq!(repo.expiration, Duration::hours(2));
        assert_eq!(repo.cursor().await, Cursor::default());
    }

    #[test]
    fn test_cursor_navigation_rule() {
        let mut cursor = Cursor::default();
        assert!(!cursor.can_navigate_to_previous());

        cursor.start_new_batch();
        cursor.position = Some(2);
        assert!(!cursor.can_navigate_to_previous());

        cursor.is_new_batch = false;
        assert!(cursor.can_navigate_to_previous());

        cursor.position = Some(0);
        assert!(!cursor.can_navigate_to_previous());
    }
}
