// Presentation state controller - turns repository results into UI state
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{models::Quote, repository::QuoteRepository};

/// Everything a UI needs to draw the quote screens
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteState {
    pub quote: Option<Quote>,
    pub today_quote: Option<Quote>,
    pub favourites: Vec<Quote>,
    pub is_loading: bool,
    /// Last forward-navigation or refresh failure
    pub error_message: Option<String>,
    /// Last backward-navigation failure
    pub navigation_error: Option<String>,
    pub can_navigate_to_previous: bool,
}

impl QuoteState {
    pub fn is_current_favourite(&self) -> bool {
        self.quote
            .as_ref()
            .map(|q| self.favourites.contains(q))
            .unwrap_or(false)
    }
}

/// Things the UI can ask for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteEvent {
    FetchNextQuote,
    FetchPreviousQuote,
    ForceRefreshAndGetQuote,
    FetchTodayQuote,
    AddToFavourites(Quote),
    RemoveFromFavourites(Quote),
    ToggleFavourite(Quote),
}

/// Owns the observable `QuoteState` and applies events to it
///
/// Cloning is cheap; clones share the same state channel.
#[derive(Clone)]
pub struct QuoteController {
    repository: Arc<QuoteRepository>,
    state: Arc<watch::Sender<QuoteState>>,
}

impl QuoteController {
    pub fn new(repository: Arc<QuoteRepository>) -> Self {
        let initial = QuoteState {
            favourites: repository.subscribe_favourites().borrow().clone(),
            ..QuoteState::default()
        };
        let (state, _) = watch::channel(initial);

        Self {
            repository,
            state: Arc::new(state),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<QuoteState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> QuoteState {
        self.state.borrow().clone()
    }

    /// Mirror the repository's favourites into the state until the repository goes away
    pub fn observe_favourites(&self) -> JoinHandle<()> {
        let stream = self.repository.favourites_stream();
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            let mut stream = Box::pin(stream);
            while let Some(favourites) = stream.next().await {
                state.send_modify(|s| s.favourites = favourites);
            }
            debug!("Favourites stream closed");
        })
    }

    /// Process events one at a time until every sender is dropped
    pub async fn run(self, mut events: mpsc::Receiver<QuoteEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }
        debug!("Event channel closed, controller stopping");
    }

    /// Single intake point for UI events
    pub async fn handle(&self, event: QuoteEvent) {
        debug!("Handling {:?}", event);
        match event {
            QuoteEvent::FetchNextQuote => self.fetch_next_quote().await,
            QuoteEvent::FetchPreviousQuote => self.fetch_previous_quote().await,
            QuoteEvent::ForceRefreshAndGetQuote => self.force_refresh_and_get_quote().await,
            QuoteEvent::FetchTodayQuote => self.fetch_today_quote().await,
            QuoteEvent::AddToFavourites(quote) => self.add_to_favourites(&quote).await,
            QuoteEvent::RemoveFromFavourites(quote) => self.remove_from_favourites(&quote).await,
            QuoteEvent::ToggleFavourite(quote) => self.toggle_favourite(&quote).await,
        }
    }

    async fn fetch_next_quote(&self) {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error_message = None;
        });

        let result = self.repository.get_next_quote().await;
        let can_go_back = self.repository.can_navigate_to_previous_quote().await;

        self.state.send_modify(|s| {
            match result {
                Ok(quote) => s.quote = Some(quote),
                Err(e) => {
                    warn!("Fetching next quote failed: {}", e);
                    s.error_message = Some(e.to_string());
                }
            }
            s.can_navigate_to_previous = can_go_back;
            s.is_loading = false;
        });
    }

    async fn fetch_previous_quote(&self) {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.navigation_error = None;
        });

        let result = self.repository.get_previous_quote().await;
        let can_go_back = self.repository.can_navigate_to_previous_quote().await;

        self.state.send_modify(|s| {
            match result {
                Ok(quote) => s.quote = Some(quote),
                Err(e) => s.navigation_error = Some(e.to_string()),
            }
            s.can_navigate_to_previous = can_go_back;
            s.is_loading = false;
        });
    }

    async fn force_refresh_and_get_quote(&self) {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error_message = None;
        });

        if self.repository.force_refresh_cache().await {
            self.fetch_next_quote().await;
        } else {
            let can_go_back = self.repository.can_navigate_to_previous_quote().await;
            self.state.send_modify(|s| {
                s.error_message = Some("Failed to refresh quotes".to_string());
                s.can_navigate_to_previous = can_go_back;
                s.is_loading = false;
            });
        }
    }

    async fn fetch_today_quote(&self) {
        match self.repository.get_today_quote().await {
            Ok(quote) => self.state.send_modify(|s| s.today_quote = Some(quote)),
            Err(e) => {
                warn!("Fetching today's quote failed: {}", e);
                self.state
                    .send_modify(|s| s.error_message = Some(e.to_string()));
            }
        }
    }

    async fn add_to_favourites(&self, quote: &Quote) {
        if let Err(e) = self.repository.add_favourite(&quote.text, &quote.author).await {
            self.report_favourite_error(e);
        }
    }

    async fn remove_from_favourites(&self, quote: &Quote) {
        if let Err(e) = self
            .repository
            .remove_favourite(&quote.text, &quote.author)
            .await
        {
            self.report_favourite_error(e);
        }
    }

    async fn toggle_favourite(&self, quote: &Quote) {
        match self.repository.is_favourite(&quote.text, &quote.author).await {
            Ok(true) => self.remove_from_favourites(quote).await,
            Ok(false) => self.add_to_favourites(quote).await,
            Err(e) => self.report_favourite_error(e),
        }
    }

    fn report_favourite_error(&self, e: crate::Error) {
        warn!("Favourite update failed: {}", e);
        self.state
            .send_modify(|s| s.error_message = Some(e.to_string()));
    }
}
