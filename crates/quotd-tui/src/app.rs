// TUI view state and key handling
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use quotd_core::{Quote, QuoteEvent, QuoteState};
use ratatui::widgets::ListState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,       // Current quote with previous/next
    Favourites, // Saved quotes
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Home => "Home",
            Tab::Favourites => "Favourites",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Home => 0,
            Tab::Favourites => 1,
        }
    }
}

/// State that only matters to the terminal front end
///
/// Quote data lives in `QuoteState`, owned by the controller. This struct
/// only tracks what is on screen.
pub struct App {
    pub should_quit: bool,
    pub tab: Tab,
    pub show_help: bool,
    pub show_today_quote: bool,
    pub favourites_list: ListState,
}

impl App {
    pub fn new(show_today_quote: bool) -> Self {
        let mut favourites_list = ListState::default();
        favourites_list.select(Some(0));

        Self {
            should_quit: false,
            tab: Tab::Home,
            show_help: false,
            show_today_quote,
            favourites_list,
        }
    }

    pub fn toggle_tab(&mut self) {
        self.tab = match self.tab {
            Tab::Home => Tab::Favourites,
            Tab::Favourites => Tab::Home,
        };
    }

    /// Map a key press to a controller event, updating local view state on the way
    pub fn handle_key(&mut self, key: KeyEvent, state: &QuoteState) -> Option<QuoteEvent> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return None;
        }

        if self.show_help {
            // Any key closes the help popup
            self.show_help = false;
            return None;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                None
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                None
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.toggle_tab();
                None
            }
            _ => match self.tab {
                Tab::Home => self.handle_home_key(key.code, state),
                Tab::Favourites => self.handle_favourites_key(key.code, state),
            },
        }
    }

    fn handle_home_key(&mut self, code: KeyCode, state: &QuoteState) -> Option<QuoteEvent> {
        match code {
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') | KeyCode::Char(' ') => {
                Some(QuoteEvent::FetchNextQuote)
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => {
                Some(QuoteEvent::FetchPreviousQuote)
            }
            KeyCode::Char('r') => Some(QuoteEvent::ForceRefreshAndGetQuote),
            KeyCode::Char('t') => Some(QuoteEvent::FetchTodayQuote),
            KeyCode::Char('f') => state.quote.clone().map(QuoteEvent::ToggleFavourite),
            _ => None,
        }
    }

    fn handle_favourites_key(&mut self, code: KeyCode, state: &QuoteState) -> Option<QuoteEvent> {
        let len = state.favourites.len();
        match code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.next_favourite(len);
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.previous_favourite(len);
                None
            }
            KeyCode::Char('d') | KeyCode::Delete => self
                .selected_favourite(state)
                .cloned()
                .map(QuoteEvent::RemoveFromFavourites),
            _ => None,
        }
    }

    pub fn selected_favourite<'a>(&self, state: &'a QuoteState) -> Option<&'a Quote> {
        self.favourites_list
            .selected()
            .and_then(|i| state.favourites.get(i))
    }

    fn next_favourite(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let next = match self.favourites_list.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.favourites_list.select(Some(next));
    }

    fn previous_favourite(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let previous = match self.favourites_list.selected() {
            Some(0) | None => len - 1,
            Some(i) => (i - 1).min(len - 1),
        };
        self.favourites_list.select(Some(previous));
    }

    /// Keep the selection inside the list after favourites change
    pub fn clamp_selection(&mut self, len: usize) {
        match self.favourites_list.selected() {
            Some(i) if len > 0 && i >= len => self.favourites_list.select(Some(len - 1)),
            None if len > 0 => self.favourites_list.select(Some(0)),
            _ => {}
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(true)
    }
}
