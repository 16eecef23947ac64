// TUI event loop and terminal management
use crate::App;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use quotd_core::{QuoteController, QuoteEvent};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Run the terminal UI until the user quits
///
/// The controller runs on its own task and receives events over a channel,
/// so a slow refresh never blocks input or redraws.
pub async fn run_tui(mut app: App, controller: QuoteController) -> anyhow::Result<()> {
    let (tx, rx) = mpsc::channel::<QuoteEvent>(32);
    let mut state_rx = controller.subscribe();
    let favourites_task = controller.observe_favourites();
    let controller_task = tokio::spawn(controller.run(rx));

    tx.send(QuoteEvent::FetchNextQuote).await?;
    if app.show_today_quote {
        tx.send(QuoteEvent::FetchTodayQuote).await?;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app, &mut state_rx, &tx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Closing the channel lets the controller finish its current event and stop
    drop(tx);
    favourites_task.abort();
    if let Err(e) = controller_task.await {
        warn!("Controller task ended abnormally: {}", e);
    }

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    state_rx: &mut tokio::sync::watch::Receiver<quotd_core::QuoteState>,
    tx: &mpsc::Sender<QuoteEvent>,
) -> anyhow::Result<()> {
    let mut events = EventStream::new();

    loop {
        let state = state_rx.borrow_and_update().clone();
        terminal.draw(|f| crate::ui::render(f, app, &state))?;

        if app.should_quit {
            return Ok(());
        }

        tokio::select! {
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if let Some(event) = app.handle_key(key, &state) {
                            tx.send(event).await?;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => {
                        debug!("Terminal event stream ended");
                        return Ok(());
                    }
                }
            }
            changed = state_rx.changed() => {
                if changed.is_err() {
                    debug!("Controller state channel closed");
                    return Ok(());
                }
            }
        }
    }
}
