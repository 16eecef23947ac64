// Rendering for the quote screens
use crate::{help_ui, App, Tab};
use quotd_core::{Quote, QuoteState};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

pub fn render(frame: &mut Frame, app: &mut App, state: &QuoteState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header(frame, app, state, chunks[0]);

    match app.tab {
        Tab::Home => render_home(frame, app, state, chunks[1]),
        Tab::Favourites => render_favourites(frame, app, state, chunks[1]),
    }

    render_status_bar(frame, app, state, chunks[2]);

    if app.show_help {
        help_ui::render_keybindings_help(frame, frame.area());
    }
}

fn render_header(frame: &mut Frame, app: &App, state: &QuoteState, area: Rect) {
    let favourites_title = format!("{} ({})", Tab::Favourites.title(), state.favourites.len());
    let titles = vec![
        Line::from(Tab::Home.title()),
        Line::from(favourites_title),
    ];

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    " quotd ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
        )
        .select(app.tab.index())
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn render_home(frame: &mut Frame, app: &App, state: &QuoteState, area: Rect) {
    let (today_area, quote_area) = if app.show_today_quote {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(3)])
            .split(area);
        (Some(chunks[0]), chunks[1])
    } else {
        (None, area)
    };

    if let Some(today_area) = today_area {
        let lines = match &state.today_quote {
            Some(quote) => quote_lines(quote, Color::Gray),
            None => vec![Line::from(Span::styled(
                "Loading quote of the day...",
                Style::default().fg(Color::DarkGray),
            ))],
        };
        let today = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Quote of the day "))
            .wrap(Wrap { trim: true });
        frame.render_widget(today, today_area);
    }

    let title = if state.is_current_favourite() {
        " ♥ Quote "
    } else {
        " Quote "
    };

    let mut lines = match &state.quote {
        Some(quote) => quote_lines(quote, Color::White),
        None if state.is_loading => vec![Line::from("Loading...")],
        None => vec![Line::from(Span::styled(
            "No quote yet. Press → to fetch one.",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    lines.push(Line::from(""));
    lines.push(navigation_hint(state));

    let quote = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(quote, quote_area);
}

fn quote_lines(quote: &Quote, color: Color) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            format!("\"{}\"", quote.text),
            Style::default().fg(color).add_modifier(Modifier::ITALIC),
        )),
        Line::from(Span::styled(
            format!("- {}", quote.author),
            Style::default().fg(Color::Yellow),
        )),
    ]
}

fn navigation_hint(state: &QuoteState) -> Line<'static> {
    let previous_style = if state.can_navigate_to_previous {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    Line::from(vec![
        Span::styled("← previous", previous_style),
        Span::raw("    "),
        Span::styled("next →", Style::default().fg(Color::Green)),
    ])
}

fn render_favourites(frame: &mut Frame, app: &mut App, state: &QuoteState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Favourites ");

    if state.favourites.is_empty() {
        let empty = Paragraph::new("No favourites yet. Press f on a quote to save it.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = state
        .favourites
        .iter()
        .map(|quote| {
            ListItem::new(vec![
                Line::from(Span::raw(format!("\"{}\"", quote.text))),
                Line::from(Span::styled(
                    format!("  - {}", quote.author),
                    Style::default().fg(Color::Yellow),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    app.clamp_selection(state.favourites.len());
    frame.render_stateful_widget(list, area, &mut app.favourites_list);
}

fn render_status_bar(frame: &mut Frame, app: &App, state: &QuoteState, area: Rect) {
    let status = if state.is_loading {
        Span::styled("Loading...", Style::default().fg(Color::Yellow))
    } else if let Some(error) = &state.error_message {
        Span::styled(error.clone(), Style::default().fg(Color::Red))
    } else if let Some(error) = &state.navigation_error {
        Span::styled(error.clone(), Style::default().fg(Color::Yellow))
    } else {
        match app.tab {
            Tab::Home => Span::raw("←/→: navigate | r: refresh | f: favourite | TAB: favourites | ?: help | q: quit"),
            Tab::Favourites => Span::raw("j/k: select | d: remove | TAB: home | ?: help | q: quit"),
        }
    };

    frame.render_widget(Paragraph::new(Line::from(status)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn draw(app: &mut App, state: &QuoteState) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| render(f, app, state)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn buffer_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut text = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_home_shows_current_quote() {
        let mut app = App::new(false);
        let state = QuoteState {
            quote: Some(Quote::new("Stay hungry.", "Steve Jobs")),
            ..QuoteState::default()
        };

        let text = buffer_text(&draw(&mut app, &state));
        assert!(text.contains("\"Stay hungry.\""));
        assert!(text.contains("- Steve Jobs"));
        assert!(!text.contains("Quote of the day"));
    }

    #[test]
    fn test_favourite_marker_and_today_quote() {
        let mut app = App::new(true);
        let quote = Quote::new("Stay hungry.", "Steve Jobs");
        let state = QuoteState {
            quote: Some(quote.clone()),
            today_quote: Some(Quote::new("Carpe diem.", "Horace")),
            favourites: vec![quote],
            ..QuoteState::default()
        };

        let text = buffer_text(&draw(&mut app, &state));
        assert!(text.contains("♥ Quote"));
        assert!(text.contains("Quote of the day"));
        assert!(text.contains("Carpe diem."));
        assert!(text.contains("Favourites (1)"));
    }

    #[test]
    fn test_status_bar_prefers_error_message() {
        let mut app = App::new(false);
        let state = QuoteState {
            error_message: Some("Failed to refresh quotes".into()),
            navigation_error: Some("No previous quote available".into()),
            ..QuoteState::default()
        };

        let text = buffer_text(&draw(&mut app, &state));
        assert!(text.contains("Failed to refresh quotes"));
        assert!(!text.contains("No previous quote available"));
    }

    #[test]
    fn test_favourites_tab_lists_quotes() {
        let mut app = App::new(false);
        app.toggle_tab();
        let state = QuoteState {
            favourites: vec![Quote::new("First", "A"), Quote::new("Second", "B")],
            ..QuoteState::default()
        };

        let text = buffer_text(&draw(&mut app, &state));
        assert!(text.contains("> \"First\""));
        assert!(text.contains("\"Second\""));
    }

    #[test]
    fn test_empty_favourites_message() {
        let mut app = App::new(false);
        app.toggle_tab();

        let text = buffer_text(&draw(&mut app, &QuoteState::default()));
        assert!(text.contains("No favourites yet"));
    }

    #[test]
    fn test_help_overlay() {
        let mut app = App::new(false);
        app.show_help = true;

        let text = buffer_text(&draw(&mut app, &QuoteState::default()));
        assert!(text.contains("Keybindings Help"));
    }
}
