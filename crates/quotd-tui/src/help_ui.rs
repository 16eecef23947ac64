use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render keybindings help popup
pub fn render_keybindings_help(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);

    // Clear background
    frame.render_widget(Clear, popup_area);

    let help_text = Paragraph::new(get_keybindings_content())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Keybindings Help ")
                .title_alignment(Alignment::Center)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false })
        .alignment(Alignment::Left);

    frame.render_widget(help_text, popup_area);
}

/// Get all keybindings content as styled lines
fn get_keybindings_content() -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let section = |title: &str| -> Line<'static> {
        Line::from(vec![Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )])
    };

    let key = |k: &str, desc: &str| -> Line<'static> {
        Line::from(vec![
            Span::styled(
                format!("  {:12}", k),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw(desc.to_string()),
        ])
    };

    lines.push(section("Global"));
    lines.push(Line::from(""));
    lines.push(key("q / ESC", "Quit"));
    lines.push(key("?", "Show this help"));
    lines.push(key("TAB", "Switch between Home and Favourites"));
    lines.push(Line::from(""));

    lines.push(section("Home"));
    lines.push(Line::from(""));
    lines.push(key("l / n / →", "Next quote"));
    lines.push(key("h / p / ←", "Previous quote"));
    lines.push(key("r", "Fetch a fresh batch of quotes"));
    lines.push(key("t", "Reload quote of the day"));
    lines.push(key("f", "Toggle favourite for the current quote"));
    lines.push(Line::from(""));

    lines.push(section("Favourites"));
    lines.push(Line::from(""));
    lines.push(key("j / ↓", "Select next"));
    lines.push(key("k / ↑", "Select previous"));
    lines.push(key("d / DEL", "Remove selected favourite"));
    lines.push(Line::from(""));

    lines.push(Line::from(vec![Span::styled(
        "  Press any key to close",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )]));

    lines
}

/// Helper function to create a centered rect
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
