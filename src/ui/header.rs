use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, CurrentScreen};
use crate::ui::colors::{DARK_GREEN, MATRIX_GREEN, TEXT_DIM, TEXT_SECONDARY, WARN_YELLOW, ERROR_RED};

fn screen_label(screen: CurrentScreen) -> &'static str {
    match screen {
        CurrentScreen::Login => "LOGIN",
        CurrentScreen::Channels => "CHANNELS",
        CurrentScreen::AddChannel => "ADD_CHANNEL",
        CurrentScreen::Import => "IMPORT",
        CurrentScreen::Player => "NOW_PLAYING",
    }
}

pub fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(0)])
        .split(area);

    let style_active = Style::default()
        .bg(MATRIX_GREEN)
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD);
    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            " // PANEL_IPTV",
            Style::default().fg(MATRIX_GREEN).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" / ", Style::default().fg(Color::LightBlue)),
        Span::styled(format!(" {} ", screen_label(app.current_screen)), style_active),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(DARK_GREEN)),
    );
    f.render_widget(title, chunks[0]);

    let now = App::now_epoch();
    let session = app.auth.session();
    let mut spans = Vec::new();
    if session.logged_in {
        let expiry_style = if session.is_expired(now) {
            Style::default().fg(ERROR_RED).add_modifier(Modifier::BOLD)
        } else if session.days_left(now).map(|d| d <= 3).unwrap_or(false) {
            Style::default().fg(WARN_YELLOW)
        } else {
            Style::default().fg(TEXT_SECONDARY)
        };
        spans.push(Span::styled(
            session.username.clone(),
            Style::default().fg(MATRIX_GREEN),
        ));
        spans.push(Span::styled(" · ", Style::default().fg(TEXT_DIM)));
        spans.push(Span::styled(session.expiry_label(now), expiry_style));
    } else {
        spans.push(Span::styled("offline", Style::default().fg(TEXT_DIM)));
    }
    spans.push(Span::styled(" · ", Style::default().fg(TEXT_DIM)));
    spans.push(Span::styled(
        format!("{} channels", app.channels.len()),
        Style::default().fg(TEXT_SECONDARY),
    ));
    spans.push(Span::styled(" · ", Style::default().fg(TEXT_DIM)));
    spans.push(Span::styled(
        app.config.player_backend.display_name(),
        Style::default().fg(TEXT_SECONDARY),
    ));
    spans.push(Span::raw(" "));

    let stats = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(DARK_GREEN)),
        );
    f.render_widget(stats, chunks[1]);
}
