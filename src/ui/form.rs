use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use tui_input::Input;

use crate::app::{App, ChannelField, ImportMode, LoginField};
use crate::ui::colors::{ERROR_BG, MATRIX_GREEN, SOFT_GREEN, TEXT_DIM, TEXT_PRIMARY, TEXT_SECONDARY};
use crate::ui::common::render_composite_block;
use crate::ui::popups::render_brand;
use crate::ui::utils::{centered_rect, key_hints};

pub fn render_login(f: &mut Frame, app: &App, area: Rect) {
    let outer = centered_rect(60, 70, area);
    let inner = render_composite_block(f, outer, Some("sign in"));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Brand
            Constraint::Length(3), // Server
            Constraint::Length(3), // Username
            Constraint::Length(3), // Password
            Constraint::Length(2), // Hints
            Constraint::Min(1),    // Error
        ])
        .split(inner);

    render_brand(f, chunks[0]);

    let active = app.login_field_focus;
    let tick = app.loading_tick;
    f.render_widget(
        render_input("server url", &app.input_server, None, active == LoginField::Server, tick),
        chunks[1],
    );
    f.render_widget(
        render_input("username", &app.input_username, None, active == LoginField::Username, tick),
        chunks[2],
    );
    let masked = Input::new("*".repeat(app.input_password.char_count()));
    f.render_widget(
        render_input(
            "password",
            &masked,
            None,
            active == LoginField::Password,
            tick,
        ),
        chunks[3],
    );

    f.render_widget(
        Paragraph::new(key_hints(&[("tab", "next"), ("enter", "login"), ("esc", "quit")]))
            .alignment(Alignment::Center),
        chunks[4],
    );

    if let Some(err) = &app.login_error {
        f.render_widget(error_line(err), chunks[5]);
    }
}

pub fn render_add_channel(f: &mut Frame, app: &App, area: Rect) {
    let outer = centered_rect(70, 80, area);
    let inner = render_composite_block(f, outer, Some("add channel"));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(1),
        ])
        .split(inner);

    let active = app.channel_field_focus;
    let tick = app.loading_tick;
    let fields = [
        ("name", &app.input_channel_name, ChannelField::Name),
        ("stream url", &app.input_channel_url, ChannelField::Url),
        ("logo url (optional)", &app.input_channel_logo, ChannelField::Logo),
        ("category (optional)", &app.input_channel_category, ChannelField::Category),
    ];
    for (i, (label, input, field)) in fields.into_iter().enumerate() {
        f.render_widget(render_input(label, input, None, active == field, tick), chunks[i]);
    }

    f.render_widget(
        Paragraph::new(key_hints(&[("tab", "next"), ("enter", "save"), ("esc", "cancel")]))
            .alignment(Alignment::Center),
        chunks[4],
    );

    if let Some(err) = &app.add_channel_error {
        f.render_widget(error_line(err), chunks[5]);
    }
}

pub fn render_import(f: &mut Frame, app: &App, area: Rect) {
    let outer = centered_rect(80, 80, area);
    let inner = render_composite_block(f, outer, Some(app.import_mode.title()));

    match app.import_mode {
        ImportMode::Paste => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(1)])
                .split(inner);

            let lines = app.paste_buffer.lines().count();
            f.render_widget(
                Paragraph::new(Span::styled(
                    format!("  {} lines · paste an #EXTM3U playlist", lines),
                    Style::default().fg(TEXT_DIM),
                )),
                chunks[0],
            );

            // Keep the tail of long pastes in view
            let height = chunks[1].height as usize;
            let body: Vec<Line> = app
                .paste_buffer
                .lines()
                .rev()
                .take(height)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .map(|l| {
                    Line::from(Span::styled(l.to_string(), Style::default().fg(TEXT_SECONDARY)))
                })
                .collect();
            f.render_widget(Paragraph::new(body), chunks[1]);
        }
        ImportMode::Url | ImportMode::File => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(1)
                .constraints([Constraint::Length(3), Constraint::Length(2), Constraint::Min(0)])
                .split(inner);
            let label = if app.import_mode == ImportMode::Url {
                "playlist url"
            } else {
                "playlist file path"
            };
            f.render_widget(
                render_input(label, &app.input_import, None, true, app.loading_tick),
                chunks[0],
            );
            f.render_widget(
                Paragraph::new(key_hints(&[("enter", "import"), ("esc", "cancel")]))
                    .alignment(Alignment::Center),
                chunks[1],
            );
        }
    }
}

fn error_line(err: &str) -> Paragraph<'_> {
    Paragraph::new(format!(" error: {}", err))
        .style(
            Style::default()
                .fg(TEXT_PRIMARY)
                .bg(ERROR_BG)
                .add_modifier(Modifier::BOLD),
        )
        .wrap(Wrap { trim: true })
}

/// Label line plus value line. `display` overrides the shown value (password mask).
fn render_input<'a>(
    label: &'a str,
    input: &'a Input,
    display: Option<String>,
    is_active: bool,
    tick: u64,
) -> Paragraph<'a> {
    let (label_style, content_style) = if is_active {
        (
            Style::default().fg(MATRIX_GREEN).add_modifier(Modifier::BOLD),
            Style::default().fg(TEXT_PRIMARY).add_modifier(Modifier::BOLD),
        )
    } else {
        (Style::default().fg(TEXT_DIM), Style::default().fg(TEXT_SECONDARY))
    };

    let mut value = display.unwrap_or_else(|| input.value().to_string());
    if is_active && (tick / 15) % 2 == 0 {
        let cursor = input.visual_cursor();
        let mut chars: Vec<char> = value.chars().collect();
        if cursor >= chars.len() {
            chars.push('█');
        } else {
            chars[cursor] = '█';
        }
        value = chars.into_iter().collect();
    }

    let prompt = if is_active { ">_ " } else { "   " };
    Paragraph::new(vec![
        Line::from(Span::styled(format!("  {}", label), label_style)),
        Line::from(vec![
            Span::styled(format!("  {}", prompt), Style::default().fg(SOFT_GREEN)),
            Span::styled(value, content_style),
        ]),
    ])
}
