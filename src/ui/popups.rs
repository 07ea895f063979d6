use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, NotificationLevel};
use crate::ui::colors::{
    ERROR_RED, MATRIX_GREEN, SOFT_GREEN, TEXT_PRIMARY, TEXT_SECONDARY, WARN_YELLOW,
};
use crate::ui::utils::{centered_rect, key_hints, truncate};

pub fn render_confirm_clear(f: &mut Frame, app: &App, area: Rect) {
    let popup = centered_rect(50, 25, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(Span::styled(
            " clear channels ",
            Style::default().fg(WARN_YELLOW).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Thick)
        .border_style(Style::default().fg(WARN_YELLOW));

    let count = app.channels.custom_channels().len();
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("Remove all {} custom channels?", count),
            Style::default().fg(TEXT_PRIMARY).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Built-in demo channels are kept.",
            Style::default().fg(TEXT_SECONDARY),
        )),
        Line::from(""),
        key_hints(&[("y", "clear"), ("any key", "cancel")]),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block),
        popup,
    );
}

/// Stacked toasts in the bottom-right corner, newest last
pub fn render_notifications(f: &mut Frame, app: &App, area: Rect) {
    if app.notifications.is_empty() || area.height < 4 {
        return;
    }
    let width = (area.width / 2).clamp(20, 60).min(area.width);
    let mut y = area.y + area.height.saturating_sub(1);

    for note in app.notifications.iter().rev() {
        if y < area.y + 3 {
            break;
        }
        y -= 3;
        let rect = Rect {
            x: area.x + area.width - width,
            y,
            width,
            height: 3,
        };
        let color = match note.level {
            NotificationLevel::Info => SOFT_GREEN,
            NotificationLevel::Warning => WARN_YELLOW,
            NotificationLevel::Error => ERROR_RED,
        };
        let text = truncate(&note.message, width.saturating_sub(4) as usize);
        f.render_widget(Clear, rect);
        f.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(TEXT_PRIMARY))).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(color)),
            ),
            rect,
        );
    }
}

pub fn render_brand(f: &mut Frame, area: Rect) {
    let p = Paragraph::new(Line::from(Span::styled(
        "// PANEL_IPTV",
        Style::default().fg(MATRIX_GREEN).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(p, area);
}
