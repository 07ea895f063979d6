use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::ui::colors::{
    HIGHLIGHT_BG, MATRIX_GREEN, SOFT_GREEN, TEXT_DIM, TEXT_PRIMARY, TEXT_SECONDARY,
};
use crate::ui::common::{render_composite_block, render_matrix_box};
use crate::ui::utils::truncate;

pub fn render_channels(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    app.area_channels = chunks[0];
    let channels = app.all_channels();
    let custom_count = app.channels.custom_channels().len();
    let title = format!("channels ({} · {} custom)", channels.len(), custom_count);
    let inner = render_composite_block(f, chunks[0], Some(&title));

    let name_width = inner.width.saturating_sub(24) as usize;
    let items: Vec<ListItem> = channels
        .iter()
        .map(|c| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>4} ", c.id), Style::default().fg(TEXT_DIM)),
                Span::styled(
                    format!("{:<width$}", truncate(&c.name, name_width), width = name_width),
                    Style::default().fg(TEXT_PRIMARY),
                ),
                Span::styled(
                    format!(" {}", truncate(&c.category, 16)),
                    Style::default().fg(SOFT_GREEN),
                ),
            ]))
        })
        .collect();

    if items.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled("  no channels", Style::default().fg(TEXT_DIM))),
            inner,
        );
    } else {
        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .bg(HIGHLIGHT_BG)
                    .fg(MATRIX_GREEN)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(" ▎");
        f.render_stateful_widget(list, inner, &mut app.channel_list_state);
    }

    render_details(f, app, chunks[1]);
}

fn render_details(f: &mut Frame, app: &App, area: Rect) {
    let inner = render_matrix_box(f, area, "details", TEXT_DIM);
    let Some(channel) = app.selected_channel() else {
        return;
    };

    let label = Style::default().fg(TEXT_DIM);
    let value = Style::default().fg(TEXT_SECONDARY);
    let is_custom = app.channels.custom_channels().iter().any(|c| c.id == channel.id);

    let mut lines = vec![
        Line::from(Span::styled(
            channel.name.clone(),
            Style::default().fg(MATRIX_GREEN).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("category  ", label),
            Span::styled(channel.category.clone(), value),
        ]),
        Line::from(vec![
            Span::styled("source    ", label),
            Span::styled(if is_custom { "custom" } else { "built-in" }, value),
        ]),
        Line::from(vec![
            Span::styled("url       ", label),
            Span::styled(channel.url.clone(), value),
        ]),
    ];
    if let Some(logo) = &channel.logo {
        lines.push(Line::from(vec![
            Span::styled("logo      ", label),
            Span::styled(logo.clone(), value),
        ]));
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
