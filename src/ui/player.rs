use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::App;
use crate::channels::derive_categories;
use crate::navigation::{OverlayNav, OverlayState};
use crate::ui::colors::{
    HIGHLIGHT_BG, MATRIX_GREEN, SOFT_GREEN, TEXT_DIM, TEXT_PRIMARY, TEXT_SECONDARY,
};
use crate::ui::common::render_matrix_box;
use crate::ui::utils::truncate;

pub fn render_player(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(5)])
        .split(area);

    render_now_playing(f, app, chunks[1]);

    let Some(overlay) = &app.overlay else {
        return;
    };
    match overlay.state() {
        OverlayState::Hidden => {}
        OverlayState::List => render_overlay(f, app, overlay, chunks[0], false),
        OverlayState::ListWithSidebar => render_overlay(f, app, overlay, chunks[0], true),
    }
}

fn render_now_playing(f: &mut Frame, app: &App, area: Rect) {
    let inner = render_matrix_box(f, area, "now playing", SOFT_GREEN);
    let name = app
        .now_playing
        .as_ref()
        .map(|c| format!("{}  [{}]", c.name, c.category))
        .unwrap_or_else(|| "nothing".to_string());
    let status = app.player_status.clone().unwrap_or_default();

    let lines = vec![
        Line::from(Span::styled(
            name,
            Style::default().fg(MATRIX_GREEN).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(
                format!("{} · ", app.config.player_backend.display_name()),
                Style::default().fg(TEXT_DIM),
            ),
            Span::styled(status, Style::default().fg(TEXT_SECONDARY)),
        ]),
    ];
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Left), inner);
}

fn render_overlay(f: &mut Frame, app: &App, overlay: &OverlayNav, area: Rect, with_sidebar: bool) {
    let channels = app.all_channels();
    let (sidebar_area, list_area) = if with_sidebar {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(24), Constraint::Length(48), Constraint::Min(0)])
            .split(area);
        (Some(split[0]), split[1])
    } else {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(48), Constraint::Min(0)])
            .split(area);
        (None, split[0])
    };

    if let Some(sidebar_area) = sidebar_area {
        f.render_widget(Clear, sidebar_area);
        let inner = render_matrix_box(f, sidebar_area, "categories", MATRIX_GREEN);
        let items: Vec<ListItem> = derive_categories(&channels)
            .into_iter()
            .map(|c| {
                let style = if c == overlay.selected_category {
                    Style::default().fg(SOFT_GREEN).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(TEXT_SECONDARY)
                };
                ListItem::new(Span::styled(truncate(&c, 20), style))
            })
            .collect();
        let mut state = ListState::default().with_selected(Some(overlay.selected_sidebar_index));
        f.render_stateful_widget(highlighted(items), inner, &mut state);
    }

    f.render_widget(Clear, list_area);
    let list_color = if with_sidebar { TEXT_DIM } else { MATRIX_GREEN };
    let inner = render_matrix_box(f, list_area, &overlay.selected_category, list_color);
    let playing_id = channels.get(overlay.playing_index).map(|c| c.id);
    let items: Vec<ListItem> = overlay
        .visible_channels(&channels)
        .into_iter()
        .map(|c| {
            let marker = if Some(c.id) == playing_id { "▶ " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(MATRIX_GREEN)),
                Span::styled(truncate(&c.name, 40), Style::default().fg(TEXT_PRIMARY)),
            ]))
        })
        .collect();
    let mut state = ListState::default().with_selected(Some(overlay.selected_list_index));
    f.render_stateful_widget(highlighted(items), inner, &mut state);
}

fn highlighted(items: Vec<ListItem<'_>>) -> List<'_> {
    List::new(items)
        .highlight_style(
            Style::default()
                .bg(HIGHLIGHT_BG)
                .fg(MATRIX_GREEN)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(" ▎")
}
