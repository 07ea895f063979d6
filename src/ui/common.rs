use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders},
    Frame,
};

use crate::ui::colors::SOFT_GREEN;

/// Rounded panel with the title embedded in the top edge. Returns the inner area.
pub fn render_matrix_box(f: &mut Frame, area: Rect, title: &str, border_color: Color) -> Rect {
    let clean_title = title.trim();

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .border_style(Style::default().fg(border_color));
    if !clean_title.is_empty() {
        block = block.title(Line::from(vec![
            Span::styled("─ ", Style::default().fg(border_color)),
            Span::styled(
                clean_title.to_string(),
                Style::default().fg(border_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" ─", Style::default().fg(border_color)),
        ]));
    }

    let inner = block.inner(area);
    f.render_widget(block, area);
    inner
}

pub fn render_composite_block(f: &mut Frame, area: Rect, title: Option<&str>) -> Rect {
    render_matrix_box(f, area, title.unwrap_or(""), SOFT_GREEN)
}
