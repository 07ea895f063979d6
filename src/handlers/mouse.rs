use crate::app::{App, CurrentScreen};
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    if app.current_screen != CurrentScreen::Channels {
        return;
    }
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let area = app.area_channels;
            let (x, y) = (mouse.column, mouse.row);
            // Rows inside the list border
            if x >= area.x
                && x < area.x + area.width
                && y > area.y
                && y + 1 < area.y + area.height
            {
                let row = (y - area.y - 1) as usize;
                let index = app.channel_list_state.offset() + row;
                if index < app.channels.len() {
                    app.select_channel(index);
                }
            }
        }
        MouseEventKind::ScrollDown => app.next_channel(),
        MouseEventKind::ScrollUp => app.previous_channel(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use ratatui::layout::Rect;

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_click_selects_row() {
        let mut app = App::new_ephemeral();
        app.current_screen = CurrentScreen::Channels;
        app.area_channels = Rect::new(0, 2, 40, 10);

        handle_mouse_event(&mut app, click(5, 5));
        assert_eq!(app.selected_channel_index, 2);

        // Border row does nothing
        handle_mouse_event(&mut app, click(5, 2));
        assert_eq!(app.selected_channel_index, 2);
    }

    #[test]
    fn test_scroll_moves_selection() {
        let mut app = App::new_ephemeral();
        app.current_screen = CurrentScreen::Channels;
        let scroll = MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse_event(&mut app, scroll);
        assert_eq!(app.selected_channel_index, 1);
    }
}
