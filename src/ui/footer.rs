use ratatui::{layout::Rect, widgets::Paragraph, Frame};

use crate::app::{App, CurrentScreen, ImportMode};
use crate::ui::utils::key_hints;

pub fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints = match app.current_screen {
        CurrentScreen::Login => key_hints(&[
            ("tab", "next field"),
            ("enter", "login"),
            ("ctrl+v", "paste"),
            ("esc", "quit"),
        ]),
        CurrentScreen::Channels if app.confirm_clear => {
            key_hints(&[("y", "confirm clear"), ("any key", "cancel")])
        }
        CurrentScreen::Channels => key_hints(&[
            ("enter", "play"),
            ("a", "add"),
            ("i/u/f", "import"),
            ("p", "account playlist"),
            ("d", "delete"),
            ("C", "clear"),
            ("b", "player"),
            ("L", "logout"),
            ("q", "quit"),
        ]),
        CurrentScreen::AddChannel => key_hints(&[
            ("tab", "next field"),
            ("enter", "save"),
            ("esc", "cancel"),
        ]),
        CurrentScreen::Import => match app.import_mode {
            ImportMode::Paste => key_hints(&[
                ("ctrl+v", "paste"),
                ("ctrl+s", "import"),
                ("esc", "cancel"),
            ]),
            ImportMode::Url | ImportMode::File => {
                key_hints(&[("enter", "import"), ("esc", "cancel")])
            }
        },
        CurrentScreen::Player => key_hints(&[
            ("enter", "channels"),
            ("←", "groups"),
            ("pgup/pgdn", "zap"),
            ("esc", "back"),
            ("q", "stop"),
        ]),
    };
    f.render_widget(Paragraph::new(hints), area);
}
