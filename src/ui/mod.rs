pub mod channels;
pub mod colors;
pub mod common;
pub mod footer;
pub mod form;
pub mod header;
pub mod loading;
pub mod player;
pub mod popups;
pub mod utils;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::app::{App, CurrentScreen};

pub fn ui(f: &mut Frame, app: &mut App) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Footer
        ])
        .split(area);

    header::render_header(f, app, chunks[0]);
    footer::render_footer(f, app, chunks[2]);

    let content = chunks[1];
    match app.current_screen {
        CurrentScreen::Login => form::render_login(f, app, content),
        CurrentScreen::Channels => channels::render_channels(f, app, content),
        CurrentScreen::AddChannel => form::render_add_channel(f, app, content),
        CurrentScreen::Import => form::render_import(f, app, content),
        CurrentScreen::Player => player::render_player(f, app, content),
    }

    // Overlays
    if app.current_screen == CurrentScreen::Channels && app.confirm_clear {
        popups::render_confirm_clear(f, app, area);
    }
    if app.loading_message.is_some() {
        loading::render_loading(f, app, area);
    }
    popups::render_notifications(f, app, content);
}
