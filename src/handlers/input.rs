use crate::app::{
    App, AsyncAction, ChannelField, CurrentScreen, ImportMode, LoginField, NotificationLevel,
};
use crate::handlers::tasks;
use crate::m3u;
use crate::navigation::{NavKey, NavOutcome};
use crate::player::Player;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;
use zeroize::Zeroize;

pub enum InputResult {
    Continue,
    Quit,
}

pub fn handle_key_event(
    app: &mut App,
    key: KeyEvent,
    tx: &mpsc::Sender<AsyncAction>,
    player: &Player,
) -> io::Result<InputResult> {
    // Windows reports both press and release
    if key.kind != KeyEventKind::Press {
        return Ok(InputResult::Continue);
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Ok(InputResult::Quit);
    }

    // Ignore keys while a blocking request is in flight, except Esc to dismiss
    if app.loading_message.is_some() {
        if key.code == KeyCode::Esc {
            app.loading_message = None;
        }
        return Ok(InputResult::Continue);
    }

    match app.current_screen {
        CurrentScreen::Login => return Ok(handle_login(app, key, tx)),
        CurrentScreen::Channels => return Ok(handle_channels(app, key, tx, player)),
        CurrentScreen::AddChannel => handle_add_channel(app, key),
        CurrentScreen::Import => handle_import(app, key, tx),
        CurrentScreen::Player => handle_player(app, key, tx, player),
    }
    Ok(InputResult::Continue)
}

/// Bracketed paste from the terminal
pub fn handle_paste(app: &mut App, text: &str) {
    match app.current_screen {
        CurrentScreen::Login => match app.login_field_focus {
            LoginField::Server => append(&mut app.input_server, text.trim()),
            LoginField::Username => append(&mut app.input_username, text.trim()),
            LoginField::Password => app.input_password.push_str(text.trim()),
        },
        CurrentScreen::AddChannel => append(focused_channel_input(app), text.trim()),
        CurrentScreen::Import => match app.import_mode {
            ImportMode::Paste => app.paste_buffer.push_str(&text.replace("\r\n", "\n")),
            ImportMode::Url | ImportMode::File => append(&mut app.input_import, text.trim()),
        },
        _ => {}
    }
}

fn append(input: &mut Input, text: &str) {
    let current = input.value().to_string();
    *input = Input::new(current + text);
}

fn edit_password(app: &mut App, key: &KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('u') if ctrl => app.input_password.clear(),
        KeyCode::Char(c) if !ctrl => app.input_password.push(c),
        KeyCode::Backspace => app.input_password.pop(),
        KeyCode::Delete => app.input_password.clear(),
        _ => {}
    }
}

fn paste_from_clipboard() -> Option<String> {
    let mut clipboard = arboard::Clipboard::new().ok()?;
    clipboard.get_text().ok()
}

fn is_paste_shortcut(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('v')
}

fn handle_login(app: &mut App, key: KeyEvent, tx: &mpsc::Sender<AsyncAction>) -> InputResult {
    match key.code {
        KeyCode::Esc => return InputResult::Quit,
        KeyCode::Tab | KeyCode::Down => app.login_field_focus = app.login_field_focus.next(),
        KeyCode::BackTab | KeyCode::Up => app.login_field_focus = app.login_field_focus.previous(),
        KeyCode::Enter => {
            if app.login_field_focus == LoginField::Password {
                tasks::spawn_login(app, tx);
            } else {
                app.login_field_focus = app.login_field_focus.next();
            }
        }
        _ if is_paste_shortcut(&key) => {
            if let Some(mut text) = paste_from_clipboard() {
                handle_paste(app, &text);
                text.zeroize();
            }
        }
        _ => {
            match app.login_field_focus {
                LoginField::Server => {
                    app.input_server.handle_event(&Event::Key(key));
                }
                LoginField::Username => {
                    app.input_username.handle_event(&Event::Key(key));
                }
                LoginField::Password => edit_password(app, &key),
            }
            app.login_error = None;
        }
    }
    InputResult::Continue
}

fn handle_channels(
    app: &mut App,
    key: KeyEvent,
    tx: &mpsc::Sender<AsyncAction>,
    player: &Player,
) -> InputResult {
    if app.confirm_clear {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.clear_custom_channels(),
            _ => app.confirm_clear = false,
        }
        return InputResult::Continue;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return InputResult::Quit,
        KeyCode::Down | KeyCode::Char('j') => app.next_channel(),
        KeyCode::Up | KeyCode::Char('k') => app.previous_channel(),
        KeyCode::Home | KeyCode::Char('g') => app.select_channel(0),
        KeyCode::End | KeyCode::Char('G') => app.select_channel(usize::MAX),
        KeyCode::Enter => {
            let index = app.selected_channel_index;
            tasks::spawn_playback(app, index, player, tx);
        }
        KeyCode::Char('a') => app.open_add_channel(),
        KeyCode::Char('i') => app.open_import(ImportMode::Paste),
        KeyCode::Char('u') => app.open_import(ImportMode::Url),
        KeyCode::Char('f') => app.open_import(ImportMode::File),
        KeyCode::Char('p') => {
            if !app.auth.is_logged_in() {
                app.notify("Log in to import your playlist", NotificationLevel::Warning);
            } else if !tasks::spawn_account_playlist(app, tx) {
                app.notify("Your account has no playlist", NotificationLevel::Warning);
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => app.remove_selected_channel(),
        KeyCode::Char('C') => {
            if app.channels.custom_channels().is_empty() {
                app.notify("No custom channels to clear", NotificationLevel::Info);
            } else {
                app.confirm_clear = true;
            }
        }
        KeyCode::Char('b') => {
            app.cycle_backend();
        }
        KeyCode::Char('L') => {
            if app.auth.is_logged_in() {
                app.logout();
            } else {
                app.current_screen = CurrentScreen::Login;
            }
        }
        _ => {}
    }
    InputResult::Continue
}

fn focused_channel_input(app: &mut App) -> &mut Input {
    match app.channel_field_focus {
        ChannelField::Name => &mut app.input_channel_name,
        ChannelField::Url => &mut app.input_channel_url,
        ChannelField::Logo => &mut app.input_channel_logo,
        ChannelField::Category => &mut app.input_channel_category,
    }
}

fn handle_add_channel(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.current_screen = CurrentScreen::Channels,
        KeyCode::Tab | KeyCode::Down => app.channel_field_focus = app.channel_field_focus.next(),
        KeyCode::BackTab | KeyCode::Up => {
            app.channel_field_focus = app.channel_field_focus.previous()
        }
        KeyCode::Enter => {
            if let Err(e) = app.submit_add_channel() {
                app.add_channel_error = Some(e.to_string());
            }
        }
        _ if is_paste_shortcut(&key) => {
            if let Some(text) = paste_from_clipboard() {
                handle_paste(app, &text);
            }
        }
        _ => {
            focused_channel_input(app).handle_event(&Event::Key(key));
            app.add_channel_error = None;
        }
    }
}

fn handle_import(app: &mut App, key: KeyEvent, tx: &mpsc::Sender<AsyncAction>) {
    if key.code == KeyCode::Esc {
        app.current_screen = CurrentScreen::Channels;
        return;
    }
    if is_paste_shortcut(&key) {
        match paste_from_clipboard() {
            Some(text) => handle_paste(app, &text),
            None => app.notify("Clipboard is empty or unavailable", NotificationLevel::Warning),
        }
        return;
    }

    match app.import_mode {
        ImportMode::Paste => match key.code {
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                let content = std::mem::take(&mut app.paste_buffer);
                if app.import_playlist_text("pasted text", &content) > 0 {
                    app.current_screen = CurrentScreen::Channels;
                } else {
                    app.paste_buffer = content;
                }
            }
            KeyCode::Enter => app.paste_buffer.push('\n'),
            KeyCode::Backspace => {
                app.paste_buffer.pop();
            }
            KeyCode::Char(c) => app.paste_buffer.push(c),
            _ => {}
        },
        ImportMode::Url | ImportMode::File => match key.code {
            KeyCode::Enter => {
                let source = app.input_import.value().trim().to_string();
                if source.is_empty() {
                    app.notify("Enter a playlist location", NotificationLevel::Warning);
                } else if m3u::is_remote_source(&source) {
                    tasks::spawn_playlist_download(app, source, tx);
                } else if app.import_mode == ImportMode::Url {
                    app.notify(
                        "URL must start with http:// or https://",
                        NotificationLevel::Warning,
                    );
                } else {
                    tasks::spawn_file_read(app, PathBuf::from(source), tx);
                }
            }
            _ => {
                app.input_import.handle_event(&Event::Key(key));
            }
        },
    }
}

pub fn nav_key(key: &KeyEvent) -> Option<NavKey> {
    let nav = match key.code {
        KeyCode::Up => NavKey::Up,
        KeyCode::Down => NavKey::Down,
        KeyCode::Left => NavKey::Left,
        KeyCode::Right => NavKey::Right,
        KeyCode::Enter | KeyCode::Char(' ') => NavKey::Select,
        KeyCode::Esc | KeyCode::Backspace => NavKey::Back,
        KeyCode::PageUp | KeyCode::Char('+') => NavKey::ChannelUp,
        KeyCode::PageDown | KeyCode::Char('-') => NavKey::ChannelDown,
        _ => return None,
    };
    Some(nav)
}

fn handle_player(app: &mut App, key: KeyEvent, tx: &mpsc::Sender<AsyncAction>, player: &Player) {
    if key.code == KeyCode::Char('q') {
        tasks::stop_playback(app, player);
        return;
    }
    let Some(nav) = nav_key(&key) else {
        return;
    };
    let channels = app.all_channels();
    let Some(overlay) = app.overlay.as_mut() else {
        return;
    };
    match overlay.handle(nav, &channels) {
        NavOutcome::Play(index) => tasks::spawn_playback(app, index, player, tx),
        NavOutcome::Exit => tasks::stop_playback(app, player),
        NavOutcome::Redraw | NavOutcome::Ignored => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent {
            modifiers: KeyModifiers::CONTROL,
            ..press(KeyCode::Char(c))
        }
    }

    fn channels_app() -> App {
        let mut app = App::new_ephemeral();
        app.current_screen = CurrentScreen::Channels;
        app
    }

    #[test]
    fn test_release_events_are_ignored() {
        let (tx, _rx) = mpsc::channel(8);
        let player = Player::new("test");
        let mut app = channels_app();
        let mut key = press(KeyCode::Char('j'));
        key.kind = KeyEventKind::Release;
        handle_key_event(&mut app, key, &tx, &player).unwrap();
        assert_eq!(app.selected_channel_index, 0);
    }

    #[test]
    fn test_channel_list_navigation_is_bounded() {
        let (tx, _rx) = mpsc::channel(8);
        let player = Player::new("test");
        let mut app = channels_app();
        let len = app.channels.len();
        for _ in 0..len + 3 {
            handle_key_event(&mut app, press(KeyCode::Down), &tx, &player).unwrap();
        }
        assert_eq!(app.selected_channel_index, len - 1);
        handle_key_event(&mut app, press(KeyCode::Char('g')), &tx, &player).unwrap();
        assert_eq!(app.selected_channel_index, 0);
    }

    #[test]
    fn test_login_enter_advances_focus_then_validates() {
        let (tx, _rx) = mpsc::channel(8);
        let player = Player::new("test");
        let mut app = App::new_ephemeral();
        app.login_field_focus = LoginField::Server;
        handle_key_event(&mut app, press(KeyCode::Enter), &tx, &player).unwrap();
        assert_eq!(app.login_field_focus, LoginField::Username);

        app.login_field_focus = LoginField::Password;
        handle_key_event(&mut app, press(KeyCode::Enter), &tx, &player).unwrap();
        assert!(app.login_error.is_some());
        assert!(app.loading_message.is_none());
    }

    #[test]
    fn test_password_field_typing_and_clearing() {
        let (tx, _rx) = mpsc::channel(8);
        let player = Player::new("test");
        let mut app = App::new_ephemeral();
        app.login_field_focus = LoginField::Password;
        for c in "s3cret".chars() {
            handle_key_event(&mut app, press(KeyCode::Char(c)), &tx, &player).unwrap();
        }
        handle_key_event(&mut app, press(KeyCode::Backspace), &tx, &player).unwrap();
        assert_eq!(app.input_password.value(), "s3cre");

        handle_paste(&mut app, " xyz\n");
        assert_eq!(app.input_password.value(), "s3crexyz");

        handle_key_event(&mut app, ctrl('u'), &tx, &player).unwrap();
        assert!(app.input_password.is_empty());
        app.input_password.push_str("again");
        app.reset_login_form();
        assert!(app.input_password.is_empty());
    }

    #[test]
    fn test_paste_import_adds_channels() {
        let (tx, _rx) = mpsc::channel(8);
        let player = Player::new("test");
        let mut app = channels_app();
        handle_key_event(&mut app, press(KeyCode::Char('i')), &tx, &player).unwrap();
        assert_eq!(app.current_screen, CurrentScreen::Import);

        handle_paste(
            &mut app,
            "#EXTM3U\r\n#EXTINF:-1 group-title=\"News\",Local\r\nhttp://x/live.m3u8\r\n",
        );
        handle_key_event(&mut app, ctrl('s'), &tx, &player).unwrap();
        assert_eq!(app.current_screen, CurrentScreen::Channels);
        assert_eq!(app.channels.custom_channels().len(), 1);
        assert_eq!(app.channels.custom_channels()[0].category, "News");
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let (tx, _rx) = mpsc::channel(8);
        let player = Player::new("test");
        let mut app = channels_app();
        app.import_playlist_text("t", "#EXTINF:-1,A\nhttp://a\n");

        handle_key_event(&mut app, press(KeyCode::Char('C')), &tx, &player).unwrap();
        assert!(app.confirm_clear);
        handle_key_event(&mut app, press(KeyCode::Char('n')), &tx, &player).unwrap();
        assert_eq!(app.channels.custom_channels().len(), 1);

        handle_key_event(&mut app, press(KeyCode::Char('C')), &tx, &player).unwrap();
        handle_key_event(&mut app, press(KeyCode::Char('y')), &tx, &player).unwrap();
        assert!(app.channels.custom_channels().is_empty());
    }

    #[test]
    fn test_add_channel_form_reports_errors() {
        let (tx, _rx) = mpsc::channel(8);
        let player = Player::new("test");
        let mut app = channels_app();
        handle_key_event(&mut app, press(KeyCode::Char('a')), &tx, &player).unwrap();
        handle_key_event(&mut app, press(KeyCode::Enter), &tx, &player).unwrap();
        assert_eq!(app.current_screen, CurrentScreen::AddChannel);
        assert!(app.add_channel_error.is_some());

        for c in "News".chars() {
            handle_key_event(&mut app, press(KeyCode::Char(c)), &tx, &player).unwrap();
        }
        handle_key_event(&mut app, press(KeyCode::Tab), &tx, &player).unwrap();
        handle_paste(&mut app, "http://example.com/news.m3u8");
        handle_key_event(&mut app, press(KeyCode::Enter), &tx, &player).unwrap();
        assert_eq!(app.current_screen, CurrentScreen::Channels);
        assert_eq!(app.selected_channel().unwrap().name, "News");
    }

    #[test]
    fn test_nav_key_mapping() {
        assert_eq!(nav_key(&press(KeyCode::Enter)), Some(NavKey::Select));
        assert_eq!(nav_key(&press(KeyCode::Backspace)), Some(NavKey::Back));
        assert_eq!(nav_key(&press(KeyCode::PageDown)), Some(NavKey::ChannelDown));
        assert_eq!(nav_key(&press(KeyCode::Char('x'))), None);
    }
}
