use panel_iptv_lib::api::LoginData;
use panel_iptv_lib::app::{App, CurrentScreen, ImportMode, NotificationLevel};
use panel_iptv_lib::auth::{Credentials, SecretInput};
use panel_iptv_lib::navigation::{NavKey, OverlayNav};
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::Terminal;
use tui_input::Input;

// ─── Helpers ───────────────────────────────────────────────────────────────────

/// Render one frame of the UI and return the buffer. Panics on crash.
fn render_frame_sized(app: &mut App, width: u16, height: u16) -> Buffer {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|f| {
            panel_iptv_lib::ui::ui(f, app);
        })
        .unwrap();
    terminal.backend().buffer().clone()
}

fn render_frame(app: &mut App) -> Buffer {
    render_frame_sized(app, 120, 40)
}

fn buffer_text(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut text = String::new();
    for y in 0..area.height {
        for x in 0..area.width {
            text.push_str(buffer[(x, y)].symbol());
        }
        text.push('\n');
    }
    text
}

fn logged_in_app() -> App {
    let mut app = App::new_ephemeral();
    let creds = Credentials::new("http://panel.local".into(), "alice".into(), "pw".into());
    let data = LoginData {
        expires_at: Some("2099-01-01".into()),
        ..LoginData::default()
    };
    app.complete_login(&creds, &data);
    app.notifications.clear();
    app
}

fn with_custom_channels(mut app: App, count: usize) -> App {
    let mut text = String::from("#EXTM3U\n");
    for i in 0..count {
        text.push_str(&format!(
            "#EXTINF:-1 group-title=\"Group {}\",Custom Channel {}\nhttp://stream/{}.m3u8\n",
            i % 4,
            i,
            i
        ));
    }
    app.import_playlist_text("test", &text);
    app.notifications.clear();
    app
}

// ─── Test 1: Every Screen Renders Without Panic ────────────────────────────────

#[test]
fn test_all_screens_render_empty_state() {
    let screens = [
        CurrentScreen::Login,
        CurrentScreen::Channels,
        CurrentScreen::AddChannel,
        CurrentScreen::Import,
        CurrentScreen::Player,
    ];
    for screen in screens {
        let mut app = App::new_ephemeral();
        app.current_screen = screen;
        render_frame(&mut app);
    }
}

#[test]
fn test_all_screens_render_tiny_terminal() {
    let mut app = with_custom_channels(logged_in_app(), 3);
    for screen in [
        CurrentScreen::Login,
        CurrentScreen::Channels,
        CurrentScreen::AddChannel,
        CurrentScreen::Import,
    ] {
        app.current_screen = screen;
        render_frame_sized(&mut app, 20, 6);
    }
}

// ─── Test 2: Login Screen ──────────────────────────────────────────────────────

#[test]
fn test_login_masks_password_and_shows_error() {
    let mut app = App::new_ephemeral();
    app.input_server = Input::new("http://panel.local".into());
    app.input_username = Input::new("alice".into());
    app.input_password = SecretInput::new("hunter2");
    app.login_error = Some("Authentication failed: bad password".into());

    let text = buffer_text(&render_frame(&mut app));
    assert!(text.contains("alice"));
    assert!(!text.contains("hunter2"));
    assert!(text.contains("bad password"));
}

// ─── Test 3: Channel List ──────────────────────────────────────────────────────

#[test]
fn test_channel_list_shows_channels_and_session() {
    let mut app = with_custom_channels(logged_in_app(), 5);
    app.current_screen = CurrentScreen::Channels;

    let text = buffer_text(&render_frame(&mut app));
    assert!(text.contains("Big Buck Bunny"));
    assert!(text.contains("Custom Channel 0"));
    assert!(text.contains("alice"));
    assert!(text.contains("2099-01-01"));
    assert!(app.area_channels.width > 0);
}

#[test]
fn test_channel_list_large_and_scrolled() {
    let mut app = with_custom_channels(logged_in_app(), 2_000);
    app.current_screen = CurrentScreen::Channels;
    app.select_channel(1_500);
    let text = buffer_text(&render_frame(&mut app));
    assert!(text.contains("Custom Channel 1496"));
}

#[test]
fn test_confirm_clear_popup() {
    let mut app = with_custom_channels(logged_in_app(), 2);
    app.current_screen = CurrentScreen::Channels;
    app.confirm_clear = true;
    let text = buffer_text(&render_frame(&mut app));
    assert!(text.contains("Remove all 2 custom channels?"));
}

#[test]
fn test_expired_session_is_flagged() {
    let mut app = App::new_ephemeral();
    let creds = Credentials::new("http://panel.local".into(), "bob".into(), "pw".into());
    let data = LoginData {
        is_expired: true,
        ..LoginData::default()
    };
    app.complete_login(&creds, &data);
    let text = buffer_text(&render_frame(&mut app));
    assert!(text.contains("expired"));
}

// ─── Test 4: Forms ─────────────────────────────────────────────────────────────

#[test]
fn test_add_channel_form_renders_fields() {
    let mut app = App::new_ephemeral();
    app.open_add_channel();
    app.input_channel_name = Input::new("My Channel".into());
    app.add_channel_error = Some("Invalid input: stream url is empty".into());

    let text = buffer_text(&render_frame(&mut app));
    assert!(text.contains("My Channel"));
    assert!(text.contains("stream url"));
    assert!(text.contains("stream url is empty"));
}

#[test]
fn test_import_modes_render() {
    let mut app = App::new_ephemeral();
    app.open_import(ImportMode::Paste);
    app.paste_buffer = "#EXTM3U\n#EXTINF:-1,Pasted\nhttp://p/1.m3u8\n".into();
    let text = buffer_text(&render_frame(&mut app));
    assert!(text.contains("paste m3u"));
    assert!(text.contains("#EXTINF:-1,Pasted"));

    app.open_import(ImportMode::Url);
    app.input_import = Input::new("http://lists.local/a.m3u".into());
    let text = buffer_text(&render_frame(&mut app));
    assert!(text.contains("playlist url"));
    assert!(text.contains("http://lists.local/a.m3u"));

    app.open_import(ImportMode::File);
    let text = buffer_text(&render_frame(&mut app));
    assert!(text.contains("playlist file path"));
}

// ─── Test 5: Player Overlay ────────────────────────────────────────────────────

#[test]
fn test_player_overlay_states() {
    let mut app = with_custom_channels(logged_in_app(), 6);
    let channels = app.all_channels();
    assert!(app.begin_playback(0).is_some());
    app.player_status = Some("Playing Big Buck Bunny".into());

    // Hidden: only the now-playing bar
    let text = buffer_text(&render_frame(&mut app));
    assert!(text.contains("now playing"));
    assert!(!text.contains("categories"));

    // List
    app.overlay.as_mut().unwrap().handle(NavKey::Select, &channels);
    let text = buffer_text(&render_frame(&mut app));
    assert!(text.contains("▶"));
    assert!(text.contains("Custom Channel 0"));

    // List + sidebar
    app.overlay.as_mut().unwrap().handle(NavKey::Left, &channels);
    let text = buffer_text(&render_frame(&mut app));
    assert!(text.contains("categories"));
    assert!(text.contains("Group 3"));
}

#[test]
fn test_player_without_overlay_renders() {
    let mut app = App::new_ephemeral();
    app.current_screen = CurrentScreen::Player;
    app.overlay = Some(OverlayNav::new(99));
    render_frame(&mut app);
}

// ─── Test 6: Overlays ──────────────────────────────────────────────────────────

#[test]
fn test_loading_and_notifications_render() {
    let mut app = logged_in_app();
    app.loading_message = Some("Downloading playlist...".into());
    app.notify("Imported 3 channels from test", NotificationLevel::Info);
    app.notify("Something went wrong", NotificationLevel::Error);

    let text = buffer_text(&render_frame(&mut app));
    assert!(text.contains("Downloading playlist"));
    assert!(text.contains("Something went wrong"));
}
