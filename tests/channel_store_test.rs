use panel_iptv_lib::channels::{
    decode_channels, encode_channels, sample_channels, ChannelStore, NewChannel, ALL_CATEGORY,
};
use panel_iptv_lib::app::{App, AsyncAction, CurrentScreen};
use panel_iptv_lib::handlers::async_actions::handle_async_action;
use panel_iptv_lib::handlers::tasks;
use panel_iptv_lib::m3u;
use panel_iptv_lib::navigation::{NavKey, NavOutcome, OverlayNav, OverlayState};
use panel_iptv_lib::prefs::{FilePreferences, Preferences};
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

// ─── Helpers ───────────────────────────────────────────────────────────────────

fn playlist(count: usize) -> String {
    let mut text = String::from("#EXTM3U\n");
    for i in 0..count {
        let group = ["News", "Sports", "Kids"][i % 3];
        text.push_str(&format!(
            "#EXTINF:-1 tvg-id=\"c{i}\" group-title=\"{group}\",Channel {i}\nhttp://stream.local/{i}.m3u8\n"
        ));
    }
    text
}

/// Small deterministic generator so the key sequences are reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

const KEYS: [NavKey; 8] = [
    NavKey::Up,
    NavKey::Down,
    NavKey::Left,
    NavKey::Right,
    NavKey::Select,
    NavKey::Back,
    NavKey::ChannelUp,
    NavKey::ChannelDown,
];

// ─── Persistence ───────────────────────────────────────────────────────────────

#[test]
fn test_custom_channels_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");

    {
        let mut prefs = FilePreferences::open(&path).unwrap();
        let mut store = ChannelStore::load(&prefs);
        store
            .add_channel(
                NewChannel::new("Comma, Pipe | Percent %", "http://x/a,b|c.m3u8")
                    .with_category("Odd|Group"),
            )
            .unwrap();
        assert_eq!(m3u::import_into(&mut store, &playlist(5)), 5);
        store.save(&mut prefs).unwrap();
    }

    let prefs = FilePreferences::open(&path).unwrap();
    let store = ChannelStore::load(&prefs);
    let custom = store.custom_channels();
    assert_eq!(custom.len(), 6);
    assert_eq!(custom[0].name, "Comma, Pipe | Percent %");
    assert_eq!(custom[0].url, "http://x/a,b|c.m3u8");
    assert_eq!(custom[0].category, "Odd|Group");
    assert_eq!(custom[1].category, "News");
}

#[test]
fn test_ids_unique_across_reload_and_clear() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");

    let mut prefs = FilePreferences::open(&path).unwrap();
    let mut store = ChannelStore::load(&prefs);
    m3u::import_into(&mut store, &playlist(4));
    let first_batch: Vec<u32> = store.custom_channels().iter().map(|c| c.id).collect();
    store.clear_custom();
    store.save(&mut prefs).unwrap();

    let mut store = ChannelStore::load(&FilePreferences::open(&path).unwrap());
    m3u::import_into(&mut store, &playlist(4));

    let ids: Vec<u32> = store.all_channels().iter().map(|c| c.id).collect();
    let unique: HashSet<u32> = ids.iter().copied().collect();
    assert_eq!(ids.len(), unique.len());
    for id in first_batch {
        assert!(store.get(id).is_none(), "id {} was reused", id);
    }
}

#[test]
fn test_corrupt_prefs_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    std::fs::write(&path, "{not json").unwrap();

    let prefs = FilePreferences::open(&path).unwrap();
    assert!(prefs.get_string("custom_channels").is_none());
    let store = ChannelStore::load(&prefs);
    assert_eq!(store.all_channels(), sample_channels());
}

#[test]
fn test_codec_skips_malformed_records() {
    let store_text = encode_channels(&sample_channels());
    let damaged = format!("{}|garbage|7,only,three", store_text);
    assert_eq!(decode_channels(&damaged), sample_channels());
}

// ─── M3U import ────────────────────────────────────────────────────────────────

#[test]
fn test_import_count_matches_pairs() {
    for n in [0, 1, 7, 30] {
        let mut store = ChannelStore::default();
        assert_eq!(m3u::import_into(&mut store, &playlist(n)), n);
    }
}

#[test]
fn test_trailing_metadata_adds_nothing() {
    let mut store = ChannelStore::default();
    let text = format!("{}#EXTINF:-1,Dangling\n", playlist(2));
    assert_eq!(m3u::import_into(&mut store, &text), 2);
}

#[tokio::test]
async fn test_local_file_import_through_the_ui_loop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.m3u");
    let mut bytes = b"\xef\xbb\xbf#EXTM3U\r\n".to_vec();
    bytes.extend_from_slice(b"#EXTINF:-1 group-title=\"News\",Caf\xe9 TV\r\nhttp://s/1.ts\r\n");
    bytes.extend_from_slice(b"#extinf:-1,Lowercase Tag\r\nhttp://s/2.ts\r\n");
    bytes.extend_from_slice(b"#EXTINF:-1,Dangling\r\n");
    std::fs::write(&path, bytes).unwrap();

    let (tx, mut rx) = mpsc::channel(8);
    let mut app = App::new_ephemeral();
    app.current_screen = CurrentScreen::Import;
    tasks::spawn_file_read(&mut app, path, &tx);
    assert!(app.loading_message.is_some());

    let action = timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap();
    assert!(matches!(action, AsyncAction::PlaylistLoaded { .. }));
    handle_async_action(&mut app, action, &tx);

    let custom = app.channels.custom_channels();
    assert_eq!(custom.len(), 2);
    assert_eq!(custom[0].name, "Caf\u{fffd} TV");
    assert_eq!(custom[0].category, "News");
    assert_eq!(custom[1].name, "Lowercase Tag");
    assert_eq!(app.current_screen, CurrentScreen::Channels);
    assert!(app.loading_message.is_none());
}

#[tokio::test]
async fn test_missing_local_file_reports_failure() {
    let dir = tempfile::tempdir().unwrap();
    let (tx, mut rx) = mpsc::channel(8);
    let mut app = App::new_ephemeral();
    tasks::spawn_file_read(&mut app, dir.path().join("nope.m3u"), &tx);

    let action = timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap();
    assert!(matches!(action, AsyncAction::ImportFailed(_)));
    handle_async_action(&mut app, action, &tx);
    assert!(app.loading_message.is_none());
    assert!(app.channels.custom_channels().is_empty());
}

// ─── Overlay navigation ────────────────────────────────────────────────────────

#[test]
fn test_random_key_sequences_stay_in_bounds() {
    let mut store = ChannelStore::default();
    m3u::import_into(&mut store, &playlist(11));
    let channels = store.all_channels();
    let categories = store.categories();

    let mut rng = Lcg(42);
    let mut nav = OverlayNav::new(0);
    for _ in 0..5_000 {
        let key = KEYS[(rng.next() % KEYS.len() as u64) as usize];
        if let NavOutcome::Play(index) = nav.handle(key, &channels) {
            assert!(index < channels.len());
        }
        assert!(nav.playing_index < channels.len());
        assert!(nav.selected_sidebar_index < categories.len());
        let visible = nav.visible_channels(&channels).len();
        if nav.state() != OverlayState::Hidden {
            assert!(nav.selected_list_index < visible.max(1));
        }
    }
}

#[test]
fn test_sidebar_select_resets_list_index() {
    let mut store = ChannelStore::default();
    m3u::import_into(&mut store, &playlist(9));
    let channels = store.all_channels();

    let mut nav = OverlayNav::new(0);
    nav.handle(NavKey::Select, &channels);
    for _ in 0..3 {
        nav.handle(NavKey::Down, &channels);
    }
    assert_eq!(nav.selected_list_index, 3);

    nav.handle(NavKey::Left, &channels);
    assert_eq!(nav.state(), OverlayState::ListWithSidebar);
    nav.handle(NavKey::Down, &channels);
    nav.handle(NavKey::Select, &channels);

    assert_eq!(nav.state(), OverlayState::List);
    assert_eq!(nav.selected_list_index, 0);
    assert_ne!(nav.selected_category, ALL_CATEGORY);
}

#[test]
fn test_channel_zapping_clamps_at_ends() {
    let channels = sample_channels();
    let mut nav = OverlayNav::new(0);
    assert_eq!(nav.handle(NavKey::ChannelUp, &channels), NavOutcome::Ignored);
    assert_eq!(nav.handle(NavKey::ChannelDown, &channels), NavOutcome::Play(1));

    let last = channels.len() - 1;
    let mut nav = OverlayNav::new(last);
    assert_eq!(nav.handle(NavKey::ChannelDown, &channels), NavOutcome::Ignored);
    assert_eq!(nav.playing_index, last);
}
