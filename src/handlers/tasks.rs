//! Fire-and-forget background work. Every task reports back through the
//! `AsyncAction` channel and never touches `App` directly.

use crate::api::{self, PanelClient};
use crate::app::{App, AsyncAction};
use crate::auth::{self, Credentials};
use crate::m3u;
use crate::player::{self, Player};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::warn;

pub fn spawn_login(app: &mut App, tx: &mpsc::Sender<AsyncAction>) {
    let credentials = match app.login_credentials() {
        Ok(c) => c,
        Err(e) => {
            app.login_error = Some(e.to_string());
            return;
        }
    };
    let client = match PanelClient::new(
        &credentials.server_base_url,
        &app.config.user_agent,
        app.config.request_timeout(),
    ) {
        Ok(c) => c,
        Err(e) => {
            app.login_error = Some(e.to_string());
            return;
        }
    };

    app.login_error = None;
    app.loading_message = Some(format!("Logging in to {}...", client.base_url));
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = client
            .login(&credentials.username, credentials.password())
            .await;
        let action = match result {
            Ok(data) => AsyncAction::LoginSuccess(credentials, data),
            Err(e) => AsyncAction::LoginFailed(e.to_string()),
        };
        let _ = tx.send(action).await;
    });
}

/// (Re)start the periodic expiry probe for the stored session
pub fn start_expiry_probe(app: &mut App, tx: &mpsc::Sender<AsyncAction>) {
    if let Some(handle) = app.probe_handle.take() {
        handle.abort();
    }
    let Some(credentials) = app.auth.credentials() else {
        return;
    };
    let client = match PanelClient::new(
        &credentials.server_base_url,
        &app.config.user_agent,
        app.config.request_timeout(),
    ) {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "cannot start expiry probe");
            return;
        }
    };
    let interval = app.config.expiry_check_interval();
    let immediate = app.auth.session().needs_probe(App::now_epoch(), interval);
    app.probe_handle = Some(auth::spawn_expiry_probe(
        client,
        credentials,
        interval,
        immediate,
        tx.clone(),
    ));
}

pub fn spawn_playlist_download(app: &mut App, url: String, tx: &mpsc::Sender<AsyncAction>) {
    app.loading_message = Some("Downloading playlist...".to_string());
    let user_agent = app.config.user_agent.clone();
    let timeout = app.config.request_timeout();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = api::download_playlist(&url, &user_agent, timeout).await;
        let action = match result {
            Ok(content) => AsyncAction::PlaylistLoaded {
                source: url,
                content,
            },
            Err(e) => AsyncAction::ImportFailed(format!("Download failed: {}", e)),
        };
        let _ = tx.send(action).await;
    });
}

pub fn spawn_file_read(app: &mut App, path: PathBuf, tx: &mpsc::Sender<AsyncAction>) {
    app.loading_message = Some("Reading playlist file...".to_string());
    let tx = tx.clone();
    tokio::task::spawn_blocking(move || {
        let action = match m3u::read_local_playlist(&path) {
            Ok(content) => AsyncAction::PlaylistLoaded {
                source: path.display().to_string(),
                content,
            },
            Err(e) => AsyncAction::ImportFailed(e.to_string()),
        };
        let _ = tx.blocking_send(action);
    });
}

/// Import the playlist the panel handed out at login
pub fn spawn_account_playlist(app: &mut App, tx: &mpsc::Sender<AsyncAction>) -> bool {
    match app.auth.session().playlist_url.clone() {
        Some(url) if !url.trim().is_empty() => {
            spawn_playlist_download(app, url, tx);
            true
        }
        _ => false,
    }
}

/// Start (or switch) playback for `index` of the full channel list
pub fn spawn_playback(
    app: &mut App,
    index: usize,
    player: &Player,
    tx: &mpsc::Sender<AsyncAction>,
) {
    let Some(channel) = app.begin_playback(index) else {
        return;
    };
    if let Some(handle) = app.playback_handle.take() {
        handle.abort();
    }

    let plan = player::fallback_plan(app.config.player_backend, &channel.url);
    let timeout = app.config.playback_confirm_timeout();
    let player = player.clone();
    let tx = tx.clone();
    app.playback_handle = Some(tokio::spawn(async move {
        player::play_with_fallback(&player, plan, timeout, &tx).await;
    }));
}

pub fn stop_playback(app: &mut App, player: &Player) {
    if let Some(handle) = app.playback_handle.take() {
        handle.abort();
    }
    player::MediaEngine::stop(player);
    app.leave_player();
}

/// Short `user@server` label for logs
pub fn credentials_label(credentials: &Credentials) -> String {
    format!("{}@{}", credentials.username, credentials.server_base_url)
}
