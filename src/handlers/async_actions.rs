use crate::app::{App, AsyncAction, CurrentScreen, NotificationLevel};
use crate::handlers::tasks;
use tokio::sync::mpsc;
use tracing::{debug, info};

pub fn handle_async_action(app: &mut App, action: AsyncAction, tx: &mpsc::Sender<AsyncAction>) {
    match action {
        AsyncAction::LoginSuccess(credentials, data) => {
            info!(account = %tasks::credentials_label(&credentials), "login succeeded");
            app.complete_login(&credentials, &data);
            tasks::start_expiry_probe(app, tx);

            // First login on this device: pull the account playlist in
            if app.channels.custom_channels().is_empty() && tasks::spawn_account_playlist(app, tx) {
                app.notify("Importing your playlist...", NotificationLevel::Info);
            }
        }
        AsyncAction::LoginFailed(message) => {
            app.loading_message = None;
            app.login_error = Some(message.clone());
            app.notify(format!("Login failed: {}", message), NotificationLevel::Error);
        }
        AsyncAction::ExpiryProbed(data) => {
            let now = App::now_epoch();
            let was_expired = app.auth.session().is_expired(now);
            app.auth.apply_probe(&data, now);
            app.persist_auth();
            let expired = app.auth.session().is_expired(now);
            debug!(was_expired, expired, "expiry probe result");
            if expired && !was_expired {
                app.notify("Your subscription has expired", NotificationLevel::Warning);
            } else if !expired && was_expired {
                app.notify("Subscription active again", NotificationLevel::Info);
            }
        }
        AsyncAction::ProbeFailed(message) => {
            // Keep the session; record the attempt so we do not hammer the panel
            app.auth.mark_checked(App::now_epoch());
            app.persist_auth();
            debug!(%message, "expiry probe failed");
        }
        AsyncAction::PlaylistLoaded { source, content } => {
            app.import_playlist_text(&source, &content);
            if app.current_screen == CurrentScreen::Import {
                app.current_screen = CurrentScreen::Channels;
            }
        }
        AsyncAction::ImportFailed(message) => {
            app.loading_message = None;
            app.notify(message, NotificationLevel::Error);
        }
        AsyncAction::PlayerStarted(url) => {
            if app.current_screen != CurrentScreen::Player {
                return;
            }
            let name = app
                .now_playing
                .as_ref()
                .map(|c| c.name.clone())
                .unwrap_or_else(|| url.clone());
            app.player_status = Some(format!("Playing {}", name));
        }
        AsyncAction::PlayerFallback(message) => {
            if app.current_screen != CurrentScreen::Player {
                return;
            }
            app.player_status = Some(message.clone());
            app.notify(message, NotificationLevel::Warning);
        }
        AsyncAction::PlayerFailed(message) => {
            if app.current_screen != CurrentScreen::Player {
                return;
            }
            app.player_status = Some(message.clone());
            app.notify(message, NotificationLevel::Error);
        }
    }
}
