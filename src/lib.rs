pub mod api;
pub mod app;
pub mod auth;
pub mod channels;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod logging;
pub mod m3u;
pub mod navigation;
pub mod player;
pub mod prefs;
pub mod setup;
pub mod ui;

#[cfg(test)]
mod tests {
    use crate::app::{App, CurrentScreen};
    use crate::channels::sample_channels;

    #[test]
    fn test_app_new() {
        let app = App::new_ephemeral();
        assert_eq!(app.current_screen, CurrentScreen::Login);
        assert_eq!(app.all_channels(), sample_channels());
    }
}
