use crate::api::LoginData;
use crate::auth::{AuthStore, Credentials, SecretInput};
use crate::channels::{Channel, ChannelStore, NewChannel};
use crate::config::AppConfig;
use crate::errors::{IptvError, Result};
use crate::m3u;
use crate::navigation::OverlayNav;
use crate::player::PlayerBackend;
use crate::prefs::{MemoryPreferences, Preferences};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{error, info};
use tui_input::Input;

const NOTIFICATION_TTL: Duration = Duration::from_secs(4);
const MAX_NOTIFICATIONS: usize = 4;

/// Results of background work, marshalled back to the UI loop
#[derive(Debug, Clone)]
pub enum AsyncAction {
    LoginSuccess(Credentials, LoginData),
    LoginFailed(String),
    ExpiryProbed(LoginData),
    ProbeFailed(String),
    /// Playlist text downloaded or read, ready to import
    PlaylistLoaded { source: String, content: String },
    ImportFailed(String),
    PlayerStarted(String),
    PlayerFallback(String),
    PlayerFailed(String),
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum CurrentScreen {
    Login,
    Channels,
    AddChannel,
    Import,
    Player,
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum ImportMode {
    Paste,
    Url,
    File,
}

impl ImportMode {
    pub fn title(&self) -> &'static str {
        match self {
            ImportMode::Paste => "paste m3u",
            ImportMode::Url => "import from url",
            ImportMode::File => "import from file",
        }
    }
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum LoginField {
    Server,
    Username,
    Password,
}

impl LoginField {
    pub fn next(self) -> Self {
        match self {
            LoginField::Server => LoginField::Username,
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Server,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            LoginField::Server => LoginField::Password,
            LoginField::Username => LoginField::Server,
            LoginField::Password => LoginField::Username,
        }
    }
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum ChannelField {
    Name,
    Url,
    Logo,
    Category,
}

impl ChannelField {
    pub fn next(self) -> Self {
        match self {
            ChannelField::Name => ChannelField::Url,
            ChannelField::Url => ChannelField::Logo,
            ChannelField::Logo => ChannelField::Category,
            ChannelField::Category => ChannelField::Name,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            ChannelField::Name => ChannelField::Category,
            ChannelField::Url => ChannelField::Name,
            ChannelField::Logo => ChannelField::Url,
            ChannelField::Category => ChannelField::Logo,
        }
    }
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub expires: Instant,
}

pub struct App {
    pub config: AppConfig,
    pub prefs: Box<dyn Preferences>,
    /// Do not write config to disk (tests, `--ephemeral`)
    pub ephemeral: bool,
    pub current_screen: CurrentScreen,
    pub should_quit: bool,

    pub channels: ChannelStore,
    pub auth: AuthStore,

    pub loading_message: Option<String>,
    pub loading_tick: u64,
    pub notifications: VecDeque<Notification>,

    // Login form
    pub login_field_focus: LoginField,
    pub input_server: Input,
    pub input_username: Input,
    pub input_password: SecretInput,
    pub login_error: Option<String>,

    // Channel list
    pub selected_channel_index: usize,
    pub channel_list_state: ListState,
    pub area_channels: Rect,
    pub confirm_clear: bool,

    // Add channel form
    pub channel_field_focus: ChannelField,
    pub input_channel_name: Input,
    pub input_channel_url: Input,
    pub input_channel_logo: Input,
    pub input_channel_category: Input,
    pub add_channel_error: Option<String>,

    // Import
    pub import_mode: ImportMode,
    pub input_import: Input,
    pub paste_buffer: String,

    // Player session
    pub overlay: Option<OverlayNav>,
    pub now_playing: Option<Channel>,
    pub player_status: Option<String>,

    pub probe_handle: Option<JoinHandle<()>>,
    pub playback_handle: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(config: AppConfig, prefs: Box<dyn Preferences>, ephemeral: bool) -> Self {
        let channels = ChannelStore::load(prefs.as_ref());
        let auth = AuthStore::load(prefs.as_ref());
        let current_screen = if auth.is_logged_in() {
            CurrentScreen::Channels
        } else {
            CurrentScreen::Login
        };

        let server = if auth.is_logged_in() {
            auth.session().server_base_url.clone()
        } else {
            config.server_base_url.clone()
        };
        let username = auth.session().username.clone();

        let mut channel_list_state = ListState::default();
        if !channels.is_empty() {
            channel_list_state.select(Some(0));
        }

        Self {
            config,
            prefs,
            ephemeral,
            current_screen,
            should_quit: false,
            channels,
            auth,
            loading_message: None,
            loading_tick: 0,
            notifications: VecDeque::new(),
            login_field_focus: if server.is_empty() {
                LoginField::Server
            } else {
                LoginField::Username
            },
            input_server: Input::new(server),
            input_username: Input::new(username),
            input_password: SecretInput::default(),
            login_error: None,
            selected_channel_index: 0,
            channel_list_state,
            area_channels: Rect::default(),
            confirm_clear: false,
            channel_field_focus: ChannelField::Name,
            input_channel_name: Input::default(),
            input_channel_url: Input::default(),
            input_channel_logo: Input::default(),
            input_channel_category: Input::default(),
            add_channel_error: None,
            import_mode: ImportMode::Paste,
            input_import: Input::default(),
            paste_buffer: String::new(),
            overlay: None,
            now_playing: None,
            player_status: None,
            probe_handle: None,
            playback_handle: None,
        }
    }

    /// In-memory app with default config; nothing touches the disk
    pub fn new_ephemeral() -> Self {
        Self::new(AppConfig::default(), Box::new(MemoryPreferences::new()), true)
    }

    pub fn notify(&mut self, message: impl Into<String>, level: NotificationLevel) {
        let message = message.into();
        match level {
            NotificationLevel::Error => error!(%message, "user notification"),
            _ => info!(%message, "user notification"),
        }
        if self.notifications.len() >= MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
        self.notifications.push_back(Notification {
            message,
            level,
            expires: Instant::now() + NOTIFICATION_TTL,
        });
    }

    pub fn prune_notifications(&mut self, now: Instant) {
        self.notifications.retain(|n| n.expires > now);
    }

    pub fn on_tick(&mut self) {
        self.loading_tick = self.loading_tick.wrapping_add(1);
        self.prune_notifications(Instant::now());
    }

    pub fn save_config(&self) {
        if self.ephemeral {
            return;
        }
        if let Err(e) = self.config.save() {
            error!(error = %e, "failed to save config");
        }
    }

    pub fn persist_channels(&mut self) {
        if let Err(e) = self.channels.save(self.prefs.as_mut()) {
            self.notify(format!("Could not save channels: {}", e), NotificationLevel::Error);
        }
    }

    pub fn persist_auth(&mut self) {
        if let Err(e) = self.auth.save(self.prefs.as_mut()) {
            self.notify(format!("Could not save session: {}", e), NotificationLevel::Error);
        }
    }

    pub fn now_epoch() -> i64 {
        chrono::Utc::now().timestamp()
    }

    pub fn all_channels(&self) -> Vec<Channel> {
        self.channels.all_channels()
    }

    pub fn selected_channel(&self) -> Option<Channel> {
        self.all_channels().into_iter().nth(self.selected_channel_index)
    }

    pub fn select_channel(&mut self, index: usize) {
        let len = self.channels.len();
        if len == 0 {
            self.selected_channel_index = 0;
            self.channel_list_state.select(None);
            return;
        }
        self.selected_channel_index = index.min(len - 1);
        self.channel_list_state.select(Some(self.selected_channel_index));
    }

    pub fn next_channel(&mut self) {
        self.select_channel(self.selected_channel_index.saturating_add(1));
    }

    pub fn previous_channel(&mut self) {
        self.select_channel(self.selected_channel_index.saturating_sub(1));
    }

    // ── Login ────────────────────────────────────────────────────────────────

    pub fn reset_login_form(&mut self) {
        self.input_password.clear();
        self.login_error = None;
    }

    /// Validated credentials from the login form
    pub fn login_credentials(&self) -> Result<Credentials> {
        let server = self.input_server.value().trim();
        let username = self.input_username.value().trim();
        let password = self.input_password.value();
        if server.is_empty() {
            return Err(IptvError::InvalidInput("server url is required".into()));
        }
        if !(server.starts_with("http://") || server.starts_with("https://")) {
            return Err(IptvError::InvalidInput(
                "server url must start with http:// or https://".into(),
            ));
        }
        if username.is_empty() || password.is_empty() {
            return Err(IptvError::InvalidInput(
                "username and password are required".into(),
            ));
        }
        Ok(Credentials::new(
            server.trim_end_matches('/').to_string(),
            username.to_string(),
            password.to_string(),
        ))
    }

    pub fn complete_login(&mut self, credentials: &Credentials, data: &LoginData) {
        let now = Self::now_epoch();
        self.auth.record_login(
            &credentials.server_base_url,
            &credentials.username,
            credentials.password(),
            data,
            now,
        );
        self.persist_auth();
        if self.config.set_server_base_url(&credentials.server_base_url) {
            self.save_config();
        }
        self.reset_login_form();
        self.loading_message = None;
        self.current_screen = CurrentScreen::Channels;

        let session = self.auth.session().clone();
        if session.is_expired(now) {
            self.notify("Your subscription has expired", NotificationLevel::Warning);
        } else {
            self.notify(
                format!("Welcome {} ({})", session.username, session.expiry_label(now)),
                NotificationLevel::Info,
            );
        }
    }

    pub fn logout(&mut self) {
        if let Some(handle) = self.probe_handle.take() {
            handle.abort();
        }
        self.auth.logout();
        self.persist_auth();
        self.reset_login_form();
        self.input_server = Input::new(self.config.server_base_url.clone());
        self.input_username = Input::default();
        self.login_field_focus = LoginField::Username;
        self.overlay = None;
        self.now_playing = None;
        self.current_screen = CurrentScreen::Login;
        self.notify("Logged out", NotificationLevel::Info);
    }

    pub fn is_session_expired(&self) -> bool {
        self.auth.is_logged_in() && self.auth.session().is_expired(Self::now_epoch())
    }

    // ── Channel management ───────────────────────────────────────────────────

    pub fn open_add_channel(&mut self) {
        self.input_channel_name = Input::default();
        self.input_channel_url = Input::default();
        self.input_channel_logo = Input::default();
        self.input_channel_category = Input::default();
        self.channel_field_focus = ChannelField::Name;
        self.add_channel_error = None;
        self.current_screen = CurrentScreen::AddChannel;
    }

    pub fn submit_add_channel(&mut self) -> Result<Channel> {
        let logo = self.input_channel_logo.value().trim().to_string();
        let entry = NewChannel::new(self.input_channel_name.value(), self.input_channel_url.value())
            .with_logo(Some(logo))
            .with_category(self.input_channel_category.value());
        let channel = self.channels.add_channel(entry)?;
        self.persist_channels();
        self.select_channel(self.channels.len() - 1);
        self.current_screen = CurrentScreen::Channels;
        self.notify(format!("Added {}", channel.name), NotificationLevel::Info);
        Ok(channel)
    }

    pub fn remove_selected_channel(&mut self) {
        let Some(channel) = self.selected_channel() else {
            return;
        };
        match self.channels.remove_channel(channel.id) {
            Ok(removed) => {
                self.persist_channels();
                self.select_channel(self.selected_channel_index);
                self.notify(format!("Removed {}", removed.name), NotificationLevel::Info);
            }
            Err(e) => self.notify(e.to_string(), NotificationLevel::Warning),
        }
    }

    pub fn clear_custom_channels(&mut self) {
        let removed = self.channels.clear_custom();
        self.persist_channels();
        self.select_channel(0);
        self.confirm_clear = false;
        self.notify(format!("Cleared {} channels", removed), NotificationLevel::Info);
    }

    pub fn open_import(&mut self, mode: ImportMode) {
        self.import_mode = mode;
        self.input_import = Input::default();
        self.paste_buffer.clear();
        self.current_screen = CurrentScreen::Import;
    }

    /// Import M3U text and report the result. Returns the number added.
    pub fn import_playlist_text(&mut self, source: &str, content: &str) -> usize {
        let added = m3u::import_into(&mut self.channels, content);
        self.loading_message = None;
        if added == 0 {
            self.notify(
                format!("No channels found in {}", source),
                NotificationLevel::Warning,
            );
            return 0;
        }
        self.persist_channels();
        self.select_channel(self.channels.len() - added);
        self.notify(
            format!("Imported {} channels from {}", added, source),
            NotificationLevel::Info,
        );
        added
    }

    pub fn cycle_backend(&mut self) -> PlayerBackend {
        let next = self.config.player_backend.next();
        self.config.player_backend = next;
        self.save_config();
        self.notify(format!("Player: {}", next.display_name()), NotificationLevel::Info);
        next
    }

    // ── Player session ───────────────────────────────────────────────────────

    /// Enter the player for `index` of the full list. Returns the channel to
    /// start, or None if playback is not allowed.
    pub fn begin_playback(&mut self, index: usize) -> Option<Channel> {
        let channel = if self.is_session_expired() {
            self.notify(
                "Subscription expired. Renew your account to keep watching.",
                NotificationLevel::Warning,
            );
            None
        } else {
            self.all_channels().into_iter().nth(index)
        };
        let Some(channel) = channel else {
            self.resync_overlay();
            return None;
        };
        if self.current_screen != CurrentScreen::Player || self.overlay.is_none() {
            self.overlay = Some(OverlayNav::new(index));
        } else if let Some(overlay) = self.overlay.as_mut() {
            overlay.playing_index = index;
        }
        self.select_channel(index);
        self.now_playing = Some(channel.clone());
        self.player_status = Some(format!("Connecting to {}...", channel.name));
        self.current_screen = CurrentScreen::Player;
        Some(channel)
    }

    /// Point the overlay back at the channel that is actually playing
    fn resync_overlay(&mut self) {
        let playing = self
            .now_playing
            .as_ref()
            .and_then(|c| self.channels.index_of(c.id));
        if let (Some(overlay), Some(index)) = (self.overlay.as_mut(), playing) {
            overlay.playing_index = index;
        }
    }

    pub fn leave_player(&mut self) {
        self.overlay = None;
        self.now_playing = None;
        self.player_status = None;
        self.current_screen = CurrentScreen::Channels;
    }
}
