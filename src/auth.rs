//! Session persistence and account expiry tracking.

use crate::api::{LoginData, PanelClient};
use crate::app::AsyncAction;
use crate::errors::Result;
use crate::prefs::Preferences;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use zeroize::{Zeroize, Zeroizing};

const KEY_LOGGED_IN: &str = "auth.logged_in";
const KEY_SERVER_URL: &str = "auth.server_url";
const KEY_USERNAME: &str = "auth.username";
const KEY_PASSWORD: &str = "auth.password";
const KEY_PLAYLIST_URL: &str = "auth.playlist_url";
const KEY_EXPIRES_AT: &str = "auth.expires_at";
const KEY_EXPIRES_AT_EPOCH: &str = "auth.expires_at_epoch";
const KEY_SERVER_EXPIRED: &str = "auth.server_expired";
const KEY_DAYS_REMAINING: &str = "auth.days_remaining";
const KEY_LAST_CHECKED_AT: &str = "auth.last_checked_at";

const SESSION_KEYS: &[&str] = &[
    KEY_LOGGED_IN,
    KEY_SERVER_URL,
    KEY_USERNAME,
    KEY_PASSWORD,
    KEY_PLAYLIST_URL,
    KEY_EXPIRES_AT,
    KEY_EXPIRES_AT_EPOCH,
    KEY_SERVER_EXPIRED,
    KEY_DAYS_REMAINING,
    KEY_LAST_CHECKED_AT,
];

/// Username + password pair handed to background probes. The password is
/// wiped when the value is dropped.
#[derive(Clone)]
pub struct Credentials {
    pub server_base_url: String,
    pub username: String,
    password: String,
}

impl Credentials {
    pub fn new(server_base_url: String, username: String, password: String) -> Self {
        Self {
            server_base_url,
            username,
            password,
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("server_base_url", &self.server_base_url)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl Drop for Credentials {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

/// Password field buffer. Edits only happen at the end of the value, and any
/// buffer that is replaced or cleared is wiped first.
#[derive(Default)]
pub struct SecretInput {
    value: Zeroizing<String>,
}

impl SecretInput {
    pub fn new(value: &str) -> Self {
        let mut input = Self::default();
        input.push_str(value);
        input
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    pub fn push(&mut self, c: char) {
        self.reserve(c.len_utf8());
        self.value.push(c);
    }

    pub fn push_str(&mut self, text: &str) {
        self.reserve(text.len());
        self.value.push_str(text);
    }

    pub fn pop(&mut self) {
        // Popped bytes stay in spare capacity until the next wipe
        self.value.pop();
    }

    pub fn clear(&mut self) {
        self.value.zeroize();
    }

    /// Grow into a fresh buffer so `String` never reallocates behind our back
    fn reserve(&mut self, additional: usize) {
        if self.value.capacity() - self.value.len() >= additional {
            return;
        }
        let capacity = (self.value.len() + additional).max(16) * 2;
        let mut grown = String::with_capacity(capacity);
        grown.push_str(&self.value);
        self.value = Zeroizing::new(grown);
    }
}

impl std::fmt::Debug for SecretInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretInput")
            .field("len", &self.value.len())
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub logged_in: bool,
    pub server_base_url: String,
    pub username: String,
    pub playlist_url: Option<String>,
    pub expires_at_raw: Option<String>,
    pub expires_at_epoch: Option<i64>,
    pub server_expired: bool,
    pub days_remaining: Option<i64>,
    pub last_checked_at: Option<i64>,
}

impl Session {
    /// Expired if the panel says so or the parsed expiry has passed
    pub fn is_expired(&self, now: i64) -> bool {
        self.server_expired || self.expires_at_epoch.map(|t| t <= now).unwrap_or(false)
    }

    /// Whole days left until expiry, preferring our own clock over the
    /// panel's figure when a timestamp is known
    pub fn days_left(&self, now: i64) -> Option<i64> {
        match self.expires_at_epoch {
            Some(t) => Some(((t - now).max(0)) / 86_400),
            None => self.days_remaining,
        }
    }

    pub fn needs_probe(&self, now: i64, interval: Duration) -> bool {
        if !self.logged_in {
            return false;
        }
        match self.last_checked_at {
            Some(last) => now - last >= interval.as_secs() as i64,
            None => true,
        }
    }

    fn apply_login_data(&mut self, data: &LoginData, now: i64) {
        self.playlist_url = data.playlist_url.clone();
        self.expires_at_raw = data.expires_at.clone();
        self.expires_at_epoch = data.expires_at.as_deref().and_then(parse_expiry);
        self.server_expired = data.is_expired;
        self.days_remaining = data.days_remaining;
        self.last_checked_at = Some(now);
    }

    pub fn expiry_label(&self, now: i64) -> String {
        if !self.logged_in {
            return "not logged in".to_string();
        }
        if self.is_expired(now) {
            return "expired".to_string();
        }
        match (self.expires_at_epoch, self.days_left(now)) {
            (Some(t), Some(days)) => {
                let date = DateTime::<Utc>::from_timestamp(t, 0)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                format!("expires {} ({}d left)", date, days)
            }
            (None, Some(days)) => format!("{}d left", days),
            _ => "no expiry".to_string(),
        }
    }
}

/// Parse the panel's expiry field into epoch seconds (UTC)
pub fn parse_expiry(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(n) = raw.parse::<i64>() {
        if n <= 0 {
            return None;
        }
        // Millisecond timestamps are 13 digits
        return Some(if n > 1_000_000_000_000 { n / 1000 } else { n });
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.and_utc().timestamp());
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp());
        }
    }
    warn!(raw, "unrecognised expiry format");
    None
}

/// Session state plus the stored password, mirrored into preferences
#[derive(Default)]
pub struct AuthStore {
    session: Session,
    password: Option<String>,
}

impl AuthStore {
    pub fn load(prefs: &dyn Preferences) -> Self {
        let session = Session {
            logged_in: prefs.get_bool(KEY_LOGGED_IN),
            server_base_url: prefs.get_string(KEY_SERVER_URL).unwrap_or_default(),
            username: prefs.get_string(KEY_USERNAME).unwrap_or_default(),
            playlist_url: prefs.get_string(KEY_PLAYLIST_URL),
            expires_at_raw: prefs.get_string(KEY_EXPIRES_AT),
            expires_at_epoch: prefs.get_i64(KEY_EXPIRES_AT_EPOCH),
            server_expired: prefs.get_bool(KEY_SERVER_EXPIRED),
            days_remaining: prefs.get_i64(KEY_DAYS_REMAINING),
            last_checked_at: prefs.get_i64(KEY_LAST_CHECKED_AT),
        };
        Self {
            session,
            password: prefs.get_string(KEY_PASSWORD),
        }
    }

    pub fn save(&self, prefs: &mut dyn Preferences) -> Result<()> {
        let s = &self.session;
        if !s.logged_in {
            for key in SESSION_KEYS {
                prefs.remove(key);
            }
            return prefs.flush();
        }
        prefs.put_bool(KEY_LOGGED_IN, true);
        prefs.put_string(KEY_SERVER_URL, s.server_base_url.clone());
        prefs.put_string(KEY_USERNAME, s.username.clone());
        match &self.password {
            Some(p) => prefs.put_string(KEY_PASSWORD, p.clone()),
            None => prefs.remove(KEY_PASSWORD),
        }
        put_opt_string(prefs, KEY_PLAYLIST_URL, s.playlist_url.as_ref());
        put_opt_string(prefs, KEY_EXPIRES_AT, s.expires_at_raw.as_ref());
        put_opt_i64(prefs, KEY_EXPIRES_AT_EPOCH, s.expires_at_epoch);
        prefs.put_bool(KEY_SERVER_EXPIRED, s.server_expired);
        put_opt_i64(prefs, KEY_DAYS_REMAINING, s.days_remaining);
        put_opt_i64(prefs, KEY_LAST_CHECKED_AT, s.last_checked_at);
        prefs.flush()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.logged_in
    }

    pub fn record_login(
        &mut self,
        server_base_url: &str,
        username: &str,
        password: &str,
        data: &LoginData,
        now: i64,
    ) {
        if let Some(old) = self.password.as_mut() {
            old.zeroize();
        }
        self.session = Session {
            logged_in: true,
            server_base_url: server_base_url.trim().trim_end_matches('/').to_string(),
            username: username.trim().to_string(),
            ..Session::default()
        };
        self.session.apply_login_data(data, now);
        self.password = Some(password.to_string());
        info!(
            username = %self.session.username,
            expired = self.session.is_expired(now),
            "login recorded"
        );
    }

    /// Update expiry fields from a background probe
    pub fn apply_probe(&mut self, data: &LoginData, now: i64) {
        if !self.session.logged_in {
            return;
        }
        self.session.apply_login_data(data, now);
        debug!(expired = self.session.is_expired(now), "expiry probe applied");
    }

    pub fn mark_checked(&mut self, now: i64) {
        if self.session.logged_in {
            self.session.last_checked_at = Some(now);
        }
    }

    pub fn logout(&mut self) {
        if let Some(p) = self.password.as_mut() {
            p.zeroize();
        }
        self.password = None;
        self.session = Session::default();
        info!("logged out");
    }

    pub fn credentials(&self) -> Option<Credentials> {
        if !self.session.logged_in {
            return None;
        }
        let password = self.password.clone()?;
        Some(Credentials::new(
            self.session.server_base_url.clone(),
            self.session.username.clone(),
            password,
        ))
    }
}

impl Drop for AuthStore {
    fn drop(&mut self) {
        if let Some(p) = self.password.as_mut() {
            p.zeroize();
        }
    }
}

fn put_opt_string(prefs: &mut dyn Preferences, key: &str, value: Option<&String>) {
    match value {
        Some(v) => prefs.put_string(key, v.clone()),
        None => prefs.remove(key),
    }
}

fn put_opt_i64(prefs: &mut dyn Preferences, key: &str, value: Option<i64>) {
    match value {
        Some(v) => prefs.put_i64(key, v),
        None => prefs.remove(key),
    }
}

/// Re-authenticate on an interval so the UI learns about expiry without a
/// restart. With `immediate` the first probe runs right away instead of after
/// one interval. Failures are reported but never log the user out.
pub fn spawn_expiry_probe(
    client: PanelClient,
    credentials: Credentials,
    interval: Duration,
    immediate: bool,
    tx: mpsc::Sender<AsyncAction>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately
        if !immediate {
            ticker.tick().await;
        }
        loop {
            ticker.tick().await;
            let action = match client
                .login(&credentials.username, credentials.password())
                .await
            {
                Ok(data) => AsyncAction::ExpiryProbed(data),
                Err(e) => {
                    warn!(error = %e, "expiry probe failed");
                    AsyncAction::ProbeFailed(e.to_string())
                }
            };
            if tx.send(action).await.is_err() {
                debug!("ui channel closed, stopping expiry probe");
                break;
            }
        }
    })
}
