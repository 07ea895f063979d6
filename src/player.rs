use crate::app::AsyncAction;
use crate::errors::{IptvError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The three interchangeable playback engines
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerBackend {
    /// Platform default engine (mpv, hardware decoding)
    #[default]
    System,
    /// Same engine with software codecs enabled as a fallback
    SoftwareDecoder,
    /// VLC
    Vlc,
}

impl PlayerBackend {
    pub fn display_name(&self) -> &'static str {
        match self {
            PlayerBackend::System => "System (mpv)",
            PlayerBackend::SoftwareDecoder => "Software decoder (mpv)",
            PlayerBackend::Vlc => "VLC",
        }
    }

    pub fn all() -> &'static [PlayerBackend] {
        &[
            PlayerBackend::System,
            PlayerBackend::SoftwareDecoder,
            PlayerBackend::Vlc,
        ]
    }

    pub fn next(&self) -> PlayerBackend {
        match self {
            PlayerBackend::System => PlayerBackend::SoftwareDecoder,
            PlayerBackend::SoftwareDecoder => PlayerBackend::Vlc,
            PlayerBackend::Vlc => PlayerBackend::System,
        }
    }

    pub fn program(&self) -> &'static str {
        match self {
            PlayerBackend::System | PlayerBackend::SoftwareDecoder => "mpv",
            PlayerBackend::Vlc => vlc_program(),
        }
    }
}

/// True when `program --version` runs and exits cleanly
pub fn binary_available(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// `cvlc` ships with Linux packages only; Windows and macOS have plain `vlc`
fn vlc_program() -> &'static str {
    static PROGRAM: Lazy<&'static str> = Lazy::new(|| pick_vlc_program(binary_available("cvlc")));
    *PROGRAM
}

fn pick_vlc_program(has_cvlc: bool) -> &'static str {
    if has_cvlc {
        "cvlc"
    } else {
        "vlc"
    }
}

impl std::str::FromStr for PlayerBackend {
    type Err = IptvError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" | "mpv" | "default" => Ok(PlayerBackend::System),
            "software" | "sw" | "ffmpeg" => Ok(PlayerBackend::SoftwareDecoder),
            "vlc" => Ok(PlayerBackend::Vlc),
            other => Err(IptvError::InvalidInput(format!("unknown player backend '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderMode {
    Hardware,
    Software,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackAttempt {
    pub backend: PlayerBackend,
    pub url: String,
    pub decoder: DecoderMode,
    /// Shown to the user before this attempt starts (None for the first)
    pub notice: Option<String>,
}

/// Guess another form of the same stream: HLS vs MPEG-TS, or HLS for an
/// extensionless path. Returns `None` when nothing different can be guessed.
pub fn alternate_url(url: &str) -> Option<String> {
    let url = url.trim();
    let (base, query) = match url.find('?') {
        Some(i) => (&url[..i], &url[i..]),
        None => (url, ""),
    };

    let last_slash = base.rfind('/')?;
    // Bare host ("http://host") has nothing to rewrite
    if base[..last_slash].ends_with('/') || last_slash + 1 == base.len() {
        return None;
    }
    let segment = &base[last_slash + 1..];

    let rewritten = if let Some(stem) = segment.strip_suffix(".ts") {
        format!("{}{}.m3u8", &base[..last_slash + 1], stem)
    } else if let Some(stem) = segment.strip_suffix(".m3u8") {
        if stem.is_empty() {
            return None;
        }
        format!("{}{}.ts", &base[..last_slash + 1], stem)
    } else if !segment.contains('.') {
        format!("{}.m3u8", base)
    } else {
        return None;
    };

    Some(format!("{}{}", rewritten, query))
}

/// Ordered playback attempts for a backend
pub fn fallback_plan(backend: PlayerBackend, url: &str) -> Vec<PlaybackAttempt> {
    let alternate = alternate_url(url);
    let attempt = |url: &str, decoder: DecoderMode, notice: Option<&str>| PlaybackAttempt {
        backend,
        url: url.to_string(),
        decoder,
        notice: notice.map(String::from),
    };
    let alt_notice = "Stream failed, trying alternate stream form";

    let mut plan = Vec::new();
    match backend {
        PlayerBackend::System => {
            plan.push(attempt(url, DecoderMode::Hardware, None));
            if let Some(alt) = &alternate {
                plan.push(attempt(alt, DecoderMode::Hardware, Some(alt_notice)));
            }
        }
        PlayerBackend::SoftwareDecoder => {
            plan.push(attempt(url, DecoderMode::Hardware, None));
            plan.push(attempt(
                url,
                DecoderMode::Software,
                Some("Decoder error, switching to software decoding"),
            ));
            if let Some(alt) = &alternate {
                plan.push(attempt(alt, DecoderMode::Software, Some(alt_notice)));
            }
        }
        PlayerBackend::Vlc => {
            plan.push(attempt(url, DecoderMode::Hardware, None));
            if let Some(alt) = &alternate {
                plan.push(attempt(alt, DecoderMode::Hardware, Some(alt_notice)));
            }
        }
    }
    plan
}

/// Program and arguments for an attempt
pub fn engine_command(attempt: &PlaybackAttempt, user_agent: &str) -> (String, Vec<String>) {
    let mut args = Vec::new();
    match attempt.backend {
        PlayerBackend::System | PlayerBackend::SoftwareDecoder => {
            args.push(attempt.url.clone());
            args.push("--force-window".to_string());
            args.push("--cache=yes".to_string());
            args.push("--demuxer-max-bytes=128MiB".to_string());
            args.push("--msg-level=all=no".to_string());
            args.push("--term-status-msg=no".to_string());
            args.push(format!("--user-agent={}", user_agent));
            match attempt.decoder {
                DecoderMode::Hardware => args.push("--hwdec=auto".to_string()),
                DecoderMode::Software => args.push("--hwdec=no".to_string()),
            }
            if attempt.backend == PlayerBackend::SoftwareDecoder {
                // Let libavcodec pick every available thread for software codecs
                args.push("--vd-lavc-threads=0".to_string());
                args.push("--ad-lavc-downmix=yes".to_string());
            }
        }
        PlayerBackend::Vlc => {
            args.push(attempt.url.clone());
            args.push("--fullscreen".to_string());
            args.push("--quiet".to_string());
            args.push(format!("--http-user-agent={}", user_agent));
            if attempt.decoder == DecoderMode::Software {
                args.push("--avcodec-hw=none".to_string());
            }
        }
    }
    (attempt.backend.program().to_string(), args)
}

/// Seam between the fallback loop and the real process launcher
pub trait MediaEngine: Send + Sync {
    fn start(&self, attempt: &PlaybackAttempt) -> Result<()>;
    /// Resolve to true once playback looks established
    fn confirm(&self, timeout: Duration) -> impl Future<Output = bool> + Send;
    fn stop(&self);
}

#[derive(Clone)]
pub struct Player {
    process: Arc<Mutex<Option<Child>>>,
    user_agent: String,
}

impl Player {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            process: Arc::new(Mutex::new(None)),
            user_agent: user_agent.into(),
        }
    }

    /// Check if the engine process is still running
    pub fn is_running(&self) -> bool {
        if let Ok(mut guard) = self.process.lock() {
            if let Some(ref mut child) = *guard {
                // try_wait returns Ok(Some(status)) if exited, Ok(None) if still running
                matches!(child.try_wait(), Ok(None))
            } else {
                false
            }
        } else {
            false
        }
    }

    /// Wait for the engine to start playing by polling process status.
    /// Surviving two seconds counts as success.
    pub async fn wait_for_playback(&self, timeout: Duration) -> bool {
        use tokio::time::{sleep, Instant};

        let start = Instant::now();
        sleep(Duration::from_millis(500)).await;

        while start.elapsed() < timeout {
            if !self.is_running() {
                return false;
            }
            if start.elapsed() > Duration::from_millis(2000) {
                return true;
            }
            sleep(Duration::from_millis(200)).await;
        }
        self.is_running()
    }
}

impl MediaEngine for Player {
    fn start(&self, attempt: &PlaybackAttempt) -> Result<()> {
        self.stop();
        let (program, args) = engine_command(attempt, &self.user_agent);
        debug!(%program, url = %attempt.url, decoder = ?attempt.decoder, "starting engine");

        let child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                IptvError::Playback(format!(
                    "Failed to start {}: {}. Make sure it is installed and in PATH.",
                    program, e
                ))
            })?;

        let mut guard = self
            .process
            .lock()
            .map_err(|e| IptvError::Playback(format!("Failed to lock process mutex: {}", e)))?;
        *guard = Some(child);
        Ok(())
    }

    fn confirm(&self, timeout: Duration) -> impl Future<Output = bool> + Send {
        let player = self.clone();
        async move { player.wait_for_playback(timeout).await }
    }

    fn stop(&self) {
        if let Ok(mut guard) = self.process.lock() {
            if let Some(mut child) = guard.take() {
                let _ = child.kill();
                let _ = child.wait();
            }
        }
    }
}

/// Run a fallback plan, reporting progress on `tx`. Returns the attempt that
/// succeeded, if any.
pub async fn play_with_fallback<E: MediaEngine>(
    engine: &E,
    plan: Vec<PlaybackAttempt>,
    confirm_timeout: Duration,
    tx: &mpsc::Sender<AsyncAction>,
) -> Option<PlaybackAttempt> {
    let mut last_error = String::from("no playable stream");
    for attempt in plan {
        if let Some(notice) = &attempt.notice {
            let _ = tx.send(AsyncAction::PlayerFallback(notice.clone())).await;
        }
        match engine.start(&attempt) {
            Ok(()) => {
                if engine.confirm(confirm_timeout).await {
                    info!(url = %attempt.url, backend = ?attempt.backend, "playback started");
                    let _ = tx.send(AsyncAction::PlayerStarted(attempt.url.clone())).await;
                    return Some(attempt);
                }
                engine.stop();
                last_error = format!(
                    "{} stopped before playback started",
                    attempt.backend.display_name()
                );
            }
            Err(e) => {
                warn!(error = %e, "engine failed to start");
                last_error = e.to_string();
            }
        }
    }
    let _ = tx
        .send(AsyncAction::PlayerFailed(format!("Unable to play channel: {}", last_error)))
        .await;
    None
}
