use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        Event,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{info, warn};

use panel_iptv_lib::api::{self, PanelClient};
use panel_iptv_lib::app::{App, AsyncAction, NotificationLevel};
use panel_iptv_lib::auth::AuthStore;
use panel_iptv_lib::channels::ChannelStore;
use panel_iptv_lib::config::AppConfig;
use panel_iptv_lib::handlers::async_actions::handle_async_action;
use panel_iptv_lib::handlers::input::{handle_key_event, handle_paste, InputResult};
use panel_iptv_lib::handlers::mouse::handle_mouse_event;
use panel_iptv_lib::handlers::tasks;
use panel_iptv_lib::player::{self, MediaEngine, PlayerBackend};
use panel_iptv_lib::prefs::{FilePreferences, MemoryPreferences, Preferences};
use panel_iptv_lib::{logging, m3u, setup, ui};

const TICK_RATE: Duration = Duration::from_millis(100);

#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Print every channel (built-in and custom) and exit
    #[arg(long)]
    list: bool,

    /// Import an M3U playlist from a file path or http(s) URL and exit
    #[arg(long, value_name = "PATH_OR_URL")]
    import: Option<String>,

    /// Play a stream URL with the fallback chain and exit
    #[arg(short, long)]
    play: Option<String>,

    /// Player backend: system, software or vlc
    #[arg(short, long)]
    backend: Option<PlayerBackend>,

    /// Check configuration, player install and the stored session
    #[arg(long)]
    check: bool,

    /// Keep all state in memory; nothing is written to disk
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    use clap::Parser;
    let args = Args::parse();

    let (mut config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    if let Some(backend) = args.backend {
        config.player_backend = backend;
    }

    let cli_mode = args.list || args.check || args.import.is_some() || args.play.is_some();
    if cli_mode {
        logging::init_stderr(&config.log_level);
    } else if let Some(path) = logging::init(&config.log_level) {
        info!(path = %path.display(), "logging to file");
    }
    if let Some(e) = &config_error {
        warn!(error = %e, "config unreadable, using defaults");
    }

    let mut prefs = open_prefs(args.ephemeral);

    // -- CLI MODE --
    if args.check {
        return run_check(&config, prefs.as_ref()).await;
    }
    if args.list {
        let store = ChannelStore::load(prefs.as_ref());
        for c in store.all_channels() {
            println!("{:>4}  {:<32}  {:<16}  {}", c.id, c.name, c.category, c.url);
        }
        return Ok(());
    }
    if let Some(source) = args.import {
        let content = if m3u::is_remote_source(&source) {
            api::download_playlist(&source, &config.user_agent, config.request_timeout()).await?
        } else {
            m3u::read_local_playlist(&PathBuf::from(&source))?
        };
        let mut store = ChannelStore::load(prefs.as_ref());
        let added = m3u::import_into(&mut store, &content);
        store.save(prefs.as_mut())?;
        println!("Imported {} channels from {}", added, source);
        return Ok(());
    }
    if let Some(url) = args.play {
        if let Err(hint) = setup::check_backend_installed(config.player_backend) {
            anyhow::bail!(hint);
        }
        return play_direct(&config, &url).await;
    }

    // -- TUI MODE (Default) --
    let mut app = App::new(config, prefs, args.ephemeral);
    if let Err(hint) = setup::check_backend_installed(app.config.player_backend) {
        app.notify(hint, NotificationLevel::Warning);
    }
    let player = player::Player::new(app.config.user_agent.clone());
    let (tx, mut rx) = mpsc::channel::<AsyncAction>(32);
    if app.auth.is_logged_in() {
        tasks::start_expiry_probe(&mut app, &tx);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, &player, tx, &mut rx).await;

    player.stop();
    if let Some(handle) = app.probe_handle.take() {
        handle.abort();
    }

    // Restore Terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err);
    }
    Ok(())
}

fn open_prefs(ephemeral: bool) -> Box<dyn Preferences> {
    if ephemeral {
        return Box::new(MemoryPreferences::new());
    }
    match FilePreferences::open_default() {
        Ok(prefs) => Box::new(prefs),
        Err(e) => {
            warn!(error = %e, "cannot open preferences, running in memory");
            Box::new(MemoryPreferences::new())
        }
    }
}

async fn run_check(config: &AppConfig, prefs: &dyn Preferences) -> Result<(), anyhow::Error> {
    println!("Checking configuration...");
    if let Some(path) = AppConfig::config_path() {
        println!("  config:   {}", path.display());
    }
    if let Some(path) = logging::log_path() {
        println!("  log file: {}", path.display());
    }

    match setup::check_backend_installed(config.player_backend) {
        Ok(()) => println!("  player:   {} ok", config.player_backend.display_name()),
        Err(hint) => {
            println!("  player:   {}", hint);
            if let Some(other) = setup::first_available(config.player_backend) {
                println!("            {} is installed, try --backend", other.display_name());
            }
        }
    }

    let store = ChannelStore::load(prefs);
    println!(
        "  channels: {} ({} custom)",
        store.len(),
        store.custom_channels().len()
    );

    let auth = AuthStore::load(prefs);
    let Some(credentials) = auth.credentials() else {
        println!("  session:  not logged in");
        return Ok(());
    };
    println!(
        "  session:  {} ({})",
        tasks::credentials_label(&credentials),
        auth.session().expiry_label(App::now_epoch())
    );

    let client = PanelClient::new(
        &credentials.server_base_url,
        &config.user_agent,
        config.request_timeout(),
    )?;
    match client.login(&credentials.username, credentials.password()).await {
        Ok(data) => println!(
            "  panel:    login ok, expired={}, expires_at={}",
            data.is_expired,
            data.expires_at.as_deref().unwrap_or("-")
        ),
        Err(e) => println!("  panel:    {}", e.diagnostics()),
    }
    Ok(())
}

async fn play_direct(config: &AppConfig, url: &str) -> Result<(), anyhow::Error> {
    let engine = player::Player::new(config.user_agent.clone());
    let plan = player::fallback_plan(config.player_backend, url);
    let (tx, mut rx) = mpsc::channel::<AsyncAction>(8);

    println!("Playing: {}", url);
    let started =
        player::play_with_fallback(&engine, plan, config.playback_confirm_timeout(), &tx).await;
    drop(tx);
    while let Some(action) = rx.recv().await {
        match action {
            AsyncAction::PlayerFallback(msg) | AsyncAction::PlayerFailed(msg) => {
                println!("{}", msg)
            }
            AsyncAction::PlayerStarted(url) => println!("Started {}", url),
            _ => {}
        }
    }
    if started.is_none() {
        anyhow::bail!("no playable stream for {}", url);
    }
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    player: &player::Player,
    tx: mpsc::Sender<AsyncAction>,
    rx: &mut mpsc::Receiver<AsyncAction>,
) -> io::Result<()> {
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| ui::ui(f, app))?;

        // 1. Async results (non-blocking)
        while let Ok(action) = rx.try_recv() {
            handle_async_action(app, action, &tx);
        }

        // 2. Poll inputs
        if event::poll(TICK_RATE)? {
            match event::read()? {
                Event::Key(key) => {
                    if let InputResult::Quit = handle_key_event(app, key, &tx, player)? {
                        app.should_quit = true;
                    }
                }
                Event::Paste(text) => handle_paste(app, &text),
                Event::Mouse(mouse) => handle_mouse_event(app, mouse),
                _ => {}
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            app.on_tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            if let Some(handle) = app.playback_handle.take() {
                handle.abort();
            }
            return Ok(());
        }
    }
}
