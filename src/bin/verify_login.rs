//! Log in to a panel from the command line and print what it returns.
//!
//! Useful for checking a server without the TUI:
//! `verify_login http://panel.example.com alice secret --playlist`

use clap::Parser;
use panel_iptv_lib::api::PanelClient;
use panel_iptv_lib::auth::parse_expiry;
use panel_iptv_lib::config::AppConfig;
use panel_iptv_lib::{logging, m3u};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(about = "Verify panel credentials")]
struct Args {
    server: String,
    username: String,
    password: String,

    /// Also download the returned playlist and count its entries
    #[arg(long)]
    playlist: bool,

    #[arg(long, default_value_t = 20)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    let config = AppConfig::load().unwrap_or_default();
    logging::init_stderr(&config.log_level);

    let client = PanelClient::new(
        &args.server,
        &config.user_agent,
        Duration::from_secs(args.timeout_secs),
    )?;
    println!("POST {}", client.login_url());

    let data = match client.login(&args.username, &args.password).await {
        Ok(data) => data,
        Err(e) => {
            println!("Login failed: {}", e.diagnostics());
            std::process::exit(1);
        }
    };

    println!("Login ok");
    println!("  playlist_url:   {}", data.playlist_url.as_deref().unwrap_or("-"));
    println!("  expires_at:     {}", data.expires_at.as_deref().unwrap_or("-"));
    if let Some(epoch) = data.expires_at.as_deref().and_then(parse_expiry) {
        println!("  expires_epoch:  {}", epoch);
    }
    println!("  is_expired:     {}", data.is_expired);
    if let Some(days) = data.days_remaining {
        println!("  days_remaining: {}", days);
    }

    if args.playlist {
        let Some(url) = data.playlist_url.as_deref() else {
            println!("No playlist url returned");
            return Ok(());
        };
        let content = client.fetch_playlist(url).await?;
        let entries = m3u::parse(&content);
        println!("Playlist: {} entries", entries.len());
        for entry in entries.iter().take(5) {
            println!("  {} [{}] {}", entry.name, entry.group.as_deref().unwrap_or("-"), entry.url);
        }
    }
    Ok(())
}
