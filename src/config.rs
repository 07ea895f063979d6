use crate::player::PlayerBackend;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "panel-iptv", "panel-iptv")
}

fn default_expiry_check_minutes() -> u64 {
    30
}

fn default_request_timeout_secs() -> u64 {
    20
}

fn default_user_agent() -> String {
    format!("panel-iptv/{}", env!("CARGO_PKG_VERSION"))
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_playback_confirm_secs() -> u64 {
    10
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Panel base url prefilled in the login form
    #[serde(default)]
    pub server_base_url: String,
    #[serde(default)]
    pub player_backend: PlayerBackend,
    #[serde(default = "default_expiry_check_minutes")]
    pub expiry_check_minutes: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_playback_confirm_secs")]
    pub playback_confirm_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_base_url: String::new(),
            player_backend: PlayerBackend::default(),
            expiry_check_minutes: default_expiry_check_minutes(),
            request_timeout_secs: default_request_timeout_secs(),
            playback_confirm_secs: default_playback_confirm_secs(),
            user_agent: default_user_agent(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        project_dirs().map(|p| p.config_dir().join("config.json"))
    }

    pub fn load() -> Result<Self, anyhow::Error> {
        if let Some(config_path) = Self::config_path() {
            if config_path.exists() {
                let content = fs::read_to_string(config_path)?;
                let config: AppConfig = serde_json::from_str(&content)?;
                return Ok(config);
            }
        }
        Ok(AppConfig::default())
    }

    pub fn save(&self) -> Result<(), anyhow::Error> {
        if let Some(proj_dirs) = project_dirs() {
            let config_dir = proj_dirs.config_dir();
            fs::create_dir_all(config_dir)?;
            let config_path = config_dir.join("config.json");
            let content = serde_json::to_string_pretty(self)?;
            fs::write(config_path, content)?;
        }
        Ok(())
    }

    pub fn expiry_check_interval(&self) -> Duration {
        Duration::from_secs(self.expiry_check_minutes.max(1) * 60)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn playback_confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.playback_confirm_secs.max(3))
    }

    /// Returns true if the url changed
    pub fn set_server_base_url(&mut self, url: &str) -> bool {
        let url = url.trim().trim_end_matches('/').to_string();
        if self.server_base_url == url {
            return false;
        }
        self.server_base_url = url;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"player_backend":"Vlc"}"#).unwrap();
        assert_eq!(config.player_backend, PlayerBackend::Vlc);
        assert_eq!(config.expiry_check_minutes, 30);
        assert_eq!(config.expiry_check_interval(), Duration::from_secs(1800));
        assert!(config.user_agent.starts_with("panel-iptv/"));
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = AppConfig {
            expiry_check_minutes: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.expiry_check_interval(), Duration::from_secs(60));
    }
}
