use crate::errors::{ConnectionStage, IptvError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

pub const LOGIN_PATH: &str = "/api/user/login";

fn flex_i64<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Value = Deserialize::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn flex_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Value = Deserialize::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn flex_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Value = Deserialize::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64().unwrap_or(0) != 0,
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        _ => false,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginData {
    #[serde(default, deserialize_with = "flex_string")]
    pub playlist_url: Option<String>,
    #[serde(default, deserialize_with = "flex_string")]
    pub expires_at: Option<String>,
    #[serde(default, deserialize_with = "flex_bool")]
    pub is_expired: bool,
    #[serde(default, deserialize_with = "flex_i64")]
    pub days_remaining: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default, deserialize_with = "flex_i64")]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<LoginData>,
}

impl LoginResponse {
    pub fn is_success(&self) -> bool {
        matches!(self.code, Some(200) | Some(0))
    }

    /// Turn the envelope into its data or an authentication error
    pub fn into_result(self) -> Result<LoginData> {
        let success = self.is_success();
        match (success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(IptvError::ParseError(
                "login succeeded but response has no data".into(),
            )),
            (false, _) => Err(IptvError::AuthenticationFailed(
                self.message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| format!("panel returned code {:?}", self.code)),
            )),
        }
    }
}

/// HTTP client for the account panel
#[derive(Debug, Clone)]
pub struct PanelClient {
    pub base_url: String,
    client: reqwest::Client,
}

impl PanelClient {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(IptvError::InvalidInput("server url is empty".into()));
        }

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self { base_url, client })
    }

    pub fn login_url(&self) -> String {
        format!("{}{}", self.base_url, LOGIN_PATH)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginData> {
        let url = self.login_url();
        debug!(%url, username, "posting login");

        let resp = self
            .client
            .post(&url)
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            // Some panels put the reason in a JSON envelope even on 4xx
            if let Ok(parsed) = serde_json::from_str::<LoginResponse>(&body) {
                if let Some(message) = parsed.message.filter(|m| !m.trim().is_empty()) {
                    return Err(IptvError::AuthenticationFailed(message));
                }
            }
            warn!(status = status.as_u16(), "login rejected by panel");
            return Err(IptvError::ServerError(status.as_u16(), truncate(&body, 200)));
        }

        let parsed: LoginResponse = serde_json::from_str(&body).map_err(|e| {
            IptvError::ConnectionFailed(ConnectionStage::ResponseParsing, e.to_string())
        })?;
        parsed.into_result()
    }

    /// Download a playlist as text
    pub async fn fetch_playlist(&self, url: &str) -> Result<String> {
        fetch_text(&self.client, url).await
    }
}

pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String> {
    debug!(%url, "fetching playlist");
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(IptvError::ServerError(
            status.as_u16(),
            format!("playlist download failed: {}", url),
        ));
    }
    Ok(resp.text().await?)
}

/// Standalone playlist download for imports that do not go through the panel
pub async fn download_playlist(url: &str, user_agent: &str, timeout: Duration) -> Result<String> {
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()?;
    fetch_text(&client, url).await
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_numbers_as_strings() {
        let json = r#"{"code":"200","message":"ok","data":{"playlist_url":"http://p/list.m3u","expires_at":1767225600,"is_expired":0,"days_remaining":"12"}}"#;
        let data = serde_json::from_str::<LoginResponse>(json)
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(data.playlist_url.as_deref(), Some("http://p/list.m3u"));
        assert_eq!(data.expires_at.as_deref(), Some("1767225600"));
        assert!(!data.is_expired);
        assert_eq!(data.days_remaining, Some(12));
    }

    #[test]
    fn test_login_failure_uses_message() {
        let json = r#"{"code":401,"message":"wrong password","data":null}"#;
        let err = serde_json::from_str::<LoginResponse>(json)
            .unwrap()
            .into_result()
            .unwrap_err();
        assert!(matches!(err, IptvError::AuthenticationFailed(m) if m == "wrong password"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = PanelClient::new("http://panel.local/", "ua", Duration::from_secs(5)).unwrap();
        assert_eq!(client.login_url(), "http://panel.local/api/user/login");
    }

    #[test]
    fn test_empty_base_url_rejected() {
        assert!(PanelClient::new("  ", "ua", Duration::from_secs(5)).is_err());
    }
}
