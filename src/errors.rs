use thiserror::Error;

/// Detailed connection stage for diagnostic purposes
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStage {
    /// Could not reach the panel at all
    TcpConnection,
    /// Request timed out
    Timeout,
    /// HTTP request failed mid-flight
    HttpHandshake,
    /// Failed to parse panel response
    ResponseParsing,
}

impl std::fmt::Display for ConnectionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl ConnectionStage {
    pub fn display_name(&self) -> &'static str {
        match self {
            ConnectionStage::TcpConnection => "Connection",
            ConnectionStage::Timeout => "Timeout",
            ConnectionStage::HttpHandshake => "HTTP Request",
            ConnectionStage::ResponseParsing => "Response Parsing",
        }
    }

    /// Get actionable suggestion for fixing the issue at this stage
    pub fn suggestion(&self) -> &'static str {
        match self {
            ConnectionStage::TcpConnection => {
                "Panel appears to be offline. Check the server URL and your connection."
            }
            ConnectionStage::Timeout => "Panel is slow to answer. Try again later.",
            ConnectionStage::HttpHandshake => {
                "Panel is not responding properly. Check the URL and try again later."
            }
            ConnectionStage::ResponseParsing => {
                "Panel response is invalid. This may be a provider issue."
            }
        }
    }

    /// Classify a reqwest error into the stage it failed at
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            ConnectionStage::Timeout
        } else if err.is_connect() {
            ConnectionStage::TcpConnection
        } else if err.is_decode() {
            ConnectionStage::ResponseParsing
        } else {
            ConnectionStage::HttpHandshake
        }
    }
}

/// Error type for library operations. Every variant is recoverable and ends up
/// as a user-facing notification.
#[derive(Debug, Error, Clone)]
pub enum IptvError {
    #[error("Connection failed at {0}: {1}")]
    ConnectionFailed(ConnectionStage, String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Server returned {0}: {1}")]
    ServerError(u16, String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Playback failed: {0}")]
    Playback(String),
}

impl IptvError {
    pub fn diagnostics(&self) -> String {
        match self {
            IptvError::ConnectionFailed(stage, source) => format!(
                "Connection Failed at {}\nError: {}\nSuggestion: {}",
                stage.display_name(),
                source,
                stage.suggestion()
            ),
            IptvError::AuthenticationFailed(reason) => format!(
                "Authentication Failed\nReason: {}\nSuggestion: Verify username and password",
                reason
            ),
            IptvError::ServerError(status, message) => format!(
                "Server Error\nStatus: {}\nMessage: {}\nSuggestion: Try again later",
                status, message
            ),
            IptvError::ParseError(source) => format!(
                "Parse Error\nError: {}\nSuggestion: Provider response is invalid",
                source
            ),
            IptvError::InvalidInput(reason) => format!("Invalid Input\nReason: {}", reason),
            IptvError::Storage(source) => format!(
                "Storage Error\nError: {}\nSuggestion: Check permissions of the config directory",
                source
            ),
            IptvError::Playback(reason) => format!(
                "Playback Error\nReason: {}\nSuggestion: Try another player backend",
                reason
            ),
        }
    }
}

impl From<reqwest::Error> for IptvError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return IptvError::ServerError(status.as_u16(), err.to_string());
        }
        IptvError::ConnectionFailed(ConnectionStage::from_reqwest(&err), err.to_string())
    }
}

impl From<std::io::Error> for IptvError {
    fn from(err: std::io::Error) -> Self {
        IptvError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for IptvError {
    fn from(err: serde_json::Error) -> Self {
        IptvError::ParseError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IptvError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_include_suggestion() {
        let err = IptvError::ConnectionFailed(ConnectionStage::Timeout, "slow".into());
        let diag = err.diagnostics();
        assert!(diag.contains("Timeout"));
        assert!(diag.contains("Try again later"));
    }

    #[test]
    fn test_io_error_maps_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(IptvError::from(io), IptvError::Storage(_)));
    }
}
