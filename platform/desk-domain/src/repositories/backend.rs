use crate::value_objects::control::{ControlAction, ControlResponse};
use crate::value_objects::snapshot::{LogsSnapshot, StatusSnapshot};

pub const GENERIC_COMMAND_FAILURE: &str = "Failed to send command";

#[derive(Debug, Clone, PartialEq)]
pub enum PollError {
    Transport(String),
    HttpStatus(u16),
    Decode(String),
}

impl PollError {
    pub fn kind(&self) -> &'static str {
        match self {
            PollError::Transport(_) => "transport",
            PollError::HttpStatus(_) => "http_status",
            PollError::Decode(_) => "decode",
        }
    }
}

impl std::fmt::Display for PollError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollError::Transport(msg) => write!(f, "request failed: {msg}"),
            PollError::HttpStatus(status) => write!(f, "http error: status {status}"),
            PollError::Decode(msg) => write!(f, "invalid response body: {msg}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    Transport(String),
    HttpStatus(u16),
    Decode(String),
    /// Backend answered with `success: false`.
    Rejected(String),
}

impl CommandError {
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::Transport(_) => "transport",
            CommandError::HttpStatus(_) => "http_status",
            CommandError::Decode(_) => "decode",
            CommandError::Rejected(_) => "rejected",
        }
    }

    /// Text for the blocking notification. Only a rejection carries the
    /// backend's own message.
    pub fn user_message(&self) -> String {
        match self {
            CommandError::Rejected(msg) => msg.clone(),
            _ => GENERIC_COMMAND_FAILURE.to_string(),
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Transport(msg) => write!(f, "request failed: {msg}"),
            CommandError::HttpStatus(status) => write!(f, "http error: status {status}"),
            CommandError::Decode(msg) => write!(f, "invalid response body: {msg}"),
            CommandError::Rejected(msg) => write!(f, "rejected by backend: {msg}"),
        }
    }
}

/// Port to the trading agent backend (`/api/status`, `/api/logs`, `/api/control`).
pub trait DashboardBackend: Send + Sync {
    fn fetch_status(&self) -> Result<StatusSnapshot, PollError>;

    fn fetch_logs(&self) -> Result<LogsSnapshot, PollError>;

    /// Transport-level result only; `success: false` is still `Ok` here.
    fn send_control(&self, action: ControlAction) -> Result<ControlResponse, CommandError>;
}

#[cfg(test)]
mod tests {
    use super::{CommandError, PollError, GENERIC_COMMAND_FAILURE};

    #[test]
    fn only_rejections_surface_backend_text() {
        assert_eq!(
            CommandError::Rejected("Market closed".to_string()).user_message(),
            "Market closed"
        );
        assert_eq!(
            CommandError::Transport("connection refused".to_string()).user_message(),
            GENERIC_COMMAND_FAILURE
        );
        assert_eq!(CommandError::HttpStatus(500).user_message(), GENERIC_COMMAND_FAILURE);
    }

    #[test]
    fn display_includes_context() {
        assert_eq!(PollError::HttpStatus(502).to_string(), "http error: status 502");
        assert_eq!(PollError::Decode("eof".to_string()).kind(), "decode");
    }
}
