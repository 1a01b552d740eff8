use serde::{Deserialize, Serialize};
use std::fmt;

/// Run state reported by the backend. Anything outside the three known labels
/// collapses to `Unknown` instead of being echoed back verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum AgentStatus {
    Running,
    Paused,
    #[default]
    Stopped,
    Unknown,
}

impl AgentStatus {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "running" => Self::Running,
            "paused" => Self::Paused,
            "stopped" => Self::Stopped,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
            Self::Unknown => "unknown",
        }
    }

    pub fn badge_text(self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Paused => "PAUSED",
            Self::Stopped => "STOPPED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Style class for the badge, keyed by label.
    pub fn badge_class(self) -> String {
        format!("status-badge {}", self.as_str())
    }

    pub fn controls(self) -> ControlButtons {
        ControlButtons {
            start: self != Self::Running,
            pause: self == Self::Running,
            stop: self != Self::Stopped,
        }
    }
}

impl From<String> for AgentStatus {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Enabled flags for the three control buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControlButtons {
    pub start: bool,
    pub pause: bool,
    pub stop: bool,
}

impl ControlButtons {
    pub fn is_enabled(&self, action: crate::value_objects::control::ControlAction) -> bool {
        use crate::value_objects::control::ControlAction;
        match action {
            ControlAction::Start => self.start,
            ControlAction::Pause => self.pause,
            ControlAction::Stop => self.stop,
        }
    }
}
