use desk_domain::repositories::backend::{CommandError, DashboardBackend};
use desk_domain::value_objects::control::ControlAction;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub enum ControlOutcome {
    Accepted {
        action: ControlAction,
        message: String,
    },
    Failed {
        action: ControlAction,
        error: CommandError,
    },
}

impl ControlOutcome {
    pub fn action(&self) -> ControlAction {
        match self {
            ControlOutcome::Accepted { action, .. } | ControlOutcome::Failed { action, .. } => {
                *action
            }
        }
    }

    /// Blocking notification text, if the user has to be told anything.
    pub fn notification(&self) -> Option<String> {
        match self {
            ControlOutcome::Accepted { .. } => None,
            ControlOutcome::Failed { error, .. } => Some(error.user_message()),
        }
    }
}

/// Sends one control request. No retry; the next status poll shows the effect.
pub fn dispatch_control(backend: &dyn DashboardBackend, action: ControlAction) -> ControlOutcome {
    let span = tracing::info_span!("app.control", action = action.as_str());
    let _enter = span.enter();
    let start = Instant::now();

    let outcome = match backend.send_control(action) {
        Ok(response) if response.success => {
            tracing::info!(message = %response.message, "control accepted");
            ControlOutcome::Accepted {
                action,
                message: response.message,
            }
        }
        Ok(response) => {
            tracing::warn!(message = %response.message, "control rejected");
            ControlOutcome::Failed {
                action,
                error: CommandError::Rejected(response.message),
            }
        }
        Err(error) => {
            tracing::error!(error = %error, "control error");
            ControlOutcome::Failed { action, error }
        }
    };

    let result = match &outcome {
        ControlOutcome::Accepted { .. } => "ok",
        ControlOutcome::Failed { error, .. } => error.kind(),
    };
    metrics::counter!(
        "desk.app.control_total",
        "action" => action.as_str(),
        "result" => result
    )
    .increment(1);
    metrics::histogram!("desk.app.control_ms", "action" => action.as_str())
        .record(start.elapsed().as_millis() as f64);

    outcome
}
