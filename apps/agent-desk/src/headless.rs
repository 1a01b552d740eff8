use desk_application::config::Config;
use desk_application::control::{dispatch_control, ControlOutcome};
use desk_application::polling::{poll_logs, poll_status};
use desk_application::state::{ApplyOutcome, DashboardState};
use desk_domain::repositories::backend::{CommandError, DashboardBackend};
use desk_domain::value_objects::control::ControlAction;
use desk_infrastructure::reporting::write_dashboard_html;
use std::path::PathBuf;

/// Exit code when the backend answered a control with `success: false`.
pub const EXIT_CONTROL_REJECTED: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadlessMode {
    Status,
    Logs,
    Control,
    Snapshot,
}

impl HeadlessMode {
    pub fn as_str(self) -> &'static str {
        match self {
            HeadlessMode::Status => "status",
            HeadlessMode::Logs => "logs",
            HeadlessMode::Control => "control",
            HeadlessMode::Snapshot => "snapshot",
        }
    }
}

pub struct HeadlessArgs {
    pub mode: HeadlessMode,
    pub config: Config,
    pub action: Option<ControlAction>,
    pub html_out: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessOutput {
    pub json: serde_json::Value,
    pub exit_code: i32,
}

impl HeadlessOutput {
    fn ok(json: serde_json::Value) -> Self {
        Self { json, exit_code: 0 }
    }
}

pub fn run_headless(args: HeadlessArgs) -> Result<HeadlessOutput, String> {
    let backend = crate::bootstrap::build_backend(&args.config)?;
    run_headless_with(backend.as_ref(), &args)
}

/// Same pipeline as the TUI: poll, apply to a fresh `DashboardState`, then
/// print what would have been rendered.
pub fn run_headless_with(
    backend: &dyn DashboardBackend,
    args: &HeadlessArgs,
) -> Result<HeadlessOutput, String> {
    let span = tracing::info_span!("headless", mode = args.mode.as_str());
    let _enter = span.enter();

    let mut state = DashboardState::new(args.config.clock_settings()?);
    match args.mode {
        HeadlessMode::Status => {
            fetch_status_into(backend, &mut state)?;
            Ok(HeadlessOutput::ok(serde_json::json!({
                "status": "ok",
                "mode": "status",
                "view": state.status_view(),
            })))
        }
        HeadlessMode::Logs => {
            fetch_logs_into(backend, &mut state)?;
            Ok(HeadlessOutput::ok(serde_json::json!({
                "status": "ok",
                "mode": "logs",
                "view": state.log_view(),
            })))
        }
        HeadlessMode::Control => {
            let action = args
                .action
                .ok_or_else(|| "--action is required for control mode".to_string())?;
            run_control(backend, action)
        }
        HeadlessMode::Snapshot => {
            fetch_status_into(backend, &mut state)?;
            fetch_logs_into(backend, &mut state)?;
            let html_out = match (&args.html_out, state.status_view()) {
                (Some(path), Some(view)) => {
                    write_dashboard_html(path, view, state.log_view())?;
                    tracing::info!(path = %path.display(), "html snapshot written");
                    Some(path.display().to_string())
                }
                _ => None,
            };
            Ok(HeadlessOutput::ok(serde_json::json!({
                "status": "ok",
                "mode": "snapshot",
                "status_view": state.status_view(),
                "log_view": state.log_view(),
                "html_out": html_out,
            })))
        }
    }
}

fn fetch_status_into(
    backend: &dyn DashboardBackend,
    state: &mut DashboardState,
) -> Result<(), String> {
    let seq = state.next_status_seq();
    match state.apply_status(poll_status(backend, seq)) {
        ApplyOutcome::Applied => Ok(()),
        _ => Err(poll_failure(state, "status")),
    }
}

fn fetch_logs_into(backend: &dyn DashboardBackend, state: &mut DashboardState) -> Result<(), String> {
    let seq = state.next_logs_seq();
    match state.apply_logs(poll_logs(backend, seq)) {
        ApplyOutcome::Applied => Ok(()),
        _ => Err(poll_failure(state, "logs")),
    }
}

fn poll_failure(state: &DashboardState, what: &str) -> String {
    match state.last_poll_error() {
        Some((_, err)) => format!("{what} poll failed: {err}"),
        None => format!("{what} poll failed"),
    }
}

fn run_control(
    backend: &dyn DashboardBackend,
    action: ControlAction,
) -> Result<HeadlessOutput, String> {
    match dispatch_control(backend, action) {
        ControlOutcome::Accepted { action, message } => Ok(HeadlessOutput::ok(serde_json::json!({
            "status": "ok",
            "mode": "control",
            "action": action,
            "accepted": true,
            "message": message,
        }))),
        ControlOutcome::Failed {
            action,
            error: CommandError::Rejected(message),
        } => Ok(HeadlessOutput {
            json: serde_json::json!({
                "status": "rejected",
                "mode": "control",
                "action": action,
                "accepted": false,
                "message": message,
            }),
            exit_code: EXIT_CONTROL_REJECTED,
        }),
        ControlOutcome::Failed { error, .. } => Err(format!("control {action} failed: {error}")),
    }
}
