//! Client-side dashboard state. It holds the last applied view models and the
//! status label. Adapters read it; only the apply_* methods change it.

use crate::control::ControlOutcome;
use crate::polling::{LogsPoll, PollKind, SequenceGate, StatusPoll};
use desk_domain::repositories::backend::PollError;
use desk_domain::services::view::{
    build_log_view, build_status_view, ClockSettings, LogView, StatusView,
};
use desk_domain::value_objects::agent_status::{AgentStatus, ControlButtons};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// An older response arrived after a newer one was already rendered.
    Stale,
    /// The poll failed; previous render kept.
    Failed,
}

pub struct DashboardState {
    clock: ClockSettings,
    status_gate: SequenceGate,
    logs_gate: SequenceGate,
    status: AgentStatus,
    status_view: Option<StatusView>,
    log_view: Option<LogView>,
    notification: Option<String>,
    last_poll_error: Option<(PollKind, PollError)>,
    in_flight_controls: usize,
}

impl DashboardState {
    pub fn new(clock: ClockSettings) -> Self {
        Self {
            clock,
            status_gate: SequenceGate::new(),
            logs_gate: SequenceGate::new(),
            status: AgentStatus::Stopped,
            status_view: None,
            log_view: None,
            notification: None,
            last_poll_error: None,
            in_flight_controls: 0,
        }
    }

    pub fn status(&self) -> AgentStatus {
        self.status
    }

    pub fn controls(&self) -> ControlButtons {
        self.status.controls()
    }

    pub fn status_view(&self) -> Option<&StatusView> {
        self.status_view.as_ref()
    }

    pub fn log_view(&self) -> Option<&LogView> {
        self.log_view.as_ref()
    }

    pub fn notification(&self) -> Option<&str> {
        self.notification.as_deref()
    }

    pub fn last_poll_error(&self) -> Option<&(PollKind, PollError)> {
        self.last_poll_error.as_ref()
    }

    pub fn in_flight_controls(&self) -> usize {
        self.in_flight_controls
    }

    pub fn next_status_seq(&mut self) -> u64 {
        self.status_gate.issue()
    }

    pub fn next_logs_seq(&mut self) -> u64 {
        self.logs_gate.issue()
    }

    pub fn apply_status(&mut self, poll: StatusPoll) -> ApplyOutcome {
        match poll.result {
            Ok(snapshot) => {
                if !self.status_gate.accept(poll.seq) {
                    record_stale(PollKind::Status, poll.seq, self.status_gate.last_applied());
                    return ApplyOutcome::Stale;
                }
                self.status = snapshot.status;
                self.status_view = Some(build_status_view(&snapshot, &self.clock));
                self.clear_poll_error(PollKind::Status);
                ApplyOutcome::Applied
            }
            Err(err) => {
                tracing::error!(seq = poll.seq, error = %err, "status update error");
                self.last_poll_error = Some((PollKind::Status, err));
                ApplyOutcome::Failed
            }
        }
    }

    pub fn apply_logs(&mut self, poll: LogsPoll) -> ApplyOutcome {
        match poll.result {
            Ok(snapshot) => {
                if !self.logs_gate.accept(poll.seq) {
                    record_stale(PollKind::Logs, poll.seq, self.logs_gate.last_applied());
                    return ApplyOutcome::Stale;
                }
                self.log_view = Some(build_log_view(&snapshot));
                self.clear_poll_error(PollKind::Logs);
                ApplyOutcome::Applied
            }
            Err(err) => {
                tracing::error!(seq = poll.seq, error = %err, "logs update error");
                self.last_poll_error = Some((PollKind::Logs, err));
                ApplyOutcome::Failed
            }
        }
    }

    pub fn control_started(&mut self) {
        self.in_flight_controls += 1;
    }

    /// Only a failure changes anything visible, and only the notification.
    pub fn apply_control(&mut self, outcome: &ControlOutcome) {
        self.in_flight_controls = self.in_flight_controls.saturating_sub(1);
        if let Some(message) = outcome.notification() {
            self.notification = Some(message);
        }
    }

    pub fn dismiss_notification(&mut self) -> bool {
        self.notification.take().is_some()
    }

    fn clear_poll_error(&mut self, kind: PollKind) {
        if matches!(&self.last_poll_error, Some((k, _)) if *k == kind) {
            self.last_poll_error = None;
        }
    }
}

fn record_stale(kind: PollKind, seq: u64, last_applied: Option<u64>) {
    metrics::counter!("desk.app.stale_responses_total", "poller" => kind.as_str()).increment(1);
    tracing::debug!(
        poller = kind.as_str(),
        seq,
        last_applied = ?last_applied,
        "discarding stale response"
    );
}
