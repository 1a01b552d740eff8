use desk_application::control::{dispatch_control, ControlOutcome};
use desk_application::polling::{poll_logs, poll_status, LogsPoll, StatusPoll};
use desk_domain::repositories::backend::{CommandError, DashboardBackend};
use desk_domain::value_objects::control::ControlAction;
use std::sync::Arc;

pub enum TaskEvent {
    Input(crossterm::event::Event),
    Status(StatusPoll),
    Logs(LogsPoll),
    Control(ControlOutcome),
}

/// Runs backend calls off the event loop and reports back over the event
/// channel. Nothing here is cancelled; a slow call simply finishes late.
///
/// Polls share tokio's blocking pool. Controls get their own thread so that
/// polls hung on a silent backend (no timeout configured) can never hold a
/// user command in the pool queue.
#[derive(Clone)]
pub struct TaskRunner {
    inner: Arc<TaskRunnerInner>,
}

struct TaskRunnerInner {
    tx: tokio::sync::mpsc::UnboundedSender<TaskEvent>,
    backend: Arc<dyn DashboardBackend>,
}

impl TaskRunner {
    pub fn new(
        tx: tokio::sync::mpsc::UnboundedSender<TaskEvent>,
        backend: Arc<dyn DashboardBackend>,
    ) -> Self {
        Self {
            inner: Arc::new(TaskRunnerInner { tx, backend }),
        }
    }

    pub fn poll_status(&self, seq: u64) {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let poll = poll_status(inner.backend.as_ref(), seq);
            let _ = inner.tx.send(TaskEvent::Status(poll));
        });
    }

    pub fn poll_logs(&self, seq: u64) {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let poll = poll_logs(inner.backend.as_ref(), seq);
            let _ = inner.tx.send(TaskEvent::Logs(poll));
        });
    }

    pub fn send_control(&self, action: ControlAction) {
        let inner = self.inner.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("desk-control-{action}"))
            .spawn(move || {
                let outcome = dispatch_control(inner.backend.as_ref(), action);
                let _ = inner.tx.send(TaskEvent::Control(outcome));
            });
        if let Err(err) = spawned {
            tracing::error!(action = action.as_str(), error = %err, "failed to spawn control thread");
            let _ = self.inner.tx.send(TaskEvent::Control(ControlOutcome::Failed {
                action,
                error: CommandError::Transport(format!("failed to spawn control thread: {err}")),
            }));
        }
    }
}
