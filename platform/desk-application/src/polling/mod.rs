use desk_domain::repositories::backend::{DashboardBackend, PollError};
use desk_domain::value_objects::snapshot::{LogsSnapshot, StatusSnapshot};
use std::time::Instant;

/// Monotonic request numbering for one poller. Responses can complete out of
/// order; only a response newer than the last applied one may be rendered.
#[derive(Debug, Default, Clone)]
pub struct SequenceGate {
    next: u64,
    applied: Option<u64>,
}

impl SequenceGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> u64 {
        self.next += 1;
        self.next
    }

    /// Marks `seq` as applied if it is newer than anything applied so far.
    pub fn accept(&mut self, seq: u64) -> bool {
        match self.applied {
            Some(last) if seq <= last => false,
            _ => {
                self.applied = Some(seq);
                true
            }
        }
    }

    pub fn last_applied(&self) -> Option<u64> {
        self.applied
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollKind {
    Status,
    Logs,
}

impl PollKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PollKind::Status => "status",
            PollKind::Logs => "logs",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusPoll {
    pub seq: u64,
    pub result: Result<StatusSnapshot, PollError>,
}

#[derive(Debug, Clone)]
pub struct LogsPoll {
    pub seq: u64,
    pub result: Result<LogsSnapshot, PollError>,
}

pub fn poll_status(backend: &dyn DashboardBackend, seq: u64) -> StatusPoll {
    let span = tracing::debug_span!("app.poll.status", seq);
    let _enter = span.enter();
    let start = Instant::now();
    let result = backend.fetch_status();
    record_poll(PollKind::Status, start, result.as_ref().err());
    StatusPoll { seq, result }
}

pub fn poll_logs(backend: &dyn DashboardBackend, seq: u64) -> LogsPoll {
    let span = tracing::debug_span!("app.poll.logs", seq);
    let _enter = span.enter();
    let start = Instant::now();
    let result = backend.fetch_logs();
    record_poll(PollKind::Logs, start, result.as_ref().err());
    LogsPoll { seq, result }
}

fn record_poll(kind: PollKind, start: Instant, err: Option<&PollError>) {
    let result = if err.is_some() { "err" } else { "ok" };
    metrics::histogram!(
        "desk.app.poll_ms",
        "poller" => kind.as_str(),
        "result" => result
    )
    .record(start.elapsed().as_millis() as f64);
    tracing::trace!(poller = kind.as_str(), result, "poll completed");
}
