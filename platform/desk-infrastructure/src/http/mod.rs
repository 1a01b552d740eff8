use desk_domain::repositories::backend::{CommandError, DashboardBackend, PollError};
use desk_domain::value_objects::control::{ControlAction, ControlRequest, ControlResponse};
use desk_domain::value_objects::snapshot::{LogsSnapshot, StatusSnapshot};
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

pub const STATUS_PATH: &str = "/api/status";
pub const LOGS_PATH: &str = "/api/logs";
pub const CONTROL_PATH: &str = "/api/control";

/// Failure of one HTTP exchange, before it is mapped onto a port error.
#[derive(Debug)]
enum CallError {
    Transport(String),
    HttpStatus(u16),
    Decode(String),
}

impl CallError {
    fn kind(&self) -> &'static str {
        match self {
            CallError::Transport(_) => "transport",
            CallError::HttpStatus(_) => "http_status",
            CallError::Decode(_) => "decode",
        }
    }
}

impl From<CallError> for PollError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Transport(msg) => PollError::Transport(msg),
            CallError::HttpStatus(status) => PollError::HttpStatus(status),
            CallError::Decode(msg) => PollError::Decode(msg),
        }
    }
}

impl From<CallError> for CommandError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Transport(msg) => CommandError::Transport(msg),
            CallError::HttpStatus(status) => CommandError::HttpStatus(status),
            CallError::Decode(msg) => CommandError::Decode(msg),
        }
    }
}

/// Blocking client for the agent's dashboard API. Every call is a single
/// attempt; callers decide what a failure means for the screen.
pub struct HttpDashboardClient {
    base_url: String,
    timeout_ms: Option<u64>,
    client: Client,
}

impl HttpDashboardClient {
    /// `timeout_ms = None` disables the request timeout entirely.
    pub fn new(base_url: impl Into<String>, timeout_ms: Option<u64>) -> Result<Self, String> {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/').to_string();
        if trimmed.is_empty() {
            return Err("backend url is empty".to_string());
        }

        let client = Client::builder()
            .timeout(timeout_ms.map(Duration::from_millis))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|err| format!("failed to build http client: {err}"))?;
        Ok(Self {
            base_url: trimmed,
            timeout_ms,
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get_json<T: DeserializeOwned>(&self, name: &'static str, path: &str) -> Result<T, CallError> {
        let endpoint = self.endpoint(path);
        let span = tracing::debug_span!(
            "infra.http.get",
            endpoint = %endpoint,
            timeout_ms = ?self.timeout_ms
        );
        let _enter = span.enter();

        metrics::counter!("desk.infra.http.requests_total", "endpoint" => name).increment(1);
        let start = Instant::now();
        let result = self
            .client
            .get(&endpoint)
            .send()
            .map_err(|err| CallError::Transport(format!("GET {endpoint} failed: {err}")))
            .and_then(|resp| {
                let status = resp.status();
                if !status.is_success() {
                    return Err(CallError::HttpStatus(status.as_u16()));
                }
                decode_body(resp)
            });
        record_call(name, start, result.as_ref().err());
        result
    }
}

impl DashboardBackend for HttpDashboardClient {
    fn fetch_status(&self) -> Result<StatusSnapshot, PollError> {
        self.get_json("status", STATUS_PATH).map_err(PollError::from)
    }

    fn fetch_logs(&self) -> Result<LogsSnapshot, PollError> {
        self.get_json("logs", LOGS_PATH).map_err(PollError::from)
    }

    fn send_control(&self, action: ControlAction) -> Result<ControlResponse, CommandError> {
        let endpoint = self.endpoint(CONTROL_PATH);
        let span = tracing::info_span!(
            "infra.http.control",
            endpoint = %endpoint,
            action = action.as_str(),
            timeout_ms = ?self.timeout_ms
        );
        let _enter = span.enter();

        metrics::counter!("desk.infra.http.requests_total", "endpoint" => "control").increment(1);
        let start = Instant::now();
        let result = self
            .client
            .post(&endpoint)
            .json(&ControlRequest { action })
            .send()
            .map_err(|err| CallError::Transport(format!("POST {endpoint} failed: {err}")))
            .and_then(decode_control);
        record_call("control", start, result.as_ref().err());
        result.map_err(CommandError::from)
    }
}

fn decode_body<T: DeserializeOwned>(resp: Response) -> Result<T, CallError> {
    let text = resp
        .text()
        .map_err(|err| CallError::Transport(format!("failed to read response body: {err}")))?;
    serde_json::from_str(&text)
        .map_err(|err| CallError::Decode(format!("failed to parse response: {err}")))
}

/// The backend may answer a refused command with a non-2xx status and a
/// regular `{success, message}` body; that body still wins.
fn decode_control(resp: Response) -> Result<ControlResponse, CallError> {
    let status = resp.status();
    match decode_body::<ControlResponse>(resp) {
        Ok(parsed) => Ok(parsed),
        Err(_) if !status.is_success() => Err(CallError::HttpStatus(status.as_u16())),
        Err(err) => Err(err),
    }
}

fn record_call(name: &'static str, start: Instant, err: Option<&CallError>) {
    let elapsed_ms = start.elapsed().as_millis() as f64;
    match err {
        None => {
            metrics::histogram!("desk.infra.http.call_ms", "endpoint" => name, "result" => "ok")
                .record(elapsed_ms);
        }
        Some(err) => {
            metrics::counter!(
                "desk.infra.http.errors_total",
                "endpoint" => name,
                "kind" => err.kind()
            )
            .increment(1);
            metrics::histogram!(
                "desk.infra.http.call_ms",
                "endpoint" => name,
                "result" => "err",
                "error_kind" => err.kind()
            )
            .record(elapsed_ms);
            tracing::debug!(endpoint = name, error = ?err, "backend request failed");
        }
    }
}
