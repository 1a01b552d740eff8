use crate::logging::SharedLogStore;
use crate::tasks::{TaskEvent, TaskRunner};
use chrono::{DateTime, Local};
use crossterm::event::{Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use desk_application::state::{ApplyOutcome, DashboardState};
use desk_domain::value_objects::control::ControlAction;

const SCROLL_PAGE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    BackendLogs,
    Diagnostics,
}

pub struct App {
    pub state: DashboardState,
    pub backend_url: String,
    pub task_runner: TaskRunner,

    pub logs: SharedLogStore,
    pub focus: Focus,
    pub backend_log_scroll: usize,
    pub diag_scroll: usize,
    seen_log_generation: u64,

    pub last_status_at: Option<DateTime<Local>>,
    pub last_logs_at: Option<DateTime<Local>>,
    pub dirty: bool,
}

impl App {
    pub fn new(
        state: DashboardState,
        backend_url: String,
        logs: SharedLogStore,
        task_runner: TaskRunner,
    ) -> Self {
        Self {
            state,
            backend_url,
            task_runner,
            logs,
            focus: Focus::BackendLogs,
            backend_log_scroll: 0,
            diag_scroll: 0,
            seen_log_generation: 0,
            last_status_at: None,
            last_logs_at: None,
            dirty: true,
        }
    }

    pub fn spawn_input_reader(&self, tx: tokio::sync::mpsc::UnboundedSender<TaskEvent>) {
        std::thread::spawn(move || {
            while let Ok(event) = crossterm::event::read() {
                if tx.send(TaskEvent::Input(event)).is_err() {
                    break;
                }
            }
        });
    }

    pub fn request_status(&mut self) {
        let seq = self.state.next_status_seq();
        self.task_runner.poll_status(seq);
    }

    pub fn request_logs(&mut self) {
        let seq = self.state.next_logs_seq();
        self.task_runner.poll_logs(seq);
    }

    /// Returns false when the control is disabled for the current status.
    pub fn trigger_control(&mut self, action: ControlAction) -> bool {
        if !self.state.controls().is_enabled(action) {
            tracing::debug!(
                action = action.as_str(),
                status = self.state.status().as_str(),
                "control disabled; key ignored"
            );
            return false;
        }
        self.state.control_started();
        self.task_runner.send_control(action);
        self.dirty = true;
        true
    }

    pub fn on_tick(&mut self) {
        let generation = self.logs.lock().generation();
        if generation != self.seen_log_generation {
            self.seen_log_generation = generation;
            self.dirty = true;
        }
    }

    pub fn on_event(&mut self, event: TaskEvent) -> Result<bool, String> {
        match event {
            TaskEvent::Input(ct) => self.on_input(ct),
            TaskEvent::Status(poll) => {
                if self.state.apply_status(poll) == ApplyOutcome::Applied {
                    self.last_status_at = Some(Local::now());
                }
                self.dirty = true;
                Ok(false)
            }
            TaskEvent::Logs(poll) => {
                if self.state.apply_logs(poll) == ApplyOutcome::Applied {
                    self.last_logs_at = Some(Local::now());
                }
                self.dirty = true;
                Ok(false)
            }
            TaskEvent::Control(outcome) => {
                self.state.apply_control(&outcome);
                self.dirty = true;
                Ok(false)
            }
        }
    }

    fn on_input(&mut self, event: CtEvent) -> Result<bool, String> {
        match event {
            CtEvent::Key(key) if key.kind != KeyEventKind::Release => self.on_key(key),
            CtEvent::Resize(_, _) => {
                self.dirty = true;
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Result<bool, String> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }

        if self.state.notification().is_some() {
            return Ok(self.handle_notification_keys(key));
        }

        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('s') => {
                self.trigger_control(ControlAction::Start);
            }
            KeyCode::Char('p') => {
                self.trigger_control(ControlAction::Pause);
            }
            KeyCode::Char('x') => {
                self.trigger_control(ControlAction::Stop);
            }
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::BackendLogs => Focus::Diagnostics,
                    Focus::Diagnostics => Focus::BackendLogs,
                };
                self.dirty = true;
            }
            KeyCode::Up => self.scroll_by(1, false),
            KeyCode::Down => self.scroll_by(1, true),
            KeyCode::PageUp => self.scroll_by(SCROLL_PAGE, false),
            KeyCode::PageDown => self.scroll_by(SCROLL_PAGE, true),
            KeyCode::End => {
                *self.focused_scroll_mut() = 0;
                self.dirty = true;
            }
            _ => {}
        }
        Ok(false)
    }

    /// The notification is modal: only dismiss keys (and quit) get through.
    fn handle_notification_keys(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => {
                if self.state.dismiss_notification() {
                    self.dirty = true;
                }
                false
            }
            KeyCode::Char('q') => true,
            _ => false,
        }
    }

    fn focused_scroll_mut(&mut self) -> &mut usize {
        match self.focus {
            Focus::BackendLogs => &mut self.backend_log_scroll,
            Focus::Diagnostics => &mut self.diag_scroll,
        }
    }

    /// Backend logs arrive newest first, so scrolling "down" moves towards
    /// older lines there. Diagnostics are appended, so the offset counts back
    /// from the end.
    fn scroll_by(&mut self, amount: usize, down: bool) {
        let limit = match self.focus {
            Focus::BackendLogs => self
                .state
                .log_view()
                .map(|view| view.lines.len())
                .unwrap_or(0),
            Focus::Diagnostics => self.logs.lock().line_count(),
        };
        let towards_older = match self.focus {
            Focus::BackendLogs => down,
            Focus::Diagnostics => !down,
        };
        let scroll = self.focused_scroll_mut();
        *scroll = if towards_older {
            scroll.saturating_add(amount).min(limit.saturating_sub(1))
        } else {
            scroll.saturating_sub(amount)
        };
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::{App, Focus};
    use crate::logging::LogStore;
    use crate::tasks::{TaskEvent, TaskRunner};
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
    use desk_application::polling::StatusPoll;
    use desk_application::state::DashboardState;
    use desk_domain::repositories::backend::{CommandError, DashboardBackend, PollError};
    use desk_domain::services::view::ClockSettings;
    use desk_domain::value_objects::agent_status::AgentStatus;
    use desk_domain::value_objects::control::{ControlAction, ControlResponse};
    use desk_domain::value_objects::snapshot::{LogsSnapshot, Portfolio, StatusSnapshot};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct RecordingBackend {
        sent: Mutex<Vec<ControlAction>>,
    }

    impl DashboardBackend for RecordingBackend {
        fn fetch_status(&self) -> Result<StatusSnapshot, PollError> {
            Err(PollError::Transport("offline".to_string()))
        }

        fn fetch_logs(&self) -> Result<LogsSnapshot, PollError> {
            Err(PollError::Transport("offline".to_string()))
        }

        fn send_control(&self, action: ControlAction) -> Result<ControlResponse, CommandError> {
            self.sent.lock().push(action);
            Ok(ControlResponse {
                success: false,
                message: "Market closed".to_string(),
            })
        }
    }

    fn make_app(
        backend: Arc<RecordingBackend>,
    ) -> (App, tokio::sync::mpsc::UnboundedReceiver<TaskEvent>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let runner = TaskRunner::new(tx, backend);
        let app = App::new(
            DashboardState::new(ClockSettings::default()),
            "http://127.0.0.1:5000".to_string(),
            LogStore::shared(10),
            runner,
        );
        (app, rx)
    }

    fn key(code: KeyCode) -> TaskEvent {
        TaskEvent::Input(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn running_poll(app: &mut App) -> TaskEvent {
        let seq = app.state.next_status_seq();
        TaskEvent::Status(StatusPoll {
            seq,
            result: Ok(StatusSnapshot {
                status: AgentStatus::Running,
                market_hours: "09:15:00 - 15:30:00".to_string(),
                portfolio: Portfolio::default(),
                holdings: Vec::new(),
                recent_trades: Vec::new(),
                watchlist: Vec::new(),
            }),
        })
    }

    #[tokio::test]
    async fn start_key_sends_one_request_and_surfaces_rejection() {
        let backend = Arc::new(RecordingBackend::default());
        let (mut app, mut rx) = make_app(backend.clone());

        assert!(!app.on_event(key(KeyCode::Char('s'))).expect("key"));
        assert_eq!(app.state.in_flight_controls(), 1);

        let event = rx.recv().await.expect("control outcome");
        app.on_event(event).expect("apply");
        assert_eq!(*backend.sent.lock(), vec![ControlAction::Start]);
        assert_eq!(app.state.notification(), Some("Market closed"));
        assert_eq!(app.state.status(), AgentStatus::Stopped);

        // Modal: control keys are swallowed until dismissed.
        app.on_event(key(KeyCode::Char('s'))).expect("key");
        assert_eq!(app.state.in_flight_controls(), 0);
        app.on_event(key(KeyCode::Enter)).expect("key");
        assert!(app.state.notification().is_none());
    }

    #[tokio::test]
    async fn disabled_controls_are_ignored() {
        let backend = Arc::new(RecordingBackend::default());
        let (mut app, _rx) = make_app(backend.clone());

        // Stopped: pause and stop are disabled.
        assert!(!app.trigger_control(ControlAction::Pause));
        assert!(!app.trigger_control(ControlAction::Stop));

        let poll = running_poll(&mut app);
        app.on_event(poll).expect("status");
        assert_eq!(app.state.status(), AgentStatus::Running);
        assert!(!app.trigger_control(ControlAction::Start));
        assert_eq!(app.state.in_flight_controls(), 0);
    }

    #[tokio::test]
    async fn quit_keys_end_the_loop() {
        let (mut app, _rx) = make_app(Arc::new(RecordingBackend::default()));
        assert!(app.on_event(key(KeyCode::Char('q'))).expect("key"));
        let ctrl_c = TaskEvent::Input(Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert!(app.on_event(ctrl_c).expect("key"));
    }

    #[tokio::test]
    async fn tab_switches_scroll_focus() {
        let (mut app, _rx) = make_app(Arc::new(RecordingBackend::default()));
        {
            let mut logs = app.logs.lock();
            for idx in 0..5 {
                logs.push_line(format!("line {idx}"));
            }
        }
        app.on_event(key(KeyCode::Tab)).expect("key");
        assert_eq!(app.focus, Focus::Diagnostics);
        app.on_event(key(KeyCode::Up)).expect("key");
        app.on_event(key(KeyCode::PageUp)).expect("key");
        assert_eq!(app.diag_scroll, 4);
        app.on_event(key(KeyCode::End)).expect("key");
        assert_eq!(app.diag_scroll, 0);
    }

    #[tokio::test]
    async fn tick_marks_dirty_when_diagnostics_grow() {
        let (mut app, _rx) = make_app(Arc::new(RecordingBackend::default()));
        app.on_tick();
        app.dirty = false;
        app.on_tick();
        assert!(!app.dirty);
        app.logs.lock().push_line("new diagnostic");
        app.on_tick();
        assert!(app.dirty);
    }
}
