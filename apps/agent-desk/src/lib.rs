mod app;
pub mod bootstrap;
pub mod headless;
pub mod logging;
mod tasks;
mod ui;

use crate::app::App;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, ExecutableCommand};
use desk_application::config::Config;
use desk_application::state::DashboardState;
use desk_domain::repositories::backend::DashboardBackend;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

const TICK_MS: u64 = 100;
const SHUTDOWN_GRACE_MS: u64 = 250;

#[derive(Clone)]
pub struct DeskOpts {
    pub config: Config,
    pub log_store: logging::SharedLogStore,
}

pub fn run(opts: DeskOpts) -> Result<(), String> {
    // The blocking HTTP client owns its own runtime; it has to be built and
    // finally dropped outside of ours.
    let backend = bootstrap::build_backend(&opts.config)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()
        .map_err(|err| format!("failed to init tokio runtime: {err}"))?;
    let result = runtime.block_on(run_async(opts, backend.clone()));
    // Polls still in flight (no timeout configured) must not hold up quitting.
    runtime.shutdown_timeout(Duration::from_millis(SHUTDOWN_GRACE_MS));
    drop(backend);
    result
}

async fn run_async(opts: DeskOpts, backend: Arc<dyn DashboardBackend>) -> Result<(), String> {
    enable_raw_mode().map_err(|err| format!("failed to enable raw mode: {err}"))?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|err| format!("failed to enter alternate screen: {err}"))?;
    stdout
        .execute(crossterm::terminal::Clear(
            crossterm::terminal::ClearType::All,
        ))
        .map_err(|err| format!("failed to clear screen: {err}"))?;

    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal =
        Terminal::new(term_backend).map_err(|err| format!("failed to init terminal: {err}"))?;
    terminal
        .hide_cursor()
        .map_err(|err| format!("failed to hide cursor: {err}"))?;

    let result = run_loop(&mut terminal, opts, backend).await;

    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen);
    let _ = disable_raw_mode();
    let _ = terminal.show_cursor();

    result
}

fn poll_interval(ms: u64) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(Duration::from_millis(ms));
    // A slow backend must not cause a burst of catch-up polls.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn run_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    opts: DeskOpts,
    backend: Arc<dyn DashboardBackend>,
) -> Result<(), String> {
    let config = opts.config;
    let clock = config.clock_settings()?;

    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel();
    let task_runner = tasks::TaskRunner::new(event_tx.clone(), backend);
    let mut app = App::new(
        DashboardState::new(clock),
        config.backend.base_url.clone(),
        opts.log_store,
        task_runner,
    );
    app.spawn_input_reader(event_tx);

    tracing::info!(
        base_url = %config.backend.base_url,
        status_interval_ms = config.polling.status_interval_ms,
        logs_interval_ms = config.polling.logs_interval_ms,
        "dashboard started"
    );

    let mut status_timer = poll_interval(config.polling.status_interval_ms);
    let mut logs_timer = poll_interval(config.polling.logs_interval_ms);
    let mut tick = tokio::time::interval(Duration::from_millis(TICK_MS));

    loop {
        if app.dirty {
            terminal
                .draw(|frame| ui::draw(frame, &app))
                .map_err(|err| format!("terminal draw failed: {err}"))?;
            metrics::counter!("desk.tui.draws_total").increment(1);
            app.dirty = false;
        }

        tokio::select! {
            _ = status_timer.tick() => {
                app.request_status();
            }
            _ = logs_timer.tick() => {
                app.request_logs();
            }
            _ = tick.tick() => {
                app.on_tick();
            }
            maybe_event = event_rx.recv() => {
                let Some(event) = maybe_event else { return Ok(()); };
                if app.on_event(event)? { return Ok(()); }
            }
        }
    }
}
