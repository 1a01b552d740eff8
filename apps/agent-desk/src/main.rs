use agent_desk::bootstrap;
use agent_desk::headless::{HeadlessArgs, HeadlessMode};
use agent_desk::{logging, DeskOpts};
use clap::{Parser, ValueEnum};
use desk_domain::value_objects::control::ControlAction;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "agent-desk")]
#[command(about = "Trading agent dashboard (TUI) + optional headless runner.", version)]
struct Cli {
    /// Run without TUI and exit after the selected mode completes.
    #[arg(long)]
    headless: bool,

    /// Headless mode: status | logs | control | snapshot
    #[arg(long)]
    mode: Option<Mode>,

    /// Config file path (TOML). If omitted, uses env AGENT_DESK_CONFIG, then defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend base URL; overrides backend.base_url (env AGENT_DESK_BACKEND_URL).
    #[arg(long)]
    backend_url: Option<String>,

    /// Control to send (control mode only).
    #[arg(long)]
    action: Option<Action>,

    /// Write an HTML snapshot to this path (snapshot mode only).
    #[arg(long)]
    html_out: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Mode {
    Status,
    Logs,
    Control,
    Snapshot,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Action {
    Start,
    Pause,
    Stop,
}

impl From<Action> for ControlAction {
    fn from(action: Action) -> Self {
        match action {
            Action::Start => ControlAction::Start,
            Action::Pause => ControlAction::Pause,
            Action::Stop => ControlAction::Stop,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_store = logging::LogStore::shared(logging::DEFAULT_MAX_LINES);
    let tracing_result = if cli.headless {
        init_tracing_stderr()
    } else {
        init_tracing(log_store.clone())
    };
    if let Err(err) = tracing_result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
    if let Err(err) = init_metrics() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    let config = match bootstrap::prepare_startup(cli.config, cli.backend_url) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    if cli.headless {
        let mode = match cli.mode {
            Some(Mode::Status) => HeadlessMode::Status,
            Some(Mode::Logs) => HeadlessMode::Logs,
            Some(Mode::Control) => HeadlessMode::Control,
            Some(Mode::Snapshot) => HeadlessMode::Snapshot,
            None => {
                eprintln!("error: --mode is required with --headless");
                std::process::exit(1);
            }
        };

        let result = agent_desk::headless::run_headless(HeadlessArgs {
            mode,
            config,
            action: cli.action.map(ControlAction::from),
            html_out: cli.html_out,
        });

        match result {
            Ok(output) => {
                println!(
                    "{}",
                    serde_json::to_string(&output.json)
                        .unwrap_or_else(|_| "{\"status\":\"error\",\"error\":\"json\"}".to_string())
                );
                std::process::exit(output.exit_code);
            }
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(1);
            }
        }
    }

    let opts = DeskOpts { config, log_store };
    if let Err(err) = agent_desk::run(opts) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn log_filter() -> Result<tracing_subscriber::EnvFilter, String> {
    let filter = std::env::var("AGENT_DESK_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|err| format!("invalid log filter: {err}"))
}

fn init_tracing(log_store: logging::SharedLogStore) -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter()?)
        .with_ansi(false)
        .with_writer(logging::LogMakeWriter::new(log_store))
        .init();

    Ok(())
}

fn init_tracing_stderr() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter()?)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

#[cfg(feature = "prometheus")]
fn init_metrics() -> Result<Option<SocketAddr>, String> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let Some(raw) = bootstrap::env_non_empty("AGENT_DESK_METRICS_ADDR") else {
        return Ok(None);
    };

    let addr: SocketAddr = raw
        .trim()
        .parse()
        .map_err(|err| format!("invalid AGENT_DESK_METRICS_ADDR (expected host:port): {err}"))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|err| format!("failed to install prometheus exporter: {err}"))?;

    tracing::info!(metrics_addr = %addr, "prometheus metrics exporter enabled");
    Ok(Some(addr))
}

#[cfg(not(feature = "prometheus"))]
fn init_metrics() -> Result<Option<SocketAddr>, String> {
    Ok(None)
}
