use desk_application::config::{self, Config};
use desk_domain::repositories::backend::DashboardBackend;
use desk_infrastructure::http::HttpDashboardClient;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

pub const CONFIG_ENV: &str = "AGENT_DESK_CONFIG";
pub const BACKEND_URL_ENV: &str = "AGENT_DESK_BACKEND_URL";

pub fn env_non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Config shared by the TUI and the headless runner: flag, then env, then
/// file, then defaults. The URL override is validated with the rest.
pub fn prepare_startup(
    config_path: Option<PathBuf>,
    backend_url: Option<String>,
) -> Result<Config, String> {
    let config_path = config_path.or_else(|| env_non_empty(CONFIG_ENV).map(PathBuf::from));
    let backend_url = backend_url
        .filter(|v| !v.trim().is_empty())
        .or_else(|| env_non_empty(BACKEND_URL_ENV));

    let mut config = match config_path.as_deref() {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };
    apply_overrides(&mut config, backend_url)?;

    tracing::debug!(
        config_path = ?config_path,
        base_url = %config.backend.base_url,
        timeout_ms = ?config.backend.timeout_ms,
        "startup config resolved"
    );
    Ok(config)
}

pub fn apply_overrides(config: &mut Config, backend_url: Option<String>) -> Result<(), String> {
    if let Some(url) = backend_url {
        config.backend.base_url = url.trim().to_string();
    }
    config
        .validate()
        .map_err(|err| format!("invalid startup settings: {err}"))
}

pub fn build_backend(config: &Config) -> Result<Arc<dyn DashboardBackend>, String> {
    let client =
        HttpDashboardClient::new(config.backend.base_url.clone(), config.backend.timeout_ms)
            .map_err(|err| {
                format!(
                    "failed to init backend client (url={}): {err}",
                    config.backend.base_url
                )
            })?;
    Ok(Arc::new(client))
}
