use chrono::format::{Item, StrftimeItems};
use desk_domain::services::view::ClockSettings;
use desk_domain::value_objects::timestamp::ClockZone;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_STATUS_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_LOGS_INTERVAL_MS: u64 = 3000;
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub base_url: String,
    /// Unset means requests never time out.
    pub timeout_ms: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            timeout_ms: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PollingConfig {
    #[serde(default = "default_status_interval_ms")]
    pub status_interval_ms: u64,
    #[serde(default = "default_logs_interval_ms")]
    pub logs_interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            status_interval_ms: DEFAULT_STATUS_INTERVAL_MS,
            logs_interval_ms: DEFAULT_LOGS_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    /// Fixed offset for trade times; unset uses the system local zone.
    pub utc_offset_minutes: Option<i32>,
    #[serde(default = "default_time_format")]
    pub time_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: None,
            time_format: default_time_format(),
        }
    }
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_status_interval_ms() -> u64 {
    DEFAULT_STATUS_INTERVAL_MS
}

fn default_logs_interval_ms() -> u64 {
    DEFAULT_LOGS_INTERVAL_MS
}

fn default_time_format() -> String {
    DEFAULT_TIME_FORMAT.to_string()
}

impl Config {
    pub fn validate(&self) -> Result<(), String> {
        let url = self.backend.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(format!(
                "invalid backend.base_url '{}': expected http:// or https://",
                self.backend.base_url
            ));
        }
        if self.backend.timeout_ms == Some(0) {
            return Err("invalid backend.timeout_ms: must be > 0 (omit it to disable)".to_string());
        }
        if self.polling.status_interval_ms == 0 {
            return Err("invalid polling.status_interval_ms: must be > 0".to_string());
        }
        if self.polling.logs_interval_ms == 0 {
            return Err("invalid polling.logs_interval_ms: must be > 0".to_string());
        }
        validate_time_format(&self.display.time_format)?;
        ClockZone::from_offset_minutes(self.display.utc_offset_minutes)?;
        Ok(())
    }

    pub fn clock_settings(&self) -> Result<ClockSettings, String> {
        validate_time_format(&self.display.time_format)?;
        Ok(ClockSettings {
            zone: ClockZone::from_offset_minutes(self.display.utc_offset_minutes)?,
            time_format: self.display.time_format.clone(),
        })
    }
}

fn validate_time_format(fmt: &str) -> Result<(), String> {
    if fmt.trim().is_empty() {
        return Err("invalid display.time_format: empty".to_string());
    }
    if StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error)) {
        return Err(format!("invalid display.time_format '{fmt}'"));
    }
    Ok(())
}

pub fn load_config(path: &Path) -> Result<Config, String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("failed to read config {}: {}", path.display(), err))?;
    let config: Config = toml::from_str(&contents)
        .map_err(|err| format!("failed to parse TOML {}: {}", path.display(), err))?;
    config
        .validate()
        .map_err(|err| format!("invalid config {}: {err}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::{Config, DEFAULT_BACKEND_URL};
    use desk_domain::value_objects::timestamp::ClockZone;

    fn parse_config(toml_str: &str) -> Config {
        toml::from_str(toml_str).expect("config should parse")
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_config("");
        assert_eq!(config, Config::default());
        assert_eq!(config.backend.base_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.polling.status_interval_ms, 2000);
        assert_eq!(config.polling.logs_interval_ms, 3000);
        assert!(config.backend.timeout_ms.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_config() {
        let config = parse_config(
            r#"
[backend]
base_url = "http://10.0.0.5:5000"
timeout_ms = 1500

[polling]
status_interval_ms = 1000
logs_interval_ms = 5000

[display]
utc_offset_minutes = 330
time_format = "%I:%M:%S %p"
"#,
        );
        assert_eq!(config.backend.timeout_ms, Some(1500));
        assert_eq!(config.polling.logs_interval_ms, 5000);
        let clock = config.clock_settings().expect("clock");
        assert!(matches!(clock.zone, ClockZone::Fixed(_)));
        assert_eq!(clock.time_format, "%I:%M:%S %p");
    }

    #[test]
    fn parse_config_rejects_unknown_fields() {
        let err = toml::from_str::<Config>("[backend]\nbase_url = \"http://x\"\ntoken = \"abc\"\n")
            .expect_err("unknown field should fail");
        assert!(err.to_string().to_lowercase().contains("unknown field"));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = Config::default();
        config.backend.base_url = "ftp://host".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.polling.status_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.backend.timeout_ms = Some(0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.display.time_format = "%Q".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.display.utc_offset_minutes = Some(100_000);
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_reads_and_validates_file() {
        let dir = std::env::temp_dir().join(format!(
            "desk_config_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0)
        ));
        std::fs::create_dir_all(&dir).expect("tmp dir");

        let good = dir.join("good.toml");
        std::fs::write(&good, "[polling]\nstatus_interval_ms = 500\n").expect("write");
        let config = super::load_config(&good).expect("load");
        assert_eq!(config.polling.status_interval_ms, 500);
        assert_eq!(config.polling.logs_interval_ms, 3000);

        let bad = dir.join("bad.toml");
        std::fs::write(&bad, "[polling]\nlogs_interval_ms = 0\n").expect("write");
        let err = super::load_config(&bad).expect_err("zero interval");
        assert!(err.contains("invalid config"));

        let err = super::load_config(&dir.join("missing.toml")).expect_err("missing file");
        assert!(err.contains("failed to read config"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
