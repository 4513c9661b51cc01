use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::error;

const DEFAULT_API_BASE_URL: &str = "http://localhost:7000/api";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// ─── TOML config file ─────────────────────────────────────────────────────────

/// `{data_dir}/config.toml` — all fields are optional overrides.
/// Priority: CLI / env var  >  TOML  >  built-in default.
#[derive(Deserialize, Default)]
struct TomlConfig {
    /// Base URL of the task API (default: http://localhost:7000/api).
    api_base_url: Option<String>,
    /// Log level filter string, e.g. "debug", "info,taskdeck=trace" (default: "info").
    log: Option<String>,
    /// Log output format: "pretty" (default, human-readable) | "json" (structured for log aggregators).
    log_format: Option<String>,
    /// HTTP request timeout in seconds (default: 30).
    http_timeout_secs: Option<u64>,
}

fn load_toml(data_dir: &Path) -> Option<TomlConfig> {
    let path = data_dir.join("config.toml");
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config.toml — using defaults");
            None
        }
    }
}

// ─── ClientConfig ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the task API (TASKDECK_API_URL env var).
    pub api_base_url: String,
    /// Directory holding the persisted session token and config.toml.
    pub data_dir: PathBuf,
    pub log: String,
    /// Log output format: "pretty" (default) | "json".
    pub log_format: String,
    /// HTTP request timeout in seconds.
    pub http_timeout_secs: u64,
}

impl ClientConfig {
    /// Build config from CLI/env args + optional TOML file.
    ///
    /// Priority (highest to lowest):
    ///   1. CLI / env — passed as `Some(value)` from clap
    ///   2. TOML file at `{data_dir}/config.toml`
    ///   3. Built-in defaults
    pub fn new(
        api_base_url: Option<String>,
        data_dir: Option<PathBuf>,
        log: Option<String>,
    ) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);

        // Load TOML as the lowest-priority override layer
        let toml = load_toml(&data_dir).unwrap_or_default();

        let api_base_url = api_base_url
            .filter(|s| !s.is_empty())
            .or(toml.api_base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());

        let log_format = std::env::var("TASKDECK_LOG_FORMAT")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.log_format)
            .unwrap_or_else(|| "pretty".to_string());

        let http_timeout_secs = toml.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        Self {
            api_base_url,
            data_dir,
            log,
            log_format,
            http_timeout_secs,
        }
    }
}

fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/taskdeck
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("taskdeck");
        }
    }
    #[cfg(target_os = "linux")]
    {
        // $XDG_DATA_HOME/taskdeck or ~/.local/share/taskdeck
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("taskdeck");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("taskdeck");
        }
    }
    #[cfg(target_os = "windows")]
    {
        // %APPDATA%\taskdeck
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("taskdeck");
        }
    }
    // Fallback
    PathBuf::from(".taskdeck")
}
