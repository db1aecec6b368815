//! Server configuration loading from file and environment variables.

use helpdesk_types::IssueCategory;
use helpdesk_voice::LiveKitConfig;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Where conversation tools read and write tickets.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Conversation session lifetime.
    #[serde(default)]
    pub sessions: SessionConfig,

    /// LiveKit credentials for voice access tokens.
    #[serde(default)]
    pub livekit: LiveKitConfig,

    /// Issue catalog override.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum pooled connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "helpdesk_tools=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// This server's own SQLite store.
    #[default]
    Local,
    /// Another help-desk server's ticket API at `remote_url`.
    Remote,
}

/// Ticket backend used by conversation sessions.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub mode: BackendMode,

    /// Base URL of the remote ticket API, e.g. `http://tickets:3000`.
    #[serde(default)]
    pub remote_url: Option<String>,

    /// Upper bound on each backend call, in milliseconds.
    #[serde(default = "default_backend_timeout_ms")]
    pub timeout_ms: u64,
}

/// Conversation sessions left idle this long are dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Seconds since the last tool call; `0` keeps sessions until closed.
    #[serde(default = "default_session_idle_timeout_seconds")]
    pub idle_timeout_seconds: u64,
}

/// Replacement issue catalog. Empty keeps the built-in table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub issues: Vec<IssueCategory>,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    8000
}

fn default_db_path() -> String {
    "tickets.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_pool_max_size() -> u32 {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_backend_timeout_ms() -> u64 {
    5_000
}

fn default_session_idle_timeout_seconds() -> u64 {
    30 * 60
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_seconds: default_session_idle_timeout_seconds(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            mode: BackendMode::default(),
            remote_url: None,
            timeout_ms: default_backend_timeout_ms(),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The file parsed but describes an unusable setup.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `HELPDESK_HOST` overrides `server.host`
/// - `HELPDESK_PORT` overrides `server.port`
/// - `HELPDESK_DB_PATH` overrides `database.path`
/// - `HELPDESK_LOG_LEVEL` overrides `logging.level`
/// - `HELPDESK_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `HELPDESK_BACKEND_MODE` overrides `backend.mode` ("local" or "remote")
/// - `HELPDESK_REMOTE_URL` overrides `backend.remote_url`
/// - `HELPDESK_SESSION_IDLE_SECONDS` overrides `sessions.idle_timeout_seconds`
/// - `LIVEKIT_URL`, `LIVEKIT_API_KEY`, `LIVEKIT_API_SECRET` override `livekit.*`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed,
/// or if remote mode is selected without a URL.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate(&config)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(host) = var("HELPDESK_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = var("HELPDESK_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(db_path) = var("HELPDESK_DB_PATH") {
        config.database.path = db_path;
    }
    if let Some(level) = var("HELPDESK_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("HELPDESK_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(mode) = var("HELPDESK_BACKEND_MODE") {
        match mode.trim().to_ascii_lowercase().as_str() {
            "local" => config.backend.mode = BackendMode::Local,
            "remote" => config.backend.mode = BackendMode::Remote,
            other => tracing::warn!(value = other, "ignoring unknown HELPDESK_BACKEND_MODE"),
        }
    }
    if let Some(url) = var("HELPDESK_REMOTE_URL") {
        config.backend.remote_url = Some(url);
    }
    if let Some(seconds) = var("HELPDESK_SESSION_IDLE_SECONDS") {
        if let Ok(parsed) = seconds.parse() {
            config.sessions.idle_timeout_seconds = parsed;
        }
    }
    if let Some(url) = var("LIVEKIT_URL") {
        config.livekit.url = url;
    }
    if let Some(key) = var("LIVEKIT_API_KEY") {
        config.livekit.api_key = key;
    }
    if let Some(secret) = var("LIVEKIT_API_SECRET") {
        config.livekit.api_secret = secret;
    }
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.backend.mode == BackendMode::Remote
        && config
            .backend
            .remote_url
            .as_deref()
            .map_or(true, |url| url.trim().is_empty())
    {
        return Err(ConfigError::Invalid(
            "backend.mode = \"remote\" requires backend.remote_url".to_string(),
        ));
    }
    if config.backend.timeout_ms == 0 {
        return Err(ConfigError::Invalid(
            "backend.timeout_ms must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = load_config(path.to_str()).unwrap();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.database.path, "tickets.db");
        assert_eq!(config.backend.mode, BackendMode::Local);
        assert_eq!(config.backend.timeout_ms, 5_000);
        assert_eq!(config.sessions.idle_timeout_seconds, 1_800);
        assert!(config.catalog.issues.is_empty());
    }

    #[test]
    fn full_file_parses() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [backend]
            mode = "remote"
            remote_url = "http://tickets:8000"
            timeout_ms = 250

            [sessions]
            idle_timeout_seconds = 90

            [livekit]
            url = "wss://voice.example.com"
            api_key = "key"
            api_secret = "secret"

            [[catalog.issues]]
            key = "vpn"
            name = "VPN trouble"
            display_name = "VPN access problems"
            unit_price = 30
            keywords = ["vpn", "tunnel"]
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.backend.mode, BackendMode::Remote);
        assert_eq!(config.backend.timeout_ms, 250);
        assert_eq!(config.sessions.idle_timeout_seconds, 90);
        assert!(config.livekit.is_complete());
        assert_eq!(config.catalog.issues[0].unit_price, 30);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn env_overrides_win() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("HELPDESK_PORT", "7001"),
            ("HELPDESK_DB_PATH", "/tmp/x.db"),
            ("HELPDESK_LOG_JSON", "1"),
            ("HELPDESK_BACKEND_MODE", "Remote"),
            ("HELPDESK_REMOTE_URL", "http://other:8000"),
            ("HELPDESK_SESSION_IDLE_SECONDS", "0"),
            ("LIVEKIT_API_SECRET", "s3cret"),
        ]);
        let mut config = Config::default();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.server.port, 7001);
        assert_eq!(config.database.path, "/tmp/x.db");
        assert!(config.logging.json);
        assert_eq!(config.backend.mode, BackendMode::Remote);
        assert_eq!(config.backend.remote_url.as_deref(), Some("http://other:8000"));
        assert_eq!(config.sessions.idle_timeout_seconds, 0);
        assert_eq!(config.livekit.api_secret, "s3cret");
    }

    #[test]
    fn remote_mode_needs_url() {
        let mut config = Config::default();
        config.backend.mode = BackendMode::Remote;
        assert!(matches!(validate(&config), Err(ConfigError::Invalid(_))));
    }
}
