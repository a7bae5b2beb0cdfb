//! Configuration management via environment variables
//!
//! Provides helper functions for reading environment variables with a
//! fallback name, plus the settings that are resolved before
//! `MonitorConfig` is loaded (log level/format, config file path).

use std::path::{Path, PathBuf};

use statusboard_common::config::MonitorConfig;
use statusboard_common::error::CommonError;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "STATUSBOARD_CONFIG";

/// Get an environment variable with fallback to a secondary name
///
/// If the primary variable is set, returns its value.
/// If only the fallback variable is set, returns its value.
///
/// # Example
/// ```
/// use statusboard::config::get_env_with_fallback;
///
/// let level = get_env_with_fallback("STATUSBOARD_LOG_LEVEL", "RUST_LOG");
/// ```
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback and default value
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directive (e.g. `info`, `statusboard=debug`)
    pub level: String,
    /// Emit JSON lines instead of the human readable format
    pub json: bool,
}

impl LogConfig {
    /// Load logging configuration from environment variables.
    ///
    /// `STATUSBOARD_LOG_LEVEL` (falls back to `RUST_LOG`, then `info`) and
    /// `STATUSBOARD_LOG_FORMAT` (`json` or anything else for text).
    pub fn from_env() -> Self {
        let level = get_env_with_fallback_or("STATUSBOARD_LOG_LEVEL", "RUST_LOG", "info");
        let json = std::env::var("STATUSBOARD_LOG_FORMAT")
            .map(|value| value.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Self { level, json }
    }
}

/// 設定ファイルのパスを決定
///
/// CLI引数を優先し、未指定なら `STATUSBOARD_CONFIG` を使う。
pub fn resolve_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    cli_path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from))
}

/// 監視設定を読み込む
pub fn load_monitor_config(cli_path: Option<&Path>) -> Result<MonitorConfig, CommonError> {
    let path = resolve_config_path(cli_path);
    if let Some(ref path) = path {
        tracing::info!(path = %path.display(), "Loading configuration file");
    }
    MonitorConfig::load(path.as_deref())
}
