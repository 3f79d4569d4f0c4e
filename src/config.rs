//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory,
//! then applies `MYNAH_BASE_URL` and `MYNAH_LOG_LEVEL` env overrides.

use std::{
    env,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;

/// HTTP backend configuration.
#[derive(Debug, Clone)]
pub struct HttpApiConfig {
    /// Base URL of the chat API, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

/// Chat API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Which backend is active (e.g. `"http"`, `"dummy"`).
    /// Maps to `default` in `[api]` TOML — named `default` there to signal
    /// that other backend sections can coexist without being loaded.
    pub backend: String,
    /// Config for the HTTP backend (`[api.http]`).
    pub http: HttpApiConfig,
}

/// Fully-resolved client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub name: String,
    pub log_level: String,
    /// Optional log file (already expanded, no `~`). Logs go to stderr when absent.
    pub log_file: Option<PathBuf>,
    pub api: ApiConfig,
}

/// Raw TOML shape — `serde` target before resolution.
#[derive(Deserialize)]
struct RawConfig {
    client: RawClient,
    #[serde(default)]
    api: RawApi,
}

#[derive(Deserialize)]
struct RawClient {
    name: String,
    log_level: String,
    #[serde(default)]
    log_file: Option<String>,
}

#[derive(Deserialize)]
struct RawApi {
    /// Maps to `default = "..."` in `[api]`.
    #[serde(rename = "default", default = "default_backend")]
    backend: String,
    #[serde(default)]
    http: RawHttpApi,
}

impl Default for RawApi {
    fn default() -> Self {
        Self { backend: default_backend(), http: RawHttpApi::default() }
    }
}

#[derive(Deserialize)]
struct RawHttpApi {
    #[serde(default = "default_base_url")]
    base_url: String,
    #[serde(default = "default_timeout_ms")]
    timeout_ms: u64,
}

impl Default for RawHttpApi {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_backend() -> String { "http".to_string() }
fn default_base_url() -> String { "http://localhost:5000/api".to_string() }
fn default_timeout_ms() -> u64 { 10_000 }

/// Load config from `config/default.toml`, then apply env-var overrides.
pub fn load() -> Result<Config, AppError> {
    let base_url_override = env::var("MYNAH_BASE_URL").ok();
    let log_level_override = env::var("MYNAH_LOG_LEVEL").ok();
    load_from(
        Path::new("config/default.toml"),
        base_url_override.as_deref(),
        log_level_override.as_deref(),
    )
}

/// Internal loader — accepts an explicit path and optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    path: &Path,
    base_url_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let c = parsed.client;

    let log_level = log_level_override.unwrap_or(&c.log_level).to_string();
    let log_file = c.log_file.map(|f| expand_home(&f));
    let base_url = base_url_override
        .unwrap_or(&parsed.api.http.base_url)
        .trim_end_matches('/')
        .to_string();

    Ok(Config {
        name: c.name,
        log_level,
        log_file,
        api: ApiConfig {
            backend: parsed.api.backend,
            http: HttpApiConfig {
                base_url,
                timeout_ms: parsed.api.http.timeout_ms,
            },
        },
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    match (path, path.strip_prefix("~/"), dirs::home_dir()) {
        (_, Some(rest), Some(home)) => home.join(rest),
        ("~", None, Some(home)) => home,
        _ => PathBuf::from(path),
    }
}

// ── test helpers ──────────────────────────────────────────────────────────────

/// Safe `Config` for unit tests — dummy backend, no external calls.
#[cfg(test)]
impl Config {
    pub fn test_default() -> Self {
        Self {
            name: "test".into(),
            log_level: "info".into(),
            log_file: None,
            api: ApiConfig {
                backend: "dummy".into(),
                http: HttpApiConfig {
                    base_url: "http://localhost:0/api".into(),
                    timeout_ms: 1_000,
                },
            },
        }
    }
}
