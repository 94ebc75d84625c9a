use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::collaborators::CredentialProvider;
use crate::model::{Credential, Engine, ServerConfig, TranslationOptions, Variant};

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per server call (including the first).
    pub max_attempts: u32,
    /// Linear backoff unit in seconds (attempt `n` waits `n * base_delay_secs`).
    pub base_delay_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay_secs: 2.0,
        }
    }
}

/// Where and how to reach the translation server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    pub base_url: String,
    /// Budget for one job (submit + polling), in seconds.
    pub timeout_secs: u64,
    /// Delay between progress queries, in milliseconds.
    pub poll_interval_ms: u64,
    #[serde(default)]
    pub engine: Engine,
    /// Service used by the `pdf2zh` engine.
    #[serde(default)]
    pub service: String,
    /// Service used by the `pdf2zh_next` engine.
    #[serde(default)]
    pub next_service: String,
    #[serde(default)]
    pub options: TranslationOptions,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8890".to_string(),
            timeout_secs: 1800,
            poll_interval_ms: 5000,
            engine: Engine::default(),
            service: "bing".to_string(),
            next_service: "siliconflowfree".to_string(),
            options: TranslationOptions::default(),
        }
    }
}

/// How to start the server when it is not reachable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Try to start the server before a batch if the health check fails.
    pub autostart: bool,
    /// Server executable or script; autostart is skipped when unset.
    pub executable: Option<PathBuf>,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    /// Seconds between readiness checks after starting.
    pub ready_interval_secs: u64,
    /// Readiness checks before giving up.
    pub ready_attempts: u32,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            autostart: true,
            executable: None,
            args: Vec::new(),
            working_dir: None,
            ready_interval_secs: 2,
            ready_attempts: 10,
        }
    }
}

/// What happens to produced files once downloaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Name imported files `<stem>-<service>-<variant>.pdf` instead of the server's name.
    pub rename: bool,
    /// Variants to open with the desktop viewer after import.
    pub open: Vec<Variant>,
    /// Destination for imported files (defaults to next to the source PDF).
    pub dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            rename: true,
            open: Vec::new(),
            dir: None,
        }
    }
}

/// One configured LLM API. Only entries with `activate = true` are sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmApiEntry {
    #[serde(default)]
    pub activate: bool,
    pub service: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub extra_data: BTreeMap<String, String>,
}

impl CredentialProvider for Vec<LlmApiEntry> {
    fn active_credential(&self, service: &str) -> Option<Credential> {
        self.iter()
            .find(|e| e.activate && e.service == service)
            .map(|e| Credential {
                service: e.service.clone(),
                model: e.model.clone(),
                api_key: e.api_key.clone(),
                api_url: e.api_url.clone(),
                extra_data: e.extra_data.clone(),
            })
    }
}

/// Global configuration loaded from `~/.config/transdoc/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSection,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    #[serde(default)]
    pub launcher: LauncherConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub llm_api: Vec<LlmApiEntry>,
}

impl AppConfig {
    /// Builds the immutable per-batch `ServerConfig`, validating its invariants.
    pub fn server_config(&self) -> Result<ServerConfig> {
        let s = &self.server;
        let cfg = ServerConfig {
            base_url: s.base_url.trim().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(s.timeout_secs),
            poll_interval: Duration::from_millis(s.poll_interval_ms),
            engine: s.engine,
            service: s.service.clone(),
            next_service: s.next_service.clone(),
            options: s.options.clone(),
        };
        cfg.validate().context("invalid [server] configuration")?;
        Ok(cfg)
    }

    pub fn retry_config(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }

    /// Effective configuration as TOML, with API keys masked.
    pub fn to_display_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        shown.retry = Some(self.retry_config());
        for entry in &mut shown.llm_api {
            if !entry.api_key.is_empty() {
                entry.api_key = "********".to_string();
            }
        }
        Ok(toml::to_string_pretty(&shown)?)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("transdoc")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<AppConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = AppConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: AppConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
