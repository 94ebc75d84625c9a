//! Best-effort server recovery: probe, start if down, wait until it answers.
//!
//! Not a supervisor. The started process is never tracked afterward, and a
//! failed start is returned to the caller rather than retried here.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::collaborators::ProcessLauncher;
use crate::config::LauncherConfig;
use crate::error::TranslateError;
use crate::transport::TranslationServer;

/// How to start the server and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSettings {
    pub executable: Option<PathBuf>,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub ready_interval: Duration,
    pub ready_attempts: u32,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            executable: None,
            args: Vec::new(),
            working_dir: None,
            ready_interval: Duration::from_secs(2),
            ready_attempts: 10,
        }
    }
}

impl From<&LauncherConfig> for LaunchSettings {
    fn from(cfg: &LauncherConfig) -> Self {
        Self {
            executable: cfg.executable.clone(),
            args: cfg.args.clone(),
            working_dir: cfg.working_dir.clone(),
            ready_interval: Duration::from_secs(cfg.ready_interval_secs),
            ready_attempts: cfg.ready_attempts,
        }
    }
}

pub struct ServerLifecycleManager {
    server: Arc<dyn TranslationServer>,
    launcher: Arc<dyn ProcessLauncher>,
    clock: Arc<dyn Clock>,
    settings: LaunchSettings,
}

impl ServerLifecycleManager {
    pub fn new(
        server: Arc<dyn TranslationServer>,
        launcher: Arc<dyn ProcessLauncher>,
        clock: Arc<dyn Clock>,
        settings: LaunchSettings,
    ) -> Self {
        Self {
            server,
            launcher,
            clock,
            settings,
        }
    }

    /// `Ok(true)` if the server answers, now or after being started.
    /// `Ok(false)` if it is down and either no executable is configured or
    /// it never became ready. `Err(Launch)` if starting it failed.
    pub async fn ensure_ready(&self) -> Result<bool, TranslateError> {
        if self.server.check_health().await {
            return Ok(true);
        }
        if self.settings.executable.is_none() {
            tracing::warn!("server unreachable and no server executable configured");
            return Ok(false);
        }
        self.start()?;
        let ready = self
            .await_ready(self.settings.ready_attempts, self.settings.ready_interval)
            .await;
        if !ready {
            tracing::warn!(
                attempts = self.settings.ready_attempts,
                "server did not become ready after start"
            );
        }
        Ok(ready)
    }

    /// Spawns the configured server executable, detached.
    pub fn start(&self) -> Result<(), TranslateError> {
        let executable = self
            .settings
            .executable
            .as_deref()
            .ok_or_else(|| TranslateError::Launch("no server executable configured".to_string()))?;
        tracing::info!(
            executable = %executable.display(),
            args = ?self.settings.args,
            "starting translation server"
        );
        self.launcher
            .spawn(
                executable,
                &self.settings.args,
                self.settings.working_dir.as_deref(),
            )
            .map_err(|e| TranslateError::Launch(format!("{:#}", e)))
    }

    /// Waits `interval` before each check, up to `max_attempts` checks.
    pub async fn await_ready(&self, max_attempts: u32, interval: Duration) -> bool {
        for attempt in 1..=max_attempts {
            self.clock.sleep(interval).await;
            if self.server.check_health().await {
                tracing::info!(attempt, "translation server is ready");
                return true;
            }
            tracing::debug!(attempt, max_attempts, "server not ready yet");
        }
        false
    }
}
