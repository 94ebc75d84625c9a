//! Drives one accepted task to a terminal state by polling its progress.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::error::TranslateError;
use crate::model::{JobOutcome, RemoteTaskHandle, ServerConfig, TaskState};
use crate::transport::{ProgressSnapshot, RemoteStatus, TranslationServer};

/// ETA estimates below this percentage are too noisy to show.
const ETA_MIN_PERCENT: i32 = 20;

pub struct JobPoller {
    server: Arc<dyn TranslationServer>,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
    timeout: Duration,
}

impl JobPoller {
    pub fn new(
        server: Arc<dyn TranslationServer>,
        clock: Arc<dyn Clock>,
        config: &ServerConfig,
    ) -> Self {
        Self {
            server,
            clock,
            poll_interval: config.poll_interval,
            timeout: config.timeout,
        }
    }

    /// Polls until the task completes, fails, or `deadline` passes.
    ///
    /// `on_progress(percent, message)` fires for every snapshot that carries a
    /// known percentage. A failed progress query counts as a tick without
    /// progress; only the deadline ends an otherwise silent task.
    pub async fn run(
        &self,
        handle: &mut RemoteTaskHandle,
        deadline: Instant,
        on_progress: &mut (dyn FnMut(i32, &str) + Send),
    ) -> Result<JobOutcome, TranslateError> {
        let mut polls = 0u32;
        while self.clock.now() < deadline {
            let snapshot = self.server.query_progress(&handle.task_id).await;
            polls += 1;

            if snapshot.progress >= 0 {
                on_progress(snapshot.progress, &progress_message(&snapshot));
            }

            match snapshot.status {
                RemoteStatus::Completed => {
                    let result = self.server.fetch_result(&handle.task_id).await;
                    handle.advance(match result {
                        Ok(_) => TaskState::Completed,
                        Err(_) => TaskState::Failed,
                    });
                    return result;
                }
                RemoteStatus::Error => {
                    handle.advance(TaskState::Failed);
                    let message = snapshot
                        .message
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| "task failed".to_string());
                    tracing::warn!(task_id = %handle.task_id, "task failed on server: {}", message);
                    return Err(TranslateError::JobFailed(message));
                }
                RemoteStatus::Processing => {
                    handle.advance(TaskState::Processing);
                }
                RemoteStatus::Unknown => {
                    tracing::debug!(
                        task_id = %handle.task_id,
                        polls,
                        "no usable progress this tick"
                    );
                }
            }

            self.clock.sleep(self.poll_interval).await;
        }

        handle.advance(TaskState::TimedOut);
        tracing::warn!(task_id = %handle.task_id, polls, "task deadline reached");
        Err(TranslateError::JobTimedOut(self.timeout))
    }
}

/// `[42%] <server text>` plus ETA and page-count annotations when available.
pub fn progress_message(snapshot: &ProgressSnapshot) -> String {
    let pct = snapshot.progress.max(0);
    let text = snapshot
        .message
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or("processing...");
    let mut out = format!("[{}%] {}", pct, text);
    if pct >= ETA_MIN_PERCENT {
        if let Some(eta) = snapshot.eta_minutes.filter(|e| *e >= 0.0) {
            if eta < 1.0 {
                out.push_str(" (almost done)");
            } else {
                out.push_str(&format!(" (about {} min)", eta.round() as u64));
            }
        }
    }
    if let Some(pages) = snapshot.total_pages.filter(|p| *p > 0) {
        out.push_str(&format!(" [{} pages]", pages));
    }
    out
}
