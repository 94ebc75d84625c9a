//! Run a batch: jobs one after another, events for each step, counts at the end.

use std::sync::Arc;

use crate::clock::{Clock, TokioClock};
use crate::collaborators::{AttachmentImporter, CredentialProvider, NoCredentials};
use crate::error::TranslateError;
use crate::events::{BatchEvent, EventSink};
use crate::lifecycle::ServerLifecycleManager;
use crate::model::{Job, JobOutcome};
use crate::poller::JobPoller;
use crate::retry::{run_with_retry, RetryPolicy};
use crate::transport::{SubmitResult, TranslationServer};

use super::progress::{batch_percent, MonotonicPercent};
use super::stage::OutputOptions;

/// Local progress reported as soon as the server accepts a job.
const ACCEPTED_PERCENT: i32 = 5;

/// Per-job outcomes, in job order, plus totals.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchReport {
    pub outcomes: Vec<JobOutcome>,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Sequences jobs against one server.
///
/// Jobs never overlap: at most one request is outstanding at any time, and
/// every event of job `i` is published before job `i + 1` starts.
pub struct BatchOrchestrator {
    pub(super) server: Arc<dyn TranslationServer>,
    pub(super) importer: Arc<dyn AttachmentImporter>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) retry: RetryPolicy,
    pub(super) output: OutputOptions,
    credentials: Arc<dyn CredentialProvider>,
    lifecycle: Option<ServerLifecycleManager>,
}

impl BatchOrchestrator {
    pub fn new(server: Arc<dyn TranslationServer>, importer: Arc<dyn AttachmentImporter>) -> Self {
        Self {
            server,
            importer,
            clock: Arc::new(TokioClock),
            retry: RetryPolicy::default(),
            output: OutputOptions::default(),
            credentials: Arc::new(NoCredentials),
            lifecycle: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_output(mut self, output: OutputOptions) -> Self {
        self.output = output;
        self
    }

    /// Check (and if needed start) the server once before the first job.
    pub fn with_lifecycle(mut self, lifecycle: ServerLifecycleManager) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    /// Runs every job in order. Never fails: job errors end up in the
    /// report and in `JobCompleted` events.
    pub async fn run(&self, jobs: Vec<Job>, sink: &dyn EventSink) -> BatchReport {
        let count = jobs.len();
        tracing::info!(count, "batch started");
        sink.publish(&BatchEvent::BatchStarted { count });

        let unavailable = if count > 0 {
            self.preflight().await
        } else {
            None
        };

        let mut report = BatchReport::default();
        for (offset, job) in jobs.iter().enumerate() {
            let index = offset + 1;
            sink.publish(&BatchEvent::JobStarted {
                index,
                count,
                file_name: job.file_name.clone(),
            });

            let result = match &unavailable {
                Some(err) => Err(err.clone()),
                None => self.run_job(index, count, job, sink).await,
            };
            let outcome = match result {
                Ok(outcome) => {
                    tracing::info!(
                        index,
                        count,
                        file = %job.file_name,
                        files = outcome.files.len(),
                        "job succeeded"
                    );
                    report.succeeded += 1;
                    outcome
                }
                Err(err) => {
                    tracing::warn!(index, count, file = %job.file_name, "job failed: {}", err);
                    report.failed += 1;
                    JobOutcome::failed(&err)
                }
            };

            sink.publish(&BatchEvent::JobCompleted {
                index,
                count,
                file_name: job.file_name.clone(),
                success: outcome.success,
                error: outcome.error.clone(),
            });
            report.outcomes.push(outcome);
        }

        tracing::info!(
            count,
            succeeded = report.succeeded,
            failed = report.failed,
            "batch finished"
        );
        sink.publish(&BatchEvent::BatchCompleted {
            count,
            succeeded: report.succeeded,
            failed: report.failed,
        });
        report
    }

    /// `Some(error)` when the server is not usable and every job should fail with it.
    async fn preflight(&self) -> Option<TranslateError> {
        let lifecycle = self.lifecycle.as_ref()?;
        match lifecycle.ensure_ready().await {
            Ok(true) => None,
            Ok(false) => Some(TranslateError::Transport(
                "translation server is not reachable".to_string(),
            )),
            Err(e) => Some(e),
        }
    }

    async fn run_job(
        &self,
        index: usize,
        count: usize,
        job: &Job,
        sink: &dyn EventSink,
    ) -> Result<JobOutcome, TranslateError> {
        let deadline = self.clock.now() + job.config.timeout;
        let credential = self
            .credentials
            .active_credential(job.config.active_service());

        let mut tracker = MonotonicPercent::default();
        let mut report = |local: i32, message: &str| {
            let local = tracker.update(local);
            sink.publish(&BatchEvent::JobProgress {
                index,
                count,
                file_name: job.file_name.clone(),
                local_percent: local,
                batch_percent: batch_percent(index, count, local),
                message: message.to_string(),
            });
        };

        let submitted = run_with_retry(&self.retry, self.clock.as_ref(), || {
            self.server.submit(job, credential.as_ref())
        })
        .await?;

        let outcome = match submitted {
            SubmitResult::Immediate(outcome) => {
                report(100, "done");
                outcome
            }
            SubmitResult::Accepted(mut handle) => {
                tracing::info!(task_id = %handle.task_id, file = %job.file_name, "job accepted");
                report(ACCEPTED_PERCENT, "submitted, waiting for server");
                let poller = JobPoller::new(self.server.clone(), self.clock.clone(), &job.config);
                poller.run(&mut handle, deadline, &mut report).await?
            }
        };

        if !outcome.success {
            return Err(TranslateError::Server(
                outcome
                    .error
                    .unwrap_or_else(|| "server returned an error".to_string()),
            ));
        }
        self.import_files(job, &outcome.files).await?;
        Ok(outcome)
    }
}
