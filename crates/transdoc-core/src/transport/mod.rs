//! Protocol client for the translation server.
//!
//! `TranslationServer` is the seam the poller, lifecycle manager and
//! orchestrator talk through; `TransportClient` implements it over libcurl.
//! The client knows nothing about batches: every call is independent and
//! carries its own timeout.

mod client;
mod http;
mod wire;

use async_trait::async_trait;

use crate::error::TranslateError;
use crate::model::{Credential, Job, JobOutcome, RemoteTaskHandle};

pub use client::TransportClient;
pub use wire::{
    encode_pdf, interpret_reply, ProgressSnapshot, RemoteStatus, ServerInfo, SubmitRequest,
};

/// How the server answered a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResult {
    /// Legacy server: the reply already holds the final result.
    Immediate(JobOutcome),
    /// The server queued the job; poll the handle's task id.
    Accepted(RemoteTaskHandle),
}

#[async_trait]
pub trait TranslationServer: Send + Sync {
    /// POSTs the job's file and config. Fails with `Timeout` if no reply
    /// arrives within `job.config.timeout`.
    async fn submit(
        &self,
        job: &Job,
        credential: Option<&Credential>,
    ) -> Result<SubmitResult, TranslateError>;

    /// Never fails: any error yields `ProgressSnapshot::unknown()`.
    async fn query_progress(&self, task_id: &str) -> ProgressSnapshot;

    async fn fetch_result(&self, task_id: &str) -> Result<JobOutcome, TranslateError>;

    /// Reachability probe of the bare base URL.
    ///
    /// Any HTTP answer, 4xx and 5xx included, counts as alive: an open port
    /// that answers proves the server process is up. Only transport-level
    /// failures (refused, timeout, unreachable) report `false`. A wrong URL
    /// served by some other HTTP service therefore also reads as healthy.
    async fn check_health(&self) -> bool;

    /// Whether `translatedFile/{file_name}` exists on the server.
    async fn head_exists(&self, file_name: &str) -> bool;

    async fn download(&self, file_name: &str) -> Result<Vec<u8>, TranslateError>;
}
