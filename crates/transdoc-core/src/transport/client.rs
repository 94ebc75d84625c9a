//! libcurl-backed `TranslationServer`.

use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

use super::http::{self, HttpRequest, HttpResponse, Method};
use super::wire::{self, ProgressSnapshot, ServerInfo, SubmitRequest};
use super::{SubmitResult, TranslationServer};
use crate::error::{TranslateError, ValidationError};
use crate::model::{Credential, Job, JobOutcome};
use crate::retry::{classify_curl_error, ErrorKind};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);
const HEAD_TIMEOUT: Duration = Duration::from_secs(5);
const INFO_TIMEOUT: Duration = Duration::from_secs(10);
const PROGRESS_TIMEOUT: Duration = Duration::from_secs(30);
const RESULT_TIMEOUT: Duration = Duration::from_secs(60);
/// Produced PDFs can be large.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(360);

/// Client for one server base URL. Cheap to clone; holds no per-job state.
#[derive(Debug, Clone)]
pub struct TransportClient {
    base: Url,
}

impl TransportClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base = Url::parse(base_url.trim())
            .with_context(|| format!("invalid server URL {:?}", base_url))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("server URL {:?} cannot be used as a base", base_url);
        }
        Ok(TransportClient { base })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    /// `{base}/{segments...}` with each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> String {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }
        url.to_string()
    }

    /// `GET {base}/health`: version and mode of a running server.
    pub async fn server_info(&self) -> anyhow::Result<ServerInfo> {
        let url = self.url(&["health"]);
        let response = execute(Method::Get, url.clone(), None, INFO_TIMEOUT).await?;
        if !response.is_success() {
            anyhow::bail!("{} returned HTTP {}", url, response.status);
        }
        serde_json::from_slice(&response.body).context("parse /health response")
    }
}

/// Runs one blocking transfer on the blocking pool and maps curl failures.
async fn execute(
    method: Method,
    url: String,
    body: Option<Vec<u8>>,
    timeout: Duration,
) -> Result<HttpResponse, TranslateError> {
    let request = HttpRequest {
        method,
        url,
        body,
        timeout,
    };
    let result = tokio::task::spawn_blocking(move || {
        let r = http::perform(&request);
        (request, r)
    })
    .await
    .map_err(|e| TranslateError::Transport(format!("request task failed: {}", e)))?;

    match result {
        (_, Ok(response)) => Ok(response),
        (request, Err(e)) => {
            tracing::debug!(
                method = request.method.as_str(),
                url = %request.url,
                "transfer failed: {}",
                e
            );
            Err(match classify_curl_error(&e) {
                ErrorKind::Timeout => TranslateError::Timeout(request.timeout),
                _ => TranslateError::Transport(e.to_string()),
            })
        }
    }
}

#[async_trait]
impl TranslationServer for TransportClient {
    async fn submit(
        &self,
        job: &Job,
        credential: Option<&Credential>,
    ) -> Result<SubmitResult, TranslateError> {
        let bytes = tokio::fs::read(&job.file_path)
            .await
            .map_err(|_| ValidationError::NotFound(job.file_path.clone()))?;
        let request = SubmitRequest::new(
            &job.file_name,
            wire::encode_pdf(&bytes),
            &job.config,
            credential,
        );
        let body = serde_json::to_vec(&request)
            .map_err(|e| TranslateError::Transport(format!("encode request: {}", e)))?;

        let url = self.url(&[job.endpoint.as_str()]);
        let timeout = job.config.timeout;
        tracing::info!(
            file = %job.file_name,
            endpoint = %job.endpoint,
            bytes = bytes.len(),
            "submitting job"
        );
        let response =
            match tokio::time::timeout(timeout, execute(Method::Post, url, Some(body), timeout))
                .await
            {
                Ok(r) => r?,
                Err(_) => return Err(TranslateError::Timeout(timeout)),
            };
        tracing::debug!(status = response.status, "submit answered");
        wire::interpret_reply(response.status, &response.body)
    }

    async fn query_progress(&self, task_id: &str) -> ProgressSnapshot {
        let url = self.url(&["progress", task_id]);
        match execute(Method::Get, url, None, PROGRESS_TIMEOUT).await {
            Ok(r) if r.is_success() => match ProgressSnapshot::parse(&r.body) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!(task_id, "unparsable progress reply: {}", e);
                    ProgressSnapshot::unknown()
                }
            },
            Ok(r) => {
                tracing::warn!(task_id, status = r.status, "progress query rejected");
                ProgressSnapshot::unknown()
            }
            Err(e) => {
                tracing::warn!(task_id, "progress query failed: {}", e);
                ProgressSnapshot::unknown()
            }
        }
    }

    async fn fetch_result(&self, task_id: &str) -> Result<JobOutcome, TranslateError> {
        let url = self.url(&["result", task_id]);
        let response = execute(Method::Get, url, None, RESULT_TIMEOUT).await?;
        if !response.is_success() {
            return Err(TranslateError::ResultUnavailable(format!(
                "HTTP {}",
                response.status
            )));
        }
        match wire::interpret_reply(response.status, &response.body)? {
            SubmitResult::Immediate(outcome) => Ok(outcome),
            SubmitResult::Accepted(_) => Err(TranslateError::ResultUnavailable(
                "task is still processing".to_string(),
            )),
        }
    }

    async fn check_health(&self) -> bool {
        match execute(Method::Get, self.base.to_string(), None, HEALTH_TIMEOUT).await {
            Ok(r) => {
                tracing::debug!(status = r.status, url = %self.base, "server answered");
                true
            }
            Err(e) => {
                tracing::debug!(url = %self.base, "server unreachable: {}", e);
                false
            }
        }
    }

    async fn head_exists(&self, file_name: &str) -> bool {
        let url = self.url(&["translatedFile", file_name]);
        matches!(
            execute(Method::Head, url, None, HEAD_TIMEOUT).await,
            Ok(r) if r.status == 200
        )
    }

    async fn download(&self, file_name: &str) -> Result<Vec<u8>, TranslateError> {
        let url = self.url(&["translatedFile", file_name]);
        let response = execute(Method::Get, url.clone(), None, DOWNLOAD_TIMEOUT).await?;
        if !response.is_success() {
            return Err(TranslateError::Transport(format!(
                "GET {} returned HTTP {}",
                url, response.status
            )));
        }
        Ok(response.body)
    }
}
