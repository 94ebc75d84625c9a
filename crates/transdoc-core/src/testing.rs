//! Scripted fakes shared by unit tests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use crate::collaborators::{AttachmentImporter, ImportRequest, ProcessLauncher};
use crate::error::TranslateError;
use crate::events::{BatchEvent, EventSink};
use crate::model::{
    Credential, DocumentRef, Endpoint, Engine, Job, JobOutcome, ServerConfig, TranslationOptions,
};
use crate::transport::{ProgressSnapshot, RemoteStatus, SubmitResult, TranslationServer};

pub fn sample_config() -> ServerConfig {
    ServerConfig {
        base_url: "http://localhost:8890".into(),
        timeout: Duration::from_secs(1800),
        poll_interval: Duration::from_secs(5),
        engine: Engine::Pdf2zh,
        service: "bing".into(),
        next_service: "siliconflowfree".into(),
        options: TranslationOptions::default(),
    }
}

pub fn job(file_name: &str) -> Job {
    Job {
        file_name: file_name.to_string(),
        document: DocumentRef::new(file_name),
        file_path: PathBuf::from("/library").join(file_name),
        config: sample_config(),
        endpoint: Endpoint::Translate,
    }
}

pub fn progress(status: RemoteStatus, progress: i32) -> ProgressSnapshot {
    ProgressSnapshot {
        status,
        progress,
        ..ProgressSnapshot::unknown()
    }
}

struct FakeState {
    submits: VecDeque<Result<SubmitResult, TranslateError>>,
    submit_count: usize,
    credentials: Vec<Option<Credential>>,
    progress: VecDeque<ProgressSnapshot>,
    default_progress: ProgressSnapshot,
    progress_queries: usize,
    result: Result<JobOutcome, TranslateError>,
    health: VecDeque<bool>,
    health_checks: usize,
    files: HashMap<String, Vec<u8>>,
    head_misses: usize,
    head_checks: usize,
}

/// In-memory `TranslationServer` answering from scripted queues.
pub struct FakeServer {
    state: Mutex<FakeState>,
}

impl FakeServer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                submits: VecDeque::new(),
                submit_count: 0,
                credentials: Vec::new(),
                progress: VecDeque::new(),
                default_progress: ProgressSnapshot::unknown(),
                progress_queries: 0,
                result: Err(TranslateError::ResultUnavailable("no result scripted".into())),
                health: VecDeque::from([true]),
                health_checks: 0,
                files: HashMap::new(),
                head_misses: 0,
                head_checks: 0,
            }),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn push_submit(&self, reply: Result<SubmitResult, TranslateError>) {
        self.state().submits.push_back(reply);
    }

    pub fn push_progress(&self, snapshot: ProgressSnapshot) {
        self.state().progress.push_back(snapshot);
    }

    /// Answer once the scripted progress queue is empty.
    pub fn set_default_progress(&self, snapshot: ProgressSnapshot) {
        self.state().default_progress = snapshot;
    }

    /// Every `fetch_result` returns a clone of this.
    pub fn set_result(&self, result: Result<JobOutcome, TranslateError>) {
        self.state().result = result;
    }

    /// Health answers in order; the last one repeats.
    pub fn set_health(&self, answers: Vec<bool>) {
        self.state().health = answers.into();
    }

    pub fn add_file(&self, name: &str, contents: &[u8]) {
        self.state().files.insert(name.to_string(), contents.to_vec());
    }

    /// The next `n` HEAD checks answer "missing" even for known files.
    pub fn miss_heads(&self, n: usize) {
        self.state().head_misses = n;
    }

    pub fn head_checks(&self) -> usize {
        self.state().head_checks
    }

    pub fn submits(&self) -> usize {
        self.state().submit_count
    }

    pub fn submitted_credentials(&self) -> Vec<Option<Credential>> {
        self.state().credentials.clone()
    }

    pub fn progress_queries(&self) -> usize {
        self.state().progress_queries
    }

    pub fn health_checks(&self) -> usize {
        self.state().health_checks
    }
}

#[async_trait]
impl TranslationServer for FakeServer {
    async fn submit(
        &self,
        _job: &Job,
        credential: Option<&Credential>,
    ) -> Result<SubmitResult, TranslateError> {
        let mut s = self.state();
        s.submit_count += 1;
        s.credentials.push(credential.cloned());
        s.submits
            .pop_front()
            .unwrap_or_else(|| Err(TranslateError::Transport("no submit scripted".into())))
    }

    async fn query_progress(&self, _task_id: &str) -> ProgressSnapshot {
        let mut s = self.state();
        s.progress_queries += 1;
        match s.progress.pop_front() {
            Some(snapshot) => snapshot,
            None => s.default_progress.clone(),
        }
    }

    async fn fetch_result(&self, _task_id: &str) -> Result<JobOutcome, TranslateError> {
        self.state().result.clone()
    }

    async fn check_health(&self) -> bool {
        let mut s = self.state();
        s.health_checks += 1;
        if s.health.len() > 1 {
            s.health.pop_front().unwrap_or(false)
        } else {
            s.health.front().copied().unwrap_or(false)
        }
    }

    async fn head_exists(&self, file_name: &str) -> bool {
        let mut state = self.state();
        state.head_checks += 1;
        if state.head_misses > 0 {
            state.head_misses -= 1;
            return false;
        }
        state.files.contains_key(file_name)
    }

    async fn download(&self, file_name: &str) -> Result<Vec<u8>, TranslateError> {
        self.state()
            .files
            .get(file_name)
            .cloned()
            .ok_or_else(|| TranslateError::Transport(format!("{} not found", file_name)))
    }
}

#[derive(Clone)]
pub struct ImportedFile {
    pub request: ImportRequest,
    /// Contents of the staged file at import time.
    pub contents: Vec<u8>,
}

#[derive(Default)]
pub struct RecordingImporter {
    imported: Mutex<Vec<ImportedFile>>,
    fail_on: Option<String>,
}

impl RecordingImporter {
    pub fn failing_on(file_name: &str) -> Self {
        Self {
            imported: Mutex::new(Vec::new()),
            fail_on: Some(file_name.to_string()),
        }
    }

    pub fn imported(&self) -> Vec<ImportedFile> {
        self.imported.lock().unwrap().clone()
    }
}

#[async_trait]
impl AttachmentImporter for RecordingImporter {
    async fn import_result(&self, request: ImportRequest) -> anyhow::Result<()> {
        if self.fail_on.as_deref() == Some(request.file_name.as_str()) {
            anyhow::bail!("attachment store is read-only");
        }
        let contents = tokio::fs::read(&request.local_path).await?;
        self.imported
            .lock()
            .unwrap()
            .push(ImportedFile { request, contents });
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnedProcess {
    pub executable: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

#[derive(Default)]
pub struct RecordingLauncher {
    spawned: Mutex<Vec<SpawnedProcess>>,
    fail: bool,
}

impl RecordingLauncher {
    pub fn failing() -> Self {
        Self {
            spawned: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn spawned(&self) -> Vec<SpawnedProcess> {
        self.spawned.lock().unwrap().clone()
    }
}

impl ProcessLauncher for RecordingLauncher {
    fn spawn(
        &self,
        executable: &Path,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("{}: permission denied", executable.display());
        }
        self.spawned.lock().unwrap().push(SpawnedProcess {
            executable: executable.to_path_buf(),
            args: args.to_vec(),
            working_dir: working_dir.map(Path::to_path_buf),
        });
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<BatchEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<BatchEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn publish(&self, event: &BatchEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
