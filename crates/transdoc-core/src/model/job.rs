//! Jobs, their outcomes, and the remote task state machine.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::server_config::ServerConfig;
use super::variant::Variant;
use crate::error::TranslateError;

/// Opaque handle to the host document that owns a job's input and results.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentRef(pub String);

impl DocumentRef {
    pub fn new(id: impl Into<String>) -> Self {
        DocumentRef(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server operation a job asks for (`POST {base}/{endpoint}`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Endpoint {
    #[default]
    Translate,
    Crop,
    CropCompare,
    Compare,
    Custom(String),
}

impl Endpoint {
    pub fn as_str(&self) -> &str {
        match self {
            Endpoint::Translate => "translate",
            Endpoint::Crop => "crop",
            Endpoint::CropCompare => "crop-compare",
            Endpoint::Compare => "compare",
            Endpoint::Custom(s) => s,
        }
    }
}

impl FromStr for Endpoint {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim_matches('/') {
            "translate" => Endpoint::Translate,
            "crop" => Endpoint::Crop,
            "crop-compare" => Endpoint::CropCompare,
            "compare" => Endpoint::Compare,
            other => Endpoint::Custom(other.to_string()),
        })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file's unit of work. Immutable once created.
#[derive(Debug, Clone)]
pub struct Job {
    pub file_name: String,
    pub document: DocumentRef,
    /// Local PDF sent as the request payload.
    pub file_path: PathBuf,
    pub config: ServerConfig,
    pub endpoint: Endpoint,
}

/// A file the server produced for a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducedFile {
    pub file_name: String,
    pub variant: Variant,
}

impl ProducedFile {
    pub fn new(file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        let variant = Variant::classify(&file_name);
        ProducedFile { file_name, variant }
    }
}

/// Result of running one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub success: bool,
    pub error: Option<String>,
    pub files: Vec<ProducedFile>,
}

impl JobOutcome {
    /// Successful outcome with files classified from the server's `fileList`.
    pub fn from_file_list<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        JobOutcome {
            success: true,
            error: None,
            files: names.into_iter().map(ProducedFile::new).collect(),
        }
    }

    pub fn failed(err: &TranslateError) -> Self {
        JobOutcome {
            success: false,
            error: Some(err.to_string()),
            files: Vec::new(),
        }
    }
}

/// Lifecycle of a server-side task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Submitted,
    Processing,
    Completed,
    Failed,
    TimedOut,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Failed | TaskState::TimedOut
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskState::Submitted => "submitted",
            TaskState::Processing => "processing",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
            TaskState::TimedOut => "timed-out",
        }
    }
}

/// Server-assigned id of an asynchronous task plus its tracked state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTaskHandle {
    pub task_id: String,
    state: TaskState,
}

impl RemoteTaskHandle {
    pub fn new(task_id: impl Into<String>) -> Self {
        RemoteTaskHandle {
            task_id: task_id.into(),
            state: TaskState::Submitted,
        }
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Moves to `next` unless already terminal. Returns whether the state changed.
    pub fn advance(&mut self, next: TaskState) -> bool {
        if self.state.is_terminal() || self.state == next {
            return false;
        }
        tracing::debug!(
            task_id = %self.task_id,
            from = self.state.as_str(),
            to = next.as_str(),
            "task state transition"
        );
        self.state = next;
        true
    }
}
