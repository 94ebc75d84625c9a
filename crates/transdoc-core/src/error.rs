//! Error taxonomy for a single translation job.
//!
//! Every failure that can happen between resolving a document and importing
//! its translated files maps onto one `TranslateError` variant. The batch
//! orchestrator turns these into `JobCompleted { success: false }` events;
//! none of them escape a batch run.

use std::path::PathBuf;
use std::time::Duration;

/// Problems with the input document, found before a job enters a batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The document has no attachment that could be translated.
    #[error("no valid attachment found")]
    NoAttachment,
    /// The resolved attachment is not a PDF.
    #[error("please select a PDF attachment: {}", .0.display())]
    NotAFile(PathBuf),
    /// The resolved PDF does not exist on disk.
    #[error("PDF file not found: {}", .0.display())]
    NotFound(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Connection refused, DNS failure, broken transfer. The only retryable kind.
    #[error("transport error: {0}")]
    Transport(String),
    /// The submit request did not answer within the configured timeout.
    #[error("request timed out after {}, the server may still be processing", human_duration(.0))]
    Timeout(Duration),
    /// Explicit `status: "error"` body, or a non-success status without one.
    #[error("{0}")]
    Server(String),
    /// The server reported completion but `/result/{taskId}` was not OK.
    #[error("failed to fetch task result: {0}")]
    ResultUnavailable(String),
    /// A progress poll reported `status: "error"`.
    #[error("{0}")]
    JobFailed(String),
    /// The poll loop reached the job deadline without a terminal status.
    #[error("task processing timed out ({})", human_duration(.0))]
    JobTimedOut(Duration),
    /// Staging or importing a produced file failed.
    #[error("import failed: {0}")]
    Import(String),
    /// Starting the server subprocess failed.
    #[error("failed to start server: {0}")]
    Launch(String),
}

/// Formats a timeout the way users configure it: whole minutes when possible.
pub fn human_duration(d: &Duration) -> String {
    let secs = d.as_secs();
    if secs >= 60 && secs.is_multiple_of(60) {
        format!("{} min", secs / 60)
    } else if secs > 0 {
        format!("{} s", secs)
    } else {
        format!("{} ms", d.as_millis())
    }
}
