//! Narrow interfaces to the host environment.
//!
//! The core never touches the document library, credential store or process
//! table directly; callers plug these in (the CLI backs them with the local
//! filesystem and config file).

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::TranslateError;
use crate::model::{Credential, DocumentRef, Variant};

/// Resolves a document to the local PDF that should be translated.
pub trait DocumentResolver: Send + Sync {
    /// Fails with `TranslateError::Validation` when no PDF is resolvable.
    fn resolve_attachment_path(&self, document: &DocumentRef) -> Result<PathBuf, TranslateError>;
}

/// Everything the importer needs to attach one produced file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    pub owner: DocumentRef,
    /// Staged copy of the downloaded file; removed after `import_result` returns.
    pub local_path: PathBuf,
    /// Name the server gave the file.
    pub file_name: String,
    pub variant: Variant,
    /// Translation service used, for naming the attachment.
    pub service_label: String,
    pub rename: bool,
    pub open: bool,
}

/// Attaches a produced file to its owning document.
#[async_trait]
pub trait AttachmentImporter: Send + Sync {
    async fn import_result(&self, request: ImportRequest) -> anyhow::Result<()>;
}

/// Looks up the active LLM credential for a service.
pub trait CredentialProvider: Send + Sync {
    fn active_credential(&self, service: &str) -> Option<Credential>;
}

/// Provider for setups without any LLM credentials.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn active_credential(&self, _service: &str) -> Option<Credential> {
        None
    }
}

/// Starts a process and forgets about it.
pub trait ProcessLauncher: Send + Sync {
    fn spawn(&self, executable: &Path, args: &[String], working_dir: Option<&Path>)
        -> anyhow::Result<()>;
}
