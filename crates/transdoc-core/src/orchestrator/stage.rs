//! Download produced files into a scratch directory and hand them to the importer.

use std::path::Path;

use crate::collaborators::{AttachmentImporter, ImportRequest};
use crate::config::OutputConfig;
use crate::error::TranslateError;
use crate::model::{Job, ProducedFile, Variant};
use crate::retry::run_with_retry;

use super::run::BatchOrchestrator;

/// How imported files are named and which ones get opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputOptions {
    pub rename: bool,
    pub open: Vec<Variant>,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            rename: true,
            open: Vec::new(),
        }
    }
}

impl From<&OutputConfig> for OutputOptions {
    fn from(cfg: &OutputConfig) -> Self {
        Self {
            rename: cfg.rename,
            open: cfg.open.clone(),
        }
    }
}

/// Last path component of a server-supplied name, so it cannot escape the scratch dir.
fn local_name(file_name: &str) -> &str {
    Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("result.pdf")
}

impl BatchOrchestrator {
    /// Imports every produced file of a successful job, in order. Stops at the first failure.
    pub(super) async fn import_files(
        &self,
        job: &Job,
        files: &[ProducedFile],
    ) -> Result<(), TranslateError> {
        if files.is_empty() {
            tracing::warn!(file = %job.file_name, "server produced no files");
        }
        let service = job.config.active_service().to_string();
        for file in files {
            self.stage_and_import(job, file, &service).await?;
        }
        Ok(())
    }

    async fn fetch(&self, file_name: &str) -> Result<Vec<u8>, TranslateError> {
        if !self.server.head_exists(file_name).await {
            return Err(TranslateError::Transport(format!(
                "{} is not available on the server",
                file_name
            )));
        }
        self.server.download(file_name).await
    }

    async fn stage_and_import(
        &self,
        job: &Job,
        file: &ProducedFile,
        service: &str,
    ) -> Result<(), TranslateError> {
        let bytes = run_with_retry(&self.retry, self.clock.as_ref(), || {
            self.fetch(&file.file_name)
        })
        .await?;

        let scratch = tempfile::tempdir()
            .map_err(|e| TranslateError::Import(format!("create staging directory: {}", e)))?;
        let local_path = scratch.path().join(local_name(&file.file_name));
        tokio::fs::write(&local_path, &bytes).await.map_err(|e| {
            TranslateError::Import(format!("write {}: {}", local_path.display(), e))
        })?;
        tracing::debug!(
            file = %file.file_name,
            variant = %file.variant,
            bytes = bytes.len(),
            "staged produced file"
        );

        let request = ImportRequest {
            owner: job.document.clone(),
            local_path,
            file_name: file.file_name.clone(),
            variant: file.variant,
            service_label: service.to_string(),
            rename: self.output.rename,
            open: self.output.open.contains(&file.variant),
        };
        import(self.importer.as_ref(), request).await
        // `scratch` drops here and removes the staged copy.
    }
}

async fn import(
    importer: &dyn AttachmentImporter,
    request: ImportRequest,
) -> Result<(), TranslateError> {
    let name = request.file_name.clone();
    importer
        .import_result(request)
        .await
        .map_err(|e| TranslateError::Import(format!("{}: {:#}", name, e)))
}
