//! Filesystem-backed collaborators: documents are local PDF paths, results are
//! copied into a directory, processes are spawned detached.

use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use transdoc_core::collaborators::{
    AttachmentImporter, DocumentResolver, ImportRequest, ProcessLauncher,
};
use transdoc_core::model::DocumentRef;
use transdoc_core::{TranslateError, ValidationError};

/// Documents are paths to PDF files.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsDocumentResolver;

impl DocumentResolver for FsDocumentResolver {
    fn resolve_attachment_path(&self, document: &DocumentRef) -> Result<PathBuf, TranslateError> {
        let path = PathBuf::from(document.as_str());
        let is_pdf = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if !is_pdf || path.is_dir() {
            return Err(ValidationError::NotAFile(path).into());
        }
        if !path.is_file() {
            return Err(ValidationError::NotFound(path).into());
        }
        Ok(path)
    }
}

/// Copies produced files next to their source PDF, or into `output_dir`.
pub struct DirectoryImporter {
    output_dir: Option<PathBuf>,
    launcher: Arc<dyn ProcessLauncher>,
    opener: PathBuf,
}

impl DirectoryImporter {
    pub fn new(output_dir: Option<PathBuf>, launcher: Arc<dyn ProcessLauncher>) -> Self {
        Self {
            output_dir,
            launcher,
            opener: PathBuf::from("xdg-open"),
        }
    }

    fn destination(&self, request: &ImportRequest) -> PathBuf {
        let source = Path::new(request.owner.as_str());
        let dir = match &self.output_dir {
            Some(dir) => dir.clone(),
            None => source
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        dir.join(target_name(request))
    }
}

/// `<stem>-<service>-<variant>.pdf` when renaming, else the server's file name.
fn target_name(request: &ImportRequest) -> String {
    let server_name = Path::new(&request.file_name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "result.pdf".to_string());
    if !request.rename {
        return server_name;
    }
    let stem = Path::new(request.owner.as_str())
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    format!("{}-{}-{}.pdf", stem, request.service_label, request.variant)
}

#[async_trait]
impl AttachmentImporter for DirectoryImporter {
    async fn import_result(&self, request: ImportRequest) -> anyhow::Result<()> {
        let target = self.destination(&request);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create {}", parent.display()))?;
        }
        tokio::fs::copy(&request.local_path, &target)
            .await
            .with_context(|| format!("copy result to {}", target.display()))?;
        tracing::info!(file = %target.display(), variant = %request.variant, "imported result");
        println!("  saved {}", target.display());

        if request.open {
            let args = vec![target.to_string_lossy().into_owned()];
            if let Err(e) = self.launcher.spawn(&self.opener, &args, None) {
                tracing::warn!(file = %target.display(), "could not open result: {:#}", e);
            }
        }
        Ok(())
    }
}

/// Spawns with null stdio and drops the child handle.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedLauncher;

impl ProcessLauncher for DetachedLauncher {
    fn spawn(
        &self,
        executable: &Path,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> anyhow::Result<()> {
        let mut cmd = Command::new(executable);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }
        let child = cmd
            .spawn()
            .with_context(|| format!("spawn {}", executable.display()))?;
        tracing::debug!(
            pid = child.id(),
            executable = %executable.display(),
            "spawned detached process"
        );
        Ok(())
    }
}
