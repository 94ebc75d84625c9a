//! Turning selected documents into jobs.

use crate::collaborators::DocumentResolver;
use crate::error::TranslateError;
use crate::model::{DocumentRef, Endpoint, Job, ServerConfig};

/// Jobs ready to run, plus the documents that could not become one.
#[derive(Debug, Default)]
pub struct PreparedBatch {
    pub jobs: Vec<Job>,
    pub rejected: Vec<(DocumentRef, TranslateError)>,
}

/// Resolves each document to its PDF. Documents that fail validation are
/// reported in `rejected` and never enter the batch.
pub fn prepare_jobs<I>(
    documents: I,
    resolver: &dyn DocumentResolver,
    config: &ServerConfig,
    endpoint: &Endpoint,
) -> PreparedBatch
where
    I: IntoIterator<Item = DocumentRef>,
{
    let mut batch = PreparedBatch::default();
    for document in documents {
        match resolver.resolve_attachment_path(&document) {
            Ok(file_path) => {
                let file_name = file_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| document.to_string());
                batch.jobs.push(Job {
                    file_name,
                    document,
                    file_path,
                    config: config.clone(),
                    endpoint: endpoint.clone(),
                });
            }
            Err(err) => {
                tracing::warn!(document = %document, "skipping document: {}", err);
                batch.rejected.push((document, err));
            }
        }
    }
    batch
}
