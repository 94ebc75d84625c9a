//! `transdoc translate` – run a batch and print its progress.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use transdoc_core::clock::TokioClock;
use transdoc_core::config::AppConfig;
use transdoc_core::events::{BatchEvent, EventBus};
use transdoc_core::lifecycle::{LaunchSettings, ServerLifecycleManager};
use transdoc_core::model::{DocumentRef, Endpoint};
use transdoc_core::orchestrator::{prepare_jobs, BatchOrchestrator, OutputOptions};
use transdoc_core::retry::RetryPolicy;
use transdoc_core::transport::{TranslationServer, TransportClient};

use crate::cli::collab::{DetachedLauncher, DirectoryImporter, FsDocumentResolver};

#[derive(Debug, Clone)]
pub struct TranslateArgs {
    pub files: Vec<PathBuf>,
    pub endpoint: Endpoint,
    pub output_dir: Option<PathBuf>,
    pub autostart: bool,
}

pub async fn run_translate(cfg: &AppConfig, args: TranslateArgs) -> Result<i32> {
    let server_config = cfg.server_config()?;

    let documents = args
        .files
        .iter()
        .map(|p| DocumentRef::new(p.to_string_lossy()));
    let prepared = prepare_jobs(
        documents,
        &FsDocumentResolver,
        &server_config,
        &args.endpoint,
    );
    for (document, err) in &prepared.rejected {
        eprintln!("skipping {}: {}", document, err);
    }
    if prepared.jobs.is_empty() {
        eprintln!("no PDF to translate");
        return Ok(1);
    }

    let client: Arc<dyn TranslationServer> =
        Arc::new(TransportClient::new(&server_config.base_url)?);
    let launcher = Arc::new(DetachedLauncher);
    let output_dir = args.output_dir.or_else(|| cfg.output.dir.clone());
    let importer = Arc::new(DirectoryImporter::new(output_dir, launcher.clone()));

    let mut orchestrator = BatchOrchestrator::new(Arc::clone(&client), importer)
        .with_credentials(Arc::new(cfg.llm_api.clone()))
        .with_retry(RetryPolicy::from_config(&cfg.retry_config()))
        .with_output(OutputOptions::from(&cfg.output));
    if args.autostart && cfg.launcher.autostart {
        orchestrator = orchestrator.with_lifecycle(ServerLifecycleManager::new(
            client,
            launcher,
            Arc::new(TokioClock),
            LaunchSettings::from(&cfg.launcher),
        ));
    }

    let mut bus = EventBus::new();
    bus.subscribe(print_event);

    let report = orchestrator.run(prepared.jobs, &bus).await;
    if report.all_succeeded() && prepared.rejected.is_empty() {
        Ok(0)
    } else {
        Ok(1)
    }
}

fn print_event(event: &BatchEvent) -> Result<()> {
    println!("{}", render(event));
    Ok(())
}

fn render(event: &BatchEvent) -> String {
    match event {
        BatchEvent::BatchStarted { count } => format!("Translating {} file(s)", count),
        BatchEvent::JobStarted {
            index,
            count,
            file_name,
        } => format!("[{}/{}] {}", index, count, file_name),
        BatchEvent::JobProgress {
            batch_percent,
            message,
            ..
        } => format!("  {:>3.0}% {}", batch_percent, message),
        BatchEvent::JobCompleted {
            index,
            count,
            file_name,
            success: true,
            ..
        } => format!("[{}/{}] {}: done", index, count, file_name),
        BatchEvent::JobCompleted {
            index,
            count,
            file_name,
            error,
            ..
        } => format!(
            "[{}/{}] {}: failed: {}",
            index,
            count,
            file_name,
            error.as_deref().unwrap_or("unknown error")
        ),
        BatchEvent::BatchCompleted {
            succeeded, failed, ..
        } => format!("{} succeeded, {} failed", succeeded, failed),
    }
}
