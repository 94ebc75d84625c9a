//! `transdoc progress` – one progress query for a server task.

use anyhow::Result;
use transdoc_core::config::AppConfig;
use transdoc_core::poller::progress_message;
use transdoc_core::transport::{RemoteStatus, TranslationServer, TransportClient};

pub async fn run_progress(cfg: &AppConfig, task_id: &str) -> Result<i32> {
    let server = cfg.server_config()?;
    let client = TransportClient::new(&server.base_url)?;
    let snapshot = client.query_progress(task_id).await;

    println!("{:<8} {}", "task", task_id);
    println!(
        "{:<8} {}",
        "status",
        format!("{:?}", snapshot.status).to_lowercase()
    );
    if snapshot.progress >= 0 {
        println!("{:<8} {}", "progress", progress_message(&snapshot));
    }
    if let Some(secs) = snapshot.elapsed_seconds {
        println!("{:<8} {:.0}s", "elapsed", secs);
    }

    Ok(match snapshot.status {
        RemoteStatus::Error | RemoteStatus::Unknown => 1,
        RemoteStatus::Processing | RemoteStatus::Completed => 0,
    })
}
