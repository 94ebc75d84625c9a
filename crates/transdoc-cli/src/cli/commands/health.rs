//! `transdoc health` – reachability probe plus server version.

use anyhow::Result;
use transdoc_core::config::AppConfig;
use transdoc_core::transport::{TranslationServer, TransportClient};

pub async fn run_health(cfg: &AppConfig) -> Result<i32> {
    let server = cfg.server_config()?;
    let client = TransportClient::new(&server.base_url)?;

    let reachable = client.check_health().await;
    println!("{:<13} {}", "server", client.base_url());
    println!(
        "{:<13} {}",
        "reachable",
        if reachable { "yes" } else { "no" }
    );
    if !reachable {
        return Ok(1);
    }

    match client.server_info().await {
        Ok(info) => {
            let unknown = || "unknown".to_string();
            println!("{:<13} {}", "version", info.version.unwrap_or_else(unknown));
            println!("{:<13} {}", "mode", info.mode.unwrap_or_else(unknown));
            let ready = info
                .engine_ready
                .map(|r| if r { "yes" } else { "no" }.to_string())
                .unwrap_or_else(unknown);
            println!("{:<13} {}", "engine ready", ready);
        }
        Err(e) => {
            tracing::debug!("health endpoint failed: {:#}", e);
            println!("{:<13} unavailable", "version");
        }
    }
    Ok(0)
}
