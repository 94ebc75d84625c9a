//! `transdoc config` – show where the config lives and what is in effect.

use anyhow::Result;
use transdoc_core::config::{self, AppConfig};

pub fn run_config(cfg: &AppConfig) -> Result<i32> {
    println!("# {}", config::config_path()?.display());
    print!("{}", cfg.to_display_toml()?);
    if let Err(e) = cfg.server_config() {
        eprintln!("warning: {:#}", e);
        return Ok(1);
    }
    Ok(0)
}
